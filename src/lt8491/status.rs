use super::{
    registers::{self, CHARGING, CHRG_FAULT, CHRG_STAGE_MASK, CHRG_STAGE_SHIFT, SOLAR_STATE_MASK, SOLAR_STATE_SHIFT, VIN_UVLO},
    Lt8491,
};
use crate::{error::Result, transport::Transport};
use bitflags::bitflags;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeStage {
    Trickle,
    ConstantCurrent,
    ConstantVoltage,
    Float,
    Complete,
    Reserved(u8),
}

impl From<u8> for ChargeStage {
    fn from(code: u8) -> Self {
        match code {
            0 => ChargeStage::Trickle,
            1 => ChargeStage::ConstantCurrent,
            2 => ChargeStage::ConstantVoltage,
            3 => ChargeStage::Float,
            4 => ChargeStage::Complete,
            c => ChargeStage::Reserved(c),
        }
    }
}

impl ChargeStage {
    /// Short label used in the data log.
    pub fn label(&self) -> &'static str {
        match self {
            ChargeStage::Trickle => "Stage 0",
            ChargeStage::ConstantCurrent => "Stage 1",
            ChargeStage::ConstantVoltage => "Stage 2",
            ChargeStage::Float => "Stage 3",
            ChargeStage::Complete => "Complete",
            ChargeStage::Reserved(_) => "-",
        }
    }
}

impl fmt::Display for ChargeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChargeStage::Trickle => f.write_str("Stage 0 Trickle"),
            ChargeStage::ConstantCurrent => f.write_str("Stage 1 Constant Current"),
            ChargeStage::ConstantVoltage => f.write_str("Stage 2 Constant Voltage"),
            ChargeStage::Float => f.write_str("Stage 3 Float"),
            ChargeStage::Complete => f.write_str("Charging Complete"),
            ChargeStage::Reserved(c) => write!(f, "Reserved stage {}", c),
        }
    }
}

/// Phase of the part's MPPT algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarState {
    BatteryLimited,
    FullPanelScan,
    PerturbAndObserve,
    LowPowerVinPulsing,
    LowPowerVinTooLow,
    Inactive,
}

impl From<u8> for SolarState {
    fn from(code: u8) -> Self {
        match code {
            0 => SolarState::BatteryLimited,
            1 => SolarState::FullPanelScan,
            2 => SolarState::PerturbAndObserve,
            3 => SolarState::LowPowerVinPulsing,
            4 => SolarState::LowPowerVinTooLow,
            _ => SolarState::Inactive,
        }
    }
}

impl SolarState {
    pub fn label(&self) -> &'static str {
        match self {
            SolarState::BatteryLimited => "Batt Limited",
            SolarState::FullPanelScan => "Full Panel Scan",
            SolarState::PerturbAndObserve => "Perturb and Observe",
            SolarState::LowPowerVinPulsing => "Low Power Pulsing",
            SolarState::LowPowerVinTooLow => "Low Power VIN Low",
            SolarState::Inactive => "Inactive",
        }
    }

    /// Operator-facing description, empty when the tracker is idle.
    pub fn description(&self) -> &'static str {
        match self {
            SolarState::BatteryLimited => "Limited by battery",
            SolarState::FullPanelScan => "Performing panel scan for MPP",
            SolarState::PerturbAndObserve => "Tracking MPP",
            SolarState::LowPowerVinPulsing => "Panel current too low for constant charging",
            SolarState::LowPowerVinTooLow => "Panel voltage too low to harvest energy",
            SolarState::Inactive => "",
        }
    }
}

bitflags! {
    /// STAT_SYSTEM, device internal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct System: u8 {
        const _ = !0;
    }

    /// STAT_CHRG_FAULTS, passed through as read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChargeFaults: u8 {
        const _ = !0;
    }
}

/// STAT_CHARGER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charger {
    pub raw: u8,
    pub charging: bool,
    pub stage: ChargeStage,
    pub fault: bool,
}

impl From<u8> for Charger {
    fn from(raw: u8) -> Self {
        Charger {
            raw,
            charging: raw & CHARGING != 0,
            stage: ChargeStage::from((raw & CHRG_STAGE_MASK) >> CHRG_STAGE_SHIFT),
            fault: raw & CHRG_FAULT != 0,
        }
    }
}

/// STAT_SUPPLY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Supply {
    pub raw: u8,
    pub vin_uvlo: bool,
    pub solar_state: SolarState,
}

impl From<u8> for Supply {
    fn from(raw: u8) -> Self {
        Supply {
            raw,
            vin_uvlo: raw & VIN_UVLO != 0,
            solar_state: SolarState::from((raw & SOLAR_STATE_MASK) >> SOLAR_STATE_SHIFT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargerStatus {
    pub charger: Charger,
    pub system: System,
    pub supply: Supply,
    pub faults: ChargeFaults,
}

impl ChargerStatus {
    pub fn from_raw(charger: u8, system: u8, supply: u8, faults: u8) -> ChargerStatus {
        ChargerStatus {
            charger: Charger::from(charger),
            system: System::from_bits_retain(system),
            supply: Supply::from(supply),
            faults: ChargeFaults::from_bits_retain(faults),
        }
    }

    /// Log label for the charge stage, `-` when not charging.
    pub fn stage_label(&self) -> &'static str {
        if self.charger.charging {
            self.charger.stage.label()
        } else {
            "-"
        }
    }
}

impl<T: Transport> Lt8491<T> {
    /// Reads the four status registers. Fails as a whole if any read fails.
    pub async fn read_status(&mut self) -> Result<ChargerStatus> {
        let charger = self.read_byte(&registers::STAT_CHARGER).await?;
        let system = self.read_byte(&registers::STAT_SYSTEM).await?;
        let supply = self.read_byte(&registers::STAT_SUPPLY).await?;
        let faults = self.read_byte(&registers::STAT_CHRG_FAULTS).await?;
        Ok(ChargerStatus::from_raw(charger, system, supply, faults))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Error, lt8491::registers::DEFAULT_ADDRESS, testing::FakeBus};

    #[test]
    fn charge_stage_is_total() {
        let expected = [
            ChargeStage::Trickle,
            ChargeStage::ConstantCurrent,
            ChargeStage::ConstantVoltage,
            ChargeStage::Float,
            ChargeStage::Complete,
            ChargeStage::Reserved(5),
            ChargeStage::Reserved(6),
            ChargeStage::Reserved(7),
        ];
        for code in 0u8..8 {
            let charger = Charger::from(CHARGING | (code << CHRG_STAGE_SHIFT));
            assert!(charger.charging);
            assert!(!charger.fault);
            assert_eq!(charger.stage, expected[code as usize]);
        }
    }

    #[test]
    fn solar_state_is_total() {
        assert_eq!(Supply::from(0b0000).solar_state, SolarState::BatteryLimited);
        assert_eq!(Supply::from(0b0010).solar_state, SolarState::FullPanelScan);
        assert_eq!(Supply::from(0b0100).solar_state, SolarState::PerturbAndObserve);
        assert_eq!(Supply::from(0b0110).solar_state, SolarState::LowPowerVinPulsing);
        assert_eq!(Supply::from(0b1000).solar_state, SolarState::LowPowerVinTooLow);
        for raw in 0u8..=255 {
            let supply = Supply::from(raw);
            let code = (raw & SOLAR_STATE_MASK) >> SOLAR_STATE_SHIFT;
            if code > 4 {
                assert_eq!(supply.solar_state, SolarState::Inactive);
                assert_eq!(supply.solar_state.description(), "");
            }
            assert_eq!(supply.vin_uvlo, raw & 1 == 1);
        }
    }

    #[test]
    fn fault_and_opaque_fields() {
        let s = ChargerStatus::from_raw(CHRG_FAULT, 0xA5, VIN_UVLO, 0x81);
        assert!(s.charger.fault);
        assert!(!s.charger.charging);
        assert_eq!(s.stage_label(), "-");
        assert_eq!(s.system.bits(), 0xA5);
        assert_eq!(s.faults.bits(), 0x81);
        assert!(s.supply.vin_uvlo);
    }

    #[test]
    fn stage_labels() {
        let s = ChargerStatus::from_raw(CHARGING | (4 << CHRG_STAGE_SHIFT), 0, 0, 0);
        assert_eq!(s.stage_label(), "Complete");
        assert_eq!(s.charger.stage.to_string(), "Charging Complete");
        let s = ChargerStatus::from_raw(CHARGING | (6 << CHRG_STAGE_SHIFT), 0, 0, 0);
        assert_eq!(s.stage_label(), "-");
        assert_eq!(s.charger.stage.to_string(), "Reserved stage 6");
    }

    #[tokio::test]
    async fn reads_all_four_registers() {
        let mut bus = FakeBus::new();
        bus.set_byte(registers::STAT_CHARGER.address, CHARGING | (2 << CHRG_STAGE_SHIFT));
        bus.set_byte(registers::STAT_SUPPLY.address, 2 << SOLAR_STATE_SHIFT);
        bus.set_byte(registers::STAT_CHRG_FAULTS.address, 0x10);
        let mut dev = Lt8491::new(bus, DEFAULT_ADDRESS);
        let s = dev.read_status().await.unwrap();
        assert_eq!(s.charger.stage, ChargeStage::ConstantVoltage);
        assert_eq!(s.supply.solar_state, SolarState::PerturbAndObserve);
        assert_eq!(s.faults.bits(), 0x10);
        assert_eq!(dev.release().reads(), &[0x12, 0x13, 0x14, 0x19]);
    }

    #[tokio::test]
    async fn any_failed_read_aborts_the_snapshot() {
        for reg in [registers::STAT_CHARGER, registers::STAT_SYSTEM, registers::STAT_SUPPLY, registers::STAT_CHRG_FAULTS] {
            let mut bus = FakeBus::new();
            bus.fail_once(reg.address);
            let mut dev = Lt8491::new(bus, DEFAULT_ADDRESS);
            match dev.read_status().await {
                Err(Error::Transport { register, .. }) => assert_eq!(register, reg.name),
                other => panic!("{}: unexpected {:?}", reg.name, other),
            }
        }
    }
}
