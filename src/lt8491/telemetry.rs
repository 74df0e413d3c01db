use super::{
    registers::{self, Register, ScaledValue},
    Lt8491,
};
use crate::{error::Result, transport::Transport};
use uom::si::{
    electric_current::ampere,
    electric_potential::volt,
    f32::{ElectricCurrent, ElectricPotential, Power, Ratio, ThermodynamicTemperature},
    power::watt,
    ratio::percent,
    thermodynamic_temperature::degree_celsius,
};

/// One reading of the nine telemetry registers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub battery_temperature: ThermodynamicTemperature,
    pub output_power: Power,
    pub input_power: Power,
    pub efficiency: Ratio,
    pub output_current: ElectricCurrent,
    pub input_current: ElectricCurrent,
    pub battery_voltage: ElectricPotential,
    pub input_voltage: ElectricPotential,
    /// Input voltage measured at the panel side of the sense resistor.
    pub input_voltage_raw: ElectricPotential,
}

/// Read order of the telemetry block.
pub const REGISTERS: [Register; 9] = [
    registers::TELE_TBAT,
    registers::TELE_POUT,
    registers::TELE_PIN,
    registers::TELE_EFF,
    registers::TELE_IOUT,
    registers::TELE_IIN,
    registers::TELE_VBAT,
    registers::TELE_VIN,
    registers::TELE_VINR,
];

fn scaled(reg: &Register, raw: u16) -> f32 {
    // every telemetry register carries a scale in the map
    reg.scale.map(|s| ScaledValue::new(raw, s).value()).unwrap_or(raw as f32)
}

impl Telemetry {
    /// Builds a snapshot from raw words in [`REGISTERS`] order.
    pub fn from_raw(raw: [u16; 9]) -> Telemetry {
        let v = |i: usize| scaled(&REGISTERS[i], raw[i]);
        Telemetry {
            battery_temperature: ThermodynamicTemperature::new::<degree_celsius>(v(0)),
            output_power: Power::new::<watt>(v(1)),
            input_power: Power::new::<watt>(v(2)),
            efficiency: Ratio::new::<percent>(v(3)),
            output_current: ElectricCurrent::new::<ampere>(v(4)),
            input_current: ElectricCurrent::new::<ampere>(v(5)),
            battery_voltage: ElectricPotential::new::<volt>(v(6)),
            input_voltage: ElectricPotential::new::<volt>(v(7)),
            input_voltage_raw: ElectricPotential::new::<volt>(v(8)),
        }
    }

    /// Panel power computed from VINR and IIN.
    pub fn computed_input_power(&self) -> Power {
        self.input_voltage_raw * self.input_current
    }

    /// Battery power computed from VBAT and IOUT.
    pub fn computed_output_power(&self) -> Power {
        self.battery_voltage * self.output_current
    }

    /// Output over input power from the computed values, as a check on the
    /// part's own efficiency figure. Zero when there is no input power.
    pub fn computed_efficiency(&self) -> Ratio {
        let input = self.computed_input_power();
        if input.get::<watt>() <= 0.0 {
            return Ratio::new::<percent>(0.0);
        }
        self.computed_output_power() / input
    }
}

impl<T: Transport> Lt8491<T> {
    /// Reads all telemetry registers. Fails as a whole if any read fails.
    pub async fn read_telemetry(&mut self) -> Result<Telemetry> {
        let mut raw = [0u16; 9];
        for (reg, slot) in REGISTERS.iter().zip(raw.iter_mut()) {
            *slot = self.read_word(reg).await?;
        }
        Ok(Telemetry::from_raw(raw))
    }
}
