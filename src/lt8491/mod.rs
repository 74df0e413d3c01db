//! Driver for the LT8491 buck/boost MPPT battery charger.

pub mod calibration;
pub mod registers;
pub mod status;
pub mod telemetry;

use crate::{
    error::{Error, Result},
    transport::Transport,
};
use log::trace;
use registers::{Register, Width};
use std::time::Duration;

pub use calibration::{Calibration, CalibrationReadback};
pub use status::{ChargeFaults, ChargeStage, Charger, ChargerStatus, SolarState, Supply, System};
pub use telemetry::Telemetry;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// One LT8491 on a bus. Owns the transport, so everything addressed to the
/// part goes through this handle one operation at a time.
pub struct Lt8491<T> {
    bus: T,
    address: u8,
    timeout: Duration,
}

impl<T: Transport> Lt8491<T> {
    pub fn new(bus: T, address: u8) -> Self {
        Lt8491 { bus, address, timeout: DEFAULT_TIMEOUT }
    }

    /// Bound on every individual bus transfer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn release(self) -> T {
        self.bus
    }

    async fn read(&mut self, reg: &Register, buf: &mut [u8]) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.bus.read(self.address, reg.address, buf)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Transport { register: reg.name, source: Box::new(e) }),
            Err(_) => Err(Error::Timeout { register: reg.name }),
        }
    }

    async fn write(&mut self, reg: &Register, data: &[u8]) -> Result<()> {
        match tokio::time::timeout(self.timeout, self.bus.write(self.address, reg.address, data)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Transport { register: reg.name, source: Box::new(e) }),
            Err(_) => Err(Error::Timeout { register: reg.name }),
        }
    }

    pub async fn read_byte(&mut self, reg: &Register) -> Result<u8> {
        debug_assert_eq!(reg.width, Width::Byte, "{}", reg.name);
        let mut buf = [0u8; 1];
        self.read(reg, &mut buf).await?;
        trace!("{} -> 0x{:02X}", reg.name, buf[0]);
        Ok(buf[0])
    }

    /// Reads a 16 bit register, low byte first on the wire.
    pub async fn read_word(&mut self, reg: &Register) -> Result<u16> {
        debug_assert_eq!(reg.width, Width::Word, "{}", reg.name);
        let mut buf = [0u8; 2];
        self.read(reg, &mut buf).await?;
        let v = u16::from_le_bytes(buf);
        trace!("{} -> 0x{:04X}", reg.name, v);
        Ok(v)
    }

    pub async fn write_byte(&mut self, reg: &Register, value: u8) -> Result<()> {
        debug_assert_eq!(reg.width, Width::Byte, "{}", reg.name);
        trace!("{} <- 0x{:02X}", reg.name, value);
        self.write(reg, &[value]).await
    }

    pub async fn write_word(&mut self, reg: &Register, value: u16) -> Result<()> {
        debug_assert_eq!(reg.width, Width::Word, "{}", reg.name);
        trace!("{} <- 0x{:04X}", reg.name, value);
        self.write(reg, &value.to_le_bytes()).await
    }

    /// Firmware version word.
    pub async fn version(&mut self) -> Result<u16> {
        self.read_word(&registers::STAT_VERSION).await
    }

    /// Asks the part to refresh its telemetry registers now rather than on
    /// its own schedule.
    pub async fn request_telemetry_update(&mut self) -> Result<()> {
        self.write_byte(&registers::CTRL_UPDATE_TELEM, registers::UPDATE_TELEM_KEY).await
    }

    pub async fn set_charging_enabled(&mut self, enabled: bool) -> Result<()> {
        self.write_byte(&registers::CTRL_CHRG_EN, enabled as u8).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBus;

    #[tokio::test]
    async fn words_are_little_endian() {
        let mut bus = FakeBus::new();
        bus.set_word(registers::STAT_VERSION.address, 0x1234);
        let mut dev = Lt8491::new(bus, registers::DEFAULT_ADDRESS);
        assert_eq!(dev.version().await.unwrap(), 0x1234);

        dev.write_word(&registers::CFG_RSENSE1, 0xBEEF).await.unwrap();
        let bus = dev.release();
        assert_eq!(bus.byte(0x28), 0xEF);
        assert_eq!(bus.byte(0x29), 0xBE);
    }

    #[tokio::test]
    async fn wrong_address_is_a_transport_error() {
        let mut dev = Lt8491::new(FakeBus::new(), 0x11);
        match dev.read_byte(&registers::STAT_CHARGER).await {
            Err(Error::Transport { register, .. }) => assert_eq!(register, "STAT_CHARGER"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_transfer_times_out() {
        let mut bus = FakeBus::new();
        bus.stall(registers::TELE_VBAT.address);
        let mut dev = Lt8491::new(bus, registers::DEFAULT_ADDRESS).with_timeout(Duration::from_millis(50));
        match dev.read_word(&registers::TELE_VBAT).await {
            Err(Error::Timeout { register }) => assert_eq!(register, "TELE_VBAT"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn control_writes() {
        let mut dev = Lt8491::new(FakeBus::new(), registers::DEFAULT_ADDRESS);
        dev.request_telemetry_update().await.unwrap();
        dev.set_charging_enabled(false).await.unwrap();
        let bus = dev.release();
        assert_eq!(
            bus.writes(),
            &[(0x26, vec![registers::UPDATE_TELEM_KEY]), (0x23, vec![0])]
        );
    }
}
