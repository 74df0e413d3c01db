use super::{
    registers::{self, Register},
    Lt8491,
};
use crate::{
    error::{Error, Result},
    transport::Transport,
};
use log::{debug, info};

/// Sense and divider resistors fitted around the LT8491.
///
/// Values are in the unit of their register: milliohms for the sense
/// resistors, kiloohms for everything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub rsense1: f64,
    pub rimon_out: f64,
    pub rsense2: f64,
    pub rdaco: f64,
    pub rfbout1: f64,
    pub rfbout2: f64,
    pub rdaci: f64,
    pub rfbin2: f64,
    pub rfbin1: f64,
}

impl Default for Calibration {
    /// Reference board.
    fn default() -> Self {
        Calibration {
            rsense1: 5.0,
            rimon_out: 240.0,
            rsense2: 5.0,
            rdaco: 150.1,
            rfbout1: 274.0,
            rfbout2: 23.2,
            rdaci: 18.34,
            rfbin2: 7.32,
            rfbin1: 95.3,
        }
    }
}

/// Write order of the calibration block.
pub const REGISTERS: [Register; 9] = [
    registers::CFG_RSENSE1,
    registers::CFG_RIMON_OUT,
    registers::CFG_RSENSE2,
    registers::CFG_RDACO,
    registers::CFG_RFBOUT1,
    registers::CFG_RFBOUT2,
    registers::CFG_RDACI,
    registers::CFG_RFBIN2,
    registers::CFG_RFBIN1,
];

impl Calibration {
    fn values(&self) -> [f64; 9] {
        [
            self.rsense1,
            self.rimon_out,
            self.rsense2,
            self.rdaco,
            self.rfbout1,
            self.rfbout2,
            self.rdaci,
            self.rfbin2,
            self.rfbin1,
        ]
    }

    /// Register words in [`REGISTERS`] order.
    pub fn encode(&self) -> [u16; 9] {
        let mut words = [0u16; 9];
        for ((reg, value), word) in REGISTERS.iter().zip(self.values()).zip(words.iter_mut()) {
            *word = reg.scale.map(|s| s.encode(value)).unwrap_or(value as u16);
        }
        words
    }
}

/// What the part reports after calibration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationReadback {
    pub version: u16,
    pub boot_crc: u16,
    pub cfg_crc: u16,
    /// Read-back words paired with their register, in write order.
    pub values: Vec<(Register, u16)>,
}

impl<T: Transport> Lt8491<T> {
    /// Programs the calibration resistors and reads them back.
    ///
    /// Must not be interleaved with polling of the same part. Any read-back
    /// that differs from what was written is an [`Error::Configuration`].
    pub async fn configure(&mut self, cal: &Calibration) -> Result<CalibrationReadback> {
        let words = cal.encode();
        for (reg, word) in REGISTERS.iter().zip(words) {
            debug!("writing {} = 0x{:04X}", reg.name, word);
            self.write_word(reg, word).await?;
        }

        let version = self.version().await?;
        let boot_crc = self.read_word(&registers::STAT_BOOT_CRC).await?;
        let cfg_crc = self.read_word(&registers::STAT_CFG_CRC).await?;

        let mut values = Vec::with_capacity(REGISTERS.len());
        for (reg, written) in REGISTERS.iter().zip(words) {
            let read = self.read_word(reg).await?;
            debug!("read back {} = 0x{:04X}", reg.name, read);
            if read != written {
                return Err(Error::Configuration { register: reg.name, written, read });
            }
            values.push((*reg, read));
        }

        info!(
            "configured LT8491 at 0x{:02X}: version 0x{:04X}, boot crc 0x{:04X}, cfg crc 0x{:04X}",
            self.address, version, boot_crc, cfg_crc
        );
        Ok(CalibrationReadback { version, boot_crc, cfg_crc, values })
    }
}
