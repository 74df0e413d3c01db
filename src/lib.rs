//! Read, decode and report telemetry from LT8491 buck/boost MPPT battery
//! chargers over I2C.

pub mod error;
pub mod lt8491;
pub mod monitor;
pub mod report;
pub mod transport;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use lt8491::Lt8491;
