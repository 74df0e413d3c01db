//! Register bus access.
//!
//! The LT8491 speaks SMBus: a transfer is a command byte followed by one or
//! more data bytes. [`Transport`] is the seam between the device logic and
//! whatever carries those bytes. [`BlockingBus`] adapts any blocking
//! `embedded-hal` I2C implementation, running each transfer on tokio's
//! blocking pool so the caller can bound it with a timeout.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: BoxError,
    },
    #[error("i2c transfer failed: {0:?}")]
    I2c(ErrorKind),
    #[error("bus worker failed: {0}")]
    Worker(String),
}

/// Byte level access to a register-addressed bus.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reads `buf.len()` bytes starting at `command` from the device at `address`.
    async fn read(&mut self, address: u8, command: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `data` starting at `command` to the device at `address`.
    async fn write(&mut self, address: u8, command: u8, data: &[u8]) -> Result<(), Self::Error>;
}

/// A blocking `embedded-hal` bus shared with the blocking pool.
pub struct BlockingBus<I> {
    bus: Arc<Mutex<I>>,
}

impl<I> Clone for BlockingBus<I> {
    fn clone(&self) -> Self {
        BlockingBus { bus: Arc::clone(&self.bus) }
    }
}

impl<I> BlockingBus<I>
where
    I: I2c + Send + 'static,
{
    pub fn new(bus: I) -> Self {
        BlockingBus { bus: Arc::new(Mutex::new(bus)) }
    }

    async fn run<T, F>(&self, f: F) -> Result<T, BusError>
    where
        T: Send + 'static,
        F: FnOnce(&mut I) -> Result<T, I::Error> + Send + 'static,
    {
        let bus = Arc::clone(&self.bus);
        tokio::task::spawn_blocking(move || {
            let mut bus = bus.lock().map_err(|e| BusError::Worker(e.to_string()))?;
            f(&mut *bus).map_err(|e| BusError::I2c(e.kind()))
        })
        .await
        .map_err(|e| BusError::Worker(e.to_string()))?
    }
}

/// The Linux i2c-dev character device, e.g. `/dev/i2c-0`.
pub type LinuxI2c = BlockingBus<linux_embedded_hal::I2cdev>;

impl LinuxI2c {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<LinuxI2c, BusError> {
        let path = path.as_ref();
        let dev = linux_embedded_hal::I2cdev::new(path).map_err(|e| BusError::Open {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        Ok(BlockingBus::new(dev))
    }
}

impl<I> Transport for BlockingBus<I>
where
    I: I2c + Send + 'static,
{
    type Error = BusError;

    async fn read(&mut self, address: u8, command: u8, buf: &mut [u8]) -> Result<(), BusError> {
        let len = buf.len();
        let data = self
            .run(move |bus| {
                let mut data = vec![0u8; len];
                bus.write_read(address, &[command], &mut data)?;
                Ok(data)
            })
            .await?;
        buf.copy_from_slice(&data);
        Ok(())
    }

    async fn write(&mut self, address: u8, command: u8, data: &[u8]) -> Result<(), BusError> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(command);
        frame.extend_from_slice(data);
        self.run(move |bus| bus.write(address, &frame)).await
    }
}
