use crate::transport::BoxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bus error on {register}: {source}")]
    Transport {
        register: &'static str,
        #[source]
        source: BoxError,
    },
    #[error("timed out accessing {register}")]
    Timeout { register: &'static str },
    #[error("{register} read back 0x{read:04X}, wrote 0x{written:04X}")]
    Configuration {
        register: &'static str,
        written: u16,
        read: u16,
    },
}

impl Error {
    pub fn register(&self) -> &'static str {
        match self {
            Error::Transport { register, .. }
            | Error::Timeout { register }
            | Error::Configuration { register, .. } => *register,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
