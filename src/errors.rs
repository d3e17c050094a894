use crate::bus::i3c::{BusStatus, I3cError};
use thiserror::Error;

/// Failures raised by the bus layer underneath the sensor driver
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("I2C transfer to {address:#04x} failed: {kind:?}")]
    I2c {
        address: u8,
        kind: embedded_hal::i2c::ErrorKind,
    },

    #[error("I3C transfer failed: {0}")]
    I3c(#[from] I3cError),

    #[error("I3C bus did not report {expected:?} within {timeout_us}us")]
    BusTimeout { expected: BusStatus, timeout_us: u32 },

    #[error("write of {len} bytes exceeds the {max}-byte transfer buffer")]
    WriteTooLong { len: usize, max: usize },
}

/// Status codes reported by the BMM350 driver itself
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    #[error("BMM350 not found: chip id {actual:#04x}, expected {expected:#04x}")]
    DevNotFound { expected: u8, actual: u8 },

    #[error("invalid ODR/averaging combination")]
    InvalidConfig,

    #[error("invalid input: {reason}")]
    InvalidInput { reason: &'static str },

    #[error("unknown PMU command value {0}")]
    PmuCmdValue(u8),
}

impl DriverError {
    /// Numeric status as reported by the vendor driver.
    pub fn code(&self) -> i8 {
        match self {
            DriverError::DevNotFound { .. } => -3,
            DriverError::InvalidConfig => -4,
            DriverError::InvalidInput { .. } => -7,
            DriverError::PmuCmdValue(_) => -16,
        }
    }
}

/// Unified result type for every public adapter operation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bmm350Error {
    #[error("bus communication failed: {0}")]
    Transport(#[from] TransportError),

    #[error("sensor driver error {code}: {0}", code = .0.code())]
    Driver(#[from] DriverError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type aliases for convenience
pub type TransportResult<T> = Result<T, TransportError>;
pub type Bmm350Result<T> = Result<T, Bmm350Error>;
pub type ConfigResult<T> = Result<T, ConfigError>;
