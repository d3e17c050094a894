// Public modules
pub mod bootstrap;
pub mod bus;
pub mod config;
pub mod device;
pub mod errors;
pub mod hal;
pub mod sensors;

// Re-export commonly used types
pub use bus::i2c::I2cTransport;
pub use bus::i3c::{BusStatus, I3cController, I3cError, I3cTarget, I3cTiming, I3cTransport};
pub use bus::{BusType, Transport};
pub use config::{load_device_config, DeviceConfig};
pub use device::{Magnetometer, NoPin, Released, SOFT_RESET_SETTLE_US};
pub use errors::{Bmm350Error, Bmm350Result, ConfigError, DriverError, TransportError};
pub use sensors::{Averaging, Bmm350, Bmm350Address, DataRate, MagTempData, SensorApi};

use tracing_subscriber::EnvFilter;

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}
