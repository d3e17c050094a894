//! Host platform bindings for the bus traits the adapters are generic over.
//!
//! On Linux the kernel's `/dev/i2c-N` character devices and a sleeping delay
//! provider stand in for an MCU peripheral driver.

#[cfg(feature = "linux-hal")]
pub mod linux {
    pub use linux_embedded_hal::i2cdev::linux::LinuxI2CError as I2CError;
    pub use linux_embedded_hal::Delay;
    pub use linux_embedded_hal::I2cdev as I2CDevice;

    /// Open an I2C character device, e.g. `/dev/i2c-1`
    pub fn open_i2c(path: &str) -> Result<I2CDevice, I2CError> {
        I2CDevice::new(path)
    }
}

#[cfg(feature = "linux-hal")]
pub use linux::*;
