pub mod i2c;
pub mod i3c;

use crate::errors::TransportResult;

/// Bus type enum for the interfaces a BMM350 can sit on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusType {
    I2C,
    I3C,
}

impl BusType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i2c" => Some(BusType::I2C),
            "i3c" => Some(BusType::I3C),
            _ => None,
        }
    }
}

/// Register access capability the sensor driver is built on.
///
/// `read` and `write` move raw bytes starting at a register address; any
/// protocol framing the sensor adds on top (dummy bytes, command sequencing)
/// is the driver's business. Implementations block until the transfer has
/// completed or failed.
pub trait Transport {
    fn read(&mut self, reg: u8, buf: &mut [u8]) -> TransportResult<()>;
    fn write(&mut self, reg: u8, data: &[u8]) -> TransportResult<()>;
    fn delay_us(&mut self, us: u32);
}
