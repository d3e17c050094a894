use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, I2c};
use tracing::trace;

use super::Transport;
use crate::errors::{TransportError, TransportResult};

/// Register pointer plus payload of one memory write
pub const I2C_WRITE_BUFFER_LEN: usize = 32;

/// Blocking I2C transport for a device at a fixed 7-bit address
pub struct I2cTransport<I2C, D> {
    bus: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D> I2cTransport<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(bus: I2C, delay: D, address: u8) -> Self {
        Self { bus, delay, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Hand the bus and delay provider back to the caller
    pub fn release(self) -> (I2C, D) {
        (self.bus, self.delay)
    }

    fn bus_error(&self, e: I2C::Error) -> TransportError {
        TransportError::I2c {
            address: self.address,
            kind: e.kind(),
        }
    }
}

impl<I2C, D> Transport for I2cTransport<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn read(&mut self, reg: u8, buf: &mut [u8]) -> TransportResult<()> {
        trace!("[i2c] read {} byte(s) from {:#04x}:{:#04x}", buf.len(), self.address, reg);
        self.bus
            .write_read(self.address, &[reg], buf)
            .map_err(|e| self.bus_error(e))
    }

    fn write(&mut self, reg: u8, data: &[u8]) -> TransportResult<()> {
        let len = data.len() + 1;
        if len > I2C_WRITE_BUFFER_LEN {
            return Err(TransportError::WriteTooLong {
                len,
                max: I2C_WRITE_BUFFER_LEN,
            });
        }

        let mut frame = [0u8; I2C_WRITE_BUFFER_LEN];
        frame[0] = reg;
        frame[1..len].copy_from_slice(data);

        trace!("[i2c] write {} byte(s) to {:#04x}:{:#04x}", data.len(), self.address, reg);
        self.bus
            .write(self.address, &frame[..len])
            .map_err(|e| self.bus_error(e))
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
