use embedded_hal::delay::DelayNs;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::Transport;
use crate::errors::{TransportError, TransportResult};

/// Broadcast address used for common command codes
pub const I3C_BROADCAST_ADDR: u8 = 0x7E;
/// RSTDAA, broadcast form
pub const CCC_RSTDAA: u8 = 0x06;

/// I3C controller error type
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum I3cError {
    #[error("target did not acknowledge")]
    Nack,

    #[error("controller busy")]
    Busy,

    #[error("dynamic address assignment failed")]
    DaaFailed,

    #[error("controller status {0:#010x}")]
    Status(u32),
}

/// Controller state as reported by its status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStatus {
    Idle,
    Busy,
    ReadComplete,
    WriteComplete,
}

/// A common command code transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CccCommand<'a> {
    pub address: u8,
    pub code: u8,
    pub payload: &'a [u8],
}

impl CccCommand<'static> {
    /// RSTDAA to every device on the bus
    pub const fn reset_dynamic_addresses() -> Self {
        Self {
            address: I3C_BROADCAST_ADDR,
            code: CCC_RSTDAA,
            payload: &[],
        }
    }
}

/// Target descriptor handed to the controller on attach.
///
/// `dynamic_address` is the address the controller hands out during ENTDAA
/// and the one every register transfer is addressed to afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I3cTarget {
    pub static_address: u8,
    pub dynamic_address: u8,
}

/// Bus-status wait parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I3cTiming {
    pub poll_interval_us: u32,
    pub timeout_us: u32,
}

impl Default for I3cTiming {
    fn default() -> Self {
        Self {
            poll_interval_us: 10,
            timeout_us: 10_000,
        }
    }
}

/// Peripheral primitives of an I3C controller
pub trait I3cController {
    fn send_ccc(&mut self, cmd: &CccCommand<'_>) -> Result<(), I3cError>;
    fn attach_device(&mut self, target: &I3cTarget) -> Result<(), I3cError>;
    fn start_entdaa(&mut self) -> Result<(), I3cError>;

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), I3cError>;
    /// Start a private read; `stop` terminates the transfer on completion
    fn read(&mut self, address: u8, buf: &mut [u8], stop: bool) -> Result<(), I3cError>;
    fn write(&mut self, address: u8, data: &[u8], stop: bool) -> Result<(), I3cError>;

    fn bus_status(&mut self) -> BusStatus;
    /// Kick a stalled controller back into operation
    fn resume(&mut self);
}

/// Lets a caller lend the controller to a transport and keep it when
/// initialization fails.
impl<T: I3cController + ?Sized> I3cController for &mut T {
    fn send_ccc(&mut self, cmd: &CccCommand<'_>) -> Result<(), I3cError> {
        T::send_ccc(self, cmd)
    }

    fn attach_device(&mut self, target: &I3cTarget) -> Result<(), I3cError> {
        T::attach_device(self, target)
    }

    fn start_entdaa(&mut self) -> Result<(), I3cError> {
        T::start_entdaa(self)
    }

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), I3cError> {
        T::write_byte(self, address, byte)
    }

    fn read(&mut self, address: u8, buf: &mut [u8], stop: bool) -> Result<(), I3cError> {
        T::read(self, address, buf, stop)
    }

    fn write(&mut self, address: u8, data: &[u8], stop: bool) -> Result<(), I3cError> {
        T::write(self, address, data, stop)
    }

    fn bus_status(&mut self) -> BusStatus {
        T::bus_status(self)
    }

    fn resume(&mut self) {
        T::resume(self)
    }
}

/// I3C transport for one attached target
pub struct I3cTransport<C, D> {
    controller: C,
    delay: D,
    target: I3cTarget,
    timing: I3cTiming,
}

impl<C, D> I3cTransport<C, D>
where
    C: I3cController,
    D: DelayNs,
{
    pub fn new(controller: C, delay: D, target: I3cTarget, timing: I3cTiming) -> Self {
        Self {
            controller,
            delay,
            target,
            timing,
        }
    }

    pub fn target(&self) -> &I3cTarget {
        &self.target
    }

    /// Hand the controller and delay provider back to the caller
    pub fn release(self) -> (C, D) {
        (self.controller, self.delay)
    }

    /// Reset all dynamic addresses, attach the target and run ENTDAA.
    ///
    /// Stops at the first failing step.
    pub fn assign_dynamic_address(&mut self) -> TransportResult<()> {
        debug!("[i3c] broadcasting RSTDAA");
        self.controller
            .send_ccc(&CccCommand::reset_dynamic_addresses())?;

        debug!(
            "[i3c] attaching target static={:#04x} dynamic={:#04x}",
            self.target.static_address, self.target.dynamic_address
        );
        self.controller.attach_device(&self.target)?;

        debug!("[i3c] starting ENTDAA");
        self.controller.start_entdaa()?;

        Ok(())
    }

    fn wait_for(&mut self, expected: BusStatus) -> TransportResult<()> {
        let interval = self.timing.poll_interval_us.max(1);
        let mut waited_us = 0u32;

        loop {
            if self.controller.bus_status() == expected {
                return Ok(());
            }
            if waited_us >= self.timing.timeout_us {
                warn!(
                    "[i3c] bus did not reach {:?} after {}us",
                    expected, self.timing.timeout_us
                );
                return Err(TransportError::BusTimeout {
                    expected,
                    timeout_us: self.timing.timeout_us,
                });
            }
            self.delay.delay_us(interval);
            waited_us = waited_us.saturating_add(interval);
        }
    }

    fn resume_after(&mut self, e: I3cError) -> TransportError {
        warn!("[i3c] transfer failed ({}), resuming controller", e);
        self.controller.resume();
        TransportError::I3c(e)
    }
}

impl<C, D> Transport for I3cTransport<C, D>
where
    C: I3cController,
    D: DelayNs,
{
    fn read(&mut self, reg: u8, buf: &mut [u8]) -> TransportResult<()> {
        let address = self.target.dynamic_address;
        trace!("[i3c] read {} byte(s) from {:#04x}:{:#04x}", buf.len(), address, reg);

        self.controller
            .write_byte(address, reg)
            .map_err(|e| self.resume_after(e))?;
        self.controller
            .read(address, buf, true)
            .map_err(|e| self.resume_after(e))?;

        self.wait_for(BusStatus::ReadComplete)
    }

    fn write(&mut self, reg: u8, data: &[u8]) -> TransportResult<()> {
        let address = self.target.dynamic_address;
        trace!("[i3c] write {} byte(s) to {:#04x}:{:#04x}", data.len(), address, reg);

        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(reg);
        frame.extend_from_slice(data);

        self.controller
            .write(address, &frame, false)
            .map_err(|e| self.resume_after(e))?;

        self.wait_for(BusStatus::WriteComplete)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
