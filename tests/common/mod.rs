//! Simulated BMM350 and bus doubles shared by the integration tests.
//!
//! `SimBmm350` is a register file with the sensor's read framing (two dummy
//! bytes), soft reset, and PMU status tracking. `SimI2cBus` and
//! `SimI3cController` put it behind the two bus APIs and record every
//! transfer into a shared `EventLog`, together with the delays requested
//! through `RecordingDelay`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use bmm350_transport::bus::i3c::{
    BusStatus, CccCommand, I3cController, I3cError, I3cTarget, CCC_RSTDAA,
};
use bmm350_transport::sensors::registers::*;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    I2cMemRead { address: u8, reg: u8, len: usize },
    I2cMemWrite { address: u8, reg: u8, data: Vec<u8> },
    Ccc(u8),
    Attach(u8),
    Entdaa,
    I3cRead { address: u8, reg: u8, len: usize },
    I3cWrite { address: u8, reg: u8, data: Vec<u8> },
    Resume,
    Delay(u32),
}

impl Event {
    pub fn is_handshake(&self) -> bool {
        matches!(self, Event::Ccc(_) | Event::Attach(_) | Event::Entdaa)
    }
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Raw counts 10000, -10000, 5000 and 65536 for x, y, z and temperature
pub const CANNED_DATA: [u8; 12] = [
    0x10, 0x27, 0x00, //
    0xF0, 0xD8, 0xFF, //
    0x88, 0x13, 0x00, //
    0x00, 0x00, 0x01, //
];

pub fn assert_canned_sample(sample: &bmm350_transport::MagTempData) {
    assert!((sample.x - 70.70).abs() < 0.05, "x = {}", sample.x);
    assert!((sample.y + 70.70).abs() < 0.05, "y = {}", sample.y);
    assert!((sample.z - 35.87).abs() < 0.05, "z = {}", sample.z);
    assert!((sample.temperature - 38.82).abs() < 0.05, "t = {}", sample.temperature);
}

pub struct SimBmm350 {
    regs: [u8; 128],
    chip_id: u8,
    pub soft_resets: usize,
}

impl SimBmm350 {
    pub fn new() -> Self {
        let mut sim = Self {
            regs: [0u8; 128],
            chip_id: CHIP_ID,
            soft_resets: 0,
        };
        let data = REG_MAG_X_XLSB as usize;
        sim.regs[data..data + CANNED_DATA.len()].copy_from_slice(&CANNED_DATA);
        sim.power_on();
        sim
    }

    pub fn with_chip_id(mut self, chip_id: u8) -> Self {
        self.chip_id = chip_id;
        self.power_on();
        self
    }

    pub fn shared(self) -> Rc<RefCell<SimBmm350>> {
        Rc::new(RefCell::new(self))
    }

    /// Configuration registers back to reset values; data registers survive
    fn power_on(&mut self) {
        for reg in self.regs[..REG_INT_STATUS as usize].iter_mut() {
            *reg = 0;
        }
        self.regs[REG_TMR_SELFTEST_USER as usize] = 0;
        self.regs[REG_CHIP_ID as usize] = self.chip_id;
    }

    pub fn reg(&self, reg: u8) -> u8 {
        self.regs[reg as usize]
    }

    pub fn read_into(&self, reg: u8, buf: &mut [u8]) {
        for (i, b) in buf.iter_mut().enumerate() {
            *b = if i < DUMMY_BYTES {
                0xFF
            } else {
                self.regs[reg as usize + i - DUMMY_BYTES]
            };
        }
    }

    pub fn write(&mut self, reg: u8, data: &[u8]) {
        for (i, &value) in data.iter().enumerate() {
            let r = reg as usize + i;
            if r == REG_CMD as usize && value == CMD_SOFTRESET {
                self.soft_resets += 1;
                self.power_on();
                continue;
            }
            self.regs[r] = value;
            if r == REG_PMU_CMD as usize {
                let normal = if value == PMU_CMD_NM { 0x08 } else { 0x00 };
                self.regs[REG_PMU_CMD_STATUS_0 as usize] = ((value & 0x07) << 5) | normal;
            }
        }
    }
}

pub struct SimI2cBus {
    pub address: u8,
    sensor: Rc<RefCell<SimBmm350>>,
    log: EventLog,
}

impl SimI2cBus {
    pub fn new(address: u8, sensor: Rc<RefCell<SimBmm350>>, log: EventLog) -> Self {
        Self { address, sensor, log }
    }
}

impl ErrorType for SimI2cBus {
    type Error = ErrorKind;
}

impl I2c for SimI2cBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), ErrorKind> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        match operations {
            [Operation::Write(reg), Operation::Read(buf)] if reg.len() == 1 => {
                self.log.borrow_mut().push(Event::I2cMemRead {
                    address,
                    reg: reg[0],
                    len: buf.len(),
                });
                self.sensor.borrow().read_into(reg[0], buf);
                Ok(())
            }
            [Operation::Write(frame)] if !frame.is_empty() => {
                self.log.borrow_mut().push(Event::I2cMemWrite {
                    address,
                    reg: frame[0],
                    data: frame[1..].to_vec(),
                });
                self.sensor.borrow_mut().write(frame[0], &frame[1..]);
                Ok(())
            }
            _ => Err(ErrorKind::Other),
        }
    }
}

/// I3C controller in front of the simulated sensor.
///
/// The sensor only answers on its dynamic address, which it gets from
/// ENTDAA after being attached and loses on RSTDAA.
pub struct SimI3cController {
    sensor: Rc<RefCell<SimBmm350>>,
    log: EventLog,
    attached: Option<I3cTarget>,
    assigned: Option<u8>,
    pointer: u8,
    status: BusStatus,
    handshake_calls: usize,
    /// Fail the n-th RSTDAA/attach/ENTDAA call, counting from zero
    pub fail_handshake_call: Option<usize>,
    pub fail_writes: bool,
    pub wedged: bool,
}

impl SimI3cController {
    pub fn new(sensor: Rc<RefCell<SimBmm350>>, log: EventLog) -> Self {
        Self {
            sensor,
            log,
            attached: None,
            assigned: None,
            pointer: 0,
            status: BusStatus::Idle,
            handshake_calls: 0,
            fail_handshake_call: None,
            fail_writes: false,
            wedged: false,
        }
    }

    pub fn dynamic_address(&self) -> Option<u8> {
        self.assigned
    }

    fn handshake_step(&mut self, event: Event) -> Result<(), I3cError> {
        self.log.borrow_mut().push(event);
        let call = self.handshake_calls;
        self.handshake_calls += 1;
        if self.fail_handshake_call == Some(call) {
            return Err(I3cError::DaaFailed);
        }
        Ok(())
    }

    fn check_target(&self, address: u8) -> Result<(), I3cError> {
        if self.assigned != Some(address) {
            return Err(I3cError::Nack);
        }
        Ok(())
    }
}

impl I3cController for SimI3cController {
    fn send_ccc(&mut self, cmd: &CccCommand<'_>) -> Result<(), I3cError> {
        self.handshake_step(Event::Ccc(cmd.code))?;
        if cmd.code == CCC_RSTDAA {
            self.assigned = None;
        }
        Ok(())
    }

    fn attach_device(&mut self, target: &I3cTarget) -> Result<(), I3cError> {
        self.handshake_step(Event::Attach(target.static_address))?;
        self.attached = Some(*target);
        Ok(())
    }

    fn start_entdaa(&mut self) -> Result<(), I3cError> {
        self.handshake_step(Event::Entdaa)?;
        let target = self.attached.ok_or(I3cError::DaaFailed)?;
        self.assigned = Some(target.dynamic_address);
        Ok(())
    }

    fn write_byte(&mut self, address: u8, byte: u8) -> Result<(), I3cError> {
        self.check_target(address)?;
        self.pointer = byte;
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8], _stop: bool) -> Result<(), I3cError> {
        self.check_target(address)?;
        self.log.borrow_mut().push(Event::I3cRead {
            address,
            reg: self.pointer,
            len: buf.len(),
        });
        self.sensor.borrow().read_into(self.pointer, buf);
        self.status = BusStatus::ReadComplete;
        Ok(())
    }

    fn write(&mut self, address: u8, data: &[u8], _stop: bool) -> Result<(), I3cError> {
        self.log.borrow_mut().push(Event::I3cWrite {
            address,
            reg: data[0],
            data: data[1..].to_vec(),
        });
        if self.fail_writes {
            return Err(I3cError::Status(0x0000_0200));
        }
        self.check_target(address)?;
        self.sensor.borrow_mut().write(data[0], &data[1..]);
        self.status = BusStatus::WriteComplete;
        Ok(())
    }

    fn bus_status(&mut self) -> BusStatus {
        if self.wedged {
            return BusStatus::Busy;
        }
        self.status
    }

    fn resume(&mut self) {
        self.log.borrow_mut().push(Event::Resume);
    }
}

/// Delay provider that records the requested durations instead of sleeping
pub struct RecordingDelay {
    log: EventLog,
}

impl RecordingDelay {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.borrow_mut().push(Event::Delay(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(Event::Delay(us));
    }
}
