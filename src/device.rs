use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use tracing::{debug, info};

use crate::bootstrap;
use crate::bus::i2c::I2cTransport;
use crate::bus::i3c::{I3cController, I3cTarget, I3cTiming, I3cTransport};
use crate::errors::Bmm350Result;
use crate::sensors::registers::{CMD_SOFTRESET, REG_CMD};
use crate::sensors::{
    Averaging, Bmm350, Bmm350Address, DataRate, MagTempData, SelfTestResult, SensorApi,
};

/// Settle time after a soft reset before the device answers again
pub const SOFT_RESET_SETTLE_US: u32 = 300;

/// Marker for a handle without an interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoPin;

/// What `free` hands back to the caller
pub struct Released<T, P> {
    pub transport: T,
    pub interrupt_pin: Option<P>,
}

/// A BMM350 bound to one bus.
///
/// Each handle owns its transport, so several sensors can be driven side by
/// side as long as each has its own bus or controller handle.
pub struct Magnetometer<S, P = NoPin> {
    sensor: S,
    interrupt_pin: Option<P>,
}

impl<S: SensorApi> Magnetometer<S> {
    /// Wrap a driver without touching the device
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            interrupt_pin: None,
        }
    }

    /// Wrap a driver and run the bootstrap sequence on it
    pub fn bootstrap(mut sensor: S) -> Bmm350Result<Self> {
        bootstrap::run(&mut sensor)?;
        Ok(Self::new(sensor))
    }

    /// Attach the line the sensor's INT output is wired to
    pub fn with_interrupt_pin<P>(self, pin: P) -> Magnetometer<S, P> {
        Magnetometer {
            sensor: self.sensor,
            interrupt_pin: Some(pin),
        }
    }
}

impl<I2C, D> Magnetometer<Bmm350<I2cTransport<I2C, D>>>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn init_i2c(bus: I2C, delay: D, address: Bmm350Address) -> Bmm350Result<Self> {
        info!("[bmm350] initializing over I2C at {:#04x}", address.as_u8());
        let transport = I2cTransport::new(bus, delay, address.as_u8());
        Self::bootstrap(Bmm350::new(transport))
    }
}

impl<C, D> Magnetometer<Bmm350<I3cTransport<C, D>>>
where
    C: I3cController,
    D: DelayNs,
{
    pub fn init_i3c(
        controller: C,
        delay: D,
        target: I3cTarget,
        timing: I3cTiming,
    ) -> Bmm350Result<Self> {
        info!(
            "[bmm350] initializing over I3C, static {:#04x} -> dynamic {:#04x}",
            target.static_address, target.dynamic_address
        );
        let mut sensor = Bmm350::new(I3cTransport::new(controller, delay, target, timing));
        enumerate_with_reset(&mut sensor)?;
        Self::bootstrap(sensor)
    }
}

impl<C, D, P> Magnetometer<Bmm350<I3cTransport<C, D>>, P>
where
    C: I3cController,
    D: DelayNs,
{
    /// Enumerate the target again and rerun the bootstrap, e.g. after a
    /// self-test left the device freshly reset.
    pub fn reinit(&mut self) -> Bmm350Result<()> {
        enumerate_with_reset(&mut self.sensor)?;
        bootstrap::run(&mut self.sensor)
    }
}

/// Assign a dynamic address, soft-reset the device and assign it again.
///
/// The driver only talks to the target on the address handed out by the
/// second ENTDAA.
fn enumerate_with_reset<C, D>(sensor: &mut Bmm350<I3cTransport<C, D>>) -> Bmm350Result<()>
where
    C: I3cController,
    D: DelayNs,
{
    sensor.transport_mut().assign_dynamic_address()?;

    sensor.set_regs(REG_CMD, &[CMD_SOFTRESET])?;
    sensor.delay_us(SOFT_RESET_SETTLE_US);

    sensor.transport_mut().assign_dynamic_address()?;
    Ok(())
}

impl<S: SensorApi, P> Magnetometer<S, P> {
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn read(&mut self) -> Bmm350Result<MagTempData> {
        self.sensor.get_compensated_mag_xyz_temp_data()
    }

    pub fn set_odr_performance(&mut self, odr: DataRate, averaging: Averaging) -> Bmm350Result<()> {
        self.sensor.set_odr_performance(odr, averaging)
    }

    /// Run the on-chip self-test.
    ///
    /// The test soft-resets the sensor, so the handle must be bootstrapped
    /// again (`rebootstrap`, or `reinit` on I3C) before the next `read`.
    pub fn selftest(&mut self) -> Bmm350Result<SelfTestResult> {
        let result = self.sensor.perform_self_test();
        self.sensor.delay_us(SOFT_RESET_SETTLE_US);
        result
    }

    /// Rerun the bootstrap sequence on the bound sensor
    pub fn rebootstrap(&mut self) -> Bmm350Result<()> {
        bootstrap::run(&mut self.sensor)
    }

    /// Tear the handle down, returning the transport and any bound pin
    pub fn free(self) -> Released<S::Transport, P> {
        if self.interrupt_pin.is_some() {
            debug!("[bmm350] releasing interrupt pin");
        }
        Released {
            transport: self.sensor.release(),
            interrupt_pin: self.interrupt_pin,
        }
    }
}
