use tracing::{debug, info};

use crate::errors::Bmm350Result;
use crate::sensors::registers::{REG_ERR_REG, REG_INT_CTRL};
use crate::sensors::{
    AxisEnable, Averaging, DataRate, InterruptConfig, InterruptEnable, PowerMode, SensorApi,
};

pub const DEFAULT_ODR: DataRate = DataRate::Hz25;
pub const DEFAULT_AVERAGING: Averaging = Averaging::Avg8;

/// Bring a freshly bound sensor into continuous measurement.
///
/// The steps run in a fixed order and the first failure is returned as is;
/// nothing already written to the device is rolled back.
pub fn run<S: SensorApi>(sensor: &mut S) -> Bmm350Result<()> {
    sensor.init()?;

    let pmu = sensor.get_pmu_cmd_status_0()?;
    debug!("[bootstrap] PMU status after init: {:?}", pmu);

    let mut err_reg = [0u8; 1];
    sensor.get_regs(REG_ERR_REG, &mut err_reg)?;
    debug!("[bootstrap] ERR_REG = {:#04x}", err_reg[0]);

    sensor.configure_interrupt(InterruptConfig::default())?;
    sensor.enable_interrupt(InterruptEnable::Enable)?;

    let mut int_ctrl = [0u8; 1];
    sensor.get_regs(REG_INT_CTRL, &mut int_ctrl)?;
    debug!("[bootstrap] INT_CTRL = {:#04x}", int_ctrl[0]);

    sensor.set_odr_performance(DEFAULT_ODR, DEFAULT_AVERAGING)?;
    sensor.enable_axes(AxisEnable::all())?;
    sensor.set_powermode(PowerMode::Normal)?;

    info!("[bootstrap] sensor running at {:?} with {:?}", DEFAULT_ODR, DEFAULT_AVERAGING);
    Ok(())
}
