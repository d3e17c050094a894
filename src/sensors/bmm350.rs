use tracing::{debug, trace};

use super::registers::*;
use super::{
    AxisEnable, Averaging, DataRate, InterruptConfig, InterruptDrive, InterruptEnable,
    InterruptLatch, InterruptMap, InterruptPolarity, MagTempData, PmuCmdStatus0, PowerMode,
    SelfTestResult, SensorApi,
};
use crate::bus::Transport;
use crate::errors::{Bmm350Result, DriverError};

/// Register-level BMM350 driver on top of any [`Transport`]
pub struct Bmm350<T> {
    transport: T,
    chip_id: u8,
}

impl<T: Transport> Bmm350<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            chip_id: 0,
        }
    }

    /// Chip id read back by the last successful `init`
    pub fn chip_id(&self) -> u8 {
        self.chip_id
    }

    fn soft_reset(&mut self) -> Bmm350Result<()> {
        self.set_regs(REG_CMD, &[CMD_SOFTRESET])?;
        self.transport.delay_us(SOFT_RESET_DELAY_US);
        Ok(())
    }

    fn pmu_cmd(&mut self, cmd: u8, settle_us: u32) -> Bmm350Result<()> {
        self.set_regs(REG_PMU_CMD, &[cmd])?;
        self.transport.delay_us(settle_us);
        Ok(())
    }

    /// Bit reset followed by flux-guide reset
    fn magnetic_reset(&mut self) -> Bmm350Result<()> {
        self.pmu_cmd(PMU_CMD_BR, BR_DELAY_US)?;
        self.pmu_cmd(PMU_CMD_FGR, FGR_DELAY_US)
    }

    fn averaging(&mut self) -> Bmm350Result<Averaging> {
        let mut aggr = [0u8; 1];
        self.get_regs(REG_PMU_CMD_AGGR_SET, &mut aggr)?;
        Ok(Averaging::from_bits(aggr[0] >> 4))
    }

    fn self_test_measure(&mut self, coil: u8) -> Bmm350Result<MagTempData> {
        self.set_regs(REG_TMR_SELFTEST_USER, &[coil])?;
        self.set_powermode(PowerMode::ForcedFast)?;
        self.get_compensated_mag_xyz_temp_data()
    }
}

pub(crate) fn validate_odr_performance(
    odr: DataRate,
    averaging: Averaging,
) -> Result<(), DriverError> {
    let too_slow = match odr {
        DataRate::Hz400 => averaging >= Averaging::Avg2,
        DataRate::Hz200 => averaging >= Averaging::Avg4,
        DataRate::Hz100 => averaging >= Averaging::Avg8,
        _ => false,
    };
    if too_slow {
        return Err(DriverError::InvalidConfig);
    }
    Ok(())
}

fn sign_extend_24(bytes: &[u8]) -> i32 {
    let raw = i32::from(bytes[0]) | (i32::from(bytes[1]) << 8) | (i32::from(bytes[2]) << 16);
    (raw << 8) >> 8
}

/// Scale raw counts and remove the datasheet temperature offset
pub fn compensate(raw: [i32; 4]) -> MagTempData {
    let temp = raw[3] as f32 * LSB_TO_DEGC;
    let temperature = if temp > 0.0 {
        temp - TEMP_OFFSET_DEGC
    } else if temp < 0.0 {
        temp + TEMP_OFFSET_DEGC
    } else {
        temp
    };

    MagTempData {
        x: raw[0] as f32 * LSB_TO_UT_XY,
        y: raw[1] as f32 * LSB_TO_UT_XY,
        z: raw[2] as f32 * LSB_TO_UT_Z,
        temperature,
    }
}

impl<T: Transport> SensorApi for Bmm350<T> {
    type Transport = T;

    fn init(&mut self) -> Bmm350Result<()> {
        self.soft_reset()?;

        let mut chip_id = [0u8; 1];
        self.get_regs(REG_CHIP_ID, &mut chip_id)?;
        if chip_id[0] != CHIP_ID {
            return Err(DriverError::DevNotFound {
                expected: CHIP_ID,
                actual: chip_id[0],
            }
            .into());
        }
        self.chip_id = chip_id[0];
        debug!("[bmm350] chip id {:#04x} verified", self.chip_id);

        self.set_regs(REG_OTP_CMD_REG, &[OTP_CMD_PWR_OFF_OTP])?;
        self.magnetic_reset()
    }

    fn get_regs(&mut self, reg: u8, buf: &mut [u8]) -> Bmm350Result<()> {
        if buf.len() > MAX_READ_LEN {
            return Err(DriverError::InvalidInput {
                reason: "register read longer than 32 bytes",
            }
            .into());
        }

        let mut wire = [0u8; DUMMY_BYTES + MAX_READ_LEN];
        let len = DUMMY_BYTES + buf.len();
        self.transport.read(reg, &mut wire[..len])?;
        buf.copy_from_slice(&wire[DUMMY_BYTES..len]);
        Ok(())
    }

    fn set_regs(&mut self, reg: u8, data: &[u8]) -> Bmm350Result<()> {
        self.transport.write(reg, data)?;
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.transport.delay_us(us);
    }

    fn configure_interrupt(&mut self, config: InterruptConfig) -> Bmm350Result<()> {
        let mut int_ctrl = [0u8; 1];
        self.get_regs(REG_INT_CTRL, &mut int_ctrl)?;

        let mut value = int_ctrl[0]
            & !(INT_CTRL_LATCHED | INT_CTRL_ACTIVE_HIGH | INT_CTRL_PUSH_PULL | INT_CTRL_MAP_TO_PIN);
        if config.latch == InterruptLatch::Latched {
            value |= INT_CTRL_LATCHED;
        }
        if config.polarity == InterruptPolarity::ActiveHigh {
            value |= INT_CTRL_ACTIVE_HIGH;
        }
        if config.drive == InterruptDrive::PushPull {
            value |= INT_CTRL_PUSH_PULL;
        }
        if config.map == InterruptMap::MapToPin {
            value |= INT_CTRL_MAP_TO_PIN;
        }

        self.set_regs(REG_INT_CTRL, &[value])
    }

    fn enable_interrupt(&mut self, enable: InterruptEnable) -> Bmm350Result<()> {
        let mut int_ctrl = [0u8; 1];
        self.get_regs(REG_INT_CTRL, &mut int_ctrl)?;

        let value = match enable {
            InterruptEnable::Enable => int_ctrl[0] | INT_CTRL_DRDY_EN,
            InterruptEnable::Disable => int_ctrl[0] & !INT_CTRL_DRDY_EN,
        };
        self.set_regs(REG_INT_CTRL, &[value])
    }

    fn set_odr_performance(&mut self, odr: DataRate, averaging: Averaging) -> Bmm350Result<()> {
        validate_odr_performance(odr, averaging)?;

        let aggr = (odr as u8 & 0x0F) | ((averaging as u8 & 0x03) << 4);
        trace!("[bmm350] PMU_CMD_AGGR_SET <- {:#04x}", aggr);
        self.set_regs(REG_PMU_CMD_AGGR_SET, &[aggr])?;
        self.pmu_cmd(PMU_CMD_UPD_OAE, UPD_OAE_DELAY_US)
    }

    fn enable_axes(&mut self, axes: AxisEnable) -> Bmm350Result<()> {
        self.set_regs(REG_PMU_CMD_AXIS_EN, &[axes.bits()])
    }

    fn set_powermode(&mut self, mode: PowerMode) -> Bmm350Result<()> {
        let mut last = [0u8; 1];
        self.get_regs(REG_PMU_CMD, &mut last)?;
        if last[0] > PMU_CMD_BR_FAST {
            return Err(DriverError::PmuCmdValue(last[0]).into());
        }

        let mut suspended = last[0] == PMU_CMD_SUS;
        if last[0] == PMU_CMD_NM || last[0] == PMU_CMD_UPD_OAE {
            self.pmu_cmd(PMU_CMD_SUS, GOTO_SUSPEND_DELAY_US)?;
            suspended = true;
        }

        match mode {
            PowerMode::Suspend if suspended => Ok(()),
            PowerMode::Suspend => self.pmu_cmd(PMU_CMD_SUS, GOTO_SUSPEND_DELAY_US),
            PowerMode::Normal => self.pmu_cmd(PMU_CMD_NM, SUSPEND_TO_NORMAL_DELAY_US),
            PowerMode::Forced => {
                let avg = self.averaging()?;
                self.pmu_cmd(PMU_CMD_FM, SUS_TO_FORCED_DELAY_US[avg as usize])
            }
            PowerMode::ForcedFast => {
                let avg = self.averaging()?;
                self.pmu_cmd(PMU_CMD_FM_FAST, SUS_TO_FORCED_FAST_DELAY_US[avg as usize])
            }
        }
    }

    fn get_pmu_cmd_status_0(&mut self) -> Bmm350Result<PmuCmdStatus0> {
        let mut status = [0u8; 1];
        self.get_regs(REG_PMU_CMD_STATUS_0, &mut status)?;
        Ok(PmuCmdStatus0::from_reg(status[0]))
    }

    fn get_compensated_mag_xyz_temp_data(&mut self) -> Bmm350Result<MagTempData> {
        let mut buf = [0u8; MAG_TEMP_DATA_LEN];
        self.get_regs(REG_MAG_X_XLSB, &mut buf)?;

        let raw = [
            sign_extend_24(&buf[0..3]),
            sign_extend_24(&buf[3..6]),
            sign_extend_24(&buf[6..9]),
            sign_extend_24(&buf[9..12]),
        ];
        Ok(compensate(raw))
    }

    fn perform_self_test(&mut self) -> Bmm350Result<SelfTestResult> {
        self.set_powermode(PowerMode::Suspend)?;
        self.enable_axes(AxisEnable { x: true, y: true, z: false })?;

        let pos_x = self.self_test_measure(SELF_TEST_POS_X)?.x;
        let neg_x = self.self_test_measure(SELF_TEST_NEG_X)?.x;
        let pos_y = self.self_test_measure(SELF_TEST_POS_Y)?.y;
        let neg_y = self.self_test_measure(SELF_TEST_NEG_Y)?.y;

        self.set_regs(REG_TMR_SELFTEST_USER, &[SELF_TEST_DISABLE])?;
        self.soft_reset()?;

        let result = SelfTestResult {
            out_ust_x: pos_x - neg_x,
            out_ust_y: pos_y - neg_y,
        };
        debug!(
            "[bmm350] self-test x={:.2}uT y={:.2}uT",
            result.out_ust_x, result.out_ust_y
        );
        Ok(result)
    }

    fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn release(self) -> T {
        self.transport
    }
}
