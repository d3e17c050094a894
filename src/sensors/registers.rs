// Register addresses for the BMM350
pub const REG_CHIP_ID: u8 = 0x00;
pub const REG_ERR_REG: u8 = 0x02;
pub const REG_PMU_CMD_AGGR_SET: u8 = 0x04;
pub const REG_PMU_CMD_AXIS_EN: u8 = 0x05;
pub const REG_PMU_CMD: u8 = 0x06;
pub const REG_PMU_CMD_STATUS_0: u8 = 0x07;
pub const REG_INT_CTRL: u8 = 0x2E;
pub const REG_INT_STATUS: u8 = 0x30;
pub const REG_MAG_X_XLSB: u8 = 0x31;
pub const REG_OTP_CMD_REG: u8 = 0x50;
pub const REG_TMR_SELFTEST_USER: u8 = 0x60;
pub const REG_CMD: u8 = 0x7E;

pub const CHIP_ID: u8 = 0x33;

// CMD register
pub const CMD_SOFTRESET: u8 = 0xB6;

// OTP_CMD_REG
pub const OTP_CMD_PWR_OFF_OTP: u8 = 0x80;

// PMU_CMD values
pub const PMU_CMD_SUS: u8 = 0x00;
pub const PMU_CMD_NM: u8 = 0x01;
pub const PMU_CMD_UPD_OAE: u8 = 0x02;
pub const PMU_CMD_FM: u8 = 0x03;
pub const PMU_CMD_FM_FAST: u8 = 0x04;
pub const PMU_CMD_FGR: u8 = 0x05;
pub const PMU_CMD_BR: u8 = 0x07;
pub const PMU_CMD_BR_FAST: u8 = 0x08;

// INT_CTRL bits
pub const INT_CTRL_LATCHED: u8 = 0x01;
pub const INT_CTRL_ACTIVE_HIGH: u8 = 0x02;
pub const INT_CTRL_PUSH_PULL: u8 = 0x04;
pub const INT_CTRL_MAP_TO_PIN: u8 = 0x08;
pub const INT_CTRL_DRDY_EN: u8 = 0x80;

// TMR_SELFTEST_USER coil settings
pub const SELF_TEST_DISABLE: u8 = 0x00;
pub const SELF_TEST_POS_X: u8 = 0x0D;
pub const SELF_TEST_NEG_X: u8 = 0x0B;
pub const SELF_TEST_POS_Y: u8 = 0x15;
pub const SELF_TEST_NEG_Y: u8 = 0x13;

/// Every register read is preceded by this many dummy bytes on the wire
pub const DUMMY_BYTES: usize = 2;
pub const MAX_READ_LEN: usize = 32;
/// X, Y, Z and temperature, 24 bits each
pub const MAG_TEMP_DATA_LEN: usize = 12;

// Delays in microseconds
pub const SOFT_RESET_DELAY_US: u32 = 24_000;
pub const BR_DELAY_US: u32 = 14_000;
pub const FGR_DELAY_US: u32 = 18_000;
pub const UPD_OAE_DELAY_US: u32 = 1_000;
pub const GOTO_SUSPEND_DELAY_US: u32 = 6_000;
pub const SUSPEND_TO_NORMAL_DELAY_US: u32 = 38_000;
/// Indexed by averaging setting
pub const SUS_TO_FORCED_DELAY_US: [u32; 4] = [15_000, 17_000, 20_000, 28_000];
pub const SUS_TO_FORCED_FAST_DELAY_US: [u32; 4] = [4_000, 5_000, 9_000, 16_000];

// Default sensitivities used to turn raw counts into physical units
const BXY_SENS: f32 = 14.55;
const BZ_SENS: f32 = 9.0;
const TEMP_SENS: f32 = 0.00204;
const INA_XY_GAIN_TRGT: f32 = 19.46;
const INA_Z_GAIN_TRGT: f32 = 31.0;
const ADC_GAIN: f32 = 1.0 / 1.5;
const LUT_GAIN: f32 = 0.714_607_24;
const POWER: f32 = 1_000_000.0 / 1_048_576.0;

pub const LSB_TO_UT_XY: f32 = POWER / (BXY_SENS * INA_XY_GAIN_TRGT * ADC_GAIN * LUT_GAIN);
pub const LSB_TO_UT_Z: f32 = POWER / (BZ_SENS * INA_Z_GAIN_TRGT * ADC_GAIN * LUT_GAIN);
pub const LSB_TO_DEGC: f32 = 1.0 / (TEMP_SENS * ADC_GAIN * LUT_GAIN * 1_048_576.0);
pub const TEMP_OFFSET_DEGC: f32 = 25.49;
