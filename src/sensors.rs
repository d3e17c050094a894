pub mod bmm350;
pub mod registers;

use crate::bus::Transport;
use crate::errors::Bmm350Result;
use serde::Deserialize;

pub use self::bmm350::Bmm350;

/// I2C address selected by the ADSEL pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bmm350Address {
    #[default]
    Default = 0x14,
    Secondary = 0x15,
}

impl Bmm350Address {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Output data rate, encoded as the ODR field of PMU_CMD_AGGR_SET
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DataRate {
    #[serde(rename = "400hz")]
    Hz400 = 0x2,
    #[serde(rename = "200hz")]
    Hz200 = 0x3,
    #[serde(rename = "100hz")]
    Hz100 = 0x4,
    #[serde(rename = "50hz")]
    Hz50 = 0x5,
    #[serde(rename = "25hz")]
    Hz25 = 0x6,
    #[serde(rename = "12.5hz")]
    Hz12_5 = 0x7,
    #[serde(rename = "6.25hz")]
    Hz6_25 = 0x8,
    #[serde(rename = "3.125hz")]
    Hz3_125 = 0x9,
    #[serde(rename = "1.5625hz")]
    Hz1_5625 = 0xA,
}

/// Number of samples averaged per output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Averaging {
    #[serde(rename = "none")]
    NoAvg = 0,
    Avg2 = 1,
    Avg4 = 2,
    Avg8 = 3,
}

impl Averaging {
    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Averaging::NoAvg,
            1 => Averaging::Avg2,
            2 => Averaging::Avg4,
            _ => Averaging::Avg8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Suspend,
    Normal,
    Forced,
    ForcedFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptLatch {
    Pulsed,
    Latched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptPolarity {
    ActiveLow,
    ActiveHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptDrive {
    OpenDrain,
    PushPull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMap {
    UnmapFromPin,
    MapToPin,
}

/// Electrical behaviour of the INT pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptConfig {
    pub latch: InterruptLatch,
    pub polarity: InterruptPolarity,
    pub drive: InterruptDrive,
    pub map: InterruptMap,
}

impl Default for InterruptConfig {
    fn default() -> Self {
        Self {
            latch: InterruptLatch::Pulsed,
            polarity: InterruptPolarity::ActiveHigh,
            drive: InterruptDrive::PushPull,
            map: InterruptMap::UnmapFromPin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptEnable {
    Disable,
    Enable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisEnable {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisEnable {
    pub const fn all() -> Self {
        Self { x: true, y: true, z: true }
    }

    pub(crate) fn bits(self) -> u8 {
        (self.x as u8) | ((self.y as u8) << 1) | ((self.z as u8) << 2)
    }
}

/// Decoded PMU_CMD_STATUS_0 register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PmuCmdStatus0 {
    pub pmu_cmd_busy: bool,
    pub odr_ovwr: bool,
    pub avr_ovwr: bool,
    pub pwr_mode_is_normal: bool,
    pub cmd_is_illegal: bool,
    pub pmu_cmd_value: u8,
}

impl PmuCmdStatus0 {
    pub fn from_reg(reg: u8) -> Self {
        Self {
            pmu_cmd_busy: reg & 0x01 != 0,
            odr_ovwr: reg & 0x02 != 0,
            avr_ovwr: reg & 0x04 != 0,
            pwr_mode_is_normal: reg & 0x08 != 0,
            cmd_is_illegal: reg & 0x10 != 0,
            pmu_cmd_value: (reg >> 5) & 0x07,
        }
    }
}

/// Compensated field in microtesla and die temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MagTempData {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub temperature: f32,
}

/// Field difference between opposite self-test coil currents, in microtesla
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelfTestResult {
    pub out_ust_x: f32,
    pub out_ust_y: f32,
}

/// Public API of a BMM350 driver.
///
/// The adapters in this crate only talk to the sensor through this trait;
/// the driver owns the transport it was built on and hands it back from
/// `release`.
pub trait SensorApi {
    type Transport: Transport;

    fn init(&mut self) -> Bmm350Result<()>;
    fn get_regs(&mut self, reg: u8, buf: &mut [u8]) -> Bmm350Result<()>;
    fn set_regs(&mut self, reg: u8, data: &[u8]) -> Bmm350Result<()>;
    fn delay_us(&mut self, us: u32);

    fn configure_interrupt(&mut self, config: InterruptConfig) -> Bmm350Result<()>;
    fn enable_interrupt(&mut self, enable: InterruptEnable) -> Bmm350Result<()>;
    fn set_odr_performance(&mut self, odr: DataRate, averaging: Averaging) -> Bmm350Result<()>;
    fn enable_axes(&mut self, axes: AxisEnable) -> Bmm350Result<()>;
    fn set_powermode(&mut self, mode: PowerMode) -> Bmm350Result<()>;

    fn get_pmu_cmd_status_0(&mut self) -> Bmm350Result<PmuCmdStatus0>;
    fn get_compensated_mag_xyz_temp_data(&mut self) -> Bmm350Result<MagTempData>;
    fn perform_self_test(&mut self) -> Bmm350Result<SelfTestResult>;

    fn transport_mut(&mut self) -> &mut Self::Transport;
    fn release(self) -> Self::Transport
    where
        Self: Sized;
}
