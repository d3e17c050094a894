use serde::Deserialize;
use std::fs;

use crate::bus::i3c::{I3cTarget, I3cTiming};
use crate::bus::BusType;
use crate::errors::{ConfigError, ConfigResult};
use crate::sensors::bmm350::validate_odr_performance;
use crate::sensors::{Averaging, Bmm350Address, DataRate};

pub const DEFAULT_FREQUENCY_HZ: u32 = 25;

/// Root configuration: one `[bus]`, one `[sensor]`, optional `[i3c]`
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    pub bus: BusEntry,
    pub sensor: SensorEntry,
    pub i3c: Option<I3cEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BusEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub path: String,
}

impl BusEntry {
    pub fn bus_type(&self) -> ConfigResult<BusType> {
        BusType::from_str(&self.r#type).ok_or_else(|| ConfigError::InvalidValue {
            field: "bus.type".to_string(),
            reason: format!("unknown bus type '{}'", self.r#type),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SensorEntry {
    pub id: String,
    #[serde(default)]
    pub address: Bmm350Address,
    pub frequency: Option<u32>,
    pub odr: Option<DataRate>,
    pub averaging: Option<Averaging>,
    #[serde(default)]
    pub selftest: bool,
}

impl SensorEntry {
    /// Sample loop rate in Hz
    pub fn frequency(&self) -> u32 {
        self.frequency.unwrap_or(DEFAULT_FREQUENCY_HZ)
    }

    /// ODR override to apply after bootstrap, if any
    pub fn odr_performance(&self) -> Option<(DataRate, Averaging)> {
        self.odr
            .map(|odr| (odr, self.averaging.unwrap_or(crate::bootstrap::DEFAULT_AVERAGING)))
    }
}

#[derive(Debug, Deserialize)]
pub struct I3cEntry {
    pub static_address: u8,
    pub dynamic_address: u8,
    pub poll_interval_us: Option<u32>,
    pub timeout_us: Option<u32>,
}

impl I3cEntry {
    pub fn target(&self) -> I3cTarget {
        I3cTarget {
            static_address: self.static_address,
            dynamic_address: self.dynamic_address,
        }
    }

    pub fn timing(&self) -> I3cTiming {
        let default = I3cTiming::default();
        I3cTiming {
            poll_interval_us: self.poll_interval_us.unwrap_or(default.poll_interval_us),
            timeout_us: self.timeout_us.unwrap_or(default.timeout_us),
        }
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

impl DeviceConfig {
    fn validate(&self) -> ConfigResult<()> {
        let bus_type = self.bus.bus_type()?;

        if self.sensor.frequency() == 0 {
            return Err(invalid("sensor.frequency", "must be greater than zero"));
        }

        if self.sensor.averaging.is_some() && self.sensor.odr.is_none() {
            return Err(invalid("sensor.averaging", "requires sensor.odr"));
        }
        if let Some((odr, averaging)) = self.sensor.odr_performance() {
            validate_odr_performance(odr, averaging).map_err(|e| {
                invalid("sensor.odr", format!("{:?} with {:?}: {}", odr, averaging, e))
            })?;
        }

        match (&self.i3c, bus_type) {
            (None, BusType::I3C) => {
                return Err(invalid("i3c", "an [i3c] section is required for an i3c bus"));
            }
            (Some(i3c), _) => {
                let timing = i3c.timing();
                if timing.poll_interval_us == 0 {
                    return Err(invalid("i3c.poll_interval_us", "must be greater than zero"));
                }
                if timing.poll_interval_us > timing.timeout_us {
                    return Err(invalid("i3c.poll_interval_us", "must not exceed i3c.timeout_us"));
                }
            }
            (None, BusType::I2C) => {}
        }

        Ok(())
    }
}

/// Parse and validate a device config from TOML text
pub fn parse_device_config(content: &str) -> ConfigResult<DeviceConfig> {
    let parsed: DeviceConfig = toml::from_str(content)?;
    parsed.validate()?;
    Ok(parsed)
}

/// Loads config from TOML file
pub fn load_device_config(path: &str) -> ConfigResult<DeviceConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
        path: path.to_string(),
        source,
    })?;
    parse_device_config(&content)
}
