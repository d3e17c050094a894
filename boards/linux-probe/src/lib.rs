/// Board-level glue for running a BMM350 from Linux userspace
///
/// The sensor sits on an I2C character device (`/dev/i2c-N`); samples are
/// printed as JSON lines on stdout.
pub mod messages;
pub mod sampler;

/// Default configuration directory (embedded at compile time)
pub const CONFIG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config");

/// Embedded default configuration
pub const BMM350_TOML: &str = include_str!("../config/bmm350.toml");

/// Board name
pub const BOARD_NAME: &str = "linux-probe";

/// Get the configuration path (allow override via CONFIG_PATH env var)
pub fn get_config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| CONFIG_DIR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmm350_transport::config::parse_device_config;
    use bmm350_transport::BusType;

    #[test]
    fn test_embedded_config_is_valid() {
        let config = parse_device_config(BMM350_TOML).unwrap();
        assert_eq!(config.bus.bus_type().unwrap(), BusType::I2C);
        assert_eq!(config.sensor.id, "mag0");
        assert_eq!(config.sensor.frequency(), 25);
    }
}
