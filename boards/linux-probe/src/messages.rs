use bmm350_transport::MagTempData;
use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Header metadata attached to every published sample
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Header {
    /// Unique device identifier
    pub device_id: String,
    /// Sensor identifier from the config (e.g. "mag0")
    pub sensor_id: String,
    /// Reference frame identifier
    pub frame_id: String,
    /// Sequence number for message ordering
    pub seq: u64,
    /// UTC timestamp in nanoseconds
    pub t_utc_ns: u64,
    /// Nanoseconds since the sampler started
    pub t_mono_ns: u64,
    /// Message schema version
    pub schema_v: u16,
}

impl Header {
    pub fn new(device_id: &str, sensor_id: &str, seq: u64, started: Instant) -> Self {
        let t_utc_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        Self {
            device_id: device_id.to_string(),
            sensor_id: sensor_id.to_string(),
            frame_id: "sensor_frame".to_string(),
            seq,
            t_utc_ns,
            t_mono_ns: started.elapsed().as_nanos() as u64,
            schema_v: 1,
        }
    }
}

/// Magnetometer sample
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MagnetometerMessage {
    pub h: Header,
    /// Magnetic field X-axis (µT)
    pub mx: f32,
    /// Magnetic field Y-axis (µT)
    pub my: f32,
    /// Magnetic field Z-axis (µT)
    pub mz: f32,
    /// Die temperature (°C)
    pub temperature: f32,
}

impl MagnetometerMessage {
    pub fn from_sample(h: Header, sample: &MagTempData) -> Self {
        Self {
            h,
            mx: sample.x,
            my: sample.y,
            mz: sample.z,
            temperature: sample.temperature,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
