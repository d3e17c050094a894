use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bmm350_transport::config::{load_device_config, DeviceConfig};
use bmm350_transport::hal::{open_i2c, Delay};
use bmm350_transport::{BusType, Magnetometer};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::messages::{Header, MagnetometerMessage};

pub type ProbeResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEVICE_ID: &str = "bmm350_probe";
const CHANNEL_DEPTH: usize = 64;

/// Sleep between samples for a loop running at `frequency` Hz
pub fn sample_period(frequency: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(frequency.max(1)))
}

/// Load `<config_path>/bmm350.toml`, start sampling and print JSON lines
/// until Ctrl-C.
pub async fn run_probe(config_path: &str) -> ProbeResult<()> {
    let config_file = format!("{}/bmm350.toml", config_path);
    let config = load_device_config(&config_file)?;
    info!(
        "[config] sensor '{}' on bus '{}' ({})",
        config.sensor.id, config.bus.id, config.bus.path
    );

    if config.bus.bus_type()? == BusType::I3C {
        return Err("no I3C controller binding on Linux, use an I2C bus".into());
    }

    let stop = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel::<MagnetometerMessage>(CHANNEL_DEPTH);

    let worker_stop = stop.clone();
    let worker = tokio::task::spawn_blocking(move || sample_loop(config, tx, worker_stop));

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some(msg) => match msg.to_json() {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("[probe] failed to encode sample: {}", e),
                },
                // sampler exited on its own
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("[probe] Ctrl-C received, stopping");
                stop.store(true, Ordering::Relaxed);
                break;
            }
        }
    }

    // drain so a sampler blocked on a full channel can observe the stop flag
    rx.close();
    while rx.recv().await.is_some() {}

    worker.await?
}

fn sample_loop(
    config: DeviceConfig,
    tx: mpsc::Sender<MagnetometerMessage>,
    stop: Arc<AtomicBool>,
) -> ProbeResult<()> {
    let bus = open_i2c(&config.bus.path)?;
    let mut mag = Magnetometer::init_i2c(bus, Delay, config.sensor.address)?;
    info!("[bmm350] '{}' bootstrapped", config.sensor.id);

    if let Some((odr, averaging)) = config.sensor.odr_performance() {
        mag.set_odr_performance(odr, averaging)?;
        info!("[bmm350] ODR set to {:?} with {:?}", odr, averaging);
    }

    if config.sensor.selftest {
        let result = mag.selftest()?;
        info!(
            "[bmm350] self-test: x={:.2}uT y={:.2}uT",
            result.out_ust_x, result.out_ust_y
        );
        mag.rebootstrap()?;
    }

    let period = sample_period(config.sensor.frequency());
    let started = Instant::now();
    let mut seq = 0u64;
    info!(
        "[{}] Starting sensor task at {}Hz",
        config.sensor.id,
        config.sensor.frequency()
    );

    while !stop.load(Ordering::Relaxed) {
        match mag.read() {
            Ok(sample) => {
                seq += 1;
                let header = Header::new(DEVICE_ID, &config.sensor.id, seq, started);
                if tx
                    .blocking_send(MagnetometerMessage::from_sample(header, &sample))
                    .is_err()
                {
                    break;
                }
            }
            Err(e) => error!("[{}] Sensor read error: {}", config.sensor.id, e),
        }
        std::thread::sleep(period);
    }

    mag.free();
    info!("[bmm350] '{}' released", config.sensor.id);
    Ok(())
}
