use bmm350_linux_probe::{get_config_path, sampler, BOARD_NAME};
use bmm350_transport::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = get_config_path();
    tracing::info!("[{}] Configuration path: {}", BOARD_NAME, config_path);

    sampler::run_probe(&config_path).await
}
