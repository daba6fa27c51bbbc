use i2c_restart::{config_path, init_tracing, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with RUST_LOG environment variable support
    init_tracing();

    // Load configuration from CONFIG_PATH or default
    let config_path = config_path();
    tracing::info!("[main] Configuration path: {}", config_path);

    run(&config_path).await
}
