// Public modules
pub mod bus;
pub mod config;
pub mod errors;
pub mod registry;
pub mod scheduler;
pub mod sensors;

// Re-export commonly used types
pub use bus::i2c::{read_register, write_register, RegisterEngine, DEFAULT_TIMEOUT};
pub use bus::{Controller, SharedBus};
pub use errors::{BusError, BusResult, SensorError, SensorResult};
pub use sensors::byte_swap;

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

/// Directory holding `bus.toml` and `device.toml`
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string())
}

/// Open the bus, verify the device and sample it
pub async fn run(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("[i2c_restart] starting up...");

    let bus_cfg = config::load_bus_config(&format!("{}/bus.toml", config_path))?;
    let device_cfg = config::load_device_config(&format!("{}/device.toml", config_path))?;
    info!(
        "[config] bus kind={} device={} at {:#04x}",
        bus_cfg.bus.kind, device_cfg.device.id, device_cfg.device.address
    );

    let engine = RegisterEngine::new(bus_cfg.bus.timeout());
    let mut bus = registry::open_bus(&bus_cfg.bus, &device_cfg.device)?;
    let device = registry::init_device(&mut bus, &device_cfg.device, engine)?;
    info!("[registry] device initialized");

    let shared: SharedBus = Arc::new(Mutex::new(bus));
    let stats = scheduler::run_sampler(device, shared, &device_cfg.device).await;
    info!(
        "[main] sampling finished: {} ok, {} failed",
        stats.taken, stats.failed
    );

    Ok(())
}
