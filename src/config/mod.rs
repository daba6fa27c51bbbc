pub mod bus_config;
pub mod device_config;

pub use bus_config::{load_bus_config, BusConfig, BusSettings};
pub use device_config::{load_device_config, DeviceConfig, DeviceSettings};

use crate::errors::{ConfigError, ConfigResult};
use std::fs;

/// Read a TOML file into `T`
fn read_toml<T: serde::de::DeserializeOwned>(path: &str) -> ConfigResult<T> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadError {
        path: path.to_string(),
        source: e,
    })?;
    Ok(toml::from_str(&content)?)
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}
