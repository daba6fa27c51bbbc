use super::{invalid, read_toml};
use crate::bus::transaction::MAX_ADDRESS;
use crate::errors::ConfigResult;
use crate::sensors::MMC5603NJ;
use serde::Deserialize;
use std::time::Duration;

/// Root structure for loading a `[device]` TOML table
#[derive(Debug, Default, Deserialize)]
pub struct DeviceConfig {
    #[serde(default)]
    pub device: DeviceSettings,
}

/// The probed device and how often to sample it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub id: String,
    pub address: u8,
    pub expected_id: u8,
    pub sample_period_ms: u64,
    /// Stop after this many samples; run forever when absent
    pub samples: Option<u64>,
    /// Written to CTRL0 before each sample when set
    pub trigger: Option<u8>,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            id: "mmc5603".to_string(),
            address: MMC5603NJ.address,
            expected_id: MMC5603NJ.device_id,
            sample_period_ms: 200,
            samples: None,
            trigger: None,
        }
    }
}

impl DeviceSettings {
    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.address > MAX_ADDRESS {
            return Err(invalid(
                "device.address",
                format!("{:#04x} exceeds the 7-bit range", self.address),
            ));
        }
        if self.sample_period_ms == 0 {
            return Err(invalid("device.sample_period_ms", "must be non-zero"));
        }
        Ok(())
    }
}

impl DeviceConfig {
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let parsed: DeviceConfig = toml::from_str(content)?;
        parsed.device.validate()?;
        Ok(parsed)
    }
}

/// Load device config file
pub fn load_device_config(path: &str) -> ConfigResult<DeviceConfig> {
    let parsed: DeviceConfig = read_toml(path)?;
    parsed.device.validate()?;
    Ok(parsed)
}
