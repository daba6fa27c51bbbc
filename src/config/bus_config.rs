use super::{invalid, read_toml};
use crate::errors::ConfigResult;
use serde::Deserialize;
use std::time::Duration;

/// Root structure for loading a `[bus]` TOML table
#[derive(Debug, Default, Deserialize)]
pub struct BusConfig {
    #[serde(default)]
    pub bus: BusSettings,
}

/// Controller-side bus parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Backend: "linux" or "simulated"
    pub kind: String,
    /// Character device for the linux backend, e.g. /dev/i2c-1
    pub path: Option<String>,
    /// Only "controller" is supported
    pub mode: String,
    pub port: u8,
    pub sda_io: u8,
    pub scl_io: u8,
    pub sda_pullup: bool,
    pub scl_pullup: bool,
    pub clock_hz: u32,
    pub timeout_ms: u64,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            kind: "simulated".to_string(),
            path: None,
            mode: "controller".to_string(),
            port: 1,
            sda_io: 26,
            scl_io: 27,
            sda_pullup: true,
            scl_pullup: true,
            clock_hz: 100_000,
            timeout_ms: 1000,
        }
    }
}

impl BusSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.mode.eq_ignore_ascii_case("controller") {
            return Err(invalid(
                "bus.mode",
                format!("'{}' is not supported, only 'controller'", self.mode),
            ));
        }
        if self.clock_hz == 0 {
            return Err(invalid("bus.clock_hz", "must be non-zero"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("bus.timeout_ms", "must be non-zero"));
        }
        if self.sda_io == self.scl_io {
            return Err(invalid("bus.sda_io", "SDA and SCL must use different pins"));
        }
        Ok(())
    }
}

impl BusConfig {
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let parsed: BusConfig = toml::from_str(content)?;
        parsed.bus.validate()?;
        Ok(parsed)
    }
}

/// Load bus config file
pub fn load_bus_config(path: &str) -> ConfigResult<BusConfig> {
    let parsed: BusConfig = read_toml(path)?;
    parsed.bus.validate()?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigError;

    #[test]
    fn test_defaults_match_reference_board() {
        let cfg = BusConfig::from_toml("").unwrap();
        assert_eq!(cfg.bus.kind, "simulated");
        assert_eq!(cfg.bus.port, 1);
        assert_eq!(cfg.bus.sda_io, 26);
        assert_eq!(cfg.bus.scl_io, 27);
        assert!(cfg.bus.sda_pullup && cfg.bus.scl_pullup);
        assert_eq!(cfg.bus.clock_hz, 100_000);
        assert_eq!(cfg.bus.timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn test_linux_bus_entry() {
        let cfg = BusConfig::from_toml(
            r#"
            [bus]
            kind = "linux"
            path = "/dev/i2c-1"
            clock_hz = 400000
            timeout_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bus.kind, "linux");
        assert_eq!(cfg.bus.path.as_deref(), Some("/dev/i2c-1"));
        assert_eq!(cfg.bus.clock_hz, 400_000);
        assert_eq!(cfg.bus.timeout_ms, 250);
    }

    #[test]
    fn test_rejects_non_controller_mode() {
        let err = BusConfig::from_toml("[bus]\nmode = \"target\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "bus.mode"));
    }

    #[test]
    fn test_rejects_zero_timeout_and_clock() {
        assert!(BusConfig::from_toml("[bus]\ntimeout_ms = 0\n").is_err());
        assert!(BusConfig::from_toml("[bus]\nclock_hz = 0\n").is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            BusConfig::from_toml("[bus\n"),
            Err(ConfigError::FormatError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_bus_config("/nonexistent/bus.toml"),
            Err(ConfigError::LoadError { .. })
        ));
    }
}
