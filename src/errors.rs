use thiserror::Error;

/// Which part of the frame the slave refused to acknowledge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckSource {
    Address,
    Data,
    Unknown,
}

impl std::fmt::Display for AckSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AckSource::Address => write!(f, "address"),
            AckSource::Data => write!(f, "data"),
            AckSource::Unknown => write!(f, "unknown"),
        }
    }
}

/// Errors produced by a single register transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("Invalid transaction argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Slave did not acknowledge ({0} byte)")]
    NoAcknowledge(AckSource),

    #[error("Bus arbitration lost")]
    ArbitrationLoss,

    #[error("Bus error: {0}")]
    Bus(String),

    #[error("Transaction timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl BusError {
    /// True for failures reported by the wire (NACK, arbitration, bus faults)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BusError::NoAcknowledge(_) | BusError::ArbitrationLoss | BusError::Bus(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BusError::Timeout { .. })
    }
}

/// Device-level errors raised above the transaction engine
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("I2C communication failed: {0}")]
    Bus(#[from] BusError),

    #[error("Sensor '{sensor}' initialization failed: {reason}")]
    InitError { sensor: String, reason: String },

    #[error("Sensor '{sensor}' wrong chip ID: expected {expected:#04x}, got {actual:#04x}")]
    WrongChipId { sensor: String, expected: u8, actual: u8 },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    FormatError(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Setup errors raised while opening the bus and probing the device
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported bus kind '{kind}'")]
    UnsupportedBus { kind: String },

    #[error("Failed to open bus '{path}': {reason}")]
    BusOpen { path: String, reason: String },

    #[error("Device registration failed: {0}")]
    RegistrationError(#[from] SensorError),
}

/// Result type aliases for convenience
pub type BusResult<T> = Result<T, BusError>;
pub type SensorResult<T> = Result<T, SensorError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(BusError::NoAcknowledge(AckSource::Address).is_transport());
        assert!(BusError::ArbitrationLoss.is_transport());
        assert!(!BusError::Timeout { timeout_ms: 1000 }.is_transport());
        assert!(BusError::Timeout { timeout_ms: 1000 }.is_timeout());
        assert!(!BusError::InvalidArgument { reason: "x".into() }.is_transport());
    }

    #[test]
    fn test_wrong_chip_id_message() {
        let err = SensorError::WrongChipId {
            sensor: "mmc5603".to_string(),
            expected: 0x10,
            actual: 0x3d,
        };
        assert_eq!(
            err.to_string(),
            "Sensor 'mmc5603' wrong chip ID: expected 0x10, got 0x3d"
        );
    }
}
