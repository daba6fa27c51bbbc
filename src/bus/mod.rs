pub mod hal;
pub mod i2c;
pub mod sim;
pub mod transaction;

use crate::errors::BusResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use transaction::Transaction;

/// Bus handle that can run a complete [`Transaction`].
///
/// Implementations must put the stop condition on the wire before returning,
/// on success and on every error path. Bytes clocked in by the transaction are
/// stored in `rx` in order.
pub trait Controller {
    fn execute(&mut self, txn: &Transaction, rx: &mut [u8], timeout: Duration) -> BusResult<()>;
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn execute(&mut self, txn: &Transaction, rx: &mut [u8], timeout: Duration) -> BusResult<()> {
        (**self).execute(txn, rx, timeout)
    }
}

impl<C: Controller + ?Sized> Controller for &mut C {
    fn execute(&mut self, txn: &Transaction, rx: &mut [u8], timeout: Duration) -> BusResult<()> {
        (**self).execute(txn, rx, timeout)
    }
}

/// Bus handle shared between tasks; the lock serializes transactions
pub type SharedBus = Arc<Mutex<Box<dyn Controller + Send>>>;

/// Bus backend selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    Linux,
    Simulated,
}

impl BusKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(BusKind::Linux),
            "simulated" | "sim" => Some(BusKind::Simulated),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_kind_parsing() {
        assert_eq!(BusKind::from_str("linux"), Some(BusKind::Linux));
        assert_eq!(BusKind::from_str("Simulated"), Some(BusKind::Simulated));
        assert_eq!(BusKind::from_str("sim"), Some(BusKind::Simulated));
        assert_eq!(BusKind::from_str("spi"), None);
    }
}
