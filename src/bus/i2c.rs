use super::transaction::Transaction;
use super::Controller;
use crate::errors::BusResult;
use std::time::Duration;
use tracing::{debug, trace};

/// Bound applied to every transaction unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Register-indexed read: selects `register`, then reads `buf.len()` bytes
/// after a repeated start. An empty `buf` succeeds without touching the bus.
pub fn read_register<C: Controller + ?Sized>(
    bus: &mut C,
    address: u8,
    register: u8,
    buf: &mut [u8],
    timeout: Duration,
) -> BusResult<()> {
    if buf.is_empty() {
        return Ok(());
    }

    let txn = Transaction::register_read(address, register, buf.len())?;
    trace!(
        "[bus] read addr={:#04x} reg={:#04x} len={}",
        address,
        register,
        buf.len()
    );

    let result = bus.execute(&txn, buf, timeout);
    if let Err(e) = &result {
        debug!(
            "[bus] read addr={:#04x} reg={:#04x} failed: {}",
            address, register, e
        );
    }
    result
}

/// Register-indexed write of `data` starting at `register`.
pub fn write_register<C: Controller + ?Sized>(
    bus: &mut C,
    address: u8,
    register: u8,
    data: &[u8],
    timeout: Duration,
) -> BusResult<()> {
    let txn = Transaction::register_write(address, register, data)?;
    trace!(
        "[bus] write addr={:#04x} reg={:#04x} len={}",
        address,
        register,
        data.len()
    );

    let result = bus.execute(&txn, &mut [], timeout);
    if let Err(e) = &result {
        debug!(
            "[bus] write addr={:#04x} reg={:#04x} failed: {}",
            address, register, e
        );
    }
    result
}

/// Register transaction engine carrying the per-call timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterEngine {
    timeout: Duration,
}

impl Default for RegisterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl RegisterEngine {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn read<C: Controller + ?Sized>(
        &self,
        bus: &mut C,
        address: u8,
        register: u8,
        buf: &mut [u8],
    ) -> BusResult<()> {
        read_register(bus, address, register, buf, self.timeout)
    }

    pub fn write<C: Controller + ?Sized>(
        &self,
        bus: &mut C,
        address: u8,
        register: u8,
        data: &[u8],
    ) -> BusResult<()> {
        write_register(bus, address, register, data, self.timeout)
    }

    /// Single-byte register write
    pub fn write_byte<C: Controller + ?Sized>(
        &self,
        bus: &mut C,
        address: u8,
        register: u8,
        byte: u8,
    ) -> BusResult<()> {
        self.write(bus, address, register, &[byte])
    }
}
