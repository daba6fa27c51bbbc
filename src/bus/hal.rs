//! [`Controller`] backed by any `embedded-hal` 1.0 I2C implementation.
//!
//! The HAL drives ACK/NACK and the stop condition itself; the descriptor is
//! reduced to its start-delimited segments and mapped onto `write`,
//! `write_read` (repeated start) or a general `transaction`.

use super::transaction::{Segment, SegmentKind, Transaction};
use super::Controller;
use crate::errors::{AckSource, BusError, BusResult};
use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource, Operation};
use std::time::{Duration, Instant};

pub struct HalController<I> {
    i2c: I,
}

impl<I: I2c> HalController<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    pub fn into_inner(self) -> I {
        self.i2c
    }
}

/// Linux `/dev/i2c-N` character device
#[cfg(feature = "linux-hal")]
pub type LinuxController = HalController<linux_embedded_hal::I2cdev>;

#[cfg(feature = "linux-hal")]
impl LinuxController {
    pub fn open(path: &str) -> Result<Self, linux_embedded_hal::i2cdev::linux::LinuxI2CError> {
        Ok(Self::new(linux_embedded_hal::I2cdev::new(path)?))
    }
}

fn map_error(kind: ErrorKind, elapsed: Duration, timeout: Duration) -> BusError {
    if elapsed >= timeout {
        return BusError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        };
    }
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => {
            BusError::NoAcknowledge(AckSource::Address)
        }
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => {
            BusError::NoAcknowledge(AckSource::Data)
        }
        ErrorKind::NoAcknowledge(_) => BusError::NoAcknowledge(AckSource::Unknown),
        ErrorKind::ArbitrationLoss => BusError::ArbitrationLoss,
        other => BusError::Bus(format!("{:?}", other)),
    }
}

impl<I: I2c> Controller for HalController<I> {
    fn execute(&mut self, txn: &Transaction, rx: &mut [u8], timeout: Duration) -> BusResult<()> {
        let segments = txn.segments()?;
        let address = match segments.first() {
            Some(segment) => segment.address,
            None => return Ok(()),
        };
        if segments.iter().any(|s| s.address != address) {
            return Err(BusError::InvalidArgument {
                reason: "transaction addresses more than one device".to_string(),
            });
        }
        let read_len = txn.read_len();
        if rx.len() < read_len {
            return Err(BusError::InvalidArgument {
                reason: format!("receive buffer holds {} of {} bytes", rx.len(), read_len),
            });
        }

        let started = Instant::now();
        let result = match segments.as_slice() {
            [Segment {
                kind: SegmentKind::Write(bytes),
                ..
            }] => self.i2c.write(address, bytes),
            [Segment {
                kind: SegmentKind::Write(bytes),
                ..
            }, Segment {
                kind: SegmentKind::Read(len),
                ..
            }] => self.i2c.write_read(address, bytes, &mut rx[..*len]),
            _ => {
                let mut rest = &mut rx[..read_len];
                let mut operations = Vec::with_capacity(segments.len());
                for segment in &segments {
                    match &segment.kind {
                        SegmentKind::Write(bytes) => {
                            operations.push(Operation::Write(bytes.as_slice()))
                        }
                        SegmentKind::Read(len) => {
                            let (head, tail) = std::mem::take(&mut rest).split_at_mut(*len);
                            operations.push(Operation::Read(head));
                            rest = tail;
                        }
                    }
                }
                self.i2c.transaction(address, &mut operations)
            }
        };

        result.map_err(|e| map_error(e.kind(), started.elapsed(), timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::i2c::{read_register, write_register, DEFAULT_TIMEOUT};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const ADDR: u8 = 0x30;

    #[test]
    fn test_register_read_maps_to_write_read() {
        let expectations = [I2cTrans::write_read(ADDR, vec![0x39], vec![0x10])];
        let mut bus = HalController::new(I2cMock::new(&expectations));

        let mut buf = [0u8; 1];
        read_register(&mut bus, ADDR, 0x39, &mut buf, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(buf, [0x10]);

        bus.into_inner().done();
    }

    #[test]
    fn test_register_write_maps_to_write() {
        let expectations = [I2cTrans::write(ADDR, vec![0x1A, 0x42])];
        let mut bus = HalController::new(I2cMock::new(&expectations));

        write_register(&mut bus, ADDR, 0x1A, &[0x42], DEFAULT_TIMEOUT).unwrap();

        bus.into_inner().done();
    }

    #[test]
    fn test_address_nack_is_mapped() {
        let expectations = [I2cTrans::write(ADDR, vec![0x1A, 0x01])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))];
        let mut bus = HalController::new(I2cMock::new(&expectations));

        let err = write_register(&mut bus, ADDR, 0x1A, &[0x01], DEFAULT_TIMEOUT).unwrap_err();
        assert_eq!(err, BusError::NoAcknowledge(AckSource::Address));

        bus.into_inner().done();
    }

    #[test]
    fn test_error_after_bound_is_timeout() {
        let err = map_error(
            ErrorKind::Other,
            Duration::from_millis(1200),
            Duration::from_millis(1000),
        );
        assert_eq!(err, BusError::Timeout { timeout_ms: 1000 });

        let err = map_error(ErrorKind::ArbitrationLoss, Duration::ZERO, DEFAULT_TIMEOUT);
        assert_eq!(err, BusError::ArbitrationLoss);
    }

    #[test]
    fn test_short_receive_buffer_rejected() {
        let expectations: [I2cTrans; 0] = [];
        let mut bus = HalController::new(I2cMock::new(&expectations));
        let txn = Transaction::register_read(ADDR, 0x00, 4).unwrap();
        let mut rx = [0u8; 2];
        let err = bus.execute(&txn, &mut rx, DEFAULT_TIMEOUT).unwrap_err();
        assert!(matches!(err, BusError::InvalidArgument { .. }));

        bus.into_inner().done();
    }
}
