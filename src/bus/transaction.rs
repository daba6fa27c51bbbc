//! I2C command descriptors for register-indexed transfers.
//!
//! A [`Transaction`] is the complete command list for one bus transfer:
//!
//! ```text
//! read:  | start | addr+W | reg | start | addr+R | read n-1 (ack) | read 1 (nack) | stop |
//! write: | start | addr+W | reg | write n bytes                                   | stop |
//! ```
//!
//! Descriptors are only obtainable through [`TransactionBuilder::finish`], which
//! appends the one and only stop condition.

use crate::errors::{BusError, BusResult};

/// Highest valid 7-bit device address
pub const MAX_ADDRESS: u8 = 0x7F;

/// R/W bit carried in the low bit of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// Acknowledge value driven by the receiver after a byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Ack,
    Nack,
}

/// A single step of a bus transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start condition. A second start before the stop is a repeated start.
    Start,
    Write {
        byte: u8,
        /// Fail the transfer if the slave does not acknowledge this byte.
        ack_check: bool,
    },
    Read {
        /// Number of bytes clocked in by this command.
        len: usize,
        /// Acknowledge the controller drives after each byte of this command.
        ack: Ack,
    },
    Stop,
}

/// Wire-level address byte: `(address << 1) | rw`
pub fn address_byte(address: u8, direction: Direction) -> u8 {
    (address << 1) | direction as u8
}

fn check_address(address: u8) -> BusResult<()> {
    if address > MAX_ADDRESS {
        return Err(BusError::InvalidArgument {
            reason: format!("device address {:#04x} exceeds 7 bits", address),
        });
    }
    Ok(())
}

/// Start-delimited part of a transaction, addressed to one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub address: u8,
    pub kind: SegmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Bytes written after the address byte
    Write(Vec<u8>),
    /// Number of bytes read after the address byte
    Read(usize),
}

/// Immutable command list for one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    commands: Vec<Command>,
}

impl Transaction {
    /// Indexed register read with a repeated start between register select and data.
    pub fn register_read(address: u8, register: u8, count: usize) -> BusResult<Self> {
        check_address(address)?;
        if count == 0 {
            return Err(BusError::InvalidArgument {
                reason: "register read of zero bytes".to_string(),
            });
        }

        let mut builder = TransactionBuilder::new()
            .start()
            .write_byte(address_byte(address, Direction::Write), true)
            .write_byte(register, true)
            .start()
            .write_byte(address_byte(address, Direction::Read), true);
        if count > 1 {
            builder = builder.read(count - 1, Ack::Ack);
        }
        Ok(builder.read(1, Ack::Nack).finish())
    }

    /// Indexed register write. An empty payload only sets the register pointer.
    pub fn register_write(address: u8, register: u8, data: &[u8]) -> BusResult<Self> {
        check_address(address)?;

        Ok(TransactionBuilder::new()
            .start()
            .write_byte(address_byte(address, Direction::Write), true)
            .write_byte(register, true)
            .write(data, true)
            .finish())
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Total number of bytes the controller clocks in
    pub fn read_len(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                Command::Read { len, .. } => *len,
                _ => 0,
            })
            .sum()
    }

    /// Number of bytes the controller drives, address bytes included
    pub fn write_len(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Write { .. }))
            .count()
    }

    /// True if the transaction switches direction without releasing the bus
    pub fn has_repeated_start(&self) -> bool {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Start))
            .count()
            > 1
    }

    /// Split the command list into start-delimited segments.
    ///
    /// The first byte written after each start is taken as the address byte.
    pub fn segments(&self) -> BusResult<Vec<Segment>> {
        let malformed = |reason: &str| BusError::InvalidArgument {
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut current: Option<Segment> = None;
        let mut awaiting_address = false;

        for command in &self.commands {
            match *command {
                Command::Start => {
                    if awaiting_address {
                        return Err(malformed("start without address byte"));
                    }
                    segments.extend(current.take());
                    awaiting_address = true;
                }
                Command::Write { byte, .. } if awaiting_address => {
                    let kind = if byte & 1 == Direction::Read as u8 {
                        SegmentKind::Read(0)
                    } else {
                        SegmentKind::Write(Vec::new())
                    };
                    current = Some(Segment {
                        address: byte >> 1,
                        kind,
                    });
                    awaiting_address = false;
                }
                Command::Write { byte, .. } => match current.as_mut().map(|s| &mut s.kind) {
                    Some(SegmentKind::Write(bytes)) => bytes.push(byte),
                    Some(SegmentKind::Read(_)) => {
                        return Err(malformed("write inside a read segment"))
                    }
                    None => return Err(malformed("write before start")),
                },
                Command::Read { len, .. } => match current.as_mut().map(|s| &mut s.kind) {
                    Some(SegmentKind::Read(total)) => *total += len,
                    Some(SegmentKind::Write(_)) => {
                        return Err(malformed("read inside a write segment"))
                    }
                    None => return Err(malformed("read before start")),
                },
                Command::Stop => {
                    if awaiting_address {
                        return Err(malformed("stop without address byte"));
                    }
                    segments.extend(current.take());
                }
            }
        }

        Ok(segments)
    }
}

/// Write-once builder for [`Transaction`]
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(mut self) -> Self {
        self.commands.push(Command::Start);
        self
    }

    pub fn write_byte(mut self, byte: u8, ack_check: bool) -> Self {
        self.commands.push(Command::Write { byte, ack_check });
        self
    }

    pub fn write(mut self, bytes: &[u8], ack_check: bool) -> Self {
        self.commands.extend(
            bytes
                .iter()
                .map(|&byte| Command::Write { byte, ack_check }),
        );
        self
    }

    pub fn read(mut self, len: usize, ack: Ack) -> Self {
        if len > 0 {
            self.commands.push(Command::Read { len, ack });
        }
        self
    }

    /// Terminate with a stop condition and freeze the command list
    pub fn finish(mut self) -> Transaction {
        self.commands.push(Command::Stop);
        Transaction {
            commands: self.commands,
        }
    }
}
