//! Simulated register-file slave.
//!
//! Behaves like a typical indexed-register device: the first byte written after
//! the address selects the register pointer, further bytes are stored at the
//! pointer, and reads return bytes from the pointer. The pointer
//! auto-increments and wraps at 0xFF. Every wire event is recorded.

use super::transaction::{Ack, Command, Direction, Transaction};
use super::Controller;
use crate::errors::{AckSource, BusError, BusResult};
use std::time::{Duration, Instant};
use tracing::trace;

/// Observable bus activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    Start,
    /// Byte driven by the controller, with the slave's acknowledge
    Sent { byte: u8, acked: bool },
    /// Byte driven by the slave, with the controller's acknowledge
    Received { byte: u8, ack: Ack },
    Stop,
}

/// Misbehaviour injected into the simulated slave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    /// Never acknowledge the address byte
    NackAddress,
    /// Acknowledge only the first `after` bytes following the address
    NackData { after: usize },
    /// Hold the bus without ever acknowledging
    Stall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlaveState {
    /// Waiting for the address byte after a start
    Idle,
    /// Addressed to someone else, or refused the address
    Ignoring,
    Receiving { pointer_set: bool },
    Transmitting,
}

pub struct SimulatedBus {
    address: u8,
    registers: [u8; 256],
    pointer: u8,
    fault: Fault,
    events: Vec<WireEvent>,
    transactions: usize,
}

impl SimulatedBus {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; 256],
            pointer: 0,
            fault: Fault::None,
            events: Vec::new(),
            transactions: 0,
        }
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }

    pub fn with_register(mut self, register: u8, value: u8) -> Self {
        self.set_register(register, value);
        self
    }

    pub fn set_fault(&mut self, fault: Fault) {
        self.fault = fault;
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn register(&self, register: u8) -> u8 {
        self.registers[register as usize]
    }

    pub fn set_register(&mut self, register: u8, value: u8) {
        self.registers[register as usize] = value;
    }

    /// Store `values` at consecutive registers starting at `first`
    pub fn load_registers(&mut self, first: u8, values: &[u8]) {
        for (offset, value) in values.iter().enumerate() {
            let register = first.wrapping_add(offset as u8);
            self.registers[register as usize] = *value;
        }
    }

    pub fn events(&self) -> &[WireEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of descriptors executed so far
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    fn run(&mut self, txn: &Transaction, rx: &mut [u8], timeout: Duration) -> BusResult<()> {
        let started = Instant::now();
        let mut state = SlaveState::Idle;
        let mut data_bytes = 0usize;
        let mut rx_pos = 0usize;

        for command in txn.commands() {
            match *command {
                Command::Start => {
                    self.events.push(WireEvent::Start);
                    state = SlaveState::Idle;
                }
                Command::Write { byte, ack_check } => {
                    if self.fault == Fault::Stall {
                        return Err(stall(started, timeout));
                    }
                    let (acked, next, source) = match state {
                        SlaveState::Idle => {
                            let hit = byte >> 1 == self.address && self.fault != Fault::NackAddress;
                            let next = match (hit, byte & 1) {
                                (false, _) => SlaveState::Ignoring,
                                (true, bit) if bit == Direction::Read as u8 => {
                                    SlaveState::Transmitting
                                }
                                (true, _) => SlaveState::Receiving { pointer_set: false },
                            };
                            (hit, next, AckSource::Address)
                        }
                        SlaveState::Ignoring => (false, SlaveState::Ignoring, AckSource::Data),
                        SlaveState::Receiving { pointer_set } => {
                            let acked = match self.fault {
                                Fault::NackData { after } => data_bytes < after,
                                _ => true,
                            };
                            data_bytes += 1;
                            if acked {
                                if pointer_set {
                                    self.registers[self.pointer as usize] = byte;
                                    self.pointer = self.pointer.wrapping_add(1);
                                } else {
                                    self.pointer = byte;
                                }
                            }
                            (acked, SlaveState::Receiving { pointer_set: true }, AckSource::Data)
                        }
                        SlaveState::Transmitting => {
                            return Err(BusError::Bus(
                                "controller wrote while slave was transmitting".to_string(),
                            ));
                        }
                    };

                    self.events.push(WireEvent::Sent { byte, acked });
                    if !acked && ack_check {
                        return Err(BusError::NoAcknowledge(source));
                    }
                    state = next;
                }
                Command::Read { len, ack } => {
                    if self.fault == Fault::Stall {
                        return Err(stall(started, timeout));
                    }
                    if matches!(state, SlaveState::Idle | SlaveState::Receiving { .. }) {
                        return Err(BusError::Bus(
                            "read issued without a read-addressed slave".to_string(),
                        ));
                    }
                    for i in 0..len {
                        let byte = if state == SlaveState::Transmitting {
                            let byte = self.registers[self.pointer as usize];
                            self.pointer = self.pointer.wrapping_add(1);
                            byte
                        } else {
                            // released SDA reads as ones
                            0xFF
                        };
                        let ack = if i + 1 == len { ack } else { Ack::Ack };
                        self.events.push(WireEvent::Received { byte, ack });

                        let slot = rx.get_mut(rx_pos).ok_or_else(|| BusError::InvalidArgument {
                            reason: format!("receive buffer holds {} bytes", rx_pos),
                        })?;
                        *slot = byte;
                        rx_pos += 1;
                    }
                }
                // issued unconditionally by execute()
                Command::Stop => {}
            }
        }

        Ok(())
    }
}

fn stall(started: Instant, timeout: Duration) -> BusError {
    std::thread::sleep(timeout.saturating_sub(started.elapsed()));
    BusError::Timeout {
        timeout_ms: timeout.as_millis() as u64,
    }
}

impl Controller for SimulatedBus {
    fn execute(&mut self, txn: &Transaction, rx: &mut [u8], timeout: Duration) -> BusResult<()> {
        self.transactions += 1;
        let result = self.run(txn, rx, timeout);
        self.events.push(WireEvent::Stop);
        trace!("[sim] transaction {} -> {:?}", self.transactions, result);
        result
    }
}
