use crate::bus::i2c::RegisterEngine;
use crate::bus::Controller;
use crate::errors::{SensorError, SensorResult};
use tracing::{debug, info};

/// Register map of an MMC5603NJ-class magnetometer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    pub address: u8,
    pub who_am_i: u8,
    pub device_id: u8,
    /// First register of the raw output block
    pub xout0: u8,
    pub xyz_data_cfg: u8,
    pub ctrl0: u8,
    pub ctrl1: u8,
    pub ctrl2: u8,
}

pub const MMC5603NJ: RegisterMap = RegisterMap {
    address: 0x30,
    who_am_i: 0x39,
    device_id: 0x10,
    xout0: 0x00,
    xyz_data_cfg: 0x0E,
    ctrl0: 0x1A,
    ctrl1: 0x1C,
    ctrl2: 0x1D,
};

/// Length of the raw output block starting at `xout0`
pub const RAW_BLOCK_LEN: usize = 9;

#[derive(Debug)]
pub struct Mmc5603 {
    id: String,
    address: u8,
    expected_id: u8,
    map: RegisterMap,
    engine: RegisterEngine,
}

impl Mmc5603 {
    pub fn new(id: String, address: u8, expected_id: u8, engine: RegisterEngine) -> Self {
        Self {
            id,
            address,
            expected_id,
            map: MMC5603NJ,
            engine,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn registers(&self) -> &RegisterMap {
        &self.map
    }

    /// Read WHO_AM_I and compare it against the expected identity.
    pub fn identify<C: Controller + ?Sized>(&self, bus: &mut C) -> SensorResult<u8> {
        let mut who_am_i_buf = [0u8; 1];
        self.engine
            .read(bus, self.address, self.map.who_am_i, &mut who_am_i_buf)?;

        let actual = who_am_i_buf[0];
        if actual != self.expected_id {
            return Err(SensorError::WrongChipId {
                sensor: self.id.clone(),
                expected: self.expected_id,
                actual,
            });
        }

        info!("[{}] ID:{:#04x} (ok)", self.id, actual);
        Ok(actual)
    }

    pub fn write_control<C: Controller + ?Sized>(
        &self,
        bus: &mut C,
        register: u8,
        value: u8,
    ) -> SensorResult<()> {
        debug!("[{}] reg {:#04x} <- {:#04x}", self.id, register, value);
        self.engine
            .write_byte(bus, self.address, register, value)
            .map_err(|e| SensorError::InitError {
                sensor: self.id.clone(),
                reason: format!("Failed to write register {:#04x}: {}", register, e),
            })
    }

    /// Raw output block, uninterpreted
    pub fn read_raw_block<C: Controller + ?Sized>(
        &self,
        bus: &mut C,
    ) -> SensorResult<[u8; RAW_BLOCK_LEN]> {
        let mut raw = [0u8; RAW_BLOCK_LEN];
        self.engine.read(bus, self.address, self.map.xout0, &mut raw)?;
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::sim::{Fault, SimulatedBus};
    use crate::errors::BusError;

    fn device() -> Mmc5603 {
        Mmc5603::new(
            "mmc5603".to_string(),
            MMC5603NJ.address,
            MMC5603NJ.device_id,
            RegisterEngine::default(),
        )
    }

    #[test]
    fn test_identify_matches_device_id() {
        let mut bus = SimulatedBus::new(0x30).with_register(MMC5603NJ.who_am_i, 0x10);
        assert_eq!(device().identify(&mut bus).unwrap(), 0x10);
    }

    #[test]
    fn test_identify_reports_mismatch() {
        let mut bus = SimulatedBus::new(0x30).with_register(MMC5603NJ.who_am_i, 0x01);
        match device().identify(&mut bus) {
            Err(SensorError::WrongChipId { expected, actual, .. }) => {
                assert_eq!(expected, 0x10);
                assert_eq!(actual, 0x01);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_identify_propagates_bus_failure() {
        let mut bus = SimulatedBus::new(0x30).with_fault(Fault::NackAddress);
        assert!(matches!(
            device().identify(&mut bus),
            Err(SensorError::Bus(BusError::NoAcknowledge(_)))
        ));
    }

    #[test]
    fn test_control_write_and_raw_block() {
        let mut bus = SimulatedBus::new(0x30);
        bus.load_registers(0x00, &[9, 8, 7, 6, 5, 4, 3, 2, 1]);
        let dev = device();

        dev.write_control(&mut bus, MMC5603NJ.ctrl0, 0x21).unwrap();
        assert_eq!(bus.register(0x1A), 0x21);
        assert_eq!(dev.read_raw_block(&mut bus).unwrap(), [9, 8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_control_write_failure_is_init_error() {
        let mut bus = SimulatedBus::new(0x30).with_fault(Fault::NackData { after: 0 });
        assert!(matches!(
            device().write_control(&mut bus, MMC5603NJ.ctrl1, 0x80),
            Err(SensorError::InitError { .. })
        ));
    }
}
