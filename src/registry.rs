use crate::bus::i2c::RegisterEngine;
use crate::bus::sim::SimulatedBus;
use crate::bus::{BusKind, Controller};
use crate::config::{BusSettings, DeviceSettings};
use crate::errors::{RegistryError, RegistryResult};
use crate::sensors::{Mmc5603, MMC5603NJ};
use tracing::{error, info, warn};

/// Open the configured bus backend
pub fn open_bus(
    bus: &BusSettings,
    device: &DeviceSettings,
) -> RegistryResult<Box<dyn Controller + Send>> {
    let kind = BusKind::from_str(&bus.kind).ok_or_else(|| RegistryError::UnsupportedBus {
        kind: bus.kind.clone(),
    })?;

    info!(
        "[bus] port={} sda={} scl={} pullups={}/{} clock={}Hz timeout={}ms",
        bus.port,
        bus.sda_io,
        bus.scl_io,
        bus.sda_pullup,
        bus.scl_pullup,
        bus.clock_hz,
        bus.timeout_ms
    );

    match kind {
        BusKind::Simulated => {
            warn!("[bus] using simulated device at {:#04x}", device.address);
            let sim = SimulatedBus::new(device.address)
                .with_register(MMC5603NJ.who_am_i, MMC5603NJ.device_id);
            Ok(Box::new(sim))
        }
        BusKind::Linux => open_linux(bus),
    }
}

#[cfg(feature = "linux-hal")]
fn open_linux(bus: &BusSettings) -> RegistryResult<Box<dyn Controller + Send>> {
    use crate::bus::hal::LinuxController;

    let path = bus
        .path
        .clone()
        .unwrap_or_else(|| format!("/dev/i2c-{}", bus.port));
    let controller = LinuxController::open(&path).map_err(|e| RegistryError::BusOpen {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    info!("[bus] opened {}", path);
    Ok(Box::new(controller))
}

#[cfg(not(feature = "linux-hal"))]
fn open_linux(bus: &BusSettings) -> RegistryResult<Box<dyn Controller + Send>> {
    Err(RegistryError::UnsupportedBus {
        kind: format!("{} (built without the linux-hal feature)", bus.kind),
    })
}

/// Build the device handle and verify its identity on the bus
pub fn init_device<C: Controller + ?Sized>(
    bus: &mut C,
    settings: &DeviceSettings,
    engine: RegisterEngine,
) -> RegistryResult<Mmc5603> {
    let device = Mmc5603::new(
        settings.id.clone(),
        settings.address,
        settings.expected_id,
        engine,
    );
    info!(
        "[registry] registering device: id={} address={:#04x}",
        settings.id, settings.address
    );

    if let Err(e) = device.identify(bus) {
        error!("[registry] {}", e);
        return Err(RegistryError::RegistrationError(e));
    }
    Ok(device)
}
