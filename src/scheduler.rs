use crate::bus::SharedBus;
use crate::config::DeviceSettings;
use crate::sensors::{hex, Mmc5603};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

/// Outcome counters of a sampling run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SamplerStats {
    pub taken: u64,
    pub failed: u64,
}

/// Periodically read the device's raw output block.
///
/// Returns once `settings.samples` ticks have elapsed; never returns when no
/// sample count is configured. Read errors are logged and sampling continues.
pub async fn run_sampler(
    device: Mmc5603,
    bus: SharedBus,
    settings: &DeviceSettings,
) -> SamplerStats {
    let mut ticker = interval(settings.sample_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = SamplerStats::default();

    info!(
        "[{}] sampling every {}ms",
        device.id(),
        settings.sample_period_ms
    );

    loop {
        if settings.samples.is_some_and(|n| stats.taken + stats.failed >= n) {
            break;
        }
        ticker.tick().await;

        let mut bus_lock = bus.lock().await;
        let result = match settings.trigger {
            Some(value) => device
                .write_control(&mut *bus_lock, device.registers().ctrl0, value)
                .and_then(|_| device.read_raw_block(&mut *bus_lock)),
            None => device.read_raw_block(&mut *bus_lock),
        };
        drop(bus_lock); // Release lock early

        match result {
            Ok(raw) => {
                stats.taken += 1;
                info!("[{}] #{} raw: {}", device.id(), stats.taken, hex(&raw));
            }
            Err(e) => {
                stats.failed += 1;
                warn!("[{}] sample read error: {}", device.id(), e);
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::i2c::RegisterEngine;
    use crate::bus::sim::{Fault, SimulatedBus};
    use crate::bus::Controller;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn settings(samples: u64) -> DeviceSettings {
        DeviceSettings {
            sample_period_ms: 5,
            samples: Some(samples),
            ..DeviceSettings::default()
        }
    }

    fn device(settings: &DeviceSettings) -> Mmc5603 {
        Mmc5603::new(
            settings.id.clone(),
            settings.address,
            settings.expected_id,
            RegisterEngine::default(),
        )
    }

    #[tokio::test]
    async fn test_sampler_takes_configured_samples() {
        let settings = DeviceSettings {
            trigger: Some(0x21),
            ..settings(3)
        };
        let sim = SimulatedBus::new(0x30);
        let bus: SharedBus = Arc::new(Mutex::new(Box::new(sim) as Box<dyn Controller + Send>));

        let stats = run_sampler(device(&settings), bus, &settings).await;
        assert_eq!(stats, SamplerStats { taken: 3, failed: 0 });
    }

    #[tokio::test]
    async fn test_sampler_counts_failures_and_continues() {
        let settings = settings(2);
        let sim = SimulatedBus::new(0x30).with_fault(Fault::NackAddress);
        let bus: SharedBus = Arc::new(Mutex::new(Box::new(sim) as Box<dyn Controller + Send>));

        let stats = run_sampler(device(&settings), bus, &settings).await;
        assert_eq!(stats, SamplerStats { taken: 0, failed: 2 });
    }
}
