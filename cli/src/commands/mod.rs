pub mod config;
pub mod device;
pub mod logs;
pub mod report;
pub mod session;
pub mod stats;

use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use crate::config::UserConfig;
use crate::data::{DeviceStore, EnergyMonitor};

pub fn open_store(config: &UserConfig) -> Result<DeviceStore> {
    let path = config.database_path();
    DeviceStore::open(&path)
        .wrap_err_with(|| format!("Failed to open database at {}", path.display()))
}

/// Open the store and load the device set, seeding defaults on first run.
pub fn open_monitor(config: &UserConfig) -> Result<EnergyMonitor> {
    let store = open_store(config)?;
    let mut monitor = EnergyMonitor::new(store, config.tariff())?;

    if config.seed_defaults {
        let seeded = monitor.seed_defaults_if_empty()?;
        if seeded > 0 {
            info!(seeded, "Initialized empty database with default devices");
        }
    }

    Ok(monitor)
}
