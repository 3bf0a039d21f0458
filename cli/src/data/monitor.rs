use std::collections::HashMap;

use tracing::{debug, error, info, warn};
use wattlog_model::{
    validate_hours, validate_power, ConsumptionRecord, Device, ExportRow, Tariff,
    ValidationError, DEFAULT_DEVICES,
};

use crate::data::export::{ExportError, ExportWriter};
use crate::data::store::{DeviceStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown device '{0}'")]
    UnknownDevice(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

/// Outcome of writing the current session to the store.
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Records written, paired with the device name they belong to
    pub recorded: Vec<(String, ConsumptionRecord)>,
    /// Devices held in memory that no longer have a row in the store
    pub skipped: Vec<String>,
}

impl SessionReport {
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.recorded
            .iter()
            .map(|(name, record)| ExportRow::from_record(record, name.as_str()))
            .collect()
    }
}

#[derive(Debug)]
pub struct SaveOutcome {
    pub session: SessionReport,
    /// Export failures do not undo the database write
    pub export: std::result::Result<usize, ExportError>,
}

/// Holds the device set for one monitoring session and owns the store handle.
///
/// Device additions and removals go to the store first; the in-memory set only
/// changes once the store has accepted the change.
pub struct EnergyMonitor {
    store: DeviceStore,
    devices: Vec<Device>,
    tariff: Tariff,
}

impl EnergyMonitor {
    pub fn new(store: DeviceStore, tariff: Tariff) -> Result<Self> {
        let mut monitor = Self {
            store,
            devices: Vec::new(),
            tariff,
        };
        monitor.reload_devices()?;
        Ok(monitor)
    }

    fn reload_devices(&mut self) -> Result<()> {
        self.devices = self
            .store
            .list_devices()?
            .into_iter()
            .map(|d| Device::new(d.name, d.rated_power_watts))
            .collect();
        debug!(count = self.devices.len(), "Loaded devices");
        Ok(())
    }

    /// Insert the default appliances when the store has none.
    /// Returns how many were added.
    pub fn seed_defaults_if_empty(&mut self) -> Result<usize> {
        if !self.store.list_devices()?.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0;
        for (name, watts) in DEFAULT_DEVICES {
            match self.store.add_device(name, *watts) {
                Ok(_) => inserted += 1,
                Err(StoreError::DuplicateDevice(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(inserted, "Seeded default devices");
        self.reload_devices()?;
        Ok(inserted)
    }

    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, name: &str) -> Option<&Device> {
        let name = name.trim();
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn tariff(&self) -> Tariff {
        self.tariff
    }

    pub fn add_device(&mut self, name: &str, power_watts: f64) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let power_watts = validate_power(power_watts)?;

        self.store.add_device(name, power_watts)?;
        self.devices.push(Device::new(name, power_watts));
        info!(device = name, power_watts, "Device added");
        Ok(())
    }

    /// Returns false if no device with that name was stored.
    pub fn remove_device(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if !self.store.remove_device(name)? {
            debug!(device = name, "Remove requested for unknown device");
            return Ok(false);
        }

        self.devices.retain(|d| d.name != name);
        info!(device = name, "Device removed");
        Ok(true)
    }

    pub fn set_hours(&mut self, name: &str, hours_on: f64) -> Result<()> {
        let name = name.trim();
        let hours_on = validate_hours(hours_on)?;
        let device = self
            .devices
            .iter_mut()
            .find(|d| d.name == name)
            .ok_or_else(|| MonitorError::UnknownDevice(name.to_string()))?;

        device.hours_on = hours_on;
        Ok(())
    }

    /// Total kWh across all devices for the hours set in this session.
    pub fn consumption_total(&self) -> f64 {
        self.devices.iter().map(Device::current_consumption).sum()
    }

    pub fn calculate_cost(&self) -> f64 {
        self.tariff.cost(self.consumption_total())
    }

    /// Write one record per device. Devices missing from the store are
    /// reported back in `skipped` rather than written.
    pub fn register_all_sessions(&self) -> Result<SessionReport> {
        let ids: HashMap<String, i64> = self
            .store
            .list_devices()?
            .into_iter()
            .map(|d| (d.name, d.id))
            .collect();

        let mut report = SessionReport::default();
        for device in &self.devices {
            let Some(&device_id) = ids.get(&device.name) else {
                warn!(device = %device.name, "Device has no stored id, session not recorded");
                report.skipped.push(device.name.clone());
                continue;
            };

            let record = self.store.record_consumption(
                device_id,
                device.hours_on,
                device.current_consumption(),
            )?;
            report.recorded.push((device.name.clone(), record));
        }

        info!(
            recorded = report.recorded.len(),
            skipped = report.skipped.len(),
            "Session registered"
        );
        Ok(report)
    }

    /// Persist the session, then append the same values to the export file.
    pub fn save_session(&self, export: &ExportWriter) -> Result<SaveOutcome> {
        let session = self.register_all_sessions()?;

        let export = export.append(&session.export_rows());
        if let Err(e) = &export {
            error!(error = %e, "Export failed after session was stored");
        }

        Ok(SaveOutcome { session, export })
    }
}
