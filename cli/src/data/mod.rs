pub mod export;
pub mod monitor;
pub mod report;
pub mod store;

pub use export::ExportWriter;
pub use monitor::{EnergyMonitor, MonitorError};
pub use report::ReportView;
pub use store::{DeviceStore, StoreError};
