mod device;
mod record;
mod tariff;
mod validation;

pub use device::{consumption_kwh, Device, DEFAULT_DEVICES};
pub use record::{ConsumptionRecord, DailyUsage, ExportRow, GroupedUsage, StoredDevice};
pub use tariff::{Tariff, DEFAULT_TARIFF_PER_KWH};
pub use validation::{
    parse_hours, parse_power, parse_tariff, validate_hours, validate_power, validate_tariff,
    ValidationError,
};

/// Date format used for persisted records and exports.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time-of-day format used for persisted records and exports.
pub const TIME_FORMAT: &str = "%H:%M:%S";
