use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{DATE_FORMAT, TIME_FORMAT};

/// A device row as persisted, including its surrogate id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDevice {
    pub id: i64,
    pub name: String,
    pub rated_power_watts: f64,
}

/// One persisted entry of a device's energy use during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub device_id: i64,
    pub hours_on: f64,
    pub consumption_kwh: f64,
}

/// Per-device line of a single day's report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub device_name: String,
    pub hours_on: f64,
    pub consumption_kwh: f64,
}

/// Records summed over one device on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedUsage {
    pub date: NaiveDate,
    pub device_id: i64,
    pub device_name: String,
    pub total_hours: f64,
    pub total_kwh: f64,
}

/// A line of the flat-file export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub device_name: String,
    pub hours_on: f64,
    pub consumption_kwh: f64,
}

impl ExportRow {
    pub fn from_record(record: &ConsumptionRecord, device_name: impl Into<String>) -> Self {
        Self {
            date: record.date,
            time: record.time,
            device_name: device_name.into(),
            hours_on: record.hours_on,
            consumption_kwh: record.consumption_kwh,
        }
    }

    /// Column values in header order.
    pub fn fields(&self) -> [String; 5] {
        [
            self.date.format(DATE_FORMAT).to_string(),
            self.time.format(TIME_FORMAT).to_string(),
            self.device_name.clone(),
            self.hours_on.to_string(),
            self.consumption_kwh.to_string(),
        ]
    }
}
