//! SQLite persistence for registered devices and their consumption records.
//!
//! Devices are keyed by a unique name. Records reference devices by id and are
//! append-only apart from the per-day, per-device delete used by the report.
//! Foreign keys are left unenforced so removing a device keeps its history.

use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use wattlog_model::{
    ConsumptionRecord, DailyUsage, GroupedUsage, StoredDevice, DATE_FORMAT, TIME_FORMAT,
};

const CURRENT_SCHEMA_VERSION: i32 = 1;
const MEMORY_PATH: &str = ":memory:";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device '{0}' already exists")]
    DuplicateDevice(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Device and consumption storage backed by SQLite
pub struct DeviceStore {
    conn: Connection,
    path: PathBuf,
}

impl DeviceStore {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Self::with_connection(conn, path)
    }

    /// Private database that disappears when dropped
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, PathBuf::from(MEMORY_PATH))
    }

    fn with_connection(conn: Connection, path: PathBuf) -> Result<Self> {
        // Some SQLite builds enable enforcement by default.
        conn.execute_batch("PRAGMA foreign_keys=OFF;")?;

        let mut store = Self { conn, path };
        store.initialize_schema()?;
        debug!(path = %store.path.display(), "Device store opened");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> Result<u64> {
        if self.path.to_string_lossy() == MEMORY_PATH {
            return Ok(0);
        }
        Ok(std::fs::metadata(&self.path)?.len())
    }

    fn initialize_schema(&mut self) -> Result<()> {
        if self.get_schema_version()? == 0 {
            self.create_initial_schema()?;
        }
        Ok(())
    }

    /// Get the current schema version (0 if not initialized)
    fn get_schema_version(&self) -> Result<i32> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )?;

        if !exists {
            return Ok(0);
        }

        let version: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        Ok(version)
    }

    fn create_initial_schema(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                power_watts REAL NOT NULL
            );

            -- One row per device per saved session
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                device_id INTEGER NOT NULL REFERENCES devices(id),
                hours_on REAL NOT NULL,
                consumption_kwh REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_date ON records(date);
            "#,
        )?;

        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [CURRENT_SCHEMA_VERSION],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Insert a device, failing with `DuplicateDevice` if the name is taken
    pub fn add_device(&self, name: &str, power_watts: f64) -> Result<i64> {
        match self.conn.execute(
            "INSERT INTO devices (name, power_watts) VALUES (?, ?)",
            params![name, power_watts],
        ) {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(StoreError::DuplicateDevice(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a device by name. Returns false when no such device existed.
    pub fn remove_device(&self, name: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM devices WHERE name = ?", [name])?;
        Ok(deleted > 0)
    }

    pub fn list_devices(&self) -> Result<Vec<StoredDevice>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, power_watts FROM devices ORDER BY id ASC")?;

        let devices = stmt
            .query_map([], |row| {
                Ok(StoredDevice {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    rated_power_watts: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(devices)
    }

    /// Record a session result stamped with the current local date and time
    pub fn record_consumption(
        &self,
        device_id: i64,
        hours_on: f64,
        consumption_kwh: f64,
    ) -> Result<ConsumptionRecord> {
        self.record_consumption_at(
            device_id,
            hours_on,
            consumption_kwh,
            Local::now().naive_local(),
        )
    }

    pub fn record_consumption_at(
        &self,
        device_id: i64,
        hours_on: f64,
        consumption_kwh: f64,
        at: NaiveDateTime,
    ) -> Result<ConsumptionRecord> {
        let date = at.date();
        let time = at.time().with_nanosecond(0).unwrap_or_else(|| at.time());

        self.conn.execute(
            "INSERT INTO records (date, time, device_id, hours_on, consumption_kwh)
             VALUES (?, ?, ?, ?, ?)",
            params![
                date.format(DATE_FORMAT).to_string(),
                time.format(TIME_FORMAT).to_string(),
                device_id,
                hours_on,
                consumption_kwh,
            ],
        )?;

        Ok(ConsumptionRecord {
            id: self.conn.last_insert_rowid(),
            date,
            time,
            device_id,
            hours_on,
            consumption_kwh,
        })
    }

    /// Records for a single day, today when `date` is `None`
    pub fn daily_report(&self, date: Option<NaiveDate>) -> Result<Vec<DailyUsage>> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());

        let mut stmt = self.conn.prepare(
            "SELECT d.name, r.hours_on, r.consumption_kwh
             FROM records r
             JOIN devices d ON r.device_id = d.id
             WHERE r.date = ?
             ORDER BY r.id ASC",
        )?;

        let rows = stmt
            .query_map([date.format(DATE_FORMAT).to_string()], |row| {
                Ok(DailyUsage {
                    device_name: row.get(0)?,
                    hours_on: row.get(1)?,
                    consumption_kwh: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Totals per day and device, most recent day first
    pub fn grouped_report(&self) -> Result<Vec<GroupedUsage>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.date, d.id, d.name,
                    SUM(r.hours_on) AS total_hours,
                    SUM(r.consumption_kwh) AS total_kwh
             FROM records r
             JOIN devices d ON r.device_id = d.id
             GROUP BY r.date, d.id
             ORDER BY r.date DESC, d.id ASC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(GroupedUsage {
                    date: date_column(row, 0)?,
                    device_id: row.get(1)?,
                    device_name: row.get(2)?,
                    total_hours: row.get(3)?,
                    total_kwh: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Delete every record of one device on one day. Returns rows removed.
    pub fn delete_record(&self, date: NaiveDate, device_id: i64) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM records WHERE date = ? AND device_id = ?",
            params![date.format(DATE_FORMAT).to_string(), device_id],
        )?;
        Ok(deleted)
    }

    pub fn record_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let device_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM devices", [], |row| row.get(0))?;

        let orphaned_records: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records r
             WHERE NOT EXISTS (SELECT 1 FROM devices d WHERE d.id = r.device_id)",
            [],
            |row| row.get(0),
        )?;

        let (oldest_date, newest_date): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM records",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(StoreStats {
            device_count,
            record_count: self.record_count()?,
            orphaned_records,
            oldest_date: oldest_date.and_then(|d| parse_date(&d)),
            newest_date: newest_date.and_then(|d| parse_date(&d)),
            size_bytes: self.size_bytes()?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub device_count: i64,
    pub record_count: i64,
    /// Records whose device has since been removed
    pub orphaned_records: i64,
    pub oldest_date: Option<NaiveDate>,
    pub newest_date: Option<NaiveDate>,
    pub size_bytes: u64,
}

impl StoreStats {
    pub fn size_formatted(&self) -> String {
        ByteSize(self.size_bytes).to_string()
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let value: String = row.get(idx)?;
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap()
    }

    #[test]
    fn add_device_rejects_duplicate_names() {
        let store = DeviceStore::open_in_memory().unwrap();
        store.add_device("Fan", 75.0).unwrap();

        let err = store.add_device("Fan", 90.0).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDevice(ref name) if name == "Fan"));

        let devices = store.list_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].rated_power_watts, 75.0);
    }

    #[test]
    fn non_unique_constraint_failures_are_database_errors() {
        let store = DeviceStore::open_in_memory().unwrap();

        // NaN binds as NULL and trips the NOT NULL constraint on power.
        let err = store.add_device("Ghost", f64::NAN).unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(store.list_devices().unwrap().is_empty());

        store.add_device("Ghost", 40.0).unwrap();
        assert!(matches!(
            store.add_device("Ghost", 40.0),
            Err(StoreError::DuplicateDevice(_))
        ));
    }

    #[test]
    fn remove_device_reports_whether_a_row_was_deleted() {
        let store = DeviceStore::open_in_memory().unwrap();
        store.add_device("Fan", 75.0).unwrap();

        assert!(!store.remove_device("Heater").unwrap());
        assert!(store.remove_device("Fan").unwrap());
        assert!(!store.remove_device("Fan").unwrap());
        assert!(store.list_devices().unwrap().is_empty());
    }

    #[test]
    fn list_devices_keeps_insertion_order() {
        let store = DeviceStore::open_in_memory().unwrap();
        store.add_device("TV", 100.0).unwrap();
        store.add_device("Fan", 75.0).unwrap();

        let names: Vec<_> = store
            .list_devices()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["TV", "Fan"]);
    }

    #[test]
    fn record_consumption_returns_what_was_written() {
        let store = DeviceStore::open_in_memory().unwrap();
        let id = store.add_device("Fan", 75.0).unwrap();

        let record = store
            .record_consumption_at(id, 2.0, 0.15, at("2024-03-09", "18:05:42"))
            .unwrap();

        assert_eq!(record.device_id, id);
        assert_eq!(record.date, day("2024-03-09"));
        assert_eq!(record.time.format(TIME_FORMAT).to_string(), "18:05:42");
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn daily_report_defaults_to_today() {
        let store = DeviceStore::open_in_memory().unwrap();
        let id = store.add_device("Fan", 75.0).unwrap();
        store.record_consumption(id, 2.0, 0.15).unwrap();
        store
            .record_consumption_at(id, 9.0, 0.675, at("2001-01-01", "08:00:00"))
            .unwrap();

        let rows = store.daily_report(None).unwrap();
        assert_eq!(
            rows,
            vec![DailyUsage {
                device_name: "Fan".to_string(),
                hours_on: 2.0,
                consumption_kwh: 0.15,
            }]
        );

        let old = store.daily_report(Some(day("2001-01-01"))).unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].hours_on, 9.0);
    }

    #[test]
    fn grouped_report_sums_per_day_and_device_newest_first() {
        let store = DeviceStore::open_in_memory().unwrap();
        let fan = store.add_device("Fan", 75.0).unwrap();
        let tv = store.add_device("TV", 100.0).unwrap();

        store
            .record_consumption_at(fan, 1.0, 0.075, at("2024-03-08", "10:00:00"))
            .unwrap();
        store
            .record_consumption_at(tv, 2.0, 0.2, at("2024-03-09", "10:00:00"))
            .unwrap();
        store
            .record_consumption_at(fan, 2.0, 0.15, at("2024-03-09", "11:00:00"))
            .unwrap();
        store
            .record_consumption_at(fan, 1.0, 0.075, at("2024-03-09", "21:00:00"))
            .unwrap();

        let rows = store.grouped_report().unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].date, day("2024-03-09"));
        assert_eq!(rows[0].device_name, "Fan");
        assert_eq!(rows[0].total_hours, 3.0);
        assert!((rows[0].total_kwh - 0.225).abs() < 1e-12);

        assert_eq!(rows[1].device_name, "TV");
        assert_eq!(rows[2].date, day("2024-03-08"));
    }

    #[test]
    fn delete_record_removes_only_matching_day_and_device() {
        let store = DeviceStore::open_in_memory().unwrap();
        let fan = store.add_device("Fan", 75.0).unwrap();
        let tv = store.add_device("TV", 100.0).unwrap();

        store
            .record_consumption_at(fan, 1.0, 0.075, at("2024-03-09", "10:00:00"))
            .unwrap();
        store
            .record_consumption_at(fan, 1.0, 0.075, at("2024-03-09", "12:00:00"))
            .unwrap();
        store
            .record_consumption_at(tv, 1.0, 0.1, at("2024-03-09", "12:00:00"))
            .unwrap();
        store
            .record_consumption_at(fan, 1.0, 0.075, at("2024-03-10", "12:00:00"))
            .unwrap();

        assert_eq!(store.delete_record(day("2024-03-09"), fan).unwrap(), 2);
        assert_eq!(store.record_count().unwrap(), 2);

        assert_eq!(store.delete_record(day("2024-03-09"), fan).unwrap(), 0);
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn removing_a_device_keeps_its_records_as_orphans() {
        let store = DeviceStore::open_in_memory().unwrap();
        let fan = store.add_device("Fan", 75.0).unwrap();
        store.record_consumption(fan, 1.0, 0.075).unwrap();

        assert!(store.remove_device("Fan").unwrap());

        let stats = store.stats().unwrap();
        assert_eq!(stats.record_count, 1);
        assert_eq!(stats.orphaned_records, 1);
        assert!(store.grouped_report().unwrap().is_empty());
    }

    #[test]
    fn stats_on_empty_store() {
        let store = DeviceStore::open_in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.device_count, 0);
        assert_eq!(stats.record_count, 0);
        assert!(stats.oldest_date.is_none());
        assert_eq!(stats.size_bytes, 0);
    }

    #[test]
    fn reopening_a_file_database_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("energy.db");

        {
            let store = DeviceStore::open(&path).unwrap();
            store.add_device("Fan", 75.0).unwrap();
        }

        let store = DeviceStore::open(&path).unwrap();
        let devices = store.list_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!((devices[0].id, devices[0].name.as_str()), (1, "Fan"));
        assert!(store.size_bytes().unwrap() > 0);
    }
}
