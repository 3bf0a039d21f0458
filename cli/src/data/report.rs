//! Day-by-day view over the grouped consumption records.
//!
//! Costs use the tariff the view was built with, so totals for past days move
//! when the configured tariff changes.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use wattlog_model::{GroupedUsage, Tariff, DATE_FORMAT};

use crate::data::store::{DeviceStore, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub device_id: i64,
    pub device_name: String,
    pub hours_on: f64,
    pub consumption_kwh: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDay {
    pub date: NaiveDate,
    pub entries: Vec<ReportEntry>,
    pub total_kwh: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedReport {
    pub tariff_per_kwh: f64,
    /// Most recent day first
    pub days: Vec<ReportDay>,
    pub total_kwh: f64,
    pub total_cost: f64,
}

impl GroupedReport {
    /// Bucket grouped rows by date. Entry order within a day follows `rows`.
    pub fn build(rows: Vec<GroupedUsage>, tariff: Tariff) -> Self {
        let mut buckets: BTreeMap<NaiveDate, Vec<ReportEntry>> = BTreeMap::new();
        let mut total_kwh = 0.0;

        for row in rows {
            total_kwh += row.total_kwh;
            buckets.entry(row.date).or_default().push(ReportEntry {
                device_id: row.device_id,
                device_name: row.device_name,
                hours_on: row.total_hours,
                consumption_kwh: row.total_kwh,
                cost: tariff.cost(row.total_kwh),
            });
        }

        let days = buckets
            .into_iter()
            .rev()
            .map(|(date, entries)| {
                let day_kwh: f64 = entries.iter().map(|e| e.consumption_kwh).sum();
                ReportDay {
                    date,
                    entries,
                    total_kwh: day_kwh,
                    total_cost: tariff.cost(day_kwh),
                }
            })
            .collect();

        Self {
            tariff_per_kwh: tariff.per_kwh(),
            days,
            total_kwh,
            total_cost: tariff.cost(total_kwh),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&ReportDay> {
        self.days.iter().find(|d| d.date == date)
    }

    pub fn render(&self) -> String {
        if self.is_empty() {
            return "No consumption data found.\n".to_string();
        }

        let mut out = String::new();
        for day in &self.days {
            let _ = writeln!(
                out,
                "{} ({:.3} kWh)",
                day.date.format(DATE_FORMAT),
                day.total_kwh
            );
            for entry in &day.entries {
                let _ = writeln!(
                    out,
                    "  [{:>3}] {}: {:.2}h = {:.3}kWh ({:.2})",
                    entry.device_id,
                    entry.device_name,
                    entry.hours_on,
                    entry.consumption_kwh,
                    entry.cost
                );
            }
        }

        let _ = writeln!(out, "{}", "-".repeat(50));
        let _ = writeln!(out, "TOTAL CONSUMPTION: {:.3}kWh", self.total_kwh);
        let _ = writeln!(out, "TOTAL COST:        {:.2}", self.total_cost);
        out
    }
}

/// A report bound to the store it was read from, refreshed after deletes.
pub struct ReportView {
    tariff: Tariff,
    report: GroupedReport,
}

impl ReportView {
    pub fn load(store: &DeviceStore, tariff: Tariff) -> Result<Self> {
        let report = GroupedReport::build(store.grouped_report()?, tariff);
        Ok(Self { tariff, report })
    }

    pub fn report(&self) -> &GroupedReport {
        &self.report
    }

    pub fn refresh(&mut self, store: &DeviceStore) -> Result<()> {
        self.report = GroupedReport::build(store.grouped_report()?, self.tariff);
        Ok(())
    }

    /// Remove one device's records for one day and rebuild the view.
    pub fn delete(
        &mut self,
        store: &DeviceStore,
        date: NaiveDate,
        device_id: i64,
    ) -> Result<usize> {
        let deleted = store.delete_record(date, device_id)?;
        info!(%date, device_id, deleted, "Deleted report entry");
        self.refresh(store)?;
        Ok(deleted)
    }
}
