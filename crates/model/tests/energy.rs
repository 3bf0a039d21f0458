use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;

use wattlog_model::*;

fn sample_record() -> ConsumptionRecord {
    ConsumptionRecord {
        id: 7,
        date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        time: NaiveTime::from_hms_opt(18, 5, 42).unwrap(),
        device_id: 3,
        hours_on: 2.0,
        consumption_kwh: 0.15,
    }
}

#[test]
fn consumption_matches_formula_for_range_of_inputs() {
    for (watts, hours) in [(75.0, 2.0), (2100.0, 0.25), (60.0, 7.5), (1.0, 0.0)] {
        let device = Device::new("load", watts).with_hours(hours);
        assert_relative_eq!(device.current_consumption(), watts * hours / 1000.0);
    }
}

#[test]
fn two_device_session_cost_with_default_tariff() {
    let devices = [
        Device::new("Air Conditioner", 2000.0).with_hours(0.75),
        Device::new("TV", 100.0).with_hours(3.0),
    ];
    let total: f64 = devices.iter().map(Device::current_consumption).sum();
    let cost = Tariff::new(0.18895).cost(total);

    assert_relative_eq!(total, 1.8, epsilon = 1e-12);
    assert_eq!(format!("{:.6}", cost), "0.340110");
}

#[test]
fn export_row_carries_record_values() {
    let row = ExportRow::from_record(&sample_record(), "Fan");
    let fields = row.fields();

    assert_eq!(fields[0], "2024-03-09");
    assert_eq!(fields[1], "18:05:42");
    assert_eq!(fields[2], "Fan");
    assert_eq!(fields[4], "0.15");
}

#[test]
fn grouped_usage_serializes_dates_as_iso_strings() {
    let usage = GroupedUsage {
        date: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        device_id: 3,
        device_name: "Fan".to_string(),
        total_hours: 2.0,
        total_kwh: 0.15,
    };

    let json = serde_json::to_value(&usage).unwrap();
    assert_eq!(json["date"], "2024-03-09");
    assert_eq!(json["device_name"], "Fan");
}

#[test]
fn tariff_serializes_as_bare_number() {
    let json = serde_json::to_string(&Tariff::new(0.25)).unwrap();
    assert_eq!(json, "0.25");
}
