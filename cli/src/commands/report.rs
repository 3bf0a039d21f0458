use color_eyre::eyre::Result;

use crate::cli::ReportCommands;
use crate::config::UserConfig;
use crate::data::ReportView;

use super::device::truncate_str;
use super::open_store;

pub fn run(config: &UserConfig, command: Option<ReportCommands>) -> Result<()> {
    let store = open_store(config)?;
    let tariff = config.tariff();

    match command.unwrap_or(ReportCommands::Show { json: false }) {
        ReportCommands::Show { json } => {
            let view = ReportView::load(&store, tariff)?;
            if json {
                println!("{}", serde_json::to_string_pretty(view.report())?);
            } else {
                print!("{}", view.report().render());
            }
        }
        ReportCommands::Daily { date } => {
            let rows = store.daily_report(date)?;
            let label = date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "today".to_string());

            println!("Daily Report ({})", label);
            println!("{}", "=".repeat(60));

            if rows.is_empty() {
                println!("No consumption recorded.");
                return Ok(());
            }

            println!(
                "{:<30} {:>8} {:>10} {:>9}",
                "Device", "Hours", "kWh", "Cost"
            );
            println!("{}", "-".repeat(60));
            let mut total_kwh = 0.0;
            for row in &rows {
                total_kwh += row.consumption_kwh;
                println!(
                    "{:<30} {:>8.2} {:>10.3} {:>9.2}",
                    truncate_str(&row.device_name, 30),
                    row.hours_on,
                    row.consumption_kwh,
                    tariff.cost(row.consumption_kwh)
                );
            }
            println!("{}", "-".repeat(60));
            println!(
                "{:<30} {:>8} {:>10.3} {:>9.2}",
                "Total",
                "",
                total_kwh,
                tariff.cost(total_kwh)
            );
        }
        ReportCommands::Delete { date, device_id } => {
            let mut view = ReportView::load(&store, tariff)?;
            let label = view
                .report()
                .day(date)
                .and_then(|day| day.entries.iter().find(|e| e.device_id == device_id))
                .map(|e| format!("'{}'", e.device_name))
                .unwrap_or_else(|| format!("device {}", device_id));
            let deleted = view.delete(&store, date, device_id)?;

            if deleted == 0 {
                println!("No records for {} on {}.", label, date);
            } else {
                println!("Deleted {} record(s) for {} on {}.\n", deleted, label, date);
                print!("{}", view.report().render());
            }
        }
    }

    Ok(())
}
