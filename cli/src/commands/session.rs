use std::io::{BufRead, Write};
use std::path::PathBuf;

use color_eyre::eyre::Result;
use wattlog_model::parse_hours;

use crate::config::UserConfig;
use crate::data::{EnergyMonitor, ExportWriter, MonitorError};

use super::device::truncate_str;
use super::open_monitor;

pub fn run(
    config: &UserConfig,
    assignments: Vec<(String, f64)>,
    interactive: bool,
    save: bool,
    export: Option<PathBuf>,
) -> Result<()> {
    let mut monitor = open_monitor(config)?;

    if monitor.devices().is_empty() {
        println!("No devices registered. Add one with `wattlog device add <name> <watts>`.");
        return Ok(());
    }

    for (name, hours) in assignments {
        match monitor.set_hours(&name, hours) {
            Ok(()) => {}
            Err(MonitorError::UnknownDevice(name)) => {
                eprintln!("Error: no device named '{}'.", name);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if interactive {
        let stdin = std::io::stdin();
        prompt_hours(&mut monitor, &mut stdin.lock(), &mut std::io::stdout())?;
    }

    print_summary(&monitor);

    if save {
        let path = export.unwrap_or_else(|| config.export_path.clone());
        save_session(&monitor, &ExportWriter::new(path))?;
    }

    Ok(())
}

/// Ask for each device's hours on. Blank input keeps the current value and
/// invalid input is reported and asked again.
fn prompt_hours<R: BufRead, W: Write>(
    monitor: &mut EnergyMonitor,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    writeln!(output, "Enter hours on for each device (e.g. 1.5 for 1h30min).")?;

    let devices: Vec<_> = monitor
        .devices()
        .iter()
        .map(|d| (d.name.clone(), d.rated_power_watts, d.hours_on))
        .collect();

    for (name, watts, current) in devices {
        loop {
            write!(output, "{} ({} W) [{}]: ", name, watts, current)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(());
            }
            if line.trim().is_empty() {
                break;
            }

            match parse_hours(&line) {
                Ok(hours) => {
                    monitor.set_hours(&name, hours)?;
                    break;
                }
                Err(e) => writeln!(output, "  Invalid value: {}", e)?,
            }
        }
    }

    Ok(())
}

fn print_summary(monitor: &EnergyMonitor) {
    println!();
    println!(
        "{:<30} {:>10} {:>8} {:>10}",
        "Device", "Power (W)", "Hours", "kWh"
    );
    println!("{}", "-".repeat(61));
    for device in monitor.devices() {
        println!(
            "{:<30} {:>10.1} {:>8.2} {:>10.4}",
            truncate_str(&device.name, 30),
            device.rated_power_watts,
            device.hours_on,
            device.current_consumption()
        );
    }
    println!("{}", "-".repeat(61));
    println!("Total consumption: {:.4} kWh", monitor.consumption_total());
    println!(
        "Total cost:        {:.2} (at {} per kWh)",
        monitor.calculate_cost(),
        monitor.tariff().per_kwh()
    );
}

fn save_session(monitor: &EnergyMonitor, export: &ExportWriter) -> Result<()> {
    let outcome = monitor.save_session(export)?;

    println!();
    println!("Saved {} record(s).", outcome.session.recorded.len());
    for name in &outcome.session.skipped {
        eprintln!(
            "Warning: '{}' is no longer in the database, its session was not saved.",
            name
        );
    }

    match outcome.export {
        Ok(rows) => println!("Appended {} row(s) to {}", rows, export.path().display()),
        Err(e) => eprintln!("Warning: data saved but export failed: {}", e),
    }

    Ok(())
}
