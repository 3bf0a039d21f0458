use color_eyre::eyre::Result;

use crate::cli::DeviceCommands;
use crate::config::UserConfig;
use crate::data::{MonitorError, StoreError};

use super::open_monitor;

pub fn run(config: &UserConfig, command: Option<DeviceCommands>) -> Result<()> {
    let mut monitor = open_monitor(config)?;

    match command.unwrap_or(DeviceCommands::List) {
        DeviceCommands::List => {
            let devices = monitor.store().list_devices()?;
            if devices.is_empty() {
                println!("No devices registered.");
                println!("\nAdd one with:");
                println!("  wattlog device add <name> <watts>");
                return Ok(());
            }

            println!("{:<4} {:<30} {:>10}", "Id", "Device", "Power (W)");
            println!("{}", "-".repeat(46));
            for device in devices {
                println!(
                    "{:<4} {:<30} {:>10.1}",
                    device.id,
                    truncate_str(&device.name, 30),
                    device.rated_power_watts
                );
            }
        }
        DeviceCommands::Add { name, watts } => match monitor.add_device(&name, watts) {
            Ok(()) => {
                if let Some(device) = monitor.device(&name) {
                    println!(
                        "Device '{}' added ({} W).",
                        device.name, device.rated_power_watts
                    );
                }
            }
            Err(MonitorError::Store(StoreError::DuplicateDevice(name))) => {
                eprintln!("Device '{}' already exists.", name);
                std::process::exit(1);
            }
            Err(MonitorError::Validation(e)) => {
                eprintln!("Invalid device: {}", e);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        DeviceCommands::Remove { name } => {
            if monitor.remove_device(&name)? {
                println!("Device '{}' removed.", name.trim());
            } else {
                eprintln!("No device named '{}'.", name.trim());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
