use color_eyre::eyre::Result;

use crate::config::UserConfig;

use super::open_store;

pub fn run(config: &UserConfig) -> Result<()> {
    let store = open_store(config)?;
    let stats = store.stats()?;

    let range = match (stats.oldest_date, stats.newest_date) {
        (Some(oldest), Some(newest)) => format!("{} to {}", oldest, newest),
        _ => "none".to_string(),
    };

    println!("Database: {}", store.path().display());
    println!("{}", "=".repeat(50));
    println!("Devices:          {}", stats.device_count);
    println!("Records:          {}", stats.record_count);
    if stats.orphaned_records > 0 {
        println!("  of removed devices: {}", stats.orphaned_records);
    }
    println!("Recorded days:    {}", range);
    println!("Size:             {}", stats.size_formatted());
    println!("Tariff:           {} per kWh", config.tariff_per_kwh);

    Ok(())
}
