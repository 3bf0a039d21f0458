mod device;
mod report;

pub use device::DeviceCommands;
pub use report::ReportCommands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use wattlog_model::{parse_hours, parse_tariff, DATE_FORMAT};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List, add or remove devices (default: list)
    #[command(alias = "devices")]
    Device {
        #[command(subcommand)]
        command: Option<DeviceCommands>,
    },

    /// Set hours on per device, show totals and optionally save
    #[command(alias = "monitor")]
    Session {
        /// Hours a device was on, as NAME=HOURS (repeatable)
        #[arg(short, long = "set", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,

        /// Prompt for the hours of every device
        #[arg(short, long)]
        interactive: bool,

        /// Store the session and append it to the export file
        #[arg(long)]
        save: bool,

        /// Export file to append to (overrides config)
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// View and manage recorded consumption (default: show)
    Report {
        #[command(subcommand)]
        command: Option<ReportCommands>,
    },

    /// Show database statistics
    Stats,

    /// Show or edit configuration
    Config {
        /// Print config file path
        #[arg(long)]
        path: bool,

        /// Reset config to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(short, long)]
        edit: bool,
    },

    /// Print the most recent log lines
    Logs {
        #[arg(short, long, default_value_t = 50)]
        lines: usize,
    },
}

/// Household energy consumption tracker
#[derive(Debug, Parser)]
#[command(name = "wattlog", version, verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Database file (defaults to the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Price per kWh, overriding the config file
    #[arg(long, global = true, value_parser = parse_tariff)]
    pub tariff: Option<f64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (name, hours) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=HOURS, got '{}'", s))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing device name in '{}'", s));
    }

    let hours = parse_hours(hours).map_err(|e| e.to_string())?;
    Ok((name.to_string(), hours))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD form", s))
}
