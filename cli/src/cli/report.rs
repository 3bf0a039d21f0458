use chrono::NaiveDate;
use clap::Subcommand;

use super::parse_date;

#[derive(Debug, Subcommand)]
pub enum ReportCommands {
    /// Consumption grouped by day and device (default)
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Entries recorded on a single day
    Daily {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Delete one device's records for one day
    Delete {
        /// Day (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,

        /// Device id as shown in the report
        #[arg(long)]
        device_id: i64,
    },
}
