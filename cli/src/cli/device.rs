use clap::Subcommand;
use wattlog_model::parse_power;

#[derive(Debug, Subcommand)]
pub enum DeviceCommands {
    /// List registered devices
    #[command(alias = "ls")]
    List,

    /// Register a new device
    Add {
        /// Device name (must be unique)
        name: String,

        /// Rated power in watts
        #[arg(value_parser = parse_power)]
        watts: f64,
    },

    /// Remove a device; its past records are kept
    #[command(alias = "rm")]
    Remove { name: String },
}
