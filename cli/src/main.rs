mod cli;
mod commands;
mod config;
mod data;
mod logging;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::{Cli, Commands};
use config::{ensure_dirs, LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let mut config = UserConfig::load();
    config.merge_with_args(cli.db, cli.tariff);
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);

    // Prompts share the terminal, so interactive sessions log to file.
    let mode = match &cli.command {
        Some(Commands::Session {
            interactive: true, ..
        }) => LogMode::File,
        _ => LogMode::Stderr,
    };
    let _guard = logging::init(config.log_level, mode, log_level_override);

    match cli.command {
        Some(Commands::Device { command }) => commands::device::run(&config, command),
        Some(Commands::Session {
            set,
            interactive,
            save,
            export,
        }) => commands::session::run(&config, set, interactive, save, export),
        Some(Commands::Report { command }) => commands::report::run(&config, command),
        Some(Commands::Stats) => commands::stats::run(&config),
        Some(Commands::Config { path, reset, edit }) => {
            commands::config::run(&config, path, reset, edit)
        }
        Some(Commands::Logs { lines }) => commands::logs::run(lines),
        None => commands::device::run(&config, None),
    }
}
