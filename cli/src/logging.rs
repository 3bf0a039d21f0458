use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{runtime_dir, LogLevel};

pub const LOG_FILE_PREFIX: &str = "wattlog";
const KEEP_LOG_FILES: usize = 7;

/// Dependencies that only get to speak up when something is wrong.
const QUIET_TARGETS: &[&str] = &["rusqlite=warn"];

static INIT: OnceLock<()> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// Rolling file in the runtime dir; keeps prompts on the terminal clean.
    File,
    Stderr,
}

/// Flushes the file writer when dropped. Hold it for the life of `main`.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

pub fn init(level: LogLevel, mode: LogMode, cli_override: Option<LogLevel>) -> LogGuard {
    let mut guard = None;

    INIT.get_or_init(|| {
        let Some(level) = cli_override.unwrap_or(level).as_tracing_level() else {
            return;
        };

        let file = match mode {
            LogMode::File => rolling_writer(),
            LogMode::Stderr => None,
        };

        let (file_layer, stderr_layer) = match file {
            Some((writer, worker)) => {
                guard = Some(worker);
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_timer(UtcTime::rfc_3339())
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true);
                (Some(layer), None)
            }
            None => {
                let layer = fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_timer(UtcTime::rfc_3339())
                    .with_target(true);
                (None, Some(layer))
            }
        };

        tracing_subscriber::registry()
            .with(env_filter(level))
            .with(file_layer)
            .with(stderr_layer)
            .init();
    });

    LogGuard { _guard: guard }
}

/// `RUST_LOG` wins over the configured level; quiet targets are always capped.
fn env_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    QUIET_TARGETS
        .iter()
        .filter_map(|target| target.parse::<Directive>().ok())
        .fold(filter, EnvFilter::add_directive)
}

/// Daily rolling writer, or `None` when the log dir is unusable so the caller
/// can log to stderr instead.
fn rolling_writer() -> Option<(NonBlocking, WorkerGuard)> {
    let log_dir = runtime_dir();

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: cannot create log directory {:?}: {}", log_dir, e);
        return None;
    }

    match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEEP_LOG_FILES)
        .build(&log_dir)
    {
        Ok(appender) => Some(tracing_appender::non_blocking(appender)),
        Err(e) => {
            eprintln!("Warning: cannot open log file in {:?}: {}", log_dir, e);
            None
        }
    }
}

/// Rolling log files written so far, oldest first.
pub fn log_files() -> Vec<PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(runtime_dir())
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|path| is_log_file(path))
                .collect()
        })
        .unwrap_or_default();

    files.sort();
    files
}

fn is_log_file(path: &std::path::Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log")
}
