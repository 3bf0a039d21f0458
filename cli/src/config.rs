use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use wattlog_model::{validate_tariff, Tariff, DEFAULT_TARIFF_PER_KWH};

const APP_DIR: &str = "wattlog";
const DATABASE_NAME: &str = "energy.db";
const DEFAULT_EXPORT_FILE: &str = "energy_monitor.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "none" => LogLevel::Off,
            "error" => LogLevel::Error,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Warn,
        }
    }

    pub fn as_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Trace => Some(tracing::Level::TRACE),
        }
    }
}

fn default_tariff() -> f64 {
    DEFAULT_TARIFF_PER_KWH
}

fn default_export_path() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_FILE)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    #[serde(default = "default_tariff")]
    pub tariff_per_kwh: f64,
    /// Overrides the database location under the data directory.
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
    pub seed_defaults: bool,
    pub log_level: LogLevel,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            tariff_per_kwh: DEFAULT_TARIFF_PER_KWH,
            database_path: None,
            export_path: default_export_path(),
            seed_defaults: true,
            log_level: LogLevel::default(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join(APP_DIR)
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join(APP_DIR)
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn default_database_path() -> PathBuf {
    data_dir().join(DATABASE_NAME)
}

pub fn ensure_dirs() -> std::io::Result<()> {
    fs::create_dir_all(config_dir())?;
    fs::create_dir_all(data_dir())?;
    Ok(())
}

impl UserConfig {
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    fn parse(content: &str) -> Self {
        let mut config: Self = toml::from_str(content).unwrap_or_default();
        if let Err(e) = validate_tariff(config.tariff_per_kwh) {
            eprintln!("Warning: ignoring configured tariff: {}", e);
            config.tariff_per_kwh = DEFAULT_TARIFF_PER_KWH;
        }
        config
    }

    pub fn save(&self) -> std::io::Result<()> {
        let _ = ensure_dirs();
        let path = config_path();
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        fs::write(path, content)
    }

    pub fn merge_with_args(&mut self, database: Option<PathBuf>, tariff: Option<f64>) {
        if let Some(path) = database {
            self.database_path = Some(path);
        }
        if let Some(rate) = tariff {
            self.tariff_per_kwh = rate;
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }

    pub fn tariff(&self) -> Tariff {
        Tariff::new(self.tariff_per_kwh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = UserConfig::parse("");
        assert_eq!(config.tariff_per_kwh, DEFAULT_TARIFF_PER_KWH);
        assert_eq!(config.export_path, PathBuf::from("energy_monitor.csv"));
        assert!(config.seed_defaults);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = UserConfig::parse("tariff_per_kwh = 0.5\nlog_level = \"debug\"\n");
        assert_eq!(config.tariff_per_kwh, 0.5);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let config = UserConfig::parse("tariff_per_kwh = \"cheap\"");
        assert_eq!(config.tariff_per_kwh, DEFAULT_TARIFF_PER_KWH);
    }

    #[test]
    fn invalid_tariff_in_file_falls_back_to_default() {
        let negative = UserConfig::parse("tariff_per_kwh = -0.2\nseed_defaults = false\n");
        assert_eq!(negative.tariff_per_kwh, DEFAULT_TARIFF_PER_KWH);
        assert!(!negative.seed_defaults);

        let nan = UserConfig::parse("tariff_per_kwh = nan\n");
        assert_eq!(nan.tariff().per_kwh(), DEFAULT_TARIFF_PER_KWH);

        let free = UserConfig::parse("tariff_per_kwh = 0.0\n");
        assert_eq!(free.tariff_per_kwh, 0.0);
    }

    #[test]
    fn cli_args_override_file_values() {
        let mut config = UserConfig::default();
        config.merge_with_args(Some(PathBuf::from("/tmp/e.db")), Some(0.3));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/e.db"));
        assert_eq!(config.tariff().per_kwh(), 0.3);
    }

    #[test]
    fn log_level_from_str_defaults_to_warn() {
        assert_eq!(LogLevel::from_str("TRACE"), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("none"), LogLevel::Off);
        assert_eq!(LogLevel::from_str("loud"), LogLevel::Warn);
        assert!(LogLevel::Off.as_tracing_level().is_none());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = UserConfig {
            tariff_per_kwh: 0.21,
            database_path: Some(PathBuf::from("/var/lib/wattlog.db")),
            ..UserConfig::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = UserConfig::parse(&text);
        assert_eq!(parsed.tariff_per_kwh, 0.21);
        assert_eq!(parsed.database_path, config.database_path);
    }
}
