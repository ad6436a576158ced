use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::Deserialize;

use crate::report::builder::{DEFAULT_TARGET, ReportOptions};
use crate::report::identifier::{DEFAULT_FLAG, DEFAULT_MAX_SCAN_BYTES};
use crate::report::metrics::CpuTimeBase;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub target_process_name: String,
    pub max_arg_scan_bytes: usize,
    pub identifier_flag: String,
    pub cpu_time_base: CpuTimeBase,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            target_process_name: DEFAULT_TARGET.to_string(),
            max_arg_scan_bytes: DEFAULT_MAX_SCAN_BYTES,
            identifier_flag: DEFAULT_FLAG.to_string(),
            cpu_time_base: CpuTimeBase::Uptime,
        }
    }
}

impl ReportConfig {
    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            target_process_name: self.target_process_name.clone(),
            cpu_time_base: self.cpu_time_base,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub max_concurrent_reports: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: "127.0.0.1:9464".to_string(),
            max_concurrent_reports: 4,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            json: false,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("shimstat").join("config.toml"))
}

/// Defaults when no config file exists at the default location. A file that
/// does exist must parse.
pub fn load_config() -> Result<Config> {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Ok(Config::default()),
    }
}

/// Load an explicitly named config file. Unreadable or malformed files are
/// errors rather than a silent return to defaults.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .wrap_err_with(|| format!("invalid config file {}", path.display()))
}
