use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::LevelFilter;
use monitor_engine::{ClientSettings, MonitorSettings};
use serde::{Deserialize, Serialize};

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "scrape_monitor.ron";

/// Settings read from `scrape_monitor.ron`. Every field is optional in the
/// file; missing ones keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub history_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub output_dir: Option<PathBuf>,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let monitor = MonitorSettings::default();
        Self {
            base_url: client.base_url,
            poll_interval_ms: duration_ms(monitor.poll_interval),
            history_interval_ms: duration_ms(monitor.history_interval),
            connect_timeout_ms: duration_ms(client.connect_timeout),
            request_timeout_ms: duration_ms(client.request_timeout),
            output_dir: None,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `path` if given, else `./scrape_monitor.ron` when present, else
    /// the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = fs::read_to_string(&path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be positive");
        }
        if self.history_interval_ms == 0 {
            bail!("history_interval_ms must be positive");
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<LevelFilter> {
        match monitor_logging::parse_level(&self.log_level) {
            Some(level) => Ok(level),
            None => bail!("unknown log level {:?}", self.log_level),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..ClientSettings::default()
        }
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            history_interval: Duration::from_millis(self.history_interval_ms),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
