//! Process-wide configuration
//!
//! Configuration is published once. Until [`install`] is called, the first
//! read initializes it from the environment:
//!
//! - `RECORDKIT_LOG_LEVEL`: minimum log severity (`trace`, `info`, `warn`, `error`)
//! - `RECORDKIT_LOG_REJECTIONS`: `1`/`true` to log rejected records

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::observability::{log_event, Event, Severity};
use crate::record::{RecordError, RecordResult};

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Minimum severity written by the logger (default: warn)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    /// Log every rejected construction or mutation (default: false)
    #[serde(default)]
    pub log_rejections: bool,
}

fn default_log_level() -> Severity {
    Severity::Warn
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_rejections: false,
        }
    }
}

impl Config {
    /// Parse a JSON configuration document
    pub fn from_json(content: &str) -> RecordResult<Self> {
        serde_json::from_str(content).map_err(|e| RecordError::malformed("config", e))
    }

    /// Build configuration from environment variables; unparseable values
    /// fall back to defaults.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Some(level) = std::env::var("RECORDKIT_LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.log_level = level;
        }

        if let Ok(v) = std::env::var("RECORDKIT_LOG_REJECTIONS") {
            config.log_rejections = matches!(v.trim(), "1" | "true" | "TRUE" | "yes");
        }

        config
    }
}

/// Publish the process-wide configuration.
///
/// Returns false if configuration was already published (explicitly or by
/// an earlier read); the existing configuration stays in effect.
pub fn install(config: Config) -> bool {
    let level = config.log_level;
    let installed = CONFIG.set(config).is_ok();
    if installed {
        log_event(Event::ConfigLoaded, &[("log_level", level.as_str())]);
    }
    installed
}

/// Current process-wide configuration
pub fn current() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}
