//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::lab::DEFAULT_URGENT_DAYS;
use crate::core::Project;

/// Currency suffix used when none is configured
pub const DEFAULT_CURRENCY: &str = "zł";

/// labdesk configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Days ahead of today within which an open order counts as urgent
    pub urgent_days: Option<i64>,

    /// Currency suffix for amounts
    pub currency: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Log filter used when neither LABDESK_LOG nor --verbose is given
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (resolved by the accessors)

        // 2. Global user config (~/.config/labdesk/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.labdesk/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(days) = std::env::var("LABDESK_URGENT_DAYS") {
            match days.trim().parse() {
                Ok(days) => config.urgent_days = Some(days),
                Err(_) => tracing::warn!(value = %days, "ignoring invalid LABDESK_URGENT_DAYS"),
            }
        }
        if let Ok(currency) = std::env::var("LABDESK_CURRENCY") {
            config.currency = Some(currency);
        }

        config
    }

    fn read_file(path: &std::path::Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Option<Config>>(&contents) {
            // An all-comment file parses as null
            Ok(config) => Some(config.unwrap_or_default()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "labdesk")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.urgent_days.is_some() {
            self.urgent_days = other.urgent_days;
        }
        if other.currency.is_some() {
            self.currency = other.currency;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
    }

    pub fn urgent_days(&self) -> i64 {
        self.urgent_days.unwrap_or(DEFAULT_URGENT_DAYS).max(0)
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}
