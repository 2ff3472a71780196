//! Table configuration.
//!
//! Resolution order (lowest to highest priority):
//! 1. built-in defaults
//! 2. the `datatables:` section of a YAML document
//! 3. `.env` file (loaded into the process environment, never overwriting)
//! 4. environment variables `DATATABLES_DATE_FORMAT` and `DATATABLES_MAX_PAGE_LENGTH`

use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::value::DEFAULT_DATE_FORMAT;

pub const ENV_DATE_FORMAT: &str = "DATATABLES_DATE_FORMAT";
pub const ENV_MAX_PAGE_LENGTH: &str = "DATATABLES_MAX_PAGE_LENGTH";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O or YAML parsing error occurred while loading configuration.
    Load(String),
    /// A value was read but is not acceptable.
    Invalid { key: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Invalid { key, message } => {
                write!(f, "Invalid config value for '{key}': {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTablesConfig {
    /// `strftime` pattern for date and timestamp cells.
    pub date_format: String,
    /// Upper bound for the page size. Also bounds "all rows" requests.
    pub max_page_length: Option<u64>,
}

impl Default for DataTablesConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_page_length: None,
        }
    }
}

impl DataTablesConfig {
    pub const SECTION: &'static str = "datatables";

    /// Read the `datatables:` section of a YAML document.
    ///
    /// A document without the section yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
        let config = match yaml.get(Self::SECTION) {
            Some(section) if !section.is_null() => serde_yaml::from_value(section.clone())
                .map_err(|e| ConfigError::Load(e.to_string()))?,
            _ => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file (if it exists), then overlay `.env` and
    /// environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
            Self::from_yaml_str(&content)?
        } else {
            Self::default()
        };
        let _ = dotenvy::dotenv();
        config.with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(format) = std::env::var(ENV_DATE_FORMAT) {
            self.date_format = format;
        }
        if let Ok(raw) = std::env::var(ENV_MAX_PAGE_LENGTH) {
            let raw = raw.trim();
            self.max_page_length = if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    key: ENV_MAX_PAGE_LENGTH.to_string(),
                    message: e.to_string(),
                })?)
            };
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid {
                key: "datatables.date_format".to_string(),
                message: format!("not a valid strftime pattern: {}", self.date_format),
            });
        }
        if self.max_page_length == Some(0) {
            return Err(ConfigError::Invalid {
                key: "datatables.max_page_length".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Apply `max_page_length` to a requested window.
    pub fn clamp_window(&self, (offset, limit): (u64, Option<u64>)) -> (u64, Option<u64>) {
        match (self.max_page_length, limit) {
            (Some(max), Some(limit)) => (offset, Some(limit.min(max))),
            (Some(max), None) => (offset, Some(max)),
            (None, limit) => (offset, limit),
        }
    }
}
