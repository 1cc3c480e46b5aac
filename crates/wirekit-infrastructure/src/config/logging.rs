//! Logging configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use wirekit_application::Configure;
use wirekit_domain::error::Result;

use crate::constants::{DEFAULT_LOG_LEVEL, LOGGING_CONFIG_KEY};
use crate::error_ext::ErrorContext;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily rolling file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl LoggingConfig {
    /// Read the `logging` subtree of `configure`, defaults when it is absent
    pub fn from_configure(configure: &dyn Configure) -> Result<Self> {
        match configure.get(LOGGING_CONFIG_KEY) {
            Some(value) => serde_json::from_value(value)
                .config_context(format!("Invalid `{LOGGING_CONFIG_KEY}` configuration")),
            None => Ok(Self::default()),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}
