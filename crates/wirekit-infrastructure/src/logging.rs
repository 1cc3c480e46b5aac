//! Structured logging with tracing
//!
//! One stdout layer plus an optional daily file layer, both plain text or
//! JSON, under a single [`EnvFilter`].

use std::ffi::OsStr;
use std::path::Path;

use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wirekit_domain::error::{Error, Result};

pub use crate::config::LoggingConfig;
use crate::constants::{DEFAULT_LOG_FILE_STEM, LOG_ENV_FILTER};
use crate::error_ext::ErrorContext;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber described by `config`
///
/// `WIREKIT_LOG` replaces the configured level with a full filter directive.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV_FILTER).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut layers = vec![stdout_layer(config.json_format)];
    if let Some(path) = &config.file_output {
        layers.push(file_layer(path, config.json_format));
    }

    Registry::default()
        .with(layers)
        .with(filter)
        .try_init()
        .infra_context("Failed to install the global subscriber")?;

    info!(%level, json = config.json_format, "Logging initialized");
    Ok(())
}

fn stdout_layer(json: bool) -> BoxedLayer {
    let layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);
    if json { layer.json().boxed() } else { layer.boxed() }
}

fn file_layer(path: &Path, json: bool) -> BoxedLayer {
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let stem = path
        .file_stem()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE_STEM));
    let layer = fmt::layer()
        .with_writer(tracing_appender::rolling::daily(directory, stem))
        .with_ansi(false)
        .with_target(true);
    if json { layer.json().boxed() } else { layer.boxed() }
}

/// Parse a level name, case-insensitively
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!("Invalid log level: {level}"))),
    }
}
