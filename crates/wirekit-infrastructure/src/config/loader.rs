//! Builds a [`ConfigTree`] from layered sources
//!
//! Precedence, lowest first: defaults, the TOML file, prefixed environment
//! variables, then explicit overrides addressed by tree path.

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use wirekit_application::Configure;
use wirekit_domain::error::Result;

use crate::config::tree::ConfigTree;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};

/// Where the TOML layer comes from
#[derive(Debug, Clone, Default)]
enum FileSource {
    /// First `wirekit.toml` found in the working directory or the user config dir
    #[default]
    Discover,
    Path(PathBuf),
    Disabled,
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: FileSource,
    env_prefix: Option<String>,
    defaults: Value,
    overrides: Vec<(String, Value)>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            file: FileSource::Discover,
            env_prefix: Some(CONFIG_ENV_PREFIX.to_string()),
            defaults: Value::Object(Map::new()),
            overrides: Vec::new(),
        }
    }

    /// Read this file instead of discovering one; a missing file is skipped
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = FileSource::Path(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn without_config_file(mut self) -> Self {
        self.file = FileSource::Disabled;
        self
    }

    /// `prefix` without the trailing underscore: `APP` reads `APP_SERVER__PORT` as `server.port`
    #[must_use]
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: Value) -> Self {
        self.defaults = defaults;
        self
    }

    /// Set `path` after every other source is merged
    #[must_use]
    pub fn with_override<S: Into<String>>(mut self, path: S, value: Value) -> Self {
        self.overrides.push((path.into(), value));
        self
    }

    /// The explicit file path, if one was given
    pub fn config_path(&self) -> Option<&Path> {
        match &self.file {
            FileSource::Path(path) => Some(path),
            FileSource::Discover | FileSource::Disabled => None,
        }
    }

    pub fn load(&self) -> Result<ConfigTree> {
        let mut figment = Figment::new().merge(Serialized::defaults(&self.defaults));

        if let Some(path) = self.resolve_file() {
            debug!(path = %path.display(), "Merging configuration file");
            figment = figment.merge(Toml::file(path));
        }
        if let Some(prefix) = &self.env_prefix {
            figment = figment.merge(Env::prefixed(&format!("{prefix}_")).split(CONFIG_ENV_SEPARATOR));
        }

        let tree = ConfigTree::from_figment(&figment)?;
        for (path, value) in &self.overrides {
            tree.set(path, value.clone());
        }
        Ok(tree)
    }

    fn resolve_file(&self) -> Option<PathBuf> {
        match &self.file {
            FileSource::Path(path) if path.exists() => Some(path.clone()),
            FileSource::Path(path) => {
                warn!(path = %path.display(), "Configuration file not found");
                None
            }
            FileSource::Discover => discover_config_file(),
            FileSource::Disabled => None,
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_config_file() -> Option<PathBuf> {
    let cwd = env::current_dir().ok();
    let candidates = [
        cwd.as_ref().map(|dir| dir.join(DEFAULT_CONFIG_FILENAME)),
        cwd.as_ref()
            .map(|dir| dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
    ];
    candidates.into_iter().flatten().find(|path| path.exists())
}
