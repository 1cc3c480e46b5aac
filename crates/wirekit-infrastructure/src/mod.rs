// Clippy allows for nested guard patterns in creation code
#![allow(clippy::collapsible_if)]

//! # Infrastructure Layer
//!
//! Implementations of the application ports: registries, built-in post
//! processors, the component factory, configuration sources and logging.
//!
//! ## Module Categories
//!
//! ### Container
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Definition registry and the three-tier singleton cache |
//! | [`processors`] | Tag scanning, placeholders, expressions, dependency matching |
//! | [`factory`] | Component creation, refresh and close |
//!
//! ### Configuration & Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | TOML and environment configuration tree |
//! | [`logging`] | Structured logging with tracing |
//! | [`constants`] | Centralized constants and processor orders |

pub mod config;
pub mod constants;
pub mod error_ext;
pub mod factory;
pub mod logging;
pub mod processors;
pub mod registry;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigTree, LoggingConfig};
pub use error_ext::ErrorContext;
pub use factory::DefaultFactory;
pub use logging::init_logging;
pub use processors::builtin_processors;
