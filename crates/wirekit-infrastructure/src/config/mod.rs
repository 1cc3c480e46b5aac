//! Configuration sources
//!
//! [`ConfigTree`] is the in-memory [`Configure`](wirekit_application::Configure)
//! implementation the factory reads placeholders from. [`ConfigLoader`] fills
//! one from defaults, a TOML file and prefixed environment variables.

pub mod loader;
pub mod logging;
pub mod tree;

pub use loader::ConfigLoader;
pub use logging::LoggingConfig;
pub use tree::ConfigTree;
