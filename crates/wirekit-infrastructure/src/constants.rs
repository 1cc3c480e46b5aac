//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Tag and argument names are defined in `wirekit_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "wirekit.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "wirekit";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "WIREKIT";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// How far past the end of an array `ConfigTree::set` may write
pub const MAX_ARRAY_GROWTH: usize = 1024;

/// Upper bound on placeholder substitutions in one tag value
pub const MAX_PLACEHOLDER_SUBSTITUTIONS: usize = 128;

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_ENV_FILTER: &str = "WIREKIT_LOG";

/// Configuration subtree read by `LoggingConfig::from_configure`
pub const LOGGING_CONFIG_KEY: &str = "logging";

/// Log file name stem when the configured path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "wirekit";

// ============================================================================
// POST PROCESSOR ORDERS
// ============================================================================

/// Definition scanning
pub const ORDER_TAG_SCAN: i32 = 0;

/// `${...}` substitution
pub const ORDER_CONFIG_QUOTE: i32 = 100;

/// `#{...}` evaluation
pub const ORDER_EXPRESSION: i32 = 200;

/// Configuration decoding into fields
pub const ORDER_VALUE_BINDING: i32 = 300;

/// Dependency candidates by explicit name
pub const ORDER_DEPENDENCY_NAME: i32 = 400;

/// Dependency candidates by concrete type
pub const ORDER_DEPENDENCY_TYPE: i32 = 410;

/// Dependency candidates by interface
pub const ORDER_DEPENDENCY_INTERFACE: i32 = 420;

/// Dependency candidates by function result
pub const ORDER_DEPENDENCY_FUNCTION: i32 = 430;

/// Qualifier, self-injection and primary filtering
pub const ORDER_FURTHER_MATCHING: i32 = 500;

/// Required checks and dependent tracking
pub const ORDER_DEPENDENCY_VALIDATE: i32 = 600;
