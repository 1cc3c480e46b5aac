use serde_json::Value;

/// Hierarchical configuration addressed by dotted paths
///
/// Paths separate keys with `.`; list elements are addressed either with a
/// numeric segment (`servers.0.host`) or an index suffix (`servers[0].host`).
pub trait Configure: Send + Sync {
    /// The value at `path`, if present
    fn get(&self, path: &str) -> Option<Value>;

    /// Replace the value at `path`, creating intermediate objects as needed
    fn set(&self, path: &str, value: Value);
}
