//! Configuration Tests

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use wirekit_application::Configure;
use wirekit_infrastructure::config::{ConfigLoader, ConfigTree};

fn tree() -> ConfigTree {
    ConfigTree::from_value(json!({
        "server": { "host": "localhost", "port": 8080 },
        "servers": [ { "host": "a" }, { "host": "b" } ],
        "empty": {}
    }))
}

#[test]
fn test_get_dotted_paths() {
    let config = tree();
    assert_eq!(config.get("server.host"), Some(json!("localhost")));
    assert_eq!(config.get("server.port"), Some(json!(8080)));
    assert_eq!(config.get("server"), Some(json!({ "host": "localhost", "port": 8080 })));
    assert!(config.get("server.missing").is_none());
    assert!(config.get("server.host.deeper").is_none());
}

#[test]
fn test_get_array_elements() {
    let config = tree();
    assert_eq!(config.get("servers[1].host"), Some(json!("b")));
    assert_eq!(config.get("servers.0.host"), Some(json!("a")));
    assert!(config.get("servers[5]").is_none());
}

#[test]
fn test_set_creates_intermediate_objects() {
    let config = ConfigTree::new();
    config.set("db.pool.size", json!(4));
    assert_eq!(config.get("db.pool.size"), Some(json!(4)));
    assert_eq!(config.snapshot(), json!({ "db": { "pool": { "size": 4 } } }));
}

#[test]
fn test_set_replaces_scalars_and_extends_arrays() {
    let config = tree();
    config.set("server.host.name", json!("x"));
    assert_eq!(config.get("server.host.name"), Some(json!("x")));

    config.set("servers[3]", json!({ "host": "d" }));
    assert_eq!(config.get("servers[3].host"), Some(json!("d")));
    assert_eq!(config.get("servers[2]"), Some(json!(null)));
}

#[test]
fn test_set_rejects_index_far_past_the_end() {
    let config = tree();
    let before = config.snapshot();

    config.set("servers[18446744073709551615]", json!("x"));
    config.set("servers[5000].host", json!("x"));
    config.set("servers.4000", json!("x"));

    assert_eq!(config.snapshot(), before);
}

#[test]
fn test_set_grows_array_within_bound() {
    let config = tree();
    config.set("servers[1000]", json!({ "host": "far" }));
    assert_eq!(config.get("servers[1000].host"), Some(json!("far")));
    assert_eq!(config.get("servers[999]"), Some(json!(null)));
}

#[test]
fn test_set_numeric_key_indexes_existing_array() {
    let config = tree();
    config.set("servers.1.host", json!("bee"));
    assert_eq!(config.get("servers[1].host"), Some(json!("bee")));
    assert_eq!(config.get("servers[0].host"), Some(json!("a")));
}

#[test]
fn test_set_root() {
    let config = tree();
    config.set("", json!({ "fresh": true }));
    assert_eq!(config.snapshot(), json!({ "fresh": true }));
}

#[test]
fn test_loader_reads_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("wirekit.toml");
    fs::write(
        &config_path,
        "[database]\nurl = \"postgres://db\"\npool = 8\n\n[[hosts]]\nname = \"a\"\n",
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_config_path(&config_path)
        .with_env_prefix("WIREKIT_TEST_LOADER_TOML")
        .load()
        .unwrap();

    assert_eq!(config.get("database.url"), Some(json!("postgres://db")));
    assert_eq!(config.get("database.pool"), Some(json!(8)));
    assert_eq!(config.get("hosts[0].name"), Some(json!("a")));
}

#[test]
fn test_loader_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("app.toml");
    fs::write(&config_path, "[server]\nport = 9090\n").unwrap();

    let config = ConfigLoader::new()
        .with_defaults(json!({ "server": { "port": 80, "host": "0.0.0.0" } }))
        .with_config_path(&config_path)
        .with_env_prefix("WIREKIT_TEST_LOADER_DEFAULTS")
        .load()
        .unwrap();

    assert_eq!(config.get("server.port"), Some(json!(9090)));
    assert_eq!(config.get("server.host"), Some(json!("0.0.0.0")));
}

#[test]
fn test_loader_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loader = ConfigLoader::new()
        .with_defaults(json!({ "env": "local" }))
        .with_config_path(temp_dir.path().join("absent.toml"))
        .with_env_prefix("WIREKIT_TEST_LOADER_MISSING");
    assert!(loader.config_path().is_some());

    let config = loader.load().unwrap();
    assert_eq!(config.get("env"), Some(json!("local")));
}

#[test]
fn test_loader_overrides_win_over_every_source() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("wirekit.toml");
    fs::write(&config_path, "[server]\nport = 9090\n").unwrap();

    let config = ConfigLoader::new()
        .with_defaults(json!({ "server": { "port": 80 } }))
        .with_config_path(&config_path)
        .without_env()
        .with_override("server.port", json!(7000))
        .with_override("server.tls.enabled", json!(true))
        .load()
        .unwrap();

    assert_eq!(config.get("server.port"), Some(json!(7000)));
    assert_eq!(config.get("server.tls"), Some(json!({ "enabled": true })));
}

#[test]
fn test_loader_without_file_or_env_is_defaults_only() {
    let loader = ConfigLoader::new()
        .without_config_file()
        .without_env()
        .with_defaults(json!({ "name": "wirekit" }));
    assert!(loader.config_path().is_none());

    let config = loader.load().unwrap();
    assert_eq!(config.snapshot(), json!({ "name": "wirekit" }));
}
