//! Configuration file tests
//!
//! Run with: cargo test --test config_tests

use std::fs;

use tempfile::TempDir;
use tutorgate::auth::{RouteClass, RouteGuard, UnmatchedPolicy};
use tutorgate::config::loader::default_config_content;
use tutorgate::config::{load_config_from_path, save_config, Config};
use tutorgate::Error;

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tutorgate.toml");
    fs::write(
        &path,
        r#"
[server]
port = 4000

[routes]
public = ["/pricing"]
unmatched = "allow"
"#,
    )
    .unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.server.port, 4000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.auth.cookie_name, "access_token");
    assert_eq!(config.routes.unmatched, UnmatchedPolicy::Allow);
    // Lists not given keep their defaults
    assert!(config.routes.protected.contains(&"/groups".to_string()));

    let guard = RouteGuard::from_config(&config).unwrap();
    assert_eq!(guard.classify("/pricing"), RouteClass::Public);
}

#[test]
fn test_default_file_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tutorgate.toml");
    fs::write(&path, default_config_content()).unwrap();

    let config = load_config_from_path(&path).unwrap();
    assert_eq!(config.auth.login_path, "/login");
    assert_eq!(config.api.me_path, "/api/auth/me");
    println!("✓ generated config loads");
}

#[test]
fn test_overlapping_routes_fail_at_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tutorgate.toml");
    fs::write(
        &path,
        r#"
[routes]
public = ["/groups/shared"]
auth_only = ["/login"]
protected = ["/groups"]
"#,
    )
    .unwrap();

    let err = load_config_from_path(&path).unwrap_err();
    assert!(matches!(err, Error::RouteOverlap(ref p, "public", "protected") if p == "/groups/shared"));
}

#[test]
fn test_relative_route_fails_at_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tutorgate.toml");
    fs::write(&path, "[routes]\nprotected = [\"groups\"]\n").unwrap();

    assert!(matches!(load_config_from_path(&path), Err(Error::Config(_))));
}

#[test]
fn test_missing_file_is_config_not_found() {
    let dir = TempDir::new().unwrap();
    let result = load_config_from_path(&dir.path().join("nope.toml"));
    assert!(matches!(result, Err(Error::ConfigNotFound)));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tutorgate.toml");
    fs::write(&path, "[server\nport = ").unwrap();

    assert!(matches!(load_config_from_path(&path), Err(Error::TomlParse(_))));
}

// ============================================================================
// Saving
// ============================================================================

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tutorgate.toml");

    let mut config = Config::default();
    config.auth.cookie_name = "sid".to_string();
    config.routes.auth_only.push("/invite".to_string());
    save_config(&config, &path).unwrap();

    let loaded = load_config_from_path(&path).unwrap();
    assert_eq!(loaded.auth.cookie_name, "sid");
    assert!(loaded.routes.auth_only.contains(&"/invite".to_string()));
    assert_eq!(loaded.routes.unmatched, UnmatchedPolicy::Protected);
}
