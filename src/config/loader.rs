//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::Path;

use super::Config;

pub const CONFIG_FILENAME: &str = "tutorgate.toml";

/// Load configuration from tutorgate.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
///
/// The route lists are validated here so a bad partition fails at startup
/// rather than on the first request.
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let config: Config = toml::from_str(&content)?;
    config.routes.table()?;
    Ok(config)
}

/// Write a configuration to disk as TOML
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<std::path::PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Tutorgate Configuration

[server]
host = "0.0.0.0"
port = 3000
static_dir = "./dist"

[auth]
cookie_name = "access_token"
login_path = "/login"
home_path = "/"
cookie_days = 1
session_cache_key = "auth_user"
refresh_token_key = "refresh_token"
logout_signal_key = "auth_logout"

# Every path matches at most one of public / auth_only / protected.
# Entries match exactly or as a path-segment prefix ("/groups" covers "/groups/7").
[routes]
public = ["/logout", "/privacy", "/terms"]
auth_only = ["/login", "/register", "/forgot-password", "/reset-password"]
protected = [
    "/",
    "/dashboard",
    "/schedule",
    "/groups",
    "/students",
    "/attendance",
    "/billing",
    "/notifications",
    "/settings",
    "/profile",
]
excluded = ["/api", "/_next", "/static", "/assets", "/favicon.ico", "/healthz"]
# What to do with paths in none of the lists: "protected" or "allow"
unmatched = "protected"

[api]
base_url = "${TUTORGATE_API_URL:-http://localhost:8080}"
me_path = "/api/auth/me"
timeout_secs = 10
"#
}
