//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::auth::routes::{RouteTable, UnmatchedPolicy};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

/// Server configuration for the edge HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the built frontend bundle
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("./dist")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Cookie and client storage names plus the login/home paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_home_path")]
    pub home_path: String,

    /// Lifetime of the access token cookie set at login
    #[serde(default = "default_cookie_days")]
    pub cookie_days: i64,

    #[serde(default = "default_session_cache_key")]
    pub session_cache_key: String,

    #[serde(default = "default_refresh_token_key")]
    pub refresh_token_key: String,

    /// Local storage key briefly written on logout to reach other tabs
    #[serde(default = "default_logout_signal_key")]
    pub logout_signal_key: String,
}

fn default_cookie_name() -> String {
    "access_token".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

fn default_cookie_days() -> i64 {
    1
}

fn default_session_cache_key() -> String {
    "auth_user".to_string()
}

fn default_refresh_token_key() -> String {
    "refresh_token".to_string()
}

fn default_logout_signal_key() -> String {
    "auth_logout".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            login_path: default_login_path(),
            home_path: default_home_path(),
            cookie_days: default_cookie_days(),
            session_cache_key: default_session_cache_key(),
            refresh_token_key: default_refresh_token_key(),
            logout_signal_key: default_logout_signal_key(),
        }
    }
}

/// Route classification lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_public")]
    pub public: Vec<String>,

    #[serde(default = "default_auth_only")]
    pub auth_only: Vec<String>,

    #[serde(default = "default_protected")]
    pub protected: Vec<String>,

    /// Path prefixes the guard never sees (assets, API proxy)
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,

    #[serde(default)]
    pub unmatched: UnmatchedPolicy,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_public() -> Vec<String> {
    strings(&["/logout", "/privacy", "/terms"])
}

fn default_auth_only() -> Vec<String> {
    strings(&["/login", "/register", "/forgot-password", "/reset-password"])
}

fn default_protected() -> Vec<String> {
    strings(&[
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
    ])
}

fn default_excluded() -> Vec<String> {
    strings(&["/api", "/_next", "/static", "/assets", "/favicon.ico", "/healthz"])
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public: default_public(),
            auth_only: default_auth_only(),
            protected: default_protected(),
            excluded: default_excluded(),
            unmatched: UnmatchedPolicy::default(),
        }
    }
}

impl RoutesConfig {
    /// Build and validate the route table
    pub fn table(&self) -> crate::Result<RouteTable> {
        RouteTable::new(
            &self.public,
            &self.auth_only,
            &self.protected,
            &self.excluded,
            self.unmatched,
        )
    }
}

/// Backend API the who-am-I fetch talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_me_path")]
    pub me_path: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_me_path() -> String {
    "/api/auth/me".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            me_path: default_me_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
