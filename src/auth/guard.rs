//! Redirect policy for navigation requests

use crate::auth::jwt;
use crate::auth::routes::{RouteClass, RouteTable};
use crate::config::Config;
use crate::error::Result;

/// Outcome of running the guard on one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Continue to the page unmodified
    Allow,
    /// Send the browser elsewhere
    Redirect(String),
}

/// Route guard built from the route table and login/home paths
#[derive(Debug, Clone)]
pub struct RouteGuard {
    table: RouteTable,
    cookie_name: String,
    login_path: String,
    home_path: String,
}

impl RouteGuard {
    pub fn new(
        table: RouteTable,
        cookie_name: impl Into<String>,
        login_path: impl Into<String>,
        home_path: impl Into<String>,
    ) -> Self {
        Self {
            table,
            cookie_name: cookie_name.into(),
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.routes.table()?,
            config.auth.cookie_name.clone(),
            config.auth.login_path.clone(),
            config.auth.home_path.clone(),
        ))
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Whether the guard runs for this path at all
    pub fn applies_to(&self, path: &str) -> bool {
        !self.table.is_excluded(path)
    }

    /// Class of a path; the login page is always auth-only so an
    /// unauthenticated visitor can never be bounced to it from itself
    pub fn classify(&self, path: &str) -> RouteClass {
        if path == self.login_path {
            return RouteClass::AuthOnly;
        }
        self.table.classify(path)
    }

    /// Decide what to do with a request for `path`
    ///
    /// `query` is the raw query string (without `?`), `token` the cookie value
    /// and `now` the current time in seconds since epoch.
    pub fn decide(
        &self,
        path: &str,
        query: Option<&str>,
        token: Option<&str>,
        now: i64,
    ) -> GuardDecision {
        let class = self.classify(path);
        if class == RouteClass::Public {
            return GuardDecision::Allow;
        }

        let authenticated = jwt::is_authenticated_at(token, now);

        if !authenticated && self.table.requires_session(class) {
            return GuardDecision::Redirect(self.login_redirect(path));
        }

        if authenticated && class == RouteClass::AuthOnly {
            return GuardDecision::Redirect(self.return_target(query));
        }

        GuardDecision::Allow
    }

    /// Login URL carrying the original path in `redirect`
    pub fn login_redirect(&self, path: &str) -> String {
        match serde_urlencoded::to_string([("redirect", path)]) {
            Ok(query) => format!("{}?{}", self.login_path, query),
            Err(_) => self.login_path.clone(),
        }
    }

    /// Where an already-authenticated visitor of an auth-only page goes
    fn return_target(&self, query: Option<&str>) -> String {
        let requested = query
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .and_then(|pairs| {
                pairs
                    .into_iter()
                    .find(|(key, _)| key == "redirect")
                    .map(|(_, value)| value)
            });

        match requested {
            Some(target) if self.is_safe_target(&target) => target,
            _ => self.home_path.clone(),
        }
    }

    /// Same-origin absolute paths only, and never back into an auth-only page
    ///
    /// Control characters are refused as well; they cannot appear in a
    /// `Location` header.
    fn is_safe_target(&self, target: &str) -> bool {
        if !target.starts_with('/')
            || target.starts_with("//")
            || target.contains('\\')
            || target.chars().any(char::is_control)
        {
            return false;
        }
        let path = target.split(['?', '#']).next().unwrap_or(target);
        self.classify(path) != RouteClass::AuthOnly
    }
}
