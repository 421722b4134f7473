//! Route classification

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Which set a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Always allowed
    Public,
    /// Allowed only without a valid session (login, register)
    AuthOnly,
    /// Allowed only with a valid session
    Protected,
    /// In no list; handled by [`UnmatchedPolicy`]
    Unmatched,
}

impl fmt::Display for RouteClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteClass::Public => write!(f, "public"),
            RouteClass::AuthOnly => write!(f, "auth_only"),
            RouteClass::Protected => write!(f, "protected"),
            RouteClass::Unmatched => write!(f, "unmatched"),
        }
    }
}

/// Treatment of paths that appear in none of the lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Require a session, like a protected path
    #[default]
    Protected,
    /// Let the request through untouched
    Allow,
}

/// A configured route entry
///
/// Matches the path itself and anything below it on a `/` boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern(String);

impl RoutePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if !pattern.starts_with('/') {
            return Err(Error::Config(format!(
                "Route '{}' must start with '/'",
                pattern
            )));
        }
        let trimmed = pattern.trim_end_matches('/');
        Ok(Self(if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact or segment-prefix match; `/` only matches the root itself
    pub fn matches(&self, path: &str) -> bool {
        if self.0 == "/" {
            return path == "/";
        }
        match path.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Whether some path could match both patterns
    fn overlaps(&self, other: &RoutePattern) -> bool {
        self.matches(other.as_str()) || other.matches(self.as_str())
    }
}

/// Static partition of paths into public / auth-only / protected
#[derive(Debug, Clone)]
pub struct RouteTable {
    public: Vec<RoutePattern>,
    auth_only: Vec<RoutePattern>,
    protected: Vec<RoutePattern>,
    excluded: Vec<RoutePattern>,
    unmatched: UnmatchedPolicy,
}

fn parse_all(patterns: &[String]) -> Result<Vec<RoutePattern>> {
    patterns.iter().map(|p| RoutePattern::new(p)).collect()
}

impl RouteTable {
    /// Build a table, rejecting any pattern that lands in two lists
    pub fn new(
        public: &[String],
        auth_only: &[String],
        protected: &[String],
        excluded: &[String],
        unmatched: UnmatchedPolicy,
    ) -> Result<Self> {
        let table = Self {
            public: parse_all(public)?,
            auth_only: parse_all(auth_only)?,
            protected: parse_all(protected)?,
            excluded: parse_all(excluded)?,
            unmatched,
        };

        let lists = [
            ("public", &table.public),
            ("auth_only", &table.auth_only),
            ("protected", &table.protected),
        ];
        for (i, (left_name, left)) in lists.iter().enumerate() {
            for (right_name, right) in &lists[i + 1..] {
                for l in left.iter() {
                    if let Some(r) = right.iter().find(|r| l.overlaps(r)) {
                        let shared = if l.matches(r.as_str()) { r } else { l };
                        return Err(Error::RouteOverlap(
                            shared.as_str().to_string(),
                            *left_name,
                            *right_name,
                        ));
                    }
                }
            }
        }

        Ok(table)
    }

    /// Paths under an excluded prefix skip the guard entirely
    ///
    /// Same segment rule as the route lists: `/static` covers
    /// `/static/app.css` but not `/statistics`.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|prefix| prefix.matches(path))
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        let hit = |list: &[RoutePattern]| list.iter().any(|p| p.matches(path));
        if hit(self.public.as_slice()) {
            RouteClass::Public
        } else if hit(self.auth_only.as_slice()) {
            RouteClass::AuthOnly
        } else if hit(self.protected.as_slice()) {
            RouteClass::Protected
        } else {
            RouteClass::Unmatched
        }
    }

    /// Whether the path needs a session, with the unmatched policy applied
    pub fn requires_session(&self, class: RouteClass) -> bool {
        match class {
            RouteClass::Protected => true,
            RouteClass::Unmatched => self.unmatched == UnmatchedPolicy::Protected,
            RouteClass::Public | RouteClass::AuthOnly => false,
        }
    }

    pub fn unmatched(&self) -> UnmatchedPolicy {
        self.unmatched
    }

    /// Every configured entry with its class, for listing
    pub fn entries(&self) -> Vec<(RouteClass, &str)> {
        let mut entries = Vec::new();
        for (class, list) in [
            (RouteClass::Public, &self.public),
            (RouteClass::AuthOnly, &self.auth_only),
            (RouteClass::Protected, &self.protected),
        ] {
            entries.extend(list.iter().map(|p| (class, p.as_str())));
        }
        entries
    }

    pub fn excluded(&self) -> &[RoutePattern] {
        &self.excluded
    }
}
