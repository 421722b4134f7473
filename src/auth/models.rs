//! Authentication models

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Runs groups, schedules lessons, bills parents
    Teacher,
    /// Attends lessons
    Student,
    /// Pays for a student's lessons
    Parent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Teacher => write!(f, "teacher"),
            Role::Student => write!(f, "student"),
            Role::Parent => write!(f, "parent"),
        }
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            other => Err(crate::Error::Other(format!("Unknown role: {}", other))),
        }
    }
}

/// Identity returned by the who-am-I endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Display name
    pub name: String,
    pub role: Role,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    /// Creating lessons, editing groups and marking attendance
    pub fn can_manage_schedule(&self) -> bool {
        self.is_teacher()
    }

    pub fn can_view_billing(&self) -> bool {
        matches!(self.role, Role::Teacher | Role::Parent)
    }
}

/// Claims carried in the access token payload
///
/// Only `exp` is required; the rest are read when present.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration, seconds since epoch
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
}

/// NumericDate may be fractional; rounding up keeps `exp > now` exact for whole-second `now`
fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(de::Error::custom("exp is not a finite number"));
    }
    Ok(value.ceil() as i64)
}

impl Claims {
    /// Claims for a user expiring `ttl_secs` from `now`
    pub fn for_user(user: &User, now: i64, ttl_secs: i64) -> Self {
        Self {
            sub: Some(user.id.clone()),
            email: Some(user.email.clone()),
            name: Some(user.name.clone()),
            role: Some(user.role.to_string()),
            iat: Some(now),
            exp: now + ttl_secs,
        }
    }

    /// Role claim, if present and known
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// A token is live only while `exp` is strictly in the future
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}
