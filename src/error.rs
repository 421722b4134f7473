//! Error types for Tutorgate

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid token: {0}")]
    Token(String),

    #[error("Token expired at {0}")]
    TokenExpired(i64),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("No active session")]
    NoActiveSession,

    #[error("Route pattern '{0}' overlaps between '{1}' and '{2}'")]
    RouteOverlap(String, &'static str, &'static str),

    #[error("Config file not found. Run 'tutorgate init' first.")]
    ConfigNotFound,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
