//! REST client for the backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::models::User;
use crate::config::ApiConfig;
use crate::error::Result;

/// Non-2xx answer from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{status} {code}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }
}

/// Error body shape the backend uses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Backend calls the session layer depends on
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// `GET` the current user for a bearer token
    async fn current_user(&self, token: Option<&str>) -> Result<User>;
}

/// reqwest-backed client
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
    me_path: String,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            me_path: config.me_path.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request and decode a JSON success body
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> Result<T> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        Err(api_error(status, &text).into())
    }
}

fn api_error(status: StatusCode, body: &str) -> ApiError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let reason = status.canonical_reason().unwrap_or("Unknown");
    ApiError {
        status: status.as_u16(),
        code: parsed
            .code
            .unwrap_or_else(|| reason.to_ascii_uppercase().replace(' ', "_")),
        message: parsed.message.unwrap_or_else(|| {
            if body.trim().is_empty() {
                reason.to_string()
            } else {
                body.trim().to_string()
            }
        }),
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn current_user(&self, token: Option<&str>) -> Result<User> {
        self.request(Method::GET, &self.me_path, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_json_body() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"code":"TOKEN_EXPIRED","message":"Session expired"}"#,
        );
        assert_eq!(err.status, 401);
        assert_eq!(err.code, "TOKEN_EXPIRED");
        assert_eq!(err.message, "Session expired");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_api_error_from_plain_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.code, "BAD_GATEWAY");
        assert_eq!(err.message, "upstream down");
    }

    #[test]
    fn test_api_error_from_empty_body() {
        let err = api_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(err.message, "Internal Server Error");
    }

    #[test]
    fn test_url_joining() {
        let client = HttpApiClient::new(&ApiConfig {
            base_url: "http://backend:8080/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/api/auth/me"), "http://backend:8080/api/auth/me");
        assert_eq!(client.url("api/auth/me"), "http://backend:8080/api/auth/me");
    }
}
