//! Edge route handlers

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;
use time::Duration;

use crate::auth::RouteGuard;

/// JSON envelope for edge endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

/// Expire the access token cookie and send the browser to login
///
/// Works the same whether or not a cookie was sent.
pub async fn logout(State(guard): State<Arc<RouteGuard>>) -> impl IntoResponse {
    let expired = Cookie::build((guard.cookie_name().to_string(), String::new()))
        .path("/")
        .max_age(Duration::ZERO);
    let jar = CookieJar::new().add(expired);
    (jar, Redirect::temporary(guard.login_path()))
}
