//! Route guard middleware

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::auth::guard::{GuardDecision, RouteGuard};

/// Read the access token cookie from request headers
pub fn token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(Cookie::value)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Run the guard before any page handler; never fails
pub async fn route_guard(
    State(guard): State<Arc<RouteGuard>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if !guard.applies_to(&path) {
        return next.run(req).await;
    }

    let token = token_from_headers(req.headers(), guard.cookie_name());
    let now = chrono::Utc::now().timestamp();

    match guard.decide(&path, req.uri().query(), token.as_deref(), now) {
        GuardDecision::Allow => next.run(req).await,
        GuardDecision::Redirect(location) => {
            tracing::debug!(%path, %location, "route guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark; access_token=abc.def.ghi".parse().unwrap());

        assert_eq!(
            token_from_headers(&headers, "access_token").as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(token_from_headers(&headers, "refresh"), None);
    }

    #[test]
    fn test_no_cookie_header() {
        let headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers, "access_token"), None);
    }

    #[test]
    fn test_empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "access_token=".parse().unwrap());
        assert_eq!(token_from_headers(&headers, "access_token"), None);
    }
}
