//! Backend REST client tests against a local stub backend
//!
//! Run with: cargo test --test api_client_tests

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tutorgate::api::{ApiClient, HttpApiClient};
use tutorgate::auth::{Role, User};
use tutorgate::config::ApiConfig;
use tutorgate::Error;

type SeenHeaders = Arc<Mutex<Vec<Option<String>>>>;

/// Who-am-I stub: `good-token` is Ann, anything else is rejected
async fn me(State(seen): State<SeenHeaders>, headers: HeaderMap) -> axum::response::Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.lock().unwrap().push(auth.clone());

    match auth.as_deref() {
        Some("Bearer good-token") => Json(serde_json::json!({
            "id": "u1",
            "email": "ann@example.com",
            "name": "Ann",
            "role": "student",
        }))
        .into_response(),
        Some(_) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"code": "TOKEN_EXPIRED", "message": "Session expired"})),
        )
            .into_response(),
        None => (StatusCode::UNAUTHORIZED, "missing credentials").into_response(),
    }
}

async fn start_backend() -> (HttpApiClient, SeenHeaders) {
    let seen: SeenHeaders = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/auth/me", get(me))
        .with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpApiClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        ..ApiConfig::default()
    })
    .unwrap();
    (client, seen)
}

// ============================================================================
// Who-am-I
// ============================================================================

#[tokio::test]
async fn test_current_user_sends_bearer_token() {
    let (client, seen) = start_backend().await;

    let user = client.current_user(Some("good-token")).await.unwrap();
    assert_eq!(user, User::new("u1", "ann@example.com", "Ann", Role::Student));
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[Some("Bearer good-token".to_string())]
    );
    println!("✓ current user loaded with bearer token");
}

#[tokio::test]
async fn test_rejected_token_maps_error_body() {
    let (client, _) = start_backend().await;

    let api = match client.current_user(Some("stale")).await {
        Err(Error::Api(api)) => api,
        other => panic!("expected an API error, got {other:?}"),
    };
    assert!(api.is_unauthorized());
    assert_eq!(api.code, "TOKEN_EXPIRED");
    assert_eq!(api.message, "Session expired");
}

#[tokio::test]
async fn test_missing_token_sends_no_header() {
    let (client, seen) = start_backend().await;

    let err = client.current_user(None).await.unwrap_err();
    assert!(matches!(err, Error::Api(ref api) if api.code == "UNAUTHORIZED"
        && api.message == "missing credentials"));
    assert_eq!(seen.lock().unwrap().as_slice(), &[None]);
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpApiClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 2,
        ..ApiConfig::default()
    })
    .unwrap();

    assert!(matches!(
        client.current_user(Some("good-token")).await,
        Err(Error::Http(_))
    ));
}
