//! Edge HTTP server

use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{route_guard, RouteGuard};
use crate::config::Config;
use crate::error::Result;

use super::routes;

/// Run the edge server on `host:port`
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    serve(listener, config).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, config: Config) -> Result<()> {
    let app = create_router(&config)?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the router with the guard in front of every route
pub fn create_router(config: &Config) -> Result<Router> {
    let guard = Arc::new(RouteGuard::from_config(config)?);

    Ok(Router::new()
        .route("/healthz", get(routes::health))
        .route("/logout", get(routes::logout))
        .fallback_service(ServeDir::new(&config.server.static_dir))
        .layer(middleware::from_fn_with_state(guard.clone(), route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(guard))
}
