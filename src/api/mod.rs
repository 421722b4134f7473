//! Edge HTTP server and backend REST client

pub mod client;
pub mod routes;
pub mod server;

pub use client::{ApiClient, ApiError, HttpApiClient};
pub use server::*;
