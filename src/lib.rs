//! Tutorgate - route guard and client session core for the tutoring frontend
//!
//! The [`auth`] module decides, per navigation request, whether to serve the
//! page or redirect. The [`session`] module keeps the tab's idea of who is
//! logged in consistent with its cookie and storage mirrors.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;

pub use auth::{GuardDecision, RouteGuard};
pub use config::Config;
pub use error::{Error, Result};
pub use session::AuthSession;
