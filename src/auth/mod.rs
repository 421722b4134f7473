//! Route guard and token handling

pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod routes;

pub use guard::{GuardDecision, RouteGuard};
pub use jwt::{decode_claims, is_authenticated_at, mint_token, verify_token};
pub use middleware::{route_guard, token_from_headers};
pub use models::{Claims, Role, User};
pub use routes::{RouteClass, RoutePattern, RouteTable, UnmatchedPolicy};
