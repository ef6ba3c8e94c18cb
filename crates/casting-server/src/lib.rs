//! # casting-server
//!
//! HTTP API for the casting agency. Routes are guarded per method by
//! [`middleware::auth::require_permission`], which verifies the caller's
//! bearer token and checks the route's permission before the handler runs.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
