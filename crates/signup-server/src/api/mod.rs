//! HTTP API for registration sessions.

mod handlers;
mod middleware;
mod types;

pub use handlers::*;
pub use middleware::{
    global_rate_limit, logging_middleware, submit_rate_limit, GlobalLimiter, RateLimitState,
    SessionLimiter,
};
pub use types::*;

use crate::session::SessionRegistry;
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use signup_core::{AccountProvider, MemoryAccountProvider};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Open registration sessions
    pub sessions: Arc<RwLock<SessionRegistry>>,
    /// Account provider backing every session
    pub accounts: Arc<MemoryAccountProvider>,
}

impl AppState {
    /// Create new application state with default session limits.
    pub fn new(accounts: MemoryAccountProvider) -> Self {
        Self::with_registry(accounts, SessionRegistry::new())
    }

    /// Create new application state around a configured registry.
    pub fn with_registry(accounts: MemoryAccountProvider, sessions: SessionRegistry) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
            accounts: Arc::new(accounts),
        }
    }

    /// The account provider as seen by the registration core.
    pub fn provider(&self) -> Arc<dyn AccountProvider> {
        self.accounts.clone()
    }
}

/// Create the API router with default rate limiting.
pub fn create_router(state: AppState) -> Router {
    create_router_with_rate_limit(state, RateLimitState::new(10, 60))
}

/// Create the API router with custom rate limiting.
///
/// Submissions are limited per session; opening a session and requesting a
/// password reset share the global quota. Field edits and reads are free.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    let submissions = Router::new()
        .route("/v1/signup/sessions/:id/submit", post(handlers::submit))
        .route_layer(axum_middleware::from_fn_with_state(
            rate_limit.clone(),
            submit_rate_limit,
        ));

    let global = Router::new()
        .route("/v1/signup/sessions", post(handlers::create_session))
        .route("/v1/password-reset", post(handlers::password_reset))
        .route_layer(axum_middleware::from_fn_with_state(
            rate_limit,
            global_rate_limit,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/v1/signup/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/v1/signup/sessions/:id/fields/:field",
            put(handlers::update_field),
        )
        .route("/v1/login/validate", post(handlers::check_login))
        .merge(submissions)
        .merge(global)
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
