//! Rate limiting and request logging.
//!
//! Submissions are limited per session, so one client retrying its own form
//! cannot starve everyone else. Session openings and password-reset requests
//! share a single global quota.

use crate::error::ServiceError;
use axum::{
    extract::{MatchedPath, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{keyed::DefaultKeyedStateStore, InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Limit used when the configured value is zero.
const FALLBACK_PER_MINUTE: NonZeroU32 = NonZeroU32::MIN.saturating_add(9);

/// Limiter shared by every client.
pub type GlobalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Limiter with one bucket per registration session.
pub type SessionLimiter = RateLimiter<Uuid, DefaultKeyedStateStore<Uuid>, DefaultClock>;

fn per_minute(requests: u32) -> Quota {
    Quota::per_minute(NonZeroU32::new(requests).unwrap_or(FALLBACK_PER_MINUTE))
}

/// Rate limiter state shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    /// Submission quota, one bucket per session
    pub submissions: Arc<SessionLimiter>,
    /// Session openings and password resets, across all clients
    pub global: Arc<GlobalLimiter>,
}

impl RateLimitState {
    /// Create limiters from per-minute quotas.
    ///
    /// A quota of zero falls back to 10 per minute.
    pub fn new(submit_per_minute: u32, global_per_minute: u32) -> Self {
        Self {
            submissions: Arc::new(RateLimiter::keyed(per_minute(submit_per_minute))),
            global: Arc::new(RateLimiter::direct(per_minute(global_per_minute))),
        }
    }

    /// Create a permissive rate limiter for testing.
    pub fn permissive() -> Self {
        Self::new(1000, 1000)
    }

    /// Forget sessions whose submission bucket has refilled.
    pub fn retain_recent(&self) {
        self.submissions.retain_recent();
    }

    /// Number of sessions currently tracked by the submission limiter.
    pub fn tracked_sessions(&self) -> usize {
        self.submissions.len()
    }
}

/// Per-session submission limit.
///
/// Must be installed with `route_layer` so the `:id` parameter is available.
pub async fn submit_rate_limit(
    State(rate_limit): State<RateLimitState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if rate_limit.submissions.check_key(&id).is_err() {
        warn!(session_id = %id, "Submission rate limit exceeded");
        return Err(ServiceError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Global limit for routes that are not tied to a session.
pub async fn global_rate_limit(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if rate_limit.global.check().is_err() {
        warn!(path = %request.uri().path(), "Global rate limit exceeded");
        return Err(ServiceError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

/// Log each request against its route template.
///
/// The template keeps session ids out of the `route` field; handlers log
/// them separately as `session_id`. Validation failures are part of the
/// normal flow and log at `info`.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(%method, %route, %status, elapsed_ms, "Request errored");
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(%method, %route, %status, elapsed_ms, "Request throttled");
    } else if status.is_client_error() {
        info!(%method, %route, %status, elapsed_ms, "Request rejected");
    } else {
        debug!(%method, %route, %status, elapsed_ms, "Request served");
    }

    response
}
