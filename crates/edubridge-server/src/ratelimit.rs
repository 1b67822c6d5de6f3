//! Rate limiting and request logging middleware.
//!
//! The authenticate endpoints are the only routes that hit the portal
//! without a session, so they get a limiter of their own.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::RETRY_AFTER,
    middleware::Next,
    response::{IntoResponse, Response},
};
use edubridge_session::SessionToken;
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
};

use crate::error::ServerError;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Rate limiter type alias (uses default clock).
pub type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const FALLBACK_RPM: NonZeroU32 = NonZeroU32::new(60).unwrap();

// ─────────────────────────────────────────────────────────────────────────────
// Rate Limiter Factory
// ─────────────────────────────────────────────────────────────────────────────

/// Create a rate limiter with the specified requests per minute.
///
/// Zero falls back to 60.
pub fn create_rate_limiter(requests_per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(FALLBACK_RPM));
    Arc::new(RateLimiter::direct(quota))
}

/// Whole seconds a rejected client should wait, rounded up and never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware
// ─────────────────────────────────────────────────────────────────────────────

/// Rate limiting middleware for the authenticate endpoints.
///
/// Uses one limiter per server (not per IP).
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.rate_limiting {
        return next.run(request).await;
    }

    match state.auth_limiter.check() {
        Ok(_) => next.run(request).await,
        Err(not_until) => {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            let retry_after = retry_after_secs(wait);

            tracing::warn!(
                path = %request.uri().path(),
                retry_after_seconds = retry_after,
                "Rate limit exceeded"
            );

            let mut response = ServerError::RateLimitExceeded.into_response();
            response
                .headers_mut()
                .insert(RETRY_AFTER, retry_after.into());
            response
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Logging
// ─────────────────────────────────────────────────────────────────────────────

/// One log line per request, tagged with the session that made it.
///
/// The query string is never logged because it may carry the token. The
/// session shows up as its redacted prefix once the guard chain accepted
/// it, and as `-` on public routes or rejected requests.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let route = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let session = response
        .extensions()
        .get::<SessionToken>()
        .map_or("-", SessionToken::redacted);

    let code = status.as_u16();
    if status.is_server_error() {
        tracing::error!(%method, %route, status = code, elapsed_ms, session, "Portal request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %route, status = code, elapsed_ms, session, "Request rejected");
    } else {
        tracing::info!(%method, %route, status = code, elapsed_ms, session, "Request served");
    }

    response
}
