//! Request guard pipeline.
//!
//! Every route that acts on a portal session sits behind a [`GuardChain`].
//! The chain runs in middleware, before any handler extractor, and stops at
//! the first guard that rejects the request:
//!
//! 1. [`TokenGuard`] finds the session token on the request
//! 2. [`SessionGuard`] resolves it to a live cache entry
//! 3. [`LoginGuard`] asks the portal handle whether it is still logged in
//!
//! On success the resolved [`RequestContext`] is placed in the request
//! extensions, and handlers take it as a typed parameter.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequestParts, Query, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use edubridge_portal::SharedPortalSession;
use edubridge_session::{Error as CacheError, SessionToken};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "token";

// ─────────────────────────────────────────────────────────────────────────────
// Context
// ─────────────────────────────────────────────────────────────────────────────

/// What guards have established so far about a request.
#[derive(Default)]
pub struct GuardContext {
    pub token: Option<SessionToken>,
    pub session: Option<SharedPortalSession>,
}

/// A request that passed its guard chain.
#[derive(Clone)]
pub struct RequestContext {
    pub token: SessionToken,
    pub session: SharedPortalSession,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("token", &self.token.redacted())
            .finish_non_exhaustive()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| ServerError::Internal("route has no session guard".to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Guards
// ─────────────────────────────────────────────────────────────────────────────

/// A pre-handler check.
#[async_trait]
pub trait Guard: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Reject the request, or record what was learned in `ctx` and let it through.
    async fn check(&self, state: &AppState, parts: &Parts, ctx: &mut GuardContext) -> Result<()>;
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Finds the token in the `token` header, or the `token` query parameter.
pub struct TokenGuard;

impl TokenGuard {
    fn extract(parts: &Parts) -> Option<String> {
        let from_header = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|token| !token.is_empty());

        if let Some(token) = from_header {
            return Some(token.to_string());
        }

        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.token)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}

#[async_trait]
impl Guard for TokenGuard {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn check(&self, _state: &AppState, parts: &Parts, ctx: &mut GuardContext) -> Result<()> {
        let token = Self::extract(parts).ok_or(ServerError::MissingToken)?;
        ctx.token = Some(SessionToken::from_string(token));
        Ok(())
    }
}

/// Resolves the token against the session cache.
pub struct SessionGuard;

#[async_trait]
impl Guard for SessionGuard {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn check(&self, state: &AppState, _parts: &Parts, ctx: &mut GuardContext) -> Result<()> {
        let token = ctx.token.as_ref().ok_or(ServerError::MissingToken)?;

        match state.sessions.get(token.as_str()).await {
            Ok(session) => {
                ctx.session = Some(session);
                Ok(())
            }
            Err(CacheError::NotFound(_)) => {
                debug!(token = %token.redacted(), "Unknown session token");
                Err(ServerError::InvalidToken)
            }
            Err(CacheError::Expired(_)) => {
                debug!(token = %token.redacted(), "Session expired");
                Err(ServerError::InvalidToken)
            }
        }
    }
}

/// Checks that the portal still considers the handle logged in.
pub struct LoginGuard;

#[async_trait]
impl Guard for LoginGuard {
    fn name(&self) -> &'static str {
        "login"
    }

    async fn check(&self, _state: &AppState, _parts: &Parts, ctx: &mut GuardContext) -> Result<()> {
        let session = ctx.session.as_ref().ok_or(ServerError::InvalidToken)?;
        if session.is_logged_in() {
            Ok(())
        } else {
            Err(ServerError::NotLoggedIn)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chain
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered list of guards.
#[derive(Clone)]
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardChain {
    pub fn new(guards: Vec<Arc<dyn Guard>>) -> Self {
        Self { guards }
    }

    /// Token, session and login checks.
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(TokenGuard),
            Arc::new(SessionGuard),
            Arc::new(LoginGuard),
        ])
    }

    /// Token and session checks only; the handle may be logged out.
    pub fn session_only() -> Self {
        Self::new(vec![Arc::new(TokenGuard), Arc::new(SessionGuard)])
    }

    /// Guard names in run order.
    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    /// Run every guard in order, stopping at the first rejection.
    pub async fn run(&self, state: &AppState, parts: &Parts) -> Result<RequestContext> {
        let mut ctx = GuardContext::default();

        for guard in &self.guards {
            if let Err(e) = guard.check(state, parts, &mut ctx).await {
                debug!(guard = guard.name(), path = %parts.uri.path(), error = %e, "Guard rejected request");
                return Err(e);
            }
        }

        match (ctx.token, ctx.session) {
            (Some(token), Some(session)) => Ok(RequestContext { token, session }),
            _ => Err(ServerError::Internal(
                "guard chain did not resolve a session".to_string(),
            )),
        }
    }
}

/// State for [`guard_middleware`]: the app plus the chain to run.
#[derive(Clone)]
pub struct GuardedState {
    pub app: AppState,
    pub chain: Arc<GuardChain>,
}

impl GuardedState {
    pub fn new(app: AppState, chain: GuardChain) -> Self {
        Self {
            app,
            chain: Arc::new(chain),
        }
    }
}

/// Run the guard chain and hand the resolved [`RequestContext`] to the handler.
pub async fn guard_middleware(
    State(guarded): State<GuardedState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let ctx = guarded.chain.run(&guarded.app, &parts).await?;

    let token = ctx.token.clone();
    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(ctx);

    // Outer layers only see the response, so the token rides back on it.
    let mut response = next.run(request).await;
    response.extensions_mut().insert(token);
    Ok(response)
}
