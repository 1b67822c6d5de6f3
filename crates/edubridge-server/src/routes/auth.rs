//! Login and logout endpoints.

use axum::{Json, extract::State, http::StatusCode};
use edubridge_portal::Credentials;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{Result, ServerError};
use crate::pipeline::RequestContext;
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Login for a known school.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthenticateRequest {
    pub username: String,
    pub password: String,
    /// School subdomain on the portal.
    pub subdomain: String,
}

/// Login where the portal finds the school itself.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthenticateAutoRequest {
    pub username: String,
    pub password: String,
}

/// A freshly minted session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Send this back in the `token` header on every other call.
    pub token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Log in to a school and open a session.
#[utoipa::path(
    post,
    path = "/authenticate",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "Session opened", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "auth"
)]
pub async fn authenticate_handler(
    State(state): State<AppState>,
    Json(request): Json<AuthenticateRequest>,
) -> Result<Json<TokenResponse>> {
    let credentials = Credentials {
        username: request.username,
        password: request.password,
        subdomain: request.subdomain,
    };

    let session = state.portal.login(&credentials).await.map_err(|e| {
        warn!(username = %credentials.username, school = %credentials.subdomain, "Login rejected");
        ServerError::from(e)
    })?;

    let token = state.open_session(session).await;
    info!(username = %credentials.username, school = %credentials.subdomain, "Login succeeded");

    Ok(Json(TokenResponse {
        token: token.into_inner(),
    }))
}

/// Log in without naming the school and open a session.
#[utoipa::path(
    post,
    path = "/authenticate-auto",
    request_body = AuthenticateAutoRequest,
    responses(
        (status = 200, description = "Session opened", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 429, description = "Rate limit exceeded"),
    ),
    tag = "auth"
)]
pub async fn authenticate_auto_handler(
    State(state): State<AppState>,
    Json(request): Json<AuthenticateAutoRequest>,
) -> Result<Json<TokenResponse>> {
    let session = state
        .portal
        .login_auto(&request.username, &request.password)
        .await
        .map_err(|e| {
            warn!(username = %request.username, "Auto login rejected");
            ServerError::from(e)
        })?;

    let token = state.open_session(session).await;
    info!(username = %request.username, "Auto login succeeded");

    Ok(Json(TokenResponse {
        token: token.into_inner(),
    }))
}

/// Close the current session.
///
/// Works even when the portal already logged the handle out.
#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 204, description = "Session closed"),
        (status = 400, description = "Missing or invalid token", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "auth"
)]
pub async fn logout_handler(State(state): State<AppState>, ctx: RequestContext) -> StatusCode {
    state.close_session(&ctx.token).await;
    StatusCode::NO_CONTENT
}
