//! Canteen endpoints.

use axum::{Json, extract::Query};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::timetable::DateQuery;
use crate::error::Result;
use crate::normalize::Payload;
use crate::pipeline::RequestContext;

/// Order a menu for a day.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChooseLunchRequest {
    pub date: NaiveDate,
    /// Menu number as listed in the day's offer.
    pub choice: u32,
}

/// Offer and current order for a day.
#[utoipa::path(
    get,
    path = "/lunches",
    params(DateQuery),
    responses(
        (status = 200, description = "Lunch, or null when nothing is served"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "lunches"
)]
pub async fn get_lunches_handler(
    ctx: RequestContext,
    Query(query): Query<DateQuery>,
) -> Result<Payload> {
    let lunch = ctx.session.get_lunches(query.date).await?;
    Payload::from_output(&lunch)
}

/// Order a menu.
#[utoipa::path(
    post,
    path = "/lunches",
    request_body = ChooseLunchRequest,
    responses(
        (status = 200, description = "Menu ordered: `{\"response\": \"OK\"}`"),
        (status = 400, description = "Unknown menu, or missing/invalid/logged-out session", body = crate::error::ErrorResponse),
        (status = 404, description = "No lunch is served that day", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "lunches"
)]
pub async fn choose_lunch_handler(
    ctx: RequestContext,
    Json(request): Json<ChooseLunchRequest>,
) -> Result<Payload> {
    ctx.session
        .choose_lunch(request.date, request.choice)
        .await?;
    info!(token = %ctx.token.redacted(), date = %request.date, menu = request.choice, "Lunch chosen");
    Ok(Payload::ok())
}

/// Cancel the order for a day.
#[utoipa::path(
    delete,
    path = "/lunches",
    params(DateQuery),
    responses(
        (status = 200, description = "Signed off: `{\"response\": \"OK\"}`"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
        (status = 404, description = "No lunch is served that day", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "lunches"
)]
pub async fn sign_off_lunch_handler(
    ctx: RequestContext,
    Query(query): Query<DateQuery>,
) -> Result<Payload> {
    ctx.session.sign_off_lunch(query.date).await?;
    info!(token = %ctx.token.redacted(), date = %query.date, "Lunch signed off");
    Ok(Payload::ok())
}
