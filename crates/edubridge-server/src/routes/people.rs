//! School directory endpoints.

use axum::extract::Query;

use super::timetable::DateQuery;
use crate::error::Result;
use crate::normalize::Payload;
use crate::pipeline::RequestContext;

/// Every student of the school.
#[utoipa::path(
    get,
    path = "/students",
    responses(
        (status = 200, description = "List of students"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "people"
)]
pub async fn students_handler(ctx: RequestContext) -> Result<Payload> {
    let students = ctx.session.get_all_students().await?;
    Payload::from_output(&students)
}

/// Every teacher of the school.
#[utoipa::path(
    get,
    path = "/teachers",
    responses(
        (status = 200, description = "List of teachers"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "people"
)]
pub async fn teachers_handler(ctx: RequestContext) -> Result<Payload> {
    let teachers = ctx.session.get_teachers().await?;
    Payload::from_output(&teachers)
}

/// Teachers absent on a day.
#[utoipa::path(
    get,
    path = "/missing-teachers",
    params(DateQuery),
    responses(
        (status = 200, description = "List of absent teachers"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "people"
)]
pub async fn missing_teachers_handler(
    ctx: RequestContext,
    Query(query): Query<DateQuery>,
) -> Result<Payload> {
    let teachers = ctx.session.get_missing_teachers(query.date).await?;
    Payload::from_output(&teachers)
}
