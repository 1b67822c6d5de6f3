//! Timetable and bell schedule endpoints.

use axum::extract::Query;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::Result;
use crate::normalize::Payload;
use crate::pipeline::RequestContext;

/// A single day.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DateQuery {
    /// Day in `YYYY-MM-DD` form.
    pub date: NaiveDate,
}

/// Someone else's timetable for a day.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ForeignTimetableQuery {
    /// Person id of a student or teacher.
    pub id: i64,
    pub date: NaiveDate,
}

/// A moment in local school time.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NextRingingQuery {
    /// ISO 8601 local date-time, e.g. `2024-09-16T08:10:00`.
    pub datetime: NaiveDateTime,
}

/// The account's own timetable for a day.
#[utoipa::path(
    get,
    path = "/timetable",
    params(DateQuery),
    responses(
        (status = 200, description = "Timetable, or null when there are no lessons"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "timetable"
)]
pub async fn timetable_handler(
    ctx: RequestContext,
    Query(query): Query<DateQuery>,
) -> Result<Payload> {
    let timetable = ctx.session.get_timetable(query.date).await?;
    Payload::from_output(&timetable)
}

/// Substitution notices for a day.
#[utoipa::path(
    get,
    path = "/timetable-changes",
    params(DateQuery),
    responses(
        (status = 200, description = "List of timetable changes"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "timetable"
)]
pub async fn timetable_changes_handler(
    ctx: RequestContext,
    Query(query): Query<DateQuery>,
) -> Result<Payload> {
    let changes = ctx.session.get_timetable_changes(query.date).await?;
    Payload::from_output(&changes)
}

/// Timetable of another student or teacher.
#[utoipa::path(
    get,
    path = "/foreign-timetable",
    params(ForeignTimetableQuery),
    responses(
        (status = 200, description = "Timetable"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
        (status = 404, description = "Portal has no timetable for this person", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "timetable"
)]
pub async fn foreign_timetable_handler(
    ctx: RequestContext,
    Query(query): Query<ForeignTimetableQuery>,
) -> Result<Payload> {
    let timetable = ctx
        .session
        .get_foreign_timetable(query.id, query.date)
        .await?;
    Payload::from_output(&timetable)
}

/// The next bell after a moment.
#[utoipa::path(
    get,
    path = "/next-ringing",
    params(NextRingingQuery),
    responses(
        (status = 200, description = "Next bell: `{type, time}`"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "timetable"
)]
pub async fn next_ringing_handler(
    ctx: RequestContext,
    Query(query): Query<NextRingingQuery>,
) -> Result<Payload> {
    let ringing = ctx.session.get_next_ringing_time(query.datetime).await?;
    Payload::from_output(&ringing)
}
