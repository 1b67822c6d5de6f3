//! Grades and school year endpoints.

use crate::error::Result;
use crate::normalize::Payload;
use crate::pipeline::RequestContext;

/// All grades of the account.
#[utoipa::path(
    get,
    path = "/grades",
    responses(
        (status = 200, description = "List of grades"),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "grades"
)]
pub async fn grades_handler(ctx: RequestContext) -> Result<Payload> {
    let grades = ctx.session.get_grades().await?;
    Payload::from_output(&grades)
}

/// Starting year of the current school year.
#[utoipa::path(
    get,
    path = "/school-year",
    responses(
        (status = 200, description = "Year as a plain integer", body = i32),
        (status = 400, description = "Missing, invalid or logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "grades"
)]
pub async fn school_year_handler(ctx: RequestContext) -> Result<Payload> {
    let year = ctx.session.get_school_year().await?;
    Payload::from_output(&year)
}
