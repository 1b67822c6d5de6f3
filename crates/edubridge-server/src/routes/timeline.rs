//! Notification feed endpoint.

use axum::extract::{Query, State};

use super::pagination::PageParams;
use crate::error::Result;
use crate::normalize::Payload;
use crate::pipeline::RequestContext;
use crate::state::AppState;

/// One page of the notification feed, newest first.
///
/// The feed is fetched once per session and reused while the timeline cache
/// entry is fresh. A page past the end of the feed answers 204.
#[utoipa::path(
    get,
    path = "/timeline",
    params(PageParams),
    responses(
        (status = 200, description = "Timeline events on this page"),
        (status = 204, description = "Page is past the end of the feed"),
        (status = 400, description = "Bad page size, or missing/invalid/logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "timeline"
)]
pub async fn timeline_handler(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(params): Query<PageParams>,
) -> Result<Payload> {
    params.range()?;

    let feed = state.notifications(&ctx.token, &ctx.session).await?;
    Payload::page(params.slice(feed.as_slice())?)
}
