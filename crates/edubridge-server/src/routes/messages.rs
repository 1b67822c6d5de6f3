//! Messaging endpoint.
//!
//! Requests name recipients by bare person id. Ids are resolved against the
//! student list first, then the teacher list. A batch with any unknown id is
//! refused as a whole before anything is sent.

use axum::Json;
use edubridge_portal::{Recipient, Student, Teacher};
use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{Result, ServerError};
use crate::normalize::Payload;
use crate::pipeline::RequestContext;

/// A message to one or more people.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MessageRequest {
    /// Person ids of students or teachers.
    pub recipients: Vec<i64>,
    pub body: String,
}

/// Resolve every id, or fail with all the ids that matched nobody.
pub fn resolve_recipients(
    ids: &[i64],
    students: &[Student],
    teachers: &[Teacher],
) -> Result<Vec<Recipient>> {
    let mut resolved = Vec::with_capacity(ids.len());
    let mut unknown = Vec::new();

    for &id in ids {
        if let Some(student) = students.iter().find(|s| s.person_id == id) {
            resolved.push(Recipient::from_student(student));
        } else if let Some(teacher) = teachers.iter().find(|t| t.person_id == id) {
            resolved.push(Recipient::from_teacher(teacher));
        } else {
            unknown.push(id);
        }
    }

    if unknown.is_empty() {
        Ok(resolved)
    } else {
        Err(ServerError::InvalidRecipient(unknown))
    }
}

/// Send a message.
#[utoipa::path(
    post,
    path = "/message",
    request_body = MessageRequest,
    responses(
        (status = 200, description = "Message sent: `{\"response\": \"OK\"}`"),
        (status = 400, description = "Unknown recipient, or missing/invalid/logged-out session", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "messages"
)]
pub async fn send_message_handler(
    ctx: RequestContext,
    Json(request): Json<MessageRequest>,
) -> Result<Payload> {
    if request.recipients.is_empty() {
        return Err(ServerError::BadRequest(
            "at least one recipient is required".to_string(),
        ));
    }

    let students = ctx.session.get_all_students().await?;
    let teachers = ctx.session.get_teachers().await?;
    let recipients = resolve_recipients(&request.recipients, &students, &teachers)?;

    debug!(
        recipients = ?recipients.iter().map(Recipient::portal_id).collect::<Vec<_>>(),
        "Resolved message recipients"
    );

    ctx.session.send_message(&recipients, &request.body).await?;
    info!(token = %ctx.token.redacted(), count = recipients.len(), "Message sent");

    Ok(Payload::ok())
}
