//! File upload endpoint.

use axum::{
    extract::{Multipart, multipart::MultipartRejection},
    http::StatusCode,
};
use tracing::info;

use crate::error::{Result, ServerError};
use crate::normalize::Payload;
use crate::pipeline::RequestContext;

/// Multipart field holding the file.
pub const FILE_FIELD: &str = "file";

const DEFAULT_FILE_NAME: &str = "upload";

/// Upload a file to the portal cloud.
#[utoipa::path(
    post,
    path = "/cloud-upload",
    request_body(content_type = "multipart/form-data", description = "Form with a `file` field"),
    responses(
        (status = 200, description = "Stored cloud file"),
        (status = 400, description = "No file, or missing/invalid/logged-out session", body = crate::error::ErrorResponse),
        (status = 413, description = "File exceeds the upload limit", body = crate::error::ErrorResponse),
    ),
    security(("session_token" = [])),
    tag = "cloud"
)]
pub async fn cloud_upload_handler(
    ctx: RequestContext,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Payload> {
    let Ok(mut multipart) = multipart else {
        return Err(ServerError::NoFile);
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let contents = field.bytes().await.map_err(multipart_error)?;
        if contents.is_empty() {
            return Err(ServerError::NoFile);
        }

        let file = ctx.session.cloud_upload(&file_name, contents.to_vec()).await?;
        info!(token = %ctx.token.redacted(), file = %file_name, size = file.size, "File uploaded");
        return Payload::from_output(&file);
    }

    Err(ServerError::NoFile)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge
    } else {
        ServerError::BadRequest(e.body_text())
    }
}
