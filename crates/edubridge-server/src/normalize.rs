//! Turning handler results into JSON responses.
//!
//! Records become JSON objects, lists become arrays (an empty list is `[]`,
//! never `null`), primitives pass through and `None` becomes `null`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::Result;

/// A normalized handler result.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 200 with a JSON body.
    Json(Value),
    /// 204 with no body; the paginated feed ran out.
    EndOfFeed,
}

impl Payload {
    /// Normalize any serializable handler output.
    pub fn from_output<T: Serialize + ?Sized>(output: &T) -> Result<Self> {
        Ok(Payload::Json(serde_json::to_value(output)?))
    }

    /// Acknowledgement for write operations.
    pub fn ok() -> Self {
        Payload::Json(json!({ "response": "OK" }))
    }

    /// A page of results; an empty page is [`Payload::EndOfFeed`].
    pub fn page<T: Serialize>(items: &[T]) -> Result<Self> {
        if items.is_empty() {
            Ok(Payload::EndOfFeed)
        } else {
            Self::from_output(items)
        }
    }
}

impl IntoResponse for Payload {
    fn into_response(self) -> Response {
        match self {
            Payload::Json(value) => (StatusCode::OK, Json(value)).into_response(),
            Payload::EndOfFeed => StatusCode::NO_CONTENT.into_response(),
        }
    }
}
