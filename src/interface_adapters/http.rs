// Shared HTTP response types so every watch-control route answers with the same JSON shape.

use axum::{Json, http::StatusCode};

#[derive(Debug, serde::Serialize)]
pub struct StatusResponse {
    // "ok" or "error".
    pub status: &'static str,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct WatchStatusResponse {
    pub watching: bool,
    pub path: Option<String>,
}

pub type ErrorReply = (StatusCode, Json<StatusResponse>);

pub fn error_reply(status: StatusCode, message: impl Into<String>) -> ErrorReply {
    (status, Json(StatusResponse::error(message)))
}
