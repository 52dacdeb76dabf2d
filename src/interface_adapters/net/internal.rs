use crate::domain::WatchError;
use crate::interface_adapters::http::{
    ErrorReply, StatusResponse, WatchStatusResponse, error_reply,
};
use crate::interface_adapters::paths::PathError;
use crate::interface_adapters::state::AppState;

use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Debug, serde::Deserialize)]
pub struct WatchRequest {
    // Loose so a missing or non-string path still answers 400.
    #[serde(rename = "logFilePath", default)]
    log_file_path: Option<Value>,
}

pub async fn watch_handler(
    State(state): State<AppState>,
    payload: Result<Json<WatchRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ErrorReply> {
    let Json(payload) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected watch body");
        error_reply(StatusCode::BAD_REQUEST, PathError::Empty.to_string())
    })?;
    let raw = payload
        .log_file_path
        .as_ref()
        .and_then(Value::as_str)
        .ok_or_else(|| error_reply(StatusCode::BAD_REQUEST, PathError::Empty.to_string()))?;

    let path = state
        .resolver
        .resolve(raw)
        .map_err(|err| error_reply(StatusCode::BAD_REQUEST, err.to_string()))?;
    info!(requested = raw, resolved = %path.display(), "watch requested");

    let started = state.watcher.start(path).await.map_err(map_watch_error)?;
    Ok(Json(StatusResponse::ok(started.to_string())))
}

pub async fn stop_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let message = if state.watcher.stop().await {
        "Stopped watching file"
    } else {
        "No file was being watched"
    };
    Json(StatusResponse::ok(message))
}

pub async fn watch_status_handler(State(state): State<AppState>) -> Json<WatchStatusResponse> {
    let path = state.watcher.current_path().await;
    Json(WatchStatusResponse {
        watching: path.is_some(),
        path: path.map(|path| path.display().to_string()),
    })
}

fn map_watch_error(err: WatchError) -> ErrorReply {
    let status = match &err {
        WatchError::NotFound(_) => StatusCode::NOT_FOUND,
        WatchError::NotAFile(_) => StatusCode::BAD_REQUEST,
        WatchError::Io { .. } => {
            warn!(error = %err, "failed to start watch");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_reply(status, err.to_string())
}
