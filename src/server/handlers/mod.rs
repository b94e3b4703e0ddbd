//! HTTP handlers for the server.

pub mod bulk;
pub mod fields;
pub mod jobs;
pub mod labels;
pub mod templates;

use axum::http::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::error::LabelError;
use crate::template::LabelTemplate;

use super::state::AppState;

/// Result body of print endpoints.
#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    pub message: String,
}

/// Map a library error to a status and message.
pub(crate) fn reject(err: LabelError) -> (StatusCode, String) {
    let status = match &err {
        LabelError::Import(_)
        | LabelError::Template(_)
        | LabelError::Json(_)
        | LabelError::Csv(_) => StatusCode::BAD_REQUEST,
        LabelError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LabelError::Transport(_) | LabelError::Config(_) | LabelError::Io(_) => {
            warn!(error = %err, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

/// Load a saved template, 404 when it does not exist.
pub(crate) fn require_template(
    state: &AppState,
    name: &str,
) -> Result<LabelTemplate, (StatusCode, String)> {
    state.templates.load(name).map_err(reject)?.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("Template '{}' not found", name),
        )
    })
}

/// Run fallible CPU or device work on the blocking pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, (StatusCode, String)>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LabelError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(reject(e)),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Task error: {}", e),
        )),
    }
}

/// Send a finished job to the printer on the blocking pool.
pub(crate) async fn send_to_printer(
    device_path: String,
    data: Vec<u8>,
) -> Result<(), (StatusCode, String)> {
    run_blocking(move || crate::transport::send(std::path::Path::new(&device_path), &data)).await
}
