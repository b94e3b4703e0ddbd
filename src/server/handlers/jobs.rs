//! Job log handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::bulk::{GenerationJob, export_jobs_csv};

use super::super::state::AppState;
use super::reject;

/// GET /api/jobs - All generation jobs, oldest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GenerationJob>>, (StatusCode, String)> {
    state.jobs.jobs().map(Json).map_err(reject)
}

/// GET /api/jobs/export - The job log as a CSV download.
pub async fn export(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let jobs = state.jobs.jobs().map_err(reject)?;
    let mut csv = Vec::new();
    export_jobs_csv(&jobs, &mut csv).map_err(reject)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"label-jobs.csv\"",
            ),
        ],
        csv,
    ))
}
