//! Template API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::store::TemplateSummary;
use crate::template::{LabelTemplate, slugify};

use super::super::state::AppState;
use super::{reject, require_template};

/// GET /api/templates - Summaries of all saved templates.
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemplateSummary>>, (StatusCode, String)> {
    state.templates.list().map(Json).map_err(reject)
}

/// GET /api/templates/:name - One template.
pub async fn load(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<LabelTemplate>, (StatusCode, String)> {
    require_template(&state, &name).map(Json)
}

/// PUT /api/templates/:name - Create or replace a template.
///
/// An empty `name` in the body takes the name from the path; otherwise both
/// must have the same slug.
pub async fn save(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(mut template): Json<LabelTemplate>,
) -> Result<Json<TemplateSummary>, (StatusCode, String)> {
    if template.name.trim().is_empty() {
        template.name = name.clone();
    } else if template.slug() != slugify(&name) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Template name '{}' does not match path '{}'",
                template.name, name
            ),
        ));
    }
    template.updated_at = Utc::now();

    state.templates.save(&template).map_err(reject)?;
    info!(template = %template.name, elements = template.layout.len(), "template saved");
    Ok(Json(TemplateSummary::from(&template)))
}

/// DELETE /api/templates/:name
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.templates.delete(&name).map_err(reject)? {
        info!(template = %name, "template deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("Template '{}' not found", name),
        ))
    }
}
