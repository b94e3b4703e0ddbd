//! Field palette handler.

use axum::{Json, extract::State};
use std::sync::Arc;

use crate::binding::FieldType;

use super::super::state::AppState;

/// GET /api/fields - Field types that can be dropped onto a label.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<&'static [FieldType]> {
    Json(state.registry.fields())
}
