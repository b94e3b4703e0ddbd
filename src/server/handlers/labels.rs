//! Single label preview and print handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::binding::DataContext;
use crate::layout::LayoutDocument;
use crate::printer::{CutMode, print_job_bytes};
use crate::render;

use super::super::state::AppState;
use super::{PrintResponse, require_template, run_blocking, send_to_printer};

fn default_true() -> bool {
    true
}

/// Body of the label endpoints: a saved template or an inline layout, plus
/// the data to bind.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    /// Name of a saved template. Takes precedence over `layout`.
    pub template: Option<String>,
    pub layout: Option<LayoutDocument>,
    #[serde(default)]
    pub data: DataContext,
    #[serde(default = "default_true")]
    pub cut: bool,
    /// Hinged cut instead of a full one.
    #[serde(default)]
    pub partial_cut: bool,
}

fn resolve_layout(
    state: &AppState,
    req: LabelRequest,
) -> Result<(LayoutDocument, DataContext, CutMode), (StatusCode, String)> {
    let layout = match (&req.template, req.layout) {
        (Some(name), _) => require_template(state, name)?.layout,
        (None, Some(layout)) => layout,
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Request needs a template name or a layout".to_string(),
            ));
        }
    };
    Ok((layout, req.data, CutMode::from_flags(req.cut, req.partial_cut)))
}

/// POST /api/labels/preview - Render a label as PNG at canvas size.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabelRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (layout, data, _) = resolve_layout(&state, req)?;
    let registry = state.registry;
    let png = run_blocking(move || {
        render::render_label(&layout, &data, &registry).and_then(|raster| raster.to_png())
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// POST /api/labels/print - Render a label at printer width and print it.
pub async fn print(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabelRequest>,
) -> Result<Json<PrintResponse>, (StatusCode, String)> {
    let (layout, data, cut) = resolve_layout(&state, req)?;
    let printer = state.config.printer;
    let registry = state.registry;
    let (bytes, width, height) = run_blocking(move || {
        let raster =
            render::render_label_fit(&layout, &data, &registry, printer.width_dots as usize)?;
        let bytes = print_job_bytes(&raster, &printer, cut)?;
        Ok((bytes, raster.width, raster.height))
    })
    .await?;

    send_to_printer(state.config.device_path.clone(), bytes).await?;
    info!(width, height, "label printed");

    Ok(Json(PrintResponse {
        success: true,
        message: "Label printed successfully".to_string(),
    }))
}
