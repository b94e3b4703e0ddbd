//! Bulk validation and generation handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::bulk::{
    self, BulkGenerator, FieldRule, GenerationJob, ImportFormat, InvalidRecord, Record,
    ValidationReport, Validator,
};
use crate::error::LabelError;
use crate::printer::{CutMode, print_batch_bytes};

use super::super::state::AppState;
use super::{reject, require_template, send_to_printer};

fn default_true() -> bool {
    true
}

/// Raw records plus the rules to check them against.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInput {
    pub format: ImportFormat,
    /// CSV text with a header row, or a JSON array of objects.
    pub data: String,
    #[serde(default)]
    pub rules: Vec<FieldRule>,
}

impl BulkInput {
    fn records(&self) -> Result<Vec<Record>, LabelError> {
        match self.format {
            ImportFormat::Csv => bulk::import_csv(self.data.as_bytes()),
            ImportFormat::Json => bulk::import_json(&self.data),
        }
    }

    fn validate(&self) -> Result<ValidationReport, LabelError> {
        let validator = Validator::new(self.rules.clone())?;
        Ok(validator.validate(self.records()?))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub template: String,
    #[serde(flatten)]
    pub input: BulkInput,
    /// Send the generated labels to the printer as one job.
    #[serde(default)]
    pub print: bool,
    #[serde(default = "default_true")]
    pub cut: bool,
    #[serde(default)]
    pub partial_cut: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub job: GenerationJob,
    /// Records skipped by validation.
    pub invalid: Vec<InvalidRecord>,
    pub printed: bool,
}

/// POST /api/bulk/validate - Import records and report which are valid.
pub async fn validate(
    Json(input): Json<BulkInput>,
) -> Result<Json<ValidationReport>, (StatusCode, String)> {
    let report = input.validate().map_err(reject)?;
    info!(
        valid = report.valid.len(),
        invalid = report.invalid.len(),
        "bulk records validated"
    );
    Ok(Json(report))
}

/// POST /api/bulk/generate - Validate, then render every valid record.
///
/// Invalid records are returned and skipped; they do not stop the batch.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    let template = require_template(&state, &req.template)?;
    let report = req.input.validate().map_err(reject)?;

    let generator =
        BulkGenerator::new(state.registry).fit_width(state.config.printer.width_dots as usize);
    let valid = report.valid;
    let output = tokio::task::spawn_blocking(move || {
        generator.generate(&template, &valid, |p| {
            debug!(completed = p.completed, total = p.total, failed = p.failed, "bulk progress");
        })
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Task error: {}", e)))?;

    state.jobs.record(output.job.clone()).map_err(reject)?;

    let printed = req.print && !output.labels.is_empty();
    if printed {
        let rasters: Vec<_> = output.labels.into_iter().map(|l| l.raster).collect();
        let cut = CutMode::from_flags(req.cut, req.partial_cut);
        let bytes = print_batch_bytes(&rasters, &state.config.printer, cut).map_err(reject)?;
        send_to_printer(state.config.device_path.clone(), bytes).await?;
        info!(job = %output.job.id, labels = rasters.len(), "bulk labels printed");
    }

    Ok(Json(GenerateResponse {
        job: output.job,
        invalid: report.invalid,
        printed,
    }))
}
