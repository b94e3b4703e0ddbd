//! Sequential label generation and the job log export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{info, warn};

use super::Record;
use crate::binding::FieldBindingRegistry;
use crate::error::LabelError;
use crate::render::{self, LabelRaster};
use crate::template::LabelTemplate;

/// Fixed column order of the job CSV export.
pub const JOB_CSV_COLUMNS: [&str; 8] = [
    "job_id",
    "template",
    "total",
    "generated",
    "failed",
    "status",
    "started_at",
    "finished_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Completed,
    CompletedWithErrors,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Completed => "completed",
            JobStatus::CompletedWithErrors => "completed_with_errors",
            JobStatus::Failed => "failed",
        }
    }
}

/// A record that could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    pub record_index: usize,
    pub error: String,
}

/// Summary of one bulk generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub id: String,
    pub template: String,
    pub total: usize,
    pub generated: usize,
    pub failed: usize,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

/// Reported after each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub failed: usize,
}

impl Progress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f32 * 100.0 / self.total as f32
        }
    }
}

/// One rendered label.
#[derive(Debug, Clone)]
pub struct GeneratedLabel {
    pub record_index: usize,
    pub raster: LabelRaster,
}

#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub job: GenerationJob,
    pub labels: Vec<GeneratedLabel>,
}

/// Renders a template once per record.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkGenerator {
    registry: FieldBindingRegistry,
    max_width: Option<usize>,
}

impl BulkGenerator {
    pub fn new(registry: FieldBindingRegistry) -> Self {
        Self {
            registry,
            max_width: None,
        }
    }

    /// Scale labels down to fit a printer width.
    pub fn fit_width(mut self, max_width: usize) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Render every record in order. A record that fails to render is logged
    /// in the job and skipped; completed labels are kept.
    pub fn generate(
        &self,
        template: &LabelTemplate,
        records: &[Record],
        mut on_progress: impl FnMut(Progress),
    ) -> GenerationOutput {
        let started_at = Utc::now();
        let total = records.len();
        let mut labels = Vec::with_capacity(total);
        let mut failures = Vec::new();

        info!(template = %template.name, total, "bulk generation started");

        for (n, record) in records.iter().enumerate() {
            let context = record.to_context();
            let rendered = match self.max_width {
                Some(w) => render::render_label_fit(&template.layout, &context, &self.registry, w),
                None => render::render_label(&template.layout, &context, &self.registry),
            };
            match rendered {
                Ok(raster) => labels.push(GeneratedLabel {
                    record_index: record.index,
                    raster,
                }),
                Err(e) => {
                    warn!(record = record.index, error = %e, "label render failed");
                    failures.push(RecordFailure {
                        record_index: record.index,
                        error: e.to_string(),
                    });
                }
            }
            on_progress(Progress {
                completed: n + 1,
                total,
                failed: failures.len(),
            });
        }

        let status = match (labels.len(), failures.len()) {
            (_, 0) => JobStatus::Completed,
            (0, _) => JobStatus::Failed,
            _ => JobStatus::CompletedWithErrors,
        };
        let job = GenerationJob {
            id: uuid::Uuid::new_v4().to_string(),
            template: template.name.clone(),
            total,
            generated: labels.len(),
            failed: failures.len(),
            status,
            started_at,
            finished_at: Utc::now(),
            failures,
        };
        info!(
            job = %job.id,
            generated = job.generated,
            failed = job.failed,
            status = job.status.as_str(),
            "bulk generation finished"
        );

        GenerationOutput { job, labels }
    }
}

/// Write jobs as CSV with the [`JOB_CSV_COLUMNS`] header.
pub fn export_jobs_csv<W: Write>(jobs: &[GenerationJob], writer: W) -> Result<(), LabelError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(JOB_CSV_COLUMNS)?;
    for job in jobs {
        csv.write_record([
            job.id.clone(),
            job.template.clone(),
            job.total.to_string(),
            job.generated.to_string(),
            job.failed.to_string(),
            job.status.as_str().to_string(),
            job.started_at.to_rfc3339(),
            job.finished_at.to_rfc3339(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}
