//! # Data Access
//!
//! Storage is reached through traits that are passed explicitly to whoever
//! needs them (the CLI, the HTTP state, tests). There is no global client.
//!
//! | Trait | Implementations |
//! |-------|-----------------|
//! | [`TemplateStore`] | [`MemoryTemplateStore`], [`FsTemplateStore`] |
//! | [`JobStore`] | [`MemoryJobStore`] |

mod fs;
mod memory;

pub use fs::FsTemplateStore;
pub use memory::{MemoryJobStore, MemoryTemplateStore};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bulk::GenerationJob;
use crate::error::LabelError;
use crate::template::{LabelTemplate, Orientation, SizePreset};

/// Listing entry for a saved template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub name: String,
    pub slug: String,
    pub size_preset: SizePreset,
    pub orientation: Orientation,
    pub element_count: usize,
    pub updated_at: DateTime<Utc>,
}

impl From<&LabelTemplate> for TemplateSummary {
    fn from(t: &LabelTemplate) -> Self {
        Self {
            name: t.name.clone(),
            slug: t.slug(),
            size_preset: t.size_preset,
            orientation: t.orientation,
            element_count: t.layout.len(),
            updated_at: t.updated_at,
        }
    }
}

/// Persistence for label templates, keyed by name (compared by slug).
pub trait TemplateStore: Send + Sync {
    /// All templates, sorted by name.
    fn list(&self) -> Result<Vec<TemplateSummary>, LabelError>;

    fn load(&self, name: &str) -> Result<Option<LabelTemplate>, LabelError>;

    /// Insert or replace.
    fn save(&self, template: &LabelTemplate) -> Result<(), LabelError>;

    /// Returns `true` if a template was removed.
    fn delete(&self, name: &str) -> Result<bool, LabelError>;

    /// Like [`load`](Self::load) but a missing template is an error.
    fn require(&self, name: &str) -> Result<LabelTemplate, LabelError> {
        self.load(name)?
            .ok_or_else(|| LabelError::Template(format!("Template '{}' not found", name)))
    }
}

/// Log of bulk generation runs.
pub trait JobStore: Send + Sync {
    fn record(&self, job: GenerationJob) -> Result<(), LabelError>;

    /// All jobs, oldest first.
    fn jobs(&self) -> Result<Vec<GenerationJob>, LabelError>;
}

fn validate_name(name: &str) -> Result<String, LabelError> {
    let slug = crate::template::slugify(name);
    if slug.is_empty() {
        return Err(LabelError::Template(format!(
            "Template name '{}' has no usable characters",
            name
        )));
    }
    Ok(slug)
}
