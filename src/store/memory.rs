//! In-memory stores for tests and ephemeral servers.

use std::collections::{BTreeMap, VecDeque};
use std::sync::RwLock;

use super::{JobStore, TemplateStore, TemplateSummary, validate_name};
use crate::bulk::GenerationJob;
use crate::error::LabelError;
use crate::template::LabelTemplate;

fn poisoned(what: &str) -> LabelError {
    LabelError::Template(format!("{} lock poisoned", what))
}

#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<BTreeMap<String, LabelTemplate>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn list(&self) -> Result<Vec<TemplateSummary>, LabelError> {
        let templates = self.templates.read().map_err(|_| poisoned("template"))?;
        let mut list: Vec<_> = templates.values().map(TemplateSummary::from).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    fn load(&self, name: &str) -> Result<Option<LabelTemplate>, LabelError> {
        let slug = validate_name(name)?;
        let templates = self.templates.read().map_err(|_| poisoned("template"))?;
        Ok(templates.get(&slug).cloned())
    }

    fn save(&self, template: &LabelTemplate) -> Result<(), LabelError> {
        let slug = validate_name(&template.name)?;
        let mut templates = self.templates.write().map_err(|_| poisoned("template"))?;
        templates.insert(slug, template.clone());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, LabelError> {
        let slug = validate_name(name)?;
        let mut templates = self.templates.write().map_err(|_| poisoned("template"))?;
        Ok(templates.remove(&slug).is_some())
    }
}

/// Jobs kept by [`MemoryJobStore::new`]; the oldest are dropped first.
pub const DEFAULT_JOB_LOG_LIMIT: usize = 1000;

#[derive(Debug)]
pub struct MemoryJobStore {
    jobs: RwLock<VecDeque<GenerationJob>>,
    limit: usize,
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::with_limit(DEFAULT_JOB_LOG_LIMIT)
    }
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` jobs (minimum 1).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            jobs: RwLock::new(VecDeque::new()),
            limit: limit.max(1),
        }
    }
}

impl JobStore for MemoryJobStore {
    fn record(&self, job: GenerationJob) -> Result<(), LabelError> {
        let mut jobs = self.jobs.write().map_err(|_| poisoned("job"))?;
        if jobs.len() == self.limit {
            jobs.pop_front();
        }
        jobs.push_back(job);
        Ok(())
    }

    fn jobs(&self) -> Result<Vec<GenerationJob>, LabelError> {
        Ok(self.jobs.read().map_err(|_| poisoned("job"))?.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Orientation, SizePreset};

    #[test]
    fn test_save_load_delete() {
        let store = MemoryTemplateStore::new();
        let t = LabelTemplate::blank("Parcel Label", SizePreset::FourBySix, Orientation::Portrait);
        store.save(&t).unwrap();

        assert_eq!(store.load("parcel label").unwrap(), Some(t.clone()));
        assert_eq!(store.list().unwrap().len(), 1);
        assert!(store.delete("Parcel Label").unwrap());
        assert!(!store.delete("Parcel Label").unwrap());
        assert!(store.load("Parcel Label").unwrap().is_none());
    }

    #[test]
    fn test_require_missing() {
        let store = MemoryTemplateStore::new();
        assert!(matches!(store.require("ghost"), Err(LabelError::Template(_))));
    }

    #[test]
    fn test_unusable_name_rejected() {
        let store = MemoryTemplateStore::new();
        let t = LabelTemplate::blank("!!!", SizePreset::A6, Orientation::Portrait);
        assert!(store.save(&t).is_err());
    }

    #[test]
    fn test_job_log_drops_oldest() {
        let store = MemoryJobStore::with_limit(2);
        let registry = crate::binding::FieldBindingRegistry::builtin();
        let template = LabelTemplate::blank("Jobs", SizePreset::A6, Orientation::Portrait);
        let generator = crate::bulk::BulkGenerator::new(registry);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let job = generator.generate(&template, &[], |_| {}).job;
            ids.push(job.id.clone());
            store.record(job).unwrap();
        }
        let kept: Vec<_> = store.jobs().unwrap().into_iter().map(|j| j.id).collect();
        assert_eq!(kept, ids[1..].to_vec());
    }
}
