//! Directory-backed template store: one pretty-printed `<slug>.json` per template.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{TemplateStore, TemplateSummary, validate_name};
use crate::error::LabelError;
use crate::template::LabelTemplate;

#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    dir: PathBuf,
}

impl FsTemplateStore {
    /// Open (creating if needed) a template directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, LabelError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, LabelError> {
        Ok(self.dir.join(format!("{}.json", validate_name(name)?)))
    }
}

impl TemplateStore for FsTemplateStore {
    fn list(&self) -> Result<Vec<TemplateSummary>, LabelError> {
        let mut list = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = fs::read_to_string(&path)?;
            match LabelTemplate::from_json(&json) {
                Ok(t) => list.push(TemplateSummary::from(&t)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable template"),
            }
        }
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    fn load(&self, name: &str) -> Result<Option<LabelTemplate>, LabelError> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(json) => Ok(Some(LabelTemplate::from_json(&json)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, template: &LabelTemplate) -> Result<(), LabelError> {
        let path = self.path_for(&template.name)?;
        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, template.to_json()?)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), "template saved");
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<bool, LabelError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
