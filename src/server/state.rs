//! Server state and configuration.

use std::path::PathBuf;
use std::sync::Arc;

use crate::binding::FieldBindingRegistry;
use crate::error::LabelError;
use crate::printer::PrinterConfig;
use crate::store::{FsTemplateStore, JobStore, MemoryJobStore, MemoryTemplateStore, TemplateStore};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Path to the printer device (e.g., "/dev/rfcomm0")
    pub device_path: String,
    /// Directory of saved templates. Templates live in memory when unset.
    pub template_dir: Option<PathBuf>,
    pub printer: PrinterConfig,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub templates: Arc<dyn TemplateStore>,
    pub jobs: Arc<dyn JobStore>,
    pub registry: FieldBindingRegistry,
}

impl AppState {
    /// State with the stores `config` asks for and an empty job log.
    pub fn new(config: ServerConfig) -> Result<Self, LabelError> {
        let templates: Arc<dyn TemplateStore> = match &config.template_dir {
            Some(dir) => Arc::new(FsTemplateStore::open(dir)?),
            None => Arc::new(MemoryTemplateStore::new()),
        };
        Ok(Self::with_stores(config, templates, Arc::new(MemoryJobStore::new())))
    }

    pub fn with_stores(
        config: ServerConfig,
        templates: Arc<dyn TemplateStore>,
        jobs: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            config,
            templates,
            jobs,
            registry: FieldBindingRegistry::builtin(),
        }
    }
}
