//! # Error Types
//!
//! This module defines error types used throughout the pulselabel library.
//!
//! Lookups that miss (unknown element ids, unbound keys) are not errors: they
//! degrade to no-ops or placeholder text. Record validation problems are
//! reported as data in [`crate::bulk::ValidationReport`].

use thiserror::Error;

/// Main error type for pulselabel operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Printer transport errors (device open, write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Rendering a label to a raster failed
    #[error("Render error: {0}")]
    Render(String),

    /// Bulk import could not be parsed or exceeded limits
    #[error("Import error: {0}")]
    Import(String),

    /// Template lookup or persistence problem
    #[error("Template error: {0}")]
    Template(String),

    /// Invalid configuration (logging, server, printer)
    #[error("Config error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
