//! # Printer Module
//!
//! - [`config`]: printer hardware parameters
//! - [`job`]: label rasters framed as StarPRNT print jobs

pub mod config;
pub mod job;

pub use config::PrinterConfig;
pub use job::{CutMode, print_batch_bytes, print_job_bytes};
