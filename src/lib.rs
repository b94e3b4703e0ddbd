//! # PulseLabel - Shipping Label Editor Core
//!
//! PulseLabel is the engine behind a drag-and-drop label designer for parcel
//! shipping. It provides:
//!
//! - **Document model**: positioned, layered label elements
//! - **Undo/redo**: linear snapshot history with branch truncation
//! - **Data bindings**: field palette and placeholder-aware resolution
//! - **Bulk generation**: CSV/JSON import, per-field validation, job log
//! - **Printing**: 1-bit rendering and StarPRNT raster output
//!
//! ## Quick Start
//!
//! ```no_run
//! use pulselabel::{
//!     binding::DataContext,
//!     editor::LabelEditor,
//!     layout::Position,
//!     printer::{CutMode, PrinterConfig, print_job_bytes},
//!     render,
//!     template::{LabelTemplate, Orientation, SizePreset},
//!     transport::DeviceTransport,
//! };
//!
//! let template = LabelTemplate::blank("Parcel", SizePreset::FourBySix, Orientation::Portrait);
//! let mut editor = LabelEditor::from_template(&template);
//! editor.add_field("receiver", Position::new(10.0, 10.0));
//! editor.add_field("tracking_barcode", Position::new(10.0, 60.0));
//!
//! let data = DataContext::new()
//!     .with("receiver", "Ada Nkem")
//!     .with("trackingNumber", "CM123456789");
//! let config = PrinterConfig::TSP650II;
//! let raster = render::render_label_fit(
//!     editor.document(),
//!     &data,
//!     editor.registry(),
//!     config.width_dots as usize,
//! )?;
//!
//! let mut transport = DeviceTransport::open("/dev/rfcomm0")?;
//! transport.write_all(&print_job_bytes(&raster, &config, CutMode::Full)?)?;
//! # Ok::<(), pulselabel::LabelError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`layout`] | Elements, styles and the layout document |
//! | [`history`] | Snapshot undo/redo stack |
//! | [`binding`] | Field types, binding keys, data resolution |
//! | [`editor`] | Editing session: document + history + observers |
//! | [`template`] | Size presets and saved templates |
//! | [`store`] | Template and job persistence |
//! | [`bulk`] | Import, validation and bulk generation |
//! | [`render`] | Label rasterization and PNG output |
//! | [`protocol`] | StarPRNT command builders |
//! | [`printer`] | Printer presets and print jobs |
//! | [`transport`] | Device file output |
//! | [`server`] | HTTP API |
//! | [`telemetry`] | Logging setup |
//! | [`error`] | Error types |

pub mod binding;
pub mod bulk;
pub mod editor;
pub mod error;
pub mod history;
pub mod layout;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod server;
pub mod store;
pub mod telemetry;
pub mod template;
pub mod transport;

// Re-exports for convenience
pub use binding::{BindingKey, DataContext, FieldBindingRegistry};
pub use editor::LabelEditor;
pub use error::LabelError;
pub use history::HistoryStack;
pub use layout::LayoutDocument;
pub use printer::PrinterConfig;
pub use template::LabelTemplate;
pub use transport::DeviceTransport;
