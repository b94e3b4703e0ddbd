//! # Printer Configuration
//!
//! Hardware parameters for supported thermal printers.
//!
//! | Model | Width (dots) | Resolution | Chunk rows |
//! |-------|--------------|------------|------------|
//! | TSP650II | 576 | 203 DPI | 256 |
//! | TSP650II (58mm) | 384 | 203 DPI | 256 |
//!
//! ```
//! use pulselabel::printer::PrinterConfig;
//!
//! let config = PrinterConfig::TSP650II;
//! assert_eq!(config.width_dots, 576);
//! assert_eq!(PrinterConfig::parse("tsp650ii-58").map(|c| c.width_dots), Some(384));
//! ```

use serde::Serialize;

/// # Printer Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots
    pub width_dots: u16,

    /// Resolution in dots per inch
    pub dpi: u16,

    /// Maximum rows per raster command
    pub max_chunk_rows: u16,
}

impl PrinterConfig {
    /// # Star TSP650II, 80mm paper
    ///
    /// ```text
    /// ├── 4mm ──┼────── 72mm printable ──────┼── 4mm ──┤
    /// │ margin  │         576 dots           │ margin  │
    /// ```
    pub const TSP650II: Self = Self {
        name: "Star TSP650II",
        width_dots: 576,
        dpi: 203,
        max_chunk_rows: 256,
    };

    /// Star TSP650II loaded with 58mm paper.
    pub const TSP650II_58MM: Self = Self {
        name: "Star TSP650II (58mm)",
        width_dots: 384,
        dpi: 203,
        max_chunk_rows: 256,
    };

    pub const ALL: [Self; 2] = [Self::TSP650II, Self::TSP650II_58MM];

    /// Look up a preset by short name (`tsp650ii`, `tsp650ii-58`) or model name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tsp650ii" | "tsp650ii-80" => Some(Self::TSP650II),
            "tsp650ii-58" => Some(Self::TSP650II_58MM),
            _ => Self::ALL.into_iter().find(|c| c.name == name),
        }
    }
}
