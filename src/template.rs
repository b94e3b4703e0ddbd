//! # Label Templates
//!
//! The at-rest format of a saved layout: the document's `elements` and
//! `canvasSize` plus metadata.
//!
//! ```json
//! {
//!   "name": "Parcel 4x6",
//!   "sizePreset": "4x6",
//!   "orientation": "portrait",
//!   "elements": [ { "id": "…", "type": "text", "position": {"x": 10, "y": 10}, … } ],
//!   "canvasSize": { "width": 384, "height": 576 },
//!   "updatedAt": "2024-05-01T12:00:00Z"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::{LayoutDocument, Size};

/// Pixels per inch of the editor canvas.
pub const CANVAS_DPI: f32 = 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Standard label stock sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizePreset {
    #[default]
    #[serde(rename = "4x6")]
    FourBySix,
    #[serde(rename = "4x4")]
    FourByFour,
    #[serde(rename = "a6")]
    A6,
    #[serde(rename = "a5")]
    A5,
    #[serde(rename = "a4")]
    A4,
    /// Free-form canvas; size comes from the document.
    #[serde(rename = "custom")]
    Custom,
}

impl SizePreset {
    pub const ALL: [SizePreset; 6] = [
        SizePreset::FourBySix,
        SizePreset::FourByFour,
        SizePreset::A6,
        SizePreset::A5,
        SizePreset::A4,
        SizePreset::Custom,
    ];

    /// Physical size in millimetres (portrait), `None` for custom.
    pub fn dimensions_mm(self) -> Option<(f32, f32)> {
        match self {
            SizePreset::FourBySix => Some((101.6, 152.4)),
            SizePreset::FourByFour => Some((101.6, 101.6)),
            SizePreset::A6 => Some((105.0, 148.0)),
            SizePreset::A5 => Some((148.0, 210.0)),
            SizePreset::A4 => Some((210.0, 297.0)),
            SizePreset::Custom => None,
        }
    }

    /// Canvas size in pixels for `orientation`, `None` for custom.
    pub fn canvas_size(self, orientation: Orientation) -> Option<Size> {
        let (w_mm, h_mm) = self.dimensions_mm()?;
        let to_px = |mm: f32| (mm / 25.4 * CANVAS_DPI).round();
        let (w, h) = (to_px(w_mm), to_px(h_mm));
        Some(match orientation {
            Orientation::Portrait => Size::new(w, h),
            Orientation::Landscape => Size::new(h, w),
        })
    }

    pub fn parse(s: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase())).ok()
    }
}

/// A named, saved label layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelTemplate {
    pub name: String,
    #[serde(default)]
    pub size_preset: SizePreset,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(flatten)]
    pub layout: LayoutDocument,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl LabelTemplate {
    /// Create a template. For non-custom presets the canvas is resized to the
    /// preset's dimensions.
    pub fn new(
        name: impl Into<String>,
        size_preset: SizePreset,
        orientation: Orientation,
        mut layout: LayoutDocument,
    ) -> Self {
        if let Some(size) = size_preset.canvas_size(orientation) {
            layout.set_canvas_size(size);
        }
        Self {
            name: name.into(),
            size_preset,
            orientation,
            layout,
            updated_at: Utc::now(),
        }
    }

    /// An empty template sized for `size_preset`.
    pub fn blank(name: impl Into<String>, size_preset: SizePreset, orientation: Orientation) -> Self {
        Self::new(name, size_preset, orientation, LayoutDocument::default())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Filesystem/URL-safe form of the template name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

/// Lowercase ASCII alphanumerics separated by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ElementKind, Position};

    #[test]
    fn test_preset_canvas_sizes() {
        assert_eq!(
            SizePreset::FourBySix.canvas_size(Orientation::Portrait),
            Some(Size::new(384.0, 576.0))
        );
        assert_eq!(
            SizePreset::FourBySix.canvas_size(Orientation::Landscape),
            Some(Size::new(576.0, 384.0))
        );
        assert_eq!(SizePreset::Custom.canvas_size(Orientation::Portrait), None);
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!(SizePreset::parse("4x6"), Some(SizePreset::FourBySix));
        assert_eq!(SizePreset::parse("A4"), Some(SizePreset::A4));
        assert_eq!(SizePreset::parse("letter"), None);
    }

    #[test]
    fn test_custom_keeps_document_canvas() {
        let doc = LayoutDocument::new(Size::new(300.0, 200.0));
        let t = LabelTemplate::new("x", SizePreset::Custom, Orientation::Portrait, doc);
        assert_eq!(t.layout.canvas_size(), Size::new(300.0, 200.0));
    }

    #[test]
    fn test_json_is_flat() {
        let mut doc = LayoutDocument::default();
        doc.add_element(ElementKind::Text, Position::new(10.0, 10.0));
        let t = LabelTemplate::new("Parcel", SizePreset::FourBySix, Orientation::Portrait, doc);

        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["name"], "Parcel");
        assert_eq!(value["sizePreset"], "4x6");
        assert_eq!(value["orientation"], "portrait");
        assert_eq!(value["canvasSize"]["width"], 384.0);
        assert_eq!(value["elements"][0]["type"], "text");
        assert!(value.get("layout").is_none());

        let back = LabelTemplate::from_json(&t.to_json().unwrap()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_minimal_json_loads() {
        let t = LabelTemplate::from_json(
            r#"{"name": "min", "elements": [], "canvasSize": {"width": 100, "height": 50}}"#,
        )
        .unwrap();
        assert_eq!(t.size_preset, SizePreset::FourBySix);
        assert_eq!(t.layout.canvas_size(), Size::new(100.0, 50.0));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Parcel 4x6 (Douala)"), "parcel-4x6-douala");
        assert_eq!(slugify("--"), "");
    }
}
