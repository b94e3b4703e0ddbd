//! Element types for the label layout model.
//!
//! All types derive `Serialize + Deserialize` so the same types work for
//! both Rust API construction and the saved template JSON format.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::binding::BindingKey;

// ============================================================================
// GEOMETRY
// ============================================================================

/// Top-left corner of an element in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }.clamped()
    }

    /// Negative coordinates are pulled back onto the canvas.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }
}

/// Width and height in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Smallest allowed element dimension.
pub const MIN_DIMENSION: f32 = 1.0;

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }.clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(MIN_DIMENSION),
            height: self.height.max(MIN_DIMENSION),
        }
    }
}

// ============================================================================
// ELEMENT KIND
// ============================================================================

/// The closed set of things that can be placed on a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Text,
    Barcode,
    Qr,
    Image,
    Shape,
    DynamicField,
}

impl ElementKind {
    pub const ALL: [ElementKind; 6] = [
        ElementKind::Text,
        ElementKind::Barcode,
        ElementKind::Qr,
        ElementKind::Image,
        ElementKind::Shape,
        ElementKind::DynamicField,
    ];

    /// Size given to a freshly created element of this kind.
    pub fn default_size(self) -> Size {
        match self {
            ElementKind::Text => Size::new(120.0, 30.0),
            ElementKind::Barcode => Size::new(200.0, 60.0),
            ElementKind::Qr => Size::new(80.0, 80.0),
            ElementKind::Image => Size::new(100.0, 100.0),
            ElementKind::Shape => Size::new(100.0, 60.0),
            ElementKind::DynamicField => Size::new(150.0, 30.0),
        }
    }

    /// Starter content so a new element is visible on the canvas.
    pub fn default_content(self) -> &'static str {
        match self {
            ElementKind::Text => "Text",
            ElementKind::Barcode => "123456789",
            ElementKind::Qr => "https://camerpulse.cm",
            ElementKind::Image => "",
            ElementKind::Shape => "",
            ElementKind::DynamicField => "trackingNumber",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Barcode => "barcode",
            ElementKind::Qr => "qr",
            ElementKind::Image => "image",
            ElementKind::Shape => "shape",
            ElementKind::DynamicField => "dynamic-field",
        }
    }

    /// Whether rendering this kind draws resolved text (as opposed to symbols or pixels).
    pub fn is_textual(self) -> bool {
        matches!(self, ElementKind::Text | ElementKind::DynamicField)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// STYLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

pub const DEFAULT_FONT_FAMILY: &str = "monospace";
pub const DEFAULT_FONT_SIZE: f32 = 14.0;
pub const DEFAULT_COLOR: &str = "#000000";

/// Visual style of an element. Every field is optional; accessors return
/// the effective value with defaults applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    /// Text/foreground color as `#rrggbb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Fill color as `#rrggbb`. `None` or `"transparent"` means no fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f32>,
}

impl ElementStyle {
    pub fn font_family(&self) -> &str {
        self.font_family.as_deref().unwrap_or(DEFAULT_FONT_FAMILY)
    }

    pub fn font_size(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE).max(1.0)
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight.unwrap_or_default()
    }

    pub fn text_align(&self) -> TextAlign {
        self.text_align.unwrap_or_default()
    }

    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR)
    }

    /// Background fill, or `None` when transparent.
    pub fn background_color(&self) -> Option<&str> {
        self.background_color
            .as_deref()
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("transparent"))
    }

    pub fn padding(&self) -> f32 {
        self.padding.unwrap_or(0.0).max(0.0)
    }

    /// Apply a single style change. Returns `true` if the value differs.
    pub fn apply(&mut self, property: StyleProperty) -> bool {
        fn set<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        }

        match property {
            StyleProperty::FontFamily(v) => set(&mut self.font_family, v),
            StyleProperty::FontSize(v) => set(&mut self.font_size, v.map(|s| s.max(1.0))),
            StyleProperty::FontWeight(v) => set(&mut self.font_weight, v),
            StyleProperty::TextAlign(v) => set(&mut self.text_align, v),
            StyleProperty::Color(v) => set(&mut self.color, v),
            StyleProperty::BackgroundColor(v) => set(&mut self.background_color, v),
            StyleProperty::Padding(v) => set(&mut self.padding, v.map(|p| p.max(0.0))),
        }
    }
}

/// A single style field change. `None` resets the field to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum StyleProperty {
    FontFamily(Option<String>),
    FontSize(Option<f32>),
    FontWeight(Option<FontWeight>),
    TextAlign(Option<TextAlign>),
    Color(Option<String>),
    BackgroundColor(Option<String>),
    Padding(Option<f32>),
}

// ============================================================================
// ELEMENT
// ============================================================================

/// One positioned, styled item on the label canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub position: Position,
    pub size: Size,
    /// Literal text, or the binding key for dynamic fields.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<BindingKey>,
    #[serde(default)]
    pub layer: i32,
}

/// A single element field change, addressed by element id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum ElementProperty {
    Position(Position),
    Size(Size),
    Content(String),
    Binding(Option<BindingKey>),
    Layer(i32),
}

impl LayoutElement {
    /// Apply a property change. Returns `true` if the element changed.
    pub fn apply(&mut self, property: ElementProperty) -> bool {
        match property {
            ElementProperty::Position(p) => replace(&mut self.position, p.clamped()),
            ElementProperty::Size(s) => replace(&mut self.size, s.clamped()),
            ElementProperty::Content(c) => replace(&mut self.content, c),
            ElementProperty::Binding(b) => replace(&mut self.binding, b),
            ElementProperty::Layer(l) => replace(&mut self.layer, l),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
