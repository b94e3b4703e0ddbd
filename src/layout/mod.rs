//! # Label Layout Document
//!
//! A `LayoutDocument` is the authoritative state of one label: an ordered list
//! of positioned elements plus the canvas size. It is plain data: clone it to
//! take a snapshot, serialize it to save it.
//!
//! ```
//! use pulselabel::layout::{ElementKind, ElementProperty, LayoutDocument, Position, Size};
//!
//! let mut doc = LayoutDocument::new(Size::new(384.0, 576.0));
//! let el = doc.add_element(ElementKind::Text, Position::new(10.0, 10.0));
//! assert_eq!(el.size, Size::new(120.0, 30.0));
//!
//! doc.update_property(&el.id, ElementProperty::Content("Hello".into()));
//! assert_eq!(doc.element(&el.id).unwrap().content, "Hello");
//! ```

pub mod types;

pub use types::*;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

fn default_canvas() -> Size {
    Size::new(384.0, 576.0)
}

/// An ordered collection of label elements on a fixed-size canvas.
///
/// Elements are kept sorted by `layer`, so iteration order is render order
/// (bottom first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredDocument")]
pub struct LayoutDocument {
    elements: Vec<LayoutElement>,
    canvas_size: Size,
    /// Next layer to hand out. Not persisted; recomputed from the elements.
    #[serde(skip)]
    next_layer: i32,
}

/// Deserialized form; goes through [`LayoutDocument::from_elements`] so
/// saved files with out-of-order layers load in render order.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    #[serde(default)]
    elements: Vec<LayoutElement>,
    #[serde(default = "default_canvas")]
    canvas_size: Size,
}

impl From<StoredDocument> for LayoutDocument {
    fn from(stored: StoredDocument) -> Self {
        Self::from_elements(stored.canvas_size, stored.elements)
    }
}

impl PartialEq for LayoutDocument {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements && self.canvas_size == other.canvas_size
    }
}

impl Default for LayoutDocument {
    fn default() -> Self {
        Self::new(default_canvas())
    }
}

impl LayoutDocument {
    pub fn new(canvas_size: Size) -> Self {
        Self {
            elements: Vec::new(),
            canvas_size: canvas_size.clamped(),
            next_layer: 0,
        }
    }

    /// Build a document from saved elements, restoring layer order.
    ///
    /// Positions and sizes are clamped like [`insert`](Self::insert) does, and
    /// empty or repeated ids are replaced with fresh ones. Saved layers are kept.
    pub fn from_elements(canvas_size: Size, mut elements: Vec<LayoutElement>) -> Self {
        let mut seen = HashSet::with_capacity(elements.len());
        for element in &mut elements {
            if element.id.is_empty() || !seen.insert(element.id.clone()) {
                element.id = uuid::Uuid::new_v4().to_string();
                seen.insert(element.id.clone());
            }
            element.position = element.position.clamped();
            element.size = element.size.clamped();
        }
        elements.sort_by_key(|e| e.layer);
        Self {
            elements,
            canvas_size: canvas_size.clamped(),
            next_layer: 0,
        }
    }

    pub fn elements(&self) -> &[LayoutElement] {
        &self.elements
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        self.canvas_size = size.clamped();
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, id: &str) -> Option<&LayoutElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: &str) -> Option<&mut LayoutElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Layer for the next created element: above everything ever handed out.
    fn take_layer(&mut self) -> i32 {
        let above_existing = self
            .elements
            .iter()
            .map(|e| e.layer.saturating_add(1))
            .max()
            .unwrap_or(0);
        let layer = self.next_layer.max(above_existing);
        self.next_layer = layer.saturating_add(1);
        layer
    }

    /// Create an element of `kind` at `position` with kind-specific defaults
    /// and append it on top. Never fails.
    pub fn add_element(&mut self, kind: ElementKind, position: Position) -> LayoutElement {
        let element = LayoutElement {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            position: position.clamped(),
            size: kind.default_size(),
            content: kind.default_content().to_string(),
            style: ElementStyle::default(),
            binding: None,
            layer: 0,
        };
        self.insert(element)
    }

    /// Append a prepared element, assigning it the next layer.
    ///
    /// An element whose id collides with an existing one gets a fresh id.
    pub fn insert(&mut self, mut element: LayoutElement) -> LayoutElement {
        if element.id.is_empty() || self.element(&element.id).is_some() {
            element.id = uuid::Uuid::new_v4().to_string();
        }
        element.position = element.position.clamped();
        element.size = element.size.clamped();
        element.layer = self.take_layer();
        self.elements.push(element.clone());
        element
    }

    /// Replace one field of the element with `id`. Returns `false` (and does
    /// nothing) when the id is unknown or the value is unchanged.
    pub fn update_property(&mut self, id: &str, property: ElementProperty) -> bool {
        let relayer = matches!(property, ElementProperty::Layer(_));
        let Some(element) = self.element_mut(id) else {
            return false;
        };
        let changed = element.apply(property);
        if changed && relayer {
            self.elements.sort_by_key(|e| e.layer);
        }
        changed
    }

    /// Replace one style field of the element with `id`. Same contract as
    /// [`update_property`](Self::update_property).
    pub fn update_style(&mut self, id: &str, property: StyleProperty) -> bool {
        match self.element_mut(id) {
            Some(element) => element.style.apply(property),
            None => false,
        }
    }

    /// Remove the element with `id`. Returns the removed element, if any.
    pub fn remove_element(&mut self, id: &str) -> Option<LayoutElement> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(index))
    }
}
