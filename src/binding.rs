//! # Field Bindings
//!
//! Field types are the drag sources of the label editor. Each one maps to an
//! element kind, a default size, and optionally a [`BindingKey`] that is
//! resolved against a [`DataContext`] when the label is rendered or printed.
//!
//! Resolution order for a bound element:
//!
//! 1. the value in the data context, if present
//! 2. the key's placeholder (e.g. `trackingNumber` → `TRK123456789`)
//! 3. the element's literal `content`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::layout::{ElementKind, LayoutElement, Position, Size};

// ============================================================================
// BINDING KEYS
// ============================================================================

/// A semantic data source a label element can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingKey {
    Sender,
    SenderAddress,
    SenderPhone,
    Receiver,
    ReceiverAddress,
    ReceiverPhone,
    TrackingNumber,
    Status,
    Weight,
    ServiceType,
    ShipDate,
    Reference,
}

impl BindingKey {
    pub const ALL: [BindingKey; 12] = [
        BindingKey::Sender,
        BindingKey::SenderAddress,
        BindingKey::SenderPhone,
        BindingKey::Receiver,
        BindingKey::ReceiverAddress,
        BindingKey::ReceiverPhone,
        BindingKey::TrackingNumber,
        BindingKey::Status,
        BindingKey::Weight,
        BindingKey::ServiceType,
        BindingKey::ShipDate,
        BindingKey::Reference,
    ];

    /// The key as it appears in data contexts and saved templates.
    pub fn as_str(self) -> &'static str {
        match self {
            BindingKey::Sender => "sender",
            BindingKey::SenderAddress => "senderAddress",
            BindingKey::SenderPhone => "senderPhone",
            BindingKey::Receiver => "receiver",
            BindingKey::ReceiverAddress => "receiverAddress",
            BindingKey::ReceiverPhone => "receiverPhone",
            BindingKey::TrackingNumber => "trackingNumber",
            BindingKey::Status => "status",
            BindingKey::Weight => "weight",
            BindingKey::ServiceType => "serviceType",
            BindingKey::ShipDate => "shipDate",
            BindingKey::Reference => "reference",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Fixed text shown when no data is bound.
    pub fn placeholder(self) -> &'static str {
        match self {
            BindingKey::Sender => "Sender Name",
            BindingKey::SenderAddress => "123 Sender Street, Douala",
            BindingKey::SenderPhone => "+237 600 000 000",
            BindingKey::Receiver => "Receiver Name",
            BindingKey::ReceiverAddress => "456 Receiver Avenue, Yaounde",
            BindingKey::ReceiverPhone => "+237 699 999 999",
            BindingKey::TrackingNumber => "TRK123456789",
            BindingKey::Status => "In Transit",
            BindingKey::Weight => "1.0 kg",
            BindingKey::ServiceType => "Standard",
            BindingKey::ShipDate => "2024-01-01",
            BindingKey::Reference => "REF-000000",
        }
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DATA CONTEXT
// ============================================================================

/// Runtime key → value data a label is rendered against.
///
/// Keys are plain strings so that bulk records with arbitrary headers can be
/// used directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataContext {
    values: HashMap<String, String>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<HashMap<String, String>> for DataContext {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DataContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// FIELD TYPES
// ============================================================================

/// A draggable field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldType {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: ElementKind,
    pub default_size: Size,
    pub binding: Option<BindingKey>,
}

const fn field(
    id: &'static str,
    label: &'static str,
    kind: ElementKind,
    width: f32,
    height: f32,
    binding: Option<BindingKey>,
) -> FieldType {
    FieldType {
        id,
        label,
        kind,
        default_size: Size { width, height },
        binding,
    }
}

const BUILTIN_FIELDS: &[FieldType] = &[
    field("text", "Static Text", ElementKind::Text, 120.0, 30.0, None),
    field("sender", "Sender Name", ElementKind::DynamicField, 200.0, 30.0, Some(BindingKey::Sender)),
    field("sender_address", "Sender Address", ElementKind::DynamicField, 250.0, 60.0, Some(BindingKey::SenderAddress)),
    field("sender_phone", "Sender Phone", ElementKind::DynamicField, 150.0, 30.0, Some(BindingKey::SenderPhone)),
    field("receiver", "Receiver Name", ElementKind::DynamicField, 200.0, 30.0, Some(BindingKey::Receiver)),
    field("receiver_address", "Receiver Address", ElementKind::DynamicField, 250.0, 60.0, Some(BindingKey::ReceiverAddress)),
    field("receiver_phone", "Receiver Phone", ElementKind::DynamicField, 150.0, 30.0, Some(BindingKey::ReceiverPhone)),
    field("tracking_number", "Tracking Number", ElementKind::DynamicField, 180.0, 30.0, Some(BindingKey::TrackingNumber)),
    field("tracking_barcode", "Tracking Barcode", ElementKind::Barcode, 200.0, 60.0, Some(BindingKey::TrackingNumber)),
    field("tracking_qr", "Tracking QR Code", ElementKind::Qr, 80.0, 80.0, Some(BindingKey::TrackingNumber)),
    field("status", "Status", ElementKind::DynamicField, 120.0, 30.0, Some(BindingKey::Status)),
    field("weight", "Weight", ElementKind::DynamicField, 100.0, 30.0, Some(BindingKey::Weight)),
    field("service_type", "Service Type", ElementKind::DynamicField, 120.0, 30.0, Some(BindingKey::ServiceType)),
    field("ship_date", "Ship Date", ElementKind::DynamicField, 120.0, 30.0, Some(BindingKey::ShipDate)),
    field("reference", "Reference", ElementKind::DynamicField, 150.0, 30.0, Some(BindingKey::Reference)),
    field("shape", "Box", ElementKind::Shape, 100.0, 60.0, None),
    field("image", "Image / Logo", ElementKind::Image, 100.0, 100.0, None),
];

/// Static registry of field types plus binding resolution.
#[derive(Debug, Clone, Copy)]
pub struct FieldBindingRegistry {
    fields: &'static [FieldType],
}

impl Default for FieldBindingRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FieldBindingRegistry {
    /// The shipping-label field set used by the editor.
    pub fn builtin() -> Self {
        Self {
            fields: BUILTIN_FIELDS,
        }
    }

    pub fn fields(&self) -> &'static [FieldType] {
        self.fields
    }

    pub fn field(&self, id: &str) -> Option<&'static FieldType> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Prepare an element for `field_id` at `position`. The element has no id
    /// or layer yet; [`LayoutDocument::insert`](crate::layout::LayoutDocument::insert)
    /// assigns both.
    pub fn create_element(&self, field_id: &str, position: Position) -> Option<LayoutElement> {
        let field = self.field(field_id)?;
        let content = match (field.kind, field.binding) {
            (ElementKind::DynamicField, Some(key)) => key.as_str().to_string(),
            (_, Some(key)) => key.placeholder().to_string(),
            (kind, None) => kind.default_content().to_string(),
        };
        Some(LayoutElement {
            id: String::new(),
            kind: field.kind,
            position: position.clamped(),
            size: field.default_size,
            content,
            style: Default::default(),
            binding: field.binding,
            layer: 0,
        })
    }

    /// Resolve `key` against `context`, falling back to the key's placeholder
    /// and then to `content`.
    pub fn resolve(&self, key: &str, content: &str, context: &DataContext) -> String {
        if let Some(value) = context.get(key) {
            return value.to_string();
        }
        match BindingKey::parse(key) {
            Some(known) => known.placeholder().to_string(),
            None => content.to_string(),
        }
    }

    /// The text an element displays for `context`.
    pub fn resolve_element(&self, element: &LayoutElement, context: &DataContext) -> String {
        match (element.binding, element.kind) {
            (Some(key), _) => self.resolve(key.as_str(), &element.content, context),
            (None, ElementKind::DynamicField) => {
                self.resolve(&element.content, &element.content, context)
            }
            (None, _) => element.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip_names() {
        for key in BindingKey::ALL {
            assert_eq!(BindingKey::parse(key.as_str()), Some(key));
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn test_resolve_prefers_context() {
        let registry = FieldBindingRegistry::builtin();
        let ctx = DataContext::new().with("trackingNumber", "CM-42");
        assert_eq!(registry.resolve("trackingNumber", "", &ctx), "CM-42");
    }

    #[test]
    fn test_resolve_falls_back_to_placeholder() {
        let registry = FieldBindingRegistry::builtin();
        let ctx = DataContext::new();
        assert_eq!(registry.resolve("trackingNumber", "raw", &ctx), "TRK123456789");
    }

    #[test]
    fn test_resolve_unknown_key_uses_content() {
        let registry = FieldBindingRegistry::builtin();
        let ctx = DataContext::new();
        assert_eq!(registry.resolve("villageName", "Bafut", &ctx), "Bafut");
    }

    #[test]
    fn test_resolve_unknown_key_in_context() {
        let registry = FieldBindingRegistry::builtin();
        let ctx = DataContext::new().with("villageName", "Bamenda");
        assert_eq!(registry.resolve("villageName", "Bafut", &ctx), "Bamenda");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let registry = FieldBindingRegistry::builtin();
        let ctx = DataContext::new().with("status", "Delivered");
        let first = registry.resolve("status", "x", &ctx);
        let second = registry.resolve("status", "x", &ctx);
        assert_eq!(first, second);
    }

    #[test]
    fn test_create_dynamic_field() {
        let registry = FieldBindingRegistry::builtin();
        let el = registry
            .create_element("sender", Position::new(5.0, 5.0))
            .unwrap();
        assert_eq!(el.kind, ElementKind::DynamicField);
        assert_eq!(el.content, "sender");
        assert_eq!(el.binding, Some(BindingKey::Sender));
        assert_eq!(el.size, Size::new(200.0, 30.0));
    }

    #[test]
    fn test_create_bound_barcode() {
        let registry = FieldBindingRegistry::builtin();
        let el = registry
            .create_element("tracking_barcode", Position::default())
            .unwrap();
        assert_eq!(el.kind, ElementKind::Barcode);
        assert_eq!(el.content, "TRK123456789");
    }

    #[test]
    fn test_unknown_field_type() {
        let registry = FieldBindingRegistry::builtin();
        assert!(registry.create_element("nope", Position::default()).is_none());
    }

    #[test]
    fn test_resolve_element_dynamic_without_binding() {
        let registry = FieldBindingRegistry::builtin();
        let mut el = registry
            .create_element("receiver", Position::default())
            .unwrap();
        el.binding = None;
        let ctx = DataContext::new().with("receiver", "Ngono Marie");
        assert_eq!(registry.resolve_element(&el, &ctx), "Ngono Marie");
    }

    #[test]
    fn test_resolve_element_static_text() {
        let registry = FieldBindingRegistry::builtin();
        let el = registry.create_element("text", Position::default()).unwrap();
        let ctx = DataContext::new().with("text", "ignored");
        assert_eq!(registry.resolve_element(&el, &ctx), "Text");
    }

    #[test]
    fn test_field_ids_unique() {
        let registry = FieldBindingRegistry::builtin();
        let ids: std::collections::HashSet<_> = registry.fields().iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), registry.fields().len());
    }
}
