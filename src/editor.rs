//! # Label Editor Session
//!
//! `LabelEditor` owns one live [`LayoutDocument`] and its [`HistoryStack`].
//! Every mutation that changes the document records a snapshot, and every
//! change is announced to subscribed observers so a host can re-render.
//!
//! The history is seeded with the initial document, so undoing the first
//! edit returns to the state the editor was opened with.

use tracing::debug;

use crate::binding::FieldBindingRegistry;
use crate::history::HistoryStack;
use crate::layout::{
    ElementKind, ElementProperty, LayoutDocument, LayoutElement, Position, StyleProperty,
};
use crate::template::{LabelTemplate, Orientation, SizePreset};

/// Snapshots kept per session; older ones are dropped first.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Change notifications emitted by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ElementAdded { id: String },
    ElementUpdated { id: String },
    ElementRemoved { id: String },
    /// The document was replaced by a history snapshot.
    Restored { cursor: usize },
}

/// Handle returned by [`LabelEditor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&EditorEvent, &LayoutDocument) + Send>;

/// A single editing session over one label layout.
pub struct LabelEditor {
    document: LayoutDocument,
    history: HistoryStack<LayoutDocument>,
    registry: FieldBindingRegistry,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for LabelEditor {
    fn default() -> Self {
        Self::new(LayoutDocument::default())
    }
}

impl LabelEditor {
    /// Open an editor on `document` with the built-in field registry.
    pub fn new(document: LayoutDocument) -> Self {
        Self::with_registry(document, FieldBindingRegistry::builtin())
    }

    pub fn with_registry(document: LayoutDocument, registry: FieldBindingRegistry) -> Self {
        let mut history = HistoryStack::with_limit(DEFAULT_HISTORY_LIMIT);
        history.push(document.clone());
        Self {
            document,
            history,
            registry,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Open an editor on a saved template's layout.
    pub fn from_template(template: &LabelTemplate) -> Self {
        Self::new(template.layout.clone())
    }

    pub fn document(&self) -> &LayoutDocument {
        &self.document
    }

    pub fn history(&self) -> &HistoryStack<LayoutDocument> {
        &self.history
    }

    pub fn registry(&self) -> &FieldBindingRegistry {
        &self.registry
    }

    // ========================================================================
    // OBSERVERS
    // ========================================================================

    /// Register a listener called after every change.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&EditorEvent, &LayoutDocument) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: EditorEvent) {
        debug!(?event, "editor change");
        for (_, listener) in &mut self.listeners {
            listener(&event, &self.document);
        }
    }

    fn record(&mut self, event: EditorEvent) {
        self.history.push(self.document.clone());
        self.emit(event);
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    pub fn add_element(&mut self, kind: ElementKind, position: Position) -> LayoutElement {
        let element = self.document.add_element(kind, position);
        self.record(EditorEvent::ElementAdded {
            id: element.id.clone(),
        });
        element
    }

    /// Drop a field type from the registry onto the canvas.
    /// Returns `None` for an unknown field type.
    pub fn add_field(&mut self, field_id: &str, position: Position) -> Option<LayoutElement> {
        let prepared = self.registry.create_element(field_id, position)?;
        let element = self.document.insert(prepared);
        self.record(EditorEvent::ElementAdded {
            id: element.id.clone(),
        });
        Some(element)
    }

    /// Returns `true` if the document changed (and a snapshot was recorded).
    pub fn update_property(&mut self, id: &str, property: ElementProperty) -> bool {
        let changed = self.document.update_property(id, property);
        if changed {
            self.record(EditorEvent::ElementUpdated { id: id.to_string() });
        }
        changed
    }

    /// Returns `true` if the document changed (and a snapshot was recorded).
    pub fn update_style(&mut self, id: &str, property: StyleProperty) -> bool {
        let changed = self.document.update_style(id, property);
        if changed {
            self.record(EditorEvent::ElementUpdated { id: id.to_string() });
        }
        changed
    }

    pub fn remove_element(&mut self, id: &str) -> Option<LayoutElement> {
        let removed = self.document.remove_element(id)?;
        self.record(EditorEvent::ElementRemoved {
            id: removed.id.clone(),
        });
        Some(removed)
    }

    // ========================================================================
    // HISTORY
    // ========================================================================

    /// Restore the previous snapshot. Returns `false` at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.document = snapshot.clone();
        let cursor = self.history.cursor();
        self.emit(EditorEvent::Restored { cursor });
        true
    }

    /// Re-apply the next snapshot. Returns `false` at the end of history.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.document = snapshot.clone();
        let cursor = self.history.cursor();
        self.emit(EditorEvent::Restored { cursor });
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Package the current layout as a template.
    pub fn to_template(
        &self,
        name: impl Into<String>,
        size_preset: SizePreset,
        orientation: Orientation,
    ) -> LabelTemplate {
        LabelTemplate::new(name, size_preset, orientation, self.document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Size;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_add_undo_redo_restores_same_element() {
        let mut editor = LabelEditor::default();
        let el = editor.add_element(ElementKind::Text, Position::new(10.0, 10.0));

        assert!(editor.undo());
        assert_eq!(editor.document().len(), 0);

        assert!(editor.redo());
        let restored = editor.document().element(&el.id).unwrap();
        assert_eq!(restored.position, Position::new(10.0, 10.0));
        assert_eq!(restored.size, Size::new(120.0, 30.0));
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut editor = LabelEditor::default();
        assert!(!editor.undo());
        assert!(!editor.redo());
    }

    #[test]
    fn test_noop_update_records_nothing() {
        let mut editor = LabelEditor::default();
        editor.add_element(ElementKind::Text, Position::default());
        let len = editor.history().len();
        assert!(!editor.update_property("missing", ElementProperty::Layer(3)));
        assert!(editor.remove_element("missing").is_none());
        assert_eq!(editor.history().len(), len);
    }

    #[test]
    fn test_edit_after_undo_discards_redo() {
        let mut editor = LabelEditor::default();
        let a = editor.add_element(ElementKind::Text, Position::default());
        editor.add_element(ElementKind::Qr, Position::default());
        editor.undo();
        assert!(editor.can_redo());
        editor.update_property(&a.id, ElementProperty::Content("new".into()));
        assert!(!editor.can_redo());
        assert_eq!(editor.document().len(), 1);
    }

    #[test]
    fn test_add_field_binds_element() {
        let mut editor = LabelEditor::default();
        let el = editor
            .add_field("tracking_qr", Position::new(20.0, 20.0))
            .unwrap();
        assert_eq!(el.kind, ElementKind::Qr);
        assert!(editor.add_field("unknown", Position::default()).is_none());
        assert_eq!(editor.document().len(), 1);
    }

    #[test]
    fn test_observers_receive_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut editor = LabelEditor::default();
        let sub = editor.subscribe(move |event, doc| {
            sink.lock().unwrap().push((event.clone(), doc.len()));
        });

        let el = editor.add_element(ElementKind::Shape, Position::default());
        editor.update_style(&el.id, StyleProperty::Padding(Some(4.0)));
        editor.undo();
        assert!(editor.unsubscribe(sub));
        editor.remove_element(&el.id);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (EditorEvent::ElementAdded { id: el.id.clone() }, 1),
                (EditorEvent::ElementUpdated { id: el.id.clone() }, 1),
                (EditorEvent::Restored { cursor: 1 }, 1),
            ]
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let mut editor = LabelEditor::default();
        for n in 0..DEFAULT_HISTORY_LIMIT + 25 {
            editor.add_element(ElementKind::Text, Position::new(n as f32, 0.0));
        }
        assert_eq!(editor.history().len(), DEFAULT_HISTORY_LIMIT);

        let mut undos = 0;
        while editor.undo() {
            undos += 1;
        }
        assert_eq!(undos, DEFAULT_HISTORY_LIMIT - 1);
        assert_eq!(editor.document().len(), 25);
    }
}
