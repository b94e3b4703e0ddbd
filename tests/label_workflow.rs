//! # Label Workflow Tests
//!
//! End-to-end checks through the public API: editing with undo/redo, saving
//! and loading templates, bulk import/validation/generation and print output.

use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

use pulselabel::binding::{BindingKey, DataContext, FieldBindingRegistry};
use pulselabel::bulk::{self, BulkGenerator, FieldRule, JobStatus, Validator};
use pulselabel::editor::{EditorEvent, LabelEditor};
use pulselabel::history::HistoryStack;
use pulselabel::layout::{
    ElementKind, ElementProperty, FontWeight, LayoutDocument, Position, Size, StyleProperty,
};
use pulselabel::printer::{CutMode, PrinterConfig, print_job_bytes};
use pulselabel::render;
use pulselabel::store::{FsTemplateStore, JobStore, MemoryJobStore, TemplateStore};
use pulselabel::template::{LabelTemplate, Orientation, SizePreset};

// ============================================================================
// EDITING
// ============================================================================

#[test]
fn add_undo_redo_restores_element() {
    let mut editor = LabelEditor::new(LayoutDocument::new(Size::new(384.0, 576.0)));
    let el = editor.add_element(ElementKind::Text, Position::new(10.0, 10.0));
    assert_eq!(el.size, Size::new(120.0, 30.0));

    assert!(editor.undo());
    assert_eq!(editor.document().len(), 0);

    assert!(editor.redo());
    let restored = editor.document().element(&el.id).cloned();
    assert_eq!(restored, Some(el));
}

#[test]
fn edit_after_undo_discards_redo_branch() {
    let mut editor = LabelEditor::new(LayoutDocument::default());
    let a = editor.add_element(ElementKind::Text, Position::new(0.0, 0.0));
    editor.add_element(ElementKind::Shape, Position::new(50.0, 50.0));
    editor.add_element(ElementKind::Qr, Position::new(100.0, 100.0));

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.can_redo());

    editor.update_property(&a.id, ElementProperty::Content("Fragile".into()));
    assert!(!editor.can_redo());
    assert_eq!(editor.document().len(), 1);
    assert_eq!(editor.document().elements()[0].content, "Fragile");
}

#[test]
fn undo_then_redo_restores_each_mixed_edit() {
    let mut editor = LabelEditor::new(LayoutDocument::new(Size::new(400.0, 300.0)));
    let a = editor.add_element(ElementKind::Text, Position::new(10.0, 10.0)).id;
    let b = editor.add_element(ElementKind::Barcode, Position::new(10.0, 60.0)).id;
    let c = editor.add_element(ElementKind::Shape, Position::new(200.0, 10.0)).id;

    type Edit = Box<dyn Fn(&mut LabelEditor)>;
    let edits: Vec<Edit> = vec![
        Box::new({
            let a = a.clone();
            move |e: &mut LabelEditor| {
                e.update_property(&a, ElementProperty::Layer(-1));
            }
        }),
        Box::new({
            let b = b.clone();
            move |e: &mut LabelEditor| {
                e.update_style(&b, StyleProperty::FontWeight(Some(FontWeight::Bold)));
            }
        }),
        Box::new({
            let c = c.clone();
            move |e: &mut LabelEditor| {
                e.update_property(&c, ElementProperty::Size(Size::new(50.0, 20.0)));
            }
        }),
        Box::new({
            let b = b.clone();
            move |e: &mut LabelEditor| {
                e.remove_element(&b);
            }
        }),
        Box::new(|e: &mut LabelEditor| {
            e.add_element(ElementKind::Qr, Position::new(300.0, 200.0));
        }),
        Box::new({
            let c = c.clone();
            move |e: &mut LabelEditor| {
                e.update_property(&c, ElementProperty::Layer(10));
            }
        }),
    ];

    let mut states = vec![editor.document().clone()];
    for edit in &edits {
        edit(&mut editor);
        let before_undo = editor.document().clone();
        assert!(editor.undo());
        assert_ne!(editor.document(), &before_undo);
        assert!(editor.redo());
        assert_eq!(editor.document(), &before_undo);
        states.push(before_undo);
    }
    assert_eq!(editor.document().elements()[0].id, a);

    // Unwind to the first state, then replay every step.
    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo());
        assert_eq!(editor.document(), expected);
    }
    for expected in states.iter().skip(1) {
        assert!(editor.redo());
        assert_eq!(editor.document(), expected);
    }
    assert!(!editor.can_redo());
}

#[test]
fn history_stack_branching() {
    let mut history = HistoryStack::new();
    for n in 0..5 {
        history.push(n);
    }
    history.undo();
    history.undo();
    history.push(10);

    assert_eq!(history.len(), 4);
    assert_eq!(history.current(), Some(&10));
    assert_eq!(history.redo(), None);
    assert_eq!(history.undo(), Some(&2));
}

#[test]
fn observers_see_every_change() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let mut editor = LabelEditor::new(LayoutDocument::default());
    editor.subscribe(move |event, doc| {
        let tag = match event {
            EditorEvent::ElementAdded { .. } => "added",
            EditorEvent::ElementUpdated { .. } => "updated",
            EditorEvent::ElementRemoved { .. } => "removed",
            EditorEvent::Restored { .. } => "restored",
        };
        sink.lock().unwrap().push((tag, doc.len()));
    });

    let el = editor.add_element(ElementKind::Barcode, Position::new(5.0, 5.0));
    editor.update_property(&el.id, ElementProperty::Position(Position::new(20.0, 20.0)));
    editor.remove_element(&el.id);
    editor.undo();

    assert_eq!(
        *events.lock().unwrap(),
        vec![("added", 1), ("updated", 1), ("removed", 0), ("restored", 1)]
    );
}

// ============================================================================
// BINDINGS
// ============================================================================

#[test]
fn resolve_is_idempotent_and_prefers_context() {
    let registry = FieldBindingRegistry::builtin();
    let ctx = DataContext::new().with("receiver", "Ada Nkem");

    let first = registry.resolve("receiver", "receiver", &ctx);
    let second = registry.resolve("receiver", "receiver", &ctx);
    assert_eq!(first, "Ada Nkem");
    assert_eq!(first, second);

    let placeholder = registry.resolve("status", "status", &DataContext::new());
    assert_eq!(placeholder, BindingKey::Status.placeholder());
}

// ============================================================================
// TEMPLATES
// ============================================================================

#[test]
fn template_survives_filesystem_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FsTemplateStore::open(dir.path()).unwrap();

    let mut editor = LabelEditor::new(LayoutDocument::default());
    editor.add_field("receiver", Position::new(10.0, 10.0)).unwrap();
    editor.add_field("tracking_qr", Position::new(200.0, 10.0)).unwrap();
    let template = editor.to_template("Douala Express", SizePreset::FourBySix, Orientation::Landscape);
    store.save(&template).unwrap();

    let loaded = store.require("douala express").unwrap();
    assert_eq!(loaded.layout, template.layout);
    assert_eq!(loaded.layout.canvas_size(), Size::new(576.0, 384.0));
    assert_eq!(store.list().unwrap()[0].element_count, 2);

    let reopened = LabelEditor::from_template(&loaded);
    assert!(!reopened.can_undo());
    assert_eq!(reopened.document(), &template.layout);
}

// ============================================================================
// BULK
// ============================================================================

#[test]
fn csv_with_missing_tracking_flags_only_that_row() {
    let csv = "name,address,tracking\n\"A\",\"B\",\"\"\nC,D,T-2\n,,T-3\n";
    let records = bulk::import_csv(csv.as_bytes()).unwrap();
    let validator = Validator::new(vec![FieldRule::new("tracking").required()]).unwrap();

    let report = validator.validate(records);
    assert_eq!(report.invalid.len(), 1);
    assert_eq!(report.invalid[0].record.index, 0);
    assert_eq!(report.invalid[0].errors, vec!["tracking is required".to_string()]);
    assert_eq!(report.valid.len(), 2);
}

#[test]
fn bulk_generation_records_job_and_exports() {
    let registry = FieldBindingRegistry::builtin();
    let mut doc = LayoutDocument::new(Size::new(400.0, 200.0));
    doc.insert(registry.create_element("receiver", Position::new(0.0, 0.0)).unwrap());
    doc.insert(registry.create_element("tracking_barcode", Position::new(0.0, 60.0)).unwrap());
    let template = LabelTemplate::new("bulk", SizePreset::Custom, Orientation::Portrait, doc);

    let records = bulk::import_json(
        r#"[
            {"receiver": "Ada", "trackingNumber": "CM-001"},
            {"receiver": "Bih", "trackingNumber": "CM-002"},
            {"receiver": "Che", "trackingNumber": "CM-003"}
        ]"#,
    )
    .unwrap();

    let mut last = None;
    let output = BulkGenerator::new(registry).generate(&template, &records, |p| last = Some(p));
    assert_eq!(output.labels.len(), 3);
    assert_eq!(output.job.status, JobStatus::Completed);
    assert_eq!(last.map(|p| (p.completed, p.total)), Some((3, 3)));

    let jobs = MemoryJobStore::new();
    jobs.record(output.job.clone()).unwrap();
    let mut csv = Vec::new();
    bulk::export_jobs_csv(&jobs.jobs().unwrap(), &mut csv).unwrap();
    let text = String::from_utf8(csv).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "job_id,template,total,generated,failed,status,started_at,finished_at"
    );
}

// ============================================================================
// PRINTING
// ============================================================================

#[test]
fn preset_label_prints_at_printer_width() {
    let mut editor = LabelEditor::new(LayoutDocument::default());
    editor.add_field("tracking_barcode", Position::new(20.0, 20.0)).unwrap();
    let template = editor.to_template("a6", SizePreset::A6, Orientation::Portrait);

    let config = PrinterConfig::TSP650II;
    let raster = render::render_label_fit(
        &template.layout,
        &DataContext::new(),
        &FieldBindingRegistry::builtin(),
        config.width_dots as usize,
    )
    .unwrap();
    // A6 at 96 dpi is 397 px wide, narrower than the printer.
    assert_eq!(raster.width, 397);

    let bytes = print_job_bytes(&raster, &config, CutMode::Full).unwrap();
    assert_eq!(&bytes[..2], &[0x1B, 0x40]);
    assert_eq!(&bytes[bytes.len() - 3..], &[0x1B, b'd', 2]);
}
