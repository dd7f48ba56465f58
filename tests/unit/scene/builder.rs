use std::rc::Rc;

use serde_json::json;

use super::*;
use crate::foundation::clock::ManualClock;
use crate::memory::manager::MemoryManager;
use crate::memory::pool::PoolOpts;
use crate::scene::drawable::PrimitiveKind;
use crate::scene::factory::IdAllocator;

struct Harness {
    memory: MemoryManager,
    ids: IdAllocator,
    canvas: Canvas,
    builder: SceneBuilder,
    grid: GridEngine,
}

impl Harness {
    fn new() -> Self {
        Self {
            memory: MemoryManager::new(Rc::new(ManualClock::new(0.0))),
            ids: IdAllocator::new(),
            canvas: Canvas::new(1200.0, 800.0),
            builder: SceneBuilder::default(),
            grid: GridEngine::default(),
        }
    }

    fn render(&mut self, doc: &WireframeDocument, opts: RenderOptions) -> RenderReport {
        let mut f = NodeFactory::new(&mut self.memory, &mut self.ids);
        self.builder
            .render(&mut self.canvas, doc, &opts, &mut f, &self.grid)
    }
}

fn doc(v: serde_json::Value) -> WireframeDocument {
    WireframeDocument::from_value(v).unwrap()
}

fn landing() -> WireframeDocument {
    doc(json!({
        "id": "landing",
        "sections": [
            {
                "id": "hero",
                "name": "Hero",
                "sectionType": "hero",
                "components": [
                    { "id": "h1", "type": "heading", "content": "Build faster" },
                    { "id": "cta", "type": "button", "content": "Sign Up" }
                ]
            },
            {
                "id": "features",
                "name": "Features",
                "sectionType": "features",
                "layoutType": "grid",
                "components": [
                    { "id": "f1", "type": "card", "content": { "title": "Fast" } },
                    { "id": "f2", "type": "card", "content": { "title": "Safe" } },
                    { "id": "f3", "type": "card", "content": { "title": "Small" } }
                ]
            },
            {
                "id": "footer",
                "sectionType": "footer",
                "layoutType": "horizontal",
                "components": [
                    { "id": "l1", "type": "link", "content": "Privacy" },
                    { "id": "l2", "type": "link", "content": "Terms" }
                ]
            }
        ]
    }))
}

fn section_roots(c: &Canvas) -> usize {
    c.content()
        .iter()
        .filter(|d| d.role == NodeRole::SectionRoot && d.kind == PrimitiveKind::Group)
        .count()
}

#[test]
fn one_root_group_per_section() {
    let mut h = Harness::new();
    let report = h.render(&landing(), RenderOptions::default());
    assert_eq!(report.sections_rendered, 3);
    assert!(report.is_clean());
    assert_eq!(h.canvas.content().len(), 3);
    assert_eq!(section_roots(&h.canvas), 3);
    assert_eq!(h.memory.object_count(), h.canvas.node_count());
}

#[test]
fn hero_button_scenario() {
    let mut h = Harness::new();
    let d = doc(json!({
        "id": "d",
        "sections": [{
            "id": "hero",
            "sectionType": "hero",
            "components": [{ "id": "b", "type": "button", "content": "Sign Up" }]
        }]
    }));
    h.render(&d, RenderOptions::default());
    let section = &h.canvas.content()[0];
    assert_eq!(section.role, NodeRole::SectionRoot);
    assert!(section.find_role(NodeRole::SectionBackground).is_some());
    assert!(section.find_role(NodeRole::SectionTitle).is_some());
    assert!(section.find_role(NodeRole::SectionTypeLabel).is_some());
    let comp = section.find_role(NodeRole::ComponentRoot).unwrap();
    assert_eq!(comp.owner, "b");
    assert!(comp.children.iter().any(|d| d.kind == PrimitiveKind::Rect));
    assert!(
        comp.children
            .iter()
            .any(|d| d.kind == PrimitiveKind::Text && d.text == "Sign Up")
    );
}

#[test]
fn malformed_sections_become_placeholders() {
    let mut h = Harness::new();
    let d = doc(json!({
        "sections": [
            { "id": "ok", "components": [{ "type": "text", "content": "hi" }] },
            { "name": "missing id" },
            { "id": "bad-pad", "style": { "padding": -4 } },
            { "id": "no-type", "components": [{ "id": "x" }] },
            "not even an object"
        ]
    }));
    let report = h.render(&d, RenderOptions::default());
    assert_eq!(report.sections_rendered, 5);
    assert_eq!(section_roots(&h.canvas), 5);
    let bad: Vec<usize> = report.per_section_errors.iter().map(|e| e.index).collect();
    assert_eq!(bad, vec![1, 2, 3, 4]);
    assert!(
        report
            .per_section_errors
            .iter()
            .all(|e| e.kind == SectionErrorKind::Malformed)
    );
    assert_eq!(report.per_section_errors[1].section_id.as_deref(), Some("bad-pad"));
    let placeholders = h
        .canvas
        .content()
        .iter()
        .filter(|d| d.find_role(NodeRole::Placeholder).is_some())
        .count();
    assert_eq!(placeholders, 4);
}

#[test]
fn render_is_idempotent() {
    let mut h = Harness::new();
    let d = landing();
    h.render(&d, RenderOptions::default());
    let first = h.canvas.fingerprint();
    let count = h.memory.object_count();
    let report = h.render(&d, RenderOptions::default());
    assert_eq!(h.canvas.fingerprint(), first);
    assert_eq!(h.memory.object_count(), count);
    assert_eq!(report.retired, count);
}

#[test]
fn rerender_reuses_pooled_drawables() {
    let mut h = Harness::new();
    for kind in PrimitiveKind::ALL {
        h.memory.initialize_pool(kind, PoolOpts::default());
    }
    let d = landing();
    let first = h.render(&d, RenderOptions::default());
    assert_eq!(first.drawables_reused, 0);
    let second = h.render(&d, RenderOptions::default());
    assert_eq!(second.drawables_created, first.drawables_created);
    assert_eq!(second.drawables_reused, second.drawables_created);
}

#[test]
fn explicit_y_sorts_first_and_auto_flow_stacks() {
    let mut h = Harness::new();
    let d = doc(json!({
        "sections": [
            { "id": "a" },
            { "id": "b", "position": { "x": 0, "y": 2000 } },
            { "id": "c" }
        ]
    }));
    h.render(&d, RenderOptions::default());
    let owners: Vec<&str> = h.canvas.content().iter().map(|d| d.owner.as_str()).collect();
    assert_eq!(owners, vec!["b", "a", "c"]);
    let a = h.canvas.content()[1].geometry;
    let c = h.canvas.content()[2].geometry;
    assert_eq!(a.top, 2000.0 + h.canvas.content()[0].geometry.height + SECTION_GAP);
    assert_eq!(c.top, a.bottom() + SECTION_GAP);
    assert!(h.canvas.height >= c.bottom());
}

#[test]
fn mobile_breakpoint_narrows_sections() {
    let mut h = Harness::new();
    let opts = RenderOptions {
        device_type: DeviceType::Mobile,
        ..RenderOptions::default()
    };
    h.render(&landing(), opts);
    for s in h.canvas.content() {
        assert_eq!(s.geometry.width, 375.0 - 2.0 * SECTION_MARGIN);
        assert_eq!(s.geometry.left, (1200.0 - 375.0) / 2.0 + SECTION_MARGIN);
    }
}

#[test]
fn unknown_kinds_are_reported_once() {
    let mut h = Harness::new();
    let d = doc(json!({
        "sections": [{
            "id": "s",
            "components": [
                { "type": "carousel" },
                { "type": "carousel" },
                { "type": "map" }
            ]
        }]
    }));
    let report = h.render(&d, RenderOptions::default());
    assert_eq!(report.unknown_kinds, vec!["carousel", "map"]);
    assert!(report.is_clean());
}

#[test]
fn grid_follows_render_option() {
    let mut h = Harness::new();
    let with_grid = RenderOptions {
        render_grid: true,
        ..RenderOptions::default()
    };
    let report = h.render(&landing(), with_grid);
    assert!(report.grid_nodes > 0);
    assert_eq!(h.canvas.grid().len(), report.grid_nodes);
    h.render(&landing(), RenderOptions::default());
    assert!(h.canvas.grid().is_empty());
    assert_eq!(h.memory.object_count(), h.canvas.node_count());
}

#[test]
fn empty_document_renders_nothing() {
    let mut h = Harness::new();
    let report = h.render(&doc(json!({})), RenderOptions::default());
    assert_eq!(report.sections_rendered, 0);
    assert!(h.canvas.content().is_empty());
    assert_eq!(h.memory.object_count(), 0);
}

#[test]
fn dark_mode_changes_canvas_background() {
    let mut h = Harness::new();
    h.render(&landing(), RenderOptions::default());
    let light = h.canvas.background;
    h.render(
        &landing(),
        RenderOptions {
            dark_mode: true,
            ..RenderOptions::default()
        },
    );
    assert_ne!(h.canvas.background, light);
}
