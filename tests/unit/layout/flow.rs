use super::*;
use serde_json::json;

fn section(v: serde_json::Value) -> Section {
    serde_json::from_value(v).unwrap()
}

fn kinds(s: &Section) -> Vec<ComponentKind> {
    s.components
        .iter()
        .map(|c| ComponentKind::from_tag(&c.kind))
        .collect()
}

#[test]
fn working_width_is_clamped_by_breakpoint() {
    let f = SectionFlow::new(1200.0, DeviceType::Mobile);
    assert_eq!(f.working_width(), 375.0);
    assert_eq!(f.section_width(None), 335.0);
    let f = SectionFlow::new(1200.0, DeviceType::Desktop);
    assert_eq!(f.working_width(), 1200.0);
    assert_eq!("Tablet".parse::<DeviceType>().unwrap().breakpoint(), 768.0);
    assert!("watch".parse::<DeviceType>().is_err());
}

#[test]
fn sections_sort_by_y_then_order_then_index() {
    let doc = crate::document::model::WireframeDocument::from_value(json!({
        "sections": [
            { "id": "a" },
            { "id": "b", "order": 2 },
            { "id": "c", "position": { "x": 0, "y": 500 } },
            { "id": "d", "order": 1 },
            { "id": "e", "position": { "x": 0, "y": 100 } },
            { "id": "f" }
        ]
    }))
    .unwrap();
    let ids: Vec<&str> = section_order(&doc.sections)
        .into_iter()
        .map(|i| doc.sections[i].id().unwrap())
        .collect();
    assert_eq!(ids, vec!["e", "c", "d", "b", "a", "f"]);
}

#[test]
fn auto_flow_stacks_sections_with_gap() {
    let mut f = SectionFlow::new(800.0, DeviceType::Desktop);
    let a = f.place(None, 760.0, 200.0);
    let b = f.place(None, 760.0, 100.0);
    assert_eq!((a.left, a.top), (SECTION_MARGIN, SECTION_MARGIN));
    assert_eq!(b.top, a.bottom() + SECTION_GAP);
    let pinned = f.place(Some(Position { x: 5.0, y: 1000.0 }), 100.0, 50.0);
    assert_eq!((pinned.left, pinned.top), (5.0, 1000.0));
    assert_eq!(f.cursor(), 1050.0 + SECTION_GAP);
}

#[test]
fn vertical_layout_advances_by_height_and_gap() {
    let s = section(json!({
        "id": "s",
        "components": [
            { "type": "button", "content": "Go" },
            { "type": "divider" },
            { "type": "image" }
        ]
    }));
    let g = layout_components(&s, &kinds(&s), 400.0, &TypeScale::default());
    assert_eq!(g.len(), 3);
    assert_eq!(g[0].top, HEADER_HEIGHT);
    assert_eq!((g[0].width, g[0].height), (120.0, 40.0));
    assert_eq!(g[1].top, HEADER_HEIGHT + 40.0 + DEFAULT_GAP);
    assert_eq!(g[2].top, g[1].bottom() + DEFAULT_GAP);
    assert!(g.iter().all(|g| g.left == DEFAULT_PADDING));
    assert_eq!(section_height(&s, &g), g[2].bottom() + DEFAULT_PADDING);
}

#[test]
fn horizontal_layout_advances_by_width_and_gap() {
    let s = section(json!({
        "id": "s",
        "layoutType": "horizontal",
        "style": { "gap": 10, "padding": 0 },
        "components": [
            { "type": "icon" },
            { "type": "avatar" },
            { "type": "icon" }
        ]
    }));
    let g = layout_components(&s, &kinds(&s), 600.0, &TypeScale::default());
    assert_eq!(g[0].left, 0.0);
    assert_eq!(g[1].left, 42.0);
    assert_eq!(g[2].left, 100.0);
    assert!(g.iter().all(|g| g.top == HEADER_HEIGHT));
}

#[test]
fn grid_layout_is_row_major_with_cell_formula() {
    let s = section(json!({
        "id": "s",
        "layoutType": "grid",
        "style": { "columns": 2, "gap": 20 },
        "components": [
            { "type": "card" },
            { "type": "card" },
            { "type": "card", "dimensions": { "height": 50 } }
        ]
    }));
    let g = layout_components(&s, &kinds(&s), 500.0, &TypeScale::default());
    let cell = (500.0 - 3.0 * 20.0) / 2.0;
    assert_eq!(g[0], Geometry::new(20.0, HEADER_HEIGHT, cell, 180.0));
    assert_eq!(g[1], Geometry::new(20.0 + cell + 20.0, HEADER_HEIGHT, cell, 180.0));
    assert_eq!(g[2], Geometry::new(20.0, HEADER_HEIGHT + 180.0 + 20.0, cell, 50.0));
}

#[test]
fn explicit_geometry_overrides_flow() {
    let s = section(json!({
        "id": "s",
        "components": [
            {
                "type": "text",
                "position": { "x": 300, "y": 10 },
                "dimensions": { "width": 50, "height": 20 }
            },
            { "type": "button" }
        ]
    }));
    let g = layout_components(&s, &kinds(&s), 400.0, &TypeScale::default());
    assert_eq!(g[0], Geometry::new(300.0, 10.0, 50.0, 20.0));
    assert_eq!(g[1].top, HEADER_HEIGHT);
}

#[test]
fn short_sections_use_type_minimum_height() {
    let hero = section(json!({ "id": "h", "sectionType": "hero" }));
    assert_eq!(section_height(&hero, &[]), 320.0);
    let pinned = section(json!({ "id": "p", "dimensions": { "height": 42 } }));
    assert_eq!(section_height(&pinned, &[]), 42.0);
}

#[test]
fn form_fields_prefer_props() {
    let s = section(json!({
        "id": "s",
        "components": [
            { "type": "form", "props": { "fields": ["Email", { "label": "Password" }] } },
            { "type": "form" }
        ]
    }));
    assert_eq!(form_fields(&s.components[0]), vec!["Email", "Password"]);
    assert_eq!(form_fields(&s.components[1]).len(), 3);
}

#[test]
fn out_of_range_columns_are_rejected_and_clamped() {
    let s = section(json!({
        "id": "wide",
        "layoutType": "grid",
        "style": { "columns": 4294967295u32 },
        "components": [ { "type": "card" }, { "type": "card" } ]
    }));
    assert!(s.validate().is_err());

    let g = layout_components(&s, &kinds(&s), 500.0, &TypeScale::default());
    assert_eq!(g.len(), 2);
    assert!(g.iter().all(|r| r.is_finite() && r.width >= 0.0));
    assert_eq!(g[1].top, g[0].top);

    let zero = section(json!({
        "id": "none",
        "layoutType": "grid",
        "style": { "columns": 0 },
        "components": [ { "type": "card" } ]
    }));
    assert!(zero.validate().is_err());
}
