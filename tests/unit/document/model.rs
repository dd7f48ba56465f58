use super::*;
use serde_json::json;

fn doc_json() -> serde_json::Value {
    json!({
        "id": "doc-1",
        "colorScheme": { "primary": "#2563eb", "background": "#ffffff" },
        "sections": [
            {
                "id": "hero",
                "name": "Hero",
                "sectionType": "hero",
                "layoutType": "horizontal",
                "components": [
                    { "id": "cta", "type": "button", "content": "Sign Up" }
                ]
            },
            { "name": "no id and bad components", "components": 7 },
            "not even an object",
            {
                "id": "features",
                "layoutType": "masonry",
                "style": { "gridColumns": 4 },
                "components": []
            }
        ]
    })
}

#[test]
fn malformed_sections_are_kept_as_slots() {
    let doc = WireframeDocument::from_value(doc_json()).unwrap();
    assert_eq!(doc.section_count(), 4);
    assert!(doc.sections[0].as_section().is_some());
    assert!(matches!(doc.sections[1], SectionEntry::Malformed(_)));
    assert!(matches!(doc.sections[2], SectionEntry::Malformed(_)));
    assert_eq!(doc.sections[1].name(), Some("no id and bad components"));
    assert!(doc.sections[1].malformed_reason().is_some());
    assert!(doc.sections[0].malformed_reason().is_none());
}

#[test]
fn unknown_layout_falls_back_to_vertical() {
    let doc = WireframeDocument::from_value(doc_json()).unwrap();
    let s = doc.sections[3].as_section().unwrap();
    assert_eq!(s.layout_type, LayoutType::Vertical);
    assert_eq!(s.style.columns, Some(4));
    let hero = doc.sections[0].as_section().unwrap();
    assert_eq!(hero.layout_type, LayoutType::Horizontal);
}

#[test]
fn non_object_document_is_malformed() {
    let err = WireframeDocument::from_json_str("[1, 2, 3]").unwrap_err();
    assert!(matches!(err, SceneError::MalformedDocument(_)));
    let err = WireframeDocument::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, SceneError::MalformedDocument(_)));
    let err = WireframeDocument::from_value(json!({ "sections": "nope" })).unwrap_err();
    assert!(matches!(err, SceneError::MalformedDocument(_)));
}

#[test]
fn empty_document_defaults() {
    let doc = WireframeDocument::from_json_str("{}").unwrap();
    assert!(doc.sections.is_empty());
    assert!(doc.color_scheme.primary.is_none());
    assert!(doc.section_problems().is_empty());
}

#[test]
fn content_text_handles_shapes() {
    let mut c: Component = serde_json::from_value(json!({ "type": "text" })).unwrap();
    assert_eq!(c.content_text(), "");
    c.content = json!({ "label": "Go" });
    assert_eq!(c.content_text(), "Go");
    c.content = json!(["a", "b"]);
    assert_eq!(c.content_text(), "a b");
    assert_eq!(c.list_items(), vec!["a".to_string(), "b".to_string()]);
    c.content = json!("one\n\ntwo");
    assert_eq!(c.list_items(), vec!["one".to_string(), "two".to_string()]);
}

#[test]
fn list_items_fall_back_to_props() {
    let c: Component = serde_json::from_value(json!({
        "type": "list",
        "props": { "items": ["x", "y", "z"] }
    }))
    .unwrap();
    assert_eq!(c.list_items().len(), 3);
}

#[test]
fn validation_catches_bad_geometry() {
    let mut doc = WireframeDocument::from_value(doc_json()).unwrap();
    let SectionEntry::Valid(s) = &mut doc.sections[0] else {
        panic!("expected valid section");
    };
    s.dimensions = Some(Dimensions {
        width: Some(-5.0),
        height: None,
    });
    assert!(s.validate().is_err());
    s.dimensions = None;
    s.components[0].kind = "  ".to_string();
    assert!(s.validate().is_err());

    let problems = doc.section_problems();
    let indices: Vec<usize> = problems.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
