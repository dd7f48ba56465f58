use super::*;

#[test]
fn hex_colours_parse_in_all_widths() {
    assert_eq!(Rgba8::parse("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(
        Rgba8::parse("#1e293b").unwrap(),
        Rgba8::rgb(0x1e, 0x29, 0x3b)
    );
    assert_eq!(
        Rgba8::parse("#11223380").unwrap(),
        Rgba8::rgba(0x11, 0x22, 0x33, 0x80)
    );
    assert!(Rgba8::parse("#12345").is_err());
    assert!(Rgba8::parse("#gggggg").is_err());
}

#[test]
fn rgb_functions_and_names_parse() {
    assert_eq!(
        Rgba8::parse("rgb(10, 20, 30)").unwrap(),
        Rgba8::rgb(10, 20, 30)
    );
    assert_eq!(
        Rgba8::parse("rgba(10,20,30,0.5)").unwrap(),
        Rgba8::rgba(10, 20, 30, 128)
    );
    assert_eq!(Rgba8::parse("Transparent").unwrap(), Rgba8::TRANSPARENT);
    assert!(Rgba8::parse("chartreuse-ish").is_err());
}

#[test]
fn colour_serializes_as_hex_string() {
    let s = serde_json::to_string(&Rgba8::rgb(1, 2, 3)).unwrap();
    assert_eq!(s, "\"#010203ff\"");
    let back: Rgba8 = serde_json::from_str(&s).unwrap();
    assert_eq!(back, Rgba8::rgb(1, 2, 3));
}

#[test]
fn premul_keeps_opaque_channels() {
    assert_eq!(Rgba8::rgb(200, 100, 50).to_premul(), [200, 100, 50, 255]);
    assert_eq!(Rgba8::TRANSPARENT.to_premul(), [0, 0, 0, 0]);
}

#[test]
fn local_transform_applies_translation_then_rotation() {
    let g = Geometry {
        left: 10.0,
        top: 20.0,
        width: 5.0,
        height: 5.0,
        rotation: 90.0,
    };
    let p = g.local_transform() * Point::new(1.0, 0.0);
    assert!((p.x - 10.0).abs() < 1e-9);
    assert!((p.y - 21.0).abs() < 1e-9);
}

#[test]
fn non_finite_geometry_is_detected() {
    let mut g = Geometry::sized(10.0, 10.0);
    assert!(g.is_finite());
    g.width = f64::NAN;
    assert!(!g.is_finite());
}
