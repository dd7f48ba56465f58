use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn zoom_at_keeps_anchor_fixed_and_round_trips() {
    let mut v = Viewport::new(800.0, 600.0);
    v.pan_by(37.0, -12.0);
    let anchor = Point::new(250.0, 410.0);
    let world = v.screen_to_world(anchor);
    let (zoom0, pan0) = (v.zoom(), v.pan());

    assert!(v.zoom_at(1.7, anchor));
    let s = v.world_to_screen(world);
    assert!(close(s.x, anchor.x) && close(s.y, anchor.y));

    assert!(v.zoom_at(1.0 / 1.7, anchor));
    assert!(close(v.zoom(), zoom0));
    assert!(close(v.pan().x, pan0.x) && close(v.pan().y, pan0.y));
    let s = v.world_to_screen(world);
    assert!(close(s.x, anchor.x) && close(s.y, anchor.y));
}

#[test]
fn step_zoom_scenario() {
    let mut v = Viewport::new(800.0, 600.0);
    for _ in 0..3 {
        v.zoom_in(DEFAULT_ZOOM_STEP);
    }
    v.zoom_out(DEFAULT_ZOOM_STEP);
    assert!(close(v.zoom(), 1.2));
}

#[test]
fn zoom_is_clamped() {
    let mut v = Viewport::new(100.0, 100.0);
    v.zoom_at(1000.0, Point::ORIGIN);
    assert_eq!(v.zoom(), MAX_ZOOM);
    assert!(!v.zoom_at(2.0, Point::ORIGIN));
    v.zoom_at(1e-6, Point::ORIGIN);
    assert_eq!(v.zoom(), MIN_ZOOM);
    assert!(!v.zoom_at(0.0, Point::ORIGIN));
    assert!(!v.zoom_at(f64::NAN, Point::ORIGIN));
    assert_eq!(v.zoom(), MIN_ZOOM);
}

#[test]
fn pan_is_additive_and_reset_restores_identity() {
    let mut v = Viewport::new(100.0, 100.0);
    v.pan_by(10.0, 5.0);
    v.pan_by(-3.0, 1e6);
    assert_eq!(v.pan(), Vec2::new(7.0, 1_000_005.0));
    v.zoom_at(2.0, Point::new(3.0, 4.0));
    v.set_rotation(30.0);
    assert!(v.reset());
    assert_eq!(v.zoom(), 1.0);
    assert_eq!(v.pan(), Vec2::ZERO);
    assert_eq!(v.rotation(), 0.0);
    assert!(!v.reset());
    assert_eq!(v.affine(), Affine::IDENTITY);
}

#[test]
fn rotation_is_part_of_the_transform() {
    let mut v = Viewport::new(100.0, 100.0);
    v.set_rotation(450.0);
    assert_eq!(v.rotation(), 90.0);
    let s = v.world_to_screen(Point::new(10.0, 0.0));
    assert!(close(s.x, 0.0) && close(s.y, 10.0));
    let w = v.screen_to_world(s);
    assert!(close(w.x, 10.0) && close(w.y, 0.0));
}

#[test]
fn visible_rect_shrinks_when_zoomed_in() {
    let mut v = Viewport::new(800.0, 600.0);
    assert_eq!(v.visible_world_rect(), Rect::new(0.0, 0.0, 800.0, 600.0));
    v.zoom_at(2.0, Point::ORIGIN);
    let r = v.visible_world_rect();
    assert!(close(r.width(), 400.0) && close(r.height(), 300.0));
}
