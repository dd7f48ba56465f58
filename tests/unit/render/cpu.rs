use super::*;
use crate::foundation::core::{Affine, DrawableId, Rect};
use crate::scene::drawable::Style;

fn rect_item(id: u64, x: f64, y: f64, w: f64, h: f64, fill: Rgba8) -> PaintItem {
    PaintItem {
        id: DrawableId(id),
        kind: PrimitiveKind::Rect,
        transform: Affine::translate((x, y)),
        width: w,
        height: h,
        style: Style::filled(fill),
        text_lines: 0,
        opacity: 1.0,
        bounds: Rect::new(x, y, x + w, y + h),
    }
}

fn plan<'a>(static_items: &'a [PaintItem], items: &'a [PaintItem]) -> PaintPlan<'a> {
    PaintPlan {
        width: 40,
        height: 40,
        background: Rgba8::WHITE,
        static_op: StaticLayerOp::None,
        static_items,
        items,
        clip: None,
    }
}

#[test]
fn empty_plan_paints_background() {
    let mut p = CpuPainter::new();
    p.execute(&plan(&[], &[])).unwrap();
    let f = p.frame();
    assert_eq!((f.width, f.height), (40, 40));
    assert_eq!(f.pixel(0, 0), Some([255, 255, 255, 255]));
    assert_eq!(f.pixel(39, 39), Some([255, 255, 255, 255]));
    assert_eq!(f.pixel(40, 0), None);
}

#[test]
fn filled_rect_covers_its_interior_only() {
    let items = [rect_item(1, 10.0, 10.0, 20.0, 20.0, Rgba8::rgb(255, 0, 0))];
    let mut p = CpuPainter::new();
    p.execute(&plan(&[], &items)).unwrap();
    let inside = p.frame().pixel(20, 20).unwrap();
    assert!(inside[0] > 240 && inside[1] < 15 && inside[2] < 15, "{inside:?}");
    assert_eq!(p.frame().pixel(2, 2), Some([255, 255, 255, 255]));
}

#[test]
fn static_layer_is_cached_and_dropped_on_request() {
    let statics = [rect_item(1, 0.0, 0.0, 40.0, 40.0, Rgba8::rgb(0, 0, 255))];
    let mut p = CpuPainter::new();
    let mut pl = plan(&statics, &[]);
    pl.static_op = StaticLayerOp::Rebuild;
    p.execute(&pl).unwrap();
    assert!(p.has_static_layer());
    assert!(p.frame().pixel(5, 5).unwrap()[2] > 240);

    pl.static_op = StaticLayerOp::Reuse;
    pl.static_items = &[];
    p.execute(&pl).unwrap();
    assert!(p.frame().pixel(5, 5).unwrap()[2] > 240);

    pl.static_op = StaticLayerOp::None;
    p.execute(&pl).unwrap();
    assert!(!p.has_static_layer());
    assert_eq!(p.frame().pixel(5, 5), Some([255, 255, 255, 255]));
}

#[test]
fn clipped_frame_only_updates_the_clip() {
    let mut p = CpuPainter::new();
    p.execute(&plan(&[], &[])).unwrap();

    let items = [rect_item(1, 0.0, 0.0, 40.0, 40.0, Rgba8::BLACK)];
    let mut pl = plan(&[], &items);
    pl.clip = Some(PixelRect {
        x0: 0,
        y0: 0,
        x1: 10,
        y1: 10,
    });
    p.execute(&pl).unwrap();
    assert_eq!(p.frame().pixel(5, 5), Some([0, 0, 0, 255]));
    assert_eq!(p.frame().pixel(20, 20), Some([255, 255, 255, 255]));
}

#[test]
fn degenerate_surfaces_are_rejected() {
    let mut p = CpuPainter::new();
    let mut pl = plan(&[], &[]);
    pl.width = 0;
    assert!(matches!(p.execute(&pl), Err(SceneError::Backend(_))));
    pl.width = 70_000;
    assert!(matches!(p.execute(&pl), Err(SceneError::Backend(_))));
}

#[test]
fn straight_rgba_unpremultiplies() {
    let mut f = FrameRGBA::new(1, 1);
    f.data.copy_from_slice(&[64, 0, 0, 128]);
    assert_eq!(f.to_straight_rgba(), vec![128, 0, 0, 128]);
}
