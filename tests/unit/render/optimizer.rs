use super::*;
use crate::foundation::clock::ManualClock;
use crate::foundation::core::{Geometry, Rgba8};
use crate::render::cpu::CpuPainter;
use crate::scene::drawable::{Drawable, PrimitiveKind, Style, Tags};

fn scene() -> Canvas {
    let mut canvas = Canvas::new(100.0, 100.0);
    let mut rect = Drawable::new(DrawableId(1), PrimitiveKind::Rect);
    rect.geometry = Geometry::new(10.0, 10.0, 20.0, 20.0);
    rect.style = Style::filled(Rgba8::BLACK);
    canvas.add_section(rect);
    let mut line = Drawable::new(DrawableId(2), PrimitiveKind::Line);
    line.geometry = Geometry::new(0.0, 50.0, 100.0, 1.0);
    line.style = Style::outlined(None, Rgba8::rgb(200, 200, 200), 1.0);
    line.tags = Tags::GRID;
    canvas.set_grid(vec![line]);
    canvas
}

struct Rig {
    canvas: Canvas,
    viewport: Viewport,
    painter: CpuPainter,
    clock: ManualClock,
}

impl Rig {
    fn new(opts: RenderOpts) -> (Self, RenderingOptimizer) {
        let rig = Self {
            canvas: scene(),
            viewport: Viewport::new(100.0, 100.0),
            painter: CpuPainter::new(),
            clock: ManualClock::new(0.0),
        };
        (rig, RenderingOptimizer::new(opts, 0.0))
    }

    fn flush(&mut self, opt: &mut RenderingOptimizer) -> FrameReport {
        opt.flush(&self.canvas, &self.viewport, &mut self.painter, &self.clock)
            .unwrap()
    }
}

fn moved(id: u64) -> SceneEvent {
    SceneEvent::Modified {
        id: DrawableId(id),
        before: Rect::new(10.0, 10.0, 30.0, 30.0),
        after: Rect::new(14.0, 10.0, 34.0, 30.0),
        is_static: false,
    }
}

#[test]
fn first_flush_paints_everything_and_builds_the_static_layer() {
    let (mut rig, mut opt) = Rig::new(RenderOpts::default());
    assert!(opt.is_pending());
    let f = rig.flush(&mut opt);
    assert!(f.painted);
    assert_eq!(f.clip, None);
    assert_eq!(f.static_op, StaticLayerOp::Rebuild);
    assert_eq!(f.items, 2);
    assert_eq!(rig.painter.frame().pixel(20, 20), Some([0, 0, 0, 255]));
}

#[test]
fn nothing_queued_means_no_paint() {
    let (mut rig, mut opt) = Rig::new(RenderOpts::default());
    rig.flush(&mut opt);
    assert!(!opt.is_pending());
    let f = rig.flush(&mut opt);
    assert!(!f.painted);
    assert_eq!(opt.frames_painted(), 1);
}

#[test]
fn mutations_coalesce_into_one_clipped_paint() {
    let (mut rig, mut opt) = Rig::new(RenderOpts::default());
    rig.flush(&mut opt);
    opt.notify(moved(1));
    opt.notify(moved(1));
    opt.notify(SceneEvent::Added {
        id: DrawableId(7),
        bounds: Rect::new(60.0, 60.0, 70.0, 70.0),
        is_static: false,
    });
    assert_eq!(opt.queued(), 3);
    let f = rig.flush(&mut opt);
    assert!(f.painted);
    assert_eq!(f.events, 3);
    assert_eq!(f.static_op, StaticLayerOp::Reuse);
    assert_eq!(
        f.clip,
        Some(PixelRect {
            x0: 8,
            y0: 8,
            x1: 72,
            y1: 72
        })
    );
    assert_eq!(opt.frames_painted(), 2);
}

#[test]
fn viewport_change_repaints_fully_and_rebuilds_static() {
    let (mut rig, mut opt) = Rig::new(RenderOpts::default());
    rig.flush(&mut opt);
    rig.viewport.pan_by(5.0, 0.0);
    opt.notify(SceneEvent::ViewportChanged);
    let f = rig.flush(&mut opt);
    assert_eq!(f.clip, None);
    assert_eq!(f.static_op, StaticLayerOp::Rebuild);
}

#[test]
fn static_edits_invalidate_the_cached_layer() {
    let (mut rig, mut opt) = Rig::new(RenderOpts::default());
    rig.flush(&mut opt);
    opt.notify(SceneEvent::Modified {
        id: DrawableId(2),
        before: Rect::new(0.0, 50.0, 100.0, 51.0),
        after: Rect::new(0.0, 52.0, 100.0, 53.0),
        is_static: true,
    });
    let f = rig.flush(&mut opt);
    assert_eq!(f.static_op, StaticLayerOp::Rebuild);
    assert!(f.clip.is_some());
}

#[test]
fn cache_and_incremental_can_be_disabled() {
    let (mut rig, mut opt) = Rig::new(RenderOpts {
        static_cache: false,
        incremental: false,
        ..RenderOpts::default()
    });
    rig.flush(&mut opt);
    opt.notify(moved(1));
    let f = rig.flush(&mut opt);
    assert_eq!(f.static_op, StaticLayerOp::None);
    assert_eq!(f.clip, None);
    assert_eq!(f.items, 2);
    assert!(!rig.painter.has_static_layer());
}

#[test]
fn off_screen_damage_is_dropped() {
    let (mut rig, mut opt) = Rig::new(RenderOpts::default());
    rig.flush(&mut opt);
    opt.notify(SceneEvent::Removed {
        id: DrawableId(9),
        bounds: Rect::new(500.0, 500.0, 520.0, 520.0),
        is_static: false,
    });
    let f = rig.flush(&mut opt);
    assert!(!f.painted);
    assert!(!opt.is_pending());
}

#[test]
fn metrics_are_sampled_once_per_interval() {
    let (mut rig, mut opt) = Rig::new(RenderOpts::default());
    for _ in 0..5 {
        opt.request_render();
        rig.flush(&mut opt);
    }
    assert_eq!(opt.sample(500.0, 3), None);
    let m = opt.sample(1000.0, 3).unwrap();
    assert_eq!(m.frame_rate, 5.0);
    assert_eq!(m.object_count, 3);
    assert_eq!(opt.metrics(), m);

    opt.cancel();
    assert_eq!(opt.sample(5000.0, 3), None);
}
