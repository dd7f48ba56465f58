use crate::{
    foundation::core::{Affine, DrawableId, Rect},
    scene::canvas::Canvas,
    scene::drawable::{Drawable, PrimitiveKind, Style},
};

/// One primitive flattened into screen space, ready for a paint backend.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintItem {
    pub id: DrawableId,
    pub kind: PrimitiveKind,
    /// Local-to-screen transform.
    pub transform: Affine,
    pub width: f64,
    pub height: f64,
    pub style: Style,
    /// Line count of a text item, for greeked rendering.
    pub text_lines: u32,
    /// Own opacity times every ancestor's.
    pub opacity: f32,
    /// Screen-space bounding box.
    pub bounds: Rect,
}

/// Paint items split into the cached static layer and the per-frame dynamic layer, each in
/// back-to-front order. The static layer is composited beneath the dynamic one.
#[derive(Clone, Debug, Default)]
pub struct PaintLists {
    pub static_items: Vec<PaintItem>,
    pub dynamic_items: Vec<PaintItem>,
}

impl PaintLists {
    pub fn len(&self) -> usize {
        self.static_items.len() + self.dynamic_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flattens the canvas (grid first, then content) under the `view` transform.
pub fn collect_paint_items(canvas: &Canvas, view: Affine) -> PaintLists {
    let mut out = PaintLists::default();
    for root in canvas.grid().iter().chain(canvas.content()) {
        walk(root, view, 1.0, false, &mut out);
    }
    out
}

fn walk(d: &Drawable, parent: Affine, opacity: f64, inherited_static: bool, out: &mut PaintLists) {
    let opacity = opacity * d.style.opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 {
        return;
    }
    let xf = parent * d.geometry.local_transform();
    let is_static = inherited_static || d.tags.static_layer;
    if d.kind != PrimitiveKind::Group {
        let item = PaintItem {
            id: d.id,
            kind: d.kind,
            transform: xf,
            width: d.geometry.width.max(0.0),
            height: d.geometry.height.max(0.0),
            style: d.style,
            text_lines: text_lines(d),
            opacity: opacity as f32,
            bounds: xf.transform_rect_bbox(d.geometry.local_rect()),
        };
        if is_static {
            out.static_items.push(item);
        } else {
            out.dynamic_items.push(item);
        }
    }
    for c in &d.children {
        walk(c, xf, opacity, is_static, out);
    }
}

fn text_lines(d: &Drawable) -> u32 {
    if d.kind != PrimitiveKind::Text || d.text.trim().is_empty() {
        return 0;
    }
    let line_h = (d.style.font_size * 1.4).max(1.0);
    ((d.geometry.height / line_h).floor() as u32).max(1)
}
