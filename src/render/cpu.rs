use crate::{
    foundation::core::Rgba8,
    foundation::error::{SceneError, SceneResult},
    render::composite,
    render::damage::PixelRect,
    render::paint::PaintItem,
    scene::drawable::PrimitiveKind,
};

use vello_cpu::kurbo::Shape;

const PATH_TOLERANCE: f64 = 0.1;
/// Greeked text bar height as a fraction of font size.
const TEXT_BAR: f64 = 0.45;

/// Output frame, rows top to bottom, 4 bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
            premultiplied: true,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Straight-alpha copy of the pixels, as image encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// What to do with the cached static layer this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticLayerOp {
    /// No static layer; every item is in `items`.
    None,
    /// Rasterize `static_items` and keep the result.
    Rebuild,
    /// Composite the cached static layer as is.
    Reuse,
}

/// One frame's worth of paint work.
#[derive(Clone, Debug)]
pub struct PaintPlan<'a> {
    pub width: u32,
    pub height: u32,
    pub background: Rgba8,
    pub static_op: StaticLayerOp,
    pub static_items: &'a [PaintItem],
    pub items: &'a [PaintItem],
    /// Only this region of the output frame is updated; `None` repaints everything.
    pub clip: Option<PixelRect>,
}

/// Rasterizing adapter between flattened paint items and pixels.
pub trait PaintBackend {
    fn execute(&mut self, plan: &PaintPlan<'_>) -> SceneResult<()>;

    fn frame(&self) -> &FrameRGBA;

    fn has_static_layer(&self) -> bool;
}

/// `vello_cpu` rasterizer with a cached static layer and a persistent output frame.
pub struct CpuPainter {
    frame: FrameRGBA,
    static_layer: Option<vello_cpu::Pixmap>,
    scratch: Vec<u8>,
}

impl std::fmt::Debug for CpuPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPainter")
            .field("width", &self.frame.width)
            .field("height", &self.frame.height)
            .field("static_layer", &self.static_layer.is_some())
            .finish()
    }
}

impl CpuPainter {
    pub fn new() -> Self {
        Self {
            frame: FrameRGBA::new(0, 0),
            static_layer: None,
            scratch: Vec::new(),
        }
    }
}

impl Default for CpuPainter {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintBackend for CpuPainter {
    fn execute(&mut self, plan: &PaintPlan<'_>) -> SceneResult<()> {
        let (w, h) = surface_size(plan.width, plan.height)?;
        let mut clip = plan.clip;
        if self.frame.width != plan.width || self.frame.height != plan.height {
            self.frame = FrameRGBA::new(plan.width, plan.height);
            self.static_layer = None;
            clip = None;
        }

        match plan.static_op {
            StaticLayerOp::None => self.static_layer = None,
            StaticLayerOp::Rebuild => {
                self.static_layer = Some(rasterize(plan.static_items, w, h, None));
            }
            StaticLayerOp::Reuse => {
                if self.static_layer.is_none() {
                    tracing::debug!("static layer missing on reuse, rebuilding");
                    self.static_layer = Some(rasterize(plan.static_items, w, h, None));
                }
            }
        }
        let dynamic = rasterize(plan.items, w, h, clip);

        self.scratch.resize(self.frame.data.len(), 0);
        composite::fill(&mut self.scratch, plan.background.to_premul());
        if let Some(layer) = &self.static_layer {
            composite::over_in_place(&mut self.scratch, layer.data_as_u8_slice(), 1.0)?;
        }
        composite::over_in_place(&mut self.scratch, dynamic.data_as_u8_slice(), 1.0)?;

        match clip {
            Some(rect) => {
                composite::copy_region(&mut self.frame.data, &self.scratch, plan.width, rect)?
            }
            None => self.frame.data.copy_from_slice(&self.scratch),
        }
        Ok(())
    }

    fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    fn has_static_layer(&self) -> bool {
        self.static_layer.is_some()
    }
}

fn surface_size(width: u32, height: u32) -> SceneResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SceneError::backend("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SceneError::backend("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(SceneError::backend(format!(
            "surface must be non-empty, got {width}x{height}"
        )));
    }
    Ok((w, h))
}

/// Rasterizes `items` onto a transparent pixmap, skipping items outside `clip`.
fn rasterize(items: &[PaintItem], w: u16, h: u16, clip: Option<PixelRect>) -> vello_cpu::Pixmap {
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    let clip_rect = clip.map(PixelRect::to_rect);
    let visible: Vec<&PaintItem> = items
        .iter()
        .filter(|i| match clip_rect {
            Some(c) => i.bounds.intersect(c).area() > 0.0,
            None => true,
        })
        .collect();
    if visible.is_empty() {
        return pixmap;
    }

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    for item in visible {
        draw_item(&mut ctx, item);
    }
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    pixmap
}

fn draw_item(ctx: &mut vello_cpu::RenderContext, item: &PaintItem) {
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::new(item.transform.as_coeffs()));
    let layered = item.opacity < 1.0;
    if layered {
        ctx.push_opacity_layer(item.opacity);
    }

    let (w, h) = (item.width, item.height);
    let s = &item.style;
    match item.kind {
        PrimitiveKind::Group => {}
        PrimitiveKind::Rect | PrimitiveKind::Ellipse => {
            let ellipse = item.kind == PrimitiveKind::Ellipse;
            if let Some(fill) = s.fill {
                ctx.set_paint(color(fill));
                ctx.fill_path(&shape_path(ellipse, 0.0, 0.0, w, h, s.corner_radius));
            }
            if let Some(stroke) = s.stroke
                && s.stroke_width > 0.0
            {
                ctx.set_paint(color(stroke));
                ctx.fill_path(&ring_path(ellipse, w, h, s.corner_radius, s.stroke_width));
            }
        }
        PrimitiveKind::Line => {
            if let Some(c) = s.stroke.or(s.fill) {
                ctx.set_paint(color(c));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h.max(1.0)));
            }
        }
        PrimitiveKind::Text => {
            let line_h = s.font_size * 1.4;
            let bar_h = (s.font_size * TEXT_BAR).max(1.0);
            let c = s.text_color;
            ctx.set_paint(color(c.with_alpha((f64::from(c.a) * 0.55).round() as u8)));
            for i in 0..item.text_lines {
                let last = i + 1 == item.text_lines && item.text_lines > 1;
                let bw = if last { w * 0.6 } else { w };
                let y = f64::from(i) * line_h + (line_h - bar_h) / 2.0;
                ctx.fill_path(&shape_path(false, 0.0, y, bw, y + bar_h, bar_h / 2.0));
            }
        }
    }

    if layered {
        ctx.pop_layer();
    }
}

fn color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn shape_path(
    ellipse: bool,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    radius: f64,
) -> vello_cpu::kurbo::BezPath {
    let rect = vello_cpu::kurbo::Rect::new(x0, y0, x1, y1);
    if ellipse {
        return vello_cpu::kurbo::Ellipse::from_rect(rect).to_path(PATH_TOLERANCE);
    }
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0);
    if r > 0.0 {
        vello_cpu::kurbo::RoundedRect::from_rect(rect, r).to_path(PATH_TOLERANCE)
    } else {
        rect.to_path(PATH_TOLERANCE)
    }
}

/// Inset outline of width `sw`: the outer shape plus the inner shape wound the other way.
fn ring_path(ellipse: bool, w: f64, h: f64, radius: f64, sw: f64) -> vello_cpu::kurbo::BezPath {
    let mut path = shape_path(ellipse, 0.0, 0.0, w, h, radius);
    if w > 2.0 * sw && h > 2.0 * sw {
        let mut inner = shape_path(ellipse, sw, sw, w - sw, h - sw, (radius - sw).max(0.0));
        inner.apply_affine(vello_cpu::kurbo::Affine::new([-1.0, 0.0, 0.0, 1.0, w, 0.0]));
        path.extend(inner.elements().iter().copied());
    }
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
