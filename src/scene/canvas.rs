use crate::{
    foundation::core::{Affine, DrawableId, Point, Rect, Rgba8},
    foundation::math::Fnv1a64,
    scene::drawable::{Drawable, PrimitiveKind, detach_from},
};

/// Structural access the memory manager needs to evict live drawables.
pub trait DrawableStore {
    /// Pre-order ids of the subtree rooted at `id`, if present.
    fn subtree_ids(&self, id: DrawableId) -> Option<Vec<DrawableId>>;

    /// Scene-space bounds of `id`, if present.
    fn world_bounds(&self, id: DrawableId) -> Option<Rect>;

    /// Whether `id` is painted into the static layer.
    fn is_static(&self, id: DrawableId) -> bool;

    /// Removes `id` (and its subtree) from the scene.
    fn detach(&mut self, id: DrawableId) -> Option<Drawable>;
}

/// The live scene: a background, a grid layer painted first, and section-root groups.
#[derive(Clone, Debug)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub background: Rgba8,
    grid: Vec<Drawable>,
    content: Vec<Drawable>,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Rgba8::WHITE,
            grid: Vec::new(),
            content: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn content(&self) -> &[Drawable] {
        &self.content
    }

    pub fn grid(&self) -> &[Drawable] {
        &self.grid
    }

    pub fn add_section(&mut self, root: Drawable) {
        self.content.push(root);
    }

    pub fn take_content(&mut self) -> Vec<Drawable> {
        std::mem::take(&mut self.content)
    }

    pub fn take_grid(&mut self) -> Vec<Drawable> {
        std::mem::take(&mut self.grid)
    }

    pub fn set_grid(&mut self, grid: Vec<Drawable>) {
        self.grid = grid;
    }

    /// Number of live nodes across both layers.
    pub fn node_count(&self) -> usize {
        self.grid
            .iter()
            .chain(self.content.iter())
            .map(Drawable::node_count)
            .sum()
    }

    /// Lowest bottom edge of any section root.
    pub fn content_bottom(&self) -> f64 {
        self.content
            .iter()
            .map(|d| d.geometry.bottom())
            .fold(0.0, f64::max)
    }

    pub fn find(&self, id: DrawableId) -> Option<&Drawable> {
        self.content
            .iter()
            .chain(self.grid.iter())
            .find_map(|d| d.find(id))
    }

    pub fn find_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.content
            .iter_mut()
            .chain(self.grid.iter_mut())
            .find_map(|d| d.find_mut(id))
    }

    /// Root-to-node chain of content nodes ending at `id`.
    pub fn path_to(&self, id: DrawableId) -> Option<Vec<&Drawable>> {
        fn walk<'a>(d: &'a Drawable, id: DrawableId, path: &mut Vec<&'a Drawable>) -> bool {
            path.push(d);
            if d.id == id || d.children.iter().any(|c| walk(c, id, path)) {
                return true;
            }
            path.pop();
            false
        }
        let mut path = Vec::new();
        for root in self.content.iter().chain(self.grid.iter()) {
            if walk(root, id, &mut path) {
                return Some(path);
            }
        }
        None
    }

    /// Ancestors of `id`, root first, excluding `id` itself.
    pub fn ancestors(&self, id: DrawableId) -> Vec<DrawableId> {
        let mut path: Vec<DrawableId> = self
            .path_to(id)
            .map(|p| p.iter().map(|d| d.id).collect())
            .unwrap_or_default();
        path.pop();
        path
    }

    /// Transform from `id`'s local space into scene space.
    pub fn world_transform(&self, id: DrawableId) -> Option<Affine> {
        let path = self.path_to(id)?;
        Some(
            path.iter()
                .fold(Affine::IDENTITY, |acc, d| acc * d.geometry.local_transform()),
        )
    }

    /// Transform of `id`'s parent space into scene space.
    pub fn parent_transform(&self, id: DrawableId) -> Option<Affine> {
        let path = self.path_to(id)?;
        Some(
            path[..path.len() - 1]
                .iter()
                .fold(Affine::IDENTITY, |acc, d| acc * d.geometry.local_transform()),
        )
    }

    /// Whether `id` or any ancestor is painted into the static layer.
    pub fn is_static(&self, id: DrawableId) -> bool {
        self.path_to(id)
            .is_some_and(|p| p.iter().any(|d| d.tags.static_layer))
    }

    /// Top-most selectable node under a scene-space point. Grid nodes never hit.
    pub fn hit_test(&self, p: Point) -> Option<DrawableId> {
        fn hit(d: &Drawable, parent: Affine, p: Point) -> Option<DrawableId> {
            if d.tags.grid {
                return None;
            }
            let xf = parent * d.geometry.local_transform();
            for c in d.children.iter().rev() {
                if let Some(id) = hit(c, xf, p) {
                    return Some(id);
                }
            }
            let local = xf.inverse() * p;
            (d.tags.selectable && d.geometry.local_rect().contains(local)).then_some(d.id)
        }
        self.content
            .iter()
            .rev()
            .find_map(|d| hit(d, Affine::IDENTITY, p))
    }

    /// Content nodes whose scene-space bounds intersect `area`.
    pub fn ids_intersecting(&self, area: Rect) -> Vec<DrawableId> {
        fn walk(d: &Drawable, parent: Affine, area: Rect, out: &mut Vec<DrawableId>) {
            let xf = parent * d.geometry.local_transform();
            let bb = xf.transform_rect_bbox(d.geometry.local_rect());
            if bb.intersect(area).area() > 0.0 || area.contains(bb.origin()) {
                out.push(d.id);
            }
            for c in &d.children {
                walk(c, xf, area, out);
            }
        }
        let mut out = Vec::new();
        for d in &self.content {
            walk(d, Affine::IDENTITY, area, &mut out);
        }
        out
    }

    /// Order-sensitive hash of every node's kind, role, geometry, style and text.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_f64(self.width);
        h.write_f64(self.height);
        h.write_bytes(&self.background.to_premul());
        for layer in [&self.grid, &self.content] {
            h.write_u64(layer.len() as u64);
            for root in layer {
                root.visit(&mut |d| {
                    h.write_u8(kind_byte(d.kind));
                    h.write_u8(d.role as u8);
                    let g = d.geometry;
                    for v in [g.left, g.top, g.width, g.height, g.rotation] {
                        h.write_f64(v);
                    }
                    h.write_bytes(&d.style.fill.unwrap_or_default().to_premul());
                    h.write_bytes(&d.style.stroke.unwrap_or_default().to_premul());
                    h.write_bytes(&d.style.text_color.to_premul());
                    h.write_f64(d.style.font_size);
                    h.write_str(&d.text);
                    h.write_str(&d.owner);
                    h.write_u64(d.children.len() as u64);
                });
            }
        }
        h.finish()
    }
}

fn kind_byte(k: PrimitiveKind) -> u8 {
    match k {
        PrimitiveKind::Group => 0,
        PrimitiveKind::Rect => 1,
        PrimitiveKind::Text => 2,
        PrimitiveKind::Line => 3,
        PrimitiveKind::Ellipse => 4,
    }
}

impl DrawableStore for Canvas {
    fn subtree_ids(&self, id: DrawableId) -> Option<Vec<DrawableId>> {
        self.find(id).map(Drawable::subtree_ids)
    }

    fn world_bounds(&self, id: DrawableId) -> Option<Rect> {
        let d = self.find(id)?;
        let xf = self.world_transform(id)?;
        Some(xf.transform_rect_bbox(d.geometry.local_rect()))
    }

    fn is_static(&self, id: DrawableId) -> bool {
        Canvas::is_static(self, id)
    }

    fn detach(&mut self, id: DrawableId) -> Option<Drawable> {
        detach_from(&mut self.content, id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/canvas.rs"]
mod tests;
