use crate::{
    foundation::core::{DrawableId, Geometry, Rgba8},
    memory::manager::MemoryManager,
    scene::drawable::{Drawable, NodeRole, PrimitiveKind, Style, Tags},
};

/// Session-scoped drawable id source. Ids are never reused within a session.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> DrawableId {
        let id = DrawableId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates drawables, preferring pooled instances over fresh allocations.
///
/// Nodes handed out are not registered; the scene builder registers whole subtrees once they are
/// attached, in document order.
pub struct NodeFactory<'a> {
    memory: &'a mut MemoryManager,
    ids: &'a mut IdAllocator,
    created: usize,
    reused: usize,
}

impl<'a> NodeFactory<'a> {
    pub fn new(memory: &'a mut MemoryManager, ids: &'a mut IdAllocator) -> Self {
        Self {
            memory,
            ids,
            created: 0,
            reused: 0,
        }
    }

    pub fn memory(&mut self) -> &mut MemoryManager {
        self.memory
    }

    /// Nodes produced so far, pooled or fresh.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Nodes that came out of a pool.
    pub fn reused(&self) -> usize {
        self.reused
    }

    pub fn node(&mut self, kind: PrimitiveKind, role: NodeRole, owner: &str) -> Drawable {
        let id = self.ids.next_id();
        let mut d = match self.memory.acquire(kind) {
            Some(pooled) => {
                self.reused += 1;
                pooled.drawable
            }
            None => Drawable::new(id, kind),
        };
        d.id = id;
        d.kind = kind;
        d.role = role;
        d.owner.push_str(owner);
        self.created += 1;
        d
    }

    pub fn group(
        &mut self,
        owner: &str,
        role: NodeRole,
        geometry: Geometry,
        children: Vec<Drawable>,
    ) -> Drawable {
        let mut d = self.node(PrimitiveKind::Group, role, owner);
        d.geometry = geometry;
        d.children = children;
        d
    }

    pub fn rect(&mut self, owner: &str, geometry: Geometry, style: Style) -> Drawable {
        let mut d = self.node(PrimitiveKind::Rect, NodeRole::Part, owner);
        d.geometry = geometry;
        d.style = style;
        d
    }

    pub fn text(
        &mut self,
        owner: &str,
        geometry: Geometry,
        content: &str,
        color: Rgba8,
        font_size: f64,
    ) -> Drawable {
        let mut d = self.node(PrimitiveKind::Text, NodeRole::Part, owner);
        d.geometry = geometry;
        d.style = Style::text(color, font_size);
        d.text.push_str(content);
        d
    }

    /// Line drawn as a `thickness`-high bar from `(x, y)` toward `angle_deg`.
    #[allow(clippy::too_many_arguments)]
    pub fn line(
        &mut self,
        owner: &str,
        x: f64,
        y: f64,
        length: f64,
        angle_deg: f64,
        thickness: f64,
        color: Rgba8,
    ) -> Drawable {
        let mut d = self.node(PrimitiveKind::Line, NodeRole::Part, owner);
        d.geometry = Geometry {
            left: x,
            top: y,
            width: length,
            height: thickness,
            rotation: angle_deg,
        };
        d.style = Style::outlined(None, color, thickness);
        d
    }

    pub fn ellipse(&mut self, owner: &str, geometry: Geometry, style: Style) -> Drawable {
        let mut d = self.node(PrimitiveKind::Ellipse, NodeRole::Part, owner);
        d.geometry = geometry;
        d.style = style;
        d
    }

    /// Unregisters a detached subtree and hands it back to the pools.
    pub fn retire(&mut self, root: Drawable) -> usize {
        let n = self.memory.unregister_tree(&root);
        self.memory.release(root);
        n
    }
}

pub(crate) fn tag_all(d: &mut Drawable, tags: Tags) {
    d.tags = tags;
    for c in &mut d.children {
        tag_all(c, tags);
    }
}
