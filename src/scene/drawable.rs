use crate::foundation::core::{DrawableId, Geometry, Rgba8};

/// Backend-agnostic primitive type. Also the key of the per-type object pools.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Group,
    Rect,
    Text,
    Line,
    Ellipse,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 5] = [
        Self::Group,
        Self::Rect,
        Self::Text,
        Self::Line,
        Self::Ellipse,
    ];
}

/// What a node stands for in the wireframe, independent of how it is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
    SectionRoot,
    SectionBackground,
    SectionTitle,
    SectionTypeLabel,
    ComponentRoot,
    #[default]
    Part,
    Placeholder,
    Grid,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgba8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Rgba8>,
    pub stroke_width: f64,
    pub text_color: Rgba8,
    pub font_size: f64,
    pub corner_radius: f64,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 0.0,
            text_color: Rgba8::BLACK,
            font_size: 14.0,
            corner_radius: 0.0,
            opacity: 1.0,
        }
    }
}

impl Style {
    pub fn filled(fill: Rgba8) -> Self {
        Self {
            fill: Some(fill),
            ..Self::default()
        }
    }

    pub fn outlined(fill: Option<Rgba8>, stroke: Rgba8, stroke_width: f64) -> Self {
        Self {
            fill,
            stroke: Some(stroke),
            stroke_width,
            ..Self::default()
        }
    }

    pub fn text(color: Rgba8, font_size: f64) -> Self {
        Self {
            text_color: color,
            font_size,
            ..Self::default()
        }
    }

    pub fn with_radius(mut self, r: f64) -> Self {
        self.corner_radius = r;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tags {
    pub selectable: bool,
    pub interactive: bool,
    /// Alignment-grid node: never hit-tested, never GC-evicted.
    pub grid: bool,
    /// Painted into the cached static layer.
    pub static_layer: bool,
}

impl Tags {
    pub const PART: Self = Self {
        selectable: false,
        interactive: false,
        grid: false,
        static_layer: false,
    };

    pub const SELECTABLE: Self = Self {
        selectable: true,
        interactive: true,
        grid: false,
        static_layer: false,
    };

    pub const GRID: Self = Self {
        selectable: false,
        interactive: false,
        grid: true,
        static_layer: true,
    };
}

impl Default for Tags {
    fn default() -> Self {
        Self::PART
    }
}

/// Scene node. Children are positioned relative to their parent's top-left corner.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Drawable {
    pub id: DrawableId,
    /// Component id (or section id for section-level nodes) this node was built for.
    pub owner: String,
    pub kind: PrimitiveKind,
    pub role: NodeRole,
    pub geometry: Geometry,
    pub style: Style,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Drawable>,
    pub tags: Tags,
}

impl Drawable {
    pub fn new(id: DrawableId, kind: PrimitiveKind) -> Self {
        Self {
            id,
            owner: String::new(),
            kind,
            role: NodeRole::Part,
            geometry: Geometry::default(),
            style: Style::default(),
            text: String::new(),
            children: Vec::new(),
            tags: Tags::PART,
        }
    }

    /// Clears per-instance state while keeping heap capacity for reuse.
    ///
    /// Children must already have been moved out.
    pub fn reset(&mut self) {
        debug_assert!(self.children.is_empty(), "reset with live children");
        self.id = DrawableId(0);
        self.owner.clear();
        self.role = NodeRole::Part;
        self.geometry = Geometry::default();
        self.style = Style::default();
        self.text.clear();
        self.children.clear();
        self.tags = Tags::PART;
    }

    /// Pre-order traversal.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Drawable)) {
        f(self);
        for c in &self.children {
            c.visit(f);
        }
    }

    /// Pre-order ids of this node and all descendants.
    pub fn subtree_ids(&self) -> Vec<DrawableId> {
        let mut out = Vec::new();
        self.visit(&mut |d| out.push(d.id));
        out
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Drawable::node_count).sum::<usize>()
    }

    pub fn find(&self, id: DrawableId) -> Option<&Drawable> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// First descendant (or self) with the given role, pre-order.
    pub fn find_role(&self, role: NodeRole) -> Option<&Drawable> {
        if self.role == role {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_role(role))
    }

    /// Texts of all text nodes in the subtree, pre-order.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.visit(&mut |d| {
            if d.kind == PrimitiveKind::Text {
                out.push(d.text.as_str());
            }
        });
        out
    }
}

/// Removes the node with `id` from anywhere below `nodes`.
pub(crate) fn detach_from(nodes: &mut Vec<Drawable>, id: DrawableId) -> Option<Drawable> {
    if let Some(pos) = nodes.iter().position(|d| d.id == id) {
        return Some(nodes.remove(pos));
    }
    nodes
        .iter_mut()
        .find_map(|d| detach_from(&mut d.children, id))
}
