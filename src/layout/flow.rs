use std::str::FromStr;

use crate::{
    document::kind::ComponentKind,
    document::model::{Component, LayoutType, MAX_COLUMNS, Position, Section, SectionEntry},
    foundation::core::Geometry,
    foundation::error::{SceneError, SceneResult},
    scene::style::{SectionKind, TypeScale},
};

/// Horizontal inset of auto-placed sections inside the working width.
pub const SECTION_MARGIN: f64 = 20.0;
/// Vertical gap between auto-flowed sections.
pub const SECTION_GAP: f64 = 20.0;
pub const DEFAULT_PADDING: f64 = 16.0;
/// Space reserved at the top of every section for its title and type labels.
pub const HEADER_HEIGHT: f64 = 56.0;
pub const DEFAULT_GAP: f64 = 12.0;
pub const GRID_GAP: f64 = 16.0;
pub const DEFAULT_COLUMNS: u32 = 3;

/// Target device; selects the maximum content width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl DeviceType {
    pub fn breakpoint(self) -> f64 {
        match self {
            Self::Mobile => 375.0,
            Self::Tablet => 768.0,
            Self::Desktop => 1440.0,
        }
    }
}

impl FromStr for DeviceType {
    type Err = SceneError;

    fn from_str(s: &str) -> SceneResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" | "phone" => Ok(Self::Mobile),
            "tablet" => Ok(Self::Tablet),
            "desktop" => Ok(Self::Desktop),
            other => Err(SceneError::validation(format!("unknown device type '{other}'"))),
        }
    }
}

/// Render order of `sections` as indices: explicit `position.y` first (ascending), then the
/// `order` field, then array order. Malformed entries keep their array slot.
pub fn section_order(sections: &[SectionEntry]) -> Vec<usize> {
    let key = |idx: usize| {
        let s = sections[idx].as_section();
        let y = s.and_then(|s| s.position).map(|p| p.y);
        let order = s.and_then(|s| s.order);
        (
            y.is_none(),
            y.unwrap_or(0.0),
            order.is_none(),
            order.unwrap_or(0),
            idx,
        )
    };
    let mut idx: Vec<usize> = (0..sections.len()).collect();
    idx.sort_by(|a, b| {
        let (ka, kb) = (key(*a), key(*b));
        ka.0.cmp(&kb.0)
            .then(ka.1.total_cmp(&kb.1))
            .then(ka.2.cmp(&kb.2))
            .then(ka.3.cmp(&kb.3))
            .then(ka.4.cmp(&kb.4))
    });
    idx
}

/// Running placement of sections down the canvas.
#[derive(Clone, Copy, Debug)]
pub struct SectionFlow {
    left: f64,
    width: f64,
    cursor: f64,
}

impl SectionFlow {
    /// Centres the device working width, `min(canvas_width, breakpoint)`, on the canvas.
    pub fn new(canvas_width: f64, device: DeviceType) -> Self {
        let working = canvas_width.min(device.breakpoint()).max(0.0);
        Self {
            left: ((canvas_width - working) / 2.0).max(0.0),
            width: working,
            cursor: SECTION_MARGIN,
        }
    }

    pub fn working_width(&self) -> f64 {
        self.width
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Default width of an auto-placed section, or the section's explicit width.
    pub fn section_width(&self, section: Option<&Section>) -> f64 {
        section
            .and_then(|s| s.dimensions)
            .and_then(|d| d.width)
            .unwrap_or((self.width - 2.0 * SECTION_MARGIN).max(0.0))
    }

    /// Places one section. Explicitly positioned sections keep their position but still push the
    /// cursor below themselves so later auto-flowed sections never overlap them.
    pub fn place(&mut self, position: Option<Position>, width: f64, height: f64) -> Geometry {
        let g = match position {
            Some(p) => Geometry::new(p.x, p.y, width, height),
            None => Geometry::new(self.left + SECTION_MARGIN, self.cursor, width, height),
        };
        self.cursor = self.cursor.max(g.bottom() + SECTION_GAP);
        g
    }
}

/// Natural size of a component given the width available to it.
pub fn intrinsic_size(
    c: &Component,
    kind: &ComponentKind,
    avail: f64,
    ts: &TypeScale,
) -> (f64, f64) {
    let avail = avail.max(0.0);
    let text = c.content_text();
    let chars = if text.is_empty() {
        kind.default_label().chars().count()
    } else {
        text.chars().count()
    } as f64;
    let (w, h) = match kind {
        ComponentKind::Navbar => (avail, 56.0),
        ComponentKind::Heading => (avail, (ts.heading * 1.5).ceil()),
        ComponentKind::Text => {
            let per_line = (avail / (ts.body * 0.55)).floor().max(1.0);
            let lines = (chars / per_line).ceil().max(1.0);
            (avail, lines * ts.body * 1.5)
        }
        ComponentKind::Button => ((chars * 8.0 + 32.0).max(120.0), 40.0),
        ComponentKind::Link => ((chars * 7.0 + 8.0).max(40.0), (ts.body * 1.5).ceil()),
        ComponentKind::Image => (avail, 200.0),
        ComponentKind::Video => (avail, (avail * 9.0 / 16.0).min(360.0)),
        ComponentKind::Icon => (32.0, 32.0),
        ComponentKind::Input => (avail.min(320.0), 40.0),
        ComponentKind::Textarea => (avail.min(480.0), 96.0),
        ComponentKind::Form => {
            let fields = form_fields(c).len() as f64;
            (avail.min(480.0), fields * 64.0 + 56.0)
        }
        ComponentKind::Checkbox => (avail.min(200.0), 24.0),
        ComponentKind::Card => (avail.min(280.0), 180.0),
        ComponentKind::List => {
            let items = c.list_items().len().max(1) as f64;
            (avail, items * ts.body * 1.6 + 8.0)
        }
        ComponentKind::Divider => (avail, 16.0),
        ComponentKind::Avatar => (48.0, 48.0),
        ComponentKind::Badge => (chars * 7.0 + 24.0, 24.0),
        ComponentKind::Unknown(_) => (avail.min(240.0), 80.0),
    };
    let w = c.dimensions.and_then(|d| d.width).unwrap_or(w.min(avail));
    let h = c.dimensions.and_then(|d| d.height).unwrap_or(h);
    (w.max(0.0), h.max(0.0))
}

/// Field labels of a form: explicit `props.fields`, else list items, else a default trio.
pub fn form_fields(c: &Component) -> Vec<String> {
    if let Some(fields) = c.props.get("fields").and_then(serde_json::Value::as_array) {
        let out: Vec<String> = fields
            .iter()
            .filter_map(|f| {
                f.as_str()
                    .map(str::to_string)
                    .or_else(|| f.get("label").and_then(|l| l.as_str()).map(str::to_string))
            })
            .collect();
        if !out.is_empty() {
            return out;
        }
    }
    if c.content.is_array() {
        let items = c.list_items();
        if !items.is_empty() {
            return items;
        }
    }
    vec!["Name".to_string(), "Email".to_string(), "Message".to_string()]
}

/// Section-relative geometry of every component of `section`, in component order.
pub fn layout_components(
    section: &Section,
    kinds: &[ComponentKind],
    section_width: f64,
    ts: &TypeScale,
) -> Vec<Geometry> {
    let pad = section.style.padding.unwrap_or(DEFAULT_PADDING);
    let inner = (section_width - 2.0 * pad).max(0.0);
    let mut out = Vec::with_capacity(section.components.len());

    match section.layout_type {
        LayoutType::Vertical => {
            let gap = section.style.gap.unwrap_or(DEFAULT_GAP);
            let mut y = HEADER_HEIGHT;
            for (c, kind) in section.components.iter().zip(kinds) {
                let (w, h) = intrinsic_size(c, kind, inner, ts);
                out.push(explicit_or(c, Geometry::new(pad, y, w, h)));
                if c.position.is_none() {
                    y += h + gap;
                }
            }
        }
        LayoutType::Horizontal => {
            let gap = section.style.gap.unwrap_or(DEFAULT_GAP);
            let flowed = section
                .components
                .iter()
                .filter(|c| c.position.is_none())
                .count()
                .max(1) as f64;
            let share = ((inner - (flowed - 1.0) * gap) / flowed).max(0.0);
            let mut x = pad;
            for (c, kind) in section.components.iter().zip(kinds) {
                let (w, h) = intrinsic_size(c, kind, share, ts);
                out.push(explicit_or(c, Geometry::new(x, HEADER_HEIGHT, w, h)));
                if c.position.is_none() {
                    x += w + gap;
                }
            }
        }
        LayoutType::Grid => {
            let gap = section.style.gap.unwrap_or(GRID_GAP);
            let cols = section
                .style
                .columns
                .unwrap_or(DEFAULT_COLUMNS)
                .clamp(1, MAX_COLUMNS);
            let n = f64::from(cols);
            let cell_w = ((section_width - (n + 1.0) * gap) / n).max(0.0);
            let mut row_top = HEADER_HEIGHT;
            let mut row_h: f64 = 0.0;
            let mut col = 0u32;
            for (c, kind) in section.components.iter().zip(kinds) {
                let (_, h) = intrinsic_size(c, kind, cell_w, ts);
                if c.position.is_some() {
                    out.push(explicit_or(c, Geometry::new(0.0, 0.0, cell_w, h)));
                    continue;
                }
                let x = gap + f64::from(col) * (cell_w + gap);
                let w = c.dimensions.and_then(|d| d.width).unwrap_or(cell_w);
                out.push(Geometry::new(x, row_top, w, h));
                row_h = row_h.max(h);
                col += 1;
                if col == cols {
                    col = 0;
                    row_top += row_h + gap;
                    row_h = 0.0;
                }
            }
        }
    }
    out
}

fn explicit_or(c: &Component, flowed: Geometry) -> Geometry {
    match c.position {
        Some(p) => Geometry {
            left: p.x,
            top: p.y,
            ..flowed
        },
        None => flowed,
    }
}

/// Explicit height, else tall enough for the header, the components and bottom padding.
pub fn section_height(section: &Section, components: &[Geometry]) -> f64 {
    if let Some(h) = section.dimensions.and_then(|d| d.height) {
        return h;
    }
    let pad = section.style.padding.unwrap_or(DEFAULT_PADDING);
    let content = components
        .iter()
        .map(Geometry::bottom)
        .fold(HEADER_HEIGHT, f64::max);
    (content + pad).max(SectionKind::from_tag(&section.section_type).min_height())
}

#[cfg(test)]
#[path = "../../tests/unit/layout/flow.rs"]
mod tests;
