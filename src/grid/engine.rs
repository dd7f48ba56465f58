use std::str::FromStr;

use crate::{
    foundation::core::{Geometry, Rgba8},
    foundation::error::{SceneError, SceneResult},
    scene::canvas::Canvas,
    scene::drawable::{Drawable, NodeRole, Style, Tags},
    scene::factory::NodeFactory,
};

/// Owner string carried by every grid drawable.
pub const GRID_OWNER: &str = "grid";
/// Upper bound on emitted dots; spacing doubles until the matrix fits.
pub const MAX_GRID_DOTS: usize = 20_000;
/// Upper bound on emitted lines, both directions together.
pub const MAX_GRID_LINES: usize = 2_000;
pub const COLUMN_COUNT: usize = 12;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridKind {
    #[default]
    Lines,
    Dots,
    Columns,
}

impl FromStr for GridKind {
    type Err = SceneError;

    fn from_str(s: &str) -> SceneResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" | "line" => Ok(Self::Lines),
            "dots" | "dot" => Ok(Self::Dots),
            "columns" | "column" => Ok(Self::Columns),
            other => Err(SceneError::validation(format!("unknown grid type '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    #[serde(rename = "type")]
    pub kind: GridKind,
    /// Spacing in scene px; also the snap increment.
    pub size: f64,
    pub color: Rgba8,
    pub visible: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            kind: GridKind::Lines,
            size: 20.0,
            color: Rgba8::rgb(0xe5, 0xe7, 0xeb),
            visible: false,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(SceneError::validation(format!(
                "grid size must be positive, got {}",
                self.size
            )));
        }
        Ok(())
    }
}

/// Rounds position (and size, when resizing) to multiples of `grid_size`.
pub fn snap(g: &mut Geometry, grid_size: f64, resize: bool) {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return;
    }
    let round = |v: f64| (v / grid_size).round() * grid_size;
    g.left = round(g.left);
    g.top = round(g.top);
    if resize {
        g.width = round(g.width).max(grid_size);
        g.height = round(g.height).max(grid_size);
    }
}

/// Doubles `size` until `count(step)` fits under `max`.
fn widen(size: f64, max: usize, count: impl Fn(f64) -> f64) -> f64 {
    let mut step = size;
    while count(step) > max as f64 {
        step *= 2.0;
    }
    if step != size {
        tracing::debug!(size, step, "grid too dense, widened spacing");
    }
    step
}

/// Alignment grid generator and snap policy of one canvas session.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridEngine {
    config: GridConfig,
    snap_enabled: bool,
}

impl GridEngine {
    pub fn new(config: GridConfig, snap_enabled: bool) -> Self {
        Self {
            config,
            snap_enabled,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: GridConfig) -> SceneResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.config.visible = visible;
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    pub fn set_snap_enabled(&mut self, on: bool) {
        self.snap_enabled = on;
    }

    /// Applies [`snap`] with the configured size when snapping is on.
    pub fn snap_geometry(&self, g: &mut Geometry, resize: bool) -> bool {
        if self.snap_enabled {
            snap(g, self.config.size, resize);
        }
        self.snap_enabled
    }

    /// Removes every grid drawable, returning them to the pools. Returns how many nodes left the
    /// registry.
    pub fn clear_grid(&self, canvas: &mut Canvas, factory: &mut NodeFactory<'_>) -> usize {
        canvas
            .take_grid()
            .into_iter()
            .map(|d| factory.retire(d))
            .sum()
    }

    /// Replaces the grid layer with a fresh one of the configured kind spanning the canvas.
    #[tracing::instrument(skip(self, canvas, factory), fields(kind = ?self.config.kind))]
    pub fn draw_grid(&self, canvas: &mut Canvas, factory: &mut NodeFactory<'_>) -> usize {
        self.clear_grid(canvas, factory);
        let (w, h) = (canvas.width, canvas.height);
        if !(w.is_finite() && h.is_finite()) {
            tracing::warn!(w, h, "canvas size is not finite, grid skipped");
            return 0;
        }
        let size = self.config.size;
        let color = self.config.color;
        let mut nodes = Vec::new();

        match self.config.kind {
            GridKind::Lines => {
                let step = widen(size, MAX_GRID_LINES, |step| {
                    (w / step).floor() + 1.0 + (h / step).floor() + 1.0
                });
                let mut x = 0.0;
                while x <= w {
                    nodes.push(factory.line(GRID_OWNER, x, 0.0, h, 90.0, 1.0, color));
                    x += step;
                }
                let mut y = 0.0;
                while y <= h {
                    nodes.push(factory.line(GRID_OWNER, 0.0, y, w, 0.0, 1.0, color));
                    y += step;
                }
            }
            GridKind::Dots => {
                let step = widen(size, MAX_GRID_DOTS, |step| {
                    ((w / step).floor() + 1.0) * ((h / step).floor() + 1.0)
                });
                let mut y = 0.0;
                while y <= h {
                    let mut x = 0.0;
                    while x <= w {
                        nodes.push(factory.ellipse(
                            GRID_OWNER,
                            Geometry::new(x - 1.0, y - 1.0, 2.0, 2.0),
                            Style::filled(color),
                        ));
                        x += step;
                    }
                    y += step;
                }
            }
            GridKind::Columns => {
                let gutter = size;
                let n = COLUMN_COUNT as f64;
                let col_w = ((w - 2.0 * gutter - (n - 1.0) * gutter) / n).max(0.0);
                let fill = color.with_alpha(40);
                for i in 0..COLUMN_COUNT {
                    let x = gutter + i as f64 * (col_w + gutter);
                    nodes.push(factory.rect(
                        GRID_OWNER,
                        Geometry::new(x, 0.0, col_w, h),
                        Style::filled(fill),
                    ));
                }
            }
        }

        for d in &mut nodes {
            mark_grid(d);
            factory.memory().register_tree(d);
        }
        let n = nodes.len();
        canvas.set_grid(nodes);
        tracing::debug!(nodes = n, "grid drawn");
        n
    }
}

fn mark_grid(d: &mut Drawable) {
    d.role = NodeRole::Grid;
    d.tags = Tags::GRID;
}

#[cfg(test)]
#[path = "../../tests/unit/grid/engine.rs"]
mod tests;
