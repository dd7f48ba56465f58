use crate::{
    foundation::error::{SceneError, SceneResult},
    grid::engine::GridConfig,
    memory::pool::PoolOpts,
    memory::sweep::GcOpts,
    perf::monitor::PerfThresholds,
    render::optimizer::RenderOpts,
};

/// Everything needed to open a canvas session. Every field has a default, so a partial JSON
/// object is a valid config.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOpts {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Applied to every primitive kind's pool.
    pub pool: PoolOpts,
    pub gc: GcOpts,
    pub render: RenderOpts,
    pub grid: GridConfig,
    pub snap_enabled: bool,
    pub perf: PerfThresholds,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 800.0,
            pool: PoolOpts::default(),
            gc: GcOpts::default(),
            render: RenderOpts::default(),
            grid: GridConfig::default(),
            snap_enabled: false,
            perf: PerfThresholds::default(),
        }
    }
}

impl SessionOpts {
    pub fn from_json_str(s: &str) -> SceneResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| SceneError::config(format!("session config: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Overrides pool and timer settings from `WIRESCENE_*` variables. Unparsable or zero values
    /// are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let positive_u = |key: &str| {
            var(key)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
        };
        let positive_f = |key: &str| {
            var(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|&n| n.is_finite() && n > 0.0)
        };
        if let Some(n) = positive_u("WIRESCENE_POOL_MAX_SIZE") {
            self.pool.max_size = n;
        }
        if let Some(ms) = positive_f("WIRESCENE_GC_INTERVAL_MS") {
            self.gc.interval_ms = ms;
        }
        if let Some(ms) = positive_f("WIRESCENE_GC_STALENESS_MS") {
            self.gc.staleness_ms = ms;
        }
        if let Some(ms) = positive_f("WIRESCENE_METRICS_INTERVAL_MS") {
            self.render.metrics_interval_ms = ms;
        }
        self
    }

    pub fn validate(&self) -> SceneResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.canvas_width) || !positive(self.canvas_height) {
            return Err(SceneError::config(format!(
                "canvas size must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.canvas_width > f64::from(u16::MAX) || self.canvas_height > f64::from(u16::MAX) {
            return Err(SceneError::config("canvas size exceeds 65535 px"));
        }
        if !positive(self.gc.interval_ms) {
            return Err(SceneError::config("gc.intervalMs must be positive"));
        }
        if !(self.gc.staleness_ms.is_finite() && self.gc.staleness_ms >= 0.0) {
            return Err(SceneError::config("gc.stalenessMs must be non-negative"));
        }
        if !positive(self.render.metrics_interval_ms) {
            return Err(SceneError::config("render.metricsIntervalMs must be positive"));
        }
        self.grid
            .validate()
            .map_err(|e| SceneError::config(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
