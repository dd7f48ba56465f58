use crate::foundation::clock::Interval;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GcOpts {
    /// Period of the background sweep.
    pub interval_ms: f64,
    /// Objects idle for longer than this are eligible for eviction.
    pub staleness_ms: f64,
    /// Keep anything intersecting the visible viewport out of eviction.
    pub protect_visible: bool,
}

impl Default for GcOpts {
    fn default() -> Self {
        Self {
            interval_ms: 30_000.0,
            staleness_ms: 60_000.0,
            protect_visible: true,
        }
    }
}

/// Periodic GC trigger for one canvas session. Cancelled on teardown and inert afterwards.
#[derive(Clone, Copy, Debug)]
pub struct GcSchedule {
    timer: Interval,
    staleness_ms: f64,
}

impl GcSchedule {
    pub fn new(opts: GcOpts, start_ms: f64) -> Self {
        Self {
            timer: Interval::new(opts.interval_ms, start_ms),
            staleness_ms: opts.staleness_ms,
        }
    }

    /// Staleness threshold to sweep with, if a sweep is due.
    pub fn due(&mut self, now_ms: f64) -> Option<f64> {
        self.timer.poll(now_ms).then_some(self.staleness_ms)
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.timer.is_cancelled()
    }
}
