use std::collections::VecDeque;

use crate::{memory::manager::MemoryStats, render::optimizer::RenderingMetrics};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerfThresholds {
    pub min_frame_rate: f64,
    pub memory_budget_bytes: usize,
    /// Samples retained for [`PerformanceMonitor::history`].
    pub history_len: usize,
}

impl Default for PerfThresholds {
    fn default() -> Self {
        Self {
            min_frame_rate: 30.0,
            memory_budget_bytes: 64 * 1024 * 1024,
            history_len: 120,
        }
    }
}

/// One combined rendering and memory reading.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfSample {
    pub timestamp_ms: f64,
    pub rendering: RenderingMetrics,
    pub memory: MemoryStats,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PerfWarning {
    LowFrameRate { frame_rate: f64, min: f64 },
    MemoryOverBudget { bytes: usize, budget: usize },
}

/// Bounded history of performance samples for external telemetry.
#[derive(Clone, Debug)]
pub struct PerformanceMonitor {
    thresholds: PerfThresholds,
    samples: VecDeque<PerfSample>,
}

impl PerformanceMonitor {
    pub fn new(thresholds: PerfThresholds) -> Self {
        Self {
            thresholds,
            samples: VecDeque::with_capacity(thresholds.history_len.min(1024)),
        }
    }

    pub fn thresholds(&self) -> &PerfThresholds {
        &self.thresholds
    }

    /// Appends a sample, evicting the oldest past `history_len`, and returns threshold breaches.
    ///
    /// A zero frame rate means no frames were produced, which is not reported as slow.
    pub fn record(&mut self, sample: PerfSample) -> Vec<PerfWarning> {
        let mut warnings = Vec::new();
        let fps = sample.rendering.frame_rate;
        if fps > 0.0 && fps < self.thresholds.min_frame_rate {
            tracing::warn!(
                frame_rate = fps,
                min = self.thresholds.min_frame_rate,
                "frame rate below threshold"
            );
            warnings.push(PerfWarning::LowFrameRate {
                frame_rate: fps,
                min: self.thresholds.min_frame_rate,
            });
        }
        let bytes = sample.memory.estimated_memory_usage;
        if bytes > self.thresholds.memory_budget_bytes {
            tracing::warn!(
                bytes,
                budget = self.thresholds.memory_budget_bytes,
                "estimated memory over budget"
            );
            warnings.push(PerfWarning::MemoryOverBudget {
                bytes,
                budget: self.thresholds.memory_budget_bytes,
            });
        }

        if self.thresholds.history_len > 0 {
            while self.samples.len() >= self.thresholds.history_len {
                self.samples.pop_front();
            }
            self.samples.push_back(sample);
        }
        warnings
    }

    pub fn latest(&self) -> Option<&PerfSample> {
        self.samples.back()
    }

    /// Oldest first.
    pub fn history(&self) -> impl Iterator<Item = &PerfSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Takes every retained sample, oldest first.
    pub fn drain(&mut self) -> Vec<PerfSample> {
        self.samples.drain(..).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/perf/monitor.rs"]
mod tests;
