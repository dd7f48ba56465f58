//! Repaint scheduling.
//!
//! Scene mutations are queued as [`SceneEvent`]s instead of repainting on each one. A
//! [`RenderingOptimizer::flush`] drains the queue in arrival order, folds the events into one
//! damage region, and paints at most once. Static-layer caching and dirty-rectangle repaint are
//! both decided here; the backend only executes the resulting [`PaintPlan`].

use std::collections::VecDeque;

use crate::{
    foundation::clock::{Clock, Interval},
    foundation::core::{Affine, DrawableId, Rect},
    foundation::error::SceneResult,
    render::cpu::{PaintBackend, PaintPlan, StaticLayerOp},
    render::damage::{DamageRegion, PixelRect},
    render::paint::collect_paint_items,
    scene::canvas::Canvas,
    viewport::transform::Viewport,
};

/// Screen pixels added around dirty rectangles to cover anti-aliased edges.
const DAMAGE_PAD: f64 = 2.0;

/// One scene mutation. World-space bounds; `is_static` is whether the node paints in the static
/// layer.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneEvent {
    Added {
        id: DrawableId,
        bounds: Rect,
        is_static: bool,
    },
    Removed {
        id: DrawableId,
        bounds: Rect,
        is_static: bool,
    },
    Modified {
        id: DrawableId,
        before: Rect,
        after: Rect,
        is_static: bool,
    },
    /// Static-layer membership changed for some subtree.
    StaticChanged,
    ViewportChanged,
    GridChanged,
    SceneReplaced,
    Resized {
        width: u32,
        height: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOpts {
    /// Rasterize static-layer drawables once and reuse the pixels until they change.
    pub static_cache: bool,
    /// Repaint only the region touched since the last flush.
    pub incremental: bool,
    pub metrics_interval_ms: f64,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            static_cache: true,
            incremental: true,
            metrics_interval_ms: 1000.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingMetrics {
    /// Frames painted per second over the last sampling window.
    pub frame_rate: f64,
    /// Mean paint time in milliseconds over the last sampling window.
    pub render_time: f64,
    pub object_count: usize,
}

/// What one flush did.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub painted: bool,
    /// Events drained by this flush.
    pub events: usize,
    pub items: usize,
    #[serde(skip)]
    pub static_op: StaticLayerOp,
    pub clip: Option<PixelRect>,
    pub render_time_ms: f64,
}

impl FrameReport {
    fn idle(events: usize) -> Self {
        Self {
            painted: false,
            events,
            items: 0,
            static_op: StaticLayerOp::None,
            clip: None,
            render_time_ms: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct RenderingOptimizer {
    opts: RenderOpts,
    queue: VecDeque<SceneEvent>,
    damage: DamageRegion,
    static_dirty: bool,
    sampler: Interval,
    window_frames: u32,
    window_render_ms: f64,
    window_start_ms: f64,
    last_render_ms: f64,
    frames_painted: u64,
    metrics: RenderingMetrics,
}

impl RenderingOptimizer {
    pub fn new(opts: RenderOpts, start_ms: f64) -> Self {
        Self {
            opts,
            queue: VecDeque::new(),
            // Nothing has been painted yet.
            damage: DamageRegion::Full,
            static_dirty: true,
            sampler: Interval::new(opts.metrics_interval_ms, start_ms),
            window_frames: 0,
            window_render_ms: 0.0,
            window_start_ms: start_ms,
            last_render_ms: 0.0,
            frames_painted: 0,
            metrics: RenderingMetrics::default(),
        }
    }

    pub fn opts(&self) -> &RenderOpts {
        &self.opts
    }

    /// Queues a mutation; nothing is painted until [`Self::flush`].
    pub fn notify(&mut self, event: SceneEvent) {
        self.queue.push_back(event);
    }

    /// Forces the next flush to repaint the whole frame.
    pub fn request_render(&mut self) {
        self.damage.add_full();
    }

    /// Drops the cached static layer on the next flush.
    pub fn invalidate_static(&mut self) {
        self.static_dirty = true;
        self.damage.add_full();
    }

    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty() || !self.damage.is_none()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn frames_painted(&self) -> u64 {
        self.frames_painted
    }

    /// Drains queued events and paints once if anything visible changed.
    ///
    /// On backend failure the accumulated damage is kept so the next flush retries.
    pub fn flush(
        &mut self,
        canvas: &Canvas,
        viewport: &Viewport,
        backend: &mut dyn PaintBackend,
        clock: &dyn Clock,
    ) -> SceneResult<FrameReport> {
        let view = viewport.affine();
        let events = self.queue.len();
        while let Some(ev) = self.queue.pop_front() {
            self.apply(ev, view);
        }

        let (vw, vh) = viewport.size();
        let (width, height) = (vw.max(0.0).ceil() as u32, vh.max(0.0).ceil() as u32);
        let frame = backend.frame();
        if frame.width != width || frame.height != height {
            self.damage.add_full();
            self.static_dirty = true;
        }
        if self.damage.is_none() {
            return Ok(FrameReport::idle(events));
        }

        let damage = self.damage;
        let clip = match damage {
            DamageRegion::Rect(_) if self.opts.incremental => {
                match damage.pixel_rect(width, height, DAMAGE_PAD) {
                    Some(rect) => Some(rect),
                    None => {
                        tracing::trace!("damage entirely off screen, skipping paint");
                        self.damage = DamageRegion::None;
                        return Ok(FrameReport::idle(events));
                    }
                }
            }
            _ => None,
        };

        let lists = collect_paint_items(canvas, view);
        let (static_op, static_items, items) = if self.opts.static_cache {
            let op = if self.static_dirty || !backend.has_static_layer() {
                StaticLayerOp::Rebuild
            } else {
                StaticLayerOp::Reuse
            };
            (op, lists.static_items, lists.dynamic_items)
        } else {
            let mut all = lists.static_items;
            all.extend(lists.dynamic_items);
            (StaticLayerOp::None, Vec::new(), all)
        };

        let plan = PaintPlan {
            width,
            height,
            background: canvas.background,
            static_op,
            static_items: &static_items,
            items: &items,
            clip,
        };
        let start = clock.now_ms();
        backend.execute(&plan)?;
        let elapsed = (clock.now_ms() - start).max(0.0);

        self.damage = DamageRegion::None;
        self.static_dirty = false;
        self.frames_painted += 1;
        self.window_frames += 1;
        self.window_render_ms += elapsed;
        self.last_render_ms = elapsed;
        tracing::trace!(?static_op, ?clip, items = items.len(), "frame painted");

        Ok(FrameReport {
            painted: true,
            events,
            items: static_items.len() + items.len(),
            static_op,
            clip,
            render_time_ms: elapsed,
        })
    }

    fn apply(&mut self, ev: SceneEvent, view: Affine) {
        match ev {
            SceneEvent::Added {
                bounds, is_static, ..
            }
            | SceneEvent::Removed {
                bounds, is_static, ..
            } => self.touch(bounds, is_static, view),
            SceneEvent::Modified {
                before,
                after,
                is_static,
                ..
            } => {
                self.touch(before, is_static, view);
                self.touch(after, is_static, view);
            }
            SceneEvent::ViewportChanged
            | SceneEvent::GridChanged
            | SceneEvent::SceneReplaced
            | SceneEvent::StaticChanged
            | SceneEvent::Resized { .. } => {
                self.damage.add_full();
                self.static_dirty = true;
            }
        }
    }

    fn touch(&mut self, world: Rect, is_static: bool, view: Affine) {
        self.damage.add_rect(view.transform_rect_bbox(world));
        self.static_dirty |= is_static;
    }

    /// Samples frame rate and render time if the metrics interval elapsed.
    pub fn sample(&mut self, now_ms: f64, object_count: usize) -> Option<RenderingMetrics> {
        if !self.sampler.poll(now_ms) {
            return None;
        }
        let span = now_ms - self.window_start_ms;
        let frame_rate = if span > 0.0 {
            f64::from(self.window_frames) * 1000.0 / span
        } else {
            0.0
        };
        let render_time = if self.window_frames > 0 {
            self.window_render_ms / f64::from(self.window_frames)
        } else {
            self.last_render_ms
        };
        self.metrics = RenderingMetrics {
            frame_rate,
            render_time,
            object_count,
        };
        self.window_frames = 0;
        self.window_render_ms = 0.0;
        self.window_start_ms = now_ms;
        Some(self.metrics)
    }

    /// Last sampled metrics.
    pub fn metrics(&self) -> RenderingMetrics {
        self.metrics
    }

    /// Stops metrics sampling and drops anything queued.
    pub fn cancel(&mut self) {
        self.sampler.cancel();
        self.queue.clear();
        self.damage = DamageRegion::None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/optimizer.rs"]
mod tests;
