use std::collections::HashSet;
use std::rc::Rc;

use crate::{
    document::model::WireframeDocument,
    foundation::clock::{Clock, MonotonicClock},
    foundation::core::{Affine, DrawableId, Geometry, Point, Rect, SessionId},
    foundation::error::{SceneError, SceneResult},
    grid::engine::{GridConfig, GridEngine},
    memory::manager::{GcReport, MemoryManager, MemoryStats},
    memory::sweep::GcSchedule,
    perf::monitor::{PerfSample, PerfWarning, PerformanceMonitor},
    registry::BuildFn,
    render::optimizer::{FrameReport, RenderingMetrics, RenderingOptimizer, SceneEvent},
    render::{BackendKind, FrameRGBA, PaintBackend, create_backend},
    scene::builder::{RenderOptions, RenderReport, SceneBuilder},
    scene::canvas::{Canvas, DrawableStore},
    scene::drawable::PrimitiveKind,
    scene::factory::{IdAllocator, NodeFactory},
    session::config::SessionOpts,
    viewport::gesture::{GestureTracker, GestureUpdate},
    viewport::transform::Viewport,
};

/// What the periodic timers did on one [`CanvasSession::tick`].
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RenderingMetrics>,
    pub warnings: Vec<PerfWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gc: Option<GcReport>,
}

/// One editor canvas: its scene, pools, viewport, grid and repaint scheduler.
///
/// Nothing is shared with other sessions. After [`Self::dispose`] every operation fails with
/// [`SceneError::Disposed`] and the timers never fire again.
pub struct CanvasSession {
    id: SessionId,
    opts: SessionOpts,
    clock: Rc<dyn Clock>,
    memory: MemoryManager,
    ids: IdAllocator,
    canvas: Canvas,
    builder: SceneBuilder,
    grid: GridEngine,
    viewport: Viewport,
    gestures: GestureTracker,
    optimizer: RenderingOptimizer,
    painter: Box<dyn PaintBackend>,
    monitor: PerformanceMonitor,
    gc: GcSchedule,
    selection: Option<DrawableId>,
    disposed: bool,
}

impl std::fmt::Debug for CanvasSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSession")
            .field("id", &self.id)
            .field("memory", &self.memory)
            .field("selection", &self.selection)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl CanvasSession {
    /// Opens a session on the wall clock.
    pub fn open(id: SessionId, opts: SessionOpts) -> SceneResult<Self> {
        Self::open_with_clock(id, opts, Rc::new(MonotonicClock::new()))
    }

    pub fn open_with_clock(
        id: SessionId,
        opts: SessionOpts,
        clock: Rc<dyn Clock>,
    ) -> SceneResult<Self> {
        opts.validate()?;
        let now = clock.now_ms();
        let mut memory = MemoryManager::new(Rc::clone(&clock));
        for kind in PrimitiveKind::ALL {
            memory.initialize_pool(kind, opts.pool);
        }
        tracing::info!(
            session = id.0,
            width = opts.canvas_width,
            height = opts.canvas_height,
            "canvas session opened"
        );
        Ok(Self {
            id,
            opts,
            memory,
            ids: IdAllocator::new(),
            canvas: Canvas::new(opts.canvas_width, opts.canvas_height),
            builder: SceneBuilder::default(),
            grid: GridEngine::new(opts.grid, opts.snap_enabled),
            viewport: Viewport::new(opts.canvas_width, opts.canvas_height),
            gestures: GestureTracker::default(),
            optimizer: RenderingOptimizer::new(opts.render, now),
            painter: create_backend(BackendKind::Cpu)?,
            monitor: PerformanceMonitor::new(opts.perf),
            gc: GcSchedule::new(opts.gc, now),
            selection: None,
            disposed: false,
            clock,
        })
    }

    fn live(&self) -> SceneResult<()> {
        if self.disposed {
            Err(SceneError::Disposed)
        } else {
            Ok(())
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn grid_config(&self) -> &GridConfig {
        self.grid.config()
    }

    pub fn snap_enabled(&self) -> bool {
        self.grid.snap_enabled()
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn selection(&self) -> Option<DrawableId> {
        self.selection
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Registers a build function for a component tag; it takes precedence over built-ins.
    pub fn register_component(&mut self, tag: &str, f: BuildFn) -> SceneResult<Option<BuildFn>> {
        self.live()?;
        Ok(self.builder.registry_mut().register_custom(tag, f))
    }

    /// Replaces the scene with `doc`. The grid is drawn when requested or already visible.
    pub fn render(
        &mut self,
        doc: &WireframeDocument,
        opts: RenderOptions,
    ) -> SceneResult<RenderReport> {
        self.live()?;
        self.selection = None;
        self.gestures.cancel();
        if opts.render_grid {
            self.grid.set_visible(true);
        }
        let opts = RenderOptions {
            render_grid: self.grid.config().visible,
            ..opts
        };
        self.canvas.height = self.opts.canvas_height;

        let mut factory = NodeFactory::new(&mut self.memory, &mut self.ids);
        let report = self
            .builder
            .render(&mut self.canvas, doc, &opts, &mut factory, &self.grid);
        self.optimizer.notify(SceneEvent::SceneReplaced);
        Ok(report)
    }

    /// Renders a raw JSON document. A document that cannot be read renders as an empty scene and
    /// the report carries the reason.
    pub fn render_value(
        &mut self,
        value: serde_json::Value,
        opts: RenderOptions,
    ) -> SceneResult<RenderReport> {
        match WireframeDocument::from_value(value) {
            Ok(doc) => self.render(&doc, opts),
            Err(e) => self.render_unreadable(e, opts),
        }
    }

    pub fn render_json(&mut self, json: &str, opts: RenderOptions) -> SceneResult<RenderReport> {
        match WireframeDocument::from_json_str(json) {
            Ok(doc) => self.render(&doc, opts),
            Err(e) => self.render_unreadable(e, opts),
        }
    }

    fn render_unreadable(
        &mut self,
        err: SceneError,
        opts: RenderOptions,
    ) -> SceneResult<RenderReport> {
        tracing::warn!(error = %err, "document unreadable, rendering empty scene");
        let mut report = self.render(&WireframeDocument::default(), opts)?;
        report.document_error = Some(err.to_string());
        Ok(report)
    }

    fn viewport_changed(&mut self, changed: bool) {
        if changed {
            self.optimizer.notify(SceneEvent::ViewportChanged);
        }
    }

    /// Zooms by `factor` keeping the screen point `anchor` fixed.
    pub fn zoom_at(&mut self, factor: f64, anchor: Point) -> SceneResult<()> {
        self.live()?;
        let changed = self.viewport.zoom_at(factor, anchor);
        self.viewport_changed(changed);
        Ok(())
    }

    pub fn zoom_in(&mut self, step: f64) -> SceneResult<()> {
        self.live()?;
        let changed = self.viewport.zoom_in(step);
        self.viewport_changed(changed);
        Ok(())
    }

    pub fn zoom_out(&mut self, step: f64) -> SceneResult<()> {
        self.live()?;
        let changed = self.viewport.zoom_out(step);
        self.viewport_changed(changed);
        Ok(())
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> SceneResult<()> {
        self.live()?;
        let changed = self.viewport.pan_by(dx, dy);
        self.viewport_changed(changed);
        Ok(())
    }

    pub fn set_rotation(&mut self, degrees: f64) -> SceneResult<()> {
        self.live()?;
        let changed = self.viewport.set_rotation(degrees);
        self.viewport_changed(changed);
        Ok(())
    }

    pub fn reset_view(&mut self) -> SceneResult<()> {
        self.live()?;
        let changed = self.viewport.reset();
        self.viewport_changed(changed);
        Ok(())
    }

    /// Resizes the output surface.
    pub fn resize_viewport(&mut self, width: f64, height: f64) -> SceneResult<()> {
        self.live()?;
        let positive = |v: f64| v.is_finite() && v >= 1.0 && v <= f64::from(u16::MAX);
        if !positive(width) || !positive(height) {
            return Err(SceneError::validation(format!(
                "viewport size {width}x{height} out of range"
            )));
        }
        self.viewport.set_size(width, height);
        self.optimizer.notify(SceneEvent::Resized {
            width: width.ceil() as u32,
            height: height.ceil() as u32,
        });
        Ok(())
    }

    /// Shows or hides the grid. Returns the number of grid drawables now on the canvas.
    pub fn toggle_grid(&mut self, visible: bool) -> SceneResult<usize> {
        self.live()?;
        self.grid.set_visible(visible);
        let n = self.redraw_grid();
        Ok(n)
    }

    /// Replaces grid kind, size and colour. Visibility is left as it is; the grid is redrawn if
    /// shown.
    pub fn set_grid_config(&mut self, config: GridConfig) -> SceneResult<()> {
        self.live()?;
        let config = GridConfig {
            visible: self.grid.config().visible,
            ..config
        };
        self.grid.set_config(config)?;
        if config.visible {
            self.redraw_grid();
        }
        Ok(())
    }

    fn redraw_grid(&mut self) -> usize {
        let mut factory = NodeFactory::new(&mut self.memory, &mut self.ids);
        let n = if self.grid.config().visible {
            self.grid.draw_grid(&mut self.canvas, &mut factory)
        } else {
            self.grid.clear_grid(&mut self.canvas, &mut factory);
            0
        };
        self.optimizer.notify(SceneEvent::GridChanged);
        n
    }

    pub fn set_snap_enabled(&mut self, on: bool) -> SceneResult<()> {
        self.live()?;
        self.grid.set_snap_enabled(on);
        Ok(())
    }

    fn touch(&mut self, id: DrawableId) {
        for a in self.canvas.ancestors(id) {
            self.memory.mark_accessed(a);
        }
        self.memory.mark_accessed(id);
    }

    /// Selects a content drawable. Returns `false` if `id` is not selectable content.
    pub fn select(&mut self, id: DrawableId) -> SceneResult<bool> {
        self.live()?;
        match self.canvas.find(id) {
            Some(d) if !d.tags.grid => {
                self.selection = Some(id);
                self.touch(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Selects the top-most selectable drawable under a screen point, or clears the selection.
    pub fn select_at(&mut self, screen: Point) -> SceneResult<Option<DrawableId>> {
        self.live()?;
        let world = self.viewport.screen_to_world(screen);
        match self.canvas.hit_test(world) {
            Some(id) => {
                self.selection = Some(id);
                self.touch(id);
                Ok(Some(id))
            }
            None => {
                self.selection = None;
                Ok(None)
            }
        }
    }

    pub fn clear_selection(&mut self) -> SceneResult<()> {
        self.live()?;
        self.selection = None;
        Ok(())
    }

    fn content_geometry(&self, id: DrawableId) -> SceneResult<Geometry> {
        match self.canvas.find(id) {
            Some(d) if !d.tags.grid => Ok(d.geometry),
            Some(_) => Err(SceneError::validation(format!("{id} is a grid drawable"))),
            None => Err(SceneError::validation(format!("no drawable {id}"))),
        }
    }

    /// Sets `id`'s geometry, snapping when enabled, and queues the repaint.
    fn apply_geometry(
        &mut self,
        id: DrawableId,
        mut g: Geometry,
        resize: bool,
    ) -> SceneResult<Geometry> {
        if !g.is_finite() {
            return Err(SceneError::validation(format!(
                "non-finite geometry for {id}"
            )));
        }
        let before = self
            .canvas
            .world_bounds(id)
            .ok_or_else(|| SceneError::validation(format!("no drawable {id}")))?;
        self.grid.snap_geometry(&mut g, resize);
        let node = self
            .canvas
            .find_mut(id)
            .ok_or_else(|| SceneError::validation(format!("no drawable {id}")))?;
        node.geometry = g;
        let after = self.canvas.world_bounds(id).unwrap_or(before);
        self.touch(id);
        self.optimizer.notify(SceneEvent::Modified {
            id,
            before,
            after,
            is_static: self.canvas.is_static(id),
        });
        Ok(g)
    }

    /// Moves a drawable by `(dx, dy)` in its parent's space.
    pub fn move_object(&mut self, id: DrawableId, dx: f64, dy: f64) -> SceneResult<Geometry> {
        self.live()?;
        let mut g = self.content_geometry(id)?;
        g.left += dx;
        g.top += dy;
        self.apply_geometry(id, g, false)
    }

    pub fn resize_object(
        &mut self,
        id: DrawableId,
        width: f64,
        height: f64,
    ) -> SceneResult<Geometry> {
        self.live()?;
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(SceneError::validation(format!(
                "size must be positive, got {width}x{height}"
            )));
        }
        let mut g = self.content_geometry(id)?;
        g.width = width;
        g.height = height;
        self.apply_geometry(id, g, true)
    }

    pub fn rotate_object(&mut self, id: DrawableId, degrees: f64) -> SceneResult<Geometry> {
        self.live()?;
        let mut g = self.content_geometry(id)?;
        g.rotation = degrees.rem_euclid(360.0);
        self.apply_geometry(id, g, false)
    }

    /// Moves a subtree into (or out of) the cached static layer.
    pub fn set_static(&mut self, id: DrawableId, on: bool) -> SceneResult<()> {
        self.live()?;
        self.content_geometry(id)?;
        if let Some(d) = self.canvas.find_mut(id)
            && d.tags.static_layer != on
        {
            d.tags.static_layer = on;
            self.optimizer.notify(SceneEvent::StaticChanged);
        }
        Ok(())
    }

    /// Starts dragging the selectable drawable under `screen`, or panning if there is none.
    pub fn pointer_down(&mut self, screen: Point) -> SceneResult<()> {
        self.live()?;
        let world = self.viewport.screen_to_world(screen);
        match self.canvas.hit_test(world) {
            Some(id) => {
                let origin = self.content_geometry(id)?;
                self.selection = Some(id);
                self.touch(id);
                self.gestures.begin_drag(id, world, origin);
            }
            None => self.gestures.begin_pan(screen),
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, screen: Point) -> SceneResult<()> {
        self.live()?;
        let world = self.viewport.screen_to_world(screen);
        match self.gestures.update(screen, world) {
            GestureUpdate::None => {}
            GestureUpdate::Pan(d) => {
                let changed = self.viewport.pan_by(d.x, d.y);
                self.viewport_changed(changed);
            }
            GestureUpdate::Drag { id, origin, total } => {
                // Scene-space displacement expressed in the parent's space.
                let inv = self
                    .canvas
                    .parent_transform(id)
                    .map(|p| p.inverse())
                    .unwrap_or(Affine::IDENTITY);
                let local = inv * Point::new(total.x, total.y) - inv * Point::ORIGIN;
                let g = Geometry {
                    left: origin.left + local.x,
                    top: origin.top + local.y,
                    ..origin
                };
                self.apply_geometry(id, g, false)?;
            }
        }
        Ok(())
    }

    pub fn pointer_up(&mut self) -> SceneResult<()> {
        self.live()?;
        self.gestures.finish();
        Ok(())
    }

    /// Aborts the current gesture; an interrupted drag puts the object back where it started.
    pub fn pointer_cancel(&mut self) -> SceneResult<()> {
        self.live()?;
        if let Some((id, origin)) = self.gestures.cancel()
            && self.canvas.find(id).is_some()
        {
            let before = self.canvas.world_bounds(id).unwrap_or(Rect::ZERO);
            if let Some(d) = self.canvas.find_mut(id) {
                d.geometry = origin;
            }
            let after = self.canvas.world_bounds(id).unwrap_or(before);
            self.optimizer.notify(SceneEvent::Modified {
                id,
                before,
                after,
                is_static: self.canvas.is_static(id),
            });
        }
        Ok(())
    }

    pub fn focus_lost(&mut self) -> SceneResult<()> {
        self.pointer_cancel()
    }

    /// Paints whatever changed since the last flush.
    pub fn flush(&mut self) -> SceneResult<FrameReport> {
        self.live()?;
        self.optimizer.flush(
            &self.canvas,
            &self.viewport,
            self.painter.as_mut(),
            self.clock.as_ref(),
        )
    }

    pub fn frame(&self) -> &FrameRGBA {
        self.painter.frame()
    }

    /// Polls the metrics and GC timers.
    pub fn tick(&mut self) -> SceneResult<TickReport> {
        self.live()?;
        let now = self.clock.now_ms();
        let mut report = TickReport::default();
        if let Some(rendering) = self.optimizer.sample(now, self.memory.object_count()) {
            report.warnings = self.monitor.record(PerfSample {
                timestamp_ms: now,
                rendering,
                memory: self.memory.get_stats(),
            });
            report.metrics = Some(rendering);
        }
        if let Some(staleness) = self.gc.due(now) {
            report.gc = Some(self.force_gc_with(staleness));
        }
        Ok(report)
    }

    /// Frame rate and render time from the last sample, with the live object count.
    pub fn get_rendering_metrics(&self) -> SceneResult<RenderingMetrics> {
        self.live()?;
        Ok(RenderingMetrics {
            object_count: self.memory.object_count(),
            ..self.optimizer.metrics()
        })
    }

    pub fn get_memory_stats(&self) -> SceneResult<MemoryStats> {
        self.live()?;
        Ok(self.memory.get_stats())
    }

    /// Evicts drawables idle for longer than the configured staleness.
    pub fn force_gc(&mut self) -> SceneResult<GcReport> {
        self.live()?;
        Ok(self.force_gc_with(self.opts.gc.staleness_ms))
    }

    pub fn force_gc_threshold(&mut self, staleness_ms: f64) -> SceneResult<GcReport> {
        self.live()?;
        if !(staleness_ms.is_finite() && staleness_ms >= 0.0) {
            return Err(SceneError::validation(format!(
                "staleness must be non-negative, got {staleness_ms}"
            )));
        }
        Ok(self.force_gc_with(staleness_ms))
    }

    fn protected_ids(&self) -> HashSet<DrawableId> {
        let mut keep = HashSet::new();
        if let Some(sel) = self.selection {
            keep.extend(self.canvas.ancestors(sel));
            keep.extend(self.canvas.subtree_ids(sel).unwrap_or_default());
        }
        if self.opts.gc.protect_visible {
            keep.extend(self.canvas.ids_intersecting(self.viewport.visible_world_rect()));
        }
        keep
    }

    fn force_gc_with(&mut self, staleness_ms: f64) -> GcReport {
        let protected = self.protected_ids();
        let report = self.memory.force_gc(&mut self.canvas, staleness_ms, &protected);
        for root in &report.evicted_roots {
            match root.bounds {
                Some(bounds) => self.optimizer.notify(SceneEvent::Removed {
                    id: root.id,
                    bounds,
                    is_static: root.is_static,
                }),
                None if root.is_static => self.optimizer.invalidate_static(),
                None => self.optimizer.request_render(),
            }
        }
        report
    }

    /// Returns every drawable to its pool, drains the pools and stops the timers. Returns how
    /// many pooled objects were disposed.
    pub fn dispose(&mut self) -> usize {
        if self.disposed {
            return 0;
        }
        {
            let mut factory = NodeFactory::new(&mut self.memory, &mut self.ids);
            self.builder.clear(&mut self.canvas, &mut factory);
            self.grid.clear_grid(&mut self.canvas, &mut factory);
        }
        let drained = self.memory.drain_all();
        self.gc.cancel();
        self.optimizer.cancel();
        self.gestures.cancel();
        self.selection = None;
        self.disposed = true;
        tracing::info!(session = self.id.0, drained, "canvas session disposed");
        drained
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/canvas_session.rs"]
mod tests;
