use std::collections::{BTreeMap, HashMap, HashSet};
use std::rc::Rc;

use crate::{
    foundation::clock::Clock,
    foundation::core::{DrawableId, Rect},
    memory::pool::{ObjectPool, PoolOpts, PoolStats, PooledObject, ReleaseOutcome},
    scene::canvas::DrawableStore,
    scene::drawable::{Drawable, PrimitiveKind},
};

/// Estimated resident bytes of one drawable, excluding its children.
///
/// Base cost per primitive kind, plus text bytes, plus 48 bytes per child slot.
pub fn estimated_cost(kind: PrimitiveKind, text_len: usize, child_slots: usize) -> usize {
    let base = match kind {
        PrimitiveKind::Group => 256,
        PrimitiveKind::Rect => 192,
        PrimitiveKind::Text => 224,
        PrimitiveKind::Line => 160,
        PrimitiveKind::Ellipse => 176,
    };
    base + text_len + 48 * child_slots
}

/// Snapshot of memory bookkeeping, recomputed on every call.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    /// Live registered drawables.
    pub object_count: usize,
    pub estimated_memory_usage: usize,
    /// Live drawables whose kind is pool-managed.
    pub active_pool_size: usize,
    /// Idle drawables across all free lists.
    pub inactive_pool_size: usize,
    pub gc_runs: u64,
    pub timestamp: f64,
}

/// Result of one GC pass.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GcReport {
    /// Evicted subtree roots, in registration order.
    pub evicted: Vec<DrawableId>,
    /// Bounds and layer of each evicted root, aligned with `evicted`.
    #[serde(skip)]
    pub evicted_roots: Vec<EvictedRoot>,
    /// Drawables unregistered by this pass, roots and descendants.
    pub unregistered: usize,
    /// Registry entries whose drawable was no longer in the scene.
    pub orphans_dropped: usize,
}

/// Where an evicted subtree was painted before it left the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvictedRoot {
    pub id: DrawableId,
    /// Scene-space bounds at eviction time.
    pub bounds: Option<Rect>,
    /// The root or one of its ancestors was in the static layer.
    pub is_static: bool,
}

#[derive(Clone, Copy, Debug)]
struct RegistryEntry {
    kind: PrimitiveKind,
    last_accessed: f64,
    cost: usize,
    grid: bool,
    seq: u64,
}

/// Owner of the live-drawable registry and the per-kind object pools of one canvas session.
pub struct MemoryManager {
    clock: Rc<dyn Clock>,
    registry: HashMap<DrawableId, RegistryEntry>,
    pools: BTreeMap<PrimitiveKind, ObjectPool>,
    next_seq: u64,
    gc_runs: u64,
    untracked_disposed: u64,
}

impl std::fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryManager")
            .field("objects", &self.registry.len())
            .field("pools", &self.pools.len())
            .field("gc_runs", &self.gc_runs)
            .finish_non_exhaustive()
    }
}

impl MemoryManager {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            registry: HashMap::new(),
            pools: BTreeMap::new(),
            next_seq: 0,
            gc_runs: 0,
            untracked_disposed: 0,
        }
    }

    /// Adds one node (not its children) with `lastAccessed = now`. Re-registering refreshes it.
    pub fn register_object(&mut self, d: &Drawable) {
        let now = self.clock.now_ms();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.registry.insert(
            d.id,
            RegistryEntry {
                kind: d.kind,
                last_accessed: now,
                cost: estimated_cost(d.kind, d.text.len(), d.children.len()),
                grid: d.tags.grid,
                seq,
            },
        );
    }

    /// Registers a subtree in pre-order.
    pub fn register_tree(&mut self, root: &Drawable) -> usize {
        let mut n = 0;
        root.visit(&mut |d| {
            self.register_object(d);
            n += 1;
        });
        n
    }

    /// Removes one node. Returns whether it was registered.
    pub fn unregister_object(&mut self, id: DrawableId) -> bool {
        self.registry.remove(&id).is_some()
    }

    /// Unregisters a subtree. Returns how many nodes were registered.
    pub fn unregister_tree(&mut self, root: &Drawable) -> usize {
        let mut n = 0;
        root.visit(&mut |d| {
            if self.registry.remove(&d.id).is_some() {
                n += 1;
            }
        });
        n
    }

    pub fn is_registered(&self, id: DrawableId) -> bool {
        self.registry.contains_key(&id)
    }

    pub fn object_count(&self) -> usize {
        self.registry.len()
    }

    pub fn last_accessed(&self, id: DrawableId) -> Option<f64> {
        self.registry.get(&id).map(|e| e.last_accessed)
    }

    /// Refreshes access recency. Returns whether `id` is registered.
    pub fn mark_accessed(&mut self, id: DrawableId) -> bool {
        let now = self.clock.now_ms();
        match self.registry.get_mut(&id) {
            Some(e) => {
                e.last_accessed = now;
                true
            }
            None => false,
        }
    }

    /// Creates (or re-bounds) the pool for `kind`.
    pub fn initialize_pool(&mut self, kind: PrimitiveKind, opts: PoolOpts) {
        match self.pools.get_mut(&kind) {
            Some(pool) => pool.resize(opts.max_size),
            None => {
                self.pools.insert(kind, ObjectPool::new(kind, opts));
            }
        }
    }

    pub fn has_pool(&self, kind: PrimitiveKind) -> bool {
        self.pools.contains_key(&kind)
    }

    /// An idle instance of `kind`, or `None` if the pool is empty or missing.
    pub fn acquire(&mut self, kind: PrimitiveKind) -> Option<PooledObject> {
        let now = self.clock.now_ms();
        self.pools.get_mut(&kind)?.acquire(now)
    }

    /// Returns a detached subtree to the pools, children first, each under its own kind.
    pub fn release(&mut self, drawable: Drawable) {
        let kind = drawable.kind;
        self.release_to(drawable, kind);
    }

    /// Returns a detached subtree to the pools, the root under `kind`.
    ///
    /// A still-registered node is unregistered first so the live count never drifts.
    pub fn release_to(&mut self, mut drawable: Drawable, kind: PrimitiveKind) {
        for child in std::mem::take(&mut drawable.children) {
            self.release(child);
        }
        if self.registry.remove(&drawable.id).is_some() {
            tracing::warn!(id = %drawable.id, "released a drawable that was still registered");
        }
        let now = self.clock.now_ms();
        match self.pools.get_mut(&kind) {
            Some(pool) => {
                if pool.release(drawable, now) == ReleaseOutcome::Disposed {
                    tracing::trace!(?kind, "pool full, disposed drawable");
                }
            }
            None => self.untracked_disposed += 1,
        }
    }

    /// Evicts every registered, non-grid drawable idle for longer than `staleness_ms` whose whole
    /// subtree is likewise idle and unprotected. Evicted subtrees are detached from `store` and
    /// released to their pools.
    #[tracing::instrument(skip(self, store, protected), fields(objects = self.registry.len()))]
    pub fn force_gc(
        &mut self,
        store: &mut dyn DrawableStore,
        staleness_ms: f64,
        protected: &HashSet<DrawableId>,
    ) -> GcReport {
        self.gc_runs += 1;
        let now = self.clock.now_ms();
        let eligible = |e: &RegistryEntry, id: &DrawableId| {
            !e.grid && now - e.last_accessed > staleness_ms && !protected.contains(id)
        };

        let mut candidates: Vec<(u64, DrawableId)> = self
            .registry
            .iter()
            .filter(|(id, e)| eligible(*e, *id))
            .map(|(id, e)| (e.seq, *id))
            .collect();
        candidates.sort_unstable();

        let mut report = GcReport::default();
        for (_, id) in candidates {
            if !self.registry.contains_key(&id) {
                continue;
            }
            let Some(subtree) = store.subtree_ids(id) else {
                tracing::warn!(%id, "gc: registered drawable missing from scene, dropping entry");
                self.registry.remove(&id);
                report.orphans_dropped += 1;
                continue;
            };
            let all_idle = subtree.iter().all(|sid| match self.registry.get(sid) {
                Some(e) => eligible(e, sid),
                None => true,
            });
            if !all_idle {
                continue;
            }
            let bounds = store.world_bounds(id);
            let is_static = store.is_static(id);
            let Some(root) = store.detach(id) else {
                tracing::warn!(%id, "gc: drawable could not be detached, skipping");
                continue;
            };
            report.unregistered += self.unregister_tree(&root);
            report.evicted.push(id);
            report.evicted_roots.push(EvictedRoot {
                id,
                bounds,
                is_static,
            });
            self.release(root);
        }
        tracing::debug!(
            evicted = report.evicted.len(),
            unregistered = report.unregistered,
            "gc pass complete"
        );
        report
    }

    pub fn gc_runs(&self) -> u64 {
        self.gc_runs
    }

    pub fn pool_stats(&self, kind: PrimitiveKind) -> Option<PoolStats> {
        let pool = self.pools.get(&kind)?;
        let live = self.registry.values().filter(|e| e.kind == kind).count();
        Some(PoolStats {
            live,
            ..pool.stats()
        })
    }

    pub fn get_stats(&self) -> MemoryStats {
        let live_bytes: usize = self.registry.values().map(|e| e.cost).sum();
        let pooled_bytes: usize = self
            .pools
            .values()
            .map(|p| p.len() * estimated_cost(p.kind(), 0, 0))
            .sum();
        MemoryStats {
            object_count: self.registry.len(),
            estimated_memory_usage: live_bytes + pooled_bytes,
            active_pool_size: self
                .registry
                .values()
                .filter(|e| self.pools.contains_key(&e.kind))
                .count(),
            inactive_pool_size: self.pools.values().map(ObjectPool::len).sum(),
            gc_runs: self.gc_runs,
            timestamp: self.clock.now_ms(),
        }
    }

    /// Drops every registry entry and disposes every pooled object.
    pub fn drain_all(&mut self) -> usize {
        self.registry.clear();
        self.pools.values_mut().map(ObjectPool::drain).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/memory/manager.rs"]
mod tests;
