use crate::scene::drawable::{Drawable, PrimitiveKind};

/// Lifecycle position of a pooled object. Disposal is terminal and leaves no object behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolState {
    Active,
    Pooled,
}

/// A drawable plus its pool bookkeeping.
#[derive(Debug)]
pub struct PooledObject {
    pub drawable: Drawable,
    pub pool_key: PrimitiveKind,
    pub last_accessed: f64,
    pub state: PoolState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolOpts {
    /// Maximum number of idle objects retained in the free list.
    pub max_size: usize,
}

impl Default for PoolOpts {
    fn default() -> Self {
        Self { max_size: 256 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Idle objects in the free list.
    pub pooled: usize,
    /// Registered objects of this kind.
    pub live: usize,
    pub acquire_hits: u64,
    pub acquire_misses: u64,
    pub released: u64,
    pub disposed: u64,
}

/// Outcome of handing an object back to its pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Pooled,
    Disposed,
}

/// Bounded free list of reusable drawables of one primitive kind.
#[derive(Debug)]
pub struct ObjectPool {
    kind: PrimitiveKind,
    free_list: Vec<PooledObject>,
    max_size: usize,
    stats: PoolStats,
}

impl ObjectPool {
    pub fn new(kind: PrimitiveKind, opts: PoolOpts) -> Self {
        Self {
            kind,
            free_list: Vec::with_capacity(opts.max_size.min(64)),
            max_size: opts.max_size,
            stats: PoolStats::default(),
        }
    }

    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free_list.is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            pooled: self.free_list.len(),
            ..self.stats
        }
    }

    /// Pops an idle object, or `None` when the pool is empty; the caller then allocates.
    pub fn acquire(&mut self, now_ms: f64) -> Option<PooledObject> {
        match self.free_list.pop() {
            Some(mut obj) => {
                obj.state = PoolState::Active;
                obj.last_accessed = now_ms;
                self.stats.acquire_hits += 1;
                Some(obj)
            }
            None => {
                self.stats.acquire_misses += 1;
                None
            }
        }
    }

    /// Resets `drawable` and keeps it if there is room, otherwise drops it.
    ///
    /// `drawable` must have no children left.
    pub fn release(&mut self, mut drawable: Drawable, now_ms: f64) -> ReleaseOutcome {
        self.stats.released += 1;
        if self.free_list.len() >= self.max_size {
            self.stats.disposed += 1;
            return ReleaseOutcome::Disposed;
        }
        drawable.reset();
        drawable.kind = self.kind;
        self.free_list.push(PooledObject {
            drawable,
            pool_key: self.kind,
            last_accessed: now_ms,
            state: PoolState::Pooled,
        });
        ReleaseOutcome::Pooled
    }

    /// Disposes every idle object. Returns how many were dropped.
    pub fn drain(&mut self) -> usize {
        let n = self.free_list.len();
        self.free_list.clear();
        self.free_list.shrink_to_fit();
        self.stats.disposed += n as u64;
        n
    }

    /// Changes the retention bound, disposing any excess.
    pub fn resize(&mut self, max_size: usize) {
        self.max_size = max_size;
        while self.free_list.len() > max_size {
            self.free_list.pop();
            self.stats.disposed += 1;
        }
    }
}
