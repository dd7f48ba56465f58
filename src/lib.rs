#![forbid(unsafe_code)]

pub mod document;
pub mod foundation;
pub mod grid;
pub mod layout;
pub mod memory;
pub mod perf;
pub mod registry;
pub mod render;
pub mod scene;
pub mod session;
pub mod viewport;

pub use document::kind::ComponentKind;
pub use document::model::{Component, Section, SectionEntry, WireframeDocument};
pub use foundation::clock::{Clock, ManualClock, MonotonicClock};
pub use foundation::core::{DrawableId, Geometry, Rgba8, SessionId};
pub use foundation::error::{SceneError, SceneResult};
pub use grid::engine::{GridConfig, GridKind};
pub use layout::flow::DeviceType;
pub use memory::manager::{EvictedRoot, GcReport, MemoryManager, MemoryStats};
pub use memory::pool::{PoolOpts, PoolStats};
pub use perf::monitor::{PerfSample, PerfThresholds, PerfWarning, PerformanceMonitor};
pub use registry::{BuildContext, BuildFn, ComponentRegistry};
pub use render::optimizer::{FrameReport, RenderOpts, RenderingMetrics, SceneEvent};
pub use render::{CpuPainter, FrameRGBA, PaintBackend};
pub use scene::builder::{RenderOptions, RenderReport, SectionError, SectionErrorKind};
pub use scene::canvas::Canvas;
pub use scene::drawable::{Drawable, NodeRole, PrimitiveKind, Style, Tags};
pub use session::canvas_session::{CanvasSession, TickReport};
pub use session::config::SessionOpts;
pub use session::host::SessionHost;
