use super::*;

fn sample(t: f64, fps: f64, bytes: usize) -> PerfSample {
    PerfSample {
        timestamp_ms: t,
        rendering: RenderingMetrics {
            frame_rate: fps,
            render_time: 2.0,
            object_count: 10,
        },
        memory: MemoryStats {
            estimated_memory_usage: bytes,
            timestamp: t,
            ..MemoryStats::default()
        },
    }
}

#[test]
fn history_is_bounded_and_ordered() {
    let mut m = PerformanceMonitor::new(PerfThresholds {
        history_len: 3,
        ..PerfThresholds::default()
    });
    for i in 0..5 {
        m.record(sample(f64::from(i) * 1000.0, 60.0, 1024));
    }
    let ts: Vec<f64> = m.history().map(|s| s.timestamp_ms).collect();
    assert_eq!(ts, vec![2000.0, 3000.0, 4000.0]);
    assert_eq!(m.latest().map(|s| s.timestamp_ms), Some(4000.0));
    assert_eq!(m.drain().len(), 3);
    assert!(m.is_empty());
}

#[test]
fn threshold_breaches_are_reported() {
    let mut m = PerformanceMonitor::new(PerfThresholds {
        min_frame_rate: 30.0,
        memory_budget_bytes: 1000,
        history_len: 10,
    });
    assert!(m.record(sample(0.0, 60.0, 500)).is_empty());
    let w = m.record(sample(1000.0, 12.0, 4000));
    assert_eq!(
        w,
        vec![
            PerfWarning::LowFrameRate {
                frame_rate: 12.0,
                min: 30.0
            },
            PerfWarning::MemoryOverBudget {
                bytes: 4000,
                budget: 1000
            },
        ]
    );
}

#[test]
fn idle_frames_are_not_slow_frames() {
    let mut m = PerformanceMonitor::new(PerfThresholds::default());
    assert!(m.record(sample(0.0, 0.0, 0)).is_empty());
}
