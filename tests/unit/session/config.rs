use super::*;
use crate::grid::engine::GridKind;

#[test]
fn defaults_match_documented_values() {
    let o = SessionOpts::default();
    assert_eq!((o.canvas_width, o.canvas_height), (1200.0, 800.0));
    assert_eq!(o.pool.max_size, 256);
    assert_eq!(o.gc.interval_ms, 30_000.0);
    assert_eq!(o.gc.staleness_ms, 60_000.0);
    assert_eq!(o.render.metrics_interval_ms, 1000.0);
    assert!(o.render.static_cache && o.render.incremental);
    assert_eq!(o.grid.kind, GridKind::Lines);
    assert!(!o.grid.visible && !o.snap_enabled);
    assert_eq!(o.perf.history_len, 120);
    o.validate().unwrap();
}

#[test]
fn partial_json_fills_in_defaults() {
    let o = SessionOpts::from_json_str(
        r##"{
            "canvasWidth": 800,
            "grid": {"type": "dots", "size": 10, "color": "#ff0000"},
            "pool": {"maxSize": 8}
        }"##,
    )
    .unwrap();
    assert_eq!(o.canvas_width, 800.0);
    assert_eq!(o.canvas_height, 800.0);
    assert_eq!(o.grid.kind, GridKind::Dots);
    assert_eq!(o.grid.size, 10.0);
    assert_eq!(o.pool.max_size, 8);
    assert_eq!(o.gc, GcOpts::default());
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        SessionOpts::from_json_str(r#"{"canvasWidth": 0}"#),
        Err(SceneError::Config(_))
    ));
    assert!(matches!(
        SessionOpts::from_json_str(r#"{"grid": {"size": -4}}"#),
        Err(SceneError::Config(_))
    ));
    assert!(matches!(
        SessionOpts::from_json_str(r#"{"gc": {"intervalMs": 0}}"#),
        Err(SceneError::Config(_))
    ));
    assert!(matches!(
        SessionOpts::from_json_str("[1, 2]"),
        Err(SceneError::Config(_))
    ));
}

#[test]
fn overrides_ignore_garbage_and_zero() {
    let vars = |key: &str| -> Option<String> {
        match key {
            "WIRESCENE_POOL_MAX_SIZE" => Some("12".into()),
            "WIRESCENE_GC_INTERVAL_MS" => Some("0".into()),
            "WIRESCENE_GC_STALENESS_MS" => Some("soon".into()),
            "WIRESCENE_METRICS_INTERVAL_MS" => Some(" 250 ".into()),
            _ => None,
        }
    };
    let o = SessionOpts::default().with_overrides(vars);
    assert_eq!(o.pool.max_size, 12);
    assert_eq!(o.gc.interval_ms, 30_000.0);
    assert_eq!(o.gc.staleness_ms, 60_000.0);
    assert_eq!(o.render.metrics_interval_ms, 250.0);
}
