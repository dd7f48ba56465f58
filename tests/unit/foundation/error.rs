use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SceneError::malformed("x")
            .to_string()
            .contains("malformed document:")
    );
    assert!(
        SceneError::unknown_kind("x")
            .to_string()
            .contains("unknown component type:")
    );
    assert!(
        SceneError::render("x")
            .to_string()
            .contains("render failure:")
    );
    assert!(
        SceneError::backend("x")
            .to_string()
            .contains("backend error:")
    );
    assert!(SceneError::config("x").to_string().contains("config error:"));
    assert!(
        SceneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_convert() {
    let err: SceneError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, SceneError::Serde(_)));
}
