use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(FieldError::config("x").to_string().contains("config error:"));
    assert!(FieldError::frame("x").to_string().contains("frame error:"));
    assert!(
        FieldError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn only_config_errors_report_is_config() {
    assert!(FieldError::config("x").is_config());
    assert!(!FieldError::frame("x").is_config());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FieldError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
