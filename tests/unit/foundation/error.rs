use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::audio("x").to_string().contains("audio error:"));
    assert!(ReelError::encode("x").to_string().contains("encode error:"));
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(ReelError::Cancelled.to_string(), "render cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn classes_follow_handling_policy() {
    assert_eq!(ReelError::config("x").class(), ErrorClass::Configuration);
    assert_eq!(ReelError::validation("x").class(), ErrorClass::Configuration);
    assert_eq!(ReelError::audio("x").class(), ErrorClass::Degraded);
    assert_eq!(ReelError::encode("x").class(), ErrorClass::Fatal);
    assert_eq!(ReelError::Cancelled.class(), ErrorClass::Fatal);
}
