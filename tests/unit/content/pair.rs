use super::*;

#[test]
fn seed_is_lowercased_and_whitespace_normalized() {
    let pair = ContentPair::new("  What IS\tRust? ", "A  systems\nlanguage.");
    assert_eq!(pair.seed(), "what is rust? -a systems language.");
}

#[test]
fn seed_is_stable_for_equivalent_spacing() {
    let a = ContentPair::new("Hi there", "Yes");
    let b = ContentPair::new("hi   there", "YES");
    assert_eq!(a.seed(), b.seed());
}

#[test]
fn empty_question_is_a_config_error() {
    let err = ContentPair::new("   ", "answer").validate().unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
    assert!(ContentPair::new("q", "").validate().is_ok());
}
