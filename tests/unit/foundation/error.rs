use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MarkshotError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MarkshotError::render("x").to_string().contains("render error:"));
    assert!(MarkshotError::encode("x").to_string().contains("encode error:"));
    assert_eq!(MarkshotError::Cancelled.to_string(), "render cancelled");
}

#[test]
fn unsupported_encoder_lists_candidates() {
    let err = MarkshotError::UnsupportedEncoder {
        candidates: vec!["video/webm;codecs=vp9".to_owned(), "video/webm".to_owned()],
    };
    let msg = err.to_string();
    assert!(msg.contains("video/webm;codecs=vp9"));
    assert!(msg.contains(", video/webm"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MarkshotError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
