use super::*;

fn mono(s: &str) -> MarkshotResult<f64> {
    Ok(s.chars().count() as f64 * 10.0)
}

#[test]
fn wraps_greedily_by_width() {
    let lines = wrap_words("aa bb cc dd", 50.0, mono).unwrap();
    assert_eq!(lines, vec!["aa bb", "cc dd"]);
    for l in &lines {
        assert!(mono(l).unwrap() <= 50.0);
    }
}

#[test]
fn oversized_word_gets_its_own_line() {
    let lines = wrap_words("a enormousword b", 50.0, mono).unwrap();
    assert_eq!(lines, vec!["a", "enormousword", "b"]);
}

#[test]
fn leading_oversized_word_does_not_emit_empty_line() {
    let lines = wrap_words("enormousword b", 50.0, mono).unwrap();
    assert_eq!(lines, vec!["enormousword", "b"]);
}

#[test]
fn collapses_whitespace_and_handles_empty() {
    assert_eq!(
        wrap_words("  x \t y  ", 100.0, mono).unwrap(),
        vec!["x y"]
    );
    assert!(wrap_words("   ", 100.0, mono).unwrap().is_empty());
}

#[test]
fn measurement_errors_propagate() {
    let err = wrap_words("a b", 10.0, |_| {
        Err(crate::foundation::error::MarkshotError::render("no font"))
    });
    assert!(err.is_err());
}
