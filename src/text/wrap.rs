use crate::foundation::error::MarkshotResult;

/// Greedy word wrap by measured width.
///
/// Words are split on whitespace and re-joined with single spaces. A line never measures wider
/// than `max_width` unless it holds a single word that alone is wider; such a word gets its own
/// line.
pub fn wrap_words<F>(text: &str, max_width: f64, mut measure: F) -> MarkshotResult<Vec<String>>
where
    F: FnMut(&str) -> MarkshotResult<f64>,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&candidate)? > max_width {
            lines.push(std::mem::replace(&mut line, word.to_owned()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
