//! Greedy word wrapping against a measured surface width.

/// Two-character token (`\` followed by `n`) that forces a line break.
pub const ESCAPED_NEWLINE: &str = "\\n";

/// Splits `text` into display lines no wider than `max_width`.
///
/// Hard breaks come from [`ESCAPED_NEWLINE`]. Inside a hard line words are
/// separated by single spaces and packed greedily while
/// `measure(line + " " + word) < max_width`. Words are never split, so a
/// single word wider than the surface still yields one line.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    for hard_line in text.split(ESCAPED_NEWLINE) {
        // `split` always yields at least one (possibly empty) word.
        let mut words = hard_line.split(' ');
        let mut current = words.next().unwrap_or_default().to_string();
        for word in words {
            let candidate = format!("{current} {word}");
            if measure(&candidate) < max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }
    lines
}
