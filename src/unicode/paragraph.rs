//! Paragraph break detection.

/// Unicode PARAGRAPH SEPARATOR.
pub const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// Check whether `text` ends with a paragraph break.
///
/// A paragraph break is a trailing U+2029, or two or more trailing line
/// feeds separated only by carriage returns, spaces, or tabs.
#[must_use]
pub fn ends_with_paragraph_break(text: &str) -> bool {
    let mut newlines = 0;
    for ch in text.chars().rev() {
        match ch {
            PARAGRAPH_SEPARATOR if newlines == 0 => return true,
            '\n' => {
                newlines += 1;
                if newlines >= 2 {
                    return true;
                }
            }
            '\r' | ' ' | '\t' => {}
            _ => return false,
        }
    }
    false
}
