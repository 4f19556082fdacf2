//! Rope-backed document text.

use crate::annotation::{Annotation, Span};
use crate::layout::entities_within;
use crate::window::Window;
use ropey::Rope;
use std::ops::Range;

/// Full document text with a change counter.
///
/// Offsets are code points throughout. Slicing is O(log n) in the document
/// length, so materializing a window of a large document does not scan the
/// text before it.
#[derive(Clone, Debug, Default)]
pub struct Document {
    rope: Rope,
    revision: u64,
}

impl Document {
    /// Create a document from a string.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            revision: 0,
        }
    }

    /// Length in code points.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Length in UTF-8 bytes.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Revision counter (increments on every text replacement).
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the whole text.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.revision = self.revision.wrapping_add(1);
    }

    /// Copy out a code-point range, clamped to the document.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let end = range.end.min(len);
        let start = range.start.min(end);
        self.rope
            .get_slice(start..end)
            .map(String::from)
            .unwrap_or_default()
    }

    /// Text covered by `window`.
    #[must_use]
    pub fn window_text(&self, window: &Window) -> String {
        self.slice(window.span().range())
    }

    /// Restrict resolved annotations to a window.
    ///
    /// `annotations` must be start-ascending and non-overlapping. Spans
    /// crossing a window edge are clipped to the window.
    #[must_use]
    pub fn annotations_in(annotations: &[Annotation], window: &Window) -> Vec<Annotation> {
        entities_within(annotations, window.span())
    }

    /// Whole-document span.
    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(0, self.len_chars())
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}
