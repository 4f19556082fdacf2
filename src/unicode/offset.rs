//! Translation between code-point offsets and host string indices.
//!
//! Annotation producers count Unicode code points. Rust strings are indexed
//! by UTF-8 byte, and some rendering hosts index by UTF-16 code unit. Every
//! function here clamps: an offset past the end of the text maps to the
//! text length in the target scheme.

use std::collections::HashMap;

/// Default number of code points between two [`OffsetIndex`] checkpoints.
pub const DEFAULT_CHECKPOINT_STRIDE: usize = 64;

/// Convert a code-point offset into a byte offset into `text`.
///
/// # Examples
///
/// ```
/// use annowindow::unicode::to_internal_index;
///
/// assert_eq!(to_internal_index(0, "héllo"), 0);
/// assert_eq!(to_internal_index(2, "héllo"), 3);
/// assert_eq!(to_internal_index(99, "héllo"), 6);
/// ```
#[must_use]
pub fn to_internal_index(external: usize, text: &str) -> usize {
    if external == 0 {
        return 0;
    }
    text.char_indices()
        .nth(external)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Convert a code-point offset into a UTF-16 code unit offset.
///
/// Characters outside the Basic Multilingual Plane occupy a surrogate pair
/// and advance the result by two.
#[must_use]
pub fn to_utf16_index(external: usize, text: &str) -> usize {
    text.chars().take(external).map(char::len_utf16).sum()
}

/// Convert a byte offset back into a code-point offset.
///
/// A byte offset inside a multi-byte character counts only the characters
/// that start before it.
#[must_use]
pub fn to_external_index(internal: usize, text: &str) -> usize {
    if internal >= text.len() {
        return text.chars().count();
    }
    text.char_indices()
        .take_while(|&(byte, _)| byte < internal)
        .count()
}

/// Checkpoint table for repeated code-point → byte lookups on one text.
///
/// The table stores the byte offset of every `stride`-th character, so a
/// lookup scans at most `stride - 1` characters. The index does not borrow
/// the text; callers pass the same text to every lookup.
#[derive(Clone, Debug)]
pub struct OffsetIndex {
    checkpoints: Vec<usize>,
    stride: usize,
    len_chars: usize,
    len_bytes: usize,
}

impl OffsetIndex {
    /// Build an index with the default stride.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self::with_stride(text, DEFAULT_CHECKPOINT_STRIDE)
    }

    /// Build an index with an explicit stride (clamped to at least 1).
    #[must_use]
    pub fn with_stride(text: &str, stride: usize) -> Self {
        let stride = stride.max(1);
        let mut checkpoints = Vec::with_capacity(text.len() / stride + 1);
        let mut len_chars = 0;
        for (i, (byte, _)) in text.char_indices().enumerate() {
            if i % stride == 0 {
                checkpoints.push(byte);
            }
            len_chars += 1;
        }
        Self {
            checkpoints,
            stride,
            len_chars,
            len_bytes: text.len(),
        }
    }

    /// Number of code points in the indexed text.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    /// Number of bytes in the indexed text.
    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.len_bytes
    }

    /// Byte offset of the code point at `external`, clamped to the text end.
    #[must_use]
    pub fn byte_offset(&self, text: &str, external: usize) -> usize {
        debug_assert_eq!(text.len(), self.len_bytes, "index built for other text");
        if external >= self.len_chars {
            return self.len_bytes;
        }
        let checkpoint = external / self.stride;
        let base = self.checkpoints[checkpoint];
        let remainder = external % self.stride;
        text[base..]
            .char_indices()
            .nth(remainder)
            .map_or(self.len_bytes, |(byte, _)| base + byte)
    }

    /// Slice `text` by a code-point range, clamping both ends.
    #[must_use]
    pub fn slice<'t>(&self, text: &'t str, start: usize, end: usize) -> &'t str {
        let start_byte = self.byte_offset(text, start);
        let end_byte = self.byte_offset(text, end.max(start));
        &text[start_byte..end_byte]
    }
}

/// Identity of a text slice inside a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SliceKey {
    /// Revision of the document the slice was taken from.
    pub revision: u64,
    /// First code point of the slice.
    pub start: usize,
    /// End (exclusive) code point of the slice.
    pub end: usize,
}

/// Caller-owned memo of [`OffsetIndex`] tables.
///
/// The cache holds at most `capacity` tables. Inserting into a full cache
/// clears it first, so memory stays bounded without per-entry bookkeeping.
#[derive(Clone, Debug)]
pub struct OffsetCache {
    entries: HashMap<SliceKey, OffsetIndex>,
    capacity: usize,
}

impl Default for OffsetCache {
    fn default() -> Self {
        Self::with_capacity(16)
    }
}

impl OffsetCache {
    /// Create an empty cache with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache holding at most `capacity` tables.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Return the index for `key`, building it from `text` on a miss.
    pub fn get_or_build(&mut self, key: SliceKey, text: &str) -> &OffsetIndex {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries
            .entry(key)
            .or_insert_with(|| OffsetIndex::new(text))
    }

    /// Drop every cached table.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
