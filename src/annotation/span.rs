//! Spans and annotations over code-point offsets.

use crate::annotation::{AnnotationResolver, DiagnosticKind};
use crate::error::{Error, Result};
use std::fmt;
use std::ops::Range;

/// Half-open range `[start, end)` over code-point offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Create a span without checking `start <= end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span, rejecting `start > end`.
    pub fn try_new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidSpan { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `start <= end`.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Length in code points (zero for inverted spans).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this span contains a position.
    #[must_use]
    pub const fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Check if `other` lies entirely inside this span.
    #[must_use]
    pub const fn encloses(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Check if the two spans share at least one position.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The overlapping part of two spans, if any.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    /// As a standard range.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A typed span over the document, supplied by the caller.
///
/// Annotations are read-only input to a layout pass. The `payload` is
/// carried through to entity nodes untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    /// Identifier, unique per document.
    pub id: String,
    /// Covered code-point range.
    pub span: Span,
    /// Semantic type, e.g. an entity label such as `PER`.
    pub kind: String,
    /// Opaque caller data.
    pub payload: Option<String>,
}

impl Annotation {
    /// Create an annotation without payload.
    #[must_use]
    pub fn new(id: impl Into<String>, start: usize, end: usize, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            span: Span::new(start, end),
            kind: kind.into(),
            payload: None,
        }
    }

    /// Attach an opaque payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.span.start
    }

    /// End offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.span.end
    }

    /// Malformed-input check against a document of `document_len` code
    /// points: inverted, empty, then out-of-bounds.
    #[must_use]
    pub fn validate(&self, document_len: usize) -> Option<DiagnosticKind> {
        AnnotationResolver::new()
            .with_document_len(document_len)
            .validate(self)
    }

    /// Copy of this annotation with its span cut down to `bounds`.
    ///
    /// Returns `None` when the annotation lies entirely outside `bounds`.
    #[must_use]
    pub fn clipped_to(&self, bounds: Span) -> Option<Self> {
        let span = self.span.intersection(&bounds)?;
        Some(Self {
            span,
            ..self.clone()
        })
    }
}
