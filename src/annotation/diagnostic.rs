//! Non-fatal diagnostics for discarded annotations.

use crate::annotation::span::{Annotation, Span};
use crate::event::{LogLevel, emit_log};
use std::fmt;

/// Why an annotation was dropped from a layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// `start > end`.
    InvertedSpan,
    /// `start == end`; nothing to render.
    EmptySpan,
    /// Ends past the document or the requested build range.
    OutOfBounds,
    /// Lies inside the previous surviving annotation.
    Nested,
    /// Same start and end as the previous surviving annotation.
    Duplicate,
    /// Starts inside the previous surviving annotation and ends after it.
    Overlapping,
    /// A section starting before the previous section ended.
    SectionOverlap,
}

impl DiagnosticKind {
    /// Short machine-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvertedSpan => "inverted",
            Self::EmptySpan => "empty",
            Self::OutOfBounds => "out-of-bounds",
            Self::Nested => "nested",
            Self::Duplicate => "duplicate",
            Self::Overlapping => "overlapping",
            Self::SectionOverlap => "section-overlap",
        }
    }
}

/// A discarded annotation and the reason it was discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub annotation_id: String,
    pub span: Span,
    /// The surviving annotation it collided with, for conflict kinds.
    pub conflicting_id: Option<String>,
}

impl Diagnostic {
    /// Diagnostic for a discarded annotation.
    #[must_use]
    pub fn new(kind: DiagnosticKind, annotation: &Annotation) -> Self {
        Self {
            kind,
            annotation_id: annotation.id.clone(),
            span: annotation.span,
            conflicting_id: None,
        }
    }

    /// Diagnostic for an annotation discarded in favour of `kept`.
    #[must_use]
    pub fn conflict(kind: DiagnosticKind, annotation: &Annotation, kept: &Annotation) -> Self {
        Self {
            conflicting_id: Some(kept.id.clone()),
            ..Self::new(kind, annotation)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "discarded {} annotation {} at {}",
            self.kind.name(),
            self.annotation_id,
            self.span
        )?;
        if let Some(other) = &self.conflicting_id {
            write!(f, " (conflicts with {other})")?;
        }
        Ok(())
    }
}

/// Diagnostics collected during one layout pass.
///
/// Every reported diagnostic is also forwarded to the log callback at
/// [`LogLevel::Warn`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        emit_log(LogLevel::Warn, &diagnostic.to_string());
        self.items.push(diagnostic);
    }

    /// Number of diagnostics of a given kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Iterate over the diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
