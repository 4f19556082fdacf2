//! Canonical ordering and conflict resolution for annotation sets.
//!
//! The node builder needs a start-ascending list in which no two
//! annotations share a position. [`order`] produces one by sorting and then
//! discarding every annotation that collides with the previous survivor.
//! Discards are final for the pass: nothing is merged, split, or retried.

use crate::annotation::diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::annotation::span::Annotation;
use std::cmp::Ordering;

/// Sort key: ascending start, then descending end (parents first).
#[must_use]
pub fn canonical_order(a: &Annotation, b: &Annotation) -> Ordering {
    a.start().cmp(&b.start()).then_with(|| b.end().cmp(&a.end()))
}

/// Classify `ann` against the previous surviving annotation.
///
/// `ann` must not sort before `prev` under [`canonical_order`].
#[must_use]
pub fn classify(prev: &Annotation, ann: &Annotation) -> Option<DiagnosticKind> {
    let (ps, pe) = (prev.start(), prev.end());
    let (s, e) = (ann.start(), ann.end());

    if s >= pe {
        None
    } else if s == ps && e == pe {
        Some(DiagnosticKind::Duplicate)
    } else if (s >= ps && e < pe) || (s > ps && e <= pe) {
        Some(DiagnosticKind::Nested)
    } else {
        Some(DiagnosticKind::Overlapping)
    }
}

/// Order annotations and drop every conflicting or malformed one.
///
/// Inverted and empty spans are rejected before sorting. The output satisfies
/// `out[i].end <= out[i + 1].start` for every `i`.
#[must_use]
pub fn order(annotations: &[Annotation], diagnostics: &mut Diagnostics) -> Vec<Annotation> {
    AnnotationResolver::new().resolve(annotations, diagnostics)
}

/// Conflict resolver with optional document bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnnotationResolver {
    document_len: Option<usize>,
}

impl AnnotationResolver {
    /// Resolver without a bounds check.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also reject annotations that end past `len` code points.
    #[must_use]
    pub fn with_document_len(mut self, len: usize) -> Self {
        self.document_len = Some(len);
        self
    }

    /// Malformed-input check for a single annotation.
    #[must_use]
    pub fn validate(&self, annotation: &Annotation) -> Option<DiagnosticKind> {
        if !annotation.span.is_well_formed() {
            Some(DiagnosticKind::InvertedSpan)
        } else if annotation.span.is_empty() {
            Some(DiagnosticKind::EmptySpan)
        } else if self.document_len.is_some_and(|len| annotation.end() > len) {
            Some(DiagnosticKind::OutOfBounds)
        } else {
            None
        }
    }

    /// Validate, sort, and de-conflict `annotations`.
    #[must_use]
    pub fn resolve(
        &self,
        annotations: &[Annotation],
        diagnostics: &mut Diagnostics,
    ) -> Vec<Annotation> {
        let mut candidates: Vec<&Annotation> = Vec::with_capacity(annotations.len());
        for ann in annotations {
            match self.validate(ann) {
                Some(kind) => diagnostics.report(Diagnostic::new(kind, ann)),
                None => candidates.push(ann),
            }
        }
        candidates.sort_by(|a, b| canonical_order(a, b));

        let mut out: Vec<Annotation> = Vec::with_capacity(candidates.len());
        for ann in candidates {
            if let Some(prev) = out.last() {
                if let Some(kind) = classify(prev, ann) {
                    diagnostics.report(Diagnostic::conflict(kind, ann, prev));
                    continue;
                }
            }
            out.push(ann.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann(id: &str, start: usize, end: usize) -> Annotation {
        Annotation::new(id, start, end, "X")
    }

    fn ids(anns: &[Annotation]) -> Vec<&str> {
        anns.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_disjoint_are_sorted() {
        let mut diags = Diagnostics::new();
        let out = order(&[ann("b", 5, 7), ann("a", 1, 3), ann("c", 7, 9)], &mut diags);
        assert_eq!(ids(&out), vec!["a", "b", "c"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_nested_is_discarded() {
        let mut diags = Diagnostics::new();
        let out = order(&[ann("outer", 1, 4), ann("inner", 2, 3)], &mut diags);
        assert_eq!(ids(&out), vec!["outer"]);
        assert_eq!(diags.count(DiagnosticKind::Nested), 1);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.annotation_id, "inner");
        assert_eq!(diag.conflicting_id.as_deref(), Some("outer"));
    }

    #[test]
    fn test_parent_first_for_equal_start() {
        let mut diags = Diagnostics::new();
        // The shorter span comes first in the input but the longer one wins.
        let out = order(&[ann("short", 2, 4), ann("long", 2, 9)], &mut diags);
        assert_eq!(ids(&out), vec!["long"]);
        assert_eq!(diags.count(DiagnosticKind::Nested), 1);
    }

    #[test]
    fn test_nested_sharing_end() {
        let mut diags = Diagnostics::new();
        let out = order(&[ann("outer", 0, 10), ann("tail", 6, 10)], &mut diags);
        assert_eq!(ids(&out), vec!["outer"]);
        assert_eq!(diags.count(DiagnosticKind::Nested), 1);
    }

    #[test]
    fn test_duplicate_keeps_first_in_input_order() {
        let mut diags = Diagnostics::new();
        let out = order(&[ann("first", 3, 6), ann("second", 3, 6)], &mut diags);
        assert_eq!(ids(&out), vec!["first"]);
        assert_eq!(diags.count(DiagnosticKind::Duplicate), 1);
    }

    #[test]
    fn test_overlapping_is_discarded() {
        let mut diags = Diagnostics::new();
        let out = order(&[ann("a", 0, 5), ann("b", 3, 8), ann("c", 8, 9)], &mut diags);
        assert_eq!(ids(&out), vec!["a", "c"]);
        assert_eq!(diags.count(DiagnosticKind::Overlapping), 1);
    }

    #[test]
    fn test_conflicts_checked_against_survivor_only() {
        let mut diags = Diagnostics::new();
        // "b" is discarded; "c" overlaps "b" but not the survivor "a".
        let out = order(&[ann("a", 0, 4), ann("b", 2, 7), ann("c", 5, 9)], &mut diags);
        assert_eq!(ids(&out), vec!["a", "c"]);
    }

    #[test]
    fn test_adjacent_is_disjoint() {
        let prev = ann("a", 0, 4);
        assert_eq!(classify(&prev, &ann("b", 4, 6)), None);
    }

    #[test]
    fn test_malformed_rejected() {
        let mut diags = Diagnostics::new();
        let resolver = AnnotationResolver::new().with_document_len(10);
        let out = resolver.resolve(
            &[ann("inv", 5, 2), ann("empty", 3, 3), ann("far", 8, 12), ann("ok", 0, 2)],
            &mut diags,
        );
        assert_eq!(ids(&out), vec!["ok"]);
        assert_eq!(diags.count(DiagnosticKind::InvertedSpan), 1);
        assert_eq!(diags.count(DiagnosticKind::EmptySpan), 1);
        assert_eq!(diags.count(DiagnosticKind::OutOfBounds), 1);
    }
}
