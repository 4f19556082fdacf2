//! Annotation model, validation, and conflict resolution.
//!
//! Key types:
//!
//! - [`Span`]: half-open code-point range
//! - [`Annotation`]: typed span with an id and opaque payload
//! - [`Diagnostics`]: discarded annotations, reported instead of failing
//!
//! # Examples
//!
//! ```
//! use annowindow::annotation::{Annotation, DiagnosticKind, Diagnostics, order};
//!
//! let mut diagnostics = Diagnostics::new();
//! let resolved = order(
//!     &[Annotation::new("a", 1, 4, "PER"), Annotation::new("b", 2, 3, "LOC")],
//!     &mut diagnostics,
//! );
//! assert_eq!(resolved.len(), 1);
//! assert_eq!(diagnostics.count(DiagnosticKind::Nested), 1);
//! ```

mod diagnostic;
mod resolve;
mod span;

pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use resolve::{AnnotationResolver, canonical_order, classify, order};
pub use span::{Annotation, Span};
