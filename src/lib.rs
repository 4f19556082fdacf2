//! `annowindow` - Windowed layout of annotated long-form text
//!
//! Turns a long document plus a flat list of possibly conflicting span
//! annotations into bounded sequences of renderable nodes, materializing only
//! a window of pages around the reader and keeping the scroll position
//! stable as that window moves.
//!
//! The pipeline, as run by [`LayoutEngine::layout`]:
//!
//! 1. [`annotation`]: validate and de-conflict annotations (once per load)
//! 2. [`window`]: pick the page window for the requested page
//! 3. [`document`]: slice the window's text out of the rope
//! 4. [`layout`]: build text/entity/section nodes and group them into chunks
//!
//! # Examples
//!
//! ```
//! use annowindow::{Annotation, LayoutEngine, LayoutOptions};
//!
//! let mut engine = LayoutEngine::new(LayoutOptions::default()).unwrap();
//! engine.load("Alice met Bob.", &[
//!     Annotation::new("a", 0, 5, "PER"),
//!     Annotation::new("b", 10, 13, "PER"),
//! ]);
//! let output = engine.layout(1);
//! assert_eq!(output.node_count(), 4);
//! assert_eq!(output.text(), "Alice met Bob.");
//! ```

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Pixel offsets to page indices
#![allow(clippy::cast_sign_loss)] // Offsets are clamped non-negative first
#![allow(clippy::cast_precision_loss)] // Page counts and color math as f64/f32
#![allow(clippy::cast_possible_wrap)] // Page numbers fit in i64
#![allow(clippy::module_name_repetitions)] // Allow WindowConfig in window etc
#![allow(clippy::missing_errors_doc)] // Errors are config validation only
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::float_cmp)] // Exact comparisons in tests are intentional
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::must_use_candidate)] // Not every accessor needs it
#![allow(clippy::option_if_let_else)] // match is clearer for small branches

pub mod annotation;
pub mod color;
pub mod document;
pub mod engine;
pub mod error;
pub mod event;
pub mod layout;
pub mod taxonomy;
pub mod unicode;
pub mod window;

// Re-export core types at crate root
pub use annotation::{Annotation, Diagnostic, DiagnosticKind, Diagnostics, Span};
pub use color::Rgba;
pub use document::Document;
pub use engine::{LayoutEngine, LayoutOptions, LayoutOutput};
pub use error::{Error, Result};
pub use event::{LogLevel, emit_event, emit_log, set_event_callback, set_log_callback};
pub use layout::{Chunk, ChunkBoundary, ChunkLimits, Node, NodeKind};
pub use taxonomy::{ColorCache, EntityStyle, Taxonomy, TaxonomyEntry};
pub use window::{
    RenderedMeasurement, ScrollConfig, ScrollMetrics, Window, WindowConfig, WindowController,
    WindowTransition, compute_window,
};
