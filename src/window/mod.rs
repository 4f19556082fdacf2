//! Page windowing and scroll handling.
//!
//! Key types:
//!
//! - [`Window`]: materialized page range of a document
//! - [`WindowConfig`]: page size, window size, and buffer
//! - [`ScrollReconciler`]: keeps content in view across window changes
//! - [`WindowController`]: debounced scroll samples in, window transitions out

mod controller;
mod debounce;
mod manager;
mod scroll;

pub use controller::{ScrollConfig, WindowController, WindowTransition, page_at_scroll};
pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use manager::{Window, WindowConfig, compute_window, total_pages};
pub use scroll::{
    DEFAULT_GUARD_INTERVAL, RenderedMeasurement, ScrollAnchor, ScrollMetrics, ScrollPhase,
    ScrollReconciler, estimate_scroll_top, reconcile_scroll_top,
};
