//! Event-loop driver tying windowing, debouncing, and scroll correction.
//!
//! A window change spans two ticks of the caller's event loop: a debounced
//! scroll sample changes the window (tick one), the caller renders the new
//! nodes, then reports measurements and commits the corrected offset
//! (tick two).

use crate::error::Result;
use crate::event::{EVENT_WINDOW_CHANGED, emit_event};
use crate::window::debounce::{DEFAULT_DEBOUNCE, Debouncer};
use crate::window::manager::{Window, WindowConfig};
use crate::window::scroll::{
    DEFAULT_GUARD_INTERVAL, RenderedMeasurement, ScrollAnchor, ScrollMetrics, ScrollPhase,
    ScrollReconciler,
};
use std::time::{Duration, Instant};

/// Timing parameters for scroll handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollConfig {
    /// Quiet period before a burst of scroll events is acted on.
    pub debounce: Duration,
    /// Period after a correction during which scroll events are ignored.
    pub guard_interval: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            guard_interval: DEFAULT_GUARD_INTERVAL,
        }
    }
}

impl ScrollConfig {
    /// Builder-style debounce setter.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Builder-style guard interval setter.
    #[must_use]
    pub const fn with_guard_interval(mut self, guard_interval: Duration) -> Self {
        self.guard_interval = guard_interval;
        self
    }
}

/// A window change the caller must render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowTransition {
    pub previous: Window,
    pub current: Window,
    pub requested_page: usize,
    /// First-phase scroll offset to apply right away, if any.
    pub estimated_scroll_top: Option<f64>,
    /// Page whose top the caller should measure after rendering.
    pub anchor_page: Option<usize>,
}

/// Page under the middle of the viewport, assuming pages of equal height.
#[must_use]
pub fn page_at_scroll(metrics: &ScrollMetrics, window: &Window) -> Option<usize> {
    if !metrics.is_measured() {
        return None;
    }
    let page_height = metrics.average_page_height(window);
    let center = metrics.scroll_top.max(0.0) + metrics.client_height.max(0.0) / 2.0;
    let index = ((center / page_height).floor() as usize).min(window.page_count() - 1);
    Some(window.start_page + index)
}

/// Stateful window driver for one document.
#[derive(Clone, Debug)]
pub struct WindowController {
    config: WindowConfig,
    document_length: usize,
    window: Window,
    requested_page: usize,
    debouncer: Debouncer<ScrollMetrics>,
    reconciler: ScrollReconciler,
}

impl WindowController {
    /// Create a controller showing the first page.
    pub fn new(config: WindowConfig, scroll: ScrollConfig, document_length: usize) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            document_length,
            window: config.window_for(1, document_length),
            requested_page: 1,
            debouncer: Debouncer::new(scroll.debounce),
            reconciler: ScrollReconciler::new(scroll.guard_interval),
        })
    }

    /// Currently materialized window.
    #[must_use]
    pub const fn window(&self) -> Window {
        self.window
    }

    /// Last requested page.
    #[must_use]
    pub const fn requested_page(&self) -> usize {
        self.requested_page
    }

    /// Reconciler phase.
    #[must_use]
    pub const fn phase(&self) -> ScrollPhase {
        self.reconciler.phase()
    }

    /// When the pending scroll sample becomes ready to poll.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Switch to a document of a different length, keeping the requested
    /// page and abandoning any pending change.
    pub fn set_document_length(&mut self, document_length: usize) -> Window {
        self.document_length = document_length;
        self.debouncer.cancel();
        self.reconciler.cancel();
        self.window = self.config.window_for(self.requested_page, document_length);
        self.window
    }

    /// Feed a scroll sample. Returns `false` if it was ignored because a
    /// correction is in progress or the guard interval is running.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> bool {
        if !self.reconciler.accepts_scroll_trigger(now) {
            return false;
        }
        self.debouncer.trigger(now, metrics);
        true
    }

    /// Act on the debounced scroll sample, if one is ready.
    pub fn poll(&mut self, now: Instant) -> Option<WindowTransition> {
        let metrics = self.debouncer.poll(now)?;
        if !self.reconciler.accepts_scroll_trigger(now) {
            return None;
        }
        let page = page_at_scroll(&metrics, &self.window)?;
        self.request_page(page, Some(metrics), None)
    }

    /// Jump to `page` directly (e.g. navigation to a search hit).
    ///
    /// Any scroll sample still waiting out the debounce is dropped: it was
    /// taken against the old window. `anchor` is a measured position in the
    /// current window; without one the anchor is estimated from `metrics`
    /// assuming pages of equal height.
    ///
    /// Returns `None` when the window does not change.
    pub fn request_page(
        &mut self,
        page: usize,
        metrics: Option<ScrollMetrics>,
        anchor: Option<ScrollAnchor>,
    ) -> Option<WindowTransition> {
        self.debouncer.cancel();
        self.requested_page = page;
        let next = self.config.window_for(page, self.document_length);
        if next == self.window {
            return None;
        }

        let previous = self.window;
        let estimated_scroll_top =
            self.reconciler
                .begin(metrics.unwrap_or_default(), previous, next, anchor);
        self.window = next;
        emit_event(
            EVENT_WINDOW_CHANGED,
            &format!("{}..={}", next.start_page, next.end_page),
        );

        Some(WindowTransition {
            previous,
            current: next,
            requested_page: page,
            estimated_scroll_top,
            anchor_page: self
                .reconciler
                .anchor()
                .map(|anchor| anchor.page)
                .filter(|&page| next.contains_page(page)),
        })
    }

    /// Report post-render measurements; returns the corrected offset.
    pub fn on_rendered(&mut self, measurement: &RenderedMeasurement) -> Option<f64> {
        self.reconciler.reconcile(measurement)
    }

    /// Commit the correction and start the guard interval.
    pub fn commit(&mut self, now: Instant) -> Option<f64> {
        self.reconciler.commit(now)
    }
}
