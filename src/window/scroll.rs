//! Scroll anchor reconciliation across window changes.
//!
//! When the window slides, pages disappear from (or appear above) the
//! viewport and the browser-style scroll offset would jump. The reconciler
//! computes the offset that keeps the same content in view, in two phases:
//! an estimate when the window changes, then an exact correction once the
//! new content has been rendered and measured.
//!
//! ```text
//! Idle --begin--> WindowChanging --reconcile--> Reconciling --commit--> Idle (+ guard)
//! ```
//!
//! Scroll-driven window triggers are accepted only in `Idle` and after the
//! guard interval that follows a commit, so the correction itself is never
//! read back as a user scroll.

use crate::event::{EVENT_SCROLL_CORRECTED, emit_event};
use crate::window::manager::Window;
use std::time::{Duration, Instant};

/// Default suppression interval after a committed correction.
pub const DEFAULT_GUARD_INTERVAL: Duration = Duration::from_millis(150);

/// Scroll container measurements.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Offset of the viewport top from the content top.
    pub scroll_top: f64,
    /// Total scrollable content height.
    pub scroll_height: f64,
    /// Height of the visible viewport.
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Create metrics.
    #[must_use]
    pub const fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    /// Whether the metrics describe laid-out content.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.scroll_top.is_finite()
            && self.scroll_height.is_finite()
            && self.scroll_height > 0.0
            && self.client_height.is_finite()
    }

    /// Largest valid scroll offset.
    #[must_use]
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height.max(0.0)).max(0.0)
    }

    /// Average rendered height of one page of `window`.
    #[must_use]
    pub fn average_page_height(&self, window: &Window) -> f64 {
        self.scroll_height / window.page_count() as f64
    }
}

/// The page under the viewport top and how far into it the viewport is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollAnchor {
    pub page: usize,
    /// `scroll_top - page_top` at the time the anchor was taken.
    pub offset: f64,
}

impl ScrollAnchor {
    /// Estimate the anchor from metrics, assuming pages of equal height.
    #[must_use]
    pub fn estimate(metrics: &ScrollMetrics, window: &Window) -> Option<Self> {
        if !metrics.is_measured() {
            return None;
        }
        let page_height = metrics.average_page_height(window);
        let index = (metrics.scroll_top.max(0.0) / page_height).floor() as usize;
        let index = index.min(window.page_count() - 1);
        Some(Self {
            page: window.start_page + index,
            offset: metrics.scroll_top - index as f64 * page_height,
        })
    }
}

/// Measurements taken after the new window has been rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderedMeasurement {
    pub scroll_height: f64,
    pub client_height: f64,
    /// Measured top of the anchor page in the new layout, if it is still
    /// materialized.
    pub anchor_top: Option<f64>,
}

impl RenderedMeasurement {
    /// Measurement without an anchor position.
    #[must_use]
    pub const fn new(scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_height,
            client_height,
            anchor_top: None,
        }
    }

    /// Builder-style anchor setter.
    #[must_use]
    pub const fn with_anchor_top(mut self, top: f64) -> Self {
        self.anchor_top = Some(top);
        self
    }

    fn is_measured(&self) -> bool {
        self.scroll_height.is_finite() && self.scroll_height > 0.0
    }

    fn max_scroll_top(&self) -> f64 {
        let client = if self.client_height.is_finite() {
            self.client_height.max(0.0)
        } else {
            0.0
        };
        (self.scroll_height - client).max(0.0)
    }
}

/// Signed page shift of the window start (positive: pages removed on top).
fn pages_removed_from_top(previous: &Window, next: &Window) -> i64 {
    next.start_page as i64 - previous.start_page as i64
}

/// First-phase estimate of the corrected scroll offset.
///
/// Returns `None` when no correction applies: the window start did not move
/// or the previous metrics are missing. The estimate is clamped at zero
/// only, since the new content height is not known yet.
#[must_use]
pub fn estimate_scroll_top(
    previous_metrics: &ScrollMetrics,
    previous_window: &Window,
    next_window: &Window,
) -> Option<f64> {
    if !previous_metrics.is_measured() {
        return None;
    }
    let removed = pages_removed_from_top(previous_window, next_window);
    if removed == 0 {
        return None;
    }
    let delta = removed as f64 * previous_metrics.average_page_height(previous_window);
    Some((previous_metrics.scroll_top - delta).max(0.0))
}

/// Second-phase correction from post-render measurements.
///
/// In order of preference:
/// 1. the measured new top of the anchor page plus the old offset into it;
/// 2. when the window end did not move, the measured height change, which
///    then comes entirely from the top;
/// 3. the per-page estimate.
///
/// The result is clamped to `[0, scroll_height - client_height]` of the new
/// layout. Missing measurements yield `None` (leave the offset alone).
#[must_use]
pub fn reconcile_scroll_top(
    previous_metrics: &ScrollMetrics,
    previous_window: &Window,
    next_window: &Window,
    anchor: Option<ScrollAnchor>,
    measurement: &RenderedMeasurement,
) -> Option<f64> {
    if !previous_metrics.is_measured() || !measurement.is_measured() {
        return None;
    }

    let exact = anchor
        .zip(measurement.anchor_top)
        .filter(|(_, top)| top.is_finite())
        .map(|(anchor, top)| top + anchor.offset);

    let target = match exact {
        Some(target) => target,
        None if pages_removed_from_top(previous_window, next_window) == 0 => return None,
        None if previous_window.end_page == next_window.end_page => {
            let difference = measurement.scroll_height - previous_metrics.scroll_height;
            previous_metrics.scroll_top + difference
        }
        None => estimate_scroll_top(previous_metrics, previous_window, next_window)?,
    };

    Some(target.clamp(0.0, measurement.max_scroll_top()))
}

/// Named reconciler phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollPhase {
    Idle,
    WindowChanging,
    Reconciling,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingChange {
    previous_metrics: ScrollMetrics,
    previous_window: Window,
    next_window: Window,
    anchor: Option<ScrollAnchor>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Idle,
    WindowChanging(PendingChange),
    Reconciling {
        change: PendingChange,
        target: Option<f64>,
    },
}

/// Scroll correction state machine.
#[derive(Clone, Debug)]
pub struct ScrollReconciler {
    guard_interval: Duration,
    state: State,
    /// When the last correction was committed.
    committed_at: Option<Instant>,
}

impl Default for ScrollReconciler {
    fn default() -> Self {
        Self::new(DEFAULT_GUARD_INTERVAL)
    }
}

impl ScrollReconciler {
    /// Create an idle reconciler.
    #[must_use]
    pub const fn new(guard_interval: Duration) -> Self {
        Self {
            guard_interval,
            state: State::Idle,
            committed_at: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ScrollPhase {
        match self.state {
            State::Idle => ScrollPhase::Idle,
            State::WindowChanging(_) => ScrollPhase::WindowChanging,
            State::Reconciling { .. } => ScrollPhase::Reconciling,
        }
    }

    /// Whether a scroll event may trigger a window change at `now`.
    ///
    /// An interval too large to add to the commit time never expires.
    #[must_use]
    pub fn accepts_scroll_trigger(&self, now: Instant) -> bool {
        matches!(self.state, State::Idle)
            && self
                .committed_at
                .is_none_or(|at| now.saturating_duration_since(at) >= self.guard_interval)
    }

    /// Anchor recorded for the pending change.
    #[must_use]
    pub fn anchor(&self) -> Option<ScrollAnchor> {
        match self.state {
            State::Idle => None,
            State::WindowChanging(change) | State::Reconciling { change, .. } => change.anchor,
        }
    }

    /// Start a window change and return the estimated scroll offset.
    ///
    /// A change arriving before the previous one was committed keeps the
    /// original previous window and metrics, since that is what is still on
    /// screen, and only replaces the target window.
    pub fn begin(
        &mut self,
        previous_metrics: ScrollMetrics,
        previous_window: Window,
        next_window: Window,
        anchor: Option<ScrollAnchor>,
    ) -> Option<f64> {
        let change = match self.state {
            State::Idle => PendingChange {
                previous_metrics,
                previous_window,
                next_window,
                anchor: anchor.or_else(|| ScrollAnchor::estimate(&previous_metrics, &previous_window)),
            },
            State::WindowChanging(change) | State::Reconciling { change, .. } => PendingChange {
                next_window,
                ..change
            },
        };
        self.state = State::WindowChanging(change);
        estimate_scroll_top(
            &change.previous_metrics,
            &change.previous_window,
            &change.next_window,
        )
    }

    /// Compute the exact correction from post-render measurements.
    ///
    /// Has no effect unless a window change is in progress.
    pub fn reconcile(&mut self, measurement: &RenderedMeasurement) -> Option<f64> {
        let State::WindowChanging(change) = self.state else {
            return None;
        };
        let anchor = change
            .anchor
            .filter(|anchor| change.next_window.contains_page(anchor.page));
        let target = reconcile_scroll_top(
            &change.previous_metrics,
            &change.previous_window,
            &change.next_window,
            anchor,
            measurement,
        );
        self.state = State::Reconciling { change, target };
        target
    }

    /// Finish the change, returning the offset the renderer should apply,
    /// and start the guard interval.
    pub fn commit(&mut self, now: Instant) -> Option<f64> {
        let target = match self.state {
            State::Idle => return None,
            State::WindowChanging(_) => None,
            State::Reconciling { target, .. } => target,
        };
        self.state = State::Idle;
        self.committed_at = Some(now);
        if let Some(top) = target {
            emit_event(EVENT_SCROLL_CORRECTED, &format!("{top:.1}"));
        }
        target
    }

    /// Abandon any pending change without a guard interval.
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start_page: usize, end_page: usize) -> Window {
        Window {
            start_page,
            end_page,
            start_index: (start_page - 1) * 1_000,
            end_index: end_page * 1_000,
        }
    }

    #[test]
    fn test_estimate_slide_forward() {
        let metrics = ScrollMetrics::new(8_000.0, 5_000.0, 800.0);
        let top = estimate_scroll_top(&metrics, &window(3, 7), &window(5, 9));
        assert_eq!(top, Some(6_000.0));
    }

    #[test]
    fn test_estimate_slide_backward() {
        let metrics = ScrollMetrics::new(500.0, 5_000.0, 800.0);
        let top = estimate_scroll_top(&metrics, &window(5, 9), &window(3, 7));
        assert_eq!(top, Some(2_500.0));
    }

    #[test]
    fn test_estimate_growth_is_noop() {
        let metrics = ScrollMetrics::new(1_200.0, 3_000.0, 800.0);
        assert_eq!(estimate_scroll_top(&metrics, &window(1, 3), &window(1, 5)), None);
    }

    #[test]
    fn test_missing_metrics_leave_offset_alone() {
        let unmeasured = ScrollMetrics::new(100.0, 0.0, 800.0);
        assert_eq!(estimate_scroll_top(&unmeasured, &window(3, 7), &window(5, 9)), None);
        let nan = ScrollMetrics::new(f64::NAN, 5_000.0, 800.0);
        assert_eq!(estimate_scroll_top(&nan, &window(3, 7), &window(5, 9)), None);

        let metrics = ScrollMetrics::new(100.0, 5_000.0, 800.0);
        let broken = RenderedMeasurement::new(0.0, 800.0);
        assert_eq!(
            reconcile_scroll_top(&metrics, &window(3, 7), &window(5, 9), None, &broken),
            None
        );
    }

    #[test]
    fn test_reconcile_with_anchor() {
        let metrics = ScrollMetrics::new(3_250.0, 5_000.0, 800.0);
        let anchor = ScrollAnchor::estimate(&metrics, &window(3, 7)).unwrap();
        assert_eq!(anchor.page, 6);
        assert_eq!(anchor.offset, 250.0);

        // Page 6 rendered 1_100 px below the new top.
        let measurement = RenderedMeasurement::new(5_600.0, 800.0).with_anchor_top(1_100.0);
        let top = reconcile_scroll_top(
            &metrics,
            &window(3, 7),
            &window(5, 9),
            Some(anchor),
            &measurement,
        );
        assert_eq!(top, Some(1_350.0));
    }

    #[test]
    fn test_reconcile_top_only_change_uses_height_difference() {
        let metrics = ScrollMetrics::new(600.0, 4_000.0, 800.0);
        let measurement = RenderedMeasurement::new(5_100.0, 800.0);
        let top =
            reconcile_scroll_top(&metrics, &window(4, 7), &window(3, 7), None, &measurement);
        assert_eq!(top, Some(1_700.0));
    }

    #[test]
    fn test_reconcile_clamps_to_new_layout() {
        let metrics = ScrollMetrics::new(8_000.0, 5_000.0, 800.0);
        let measurement = RenderedMeasurement::new(5_000.0, 800.0);
        let top = reconcile_scroll_top(&metrics, &window(3, 7), &window(5, 9), None, &measurement);
        assert_eq!(top, Some(4_200.0));
    }

    #[test]
    fn test_state_machine_cycle() {
        let t0 = Instant::now();
        let mut reconciler = ScrollReconciler::new(Duration::from_millis(150));
        assert_eq!(reconciler.phase(), ScrollPhase::Idle);
        assert!(reconciler.accepts_scroll_trigger(t0));

        let metrics = ScrollMetrics::new(3_000.0, 5_000.0, 800.0);
        let estimate = reconciler.begin(metrics, window(3, 7), window(5, 9), None);
        assert_eq!(estimate, Some(1_000.0));
        assert_eq!(reconciler.phase(), ScrollPhase::WindowChanging);
        assert!(!reconciler.accepts_scroll_trigger(t0));
        assert_eq!(reconciler.anchor().map(|a| a.page), Some(6));

        let measured = RenderedMeasurement::new(5_000.0, 800.0).with_anchor_top(1_020.0);
        assert_eq!(reconciler.reconcile(&measured), Some(1_020.0));
        assert_eq!(reconciler.phase(), ScrollPhase::Reconciling);

        let applied = reconciler.commit(t0);
        assert_eq!(applied, Some(1_020.0));
        assert_eq!(reconciler.phase(), ScrollPhase::Idle);
        assert!(!reconciler.accepts_scroll_trigger(t0 + Duration::from_millis(100)));
        assert!(reconciler.accepts_scroll_trigger(t0 + Duration::from_millis(150)));
    }

    #[test]
    fn test_anchor_outside_new_window_falls_back() {
        let t0 = Instant::now();
        let mut reconciler = ScrollReconciler::default();
        // Anchor on page 3, which the new window drops.
        let metrics = ScrollMetrics::new(200.0, 5_000.0, 800.0);
        reconciler.begin(metrics, window(3, 7), window(5, 9), None);
        let measured = RenderedMeasurement::new(5_000.0, 800.0).with_anchor_top(-500.0);
        assert_eq!(reconciler.reconcile(&measured), Some(0.0));
        assert_eq!(reconciler.commit(t0), Some(0.0));
    }

    #[test]
    fn test_second_change_keeps_original_previous() {
        let mut reconciler = ScrollReconciler::default();
        let metrics = ScrollMetrics::new(4_000.0, 5_000.0, 800.0);
        reconciler.begin(metrics, window(3, 7), window(4, 8), None);
        let later = ScrollMetrics::new(9_999.0, 1.0, 1.0);
        let estimate = reconciler.begin(later, window(4, 8), window(5, 9), None);
        assert_eq!(estimate, Some(2_000.0));
    }

    #[test]
    fn test_reconcile_and_commit_when_idle() {
        let mut reconciler = ScrollReconciler::default();
        assert_eq!(reconciler.reconcile(&RenderedMeasurement::new(10.0, 1.0)), None);
        assert_eq!(reconciler.commit(Instant::now()), None);
        assert!(reconciler.accepts_scroll_trigger(Instant::now()));
    }

    #[test]
    fn test_commit_without_measurement_applies_nothing() {
        let t0 = Instant::now();
        let mut reconciler = ScrollReconciler::default();
        reconciler.begin(
            ScrollMetrics::new(4_000.0, 5_000.0, 800.0),
            window(3, 7),
            window(5, 9),
            None,
        );
        assert_eq!(reconciler.commit(t0), None);
        assert_eq!(reconciler.phase(), ScrollPhase::Idle);
        assert!(!reconciler.accepts_scroll_trigger(t0));
    }

    #[test]
    fn test_unbounded_guard_never_expires() {
        let t0 = Instant::now();
        let mut reconciler = ScrollReconciler::new(Duration::MAX);
        reconciler.begin(
            ScrollMetrics::new(4_000.0, 5_000.0, 800.0),
            window(3, 7),
            window(5, 9),
            None,
        );
        assert_eq!(reconciler.commit(t0), None);
        assert_eq!(reconciler.phase(), ScrollPhase::Idle);
        assert!(!reconciler.accepts_scroll_trigger(t0 + Duration::from_secs(86_400)));
    }

    #[test]
    fn test_cancel() {
        let mut reconciler = ScrollReconciler::default();
        reconciler.begin(
            ScrollMetrics::new(4_000.0, 5_000.0, 800.0),
            window(3, 7),
            window(5, 9),
            None,
        );
        reconciler.cancel();
        assert_eq!(reconciler.phase(), ScrollPhase::Idle);
        assert!(reconciler.accepts_scroll_trigger(Instant::now()));
    }
}
