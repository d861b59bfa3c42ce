//! Windowing controller.
//!
//! The stateful orchestrator between host events and the pure range math.
//! It rate-limits recomputation to one pass per display frame through a
//! [`FrameGate`], keeps [`VirtualizationState`] as the single source of truth
//! for what is materialized, and drives the [`NodePool`] only when the
//! visible span actually moved.

use ludex_core::{FrameClock, FrameGate, Geometry, ViewportExtent};
use web_time::{Duration, Instant};

use crate::config::WindowingConfig;
use crate::metrics::{GridMetrics, MetricsEstimator};
use crate::pool::{NodePool, PoolStats, RenderTarget};
use crate::range::{compute_range, VirtualRange};

/// Paint passes longer than this get a warning; they will be felt as jank.
const PAINT_BUDGET: Duration = Duration::from_millis(8);

/// Whether a dataset is large enough to be worth pooled windowed rendering.
pub fn should_virtualize(item_count: usize, min_items: usize) -> bool {
    item_count >= min_items
}

/// Snapshot of the live window.
///
/// Mutated only by [`WindowingController`]; fully reset on teardown or when
/// the dataset drops below the virtualization threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualizationState {
    /// Whether pooled windowed rendering is active.
    pub active: bool,
    /// Grid metrics the current range was computed with.
    pub metrics: GridMetrics,
    /// The materialized span and its spacer paddings.
    pub range: VirtualRange,
    /// Absolute dataset index of the window's first item (`range` indices are
    /// relative to the browse-mode slice).
    pub dataset_offset: usize,
}

impl VirtualizationState {
    fn inactive(metrics: GridMetrics) -> Self {
        Self {
            active: false,
            metrics,
            range: VirtualRange::EMPTY,
            dataset_offset: 0,
        }
    }
}

/// What a windowing pass did, and where the window's trailing edge landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Spurious frame tick with nothing pending.
    Idle,
    /// Geometry not laid out yet; safe to retry next frame.
    NotReady,
    /// Dataset below threshold: host renders the slice directly, no pooling.
    /// `trailing_edge` is the absolute index one past the last rendered item.
    Direct { len: usize, trailing_edge: usize },
    /// Range unchanged and pass not forced; the pool was not touched.
    Unchanged { trailing_edge: usize },
    /// The window moved and the pool repainted the delta.
    Updated {
        trailing_edge: usize,
        painted: usize,
        short_circuited: usize,
    },
}

impl UpdateOutcome {
    /// Absolute trailing-edge index to report to the streaming adapter.
    pub fn trailing_edge(&self) -> Option<usize> {
        match *self {
            UpdateOutcome::Idle | UpdateOutcome::NotReady => None,
            UpdateOutcome::Direct { trailing_edge, .. }
            | UpdateOutcome::Unchanged { trailing_edge }
            | UpdateOutcome::Updated { trailing_edge, .. } => Some(trailing_edge),
        }
    }
}

/// Orchestrates scroll/resize signals into pooled windowed rendering.
#[derive(Debug)]
pub struct WindowingController<R> {
    config: WindowingConfig,
    estimator: MetricsEstimator,
    state: VirtualizationState,
    pool: NodePool<R>,
    gate: FrameGate,
    bound: bool,
}

impl<R: RenderTarget> WindowingController<R> {
    pub fn new(config: WindowingConfig) -> Self {
        let estimator = MetricsEstimator::new(config.default_item_size, config.gap);
        Self {
            config,
            estimator,
            state: VirtualizationState::inactive(estimator.fallback()),
            pool: NodePool::new(),
            gate: FrameGate::new(),
            bound: false,
        }
    }

    /// Marks the controller as bound to host scroll/resize listeners.
    ///
    /// Idempotent; returns `true` only on the first call so the host attaches
    /// its listeners exactly once.
    pub fn bind(&mut self) -> bool {
        if self.bound {
            return false;
        }
        self.bound = true;
        true
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn state(&self) -> &VirtualizationState {
        &self.state
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Whether a pass is already waiting for the next frame tick.
    pub fn is_update_pending(&self) -> bool {
        self.gate.is_pending()
    }

    /// Coalesces update requests to one recomputation per display frame.
    ///
    /// `force` bypasses the range-unchanged short-circuit in the resulting
    /// pass; used after resize, re-measure, and dataset resets.
    pub fn schedule_update(&mut self, force: bool, clock: &mut impl FrameClock) {
        if self.gate.arm(force) {
            clock.request_tick();
        }
    }

    /// Drops any stale index assignments so the next pass repaints.
    pub fn invalidate_pool(&mut self) {
        self.pool.invalidate();
    }

    /// Runs the pending pass on a frame tick, if any.
    pub fn on_frame<T>(
        &mut self,
        items: &[T],
        dataset_offset: usize,
        geometry: &impl Geometry,
        factory: &mut dyn FnMut() -> R,
        paint: &mut dyn FnMut(&T, usize, &mut R),
    ) -> UpdateOutcome {
        match self.gate.take() {
            Some(forced) => {
                self.update_range(items, dataset_offset, geometry, forced, factory, paint)
            }
            None => UpdateOutcome::Idle,
        }
    }

    /// Computes the window for the current geometry and paints the delta.
    ///
    /// `items` is the browse-mode slice of the dataset and `dataset_offset`
    /// its absolute start index; `paint` receives indices relative to
    /// `items`. The returned trailing edge is absolute, ready for the
    /// streaming adapter's prefetch decision.
    pub fn update_range<T>(
        &mut self,
        items: &[T],
        dataset_offset: usize,
        geometry: &impl Geometry,
        force: bool,
        factory: &mut dyn FnMut() -> R,
        paint: &mut dyn FnMut(&T, usize, &mut R),
    ) -> UpdateOutcome {
        if !should_virtualize(items.len(), self.config.virtualize_min_items) {
            if self.state.active {
                self.deactivate();
            }
            self.state.dataset_offset = dataset_offset;
            return UpdateOutcome::Direct {
                len: items.len(),
                trailing_edge: dataset_offset + items.len(),
            };
        }

        if !geometry.container_size().is_measured() {
            // Not laid out yet. Report no visible rows; the next frame
            // retries with real geometry.
            self.state.range = VirtualRange::EMPTY;
            return UpdateOutcome::NotReady;
        }

        let metrics = self.estimator.measure(geometry);
        // A changed column count invalidates every previously computed
        // range/assignment pairing. So does a moved dataset offset: pool
        // assignments are keyed by slice-relative index, and the same
        // relative index now holds a different item.
        let force = force || metrics.columns != self.state.metrics.columns;
        if metrics.columns != self.state.metrics.columns
            || dataset_offset != self.state.dataset_offset
        {
            self.pool.invalidate();
        }

        let viewport = ViewportExtent::new(geometry.viewport_height(), metrics.row_height);
        let range = compute_range(
            items.len(),
            geometry.scroll_offset(),
            geometry.container_top(),
            viewport.effective(),
            &metrics,
            self.config.effective_overscan(),
        );

        let unchanged = self.state.active
            && range.same_span(&self.state.range)
            && dataset_offset == self.state.dataset_offset;
        if unchanged && !force {
            self.state.range = range;
            return UpdateOutcome::Unchanged {
                trailing_edge: dataset_offset + range.end,
            };
        }

        self.state = VirtualizationState {
            active: true,
            metrics,
            range,
            dataset_offset,
        };

        let started = Instant::now();
        let pass = self
            .pool
            .render_slice(items, range.start..range.end, factory, paint);
        let elapsed = started.elapsed();
        if elapsed > PAINT_BUDGET {
            log::warn!(
                "windowing pass painted {} items in {elapsed:?}, over the {PAINT_BUDGET:?} budget",
                pass.painted
            );
        }

        UpdateOutcome::Updated {
            trailing_edge: dataset_offset + range.end,
            painted: pass.painted,
            short_circuited: pass.short_circuited,
        }
    }

    /// Scroll offset that brings `index` into view, or `None` when the item
    /// is already fully visible.
    pub fn scroll_target_for(&self, index: usize, geometry: &impl Geometry) -> Option<f32> {
        let metrics = &self.state.metrics;
        let row_height = metrics.row_height.max(1.0);
        let row = index / metrics.columns.max(1);
        let item_top = geometry.container_top() + row as f32 * row_height;
        let item_bottom = item_top + row_height;
        let viewport_top = geometry.scroll_offset();
        let viewport_bottom = viewport_top + geometry.viewport_height();

        if item_top >= viewport_top && item_bottom <= viewport_bottom {
            return None;
        }
        if item_top < viewport_top {
            return Some((item_top - row_height * 0.5).max(0.0));
        }
        Some((item_bottom - geometry.viewport_height() + row_height * 0.5).max(0.0))
    }

    /// Detaches from the host: cancels the pending frame, parks every pool
    /// slot, and zeroes the virtualization state.
    pub fn teardown(&mut self) {
        self.gate.cancel();
        self.pool.release_all();
        self.state = VirtualizationState::inactive(self.estimator.fallback());
        self.bound = false;
    }

    fn deactivate(&mut self) {
        self.pool.release_all();
        self.state = VirtualizationState::inactive(self.estimator.fallback());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludex_core::{FakeGeometry, ManualFrameClock, Size};

    #[derive(Debug, Default)]
    struct TestNode {
        hidden: bool,
        paints: usize,
    }

    impl RenderTarget for TestNode {
        fn set_hidden(&mut self, hidden: bool) {
            self.hidden = hidden;
        }
    }

    fn controller() -> WindowingController<TestNode> {
        WindowingController::new(WindowingConfig {
            gap: 0.0,
            ..Default::default()
        })
    }

    fn geometry() -> FakeGeometry {
        // 4 columns of 260px cards, 360px rows, 800px viewport.
        FakeGeometry::new(Size::new(1040.0, 3000.0), Size::new(260.0, 360.0), 800.0)
    }

    fn run_update(
        controller: &mut WindowingController<TestNode>,
        items: &[u32],
        geometry: &FakeGeometry,
        force: bool,
    ) -> UpdateOutcome {
        controller.update_range(items, 0, geometry, force, &mut TestNode::default, &mut |_,
            _,
            node| {
            node.paints += 1;
        })
    }

    #[test]
    fn test_small_dataset_renders_directly() {
        let mut controller = controller();
        let items: Vec<u32> = (0..20).collect();
        let outcome = run_update(&mut controller, &items, &geometry(), false);
        assert_eq!(
            outcome,
            UpdateOutcome::Direct {
                len: 20,
                trailing_edge: 20
            }
        );
        assert!(!controller.state().active);
        assert_eq!(controller.pool_stats().painted, 0);
    }

    #[test]
    fn test_large_dataset_activates_windowing() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let outcome = run_update(&mut controller, &items, &geometry(), false);
        match outcome {
            UpdateOutcome::Updated { painted, .. } => assert!(painted > 0 && painted < 100),
            other => panic!("expected Updated, got {other:?}"),
        }
        let state = controller.state();
        assert!(state.active);
        assert_eq!(state.metrics.columns, 4);
        assert_eq!(state.range.start, 0);
    }

    #[test]
    fn test_unchanged_input_skips_pool() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let geometry = geometry();
        run_update(&mut controller, &items, &geometry, false);
        let stats_before = controller.pool_stats();
        let state_before = *controller.state();

        let outcome = run_update(&mut controller, &items, &geometry, false);
        assert!(matches!(outcome, UpdateOutcome::Unchanged { .. }));
        assert_eq!(controller.pool_stats(), stats_before);
        assert_eq!(*controller.state(), state_before);
    }

    #[test]
    fn test_forced_pass_bypasses_range_short_circuit() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let geometry = geometry();
        run_update(&mut controller, &items, &geometry, false);
        let outcome = run_update(&mut controller, &items, &geometry, true);
        // Forced pass runs, but per-slot assignment still short-circuits.
        match outcome {
            UpdateOutcome::Updated {
                painted,
                short_circuited,
                ..
            } => {
                assert_eq!(painted, 0);
                assert!(short_circuited > 0);
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn test_scroll_moves_window_and_reports_trailing_edge() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let geometry = geometry();
        run_update(&mut controller, &items, &geometry, false);

        let scrolled = geometry.scrolled_to(360.0 * 100.0);
        let outcome = run_update(&mut controller, &items, &scrolled, false);
        let trailing = outcome.trailing_edge().unwrap();
        assert!(trailing > 4 * 100);
        assert!(controller.state().range.top_padding > 0.0);
    }

    #[test]
    fn test_unmeasured_geometry_is_not_ready() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let outcome = run_update(&mut controller, &items, &FakeGeometry::unmeasured(), false);
        assert_eq!(outcome, UpdateOutcome::NotReady);
        assert!(controller.state().range.is_empty());

        // Retry with real geometry succeeds.
        let outcome = run_update(&mut controller, &items, &geometry(), false);
        assert!(matches!(outcome, UpdateOutcome::Updated { .. }));
    }

    #[test]
    fn test_column_change_forces_recompute() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let geometry = geometry();
        run_update(&mut controller, &items, &geometry, false);
        assert_eq!(controller.state().metrics.columns, 4);

        let mut narrow = geometry.clone();
        narrow.container.width = 520.0;
        let outcome = run_update(&mut controller, &items, &narrow, false);
        assert!(matches!(outcome, UpdateOutcome::Updated { .. }));
        assert_eq!(controller.state().metrics.columns, 2);
    }

    #[test]
    fn test_schedule_coalesces_to_one_tick() {
        let mut controller = controller();
        let mut clock = ManualFrameClock::new();
        controller.schedule_update(false, &mut clock);
        controller.schedule_update(false, &mut clock);
        controller.schedule_update(true, &mut clock);
        assert_eq!(clock.requests, 1);
        assert!(controller.is_update_pending());
    }

    #[test]
    fn test_frame_without_pending_update_is_idle() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let outcome = controller.on_frame(
            &items,
            0,
            &geometry(),
            &mut TestNode::default,
            &mut |_, _, _| {},
        );
        assert_eq!(outcome, UpdateOutcome::Idle);
    }

    #[test]
    fn test_shrinking_dataset_deactivates_and_releases_pool() {
        let mut controller = controller();
        let big: Vec<u32> = (0..10_000).collect();
        let geometry = geometry();
        run_update(&mut controller, &big, &geometry, false);
        assert!(controller.state().active);

        let small: Vec<u32> = (0..10).collect();
        let outcome = run_update(&mut controller, &small, &geometry, false);
        assert!(matches!(outcome, UpdateOutcome::Direct { .. }));
        assert!(!controller.state().active);
        assert_eq!(controller.pool_stats().in_use, 0);
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut controller = controller();
        assert!(controller.bind());
        assert!(!controller.bind());
        assert!(controller.is_bound());
    }

    #[test]
    fn test_teardown_zeroes_state() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let mut clock = ManualFrameClock::new();
        run_update(&mut controller, &items, &geometry(), false);
        controller.bind();
        controller.schedule_update(true, &mut clock);

        controller.teardown();
        assert!(!controller.state().active);
        assert!(controller.state().range.is_empty());
        assert!(!controller.is_update_pending());
        assert!(!controller.is_bound());
        assert_eq!(controller.pool_stats().in_use, 0);
    }

    #[test]
    fn test_scroll_target_for_offscreen_item() {
        let mut controller = controller();
        let items: Vec<u32> = (0..10_000).collect();
        let geometry = geometry();
        run_update(&mut controller, &items, &geometry, false);

        // Item in the first row is already visible.
        assert_eq!(controller.scroll_target_for(0, &geometry), None);
        // Item far below needs a scroll.
        let target = controller.scroll_target_for(4000, &geometry);
        assert!(target.is_some_and(|offset| offset > 0.0));
    }
}
