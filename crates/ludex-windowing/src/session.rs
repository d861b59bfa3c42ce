//! The windowing session.
//!
//! One `WindowingSession` owns every piece of mutable windowing state for one
//! dataset view: browse mode, pagination, virtualization state, node pool,
//! and the fetch cursor. Host boundaries (geometry, frame clock, fetch
//! source, paint callbacks, the dataset itself) are passed explicitly per
//! call; nothing lives in shared module state.
//!
//! Event flow:
//! - filter/sort change -> [`apply_filter`](WindowingSession::apply_filter)
//! - scroll/resize -> [`on_scroll`](WindowingSession::on_scroll) /
//!   [`on_resize`](WindowingSession::on_resize)
//! - host frame tick -> [`on_frame`](WindowingSession::on_frame)
//! - fetch resolution -> [`on_fetch_complete`](WindowingSession::on_fetch_complete) /
//!   [`on_fetch_failed`](WindowingSession::on_fetch_failed)

use ludex_core::{FilterSignature, FrameClock, Geometry};

use crate::browse::{
    browse_summary, page_indices, BrowseController, BrowseMode, PageNav, PaginationState,
};
use crate::config::WindowingConfig;
use crate::pool::{PoolStats, RenderTarget};
use crate::stream::{FetchApplied, FetchPage, FetchRequest, FetchSource, StreamAdapter, StreamError, StreamState};
use crate::windowing::{UpdateOutcome, VirtualizationState, WindowingController};

/// Owns all windowing state for one dataset view.
#[derive(Debug)]
pub struct WindowingSession<R> {
    browse: BrowseController,
    windowing: WindowingController<R>,
    stream: StreamAdapter,
}

impl<R: RenderTarget> WindowingSession<R> {
    pub fn new(config: WindowingConfig) -> Self {
        Self {
            browse: BrowseController::new(config.page_size),
            windowing: WindowingController::new(config),
            stream: StreamAdapter::new(&config),
        }
    }

    /// Marks the session bound to host listeners; `true` only on first call.
    pub fn bind(&mut self) -> bool {
        self.windowing.bind()
    }

    pub fn mode(&self) -> BrowseMode {
        self.browse.mode()
    }

    pub fn pagination(&self) -> &PaginationState {
        self.browse.pagination()
    }

    pub fn virtualization(&self) -> &VirtualizationState {
        self.windowing.state()
    }

    pub fn stream_state(&self) -> &StreamState {
        self.stream.state()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.windowing.pool_stats()
    }

    /// Last data-source failure, until dismissed.
    pub fn status(&self) -> Option<&StreamError> {
        self.stream.status()
    }

    pub fn dismiss_status(&mut self) {
        self.stream.dismiss_status();
    }

    /// "Showing X of Y" line for the browse footer.
    pub fn summary(&self, dataset_len: usize) -> String {
        let pagination = self.browse.pagination();
        let shown = match self.browse.mode() {
            BrowseMode::Infinite => pagination.rendered_count.min(dataset_len),
            BrowseMode::Paged => {
                let raw = page_indices(pagination.current_page, pagination.page_size);
                raw.end.min(dataset_len).saturating_sub(raw.start.min(dataset_len))
            }
        };
        browse_summary(shown, dataset_len, self.stream.is_loading())
    }

    /// Resets the session for a new filter/sort signature.
    ///
    /// The fetch cursor restarts from zero, the browse window collapses back
    /// to one page, every pool assignment is dropped, and an initial capacity
    /// fetch plus a forced windowing pass are queued.
    pub fn apply_filter(
        &mut self,
        signature: FilterSignature,
        source: &mut impl FetchSource,
        clock: &mut impl FrameClock,
    ) {
        self.stream.reset(signature);
        self.browse.reset();
        self.windowing.invalidate_pool();
        self.stream
            .ensure_capacity(self.browse.target_capacity(), source);
        self.windowing.schedule_update(true, clock);
    }

    /// Scroll signal: coalesced, non-forced recomputation.
    pub fn on_scroll(&mut self, clock: &mut impl FrameClock) {
        self.windowing.schedule_update(false, clock);
    }

    /// Resize signal: re-measure and bypass the range short-circuit.
    pub fn on_resize(&mut self, clock: &mut impl FrameClock) {
        self.windowing.schedule_update(true, clock);
    }

    /// Runs the pending windowing pass on a host frame tick.
    ///
    /// `dataset` is the current filtered/sorted sequence; the browse mode
    /// picks the window of it to render. When the pass lands near the end of
    /// locally fetched rows, a background prefetch is started.
    pub fn on_frame<T>(
        &mut self,
        dataset: &[T],
        geometry: &impl Geometry,
        source: &mut impl FetchSource,
        clock: &mut impl FrameClock,
        factory: &mut dyn FnMut() -> R,
        paint: &mut dyn FnMut(&T, usize, &mut R),
    ) -> UpdateOutcome {
        let window = self.browse.window_of(dataset.len());
        let outcome = self.windowing.on_frame(
            &dataset[window.clone()],
            window.start,
            geometry,
            factory,
            paint,
        );

        match outcome {
            UpdateOutcome::NotReady => {
                // Geometry was not laid out; retry on the next frame.
                self.windowing.schedule_update(true, clock);
            }
            _ => {
                if let Some(edge) = outcome.trailing_edge() {
                    self.stream.maybe_prefetch(edge, source);
                }
            }
        }
        outcome
    }

    /// Delivers a resolved fetch. Applied rows belong to the host's row
    /// store; an applied fetch queues exactly one additional windowing pass.
    pub fn on_fetch_complete<T>(
        &mut self,
        request: &FetchRequest,
        page: FetchPage<T>,
        source: &mut impl FetchSource,
        clock: &mut impl FrameClock,
    ) -> FetchApplied<T> {
        let applied = self.stream.complete(request, page, source);
        if matches!(applied, FetchApplied::Applied { .. }) {
            self.windowing.schedule_update(false, clock);
        }
        applied
    }

    /// Delivers a failed fetch; surfaces a status without touching the
    /// rendered window.
    pub fn on_fetch_failed(&mut self, request: &FetchRequest, message: impl Into<String>) {
        self.stream.fail(request, message);
    }

    /// Infinite-mode trailing-edge control: grow the window by one batch.
    pub fn load_more(
        &mut self,
        dataset_len: usize,
        source: &mut impl FetchSource,
        clock: &mut impl FrameClock,
    ) -> bool {
        let grew = self.browse.load_more(dataset_len, self.stream.has_more());
        if grew {
            self.stream
                .ensure_capacity(self.browse.target_capacity(), source);
            self.windowing.schedule_update(true, clock);
        }
        grew
    }

    /// Paged-mode navigation. Ensures the target page's rows are fetched
    /// before the forced re-render.
    pub fn navigate(
        &mut self,
        nav: PageNav,
        dataset_len: usize,
        source: &mut impl FetchSource,
        clock: &mut impl FrameClock,
    ) -> Option<usize> {
        let page = self.browse.navigate(nav, dataset_len)?;
        self.stream
            .ensure_capacity(self.browse.target_capacity(), source);
        self.windowing.schedule_update(true, clock);
        Some(page)
    }

    /// Switches between infinite and paged presentation. A reset point:
    /// `page_size` survives, everything else is recomputed from scratch.
    pub fn set_mode(
        &mut self,
        mode: BrowseMode,
        source: &mut impl FetchSource,
        clock: &mut impl FrameClock,
    ) -> bool {
        if !self.browse.set_mode(mode) {
            return false;
        }
        self.stream
            .ensure_capacity(self.browse.target_capacity(), source);
        self.windowing.schedule_update(true, clock);
        true
    }

    /// Changes the page size (snapped to the allowed choices) and resets the
    /// browse window. Returns the normalized size.
    pub fn set_page_size(
        &mut self,
        page_size: usize,
        source: &mut impl FetchSource,
        clock: &mut impl FrameClock,
    ) -> usize {
        let normalized = self.browse.set_page_size(page_size);
        self.stream
            .ensure_capacity(self.browse.target_capacity(), source);
        self.windowing.schedule_update(true, clock);
        normalized
    }

    /// Scroll offset that reveals `index`, or `None` when already visible.
    pub fn scroll_target_for(&self, index: usize, geometry: &impl Geometry) -> Option<f32> {
        self.windowing.scroll_target_for(index, geometry)
    }

    /// Detaches from the host and zeroes all windowing state.
    pub fn teardown(&mut self) {
        self.windowing.teardown();
    }
}
