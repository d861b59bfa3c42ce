//! Streaming data source adapter.
//!
//! Wraps the host's incremental fetch behind an event-driven cursor. The
//! adapter starts at most one fetch at a time (concurrent triggers coalesce
//! onto the in-flight request) and the host resolves it later through
//! [`StreamAdapter::complete`] or [`StreamAdapter::fail`]. Staleness is
//! signature-based: a completion whose filter signature no longer matches the
//! current one is silently dropped, never appended.

use ludex_core::FilterSignature;
use thiserror::Error;

use crate::config::WindowingConfig;

/// Non-fatal data-source failure, surfaced as a dismissible status.
///
/// The currently rendered window stays intact; the next prefetch trigger
/// retries naturally.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("unable to load more items: {message}")]
    Fetch { message: String },
}

/// One outstanding page request, echoed back verbatim on completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Row offset to fetch from.
    pub offset: usize,
    /// Rows requested.
    pub limit: usize,
    /// Signature the query was built against; checked on completion.
    pub signature: FilterSignature,
}

/// Rows delivered for a [`FetchRequest`].
#[derive(Clone, Debug)]
pub struct FetchPage<T> {
    pub rows: Vec<T>,
    /// Backend's total row count for the query, when it reports one.
    pub total_count: Option<usize>,
}

/// The host's incremental fetch boundary.
///
/// `begin_fetch` must not block: it kicks off an asynchronous query and
/// returns. The host later resolves the request through the adapter.
pub trait FetchSource {
    fn begin_fetch(&mut self, request: &FetchRequest);
}

/// Fetch cursor state for the current filter signature.
///
/// `has_more == false` is terminal for a signature; any signature change
/// resets the whole struct and restarts the cursor from zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamState {
    /// Next row offset to request.
    pub next_offset: usize,
    /// Backend-reported total, once known.
    pub total_count: Option<usize>,
    /// Whether the backend may still have rows for this signature.
    pub has_more: bool,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Signature the cursor belongs to.
    pub signature: Option<FilterSignature>,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            next_offset: 0,
            total_count: None,
            has_more: true,
            loading: false,
            signature: None,
        }
    }
}

/// How a delivered fetch result was handled.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchApplied<T> {
    /// Rows accepted; the host appends them to its row store and re-derives
    /// the filtered/sorted dataset.
    Applied { rows: Vec<T>, has_more: bool },
    /// Signature or cursor mismatch; rows were discarded.
    Stale,
}

/// Coordinates incremental fetching with the windowing engine.
#[derive(Debug)]
pub struct StreamAdapter {
    state: StreamState,
    in_flight: Option<FetchRequest>,
    /// Raw row count still wanted by `ensure_capacity`, when a goal is open.
    capacity_goal: Option<usize>,
    /// Fetch rounds spent on the open capacity goal.
    rounds: usize,
    status: Option<StreamError>,
    page_size: usize,
    prefetch_threshold: f32,
    max_fetch_rounds: usize,
}

impl StreamAdapter {
    pub fn new(config: &WindowingConfig) -> Self {
        Self {
            state: StreamState::default(),
            in_flight: None,
            capacity_goal: None,
            rounds: 0,
            status: None,
            page_size: config.stream_page_size.max(1),
            prefetch_threshold: config.prefetch_threshold,
            max_fetch_rounds: config.max_fetch_rounds.max(1),
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Rows fetched so far for the current signature.
    pub fn raw_count(&self) -> usize {
        self.state.next_offset
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Last surfaced fetch failure, until dismissed.
    pub fn status(&self) -> Option<&StreamError> {
        self.status.as_ref()
    }

    pub fn dismiss_status(&mut self) {
        self.status = None;
    }

    /// Restarts the cursor for a new filter signature.
    ///
    /// Previously fetched rows no longer apply to the new query; the host
    /// drops (or re-filters) its row store while the cursor restarts from
    /// zero. A fetch already in flight is left to finish and will be
    /// discarded by the signature check on completion.
    pub fn reset(&mut self, signature: FilterSignature) {
        self.state = StreamState {
            signature: Some(signature),
            ..StreamState::default()
        };
        self.in_flight = None;
        self.capacity_goal = None;
        self.rounds = 0;
        self.status = None;
    }

    /// Asks the backend for enough raw rows to cover `target` items.
    ///
    /// Event-driven loop: one page is requested now, and each completion
    /// requests the next until the goal is met, the backend is exhausted, or
    /// the bounded round count runs out (a backend that keeps returning short
    /// pages must not loop forever).
    pub fn ensure_capacity(&mut self, target: usize, source: &mut impl FetchSource) {
        if self.raw_count() >= target || !self.state.has_more {
            return;
        }
        let target = self.capacity_goal.map_or(target, |goal| goal.max(target));
        self.capacity_goal = Some(target);
        self.rounds = 0;
        self.start_fetch(source);
    }

    /// Opportunistic background fetch when the window's trailing edge nears
    /// the end of locally available rows.
    pub fn maybe_prefetch(&mut self, anchor_index: usize, source: &mut impl FetchSource) {
        if self.state.loading || !self.state.has_more {
            return;
        }
        let fetched = self.raw_count();
        if fetched == 0 {
            // Nothing resident yet; this is initial-load territory, which
            // ensure_capacity handles.
            return;
        }
        if anchor_index as f32 / fetched as f32 >= self.prefetch_threshold {
            self.start_fetch(source);
        }
    }

    /// Delivers a successful fetch result.
    ///
    /// Applied only when the request's signature still matches the current
    /// one and its offset matches the cursor; anything else is a stale or
    /// duplicate resolution and is dropped without touching state.
    pub fn complete<T>(
        &mut self,
        request: &FetchRequest,
        page: FetchPage<T>,
        source: &mut impl FetchSource,
    ) -> FetchApplied<T> {
        if self.in_flight.as_ref() == Some(request) {
            self.in_flight = None;
            self.state.loading = false;
        }

        if Some(&request.signature) != self.state.signature.as_ref()
            || request.offset != self.state.next_offset
        {
            log::debug!(
                "discarding stale fetch result (offset {}, signature {})",
                request.offset,
                request.signature
            );
            return FetchApplied::Stale;
        }

        let fetched = page.rows.len();
        self.state.next_offset += fetched;
        if page.total_count.is_some() {
            self.state.total_count = page.total_count;
        }
        let exhausted_by_count = self
            .state
            .total_count
            .is_some_and(|total| self.state.next_offset >= total);
        if fetched < request.limit || exhausted_by_count {
            self.state.has_more = false;
        }

        self.continue_capacity_goal(source);

        FetchApplied::Applied {
            rows: page.rows,
            has_more: self.state.has_more,
        }
    }

    /// Delivers a failed fetch.
    ///
    /// Surfaces a status for the current signature, keeps rendered rows, and
    /// does not retry automatically; the next prefetch trigger will.
    pub fn fail(&mut self, request: &FetchRequest, message: impl Into<String>) {
        if self.in_flight.as_ref() == Some(request) {
            self.in_flight = None;
            self.state.loading = false;
        }
        if Some(&request.signature) == self.state.signature.as_ref() {
            self.capacity_goal = None;
            self.status = Some(StreamError::Fetch {
                message: message.into(),
            });
        }
    }

    fn continue_capacity_goal(&mut self, source: &mut impl FetchSource) {
        let Some(goal) = self.capacity_goal else {
            return;
        };
        if self.raw_count() >= goal || !self.state.has_more {
            self.capacity_goal = None;
            return;
        }
        self.rounds += 1;
        if self.rounds >= self.max_fetch_rounds {
            log::warn!(
                "capacity goal of {goal} rows abandoned after {} short fetch rounds",
                self.rounds
            );
            self.capacity_goal = None;
            return;
        }
        self.start_fetch(source);
    }

    /// Starts a fetch unless one is already in flight (concurrent triggers
    /// coalesce onto the single outstanding request).
    fn start_fetch(&mut self, source: &mut impl FetchSource) {
        if self.in_flight.is_some() || !self.state.has_more {
            return;
        }
        let Some(signature) = self.state.signature.clone() else {
            return;
        };
        let request = FetchRequest {
            offset: self.state.next_offset,
            limit: self.page_size,
            signature,
        };
        self.state.loading = true;
        self.in_flight = Some(request.clone());
        source.begin_fetch(&request);
    }
}
