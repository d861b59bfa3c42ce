//! Incremental windowing for large scrollable grids.
//!
//! The crate renders only the rows near the viewport of a uniform grid and
//! keeps the scrollbar honest with top/bottom spacer padding. It is built
//! from small pieces that a host wires together, or drives through one
//! [`WindowingSession`]:
//!
//! - [`compute_range`] turns scroll geometry into a [`VirtualRange`] in O(1).
//! - [`MetricsEstimator`] derives [`GridMetrics`] from measured or fallback
//!   item sizes.
//! - [`NodePool`] recycles host render nodes so steady-state scrolling
//!   allocates nothing.
//! - [`WindowingController`] coalesces scroll/resize signals into one pass
//!   per frame.
//! - [`BrowseController`] maps infinite-scroll or paged presentation onto
//!   the dataset.
//! - [`StreamAdapter`] pulls rows from a remote source ahead of the scroll
//!   position.
//!
//! The host owns the dataset and the render nodes; everything here is plain
//! single-threaded state driven by explicit events.

mod browse;
mod config;
mod metrics;
mod pool;
mod range;
mod session;
mod stream;
mod windowing;

pub use browse::{
    browse_summary, load_more_state, normalize_page_size, page_indices, page_window, resolve_nav,
    total_pages, BrowseController, BrowseMode, LoadMore, PageNav, PaginationState,
    DEFAULT_PAGE_SIZE, PAGE_SIZE_CHOICES, PAGE_WINDOW_SIZE,
};
pub use config::{
    WindowingConfig, DEFAULT_GAP, DEFAULT_ITEM_SIZE, DEFAULT_MAX_FETCH_ROUNDS,
    DEFAULT_OVERSCAN_ROWS, DEFAULT_PREFETCH_THRESHOLD, DEFAULT_STREAM_PAGE_SIZE,
    MAX_OVERSCAN_ROWS, VIRTUALIZE_MIN_ITEMS,
};
pub use metrics::{estimate_columns, GridMetrics, MetricsEstimator};
pub use pool::{NodePool, PoolSlot, PoolStats, RenderTarget, SlicePass};
pub use range::{compute_range, VirtualRange};
pub use session::WindowingSession;
pub use stream::{
    FetchApplied, FetchPage, FetchRequest, FetchSource, StreamAdapter, StreamError, StreamState,
};
pub use windowing::{should_virtualize, UpdateOutcome, VirtualizationState, WindowingController};
