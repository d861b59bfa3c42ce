//! Browse mode: infinite growth vs discrete pages.
//!
//! Both modes present the same filtered/sorted dataset; they only differ in
//! which window of it the windowing controller gets to render. Infinite mode
//! grows a rendered prefix batch by batch; paged mode replaces the window
//! outright on every navigation. A mode switch is a reset point, never an
//! incremental adjustment.

use std::ops::Range;

/// Default items per page / infinite batch.
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Page sizes the pager UI offers.
pub const PAGE_SIZE_CHOICES: [usize; 4] = [12, 24, 48, 96];

/// Page buttons shown at once in the pager.
pub const PAGE_WINDOW_SIZE: usize = 5;

/// Snaps a requested page size to the nearest allowed choice.
pub fn normalize_page_size(value: usize) -> usize {
    if PAGE_SIZE_CHOICES.contains(&value) {
        value
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Pages needed for `total_items`, never less than one.
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if total_items == 0 || page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size)
}

/// Item index range covered by a 1-indexed page.
pub fn page_indices(page: usize, page_size: usize) -> Range<usize> {
    let page = page.max(1);
    let page_size = normalize_page_size(page_size);
    let start = (page - 1) * page_size;
    start..start + page_size
}

/// First and last page button to show, with the current page centered when
/// possible and the window clamped at both ends.
pub fn page_window(current_page: usize, total_pages: usize, window: usize) -> (usize, usize) {
    let window = window.max(1);
    let current = current_page.clamp(1, total_pages.max(1));
    let start = current.saturating_sub(window / 2).max(1);
    let end = (start + window - 1).min(total_pages.max(1));
    let start = end.saturating_sub(window - 1).max(1);
    (start, end)
}

/// A pager navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageNav {
    Prev,
    Next,
    Page(usize),
}

/// Resolves a navigation request to a new page, or `None` when it is invalid
/// or would not change the page.
pub fn resolve_nav(nav: PageNav, current_page: usize, total_pages: usize) -> Option<usize> {
    match nav {
        PageNav::Prev => (current_page > 1).then(|| current_page - 1),
        PageNav::Next => (current_page < total_pages).then(|| current_page + 1),
        PageNav::Page(page) => {
            (page >= 1 && page <= total_pages && page != current_page).then_some(page)
        }
    }
}

/// What the infinite-mode trailing-edge control can do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadMore {
    /// Whether anything more can be shown or fetched.
    pub more_available: bool,
    /// Items the next growth step will add.
    pub batch_size: usize,
}

/// Computes the load-more state for infinite mode.
///
/// `has_more` is the streaming adapter's flag: when the server still has
/// rows, the batch is a full page even if the local remainder is smaller.
pub fn load_more_state(
    rendered_count: usize,
    total_items: usize,
    page_size: usize,
    has_more: bool,
) -> LoadMore {
    let remaining = total_items.saturating_sub(rendered_count);
    let batch_size = if has_more || remaining == 0 {
        page_size
    } else {
        remaining.min(page_size)
    };
    LoadMore {
        more_available: remaining > 0 || has_more,
        batch_size,
    }
}

/// "Showing X of Y" summary line for the browse footer.
pub fn browse_summary(showing: usize, total: usize, loading: bool) -> String {
    if loading {
        format!("Showing {showing} of {total} \u{2022} Fetching more\u{2026}")
    } else {
        format!("Showing {showing} of {total}")
    }
}

/// Presentation policy for the filtered/sorted dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrowseMode {
    /// Grow-on-demand prefix of the dataset.
    #[default]
    Infinite,
    /// Discrete page turns.
    Paged,
}

/// Pagination bookkeeping shared by both modes.
///
/// `current_page`/`total_pages` only drive paged mode; `rendered_count` only
/// drives infinite mode. `page_size` is shared and survives mode switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationState {
    pub page_size: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub rendered_count: usize,
}

impl PaginationState {
    fn fresh(page_size: usize) -> Self {
        Self {
            page_size,
            current_page: 1,
            total_pages: 1,
            rendered_count: page_size,
        }
    }
}

/// Chooses the dataset window the windowing controller renders.
#[derive(Clone, Copy, Debug)]
pub struct BrowseController {
    mode: BrowseMode,
    pagination: PaginationState,
}

impl BrowseController {
    pub fn new(page_size: usize) -> Self {
        let page_size = normalize_page_size(page_size);
        Self {
            mode: BrowseMode::Infinite,
            pagination: PaginationState::fresh(page_size),
        }
    }

    pub fn mode(&self) -> BrowseMode {
        self.mode
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.pagination
    }

    /// Switches presentation mode. Preserves `page_size`, recomputes
    /// everything else from scratch. Returns whether the mode changed.
    pub fn set_mode(&mut self, mode: BrowseMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.pagination = PaginationState::fresh(self.pagination.page_size);
        true
    }

    /// Resets for a new filter/sort signature.
    pub fn reset(&mut self) {
        self.pagination = PaginationState::fresh(self.pagination.page_size);
    }

    /// Changes the page size, snapping to the allowed choices, and resets the
    /// window. Returns the normalized size.
    pub fn set_page_size(&mut self, page_size: usize) -> usize {
        let normalized = normalize_page_size(page_size);
        self.pagination = PaginationState::fresh(normalized);
        normalized
    }

    /// The dataset window to render for a dataset of `dataset_len` items.
    ///
    /// Also reconciles the pagination bookkeeping against the (possibly
    /// changed) dataset length: total pages are recomputed and the current
    /// page clamped.
    pub fn window_of(&mut self, dataset_len: usize) -> Range<usize> {
        match self.mode {
            BrowseMode::Infinite => {
                let end = self.pagination.rendered_count.min(dataset_len);
                self.pagination.total_pages =
                    total_pages(dataset_len, self.pagination.page_size);
                0..end
            }
            BrowseMode::Paged => {
                self.pagination.total_pages =
                    total_pages(dataset_len, self.pagination.page_size);
                self.pagination.current_page = self
                    .pagination
                    .current_page
                    .clamp(1, self.pagination.total_pages);
                let raw = page_indices(self.pagination.current_page, self.pagination.page_size);
                raw.start.min(dataset_len)..raw.end.min(dataset_len)
            }
        }
    }

    /// Grows the infinite window by one batch. No-op in paged mode. Returns
    /// whether the window grew.
    pub fn load_more(&mut self, dataset_len: usize, has_more: bool) -> bool {
        if self.mode != BrowseMode::Infinite {
            return false;
        }
        let state = load_more_state(
            self.pagination.rendered_count,
            dataset_len,
            self.pagination.page_size,
            has_more,
        );
        if !state.more_available {
            return false;
        }
        self.pagination.rendered_count += state.batch_size;
        true
    }

    /// Applies a pager navigation. No-op in infinite mode. Returns the new
    /// page when navigation happened.
    pub fn navigate(&mut self, nav: PageNav, dataset_len: usize) -> Option<usize> {
        if self.mode != BrowseMode::Paged {
            return None;
        }
        self.pagination.total_pages = total_pages(dataset_len, self.pagination.page_size);
        let new_page = resolve_nav(nav, self.pagination.current_page, self.pagination.total_pages)?;
        self.pagination.current_page = new_page;
        Some(new_page)
    }

    /// Raw rows the streaming adapter must have fetched to cover the current
    /// window's end, used before rendering a page turn or a growth step.
    pub fn target_capacity(&self) -> usize {
        match self.mode {
            BrowseMode::Infinite => self.pagination.rendered_count,
            BrowseMode::Paged => {
                page_indices(self.pagination.current_page, self.pagination.page_size).end
            }
        }
    }
}
