//! Engine configuration.

use ludex_core::Size;

/// Dataset size below which the grid is rendered directly, without pooling.
pub const VIRTUALIZE_MIN_ITEMS: usize = 80;

/// Extra rows rendered beyond the viewport on each side.
pub const DEFAULT_OVERSCAN_ROWS: usize = 2;

/// Hard cap on overscan, guarding against pathological configuration.
pub const MAX_OVERSCAN_ROWS: usize = 16;

/// Card box size assumed before the first real measurement.
pub const DEFAULT_ITEM_SIZE: Size = Size {
    width: 260.0,
    height: 360.0,
};

/// Gap between cards, in pixels.
pub const DEFAULT_GAP: f32 = 16.0;

/// Fraction of locally available rows consumed before a background fetch.
pub const DEFAULT_PREFETCH_THRESHOLD: f32 = 0.65;

/// Rows requested per incremental fetch.
pub const DEFAULT_STREAM_PAGE_SIZE: usize = 400;

/// Bound on consecutive fetch rounds spent satisfying one capacity goal.
/// Prevents runaway looping against a backend that keeps returning short
/// pages.
pub const DEFAULT_MAX_FETCH_ROUNDS: usize = 16;

/// Tunables for a [`WindowingSession`](crate::WindowingSession).
///
/// The defaults reproduce the collection browser's production values; tests
/// override individual fields with struct-update syntax.
#[derive(Clone, Copy, Debug)]
pub struct WindowingConfig {
    /// Minimum dataset size for pooled windowed rendering.
    pub virtualize_min_items: usize,
    /// Overscan rows above and below the viewport.
    pub overscan_rows: usize,
    /// Fallback item size used until geometry reports a measured item.
    pub default_item_size: Size,
    /// Inter-item gap in both axes.
    pub gap: f32,
    /// Items per browse page (infinite batch size and paged page size).
    pub page_size: usize,
    /// Prefetch trigger ratio, see [`DEFAULT_PREFETCH_THRESHOLD`].
    pub prefetch_threshold: f32,
    /// Rows per incremental fetch.
    pub stream_page_size: usize,
    /// Bound on fetch rounds per capacity goal.
    pub max_fetch_rounds: usize,
}

impl Default for WindowingConfig {
    fn default() -> Self {
        Self {
            virtualize_min_items: VIRTUALIZE_MIN_ITEMS,
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            default_item_size: DEFAULT_ITEM_SIZE,
            gap: DEFAULT_GAP,
            page_size: crate::browse::DEFAULT_PAGE_SIZE,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            stream_page_size: DEFAULT_STREAM_PAGE_SIZE,
            max_fetch_rounds: DEFAULT_MAX_FETCH_ROUNDS,
        }
    }
}

impl WindowingConfig {
    /// Overscan clamped to the safety cap.
    pub fn effective_overscan(&self) -> usize {
        self.overscan_rows.min(MAX_OVERSCAN_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_values() {
        let config = WindowingConfig::default();
        assert_eq!(config.virtualize_min_items, 80);
        assert_eq!(config.overscan_rows, 2);
        assert_eq!(config.page_size, 24);
        assert_eq!(config.stream_page_size, 400);
    }

    #[test]
    fn test_overscan_is_capped() {
        let config = WindowingConfig {
            overscan_rows: 1000,
            ..Default::default()
        };
        assert_eq!(config.effective_overscan(), MAX_OVERSCAN_ROWS);
    }
}
