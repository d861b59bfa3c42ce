//! Visible-range calculation.
//!
//! [`compute_range`] is the pure heart of the engine: given the dataset
//! length, the scroll position, and the grid metrics it returns the item
//! range to materialize plus the spacer paddings that reconstruct the full
//! scrollable extent. It is O(1) and called on every scroll tick, so it never
//! iterates the dataset.

use crate::metrics::GridMetrics;

/// The contiguous sub-range of dataset indices currently materialized,
/// together with the spacer heights above and below it.
///
/// Invariants maintained by [`compute_range`]:
/// - `0 <= start <= end <= data_len`
/// - `start` is row-aligned
/// - `top_padding + rendered_rows * row_height + bottom_padding` equals the
///   total scrollable extent, within float tolerance
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VirtualRange {
    /// First materialized item index, inclusive.
    pub start: usize,
    /// One past the last materialized item index.
    pub end: usize,
    /// Spacer height above the rendered slice.
    pub top_padding: f32,
    /// Spacer height below the rendered slice.
    pub bottom_padding: f32,
}

impl VirtualRange {
    pub const EMPTY: VirtualRange = VirtualRange {
        start: 0,
        end: 0,
        top_padding: 0.0,
        bottom_padding: 0.0,
    };

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether start/end moved relative to `other`. Padding-only drift does
    /// not count as a change for the repaint short-circuit.
    pub fn same_span(&self, other: &VirtualRange) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// Computes the visible item range for the current scroll position.
///
/// `scroll_offset` is the host surface's scroll position, `container_top` the
/// grid's offset from the scroll origin. The viewport is assumed validated by
/// the caller (see [`ludex_core::ViewportExtent`]); non-positive heights fall
/// back to six rows so a not-yet-laid-out surface still yields a sane range.
pub fn compute_range(
    data_len: usize,
    scroll_offset: f32,
    container_top: f32,
    viewport_height: f32,
    metrics: &GridMetrics,
    overscan_rows: usize,
) -> VirtualRange {
    if data_len == 0 {
        return VirtualRange::EMPTY;
    }

    let row_height = metrics.row_height.max(1.0);
    let columns = metrics.columns.max(1);
    let viewport = if viewport_height.is_finite() && viewport_height > 0.0 {
        viewport_height
    } else {
        row_height * 6.0
    };
    let scroll = if scroll_offset.is_finite() {
        scroll_offset
    } else {
        0.0
    };
    let top = if container_top.is_finite() {
        container_top
    } else {
        0.0
    };

    let total_rows = data_len.div_ceil(columns);

    // Row at the top of the window, overscan applied, clamped so at least the
    // last row is rendered when scrolled past the end.
    let start_offset = (scroll - top - row_height * overscan_rows as f32).max(0.0);
    let start_row = ((start_offset / row_height) as usize).min(total_rows - 1);

    // Rows covering the viewport plus overscan on both sides.
    let rows_in_view = (viewport / row_height).ceil() as usize + overscan_rows * 2;

    let start = start_row * columns;
    // Floor of one full row even when rows_in_view rounds to zero.
    let span = (rows_in_view * columns).max(columns);
    let end = (start + span).min(data_len);

    let end_row = end.div_ceil(columns);
    let top_padding = start_row as f32 * row_height;
    let bottom_padding = ((total_rows - end_row) as f32 * row_height).max(0.0);

    VirtualRange {
        start,
        end,
        top_padding,
        bottom_padding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: GridMetrics = GridMetrics {
        row_height: 360.0,
        columns: 4,
        gap: 0.0,
    };

    fn range_at(data_len: usize, scroll: f32) -> VirtualRange {
        compute_range(data_len, scroll, 0.0, 800.0, &METRICS, 2)
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(range_at(0, 500.0), VirtualRange::EMPTY);
    }

    #[test]
    fn test_top_of_list() {
        let range = range_at(10_000, 0.0);
        assert_eq!(range.start, 0);
        assert!(range.end >= 20 && range.end <= 40, "end = {}", range.end);
        assert_eq!(range.top_padding, 0.0);
        assert!(range.bottom_padding > 0.0);
    }

    #[test]
    fn test_scrolled_to_exact_bottom() {
        let total_rows = 10_000usize.div_ceil(4);
        let range = range_at(10_000, total_rows as f32 * 360.0);
        assert_eq!(range.end, 10_000);
        assert_eq!(range.bottom_padding, 0.0);
    }

    #[test]
    fn test_scrolled_far_past_the_end() {
        let range = range_at(100, 1.0e9);
        assert_eq!(range.end, 100);
        assert_eq!(range.bottom_padding, 0.0);
        assert!(range.start <= range.end);
    }

    #[test]
    fn test_range_is_ordered_and_clamped() {
        for data_len in [1usize, 3, 4, 5, 79, 80, 1000, 10_000] {
            for scroll in [0.0f32, 1.0, 359.0, 360.0, 10_000.0, 1.0e7] {
                let range = range_at(data_len, scroll);
                assert!(range.start <= range.end);
                assert!(range.end <= data_len);
                assert!(range.top_padding >= 0.0);
                assert!(range.bottom_padding >= 0.0);
            }
        }
    }

    #[test]
    fn test_paddings_reconstruct_total_extent() {
        for data_len in [1usize, 5, 100, 9_999, 10_000] {
            for scroll in [0.0f32, 723.0, 5_000.0, 900_000.0] {
                let range = range_at(data_len, scroll);
                let rendered_rows = (range.end - range.start).div_ceil(4);
                let reconstructed = range.top_padding
                    + rendered_rows as f32 * 360.0
                    + range.bottom_padding;
                let total = data_len.div_ceil(4) as f32 * 360.0;
                assert!(
                    (reconstructed - total).abs() < 0.5,
                    "len={data_len} scroll={scroll}: {reconstructed} != {total}"
                );
            }
        }
    }

    #[test]
    fn test_at_least_one_row_for_tiny_viewport() {
        let range = compute_range(100, 0.0, 0.0, 0.5, &METRICS, 0);
        assert!(range.len() >= 4);
    }

    #[test]
    fn test_container_offset_shifts_start() {
        let below_fold = compute_range(10_000, 2000.0, 2000.0, 800.0, &METRICS, 0);
        assert_eq!(below_fold.start, 0);
        let scrolled = compute_range(10_000, 2720.0, 2000.0, 800.0, &METRICS, 0);
        assert_eq!(scrolled.start, 2 * 4);
    }

    #[test]
    fn test_single_partial_row() {
        let range = range_at(3, 0.0);
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 3);
        assert_eq!(range.top_padding, 0.0);
        assert_eq!(range.bottom_padding, 0.0);
    }
}
