//! Row and column metrics estimation.
//!
//! Converts raw geometry (container width, measured item box) into the grid
//! metrics the range calculator consumes. Measurement before first paint
//! commonly reports zero; the estimator falls back to configured defaults so
//! the engine always has usable metrics.

use ludex_core::{Geometry, Size};

/// Derived grid metrics: how tall a row is and how many items share it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMetrics {
    /// Full row stride, item height plus gap. Always positive.
    pub row_height: f32,
    /// Items per row. Always at least 1.
    pub columns: usize,
    /// Inter-item gap carried through for positioning.
    pub gap: f32,
}

impl GridMetrics {
    /// Rows needed to hold `item_count` items.
    pub fn rows_for(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.columns.max(1))
    }

    /// Total scrollable extent for `item_count` items.
    pub fn total_height(&self, item_count: usize) -> f32 {
        self.rows_for(item_count) as f32 * self.row_height
    }
}

/// Estimates columns from container and item widths.
///
/// `floor((container + gap) / (item + gap))`, clamped to at least one column.
/// Degenerate widths collapse to a single column rather than erroring.
pub fn estimate_columns(container_width: f32, item_width: f32, gap: f32) -> usize {
    if !container_width.is_finite() || container_width <= 0.0 {
        return 1;
    }
    if !item_width.is_finite() || item_width <= 0.0 {
        return 1;
    }
    let gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
    let estimate = ((container_width + gap) / (item_width + gap)).floor();
    (estimate as usize).max(1)
}

/// Derives [`GridMetrics`] from host geometry.
///
/// Stateless apart from the configured fallbacks; the windowing controller
/// decides *when* to re-measure (after resize, or after the first render with
/// real content).
#[derive(Clone, Copy, Debug)]
pub struct MetricsEstimator {
    default_item_size: Size,
    gap: f32,
}

impl MetricsEstimator {
    pub fn new(default_item_size: Size, gap: f32) -> Self {
        Self {
            default_item_size,
            gap: gap.max(0.0),
        }
    }

    /// The metrics used before any measurement has happened.
    pub fn fallback(&self) -> GridMetrics {
        GridMetrics {
            row_height: self.default_item_size.height + self.gap,
            columns: 1,
            gap: self.gap,
        }
    }

    /// Measures the current grid, substituting defaults for anything the
    /// geometry cannot report yet.
    pub fn measure(&self, geometry: &impl Geometry) -> GridMetrics {
        let item = geometry
            .item_size()
            .filter(Size::is_measured)
            .unwrap_or(self.default_item_size);

        let columns = estimate_columns(geometry.container_size().width, item.width, self.gap);

        GridMetrics {
            row_height: item.height.max(1.0) + self.gap,
            columns,
            gap: self.gap,
        }
    }
}
