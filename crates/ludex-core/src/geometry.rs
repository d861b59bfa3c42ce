//! Geometry capability for the windowing engine.
//!
//! Range math and metrics estimation only ever read measurements through the
//! [`Geometry`] trait, so they stay pure and testable without a rendering
//! surface. [`FakeGeometry`] is the test implementation.

/// A measured width/height pair, in host pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether this size came from a real layout pass.
    ///
    /// Measurement before first paint commonly reports zero; callers fall
    /// back to configured defaults in that case.
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Read-only geometry supplied by the host UI surface.
///
/// All values are in the host's pixel space. Implementations must be cheap:
/// these are read on every scroll tick.
pub trait Geometry {
    /// Content-box size of the scrollable container.
    fn container_size(&self) -> Size;

    /// Offset of the container's top edge from the scroll origin.
    fn container_top(&self) -> f32 {
        0.0
    }

    /// Box size of one rendered item, if any item has been painted yet.
    ///
    /// Returns `None` (or a zero size) before first paint; the metrics
    /// estimator substitutes configured defaults.
    fn item_size(&self) -> Option<Size>;

    /// Current scroll offset of the host surface.
    fn scroll_offset(&self) -> f32;

    /// Height of the visible viewport.
    fn viewport_height(&self) -> f32;
}

/// Maximum viewport height before treating it as unbounded.
const MAX_REASONABLE_VIEWPORT: f32 = 100_000.0;

/// Rows assumed visible when the viewport is unbounded.
const UNBOUNDED_FALLBACK_ROWS: f32 = 20.0;

/// Validated viewport height with unbounded-viewport fallback.
///
/// A container placed in an unconstrained parent can report an infinite (or
/// absurdly large) height. Rendering that many rows would defeat windowing
/// entirely, so the extent is replaced with an estimate covering a handful of
/// rows.
#[derive(Clone, Copy, Debug)]
pub struct ViewportExtent {
    effective: f32,
    unbounded: bool,
}

impl ViewportExtent {
    /// Validates `viewport_height`, substituting a fallback derived from
    /// `row_height` when the measurement is unbounded.
    pub fn new(viewport_height: f32, row_height: f32) -> Self {
        let unbounded = !viewport_height.is_finite() || viewport_height > MAX_REASONABLE_VIEWPORT;

        let effective = if unbounded {
            let estimated = row_height.max(1.0) * UNBOUNDED_FALLBACK_ROWS;
            log::warn!(
                "unbounded viewport height ({viewport_height}), falling back to {estimated}px; \
                 place the grid in a height-constrained container"
            );
            estimated
        } else {
            viewport_height
        };

        Self {
            effective,
            unbounded,
        }
    }

    /// The viewport height to use for range calculation.
    #[inline]
    pub fn effective(&self) -> f32 {
        self.effective
    }

    /// Whether the raw measurement was unbounded.
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }
}

/// In-memory [`Geometry`] for unit tests.
#[derive(Clone, Debug)]
pub struct FakeGeometry {
    pub container: Size,
    pub container_top: f32,
    pub item: Option<Size>,
    pub scroll: f32,
    pub viewport: f32,
}

impl FakeGeometry {
    /// A laid-out container with a measured item.
    pub fn new(container: Size, item: Size, viewport: f32) -> Self {
        Self {
            container,
            container_top: 0.0,
            item: Some(item),
            scroll: 0.0,
            viewport,
        }
    }

    /// Geometry as it looks before the first layout pass.
    pub fn unmeasured() -> Self {
        Self {
            container: Size::ZERO,
            container_top: 0.0,
            item: None,
            scroll: 0.0,
            viewport: 0.0,
        }
    }

    /// Returns a copy scrolled to `offset`.
    pub fn scrolled_to(&self, offset: f32) -> Self {
        let mut copy = self.clone();
        copy.scroll = offset;
        copy
    }
}

impl Geometry for FakeGeometry {
    fn container_size(&self) -> Size {
        self.container
    }

    fn container_top(&self) -> f32 {
        self.container_top
    }

    fn item_size(&self) -> Option<Size> {
        self.item
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    fn viewport_height(&self) -> f32 {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_viewport_passes_through() {
        let extent = ViewportExtent::new(800.0, 376.0);
        assert_eq!(extent.effective(), 800.0);
        assert!(!extent.is_unbounded());
    }

    #[test]
    fn test_infinite_viewport_uses_fallback() {
        let extent = ViewportExtent::new(f32::INFINITY, 376.0);
        assert!(extent.is_unbounded());
        assert_eq!(extent.effective(), 376.0 * 20.0);
    }

    #[test]
    fn test_huge_viewport_treated_as_unbounded() {
        let extent = ViewportExtent::new(250_000.0, 100.0);
        assert!(extent.is_unbounded());
        assert!(extent.effective() < 100_000.0);
    }

    #[test]
    fn test_zero_row_height_still_produces_positive_fallback() {
        let extent = ViewportExtent::new(f32::NAN, 0.0);
        assert!(extent.is_unbounded());
        assert!(extent.effective() > 0.0);
    }

    #[test]
    fn test_unmeasured_size() {
        assert!(!Size::ZERO.is_measured());
        assert!(Size::new(260.0, 360.0).is_measured());
        assert!(!FakeGeometry::unmeasured()
            .item_size()
            .is_some_and(|s| s.is_measured()));
    }
}
