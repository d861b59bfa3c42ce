//! Render-node pool with index-affine recycling.
//!
//! The pool owns a monotonically growing set of render targets. Each pass
//! assigns the window's dataset indices to slots, preferring the slot that
//! already holds an index (so overlapping ranges repaint only the delta), and
//! parks every untouched slot hidden instead of destroying it. Allocation
//! therefore only happens when the viewport grows, never during steady-state
//! scrolling.

use std::ops::Range;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A host render node the pool can park and reveal.
///
/// Painting an item into the node is a black box supplied per pass; the pool
/// only needs visibility control.
pub trait RenderTarget {
    /// Parks or reveals the node without destroying it.
    fn set_hidden(&mut self, hidden: bool);
}

/// One pooled render node.
#[derive(Debug)]
pub struct PoolSlot<R> {
    target: R,
    in_use: bool,
    /// Dataset index currently painted into the node, `None` when parked.
    assigned: Option<usize>,
}

impl<R> PoolSlot<R> {
    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn assigned(&self) -> Option<usize> {
        self.assigned
    }

    pub fn is_in_use(&self) -> bool {
        self.in_use
    }
}

/// Lifetime counters for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Total slots ever created.
    pub slots: usize,
    /// Slots holding a visible item after the last pass.
    pub in_use: usize,
    /// Paint callbacks issued over the pool's lifetime.
    pub painted: u64,
    /// Parked slots recycled for a new index.
    pub recycled: u64,
    /// Assignments skipped because the slot already held the index.
    pub short_circuited: u64,
}

/// Result of one [`NodePool::render_slice`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlicePass {
    /// Items painted this pass.
    pub painted: usize,
    /// Items whose slot assignment was unchanged and skipped.
    pub short_circuited: usize,
}

/// Reusable set of render targets keyed by dataset index.
#[derive(Debug, Default)]
pub struct NodePool<R> {
    slots: Vec<PoolSlot<R>>,
    /// Dataset index -> slot position, for index-affine reuse.
    by_index: FxHashMap<usize, usize>,
    painted: u64,
    recycled: u64,
    short_circuited: u64,
}

impl<R: RenderTarget> NodePool<R> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            by_index: FxHashMap::default(),
            painted: 0,
            recycled: 0,
            short_circuited: 0,
        }
    }

    /// Number of slots ever created. Never decreases.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[PoolSlot<R>] {
        &self.slots
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            slots: self.slots.len(),
            in_use: self.slots.iter().filter(|slot| slot.in_use).count(),
            painted: self.painted,
            recycled: self.recycled,
            short_circuited: self.short_circuited,
        }
    }

    /// Renders `range` (indices into `items`) through the pool.
    ///
    /// `paint` receives the item, its index, and the slot's render target; it
    /// is only invoked for indices whose assignment actually changed.
    /// `factory` creates a fresh render target when no parked slot is
    /// available.
    pub fn render_slice<T>(
        &mut self,
        items: &[T],
        range: Range<usize>,
        factory: &mut dyn FnMut() -> R,
        paint: &mut dyn FnMut(&T, usize, &mut R),
    ) -> SlicePass {
        let range = range.start.min(items.len())..range.end.min(items.len());
        let mut pass = SlicePass::default();

        for slot in &mut self.slots {
            slot.in_use = false;
        }

        // First claim slots that already hold an in-range index; their
        // content is current and must not be stolen by the fill loop below.
        let mut unassigned: SmallVec<[usize; 32]> = SmallVec::new();
        for index in range {
            if let Some(&slot_pos) = self.by_index.get(&index) {
                let slot = &mut self.slots[slot_pos];
                slot.in_use = true;
                slot.target.set_hidden(false);
                pass.short_circuited += 1;
                self.short_circuited += 1;
            } else {
                unassigned.push(index);
            }
        }

        for index in unassigned {
            let slot_pos = self.acquire(factory);
            let slot = &mut self.slots[slot_pos];
            if let Some(previous) = slot.assigned.take() {
                self.by_index.remove(&previous);
            }
            slot.assigned = Some(index);
            slot.in_use = true;
            slot.target.set_hidden(false);
            self.by_index.insert(index, slot_pos);
            paint(&items[index], index, &mut slot.target);
            pass.painted += 1;
            self.painted += 1;
        }

        self.release_unused();
        pass
    }

    /// Position of a parked slot, creating one when none is free.
    fn acquire(&mut self, factory: &mut dyn FnMut() -> R) -> usize {
        if let Some(pos) = self.slots.iter().position(|slot| !slot.in_use) {
            if self.slots[pos].assigned.is_some() {
                self.recycled += 1;
            }
            return pos;
        }
        self.slots.push(PoolSlot {
            target: factory(),
            in_use: false,
            assigned: None,
        });
        self.slots.len() - 1
    }

    /// Hides every slot not claimed by the current pass.
    fn release_unused(&mut self) {
        for slot in &mut self.slots {
            if !slot.in_use {
                if let Some(index) = slot.assigned.take() {
                    self.by_index.remove(&index);
                }
                slot.target.set_hidden(true);
            }
        }
    }

    /// Drops all index assignments without touching the nodes.
    ///
    /// Called when the dataset identity changes: every slot's content is
    /// stale, so the next pass repaints whatever becomes visible.
    pub fn invalidate(&mut self) {
        self.by_index.clear();
        for slot in &mut self.slots {
            slot.assigned = None;
        }
    }

    /// Parks every slot and clears assignments. Slots are kept for reuse.
    pub fn release_all(&mut self) {
        self.by_index.clear();
        for slot in &mut self.slots {
            slot.in_use = false;
            slot.assigned = None;
            slot.target.set_hidden(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct TestNode {
        hidden: bool,
        painted_index: Option<usize>,
        paint_count: usize,
    }

    impl RenderTarget for TestNode {
        fn set_hidden(&mut self, hidden: bool) {
            self.hidden = hidden;
        }
    }

    fn render(pool: &mut NodePool<TestNode>, items: &[u32], range: Range<usize>) -> SlicePass {
        pool.render_slice(
            items,
            range,
            &mut TestNode::default,
            &mut |_, index, node| {
                node.painted_index = Some(index);
                node.paint_count += 1;
            },
        )
    }

    #[test]
    fn test_first_pass_paints_everything() {
        let items: Vec<u32> = (0..100).collect();
        let mut pool = NodePool::new();
        let pass = render(&mut pool, &items, 0..40);
        assert_eq!(pass.painted, 40);
        assert_eq!(pass.short_circuited, 0);
        assert_eq!(pool.len(), 40);
    }

    #[test]
    fn test_overlapping_ranges_repaint_only_the_delta() {
        let items: Vec<u32> = (0..100).collect();
        let mut pool = NodePool::new();
        render(&mut pool, &items, 0..40);

        let pass = render(&mut pool, &items, 10..50);
        assert_eq!(pass.short_circuited, 30);
        assert_eq!(pass.painted, 10);
        // Slots already holding 10..40 were left untouched.
        for slot in pool.slots() {
            if let Some(index) = slot.assigned() {
                assert_eq!(slot.target().painted_index, Some(index));
                if (10..40).contains(&index) {
                    assert_eq!(slot.target().paint_count, 1);
                }
            }
        }
    }

    #[test]
    fn test_pool_never_shrinks() {
        let items: Vec<u32> = (0..100).collect();
        let mut pool = NodePool::new();
        render(&mut pool, &items, 0..40);
        assert_eq!(pool.len(), 40);

        render(&mut pool, &items, 0..8);
        assert_eq!(pool.len(), 40, "unused slots are parked, not destroyed");
        let stats = pool.stats();
        assert_eq!(stats.in_use, 8);
        assert_eq!(
            pool.slots().iter().filter(|s| s.target().hidden).count(),
            32
        );
    }

    #[test]
    fn test_parked_slots_are_recycled_before_allocating() {
        let items: Vec<u32> = (0..200).collect();
        let mut pool = NodePool::new();
        render(&mut pool, &items, 0..40);
        // A disjoint range reuses the 40 parked slots wholesale.
        render(&mut pool, &items, 100..140);
        assert_eq!(pool.len(), 40);
        assert!(pool.stats().recycled >= 40);
    }

    #[test]
    fn test_invalidate_forces_repaint_of_same_range() {
        let items: Vec<u32> = (0..100).collect();
        let mut pool = NodePool::new();
        render(&mut pool, &items, 0..20);
        pool.invalidate();
        let pass = render(&mut pool, &items, 0..20);
        assert_eq!(pass.painted, 20);
        assert_eq!(pass.short_circuited, 0);
    }

    #[test]
    fn test_release_all_hides_everything() {
        let items: Vec<u32> = (0..100).collect();
        let mut pool = NodePool::new();
        render(&mut pool, &items, 0..20);
        pool.release_all();
        assert!(pool.slots().iter().all(|s| s.target().hidden));
        assert_eq!(pool.stats().in_use, 0);
        assert_eq!(pool.len(), 20);
    }

    #[test]
    fn test_range_clamped_to_items() {
        let items: Vec<u32> = (0..10).collect();
        let mut pool = NodePool::new();
        let pass = render(&mut pool, &items, 5..50);
        assert_eq!(pass.painted, 5);
    }
}
