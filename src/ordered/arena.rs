//! Index-addressed node storage shared by the tree engines.
//!
//! Every tree owns an [`Arena`]: a `Vec` of slots with an embedded free
//! list. Nodes are addressed by `u32` indices with [`NIL`] as the null
//! sentinel, so parent pointers and ring pointers are plain indices and
//! never fight the borrow checker. A node keeps its index for its whole
//! lifetime; removal pushes the slot onto the free list for reuse.

use std::mem;

/// Null sentinel for node indices.
pub(crate) const NIL: u32 = u32::MAX;

/// A storage slot: either a live node or a free-list entry.
#[derive(Clone, Debug)]
enum Slot<N> {
    Occupied(N),
    Vacant { next_free: u32 },
}

/// `Vec`-backed node pool with an embedded free list.
#[derive(Clone, Debug)]
pub(crate) struct Arena<N> {
    slots: Vec<Slot<N>>,
    free_head: u32,
}

impl<N> Arena<N> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NIL,
        }
    }

    /// Total number of slots, live and vacant.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Stores `node` and returns its index, reusing a vacant slot if one
    /// exists.
    pub(crate) fn allocate(&mut self, node: N) -> u32 {
        if self.free_head == NIL {
            let index = self.slots.len();
            assert!(index < NIL as usize, "arena capacity exhausted");
            self.slots.push(Slot::Occupied(node));
            return index as u32;
        }
        let index = self.free_head;
        match mem::replace(&mut self.slots[index as usize], Slot::Occupied(node)) {
            Slot::Vacant { next_free } => self.free_head = next_free,
            Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
        }
        index
    }

    /// Releases the node at `index` back to the free list and returns it.
    pub(crate) fn release(&mut self, index: u32) -> N {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        match mem::replace(&mut self.slots[index as usize], vacant) {
            Slot::Occupied(node) => {
                self.free_head = index;
                node
            }
            Slot::Vacant { .. } => unreachable!("released a vacant slot"),
        }
    }

    /// Returns the live node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not name a live node.
    pub(crate) fn get(&self, index: u32) -> &N {
        match &self.slots[index as usize] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("node handle does not name a live node"),
        }
    }

    /// Mutable access to the live node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not name a live node.
    pub(crate) fn get_mut(&mut self, index: u32) -> &mut N {
        match &mut self.slots[index as usize] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("node handle does not name a live node"),
        }
    }

    /// Whether `index` names a live node.
    pub(crate) fn contains(&self, index: u32) -> bool {
        (index as usize) < self.slots.len()
            && matches!(self.slots[index as usize], Slot::Occupied(_))
    }

    /// Drops every slot. Iterative, so deep trees cannot overflow the
    /// stack on teardown.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = NIL;
    }
}

impl<N> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::{Arena, NIL};
    use rstest::rstest;

    #[rstest]
    fn test_allocate_returns_dense_indices() {
        let mut arena = Arena::new();
        assert_eq!(arena.allocate("a"), 0);
        assert_eq!(arena.allocate("b"), 1);
        assert_eq!(arena.allocate("c"), 2);
        assert_eq!(arena.capacity(), 3);
    }

    #[rstest]
    fn test_release_recycles_most_recent_slot_first() {
        let mut arena = Arena::new();
        let first = arena.allocate(1);
        let second = arena.allocate(2);
        assert_eq!(arena.release(first), 1);
        assert_eq!(arena.release(second), 2);
        // LIFO reuse: the last released slot comes back first.
        assert_eq!(arena.allocate(3), second);
        assert_eq!(arena.allocate(4), first);
        assert_eq!(arena.capacity(), 2);
    }

    #[rstest]
    fn test_contains_tracks_liveness() {
        let mut arena = Arena::new();
        let index = arena.allocate(42);
        assert!(arena.contains(index));
        arena.release(index);
        assert!(!arena.contains(index));
        assert!(!arena.contains(NIL));
    }

    #[rstest]
    #[should_panic(expected = "live node")]
    fn test_get_vacant_slot_panics() {
        let mut arena = Arena::new();
        let index = arena.allocate(7);
        arena.release(index);
        let _ = arena.get(index);
    }

    #[rstest]
    fn test_clear_empties_everything() {
        let mut arena = Arena::new();
        let _ = arena.allocate(1);
        let _ = arena.allocate(2);
        arena.clear();
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.allocate(3), 0);
    }
}
