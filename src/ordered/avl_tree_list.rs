//! Sorted list: an AVL tree threaded with a circular neighbor ring.
//!
//! This module provides [`AvlTreeList`], which layers a circular
//! doubly-linked ring in sorted order over the parent-linked tree of
//! [`AvlTree`]. The tree answers keyed queries in O(log N); the ring
//! answers ordered-neighbor queries in O(1).
//!
//! - O(log N) find / insert / remove
//! - O(1) `first` / `last` / `next` / `prev`
//! - O(N) in-order traversal following ring links only
//!
//! # Examples
//!
//! ```rust
//! use avl_collections::ordered::AvlTreeList;
//!
//! let mut list = AvlTreeList::new();
//! for number in [30, 10, 40, 20, 50] {
//!     list.insert(number);
//! }
//!
//! let first = list.first().unwrap();
//! assert_eq!(list.item(first), &10);
//! assert_eq!(list.item(list.next(first)), &20);
//!
//! let last = list.last().unwrap();
//! assert_eq!(list.item(last), &50);
//! // The ring is circular: the last item's successor is the first.
//! assert_eq!(list.next(last), first);
//! ```
//!
//! # How the ring stays consistent
//!
//! Rotations permute parent/child links but never change the in-order
//! sequence, so the ring is untouched by rebalancing. The two events that
//! do change the sequence are handled directly: a freshly attached node
//! is the immediate predecessor of its parent when attached on the left
//! and the immediate successor when attached on the right, so insertion
//! splices next to the attachment parent; removal unlinks the node's own
//! ring entry. The ring links live in a column beside the tree's node
//! arena, indexed by the same node indices.

use super::arena::NIL;
use super::avl_tree::AvlTree;
use super::{CapacityError, Comparator, NaturalOrder, NodeHandle, OrderedIndex, Side, WalkError};
use std::fmt;

// =============================================================================
// Ring Links
// =============================================================================

/// Ring entry of one node, stored beside the tree arena at the node's
/// index.
#[derive(Clone, Copy, Debug)]
struct RingLink {
    previous: u32,
    next: u32,
}

const UNLINKED: RingLink = RingLink {
    previous: NIL,
    next: NIL,
};

// =============================================================================
// AvlTreeList Definition
// =============================================================================

/// Sorted list of unique items with O(1) neighbor access.
///
/// See the [module documentation](self) for an overview.
#[derive(Clone)]
pub struct AvlTreeList<T, C = NaturalOrder> {
    tree: AvlTree<T, C>,
    ring: Vec<RingLink>,
    head: u32,
}

impl<T: Ord> AvlTreeList<T> {
    /// Creates an empty list ordered by `T`'s natural ordering.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: Ord> Default for AvlTreeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> AvlTreeList<T, C> {
    /// Creates an empty list ordered by `comparator`.
    ///
    /// The comparator is fixed for the list's lifetime.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            tree: AvlTree::with_comparator(comparator),
            ring: Vec::new(),
            head: NIL,
        }
    }

    /// Number of items in the list.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the list holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The comparator supplied at construction.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// Removes every item and releases all storage.
    ///
    /// Outstanding handles and walkers are invalidated.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.ring.clear();
        self.head = NIL;
    }

    /// The item stored in the node named by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not name a live node of this list.
    #[must_use]
    pub fn item(&self, handle: NodeHandle) -> &T {
        self.tree.item(handle)
    }

    /// The first (smallest) item's node, or `None` when empty.
    #[must_use]
    pub fn first(&self) -> Option<NodeHandle> {
        if self.head == NIL {
            None
        } else {
            Some(NodeHandle::new(self.head))
        }
    }

    /// The last (largest) item's node, or `None` when empty.
    #[must_use]
    pub fn last(&self) -> Option<NodeHandle> {
        if self.head == NIL {
            None
        } else {
            Some(NodeHandle::new(self.ring[self.head as usize].previous))
        }
    }

    /// The node after `handle` in sorted order. Circular: the successor
    /// of the last node is the first.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not name a live node of this list.
    #[must_use]
    pub fn next(&self, handle: NodeHandle) -> NodeHandle {
        self.assert_live(handle);
        NodeHandle::new(self.ring[handle.index() as usize].next)
    }

    /// The node before `handle` in sorted order. Circular: the
    /// predecessor of the first node is the last.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not name a live node of this list.
    #[must_use]
    pub fn prev(&self, handle: NodeHandle) -> NodeHandle {
        self.assert_live(handle);
        NodeHandle::new(self.ring[handle.index() as usize].previous)
    }

    /// Height of the backing tree.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Iterates the items in ascending comparator order, following ring
    /// links only.
    #[must_use]
    pub fn iter(&self) -> AvlTreeListIterator<'_, T, C> {
        AvlTreeListIterator {
            list: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Creates a detached walker positioned before the first item.
    ///
    /// The walker follows ring links and, like [`AvlTreeWalker`], is
    /// invalidated by any structural mutation, reporting
    /// [`WalkError::Stale`] afterwards.
    ///
    /// [`AvlTreeWalker`]: super::AvlTreeWalker
    #[must_use]
    pub fn walker(&self) -> AvlTreeListWalker {
        AvlTreeListWalker {
            version: self.tree.version(),
            current: NIL,
            started: false,
        }
    }

    /// Copies every item into `destination` in ascending order, starting
    /// at `start_index`.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] without writing anything if the slice
    /// from `start_index` on cannot hold [`len`](Self::len) items.
    pub fn copy_into(&self, destination: &mut [T], start_index: usize) -> Result<(), CapacityError>
    where
        T: Clone,
    {
        let available = destination.len().saturating_sub(start_index);
        if available < self.len() {
            return Err(CapacityError {
                required: self.len(),
                available,
            });
        }
        for (position, item) in self.iter().enumerate() {
            destination[start_index + position] = item.clone();
        }
        Ok(())
    }

    fn assert_live(&self, handle: NodeHandle) {
        assert!(
            self.tree.is_live(handle.index()),
            "node handle does not name a live node"
        );
    }

    /// Grows the ring column to cover every arena slot.
    fn grow_ring(&mut self) {
        let capacity = self.tree.slot_capacity();
        if self.ring.len() < capacity {
            self.ring.resize(capacity, UNLINKED);
        }
    }

    /// Splices `index` into the ring immediately before `reference`.
    fn splice_before(&mut self, index: u32, reference: u32) {
        let previous = self.ring[reference as usize].previous;
        self.ring[index as usize] = RingLink {
            previous,
            next: reference,
        };
        self.ring[previous as usize].next = index;
        self.ring[reference as usize].previous = index;
    }

    /// Splices `index` into the ring immediately after `reference`.
    fn splice_after(&mut self, index: u32, reference: u32) {
        let next = self.ring[reference as usize].next;
        self.ring[index as usize] = RingLink {
            previous: reference,
            next,
        };
        self.ring[next as usize].previous = index;
        self.ring[reference as usize].next = index;
    }

    /// Removes `index` from the ring, maintaining the head.
    fn unlink(&mut self, index: u32) {
        let link = self.ring[index as usize];
        if link.next == index {
            // Sole item.
            self.head = NIL;
            return;
        }
        self.ring[link.previous as usize].next = link.next;
        self.ring[link.next as usize].previous = link.previous;
        if self.head == index {
            self.head = link.next;
        }
    }
}

impl<T, C: Comparator<T>> AvlTreeList<T, C> {
    /// Whether an item equal to `item` is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.tree.contains(item)
    }

    /// Finds the node holding an item equal to `item`.
    #[must_use]
    pub fn find(&self, item: &T) -> Option<NodeHandle> {
        self.tree.find(item)
    }

    /// Inserts `item`. Returns whether the list changed.
    pub fn insert(&mut self, item: T) -> bool {
        !self.find_or_insert(item).1
    }

    /// Inserts `item` unless an equal item is present.
    ///
    /// Returns the node holding the item and whether it was already
    /// present.
    ///
    /// A node attached as a left child is the immediate predecessor of
    /// its attachment parent, and as a right child the immediate
    /// successor; the ring splice happens next to that parent. The
    /// rebalancing rotations that may follow never reorder items, so the
    /// ring needs no further maintenance.
    ///
    /// # Complexity
    ///
    /// O(log N)
    pub fn find_or_insert(&mut self, item: T) -> (NodeHandle, bool) {
        let outcome = self.tree.insert_entry(item);
        if outcome.already_present {
            return (NodeHandle::new(outcome.index), true);
        }
        self.grow_ring();
        let index = outcome.index;
        match outcome.attached {
            None => {
                self.ring[index as usize] = RingLink {
                    previous: index,
                    next: index,
                };
                self.head = index;
            }
            Some((parent, Side::Left)) => {
                self.splice_before(index, parent);
                if self.head == parent {
                    self.head = index;
                }
            }
            Some((parent, Side::Right)) => {
                self.splice_after(index, parent);
            }
        }
        (NodeHandle::new(index), false)
    }

    /// Removes the item equal to `item`. Returns whether it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.tree.find(item) {
            Some(handle) => {
                self.remove_node(handle);
                true
            }
            None => false,
        }
    }

    /// Removes the node named by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not name a live node of this list.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        self.assert_live(handle);
        self.unlink(handle.index());
        self.tree.remove_index(handle.index());
    }
}

// =============================================================================
// Shared Contract
// =============================================================================

impl<T, C: Comparator<T>> OrderedIndex<T> for AvlTreeList<T, C> {
    type Iter<'a>
        = AvlTreeListIterator<'a, T, C>
    where
        Self: 'a,
        T: 'a;

    fn locate(&self, item: &T) -> Option<NodeHandle> {
        self.find(item)
    }

    fn insert_or_find(&mut self, item: T) -> (NodeHandle, bool) {
        self.find_or_insert(item)
    }

    fn remove(&mut self, item: &T) -> bool {
        Self::remove(self, item)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn iter(&self) -> AvlTreeListIterator<'_, T, C> {
        Self::iter(self)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// Borrowing in-order iterator over an [`AvlTreeList`].
///
/// Follows ring links; O(1) work per item regardless of tree shape.
pub struct AvlTreeListIterator<'a, T, C> {
    list: &'a AvlTreeList<T, C>,
    cursor: u32,
    remaining: usize,
}

impl<'a, T, C> Iterator for AvlTreeListIterator<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.list.tree.item_at(self.cursor);
        self.cursor = self.list.ring[self.cursor as usize].next;
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, C> ExactSizeIterator for AvlTreeListIterator<'_, T, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<'a, T, C> IntoIterator for &'a AvlTreeList<T, C> {
    type Item = &'a T;
    type IntoIter = AvlTreeListIterator<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Walker Implementation
// =============================================================================

/// Detached in-order walker over an [`AvlTreeList`].
///
/// Follows ring links and holds no borrow of the list. Any structural
/// mutation after creation makes every subsequent call return
/// [`WalkError::Stale`].
#[derive(Clone, Debug)]
pub struct AvlTreeListWalker {
    version: u64,
    current: u32,
    started: bool,
}

impl AvlTreeListWalker {
    /// Advances to the next item. `Ok(false)` means the walk is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// [`WalkError::Stale`] if the list was mutated after this walker
    /// was created.
    pub fn move_next<T, C>(&mut self, list: &AvlTreeList<T, C>) -> Result<bool, WalkError> {
        if self.version != list.tree.version() {
            return Err(WalkError::Stale);
        }
        if !self.started {
            self.started = true;
            self.current = list.head;
        } else if self.current != NIL {
            let next = list.ring[self.current as usize].next;
            self.current = if next == list.head { NIL } else { next };
        }
        Ok(self.current != NIL)
    }

    /// The item the walker is positioned on.
    ///
    /// # Errors
    ///
    /// [`WalkError::Stale`] if the list was mutated after this walker
    /// was created; [`WalkError::NotPositioned`] before the first
    /// successful [`move_next`](Self::move_next) or after exhaustion.
    pub fn current<'list, T, C>(&self, list: &'list AvlTreeList<T, C>) -> Result<&'list T, WalkError> {
        if self.version != list.tree.version() {
            return Err(WalkError::Stale);
        }
        if self.current == NIL {
            return Err(WalkError::NotPositioned);
        }
        Ok(list.tree.item_at(self.current))
    }

    /// Repositions before the first item.
    ///
    /// # Errors
    ///
    /// [`WalkError::Stale`] if the list was mutated after this walker
    /// was created.
    pub fn reset<T, C>(&mut self, list: &AvlTreeList<T, C>) -> Result<(), WalkError> {
        if self.version != list.tree.version() {
            return Err(WalkError::Stale);
        }
        self.current = NIL;
        self.started = false;
        Ok(())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T: fmt::Debug, C> fmt::Debug for AvlTreeList<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C> fmt::Display for AvlTreeList<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        for (position, item) in self.iter().enumerate() {
            if position > 0 {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{item}")?;
        }
        write!(formatter, "}}")
    }
}

impl<T: Ord> FromIterator<T> for AvlTreeList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        let mut list = Self::new();
        list.extend(iterable);
        list
    }
}

impl<T, C: Comparator<T>> Extend<T> for AvlTreeList<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        for item in iterable {
            let _ = self.insert(item);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    /// The ring must visit exactly the tree's items in the tree's
    /// in-order sequence, forward and backward.
    fn verify_ring(list: &AvlTreeList<i32>) {
        let tree_order: Vec<i32> = list.tree.iter().copied().collect();
        let ring_order: Vec<i32> = list.iter().copied().collect();
        assert_eq!(ring_order, tree_order, "ring disagrees with tree order");

        let mut backward = Vec::new();
        if let Some(last) = list.last() {
            let mut cursor = last;
            for _ in 0..list.len() {
                backward.push(*list.item(cursor));
                cursor = list.prev(cursor);
            }
            assert_eq!(cursor, last, "backward ring walk did not close");
        }
        backward.reverse();
        assert_eq!(backward, tree_order, "backward ring walk disagrees");
    }

    #[rstest]
    fn test_new_list_is_empty() {
        let list: AvlTreeList<i32> = AvlTreeList::new();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert_eq!(list.last(), None);
        assert_eq!(list.iter().next(), None);
    }

    #[rstest]
    fn test_insert_keeps_ring_sorted() {
        let mut list = AvlTreeList::new();
        for number in [30, 10, 40, 20, 50] {
            assert!(list.insert(number));
            verify_ring(&list);
        }
        let items: Vec<i32> = list.iter().copied().collect();
        assert_eq!(items, vec![10, 20, 30, 40, 50]);
    }

    #[rstest]
    fn test_head_follows_the_minimum() {
        let mut list = AvlTreeList::new();
        let _ = list.insert(10);
        assert_eq!(list.item(list.first().unwrap()), &10);
        // A smaller item takes over the head.
        let _ = list.insert(5);
        assert_eq!(list.item(list.first().unwrap()), &5);
        // Removing the head moves it to the ring successor.
        assert!(list.remove(&5));
        assert_eq!(list.item(list.first().unwrap()), &10);
        // Removing the only item empties the ring.
        assert!(list.remove(&10));
        assert_eq!(list.first(), None);
    }

    #[rstest]
    fn test_neighbor_navigation_is_circular() {
        let list: AvlTreeList<i32> = [2, 1, 3].into_iter().collect();
        let first = list.first().unwrap();
        let last = list.last().unwrap();
        assert_eq!(list.item(first), &1);
        assert_eq!(list.item(last), &3);
        assert_eq!(list.next(last), first);
        assert_eq!(list.prev(first), last);
        assert_eq!(list.item(list.next(first)), &2);
    }

    #[rstest]
    fn test_random_operations_keep_ring_consistent() {
        let mut generator = StdRng::seed_from_u64(0xbead);
        let mut list = AvlTreeList::new();
        let mut model = std::collections::BTreeSet::new();
        for _ in 0..1000 {
            let number = generator.gen_range(0..200);
            if generator.gen_bool(0.4) {
                assert_eq!(list.remove(&number), model.remove(&number));
            } else {
                assert_eq!(list.insert(number), model.insert(number));
            }
            assert_eq!(list.len(), model.len());
        }
        verify_ring(&list);
        let items: Vec<i32> = list.iter().copied().collect();
        let expected: Vec<i32> = model.iter().copied().collect();
        assert_eq!(items, expected);
    }

    #[rstest]
    fn test_remove_node_by_handle() {
        let mut list = AvlTreeList::new();
        for number in [30, 10, 40, 20, 50] {
            let _ = list.insert(number);
        }
        let handle = list.find(&30).unwrap();
        list.remove_node(handle);
        verify_ring(&list);
        let items: Vec<i32> = list.iter().copied().collect();
        assert_eq!(items, vec![10, 20, 40, 50]);
    }

    #[rstest]
    fn test_duplicate_insert_reports_existing_node() {
        let mut list = AvlTreeList::new();
        let (first, existed) = list.find_or_insert(7);
        assert!(!existed);
        let (second, existed) = list.find_or_insert(7);
        assert!(existed);
        assert_eq!(first, second);
        assert_eq!(list.len(), 1);
        verify_ring(&list);
    }

    #[rstest]
    fn test_walker_visits_in_order_and_detects_mutation() {
        let mut list = AvlTreeList::new();
        for number in [2, 1, 3] {
            let _ = list.insert(number);
        }
        let mut walker = list.walker();
        let mut visited = Vec::new();
        while walker.move_next(&list).unwrap() {
            visited.push(*walker.current(&list).unwrap());
        }
        assert_eq!(visited, vec![1, 2, 3]);
        assert_eq!(walker.current(&list), Err(WalkError::NotPositioned));

        walker.reset(&list).unwrap();
        let _ = list.insert(4);
        assert_eq!(walker.move_next(&list), Err(WalkError::Stale));
    }

    #[rstest]
    fn test_copy_into_checks_capacity() {
        let list: AvlTreeList<i32> = [3, 1, 2].into_iter().collect();
        let mut destination = [0; 4];
        list.copy_into(&mut destination, 1).unwrap();
        assert_eq!(destination, [0, 1, 2, 3]);
        assert_eq!(
            list.copy_into(&mut destination, 2),
            Err(CapacityError {
                required: 3,
                available: 2
            })
        );
    }

    #[rstest]
    fn test_clear_invalidates_everything() {
        let mut list = AvlTreeList::new();
        for number in 1..=10 {
            let _ = list.insert(number);
        }
        let mut walker = list.walker();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert_eq!(walker.move_next(&list), Err(WalkError::Stale));
        assert!(list.insert(1));
        verify_ring(&list);
    }

    #[rstest]
    #[should_panic(expected = "live node")]
    fn test_stale_handle_panics() {
        let mut list = AvlTreeList::new();
        let (handle, _) = list.find_or_insert(1);
        list.remove_node(handle);
        let _ = list.next(handle);
    }
}
