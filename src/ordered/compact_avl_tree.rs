//! Compact AVL tree: parentless nodes rebalanced in a single top-down
//! pass.
//!
//! This module provides [`CompactAvlTree`], an ordered collection of
//! unique items with the smallest node layout of the family.
//!
//! # Node layout
//!
//! A node stores its item, two child indices, and one [`Lean`] byte
//! recording which subtree is taller. There is no parent link and no
//! signed balance factor, so each node is one link word and most of a
//! byte smaller than its classic counterpart.
//!
//! Without parent links there is no bottom-up retrace. Instead, every
//! mutating operation remembers `path_top` during its descent: the slot
//! holding the deepest node where the height change is guaranteed to be
//! absorbed. Rebalancing then re-walks from `path_top` toward the
//! affected position in the same direction as the search, adjusting lean
//! fields and rotating at most once (insert) or once per level (remove).
//!
//! - O(log N) find / insert / remove, each in one root-to-leaf pass
//! - O(N) traversal using an explicit stack of O(log N) indices
//!
//! # Examples
//!
//! ```rust
//! use avl_collections::ordered::CompactAvlTree;
//!
//! let mut tree = CompactAvlTree::new();
//! for number in [3, 1, 2] {
//!     tree.insert(number);
//! }
//! let items: Vec<&i32> = tree.iter().collect();
//! assert_eq!(items, vec![&1, &2, &3]);
//! ```
//!
//! # Tradeoffs
//!
//! The missing parent links have two visible costs. Traversal needs an
//! explicit stack instead of pointer climbing, and a node cannot be
//! removed through a bare [`NodeHandle`]: reaching a node's slot requires
//! the keyed descent, so there is no `remove_node` here. The detached
//! [`CompactAvlTreeWalker`] also carries no mutation guard; see its
//! documentation.

use super::arena::{Arena, NIL};
use super::{CapacityError, Comparator, NaturalOrder, NodeHandle, OrderedIndex, Side};
use smallvec::SmallVec;
use static_assertions::const_assert;
use std::cmp::Ordering;
use std::fmt;
use std::mem;

// =============================================================================
// Node Definition
// =============================================================================

/// Which subtree of a node is taller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lean {
    Left,
    Even,
    Right,
}

impl Lean {
    const fn from_side(side: Side) -> Self {
        match side {
            Side::Left => Self::Left,
            Side::Right => Self::Right,
        }
    }
}

/// Internal node layout of the compact engine.
#[derive(Clone, Debug)]
struct Node<T> {
    item: T,
    left: u32,
    right: u32,
    longer: Lean,
}

impl<T> Node<T> {
    const fn new(item: T) -> Self {
        Self {
            item,
            left: NIL,
            right: NIL,
            longer: Lean::Even,
        }
    }
}

// The whole point of this layout is the small node.
const_assert!(mem::size_of::<Lean>() == 1);
const_assert!(mem::size_of::<Node<u32>>() <= 16);

/// A link slot that can hold a subtree root: either the tree's root field
/// or one child field of a live node.
///
/// Rotations replace whole subtrees, so the rebalancing passes address
/// "the place a subtree hangs from" rather than the subtree's root node.
/// Keeping the slot as (parent index, side) instead of a borrowed `&mut`
/// lets the passes hold several slots at once without aliasing.
#[derive(Clone, Copy, Debug)]
enum SlotRef {
    Root,
    Child { parent: u32, side: Side },
}

// =============================================================================
// CompactAvlTree Definition
// =============================================================================

/// Ordered collection of unique items backed by a parentless AVL tree.
///
/// See the [module documentation](self) for layout and tradeoffs.
#[derive(Clone)]
pub struct CompactAvlTree<T, C = NaturalOrder> {
    arena: Arena<Node<T>>,
    root: u32,
    length: usize,
    comparator: C,
}

impl<T: Ord> CompactAvlTree<T> {
    /// Creates an empty tree ordered by `T`'s natural ordering.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: Ord> Default for CompactAvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> CompactAvlTree<T, C> {
    /// Creates an empty tree ordered by `comparator`.
    ///
    /// The comparator is fixed for the tree's lifetime.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            arena: Arena::new(),
            root: NIL,
            length: 0,
            comparator,
        }
    }

    /// Number of items in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Whether the tree holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The comparator supplied at construction.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Removes every item and releases all node storage.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NIL;
        self.length = 0;
    }

    /// The item stored in the node named by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not name a live node of this tree.
    #[must_use]
    pub fn item(&self, handle: NodeHandle) -> &T {
        &self.arena.get(handle.index()).item
    }

    /// Height of the tree: the number of nodes on the longest root-to-leaf
    /// path. O(log N), descending the longer side.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut index = self.root;
        while index != NIL {
            height += 1;
            let node = self.arena.get(index);
            index = match node.longer {
                Lean::Right => node.right,
                Lean::Left | Lean::Even => node.left,
            };
        }
        height
    }

    /// Iterates the items in ascending comparator order.
    ///
    /// Uses an explicit stack of O(log N) indices; the stack lives inline
    /// up to the depth a million-node tree can reach.
    #[must_use]
    pub fn iter(&self) -> CompactAvlTreeIterator<'_, T, C> {
        let mut iterator = CompactAvlTreeIterator {
            tree: self,
            stack: SmallVec::new(),
            remaining: self.length,
        };
        iterator.push_left_spine(self.root);
        iterator
    }

    /// Creates a detached walker positioned before the first item.
    ///
    /// **The walker carries no mutation guard.** It records arena indices
    /// of nodes it has yet to visit; if the tree is mutated after
    /// creation, subsequent calls either panic on a released slot or
    /// silently walk the mutated structure, possibly skipping or
    /// repeating items. Memory safety is never at risk. Use
    /// [`iter`](Self::iter) when the borrow checker should enforce
    /// exclusivity instead.
    #[must_use]
    pub fn walker(&self) -> CompactAvlTreeWalker {
        let mut walker = CompactAvlTreeWalker {
            stack: SmallVec::new(),
            current: NIL,
        };
        walker.push_left_spine(self, self.root);
        walker
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
        if available < self.length {
            return Err(CapacityError {
                required: self.length,
                available,
            });
        }
        for (position, item) in self.iter().enumerate() {
            destination[start_index + position] = item.clone();
        }
        Ok(())
    }

    // ----- slot and field plumbing -----

    fn slot_get(&self, slot: SlotRef) -> u32 {
        match slot {
            SlotRef::Root => self.root,
            SlotRef::Child { parent, side } => self.child(parent, side),
        }
    }

    fn slot_set(&mut self, slot: SlotRef, index: u32) {
        match slot {
            SlotRef::Root => self.root = index,
            SlotRef::Child { parent, side } => self.set_child(parent, side, index),
        }
    }

    fn child(&self, index: u32, side: Side) -> u32 {
        let node = self.arena.get(index);
        match side {
            Side::Left => node.left,
            Side::Right => node.right,
        }
    }

    fn set_child(&mut self, index: u32, side: Side, value: u32) {
        let node = self.arena.get_mut(index);
        match side {
            Side::Left => node.left = value,
            Side::Right => node.right = value,
        }
    }

    fn longer(&self, index: u32) -> Lean {
        self.arena.get(index).longer
    }

    fn set_longer(&mut self, index: u32, lean: Lean) {
        self.arena.get_mut(index).longer = lean;
    }

    fn is_balanced(&self, index: u32) -> bool {
        self.longer(index) == Lean::Even
    }

    fn item_at(&self, index: u32) -> &T {
        &self.arena.get(index).item
    }
}

impl<T, C: Comparator<T>> CompactAvlTree<T, C> {
    /// Whether an item equal to `item` is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.find(item).is_some()
    }

    /// Finds the node holding an item equal to `item`.
    #[must_use]
    pub fn find(&self, item: &T) -> Option<NodeHandle> {
        let mut index = self.root;
        while index != NIL {
            let node = self.arena.get(index);
            match self.comparator.compare(item, &node.item) {
                Ordering::Less => index = node.left,
                Ordering::Greater => index = node.right,
                Ordering::Equal => return Some(NodeHandle::new(index)),
            }
        }
        None
    }

    /// Inserts `item`. Returns whether the tree changed.
    pub fn insert(&mut self, item: T) -> bool {
        !self.find_or_insert(item).1
    }

    /// Inserts `item` unless an equal item is present.
    ///
    /// Returns the node holding the item and whether it was already
    /// present. The descent records `path_top`; the height bookkeeping
    /// and the at-most-one rotation happen in a second short walk from
    /// there, never above it.
    ///
    /// # Complexity
    ///
    /// O(log N), one descent plus one partial re-walk.
    pub fn find_or_insert(&mut self, item: T) -> (NodeHandle, bool) {
        if self.root == NIL {
            let index = self.arena.allocate(Node::new(item));
            self.root = index;
            self.length += 1;
            return (NodeHandle::new(index), false);
        }
        let mut slot = SlotRef::Root;
        let mut path_top = SlotRef::Root;
        let mut current = self.root;
        loop {
            let ordering = self.comparator.compare(&item, self.item_at(current));
            if ordering == Ordering::Equal {
                return (NodeHandle::new(current), true);
            }
            if !self.is_balanced(current) {
                path_top = slot;
            }
            let side = if ordering == Ordering::Greater {
                Side::Right
            } else {
                Side::Left
            };
            let next = self.child(current, side);
            if next == NIL {
                let index = self.arena.allocate(Node::new(item));
                self.set_child(current, side, index);
                self.rebalance_insert(path_top, index);
                self.length += 1;
                return (NodeHandle::new(index), false);
            }
            slot = SlotRef::Child {
                parent: current,
                side,
            };
            current = next;
        }
    }

    /// Removes the item equal to `item`. Returns whether it was present.
    ///
    /// The descent continues past the target to the bottom of the path
    /// (descending left on the match, so the in-order predecessor ends the
    /// path), records `path_top` for the delete criterion, then
    /// rebalances downward and splices the bottom node into the target's
    /// place.
    ///
    /// # Complexity
    ///
    /// O(log N), one descent plus one partial re-walk.
    pub fn remove(&mut self, item: &T) -> bool {
        if self.root == NIL {
            return false;
        }
        let mut slot = SlotRef::Root;
        let mut path_top = SlotRef::Root;
        let mut target: Option<(SlotRef, u32)> = None;
        let mut current = self.root;
        let mut side;
        loop {
            let ordering = self.comparator.compare(item, self.item_at(current));
            if ordering == Ordering::Equal {
                target = Some((slot, current));
            }
            side = if ordering == Ordering::Greater {
                Side::Right
            } else {
                Side::Left
            };
            let next = self.child(current, side);
            if next == NIL {
                break;
            }
            // The height change is absorbed here when this node leans
            // away from the descent and its taller child is even, or when
            // it is balanced; everything above stays untouched.
            let sibling = self.child(current, side.opposite());
            if self.is_balanced(current)
                || (self.longer(current) == Lean::from_side(side.opposite())
                    && self.is_balanced(sibling))
            {
                path_top = slot;
            }
            slot = SlotRef::Child {
                parent: current,
                side,
            };
            current = next;
        }
        let Some((target_slot, target_index)) = target else {
            return false;
        };
        let target_slot = self.rebalance_delete(path_top, target_slot, target_index, item);
        self.swap_delete(target_slot, slot, side);
        self.length -= 1;
        true
    }

    /// Post-insert pass: at most one rotation at `path_top`, then plain
    /// lean updates down to the new node.
    fn rebalance_insert(&mut self, path_top: SlotRef, index: u32) {
        let top = self.slot_get(path_top);
        let mut path = top;
        if !self.is_balanced(top) {
            let first = self.side_toward(index, top);
            if self.longer(top) != Lean::from_side(first) {
                // The insert went down the shorter side; the imbalance
                // cancels and no rotation is needed.
                self.set_longer(top, Lean::Even);
                path = self.child(top, first);
            } else {
                let middle = self.child(top, first);
                let second = self.side_toward(index, middle);
                if first == second {
                    path = self.rotate_two(path_top, first);
                } else {
                    let lower = self.child(middle, second);
                    let third = match self.comparator.compare(self.item_at(index), self.item_at(lower)) {
                        Ordering::Less => Lean::Left,
                        Ordering::Equal => Lean::Even,
                        Ordering::Greater => Lean::Right,
                    };
                    path = self.rotate_three(path_top, first, third);
                }
            }
        }
        self.rebalance_path(path, index);
    }

    /// Marks every node from `path` down to the new node as leaning
    /// toward it. Each of these nodes was balanced before the insert.
    fn rebalance_path(&mut self, mut path: u32, index: u32) {
        while path != NIL && path != index {
            let side = self.side_toward(index, path);
            self.set_longer(path, Lean::from_side(side));
            path = self.child(path, side);
        }
    }

    /// Post-remove pass from `path_top` to the bottom of the search path.
    ///
    /// Every node strictly between `path_top` and the bottom loses a
    /// level of height on the descent side, so each gets a lean update or
    /// a rotation. Returns the slot holding the target node, re-aimed if
    /// a rotation moved the target out of its recorded slot.
    fn rebalance_delete(
        &mut self,
        path_top: SlotRef,
        mut target_slot: SlotRef,
        target_index: u32,
        item: &T,
    ) -> SlotRef {
        let mut slot = path_top;
        loop {
            let node = self.slot_get(slot);
            let dir = if self.comparator.compare(item, self.item_at(node)) == Ordering::Greater {
                Side::Right
            } else {
                Side::Left
            };
            if self.child(node, dir) == NIL {
                break;
            }
            if self.is_balanced(node) {
                self.set_longer(node, Lean::from_side(dir.opposite()));
            } else if self.longer(node) == Lean::from_side(dir) {
                self.set_longer(node, Lean::Even);
            } else {
                let sibling = self.child(node, dir.opposite());
                let second = self.longer(sibling);
                if second == Lean::from_side(dir) {
                    let third = self.longer(self.child(sibling, dir));
                    let _ = self.rotate_three(slot, dir.opposite(), third);
                } else if second == Lean::Even {
                    // Rotating around an even sibling keeps the subtree
                    // height; the two roots end up leaning, not even.
                    let _ = self.rotate_two(slot, dir.opposite());
                    self.set_longer(node, Lean::from_side(dir.opposite()));
                    let new_root = self.slot_get(slot);
                    self.set_longer(new_root, Lean::from_side(dir));
                } else {
                    let _ = self.rotate_two(slot, dir.opposite());
                }
                if node == target_index {
                    // The rotation moved the target under the new subtree
                    // root.
                    target_slot = SlotRef::Child {
                        parent: self.slot_get(slot),
                        side: dir,
                    };
                }
            }
            slot = SlotRef::Child { parent: node, side: dir };
        }
        target_slot
    }

    /// Splices the bottom node of the search path into the target's
    /// place and releases the target.
    ///
    /// `side` is the final search direction, so the bottom node has no
    /// `side` child and its other child replaces it. The link copies
    /// deliberately read `target`'s fields after the bottom slot write:
    /// when the bottom node is the target's direct child, that write is
    /// what keeps the survivor from becoming its own child.
    fn swap_delete(&mut self, target_slot: SlotRef, bottom_slot: SlotRef, side: Side) {
        let target_index = self.slot_get(target_slot);
        let bottom_index = self.slot_get(bottom_slot);

        self.slot_set(target_slot, bottom_index);
        let replacement = self.child(bottom_index, side.opposite());
        self.slot_set(bottom_slot, replacement);

        let (left, right, longer) = {
            let target = self.arena.get(target_index);
            (target.left, target.right, target.longer)
        };
        {
            let survivor = self.arena.get_mut(bottom_index);
            survivor.left = left;
            survivor.right = right;
            survivor.longer = longer;
        }
        let _ = self.arena.release(target_index);
    }

    /// Which side of the node at `at` the item at `index` belongs on.
    fn side_toward(&self, index: u32, at: u32) -> Side {
        if self.comparator.compare(self.item_at(index), self.item_at(at)) == Ordering::Greater {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Single rotation of the subtree in `slot` toward `side.opposite()`.
    ///
    /// Marks both touched roots even (callers adjust where that is not
    /// the truth) and returns the grown child the insert path continues
    /// into.
    fn rotate_two(&mut self, slot: SlotRef, side: Side) -> u32 {
        let lower_root = self.slot_get(slot);
        let upper_root = self.child(lower_root, side);
        let middle = self.child(upper_root, side.opposite());
        let continuation = self.child(upper_root, side);

        self.set_child(upper_root, side.opposite(), lower_root);
        self.set_child(lower_root, side, middle);
        self.slot_set(slot, upper_root);

        self.set_longer(lower_root, Lean::Even);
        self.set_longer(upper_root, Lean::Even);
        continuation
    }

    /// Double rotation of the subtree in `slot`: the grandchild on the
    /// inner side becomes the subtree root.
    ///
    /// `third` tells which side of that grandchild grew (or
    /// [`Lean::Even`] when the grandchild itself is the new node); it
    /// decides the one residual lean and which subtree the insert path
    /// continues into. Returns [`NIL`] when the path ends at the new
    /// root.
    fn rotate_three(&mut self, slot: SlotRef, side: Side, third: Lean) -> u32 {
        let lower_root = self.slot_get(slot);
        let upper = self.child(lower_root, side);
        let new_root = self.child(upper, side.opposite());
        let lower_child = self.child(new_root, side.opposite());
        let upper_child = self.child(new_root, side);

        self.set_child(new_root, side.opposite(), lower_root);
        self.set_child(new_root, side, upper);
        self.set_child(lower_root, side, lower_child);
        self.set_child(upper, side.opposite(), upper_child);
        self.slot_set(slot, new_root);

        self.set_longer(new_root, Lean::Even);
        self.set_longer(lower_root, Lean::Even);
        self.set_longer(upper, Lean::Even);

        if third == Lean::Even {
            return NIL;
        }
        if third == Lean::from_side(side) {
            self.set_longer(lower_root, Lean::from_side(side.opposite()));
            upper_child
        } else {
            self.set_longer(upper, Lean::from_side(side));
            lower_child
        }
    }
}

// =============================================================================
// Shared Contract
// =============================================================================

impl<T, C: Comparator<T>> OrderedIndex<T> for CompactAvlTree<T, C> {
    type Iter<'a>
        = CompactAvlTreeIterator<'a, T, C>
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
        self.length
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn iter(&self) -> CompactAvlTreeIterator<'_, T, C> {
        Self::iter(self)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// Inline stack depth for traversals. An AVL tree needs ~1.44 log2(N)
/// levels, so 24 covers far beyond a million nodes without spilling to
/// the heap.
const SPINE_DEPTH: usize = 24;

/// Borrowing in-order iterator over a [`CompactAvlTree`].
///
/// Keeps the unvisited left spine on an explicit stack.
pub struct CompactAvlTreeIterator<'a, T, C> {
    tree: &'a CompactAvlTree<T, C>,
    stack: SmallVec<[u32; SPINE_DEPTH]>,
    remaining: usize,
}

impl<T, C> CompactAvlTreeIterator<'_, T, C> {
    fn push_left_spine(&mut self, mut index: u32) {
        while index != NIL {
            self.stack.push(index);
            index = self.tree.arena.get(index).left;
        }
    }
}

impl<'a, T, C> Iterator for CompactAvlTreeIterator<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = self.tree.arena.get(index);
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, C> ExactSizeIterator for CompactAvlTreeIterator<'_, T, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<'a, T, C> IntoIterator for &'a CompactAvlTree<T, C> {
    type Item = &'a T;
    type IntoIter = CompactAvlTreeIterator<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Walker Implementation
// =============================================================================

/// Detached in-order walker over a [`CompactAvlTree`].
///
/// Holds no borrow of the tree; every call takes the tree as an argument.
///
/// # No staleness guard
///
/// Unlike the walkers of the parent-linked trees, this walker cannot
/// detect mutation: it records pending arena indices and nothing else.
/// Calling it against a tree mutated after the walker was created either
/// panics (a recorded node was released) or silently walks the mutated
/// structure and may skip or repeat items. It never compromises memory
/// safety. Callers who need detection should use the borrowing
/// [`iter`](CompactAvlTree::iter) instead.
#[derive(Clone, Debug)]
pub struct CompactAvlTreeWalker {
    stack: SmallVec<[u32; SPINE_DEPTH]>,
    current: u32,
}

impl CompactAvlTreeWalker {
    fn push_left_spine<T, C>(&mut self, tree: &CompactAvlTree<T, C>, mut index: u32) {
        while index != NIL {
            self.stack.push(index);
            index = tree.arena.get(index).left;
        }
    }

    /// Advances to the next item. `false` means the walk is exhausted.
    pub fn move_next<T, C>(&mut self, tree: &CompactAvlTree<T, C>) -> bool {
        match self.stack.pop() {
            Some(index) => {
                self.current = index;
                let right = tree.arena.get(index).right;
                self.push_left_spine(tree, right);
                true
            }
            None => {
                self.current = NIL;
                false
            }
        }
    }

    /// The item the walker is positioned on, or `None` before the first
    /// [`move_next`](Self::move_next) or after exhaustion.
    #[must_use]
    pub fn current<'tree, T, C>(&self, tree: &'tree CompactAvlTree<T, C>) -> Option<&'tree T> {
        if self.current == NIL {
            None
        } else {
            Some(&tree.arena.get(self.current).item)
        }
    }

    /// Repositions before the first item.
    pub fn reset<T, C>(&mut self, tree: &CompactAvlTree<T, C>) {
        self.stack.clear();
        self.current = NIL;
        self.push_left_spine(tree, tree.root);
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T: fmt::Debug, C> fmt::Debug for CompactAvlTree<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C> fmt::Display for CompactAvlTree<T, C> {
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

impl<T: Ord> FromIterator<T> for CompactAvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iterable);
        tree
    }
}

impl<T, C: Comparator<T>> Extend<T> for CompactAvlTree<T, C> {
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

    /// Recomputes subtree heights and checks the lean fields against
    /// them. Returns the subtree height.
    fn verify_node(tree: &CompactAvlTree<i32>, index: u32) -> i32 {
        if index == NIL {
            return 0;
        }
        let node = tree.arena.get(index);
        let left_height = verify_node(tree, node.left);
        let right_height = verify_node(tree, node.right);
        assert!(
            (right_height - left_height).abs() <= 1,
            "height imbalance at {}: left={left_height} right={right_height}",
            node.item
        );
        let expected = match right_height - left_height {
            -1 => Lean::Left,
            0 => Lean::Even,
            _ => Lean::Right,
        };
        assert_eq!(node.longer, expected, "stored lean wrong at {}", node.item);
        1 + left_height.max(right_height)
    }

    fn verify(tree: &CompactAvlTree<i32>) {
        let _ = verify_node(tree, tree.root);
        assert_eq!(tree.iter().count(), tree.len());
        let items: Vec<i32> = tree.iter().copied().collect();
        let mut sorted = items.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(items, sorted, "in-order walk is not strictly ascending");
    }

    /// Pre-order structural snapshot: (item, lean) per node.
    fn shape(tree: &CompactAvlTree<i32>) -> Vec<(i32, Lean)> {
        fn walk(tree: &CompactAvlTree<i32>, index: u32, out: &mut Vec<(i32, Lean)>) {
            if index == NIL {
                return;
            }
            let node = tree.arena.get(index);
            out.push((node.item, node.longer));
            walk(tree, node.left, out);
            walk(tree, node.right, out);
        }
        let mut out = Vec::new();
        walk(tree, tree.root, &mut out);
        out
    }

    #[rstest]
    fn test_new_tree_is_empty() {
        let mut tree: CompactAvlTree<i32> = CompactAvlTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(!tree.remove(&1));
        assert_eq!(tree.iter().next(), None);
    }

    #[rstest]
    fn test_ascending_inserts_stay_balanced() {
        let mut tree = CompactAvlTree::new();
        for number in 1..=100 {
            assert!(tree.insert(number));
            verify(&tree);
        }
        assert_eq!(tree.len(), 100);
        assert!(tree.height() <= 10, "height {} too large", tree.height());
    }

    #[rstest]
    fn test_descending_inserts_stay_balanced() {
        let mut tree = CompactAvlTree::new();
        for number in (1..=100).rev() {
            assert!(tree.insert(number));
            verify(&tree);
        }
        assert_eq!(tree.len(), 100);
    }

    #[rstest]
    fn test_deletes_stay_balanced() {
        let mut tree = CompactAvlTree::new();
        for number in 1..=100 {
            let _ = tree.insert(number);
        }
        assert!(!tree.remove(&1000));
        for number in 1..=100 {
            assert!(tree.remove(&number));
            verify(&tree);
        }
        assert!(tree.is_empty());
    }

    #[rstest]
    fn test_reverse_deletes_stay_balanced() {
        let mut tree = CompactAvlTree::new();
        for number in 1..=100 {
            let _ = tree.insert(number);
        }
        for number in (1..=100).rev() {
            assert!(tree.remove(&number));
            verify(&tree);
        }
        assert!(tree.is_empty());
    }

    #[rstest]
    fn test_random_operations_stay_balanced() {
        let mut generator = StdRng::seed_from_u64(0xc0ffee);
        let mut tree = CompactAvlTree::new();
        let mut model = std::collections::BTreeSet::new();
        for _ in 0..1000 {
            let number = generator.gen_range(0..200);
            if generator.gen_bool(0.4) {
                assert_eq!(tree.remove(&number), model.remove(&number));
            } else {
                assert_eq!(tree.insert(number), model.insert(number));
            }
            assert_eq!(tree.len(), model.len());
        }
        verify(&tree);
        let items: Vec<i32> = tree.iter().copied().collect();
        let expected: Vec<i32> = model.iter().copied().collect();
        assert_eq!(items, expected);
    }

    #[rstest]
    fn test_duplicate_insert_is_idempotent() {
        let mut tree = CompactAvlTree::new();
        for number in [5, 3, 8] {
            let _ = tree.insert(number);
        }
        let before = shape(&tree);
        let (handle, existed) = tree.find_or_insert(3);
        assert!(existed);
        assert_eq!(tree.item(handle), &3);
        assert_eq!(tree.len(), 3);
        assert_eq!(shape(&tree), before);
    }

    #[rstest]
    fn test_remove_interior_node() {
        let mut tree = CompactAvlTree::new();
        for number in [30, 10, 40, 20, 50] {
            let _ = tree.insert(number);
        }
        assert!(tree.remove(&30));
        verify(&tree);
        let items: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(items, vec![10, 20, 40, 50]);
    }

    #[rstest]
    fn test_copy_into_checks_capacity() {
        let mut tree = CompactAvlTree::new();
        for number in [2, 3, 1] {
            let _ = tree.insert(number);
        }
        let mut destination = [0; 3];
        tree.copy_into(&mut destination, 0).unwrap();
        assert_eq!(destination, [1, 2, 3]);
        assert!(tree.copy_into(&mut destination, 1).is_err());
    }

    #[rstest]
    fn test_walker_visits_in_order() {
        let mut tree = CompactAvlTree::new();
        for number in [2, 1, 3] {
            let _ = tree.insert(number);
        }
        let mut walker = tree.walker();
        assert!(walker.current(&tree).is_none());
        let mut visited = Vec::new();
        while walker.move_next(&tree) {
            visited.push(*walker.current(&tree).unwrap());
        }
        assert_eq!(visited, vec![1, 2, 3]);
        assert!(walker.current(&tree).is_none());
        walker.reset(&tree);
        assert!(walker.move_next(&tree));
        assert_eq!(walker.current(&tree), Some(&1));
    }

    // The next two tests pin the walker's documented lack of a staleness
    // guard; they describe observed behavior, not a promise.

    #[rstest]
    fn test_stale_walker_misses_items_inserted_below_it() {
        let mut tree = CompactAvlTree::new();
        for number in [2, 1, 3] {
            let _ = tree.insert(number);
        }
        let mut walker = tree.walker();
        let _ = tree.insert(0);
        let mut visited = Vec::new();
        while walker.move_next(&tree) {
            visited.push(*walker.current(&tree).unwrap());
        }
        // 0 sits below an already-recorded node, so the stale walker
        // never sees it.
        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[rstest]
    #[should_panic(expected = "live node")]
    fn test_stale_walker_panics_on_released_node() {
        let mut tree = CompactAvlTree::new();
        for number in [2, 1, 3] {
            let _ = tree.insert(number);
        }
        let mut walker = tree.walker();
        assert!(tree.remove(&1));
        while walker.move_next(&tree) {}
    }

    #[rstest]
    fn test_clear_releases_everything() {
        let mut tree = CompactAvlTree::new();
        for number in 1..=10 {
            let _ = tree.insert(number);
        }
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.insert(3));
        verify(&tree);
    }

    #[rstest]
    fn test_display_renders_sorted_set() {
        let tree: CompactAvlTree<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(format!("{tree}"), "{1, 2, 3}");
    }
}
