//! Classic AVL tree: parent-linked nodes with a signed balance factor.
//!
//! This module provides [`AvlTree`], an ordered collection of unique items
//! kept height-balanced by AVL rotations.
//!
//! # Overview
//!
//! Each node stores its parent link and a balance factor in {-1, 0, +1},
//! defined as height(right subtree) - height(left subtree). Insertion and
//! removal locate the target position in one descent, splice the node, and
//! retrace bottom-up through parent links, adjusting balance factors and
//! rotating where a factor would reach +/-2.
//!
//! - O(log N) find / insert / remove
//! - O(1) access through a [`NodeHandle`]
//! - O(N) in-order traversal with O(1) extra space (pointer climbing)
//! - O(1) len and `is_empty`
//!
//! # Examples
//!
//! ```rust
//! use avl_collections::ordered::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for number in [3, 1, 2] {
//!     tree.insert(number);
//! }
//!
//! // Items are always visited in sorted order
//! let items: Vec<&i32> = tree.iter().collect();
//! assert_eq!(items, vec![&1, &2, &3]);
//!
//! // Duplicate insertion is a no-op
//! assert!(!tree.insert(2));
//! assert_eq!(tree.len(), 3);
//! ```
//!
//! # Balancing invariants
//!
//! After every public operation, for every node:
//!
//! 1. All items in the left subtree compare less, all items in the right
//!    subtree compare greater, per the tree's comparator.
//! 2. The two subtree heights differ by at most one, and the stored
//!    balance factor is exactly their difference.
//!
//! These invariants bound the height by ~1.44 log2(N), which bounds every
//! keyed operation.

use super::arena::{Arena, NIL};
use super::{CapacityError, Comparator, NaturalOrder, NodeHandle, OrderedIndex, Side, WalkError};
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node layout of the classic engine.
#[derive(Clone, Debug)]
struct Node<T> {
    item: T,
    parent: u32,
    left: u32,
    right: u32,
    /// height(right) - height(left); right-heavy is positive.
    balance: i8,
}

impl<T> Node<T> {
    const fn new(item: T, parent: u32) -> Self {
        Self {
            item,
            parent,
            left: NIL,
            right: NIL,
            balance: 0,
        }
    }
}

/// Result of an insert descent, including where the new node was attached.
///
/// The attachment point is reported as it was at link time, before any
/// rotation; rotations preserve in-order adjacency, which is all the list
/// overlay needs it for.
pub(crate) struct InsertOutcome {
    pub(crate) index: u32,
    pub(crate) already_present: bool,
    pub(crate) attached: Option<(u32, Side)>,
}

// =============================================================================
// AvlTree Definition
// =============================================================================

/// Ordered collection of unique items backed by a parent-linked AVL tree.
///
/// See the [module documentation](self) for an overview.
#[derive(Clone)]
pub struct AvlTree<T, C = NaturalOrder> {
    arena: Arena<Node<T>>,
    root: u32,
    length: usize,
    version: u64,
    comparator: C,
}

impl<T: Ord> AvlTree<T> {
    /// Creates an empty tree ordered by `T`'s natural ordering.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avl_collections::ordered::AvlTree;
    ///
    /// let tree: AvlTree<i32> = AvlTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> AvlTree<T, C> {
    /// Creates an empty tree ordered by `comparator`.
    ///
    /// The comparator is fixed for the tree's lifetime.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avl_collections::ordered::AvlTree;
    ///
    /// let mut tree = AvlTree::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// tree.insert(1);
    /// tree.insert(2);
    /// let items: Vec<&i32> = tree.iter().collect();
    /// assert_eq!(items, vec![&2, &1]);
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            arena: Arena::new(),
            root: NIL,
            length: 0,
            version: 0,
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
    ///
    /// Outstanding handles and walkers are invalidated.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NIL;
        self.length = 0;
        self.version = self.version.wrapping_add(1);
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
    /// path.
    ///
    /// # Complexity
    ///
    /// O(log N): descends the taller side using the stored balance
    /// factors.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut index = self.root;
        while index != NIL {
            height += 1;
            let node = self.arena.get(index);
            index = if node.balance > 0 { node.right } else { node.left };
        }
        height
    }

    /// Iterates the items in ascending comparator order.
    ///
    /// The iterator climbs parent links, so it needs no allocation and no
    /// extra space beyond a cursor.
    #[must_use]
    pub fn iter(&self) -> AvlTreeIterator<'_, T, C> {
        AvlTreeIterator {
            tree: self,
            cursor: self.first_index(),
            remaining: self.length,
        }
    }

    /// Creates a detached walker positioned before the first item.
    ///
    /// Unlike [`iter`](Self::iter), the walker does not borrow the tree;
    /// each call takes the tree as an argument. Any structural mutation
    /// after creation invalidates the walker, and every subsequent call
    /// reports [`WalkError::Stale`].
    #[must_use]
    pub fn walker(&self) -> AvlTreeWalker {
        AvlTreeWalker {
            version: self.version,
            cursor: self.first_index(),
            current: NIL,
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
        if available < self.length {
            return Err(CapacityError {
                required: self.length,
                available,
            });
        }
        let mut position = start_index;
        let mut cursor = self.first_index();
        while cursor != NIL {
            destination[position] = self.arena.get(cursor).item.clone();
            position += 1;
            cursor = self.successor_of(cursor);
        }
        Ok(())
    }

    /// Index of the leftmost node, or `NIL` when empty.
    fn first_index(&self) -> u32 {
        if self.root == NIL {
            NIL
        } else {
            self.minimum(self.root)
        }
    }

    fn minimum(&self, mut index: u32) -> u32 {
        while self.arena.get(index).left != NIL {
            index = self.arena.get(index).left;
        }
        index
    }

    /// In-order successor by pointer climbing, or `NIL` at the end.
    fn successor_of(&self, index: u32) -> u32 {
        let right = self.arena.get(index).right;
        if right != NIL {
            return self.minimum(right);
        }
        let mut cursor = index;
        loop {
            let parent = self.arena.get(cursor).parent;
            if parent == NIL {
                return NIL;
            }
            if self.arena.get(parent).left == cursor {
                return parent;
            }
            cursor = parent;
        }
    }

    pub(crate) const fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn slot_capacity(&self) -> usize {
        self.arena.capacity()
    }

    pub(crate) fn item_at(&self, index: u32) -> &T {
        &self.arena.get(index).item
    }

    pub(crate) fn is_live(&self, index: u32) -> bool {
        self.arena.contains(index)
    }
}

impl<T, C: Comparator<T>> AvlTree<T, C> {
    /// Whether an item equal to `item` is present.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.find_index(item) != NIL
    }

    /// Finds the node holding an item equal to `item`.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avl_collections::ordered::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(7);
    /// let handle = tree.find(&7).unwrap();
    /// assert_eq!(tree.item(handle), &7);
    /// assert!(tree.find(&8).is_none());
    /// ```
    #[must_use]
    pub fn find(&self, item: &T) -> Option<NodeHandle> {
        let index = self.find_index(item);
        if index == NIL {
            None
        } else {
            Some(NodeHandle::new(index))
        }
    }

    /// Inserts `item` unless an equal item is present.
    ///
    /// Returns the node holding the item and whether it was already
    /// present; a duplicate insert changes nothing.
    ///
    /// # Complexity
    ///
    /// O(log N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avl_collections::ordered::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// let (first, existed) = tree.find_or_insert(5);
    /// assert!(!existed);
    /// let (second, existed) = tree.find_or_insert(5);
    /// assert!(existed);
    /// assert_eq!(first, second);
    /// ```
    pub fn find_or_insert(&mut self, item: T) -> (NodeHandle, bool) {
        let outcome = self.insert_entry(item);
        (NodeHandle::new(outcome.index), outcome.already_present)
    }

    /// Inserts `item`. Returns whether the tree changed.
    pub fn insert(&mut self, item: T) -> bool {
        !self.insert_entry(item).already_present
    }

    /// Removes the item equal to `item`. Returns whether it was present.
    ///
    /// # Complexity
    ///
    /// O(log N)
    pub fn remove(&mut self, item: &T) -> bool {
        let index = self.find_index(item);
        if index == NIL {
            return false;
        }
        self.remove_index(index);
        true
    }

    /// Removes the node named by `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not name a live node of this tree.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        assert!(
            self.arena.contains(handle.index()),
            "node handle does not name a live node"
        );
        self.remove_index(handle.index());
    }

    fn find_index(&self, item: &T) -> u32 {
        let mut index = self.root;
        while index != NIL {
            let node = self.arena.get(index);
            match self.comparator.compare(item, &node.item) {
                Ordering::Less => index = node.left,
                Ordering::Greater => index = node.right,
                Ordering::Equal => return index,
            }
        }
        NIL
    }

    /// Insert descent. Reports the attachment point for the list overlay.
    pub(crate) fn insert_entry(&mut self, item: T) -> InsertOutcome {
        if self.root == NIL {
            let index = self.arena.allocate(Node::new(item, NIL));
            self.root = index;
            self.length += 1;
            self.version = self.version.wrapping_add(1);
            return InsertOutcome {
                index,
                already_present: false,
                attached: None,
            };
        }
        let mut current = self.root;
        loop {
            match self.comparator.compare(&item, &self.arena.get(current).item) {
                Ordering::Less => {
                    if self.arena.get(current).left == NIL {
                        let index = self.arena.allocate(Node::new(item, current));
                        self.arena.get_mut(current).left = index;
                        self.insert_balance(current, -1);
                        self.length += 1;
                        self.version = self.version.wrapping_add(1);
                        return InsertOutcome {
                            index,
                            already_present: false,
                            attached: Some((current, Side::Left)),
                        };
                    }
                    current = self.arena.get(current).left;
                }
                Ordering::Greater => {
                    if self.arena.get(current).right == NIL {
                        let index = self.arena.allocate(Node::new(item, current));
                        self.arena.get_mut(current).right = index;
                        self.insert_balance(current, 1);
                        self.length += 1;
                        self.version = self.version.wrapping_add(1);
                        return InsertOutcome {
                            index,
                            already_present: false,
                            attached: Some((current, Side::Right)),
                        };
                    }
                    current = self.arena.get(current).right;
                }
                Ordering::Equal => {
                    return InsertOutcome {
                        index: current,
                        already_present: true,
                        attached: None,
                    };
                }
            }
        }
    }

    /// Removes the node at `index`, keeping every surviving node in its
    /// arena slot.
    ///
    /// A node with at most one child is spliced out directly. A node with
    /// two children is replaced by its in-order successor: the successor
    /// is detached from its own (simpler) position, moved into the deleted
    /// node's tree position, and inherits its balance factor. The retrace
    /// then starts where the tree actually lost height.
    pub(crate) fn remove_index(&mut self, index: u32) {
        let node = self.arena.get(index);
        let left = node.left;
        let right = node.right;
        let parent = node.parent;

        if left == NIL || right == NIL {
            // At most one child: splice it into this node's place.
            let child = if left == NIL { right } else { left };
            if child != NIL {
                self.arena.get_mut(child).parent = parent;
            }
            if parent == NIL {
                self.root = child;
            } else if self.arena.get(parent).left == index {
                self.arena.get_mut(parent).left = child;
                self.delete_balance(parent, 1);
            } else {
                self.arena.get_mut(parent).right = child;
                self.delete_balance(parent, -1);
            }
        } else if self.arena.get(right).left == NIL {
            // The right child has no left subtree: promote it directly.
            let balance = self.arena.get(index).balance;
            {
                let successor = self.arena.get_mut(right);
                successor.parent = parent;
                successor.left = left;
                successor.balance = balance;
            }
            self.arena.get_mut(left).parent = right;
            self.replace_in_parent(index, parent, right);
            self.delete_balance(right, -1);
        } else {
            // General case: detach the leftmost node of the right subtree
            // and move it into the deleted node's position.
            let mut successor = self.arena.get(right).left;
            while self.arena.get(successor).left != NIL {
                successor = self.arena.get(successor).left;
            }
            let successor_parent = self.arena.get(successor).parent;
            let successor_right = self.arena.get(successor).right;
            self.arena.get_mut(successor_parent).left = successor_right;
            if successor_right != NIL {
                self.arena.get_mut(successor_right).parent = successor_parent;
            }
            let balance = self.arena.get(index).balance;
            {
                let moved = self.arena.get_mut(successor);
                moved.parent = parent;
                moved.left = left;
                moved.right = right;
                moved.balance = balance;
            }
            self.arena.get_mut(left).parent = successor;
            self.arena.get_mut(right).parent = successor;
            self.replace_in_parent(index, parent, successor);
            self.delete_balance(successor_parent, 1);
        }

        let _ = self.arena.release(index);
        self.length -= 1;
        self.version = self.version.wrapping_add(1);
    }

    fn replace_in_parent(&mut self, old: u32, parent: u32, new: u32) {
        if parent == NIL {
            self.root = new;
        } else if self.arena.get(parent).left == old {
            self.arena.get_mut(parent).left = new;
        } else {
            self.arena.get_mut(parent).right = new;
        }
    }

    /// Bottom-up retrace after insertion. `delta` is +1 when the height
    /// grew on `index`'s right side, -1 on its left.
    ///
    /// A step that leaves a node perfectly balanced absorbed the growth;
    /// a step that reaches +/-2 is fixed by one rotation, which always
    /// restores the pre-insert height, so either way the retrace stops.
    fn insert_balance(&mut self, mut index: u32, mut delta: i8) {
        while index != NIL {
            let balance = self.arena.get(index).balance + delta;
            self.arena.get_mut(index).balance = balance;
            if balance == 0 {
                return;
            }
            if balance == -2 {
                if self.arena.get(self.arena.get(index).left).balance == -1 {
                    let _ = self.rotate_right(index);
                } else {
                    let _ = self.rotate_left_right(index);
                }
                return;
            }
            if balance == 2 {
                if self.arena.get(self.arena.get(index).right).balance == 1 {
                    let _ = self.rotate_left(index);
                } else {
                    let _ = self.rotate_right_left(index);
                }
                return;
            }
            let parent = self.arena.get(index).parent;
            if parent != NIL {
                delta = if self.arena.get(parent).left == index {
                    -1
                } else {
                    1
                };
            }
            index = parent;
        }
    }

    /// Bottom-up retrace after removal. `delta` is +1 when the height
    /// shrank on `index`'s left side, -1 on its right.
    ///
    /// Unlike insertion, a rotation does not always absorb the height
    /// change: after a single rotation the new subtree root's balance
    /// tells whether the subtree kept its height (+/-1, stop) or shrank
    /// (0, keep retracing).
    fn delete_balance(&mut self, mut index: u32, mut delta: i8) {
        while index != NIL {
            let balance = self.arena.get(index).balance + delta;
            self.arena.get_mut(index).balance = balance;
            if balance == -2 {
                if self.arena.get(self.arena.get(index).left).balance <= 0 {
                    index = self.rotate_right(index);
                    if self.arena.get(index).balance == 1 {
                        return;
                    }
                } else {
                    index = self.rotate_left_right(index);
                }
            } else if balance == 2 {
                if self.arena.get(self.arena.get(index).right).balance >= 0 {
                    index = self.rotate_left(index);
                    if self.arena.get(index).balance == -1 {
                        return;
                    }
                } else {
                    index = self.rotate_right_left(index);
                }
            } else if balance != 0 {
                return;
            }
            let parent = self.arena.get(index).parent;
            if parent != NIL {
                delta = if self.arena.get(parent).left == index {
                    1
                } else {
                    -1
                };
            }
            index = parent;
        }
    }

    // The four rotation primitives relink three or four nodes and
    // recompute exactly the rotated nodes' balance factors from the
    // pre-rotation values; subtree heights are never re-measured.

    fn rotate_left(&mut self, index: u32) -> u32 {
        let right = self.arena.get(index).right;
        let right_left = self.arena.get(right).left;
        let parent = self.arena.get(index).parent;

        {
            let pivot = self.arena.get_mut(right);
            pivot.parent = parent;
            pivot.left = index;
        }
        {
            let node = self.arena.get_mut(index);
            node.right = right_left;
            node.parent = right;
        }
        if right_left != NIL {
            self.arena.get_mut(right_left).parent = index;
        }
        if index == self.root {
            self.root = right;
        } else if self.arena.get(parent).right == index {
            self.arena.get_mut(parent).right = right;
        } else {
            self.arena.get_mut(parent).left = right;
        }
        let pivot_balance = self.arena.get(right).balance - 1;
        self.arena.get_mut(right).balance = pivot_balance;
        self.arena.get_mut(index).balance = -pivot_balance;
        right
    }

    fn rotate_right(&mut self, index: u32) -> u32 {
        let left = self.arena.get(index).left;
        let left_right = self.arena.get(left).right;
        let parent = self.arena.get(index).parent;

        {
            let pivot = self.arena.get_mut(left);
            pivot.parent = parent;
            pivot.right = index;
        }
        {
            let node = self.arena.get_mut(index);
            node.left = left_right;
            node.parent = left;
        }
        if left_right != NIL {
            self.arena.get_mut(left_right).parent = index;
        }
        if index == self.root {
            self.root = left;
        } else if self.arena.get(parent).left == index {
            self.arena.get_mut(parent).left = left;
        } else {
            self.arena.get_mut(parent).right = left;
        }
        let pivot_balance = self.arena.get(left).balance + 1;
        self.arena.get_mut(left).balance = pivot_balance;
        self.arena.get_mut(index).balance = -pivot_balance;
        left
    }

    fn rotate_left_right(&mut self, index: u32) -> u32 {
        let left = self.arena.get(index).left;
        let pivot = self.arena.get(left).right;
        let parent = self.arena.get(index).parent;
        let pivot_right = self.arena.get(pivot).right;
        let pivot_left = self.arena.get(pivot).left;

        {
            let node = self.arena.get_mut(pivot);
            node.parent = parent;
            node.left = left;
            node.right = index;
        }
        {
            let node = self.arena.get_mut(index);
            node.left = pivot_right;
            node.parent = pivot;
        }
        {
            let node = self.arena.get_mut(left);
            node.right = pivot_left;
            node.parent = pivot;
        }
        if pivot_right != NIL {
            self.arena.get_mut(pivot_right).parent = index;
        }
        if pivot_left != NIL {
            self.arena.get_mut(pivot_left).parent = left;
        }
        if index == self.root {
            self.root = pivot;
        } else if self.arena.get(parent).left == index {
            self.arena.get_mut(parent).left = pivot;
        } else {
            self.arena.get_mut(parent).right = pivot;
        }
        match self.arena.get(pivot).balance {
            1 => {
                self.arena.get_mut(index).balance = 0;
                self.arena.get_mut(left).balance = -1;
            }
            0 => {
                self.arena.get_mut(index).balance = 0;
                self.arena.get_mut(left).balance = 0;
            }
            _ => {
                self.arena.get_mut(index).balance = 1;
                self.arena.get_mut(left).balance = 0;
            }
        }
        self.arena.get_mut(pivot).balance = 0;
        pivot
    }

    fn rotate_right_left(&mut self, index: u32) -> u32 {
        let right = self.arena.get(index).right;
        let pivot = self.arena.get(right).left;
        let parent = self.arena.get(index).parent;
        let pivot_left = self.arena.get(pivot).left;
        let pivot_right = self.arena.get(pivot).right;

        {
            let node = self.arena.get_mut(pivot);
            node.parent = parent;
            node.right = right;
            node.left = index;
        }
        {
            let node = self.arena.get_mut(index);
            node.right = pivot_left;
            node.parent = pivot;
        }
        {
            let node = self.arena.get_mut(right);
            node.left = pivot_right;
            node.parent = pivot;
        }
        if pivot_left != NIL {
            self.arena.get_mut(pivot_left).parent = index;
        }
        if pivot_right != NIL {
            self.arena.get_mut(pivot_right).parent = right;
        }
        if index == self.root {
            self.root = pivot;
        } else if self.arena.get(parent).right == index {
            self.arena.get_mut(parent).right = pivot;
        } else {
            self.arena.get_mut(parent).left = pivot;
        }
        match self.arena.get(pivot).balance {
            -1 => {
                self.arena.get_mut(index).balance = 0;
                self.arena.get_mut(right).balance = 1;
            }
            0 => {
                self.arena.get_mut(index).balance = 0;
                self.arena.get_mut(right).balance = 0;
            }
            _ => {
                self.arena.get_mut(index).balance = -1;
                self.arena.get_mut(right).balance = 0;
            }
        }
        self.arena.get_mut(pivot).balance = 0;
        pivot
    }
}

// =============================================================================
// Shared Contract
// =============================================================================

impl<T, C: Comparator<T>> OrderedIndex<T> for AvlTree<T, C> {
    type Iter<'a>
        = AvlTreeIterator<'a, T, C>
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

    fn iter(&self) -> AvlTreeIterator<'_, T, C> {
        Self::iter(self)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// Borrowing in-order iterator over an [`AvlTree`].
///
/// Climbs parent links; O(1) space.
pub struct AvlTreeIterator<'a, T, C> {
    tree: &'a AvlTree<T, C>,
    cursor: u32,
    remaining: usize,
}

impl<'a, T, C> Iterator for AvlTreeIterator<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let item = &self.tree.arena.get(self.cursor).item;
        self.cursor = self.tree.successor_of(self.cursor);
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, C> ExactSizeIterator for AvlTreeIterator<'_, T, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<'a, T, C> IntoIterator for &'a AvlTree<T, C> {
    type Item = &'a T;
    type IntoIter = AvlTreeIterator<'a, T, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// =============================================================================
// Walker Implementation
// =============================================================================

/// Detached in-order walker over an [`AvlTree`].
///
/// Holds no borrow of the tree; every call takes the tree as an argument.
/// Created positioned before the first item. Any structural mutation of
/// the tree after creation makes every subsequent call return
/// [`WalkError::Stale`].
///
/// # Examples
///
/// ```rust
/// use avl_collections::ordered::{AvlTree, WalkError};
///
/// let mut tree = AvlTree::new();
/// tree.insert(1);
/// tree.insert(2);
///
/// let mut walker = tree.walker();
/// assert_eq!(walker.move_next(&tree), Ok(true));
/// assert_eq!(walker.current(&tree), Ok(&1));
///
/// tree.insert(3);
/// assert_eq!(walker.move_next(&tree), Err(WalkError::Stale));
/// ```
#[derive(Clone, Debug)]
pub struct AvlTreeWalker {
    version: u64,
    cursor: u32,
    current: u32,
}

impl AvlTreeWalker {
    /// Advances to the next item. `Ok(false)` means the walk is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// [`WalkError::Stale`] if the tree was mutated after this walker was
    /// created.
    pub fn move_next<T, C>(&mut self, tree: &AvlTree<T, C>) -> Result<bool, WalkError> {
        if self.version != tree.version {
            return Err(WalkError::Stale);
        }
        if self.cursor == NIL {
            self.current = NIL;
            return Ok(false);
        }
        if self.current == NIL {
            self.current = self.cursor;
            return Ok(true);
        }
        let next = tree.successor_of(self.cursor);
        self.cursor = next;
        self.current = next;
        Ok(next != NIL)
    }

    /// The item the walker is positioned on.
    ///
    /// # Errors
    ///
    /// [`WalkError::Stale`] if the tree was mutated after this walker was
    /// created; [`WalkError::NotPositioned`] before the first successful
    /// [`move_next`](Self::move_next) or after exhaustion.
    pub fn current<'tree, T, C>(&self, tree: &'tree AvlTree<T, C>) -> Result<&'tree T, WalkError> {
        if self.version != tree.version {
            return Err(WalkError::Stale);
        }
        if self.current == NIL {
            return Err(WalkError::NotPositioned);
        }
        Ok(&tree.arena.get(self.current).item)
    }

    /// Repositions before the first item.
    ///
    /// # Errors
    ///
    /// [`WalkError::Stale`] if the tree was mutated after this walker was
    /// created.
    pub fn reset<T, C>(&mut self, tree: &AvlTree<T, C>) -> Result<(), WalkError> {
        if self.version != tree.version {
            return Err(WalkError::Stale);
        }
        self.cursor = tree.first_index();
        self.current = NIL;
        Ok(())
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T: fmt::Debug, C> fmt::Debug for AvlTree<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C> fmt::Display for AvlTree<T, C> {
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

impl<T: Ord> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iterable: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iterable);
        tree
    }
}

impl<T, C: Comparator<T>> Extend<T> for AvlTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iterable: I) {
        for item in iterable {
            let _ = self.insert(item);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
