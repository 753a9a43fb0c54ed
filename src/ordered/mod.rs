//! Ordered collections kept balanced by AVL rebalancing.
//!
//! This module provides three engines that share one algorithmic contract
//! but differ in node layout:
//!
//! - [`AvlTree`]: parent-linked nodes with a signed balance factor;
//!   insert/delete retrace bottom-up through parent links.
//! - [`CompactAvlTree`]: parentless nodes with a single tri-state
//!   longer-side field; rebalancing happens in the same top-down pass as
//!   the search, so each node is two link words and one byte smaller.
//! - [`AvlTreeList`]: the parent-linked layout threaded with a circular
//!   doubly-linked ring in sorted order, for O(1) `first`/`last`/
//!   `next`/`prev` on top of O(log n) keyed lookup.
//!
//! # Shared contract
//!
//! The [`OrderedIndex`] trait captures the operations every engine
//! supports: locate, insert-or-find, remove, and ordered iteration.
//! Callers pick a concrete engine for its memory or traversal profile and
//! can stay generic over the rest.
//!
//! # Ordering
//!
//! Each tree is built over a [`Comparator`] supplied at construction time
//! and fixed for the tree's lifetime. [`NaturalOrder`] (the `Ord`
//! ordering) is the default; any `Fn(&T, &T) -> Ordering` closure also
//! works:
//!
//! ```rust
//! use avl_collections::ordered::AvlTree;
//! use std::cmp::Ordering;
//!
//! let mut descending =
//!     AvlTree::with_comparator(|left: &i32, right: &i32| right.cmp(left));
//! for number in [1, 2, 3] {
//!     descending.insert(number);
//! }
//! let items: Vec<i32> = descending.iter().copied().collect();
//! assert_eq!(items, vec![3, 2, 1]);
//! ```
//!
//! # Handles and walkers
//!
//! Successful lookups and inserts return a [`NodeHandle`], a copyable
//! token naming the node for later O(1) access (`item`, `remove_node`,
//! ring navigation). Handles stay valid until their node is removed or the
//! tree is cleared.
//!
//! Besides borrowing iterators, every engine offers a detached *walker*
//! with an explicit `move_next`/`current`/`reset` contract. Walkers of
//! [`AvlTree`] and [`AvlTreeList`] are invalidated by any structural
//! mutation and report [`WalkError::Stale`] afterwards; the
//! [`CompactAvlTree`] walker carries no such guard (see that type's
//! documentation for the hazard).

use std::cmp::Ordering;
use std::error::Error;
use std::fmt;

// =============================================================================
// Node Handles
// =============================================================================

/// Opaque handle to a live tree node.
///
/// Obtained from `find`, `find_or_insert`, or ring navigation. A handle is
/// a stable arena index: it survives rotations and unrelated mutations,
/// and is invalidated only when its node is removed or the tree is
/// cleared. Passing an invalidated handle back to the tree panics; the
/// slot may meanwhile have been reused for a different item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle(u32);

impl NodeHandle {
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> u32 {
        self.0
    }
}

// =============================================================================
// Sides
// =============================================================================

/// A branching direction inside a tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

// =============================================================================
// Comparator Injection
// =============================================================================

/// Total order over `T`, injected at tree construction.
///
/// The comparator is part of the tree's state and must be consistent for
/// the tree's lifetime; the trees never re-sort existing nodes.
pub trait Comparator<T> {
    /// Compares two items, `left` relative to `right`.
    fn compare(&self, left: &T, right: &T) -> Ordering;
}

/// The natural (`Ord`) ordering of the item type. Default comparator of
/// every engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self(left, right)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Bulk export target too small for the tree's contents.
///
/// Returned by the engines' `copy_into`; the destination is left
/// untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityError {
    /// Number of items that needed to fit.
    pub required: usize,
    /// Room actually available from the start index.
    pub available: usize,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "destination holds {} items but {} are required",
            self.available, self.required
        )
    }
}

impl Error for CapacityError {}

/// Failure of a detached walker call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkError {
    /// The backing tree was structurally mutated after the walker was
    /// created; the walker is permanently invalid.
    Stale,
    /// `current` was called before the first successful `move_next` or
    /// after the walk was exhausted.
    NotPositioned,
}

impl fmt::Display for WalkError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale => write!(formatter, "tree was mutated after the walker was created"),
            Self::NotPositioned => write!(formatter, "walker is not positioned on an item"),
        }
    }
}

impl Error for WalkError {}

// =============================================================================
// Shared Engine Contract
// =============================================================================

/// The algorithmic contract shared by every tree engine.
///
/// All operations are O(log n) except `clear` and iteration, which are
/// O(n). Inserting an item that is already present (per the tree's
/// comparator) is a no-op that reports the existing node.
pub trait OrderedIndex<T> {
    /// Borrowing in-order iterator type.
    type Iter<'a>: Iterator<Item = &'a T>
    where
        Self: 'a,
        T: 'a;

    /// Finds the node holding an item equal to `item`, if any.
    fn locate(&self, item: &T) -> Option<NodeHandle>;

    /// Inserts `item` unless an equal item is present.
    ///
    /// Returns the node holding the item and whether it was already
    /// present.
    fn insert_or_find(&mut self, item: T) -> (NodeHandle, bool);

    /// Removes the item equal to `item`. Returns whether it was present.
    fn remove(&mut self, item: &T) -> bool;

    /// Number of items in the tree.
    fn len(&self) -> usize;

    /// Whether the tree holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every item.
    fn clear(&mut self);

    /// Iterates the items in ascending comparator order.
    fn iter(&self) -> Self::Iter<'_>;
}

// =============================================================================
// Submodules
// =============================================================================

mod arena;
mod avl_tree;
mod avl_tree_list;
mod compact_avl_tree;

pub use avl_tree::AvlTree;
pub use avl_tree::AvlTreeIterator;
pub use avl_tree::AvlTreeWalker;
pub use avl_tree_list::AvlTreeList;
pub use avl_tree_list::AvlTreeListIterator;
pub use avl_tree_list::AvlTreeListWalker;
pub use compact_avl_tree::CompactAvlTree;
pub use compact_avl_tree::CompactAvlTreeIterator;
pub use compact_avl_tree::CompactAvlTreeWalker;

// =============================================================================
// Tests
// =============================================================================


#[cfg(test)]
mod error_tests {
    use super::{CapacityError, WalkError};
    use rstest::rstest;

    #[rstest]
    fn test_capacity_error_display() {
        let error = CapacityError {
            required: 10,
            available: 4,
        };
        assert_eq!(
            format!("{error}"),
            "destination holds 4 items but 10 are required"
        );
    }

    #[rstest]
    fn test_walk_error_display() {
        assert_eq!(
            format!("{}", WalkError::Stale),
            "tree was mutated after the walker was created"
        );
        assert_eq!(
            format!("{}", WalkError::NotPositioned),
            "walker is not positioned on an item"
        );
    }
}
