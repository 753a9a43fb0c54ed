//! # avl-collections
//!
//! Self-balancing ordered collections built on AVL trees, offered in
//! several node layouts so callers can pick their memory-vs-traversal
//! tradeoff.
//!
//! ## Overview
//!
//! Every engine keeps a binary search tree height-balanced under arbitrary
//! insert/delete sequences while preserving sorted order:
//!
//! - **`AvlTree`**: classic parent-linked layout with a signed balance
//!   factor per node and bottom-up rebalancing.
//! - **`CompactAvlTree`**: parentless layout storing only a tri-state
//!   "longer side" per node; rebalancing happens in the same top-down pass
//!   as the search.
//! - **`AvlTreeList`**: the classic layout threaded with a circular
//!   doubly-linked ring, giving O(1) ordered-neighbor access on top of
//!   O(log n) keyed lookup.
//!
//! Nodes live in a per-tree arena addressed by stable `u32` indices, so the
//! parent and ring back-references need no `unsafe` and no reference
//! counting.
//!
//! ## Example
//!
//! ```rust
//! use avl_collections::ordered::AvlTreeList;
//!
//! let mut list = AvlTreeList::new();
//! for number in [30, 10, 40, 20, 50] {
//!     list.insert(number);
//! }
//!
//! let ascending: Vec<i32> = list.iter().copied().collect();
//! assert_eq!(ascending, vec![10, 20, 30, 40, 50]);
//!
//! let first = list.first().unwrap();
//! assert_eq!(list.item(first), &10);
//! assert_eq!(list.item(list.next(first)), &20);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use avl_collections::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ordered::*;
}

pub mod ordered;
