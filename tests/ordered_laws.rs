//! Property-based laws shared by every ordered-index engine.
//!
//! Each engine is driven through arbitrary insert/remove sequences and
//! checked against `BTreeSet` as the reference model, plus the structural
//! guarantees a model cannot see: the AVL height bound and the list
//! ring's agreement with the sorted order.

use avl_collections::ordered::{AvlTree, AvlTreeList, CompactAvlTree, OrderedIndex};
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

#[derive(Clone, Copy, Debug)]
enum Operation {
    Insert(i32),
    Remove(i32),
}

/// A churn sequence over a small key range, so inserts and removes
/// actually collide.
fn arbitrary_operations(max_length: usize) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(
        prop_oneof![
            (0..64i32).prop_map(Operation::Insert),
            (0..64i32).prop_map(Operation::Remove),
        ],
        0..max_length,
    )
}

/// Applies `operations` to an engine and the model in lockstep, checking
/// that every step reports the same outcome.
fn apply<I: OrderedIndex<i32>>(engine: &mut I, model: &mut BTreeSet<i32>, operations: &[Operation]) {
    for operation in operations {
        match *operation {
            Operation::Insert(value) => {
                let (_, existed) = engine.insert_or_find(value);
                assert_eq!(existed, !model.insert(value));
            }
            Operation::Remove(value) => {
                assert_eq!(engine.remove(&value), model.remove(&value));
            }
        }
    }
}

fn assert_matches_model<I: OrderedIndex<i32>>(engine: &I, model: &BTreeSet<i32>) {
    assert_eq!(engine.len(), model.len());
    let items: Vec<i32> = engine.iter().copied().collect();
    let expected: Vec<i32> = model.iter().copied().collect();
    assert_eq!(items, expected);
    for probe in 0..64 {
        assert_eq!(engine.locate(&probe).is_some(), model.contains(&probe));
    }
}

/// Worst-case AVL height: ~1.44 * log2(n + 2).
fn avl_height_bound(length: usize) -> f64 {
    1.4405 * ((length + 2) as f64).log2()
}

// =============================================================================
// Model Agreement Laws
// =============================================================================

proptest! {
    /// Law: the classic engine behaves exactly like a BTreeSet.
    #[test]
    fn prop_classic_matches_model(operations in arbitrary_operations(200)) {
        let mut tree: AvlTree<i32> = AvlTree::new();
        let mut model = BTreeSet::new();
        apply(&mut tree, &mut model, &operations);
        assert_matches_model(&tree, &model);
    }

    /// Law: the compact engine behaves exactly like a BTreeSet.
    #[test]
    fn prop_compact_matches_model(operations in arbitrary_operations(200)) {
        let mut tree: CompactAvlTree<i32> = CompactAvlTree::new();
        let mut model = BTreeSet::new();
        apply(&mut tree, &mut model, &operations);
        assert_matches_model(&tree, &model);
    }

    /// Law: the list engine behaves exactly like a BTreeSet.
    #[test]
    fn prop_list_matches_model(operations in arbitrary_operations(200)) {
        let mut list: AvlTreeList<i32> = AvlTreeList::new();
        let mut model = BTreeSet::new();
        apply(&mut list, &mut model, &operations);
        assert_matches_model(&list, &model);
    }

    /// Law: both tree layouts produce the same sorted sequence for the
    /// same operations.
    #[test]
    fn prop_layouts_agree(operations in arbitrary_operations(200)) {
        let mut classic: AvlTree<i32> = AvlTree::new();
        let mut compact: CompactAvlTree<i32> = CompactAvlTree::new();
        let mut model = BTreeSet::new();
        apply(&mut classic, &mut model.clone(), &operations);
        apply(&mut compact, &mut model, &operations);
        let classic_items: Vec<i32> = classic.iter().copied().collect();
        let compact_items: Vec<i32> = compact.iter().copied().collect();
        prop_assert_eq!(classic_items, compact_items);
    }
}

// =============================================================================
// Structural Laws
// =============================================================================

proptest! {
    /// Law: every engine keeps its height within the AVL bound under
    /// arbitrary churn.
    #[test]
    fn prop_height_stays_within_avl_bound(operations in arbitrary_operations(300)) {
        let mut classic: AvlTree<i32> = AvlTree::new();
        let mut compact: CompactAvlTree<i32> = CompactAvlTree::new();
        let mut model = BTreeSet::new();
        apply(&mut classic, &mut model.clone(), &operations);
        apply(&mut compact, &mut model, &operations);
        let bound = avl_height_bound(model.len());
        prop_assert!((classic.height() as f64) <= bound);
        prop_assert!((compact.height() as f64) <= bound);
    }

    /// Law: the ring visits exactly the sorted sequence, forward and
    /// backward, and closes on itself.
    #[test]
    fn prop_ring_agrees_with_sorted_order(operations in arbitrary_operations(200)) {
        let mut list: AvlTreeList<i32> = AvlTreeList::new();
        let mut model = BTreeSet::new();
        apply(&mut list, &mut model, &operations);

        let sorted: Vec<i32> = model.iter().copied().collect();
        if let Some(first) = list.first() {
            let mut forward = Vec::with_capacity(list.len());
            let mut cursor = first;
            for _ in 0..list.len() {
                forward.push(*list.item(cursor));
                cursor = list.next(cursor);
            }
            prop_assert_eq!(cursor, first, "forward walk did not close");
            prop_assert_eq!(&forward, &sorted);

            let mut backward = Vec::with_capacity(list.len());
            let mut cursor = list.last().expect("non-empty list has a last item");
            for _ in 0..list.len() {
                backward.push(*list.item(cursor));
                cursor = list.prev(cursor);
            }
            backward.reverse();
            prop_assert_eq!(&backward, &sorted);
        } else {
            prop_assert!(model.is_empty());
        }
    }

    /// Law: re-inserting every present item changes nothing.
    #[test]
    fn prop_duplicate_inserts_are_idempotent(
        values in prop::collection::btree_set(0..64i32, 0..40)
    ) {
        let mut tree: CompactAvlTree<i32> = values.iter().copied().collect();
        let before: Vec<i32> = tree.iter().copied().collect();
        for value in &values {
            let (_, existed) = tree.find_or_insert(*value);
            prop_assert!(existed);
        }
        let after: Vec<i32> = tree.iter().copied().collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(tree.len(), values.len());
    }
}
