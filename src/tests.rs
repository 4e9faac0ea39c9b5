extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, max_height, TestNode};

use super::*;

fn tree_of(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key, key)).is_none());
        tree.assert_invariants();
    }

    tree
}

fn root_key(tree: &AvlTree<TestNode>) -> Option<u32> {
    tree.root.map(|root| unsafe { root.as_ref().key })
}

fn child_key(tree: &AvlTree<TestNode>, key: u32, dir: Dir) -> Option<u32> {
    let node = tree.get_raw(&key)?;
    unsafe { links(node).child(dir).map(|child| child.as_ref().key) }
}

fn balance_of(tree: &AvlTree<TestNode>, key: u32) -> i8 {
    let node = tree.get_raw(&key).expect("item not found");
    unsafe { links(node).balance() }
}

fn shape(tree: &AvlTree<TestNode>) -> String {
    let mut graph = String::new();
    tree.dotgraph("shape", &mut graph).unwrap();
    graph
}

fn permutations(keys: &[u32]) -> Vec<Vec<u32>> {
    if keys.len() <= 1 {
        return vec![keys.to_vec()];
    }

    let mut perms = Vec::new();
    for (i, &first) in keys.iter().enumerate() {
        let mut rest = keys.to_vec();
        rest.remove(i);

        for mut perm in permutations(&rest) {
            perm.insert(0, first);
            perms.push(perm);
        }
    }

    perms
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        let node = tree.get_raw(key).expect("item not found");
        assert_eq!(unsafe { node.as_ref().key() }, key);
    }

    assert!(tree.get_raw(&u32::MAX).is_none());
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn every_order_find() {
    for len in 2..=6 {
        let keys: Vec<u32> = (0..len).collect();

        for perm in permutations(&keys) {
            insert_find_all(&perm);
        }
    }
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = tree_of(keys);

    for key in keys {
        let node = tree.remove(key).expect("item not found");
        assert_eq!(node.key, *key);
        tree.assert_invariants();
    }
    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(TestNode::new(key, key));
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let node = tree.get_raw(key).expect("item not found");
        drop(unsafe { tree.remove_at(node) });
        tree.assert_invariants();
    }
    assert!(tree.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_every_order() {
    for len in 2..=6 {
        let keys: Vec<u32> = (0..len).collect();

        for perm in permutations(&keys) {
            insert_remove_all(&perm);
        }
    }
}

#[test]
fn remove_from_full_tree_in_every_order() {
    let keys: Vec<u32> = (0..7).collect();

    for order in permutations(&keys) {
        let mut tree = tree_of(&[3, 1, 5, 0, 2, 4, 6]);

        for key in &order {
            assert!(tree.remove(key).is_some());
            tree.assert_invariants();
        }

        assert!(tree.is_empty());
    }
}

#[test]
fn ascending_insert_rotates_left() {
    let tree = tree_of(&[10, 20, 30]);

    assert_eq!(root_key(&tree), Some(20));
    assert_eq!(child_key(&tree, 20, Dir::Left), Some(10));
    assert_eq!(child_key(&tree, 20, Dir::Right), Some(30));

    for key in [10, 20, 30] {
        assert_eq!(balance_of(&tree, key), 0);
    }
}

#[test]
fn descending_insert_rotates_right() {
    let tree = tree_of(&[30, 20, 10]);

    assert_eq!(root_key(&tree), Some(20));
    for key in [10, 20, 30] {
        assert_eq!(balance_of(&tree, key), 0);
    }
}

#[test]
fn zigzag_insert_rotates_twice() {
    for keys in [[30, 10, 20], [10, 30, 20]] {
        let tree = tree_of(&keys);

        assert_eq!(root_key(&tree), Some(20));
        assert_eq!(child_key(&tree, 20, Dir::Left), Some(10));
        assert_eq!(child_key(&tree, 20, Dir::Right), Some(30));

        for key in [10, 20, 30] {
            assert_eq!(balance_of(&tree, key), 0);
        }
    }
}

#[test]
fn zigzag_insert_below_left_heavy_middle() {
    // Inserting 25 leaves 30 left-heavy before it is lifted above 20 and 50.
    let tree = tree_of(&[50, 20, 80, 10, 30, 25]);

    assert_eq!(root_key(&tree), Some(30));
    assert_eq!(child_key(&tree, 20, Dir::Right), Some(25));
    assert_eq!(balance_of(&tree, 30), 0);
    assert_eq!(balance_of(&tree, 20), 0);
    assert_eq!(balance_of(&tree, 50), 1);
}

#[test]
fn zigzag_insert_below_right_heavy_middle() {
    let tree = tree_of(&[50, 20, 80, 10, 30, 35]);

    assert_eq!(root_key(&tree), Some(30));
    assert_eq!(child_key(&tree, 50, Dir::Left), Some(35));
    assert_eq!(balance_of(&tree, 30), 0);
    assert_eq!(balance_of(&tree, 20), -1);
    assert_eq!(balance_of(&tree, 50), 0);
}

#[test]
fn remove_rotation_keeping_height() {
    let mut tree = tree_of(&[20, 10, 30, 25, 35]);

    tree.remove(&10);
    tree.assert_invariants();

    assert_eq!(root_key(&tree), Some(30));
    assert_eq!(child_key(&tree, 20, Dir::Right), Some(25));
    assert_eq!(balance_of(&tree, 30), -1);
    assert_eq!(balance_of(&tree, 20), 1);
}

#[test]
fn remove_double_rotation() {
    let mut tree = tree_of(&[20, 10, 30, 25]);

    tree.remove(&10);
    tree.assert_invariants();

    assert_eq!(root_key(&tree), Some(25));
    for key in [20, 25, 30] {
        assert_eq!(balance_of(&tree, key), 0);
    }
}

#[test]
fn remove_rotates_at_several_levels() {
    // The sparsest tree of height 5. Removing 11 unbalances 10, and rotating there shortens the
    // left subtree of 7, which must then rotate as well.
    let mut tree = tree_of(&[7, 4, 10, 2, 6, 9, 11, 1, 3, 5, 8, 0]);
    assert_eq!(tree.height(), 5);

    tree.remove(&11);
    tree.assert_invariants();

    assert_eq!(root_key(&tree), Some(4));
    assert_eq!(tree.height(), 4);
}

#[test]
fn remove_with_two_children_uses_predecessor() {
    let mut tree = tree_of(&[20, 10, 30, 5, 15]);
    let fifteen = tree.get_raw(&15).expect("item not found");

    let removed = tree.remove(&10).expect("item not found");
    assert_eq!(removed.key, 10);
    tree.assert_invariants();

    assert_eq!(child_key(&tree, 20, Dir::Left), Some(5));
    assert_eq!(child_key(&tree, 5, Dir::Right), Some(15));
    assert_eq!(balance_of(&tree, 5), 1);
    assert_eq!(balance_of(&tree, 20), -1);

    // Nodes keep their identity across the swap.
    assert_eq!(tree.get_raw(&15), Some(fifteen));
}

#[test]
fn swap_parent_and_child() {
    let mut tree = tree_of(&[20, 10, 30]);
    let before = shape(&tree);

    let twenty = tree.get_raw(&20).unwrap();
    let ten = tree.get_raw(&10).unwrap();

    unsafe {
        tree.swap_nodes(twenty, ten);

        assert_eq!(tree.root, Some(ten));
        assert_eq!(links(ten).left(), Some(twenty));
        assert_eq!(links(twenty).parent(), Some(ten));
        assert_eq!(links(twenty).left(), None);
        assert_eq!(links(ten).right().map(|n| n.as_ref().key), Some(30));

        tree.swap_nodes(ten, twenty);
    }

    tree.assert_invariants();
    assert_eq!(shape(&tree), before);
}

#[test]
fn swap_distant_nodes() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7, 0]);
    let before = shape(&tree);

    let four = tree.get_raw(&4).unwrap();
    let three = tree.get_raw(&3).unwrap();
    let balances = unsafe { (links(four).balance(), links(three).balance()) };

    unsafe {
        tree.swap_nodes(four, three);

        assert_eq!(tree.root, Some(three));
        assert_eq!(links(four).parent().map(|n| n.as_ref().key), Some(2));
        assert_eq!(links(three).right().map(|n| n.as_ref().key), Some(6));
        assert_eq!(links(three).balance(), balances.0);
        assert_eq!(links(four).balance(), balances.1);

        tree.swap_nodes(three, four);
    }

    tree.assert_invariants();
    assert_eq!(shape(&tree), before);
}

#[test]
fn rotation_without_pivot_is_noop() {
    let mut tree = tree_of(&[1, 0]);
    let before = shape(&tree);
    let root = tree.root.unwrap();

    // The root has no right child to lift.
    tree.rotate(root, Dir::Left);

    tree.assert_invariants();
    assert_eq!(shape(&tree), before);
}

#[test]
fn insert_existing_key_keeps_shape() {
    let keys: Vec<u32> = (0..50).collect();
    let mut tree = tree_of(&keys);
    let before = shape(&tree);

    let old = tree.insert(TestNode::new(17, 1700)).expect("key was present");
    assert_eq!((old.key, old.value), (17, 17));

    tree.assert_invariants();
    assert_eq!(shape(&tree), before);
    assert_eq!(tree.len(), 50);
    assert_eq!(tree.get(&17).map(|node| node.value), Some(1700));
}

#[test]
fn remove_missing_key_keeps_shape() {
    let keys: Vec<u32> = (0..50).map(|k| k * 2).collect();
    let mut tree = tree_of(&keys);
    let before = shape(&tree);

    assert!(tree.remove(&13).is_none());
    assert!(tree.remove(&1000).is_none());

    assert_eq!(shape(&tree), before);
    assert_eq!(tree.len(), 50);
}

#[test]
fn max_height_of_sparsest_trees() {
    let expected = [(0, 0), (1, 1), (2, 2), (3, 2), (4, 3), (6, 3), (7, 4), (12, 5), (20, 6)];

    for (len, height) in expected {
        assert_eq!(max_height(len), height, "len {len}");
    }

    for len in 0..100_000 {
        let bound = 1.4405 * ((len + 2) as f64).log2() - 0.3277;
        assert!(max_height(len) as f64 <= bound, "len {len}");
    }
}

#[test]
fn height_bound_holds_for_sequential_inserts() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();

    for key in 0..2000 {
        tree.insert(TestNode::new(key, key));
        assert!(tree.height() <= max_height(tree.len()), "len {}", tree.len());
    }

    tree.assert_invariants();

    for key in (0..2000).step_by(2) {
        tree.remove(&key);
        assert!(tree.height() <= max_height(tree.len()), "len {}", tree.len());
    }

    tree.assert_invariants();
}

#[test]
fn iter_from_both_ends() {
    let tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6]);

    let forward: Vec<u32> = tree.iter().map(|node| node.key).collect();
    assert_eq!(forward, (1..=9).collect::<Vec<_>>());

    let backward: Vec<u32> = tree.iter().rev().map(|node| node.key).collect();
    assert_eq!(backward, (1..=9).rev().collect::<Vec<_>>());

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 9);
    assert_eq!(iter.next().map(|n| n.key), Some(1));
    assert_eq!(iter.next_back().map(|n| n.key), Some(9));
    assert_eq!(iter.len(), 7);

    let middle: Vec<u32> = iter.map(|node| node.key).collect();
    assert_eq!(middle, [2, 3, 4, 5, 6, 7, 8]);

    let empty: AvlTree<TestNode> = AvlTree::new();
    assert_eq!(empty.iter().next().map(|n| n.key), None);
}

#[test]
fn first_last_and_pop() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4]);

    assert_eq!(tree.first().map(|n| n.key), Some(1));
    assert_eq!(tree.last().map(|n| n.key), Some(8));

    let mut drained = Vec::new();
    while let Some(node) = tree.pop_first() {
        drained.push(node.key);
        tree.assert_invariants();

        if let Some(node) = tree.pop_last() {
            drained.push(node.key);
            tree.assert_invariants();
        }
    }

    assert_eq!(drained, [1, 8, 3, 5, 4]);
    assert!(tree.first().is_none());
    assert!(tree.last().is_none());
}

#[test]
fn clear_then_reuse() {
    let keys: Vec<u32> = (0..100).rev().collect();
    let mut tree = tree_of(&keys);

    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert!(tree.iter().next().is_none());

    tree.insert(TestNode::new(1, 1));
    tree.assert_invariants();
    assert_eq!(tree.len(), 1);
}

#[test]
fn dotgraph_labels_balances() {
    let tree = tree_of(&[2, 1, 3, 4]);
    let graph = shape(&tree);

    assert!(graph.contains("[label=\"2:1\"]"), "{graph}");
    assert!(graph.contains("[label=\"3:1\"]"), "{graph}");
    assert!(graph.contains("[label=\"4:0\"]"), "{graph}");
    assert!(graph.contains("\"graphshape-3\" -> \"graphshape-4\";"), "{graph}");

    let empty: AvlTree<TestNode> = AvlTree::new();
    assert_eq!(shape(&empty), "digraph \"graph-shape\" {}");
}

#[test]
fn leaf_depths_in_order() {
    use crate::equal_paths::BinaryNode;

    let tree = BinaryNode::new(
        1,
        Some(BinaryNode::leaf(2)),
        Some(BinaryNode::new(3, Some(BinaryNode::leaf(4)), None)),
    );
    assert_eq!(model::leaf_depths(Some(&tree)), [1, 2]);
    assert!(model::leaf_depths::<u32>(None).is_empty());
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

fn shuffled_keys(len: u32) -> impl Strategy<Value = Vec<u32>> {
    Just((0..len).collect::<Vec<u32>>()).prop_shuffle()
}

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn map_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_map_equivalence(ops);
    }

    #[test]
    fn equal_paths_equivalence(shape in proptest::option::of(model::shape_strategy())) {
        model::run_equal_paths_equivalence(shape);
    }

    #[test]
    fn insert_then_remove_all(inserts in shuffled_keys(200), removes in shuffled_keys(200)) {
        let mut tree: AvlTree<TestNode> = AvlTree::new();

        for &key in &inserts {
            tree.insert(TestNode::new(key, key));
            tree.assert_invariants();
        }

        for key in &removes {
            prop_assert!(tree.remove(key).is_some());
            tree.assert_invariants();
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.root, None);
    }
}
