extern crate std;

use std::{collections::BTreeMap, prelude::v1::*, ptr::NonNull};

use arbitrary::Arbitrary;
use cordyceps::Linked;
use proptest::strategy::{Just, Strategy};

use crate::{
    equal_paths::{equal_paths, BinaryNode},
    AvlMap, AvlTree, KeyError, Links, TreeNode,
};

#[derive(Debug)]
#[repr(C)]
pub struct TestNode {
    pub links: Links<TestNode>,
    pub key: u32,
    pub value: u32,
}

impl TestNode {
    pub fn new(key: u32, value: u32) -> Box<TestNode> {
        Box::new(TestNode {
            links: Links::new(),
            key,
            value,
        })
    }
}

unsafe impl Linked<Links<TestNode>> for TestNode {
    type Handle = Box<TestNode>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        NonNull::new(Box::into_raw(r)).unwrap()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<TestNode>> {
        // SAFETY: Self is #[repr(C)] and `links` is first field
        ptr.cast()
    }
}

impl TreeNode<Links<TestNode>> for TestNode {
    type Key = u32;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

/// Returns the greatest height an AVL tree with `len` nodes can have.
///
/// The sparsest AVL tree of height `h` has `n(h) = n(h - 1) + n(h - 2) + 1` nodes.
pub fn max_height(len: usize) -> usize {
    let (mut sparse_prev, mut sparse) = (0usize, 1usize);
    let mut height = 0;

    while sparse <= len {
        height += 1;
        (sparse_prev, sparse) = (sparse, sparse + sparse_prev + 1);
    }

    height
}

/// A key chosen either among the keys already present or at random.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum KeyChoice {
    Existing(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn existing_strategy()(
        index in 0usize..1000,
    ) -> KeyChoice {
        KeyChoice::Existing(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> KeyChoice {
        KeyChoice::Random(random)
    }
}

fn key_strategy() -> impl Strategy<Value = KeyChoice> {
    proptest::prop_oneof![existing_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(KeyChoice, u32),
    Get(KeyChoice),
    At(KeyChoice),
    Remove(KeyChoice),
    First,
    PopFirst,
    Last,
    PopLast,
}

impl Op {
    fn finalize(self, model: &BTreeMap<u32, u32>) -> FinalOp {
        fn get_key(model: &BTreeMap<u32, u32>, choice: KeyChoice) -> u32 {
            match choice {
                KeyChoice::Existing(idx) => match model.len() {
                    0 => idx as u32,
                    len => model.keys().nth(idx % len).copied().unwrap_or(idx as u32),
                },
                KeyChoice::Random(key) => key,
            }
        }

        match self {
            Op::Insert(key, value) => FinalOp::Insert(get_key(model, key), value),
            Op::Get(key) => FinalOp::Get(get_key(model, key)),
            Op::At(key) => FinalOp::At(get_key(model, key)),
            Op::Remove(key) => FinalOp::Remove(get_key(model, key)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32, u32),
    Get(u32),
    At(u32),
    Remove(u32),
    First,
    PopFirst,
    Last,
    PopLast,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        (key_strategy(), 0u32..1000).prop_map(|(key, value)| Op::Insert(key, value)),
        key_strategy().prop_map(Op::Get),
        key_strategy().prop_map(Op::At),
        key_strategy().prop_map(Op::Remove),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
    ]
}

fn entry((key, value): (&u32, &u32)) -> (u32, u32) {
    (*key, *value)
}

#[inline]
#[allow(clippy::boxed_local)]
fn node_entry(node: Box<TestNode>) -> (u32, u32) {
    (node.key, node.value)
}

#[inline]
fn ref_entry(node: &TestNode) -> (u32, u32) {
    (node.key, node.value)
}

/// Runs `ops` against an intrusive [`AvlTree`] and a `BTreeMap`, checking that both agree and that
/// the tree stays balanced after every operation.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree = BTreeMap::new();
    let mut avl: AvlTree<TestNode> = AvlTree::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&btree);

        match final_op {
            FinalOp::Insert(key, value) => {
                let from_btree = btree.insert(key, value).map(|old| (key, old));
                let from_avl = avl.insert(TestNode::new(key, value)).map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            // Intrusive trees have no strict accessor, so `At` is a plain lookup here.
            FinalOp::Get(key) | FinalOp::At(key) => {
                let from_btree = btree.get_key_value(&key).map(entry);
                let from_avl = avl.get(&key).map(|node| ref_entry(node.get_ref()));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                let from_btree = btree.remove(&key).map(|value| (key, value));
                let from_avl = avl.remove(&key).map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value().map(entry);
                let from_avl = avl.first().map(|node| ref_entry(node.get_ref()));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first().map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value().map(entry);
                let from_avl = avl.last().map(|node| ref_entry(node.get_ref()));

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last().map(node_entry);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(avl.height() <= max_height(avl.len()));
        assert!(btree.iter().map(entry).eq(avl.iter().map(ref_entry)));
    }
}

/// Runs `ops` against an [`AvlMap`] and a `BTreeMap`, checking that both agree and that the map
/// stays balanced after every operation.
pub fn run_map_equivalence(ops: Vec<Op>) {
    let mut btree = BTreeMap::new();
    let mut map = AvlMap::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let final_op = op.finalize(&btree);

        match final_op {
            FinalOp::Insert(key, value) => {
                let from_btree = btree.insert(key, value);
                let from_map = map.insert(key, value);

                assert_eq!(from_btree, from_map, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                assert_eq!(btree.get(&key), map.get(&key), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::At(key) => {
                let from_btree = btree.get(&key).ok_or(KeyError);
                let from_map = map.at(&key);

                assert_eq!(from_btree, from_map, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                let from_btree = btree.remove(&key);
                let from_map = map.remove(&key);

                assert_eq!(from_btree, from_map, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value();
                let from_map = map.first_key_value();

                assert_eq!(from_btree, from_map, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                assert_eq!(btree.pop_first(), map.pop_first(), "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value();
                let from_map = map.last_key_value();

                assert_eq!(from_btree, from_map, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                assert_eq!(btree.pop_last(), map.pop_last(), "FinalOp #{op_id}: {final_op:?}");
            }
        }

        map.assert_invariants();
        assert_eq!(btree.len(), map.len());
        assert!(map.height() <= max_height(map.len()));
        assert!(btree.iter().eq(map.iter()));
    }
}

/// The shape of a plain binary tree, without values.
#[derive(Clone, Debug, Arbitrary)]
pub struct Shape {
    pub left: Option<Box<Shape>>,
    pub right: Option<Box<Shape>>,
}

impl Shape {
    /// Builds a tree of this shape, numbering nodes in pre-order starting at `*next`.
    pub fn build(&self, next: &mut u32) -> BinaryNode<u32> {
        let value = *next;
        *next += 1;

        let left = self.left.as_ref().map(|left| left.build(next));
        let right = self.right.as_ref().map(|right| right.build(next));

        BinaryNode::new(value, left, right)
    }
}

pub fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = Just(Shape {
        left: None,
        right: None,
    });

    leaf.prop_recursive(8, 256, 2, |inner| {
        (
            proptest::option::of(inner.clone()),
            proptest::option::of(inner),
        )
            .prop_map(|(left, right)| Shape {
                left: left.map(Box::new),
                right: right.map(Box::new),
            })
    })
}

/// Returns the depth of every leaf under `root`, from left to right.
pub fn leaf_depths<T>(root: Option<&BinaryNode<T>>) -> Vec<usize> {
    fn walk<T>(node: &BinaryNode<T>, depth: usize, out: &mut Vec<usize>) {
        if node.is_leaf() {
            out.push(depth);
        }

        for child in [node.left.as_deref(), node.right.as_deref()]
            .into_iter()
            .flatten()
        {
            walk(child, depth + 1, out);
        }
    }

    let mut depths = Vec::new();
    if let Some(root) = root {
        walk(root, 0, &mut depths);
    }

    depths
}

/// Checks [`equal_paths`] on a tree of the given shape against the depths of all of its leaves.
pub fn run_equal_paths_equivalence(shape: Option<Shape>) {
    let tree = shape.map(|shape| shape.build(&mut 0));

    let depths = leaf_depths(tree.as_ref());
    let expected = depths.windows(2).all(|pair| pair[0] == pair[1]);

    assert_eq!(
        equal_paths(tree.as_ref()),
        expected,
        "leaf depths: {depths:?}"
    );
}
