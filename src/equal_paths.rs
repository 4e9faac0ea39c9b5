//! Leaf depth checks for plain binary trees.
//!
//! These trees own their children directly and carry no balance information; they are unrelated
//! to [`AvlTree`](crate::AvlTree).

extern crate alloc;

use alloc::{boxed::Box, vec, vec::Vec};

/// A node of a plain, owned binary tree.
///
/// Dropping a tree takes constant stack space whatever its depth.
#[derive(Debug)]
pub struct BinaryNode<T> {
    pub value: T,
    pub left: Option<Box<BinaryNode<T>>>,
    pub right: Option<Box<BinaryNode<T>>>,
}

impl<T> BinaryNode<T> {
    /// Returns a node with no children.
    pub fn leaf(value: T) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }

    /// Returns a node with the given subtrees.
    pub fn new(value: T, left: Option<BinaryNode<T>>, right: Option<BinaryNode<T>>) -> Self {
        Self {
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

impl<T> Drop for BinaryNode<T> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<BinaryNode<T>>> = Vec::new();
        stack.extend(self.left.take());
        stack.extend(self.right.take());

        // Each node is detached from its children before it drops.
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

/// Returns `true` if every leaf of the tree rooted at `root` lies at the same depth.
///
/// An empty tree trivially qualifies. Only childless nodes count as leaves: a node with a single
/// child constrains nothing by itself.
///
/// The tree is walked depth-first once. The depth of the first leaf found becomes the target, and
/// the walk stops at the first leaf that misses it.
pub fn equal_paths<T>(root: Option<&BinaryNode<T>>) -> bool {
    let Some(root) = root else {
        return true;
    };

    let mut leaf_depth = None;
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if node.is_leaf() {
            match leaf_depth {
                None => leaf_depth = Some(depth),
                Some(target) if target != depth => return false,
                Some(_) => {}
            }

            continue;
        }

        // Pushed right first so the left subtree is walked first.
        for child in [node.right.as_deref(), node.left.as_deref()]
            .into_iter()
            .flatten()
        {
            stack.push((child, depth + 1));
        }
    }

    true
}
