use core::iter::FusedIterator;

use crate::{AvlTree, Dir, Link, Links, TreeNode};

/// An in-order iterator over the elements of an [`AvlTree`].
///
/// Created by [`AvlTree::iter`].
pub struct Iter<'tree, T: TreeNode<Links<T>> + ?Sized> {
    tree: &'tree AvlTree<T>,

    front: Link<T>,
    back: Link<T>,

    // Elements not yet yielded from either end. Once this reaches zero `front` and `back` may have
    // crossed, so they must not be followed.
    len: usize,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iter<'tree, T> {
    pub(crate) fn new(tree: &'tree AvlTree<T>) -> Self {
        let (front, back) = match tree.root {
            Some(root) => unsafe {
                (
                    Some(tree.extreme_in_subtree(root, Dir::Left)),
                    Some(tree.extreme_in_subtree(root, Dir::Right)),
                )
            },
            None => (None, None),
        };

        Iter {
            tree,
            front,
            back,
            len: tree.len(),
        }
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for Iter<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.front?;
        self.len -= 1;

        unsafe {
            self.front = self.tree.successor_raw(cur);
            Some(cur.as_ref())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> DoubleEndedIterator for Iter<'tree, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.back?;
        self.len -= 1;

        unsafe {
            self.back = self.tree.predecessor_raw(cur);
            Some(cur.as_ref())
        }
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> ExactSizeIterator for Iter<'tree, T> {}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> FusedIterator for Iter<'tree, T> {}
