//! An intrusive AVL tree.

// Conventions used in comments:
// - The height of an empty subtree is 0; a leaf has height 1.
// - The balance of a node `x` is `h(right(x)) - h(left(x))`.
// - A node is `dir`-heavy if its `dir` subtree is the taller one.
//
// The fundamental invariant of an AVL tree is that every balance is -1, 0 or 1 once an operation
// returns. Balances of ±2 exist only while a fix-up is in progress.
//
// After an insertion, the fix-up climbs while subtrees grow and performs at most one rebalancing
// event (a single or double rotation), which restores the height the subtree had before the
// insertion.
//
// After a removal, the fix-up climbs while subtrees shrink. A rotation there may itself shrink the
// subtree, so the fix-up can rebalance once per level on its way to the root.

use core::{
    borrow::Borrow, cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not,
    pin::Pin,
    ptr::{self, NonNull},
};

use cordyceps::Linked;
use log::{debug, trace, warn};

#[cfg(feature = "std")]
mod debug;
#[cfg(feature = "alloc")]
pub mod equal_paths;
mod error;
mod iter;
#[cfg(feature = "alloc")]
pub mod map;
#[cfg(any(all(test, feature = "std"), feature = "model"))]
pub mod model;
#[cfg(all(test, feature = "std"))]
mod tests;

pub use error::KeyError;
pub use iter::Iter;
#[cfg(feature = "alloc")]
pub use map::AvlMap;

pub trait TreeNode<L>: Linked<L> {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// Each node stores its balance factor in its [`Links`], so rebalancing never needs to measure
/// subtree heights. Insertion, removal and lookup complete in _O(log(n))_ time.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

/// The links embedded in every node of an [`AvlTree`].
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    // The change in a parent's balance when the subtree on this side grows by one level.
    #[inline]
    fn weight(self) -> i8 {
        match self {
            Dir::Left => -1,
            Dir::Right => 1,
        }
    }
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    balance: i8,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

#[inline]
unsafe fn links<'a, T>(node: NonNull<T>) -> &'a Links<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe { T::links(node).as_ref() }
}

#[inline]
unsafe fn links_mut<'a, T>(node: NonNull<T>) -> &'a mut Links<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    unsafe { T::links(node).as_mut() }
}

// Compares node addresses only, ignoring any pointer metadata.
#[inline]
fn same_node<T: ?Sized>(a: NonNull<T>, b: NonNull<T>) -> bool {
    ptr::addr_eq(a.as_ptr(), b.as_ptr())
}

#[inline]
fn is_link_to<T: ?Sized>(link: Link<T>, node: NonNull<T>) -> bool {
    link.is_some_and(|n| same_node(n, node))
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    ///
    /// Balance factors point at the taller subtree, so this completes in _O(log(n))_ time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            height += 1;

            let cur_links = unsafe { links(cur) };
            opt_cur = if cur_links.balance() > 0 {
                cur_links.right()
            } else {
                cur_links.left()
            };
        }

        height
    }

    /// Returns an iterator over the elements of the tree, in ascending key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a reference to the node corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the node corresponding to `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.get_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns `true` if the tree contains a node corresponding to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_raw(key).is_some()
    }

    fn get_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;

            unsafe {
                match key.cmp(cur.as_ref().key().borrow()) {
                    Ordering::Less => opt_cur = links(cur).left(),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => opt_cur = links(cur).right(),
                }
            }
        }
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        let first = unsafe { self.extreme_in_subtree(self.root?, Dir::Left) };
        unsafe { Some(Pin::new_unchecked(first.as_ref())) }
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        let last = unsafe { self.extreme_in_subtree(self.root?, Dir::Right) };
        unsafe { Some(Pin::new_unchecked(last.as_ref())) }
    }

    // Returns the node reached by following `dir` links from `root` as far as possible.
    #[inline]
    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(child) = unsafe { links(cur).child(dir) } {
            cur = child;
        }

        cur
    }

    // Returns the in-order neighbor of `node` in direction `dir`.
    //
    // `Dir::Left` yields the predecessor and `Dir::Right` the successor.
    unsafe fn neighbor_raw(&self, node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = links(node).child(dir) {
                return Some(self.extreme_in_subtree(child, !dir));
            }

            // Ascend until `cur` is a `!dir` child; its parent is the neighbor.
            let mut cur = node;
            while let Some(parent) = links(cur).parent() {
                if is_link_to(links(parent).child(!dir), cur) {
                    return Some(parent);
                }

                cur = parent;
            }

            None
        }
    }

    #[inline]
    unsafe fn predecessor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Left) }
    }

    #[inline]
    unsafe fn successor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Right) }
    }

    unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { links_mut(node).set_parent(parent) };
    }

    #[inline]
    unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent`.
    #[inline]
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            let dir = self.which_child(parent, old_child);
            debug_assert!(
                is_link_to(links(parent).child(dir), old_child),
                "`old_child` must be a child of `parent`"
            );

            links_mut(parent).set_child(dir, new_child);
        }
    }

    #[inline]
    unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if is_link_to(unsafe { links(parent).left() }, child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    // Links `node` into a position described by its parent, its side under that parent, its
    // children and its balance. Every neighbor's link back to `node` is updated as well.
    unsafe fn place(
        &mut self,
        node: NonNull<T>,
        parent: Link<T>,
        dir: Option<Dir>,
        children: [Link<T>; 2],
        balance: i8,
    ) {
        unsafe {
            let node_links = links_mut(node);
            node_links.set_parent(parent);
            node_links.set_left(children[0]);
            node_links.set_right(children[1]);
            node_links.set_balance(balance);

            for child in children {
                self.maybe_set_parent(child, Some(node));
            }

            match (parent, dir) {
                (Some(parent), Some(dir)) => {
                    links_mut(parent).set_child(dir, Some(node));
                }
                _ => self.root = Some(node),
            }
        }
    }

    // Exchanges the tree positions of `a` and `b`, balance factors included.
    //
    // Both nodes keep their identity, so outstanding pointers to either stay valid. `a` and `b`
    // may be parent and child.
    unsafe fn swap_nodes(&mut self, a: NonNull<T>, b: NonNull<T>) {
        if same_node(a, b) {
            return;
        }

        // Links between `a` and `b` must point at the other node after the swap.
        let swapped = |link: Link<T>| match link {
            Some(n) if same_node(n, a) => Some(b),
            Some(n) if same_node(n, b) => Some(a),
            other => other,
        };

        unsafe {
            let a_parent = links(a).parent();
            let b_parent = links(b).parent();
            let a_dir = a_parent.map(|p| self.which_child(p, a));
            let b_dir = b_parent.map(|p| self.which_child(p, b));
            let a_children = [links(a).left(), links(a).right()];
            let b_children = [links(b).left(), links(b).right()];
            let a_balance = links(a).balance();
            let b_balance = links(b).balance();

            self.place(a, swapped(b_parent), b_dir, b_children.map(swapped), b_balance);
            self.place(b, swapped(a_parent), a_dir, a_children.map(swapped), a_balance);
        }
    }

    // Rotates the subtree rooted at `node` toward `dir`, lifting its `!dir` child (the pivot) into
    // its place.
    //
    // - `node` becomes the `dir` child of the pivot.
    // - The pivot's `dir` child moves across to become the `!dir` child of `node`.
    //
    // Balances of the affected nodes are not updated.
    fn rotate(&mut self, node: NonNull<T>, dir: Dir) {
        unsafe {
            let Some(pivot) = links(node).child(!dir) else {
                warn!("rotation toward {dir:?} skipped: no {:?} child to lift", !dir);
                return;
            };

            trace!("rotating toward {dir:?}");

            let across = links(pivot).child(dir);
            links_mut(node).set_child(!dir, across);
            self.maybe_set_parent(across, Some(node));

            let parent = links_mut(node).set_parent(Some(pivot));
            links_mut(pivot).set_parent(parent);
            links_mut(pivot).set_child(dir, Some(node));
            self.replace_child_or_set_root(parent, node, Some(pivot));
        }
    }

    /// Inserts an item into the tree.
    ///
    /// If the tree already holds an item with an equal key, `item` takes over its position and
    /// balance without restructuring the tree, and the previous item is returned.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
        let ptr = T::into_ptr(item);

        let Some(root) = self.root else {
            unsafe { self.insert_as_root(ptr) };
            return None;
        };

        let mut cur = root;

        // Descend the tree, looking for an empty slot.
        loop {
            let ordering = unsafe { ptr.as_ref().key().cmp(cur.as_ref().key()) };

            let dir = match ordering {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Some(unsafe { self.replace_at(cur, ptr) }),
                Ordering::Greater => Dir::Right,
            };

            match unsafe { links(cur).child(dir) } {
                Some(child) => cur = child,
                None => {
                    unsafe { self.insert_as_child(cur, dir, ptr) };
                    return None;
                }
            }
        }
    }

    unsafe fn insert_as_root(&mut self, ptr: NonNull<T>) {
        debug_assert!(self.root.is_none());

        unsafe { links_mut(ptr).clear() };
        self.root = Some(ptr);
        self.len += 1;
    }

    unsafe fn insert_as_child(&mut self, parent: NonNull<T>, dir: Dir, ptr: NonNull<T>) {
        unsafe {
            let ptr_links = links_mut(ptr);
            ptr_links.clear();
            ptr_links.set_parent(Some(parent));

            let parent_links = links_mut(parent);
            debug_assert!(parent_links.child(dir).is_none());
            parent_links.set_child(dir, Some(ptr));
            self.len += 1;

            if parent_links.balance() != 0 {
                // `ptr` filled the parent's shorter side, so the parent's height is unchanged.
                parent_links.set_balance(0);
            } else {
                parent_links.set_balance(dir.weight());
                self.insert_fix(parent, ptr);
            }
        }
    }

    // Puts `new` in the position of `old`, returning `old`. The shape of the tree and every
    // balance are unchanged.
    unsafe fn replace_at(&mut self, old: NonNull<T>, new: NonNull<T>) -> T::Handle {
        unsafe {
            let parent = links(old).parent();
            let dir = parent.map(|p| self.which_child(p, old));
            let children = [links(old).left(), links(old).right()];
            let balance = links(old).balance();

            self.place(new, parent, dir, children, balance);
            links_mut(old).clear();

            T::from_ptr(old)
        }
    }

    // Restores balance after the subtree rooted at `parent` grew by one level through its child
    // `node`. `parent`'s own balance is already up to date.
    fn insert_fix(&mut self, mut parent: NonNull<T>, mut node: NonNull<T>) {
        unsafe {
            while let Some(grandparent) = links(parent).parent() {
                let dir = self.which_child(grandparent, parent);
                let gp_links = links_mut(grandparent);
                gp_links.update_balance(dir.weight());

                match gp_links.balance() {
                    // The shorter side caught up; the height is unchanged.
                    0 => return,
                    // The grandparent grew as well.
                    -1 | 1 => (parent, node) = (grandparent, parent),
                    _ => {
                        self.rebalance_inserted(grandparent, parent, node, dir);
                        return;
                    }
                }
            }
        }
    }

    // Resolves a balance of ±2 at `grandparent`, whose `dir` child `parent` grew through `node`.
    //
    // The rotated subtree regains the height it had before the insertion, so no further fix-up is
    // needed.
    unsafe fn rebalance_inserted(
        &mut self,
        grandparent: NonNull<T>,
        parent: NonNull<T>,
        node: NonNull<T>,
        dir: Dir,
    ) {
        unsafe {
            if self.which_child(parent, node) == dir {
                debug!("insert: single rotation toward {:?}", !dir);

                self.rotate(grandparent, !dir);
                links_mut(parent).set_balance(0);
                links_mut(grandparent).set_balance(0);
                return;
            }

            debug!("insert: double rotation toward {:?}", !dir);

            // `node` is the middle key of the three and ends up on top.
            let weight = dir.weight();
            let (parent_balance, grandparent_balance) = match links(node).balance() {
                b if b == weight => (0, -weight),
                0 => (0, 0),
                _ => (weight, 0),
            };

            self.rotate(parent, dir);
            self.rotate(grandparent, !dir);

            links_mut(parent).set_balance(parent_balance);
            links_mut(grandparent).set_balance(grandparent_balance);
            links_mut(node).set_balance(0);
        }
    }

    /// Removes the item corresponding to `key` from the tree and returns it.
    ///
    /// Returns `None`, leaving the tree untouched, if no item corresponds to `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.get_raw(key)?;
        Some(unsafe { self.remove_at(node) })
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = unsafe { self.extreme_in_subtree(self.root?, Dir::Left) };
        Some(unsafe { self.remove_at(first) })
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = unsafe { self.extreme_in_subtree(self.root?, Dir::Right) };
        Some(unsafe { self.remove_at(last) })
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe {
            // A node with two children first trades places with its predecessor, which has no
            // right child. Either way `node` ends up with at most one child.
            if let (Some(left), Some(_)) = (links(node).left(), links(node).right()) {
                let predecessor = self.extreme_in_subtree(left, Dir::Right);
                self.swap_nodes(node, predecessor);
            }

            let parent = links(node).parent();
            let child = links(node).left().or(links(node).right());

            // The side of `parent` that lost height, as a change in its balance.
            let diff = parent
                .map(|p| -self.which_child(p, node).weight())
                .unwrap_or(0);

            self.maybe_set_parent(child, parent);
            self.replace_child_or_set_root(parent, node, child);

            links_mut(node).clear();
            self.len -= 1;

            if let Some(parent) = parent {
                self.remove_fix(parent, diff);
            }

            T::from_ptr(node)
        }
    }

    // Restores balance after one side of `node` lost a level, `diff` being the resulting change in
    // its balance.
    unsafe fn remove_fix(&mut self, node: NonNull<T>, diff: i8) {
        let mut opt_node = Some(node);
        let mut diff = diff;

        unsafe {
            while let Some(node) = opt_node {
                links_mut(node).update_balance(diff);

                // Taken before any rotation moves `node` down.
                let parent = links(node).parent();
                let next_diff = parent
                    .map(|p| -self.which_child(p, node).weight())
                    .unwrap_or(0);

                match links(node).balance() {
                    // The taller side shrank, and so did `node`'s subtree.
                    0 => {}
                    // The height is unchanged.
                    -1 | 1 => return,
                    balance => {
                        let heavy = if balance > 0 { Dir::Right } else { Dir::Left };

                        if !self.rebalance_removed(node, heavy) {
                            return;
                        }
                    }
                }

                opt_node = parent;
                diff = next_diff;
            }
        }
    }

    // Resolves a balance of ±2 at `node`, whose `heavy` side is two levels taller than the other.
    //
    // Returns `true` if the rotated subtree ended up shorter than before the removal, in which case
    // the fix-up must continue at the parent.
    unsafe fn rebalance_removed(&mut self, node: NonNull<T>, heavy: Dir) -> bool {
        unsafe {
            let Some(child) = links(node).child(heavy) else {
                warn!("remove: node is {heavy:?}-heavy without a {heavy:?} child");
                return false;
            };

            let weight = heavy.weight();
            let child_balance = links(child).balance();

            if child_balance != -weight {
                self.rotate(node, !heavy);

                if child_balance == 0 {
                    debug!("remove: single rotation toward {:?}, height kept", !heavy);

                    links_mut(node).set_balance(weight);
                    links_mut(child).set_balance(-weight);
                    return false;
                }

                debug!("remove: single rotation toward {:?}, height lost", !heavy);

                links_mut(node).set_balance(0);
                links_mut(child).set_balance(0);
                return true;
            }

            let Some(grandchild) = links(child).child(!heavy) else {
                warn!("remove: child leans {:?} without a {:?} child", !heavy, !heavy);
                return false;
            };

            debug!("remove: double rotation toward {:?}", !heavy);

            let (node_balance, child_balance) = match links(grandchild).balance() {
                b if b == weight => (-weight, 0),
                0 => (0, 0),
                _ => (0, weight),
            };

            self.rotate(child, heavy);
            self.rotate(node, !heavy);

            links_mut(node).set_balance(node_balance);
            links_mut(child).set_balance(child_balance);
            links_mut(grandchild).set_balance(0);

            true
        }
    }

    /// Clears the tree, removing all elements.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root.take();

        // Descend to a leaf, detach and drop it, then resume at its parent.
        while let Some(cur) = opt_cur {
            unsafe {
                let cur_links = links(cur);

                if let Some(child) = cur_links.left().or(cur_links.right()) {
                    opt_cur = Some(child);
                    continue;
                }

                let parent = cur_links.parent();
                if let Some(parent) = parent {
                    let dir = self.which_child(parent, cur);
                    links_mut(parent).set_child(dir, None);
                }

                links_mut(cur).clear();
                drop(T::from_ptr(cur));
                self.len -= 1;

                opt_cur = parent;
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
    T::Key: fmt::Debug,
{
    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        let mut count = 0;

        if let Some(root) = self.root {
            unsafe {
                assert!(links(root).parent().is_none(), "root has a parent");
                self.assert_invariants_at(root, None, None, &mut count);
            }
        }

        assert_eq!(count, self.len, "length does not match the number of nodes");
    }

    // Checks the subtree rooted at `node` and returns its height. All of its keys must lie strictly
    // between `lower` and `upper`.
    #[allow(clippy::only_used_in_recursion)]
    unsafe fn assert_invariants_at<'a>(
        &self,
        node: NonNull<T>,
        lower: Option<&'a T::Key>,
        upper: Option<&'a T::Key>,
        count: &mut usize,
    ) -> i32
    where
        T: 'a,
    {
        unsafe {
            *count += 1;

            let key: &'a T::Key = node.as_ref().key();
            if let Some(lower) = lower {
                assert!(lower < key, "{key:?} is out of order with {lower:?}");
            }
            if let Some(upper) = upper {
                assert!(key < upper, "{key:?} is out of order with {upper:?}");
            }

            let mut heights = [0; 2];

            for dir in [Dir::Left, Dir::Right] {
                if let Some(child) = links(node).child(dir) {
                    let parent = links(child)
                        .parent()
                        .expect("child parent pointer not set");
                    assert!(same_node(node, parent), "child parent pointer is stale");

                    let (lower, upper) = match dir {
                        Dir::Left => (lower, Some(key)),
                        Dir::Right => (Some(key), upper),
                    };

                    heights[dir as usize] = self.assert_invariants_at(child, lower, upper, count);
                }
            }

            let balance = heights[Dir::Right as usize] - heights[Dir::Left as usize];
            assert_eq!(
                i32::from(links(node).balance()),
                balance,
                "stale balance at {key:?}"
            );
            assert!(balance.abs() <= 1, "{key:?} is out of balance: {balance}");

            1 + heights[0].max(heights[1])
        }
    }
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'tree, T> IntoIterator for &'tree AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                balance: 0,
                _unpin: PhantomPinned,
            }),
        }
    }

    /// Returns the balance factor of the node, `height(right) - height(left)`.
    #[inline]
    pub fn balance(&self) -> i8 {
        unsafe { (*self.inner.get()).balance }
    }

    #[inline]
    fn set_balance(&mut self, balance: i8) {
        self.inner.get_mut().balance = balance;
    }

    #[inline]
    fn update_balance(&mut self, diff: i8) {
        let inner = self.inner.get_mut();
        inner.balance += diff;
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<T>) -> Link<T> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<T>) -> Link<T> {
        self.set_child(Dir::Right, right)
    }

    // Resets the links of a node leaving the tree.
    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.balance = 0;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("balance", &self.balance())
            .finish()
    }
}
