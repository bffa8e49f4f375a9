use alloc::{boxed::Box, vec, vec::Vec};
use core::{
    borrow::Borrow, cell::UnsafeCell, cmp::Ordering, fmt, marker::PhantomPinned, mem, ops::Not,
    ptr::NonNull,
};

use cordyceps::Linked;

pub(crate) type Link<K> = Option<NonNull<Node<K>>>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left = 0,
    Right = 1,
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

/// A single tree vertex.
///
/// Nodes are allocated as `Box<Node<K>>` and handed to the tree through
/// [`Linked::into_ptr`]; the tree owns them through its child links until they
/// are unlinked and turned back into a box by [`Linked::from_ptr`].
pub(crate) struct Node<K> {
    links: Links<K>,
    key: K,
}

pub(crate) struct Links<K> {
    inner: UnsafeCell<LinksInner<K>>,
}

#[repr(C)]
struct LinksInner<K> {
    parent: Link<K>,
    children: [Link<K>; 2],
    height: usize,
    _unpin: PhantomPinned,
}

/// The outcome of unlinking a node from its neighbourhood.
pub(crate) struct Removed<K> {
    /// The node now sitting where the removed node was, as seen from its parent.
    pub(crate) replacement: Link<K>,

    /// The unlinked node. It holds the key that was removed.
    pub(crate) node: Box<Node<K>>,

    /// The lowest node whose height may have changed.
    pub(crate) stale: Link<K>,
}

unsafe impl<K> Linked<Links<K>> for Node<K> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<K>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<K> Node<K> {
    /// Returns a new detached leaf holding `key`.
    pub(crate) fn new(key: K) -> Box<Self> {
        Box::new(Node {
            links: Links::new(),
            key,
        })
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn into_key(self: Box<Self>) -> K {
        self.key
    }

    #[cfg(test)]
    pub(crate) unsafe fn set_key(node: NonNull<Self>, key: K) -> K {
        unsafe { mem::replace(&mut (*node.as_ptr()).key, key) }
    }

    /// Returns the cached height of the subtree at `node`, or 0 if there is none.
    #[inline]
    pub(crate) unsafe fn height(node: Link<K>) -> usize {
        node.map(|n| unsafe { Self::links(n).as_ref().height() })
            .unwrap_or(0)
    }

    /// Returns `height(right) - height(left)` for `node`.
    pub(crate) unsafe fn balance_factor(node: NonNull<Self>) -> isize {
        unsafe {
            let links = Self::links(node).as_ref();
            Self::height(links.right()) as isize - Self::height(links.left()) as isize
        }
    }

    #[inline]
    pub(crate) unsafe fn parent(node: NonNull<Self>) -> Link<K> {
        unsafe { Self::links(node).as_ref().parent() }
    }

    #[inline]
    pub(crate) unsafe fn child(node: NonNull<Self>, dir: Dir) -> Link<K> {
        unsafe { Self::links(node).as_ref().child(dir) }
    }

    #[inline]
    pub(crate) unsafe fn left(node: NonNull<Self>) -> Link<K> {
        unsafe { Self::child(node, Dir::Left) }
    }

    #[inline]
    pub(crate) unsafe fn right(node: NonNull<Self>) -> Link<K> {
        unsafe { Self::child(node, Dir::Right) }
    }

    /// Returns the side of `parent` that `child` hangs from.
    pub(crate) unsafe fn which_child(parent: NonNull<Self>, child: NonNull<Self>) -> Dir {
        if unsafe { Self::left(parent) } == Some(child) {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    /// Follows parent links up from `node` to the topmost node.
    pub(crate) unsafe fn topmost(mut node: NonNull<Self>) -> NonNull<Self> {
        while let Some(parent) = unsafe { Self::parent(node) } {
            node = parent;
        }

        node
    }

    /// Returns the minimum node in the subtree at `node`.
    pub(crate) unsafe fn min(node: NonNull<Self>) -> NonNull<Self> {
        unsafe { Self::descend(node, Dir::Left) }
    }

    /// Returns the maximum node in the subtree at `node`.
    pub(crate) unsafe fn max(node: NonNull<Self>) -> NonNull<Self> {
        unsafe { Self::descend(node, Dir::Right) }
    }

    unsafe fn descend(mut node: NonNull<Self>, dir: Dir) -> NonNull<Self> {
        while let Some(child) = unsafe { Self::child(node, dir) } {
            node = child;
        }

        node
    }

    /// Finds a node holding `key` in the subtree at `root`.
    ///
    /// When the key is stored more than once, the match closest to `root` is
    /// returned.
    pub(crate) unsafe fn search<Q>(root: NonNull<Self>, key: &Q) -> Link<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cur = root;

        loop {
            let next = unsafe {
                match key.cmp(cur.as_ref().key.borrow()) {
                    Ordering::Less => Self::left(cur),
                    Ordering::Equal => return Some(cur),
                    Ordering::Greater => Self::right(cur),
                }
            };

            cur = next?;
        }
    }

    /// Links the detached leaf `node` into the subtree at `root` and returns
    /// its new parent.
    ///
    /// Keys strictly less than a node's key go left; equal keys go right, so
    /// duplicates keep their insertion order in an in-order walk. Heights are
    /// not touched.
    pub(crate) unsafe fn insert(root: NonNull<Self>, node: NonNull<Self>) -> NonNull<Self>
    where
        K: Ord,
    {
        let mut parent = root;

        loop {
            unsafe {
                let dir = if node.as_ref().key < parent.as_ref().key {
                    Dir::Left
                } else {
                    Dir::Right
                };

                match Self::child(parent, dir) {
                    Some(child) => parent = child,
                    None => {
                        Self::links(parent).as_mut().set_child(dir, Some(node));
                        Self::links(node).as_mut().set_parent(Some(parent));
                        return parent;
                    }
                }
            }
        }
    }

    /// Removes `node` from its tree.
    ///
    /// A node with two children is not unlinked itself: it takes over the key
    /// of its in-order predecessor, and the predecessor's node (now holding
    /// the removed key) is unlinked instead.
    ///
    /// # Safety
    ///
    /// `node` must be linked into a live tree.
    pub(crate) unsafe fn remove(node: NonNull<Self>) -> Removed<K> {
        unsafe {
            let (left, right) = (Self::left(node), Self::right(node));

            let Some(left) = left.filter(|_| right.is_some()) else {
                return Self::unlink(node);
            };

            let predecessor = Self::max(left);
            mem::swap(
                &mut (*node.as_ptr()).key,
                &mut (*predecessor.as_ptr()).key,
            );

            let Removed {
                node: removed,
                stale,
                ..
            } = Self::unlink(predecessor);

            Removed {
                replacement: Some(node),
                node: removed,
                stale,
            }
        }
    }

    // Unlinks a node with at most one child, elevating the child (if any) into
    // its place.
    unsafe fn unlink(node: NonNull<Self>) -> Removed<K> {
        unsafe {
            let links = Self::links(node).as_mut();
            debug_assert!(
                links.left().is_none() || links.right().is_none(),
                "only nodes with at most one child can be unlinked"
            );

            let parent = links.set_parent(None);
            let left = links.set_left(None);
            let right = links.set_right(None);
            let child = left.or(right);

            Self::maybe_set_parent(child, parent);
            if let Some(parent) = parent {
                Self::replace_child(parent, node, child);
            }

            Removed {
                replacement: child,
                node: Self::from_ptr(node),
                stale: parent,
            }
        }
    }

    /// Recomputes the cached height of `node` from its children.
    ///
    /// Returns `true` if the height changed.
    pub(crate) unsafe fn update_height(node: NonNull<Self>) -> bool {
        unsafe {
            let links = Self::links(node).as_mut();
            let height = 1 + Self::height(links.left()).max(Self::height(links.right()));
            links.set_height(height) != height
        }
    }

    /// Recomputes heights from `node` upwards, stopping at the first node
    /// whose height is unchanged.
    pub(crate) unsafe fn refresh_heights(mut opt_node: Link<K>) {
        while let Some(node) = opt_node {
            unsafe {
                if !Self::update_height(node) {
                    return;
                }

                opt_node = Self::parent(node);
            }
        }
    }

    #[inline]
    unsafe fn maybe_set_parent(opt_node: Link<K>, parent: Link<K>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { Self::links(node).as_mut().set_parent(parent) };
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with
    // `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    unsafe fn replace_child(parent: NonNull<Self>, old_child: NonNull<Self>, new_child: Link<K>) {
        unsafe {
            let links = Self::links(parent).as_mut();

            let dir = if links.left() == Some(old_child) {
                Dir::Left
            } else {
                debug_assert_eq!(
                    links.right(),
                    Some(old_child),
                    "`old_child` must be a child of `parent`"
                );
                Dir::Right
            };

            links.set_child(dir, new_child);
        }
    }
}

impl<K: fmt::Debug> Node<K> {
    // Moves `up` above its parent.
    //
    // ```text
    //        G                 G
    //        |                 |
    //        P      Left       N
    //       / \   -------->   / \
    //      X   N             P   Z
    //         / \           / \
    //        Y   Z         X   Y
    // ```
    //
    // `dir` is the side of `up` that the parent moves down to; `up`'s former
    // `dir` subtree crosses over to the parent. Heights are not updated.
    unsafe fn rotate(up: NonNull<Self>, dir: Dir) {
        unsafe {
            let down = Self::parent(up).expect("cannot rotate the topmost node");
            debug_assert_eq!(Self::child(down, !dir), Some(up));

            log::trace!(
                "rotating {:?} {dir:?} over {:?}",
                up.as_ref().key,
                down.as_ref().key
            );

            let across = Self::child(up, dir);
            Self::links(down).as_mut().set_child(!dir, across);
            Self::maybe_set_parent(across, Some(down));

            Self::links(up).as_mut().set_child(dir, Some(down));
            let grandparent = Self::links(down).as_mut().set_parent(Some(up));
            Self::links(up).as_mut().set_parent(grandparent);

            if let Some(grandparent) = grandparent {
                Self::replace_child(grandparent, down, Some(up));
            }
        }
    }

    /// Rotates the right child `node` up over its parent.
    pub(crate) unsafe fn rotate_left(node: NonNull<Self>) {
        unsafe { Self::rotate(node, Dir::Left) }
    }

    /// Rotates the left child `node` up over its parent.
    pub(crate) unsafe fn rotate_right(node: NonNull<Self>) {
        unsafe { Self::rotate(node, Dir::Right) }
    }

    /// Rebalances the subtree at `node` bottom-up and returns its new topmost
    /// node.
    ///
    /// Every height in the subtree is recomputed, and every balance factor
    /// ends up in `-1..=1`, however skewed the subtree was.
    pub(crate) unsafe fn rebalance(node: NonNull<Self>) -> NonNull<Self> {
        // Pre-order with the right child visited first; reversed, every node
        // comes after both of its subtrees. Settling a node only rearranges
        // its own subtree, so the order stays valid while rotations happen.
        let mut order = Vec::new();
        let mut stack = vec![node];

        while let Some(cur) = stack.pop() {
            order.push(cur);
            unsafe {
                stack.extend(Self::left(cur));
                stack.extend(Self::right(cur));
            }
        }

        let mut top = node;
        for cur in order.into_iter().rev() {
            top = unsafe { Self::settle(cur) };
        }

        top
    }

    // Balances `node`, whose child subtrees are already balanced and carry
    // exact heights, and returns the subtree's new topmost node.
    //
    // A rotation hands the demoted node a subtree of a different height, so the
    // demoted node is settled again before the new top is re-examined.
    unsafe fn settle(node: NonNull<Self>) -> NonNull<Self> {
        let mut top = node;

        loop {
            unsafe {
                let balance = Self::balance_factor(top);
                let (left, right) = (Self::left(top), Self::right(top));

                top = match (balance, left, right) {
                    (-1..=1, _, _) => {
                        Self::update_height(top);
                        return top;
                    }

                    // Left-left, or a balanced left child.
                    (isize::MIN..=-2, Some(l), _) if Self::balance_factor(l) <= 0 => {
                        Self::rotate_right(l);
                        Self::settle(top);
                        l
                    }

                    // Left-right.
                    (isize::MIN..=-2, Some(l), _) => {
                        let lr = Self::right(l).expect("right-heavy node has a right child");
                        Self::rotate_left(lr);
                        Self::rotate_right(lr);
                        Self::settle(l);
                        Self::settle(top);
                        lr
                    }

                    // Right-right, or a balanced right child.
                    (2..=isize::MAX, _, Some(r)) if Self::balance_factor(r) >= 0 => {
                        Self::rotate_left(r);
                        Self::settle(top);
                        r
                    }

                    // Right-left.
                    (2..=isize::MAX, _, Some(r)) => {
                        let rl = Self::left(r).expect("left-heavy node has a left child");
                        Self::rotate_right(rl);
                        Self::rotate_left(rl);
                        Self::settle(r);
                        Self::settle(top);
                        rl
                    }

                    _ => unreachable!("the heavy side of a node always has a child"),
                };
            }
        }
    }
}

impl<K> Links<K> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                height: 1,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        unsafe { (*self.inner.get()).height }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Link<K> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link<K> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    pub(crate) fn left(&self) -> Link<K> {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link<K> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<K>) -> Link<K> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<K>) -> Link<K> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_left(&mut self, left: Link<K>) -> Link<K> {
        self.set_child(Dir::Left, left)
    }

    #[inline]
    fn set_right(&mut self, right: Link<K>) -> Link<K> {
        self.set_child(Dir::Right, right)
    }

    #[inline]
    fn set_height(&mut self, height: usize) -> usize {
        mem::replace(&mut self.inner.get_mut().height, height)
    }
}
