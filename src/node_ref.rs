use core::{fmt, marker::PhantomData, ptr::NonNull};

use cordyceps::Linked;

use crate::{
    node::{Link, Node},
    CountdownTree,
};

/// A shared, read-only view of one node of a [`CountdownTree`].
///
/// This is the traversal surface used by [`validate`](CountdownTree::validate)
/// and the formatters; it exposes the node's key, cached height and its
/// neighbours, and cannot change the tree. Two `NodeRef`s compare equal when
/// they point at the same node.
pub struct NodeRef<'tree, K> {
    ptr: NonNull<Node<K>>,
    _tree: PhantomData<&'tree CountdownTree<K>>,
}

impl<'tree, K> NodeRef<'tree, K> {
    pub(crate) fn new(ptr: NonNull<Node<K>>) -> Self {
        NodeRef {
            ptr,
            _tree: PhantomData,
        }
    }

    fn link(link: Link<K>) -> Option<Self> {
        link.map(NodeRef::new)
    }

    /// Returns the key stored in this node.
    pub fn key(&self) -> &'tree K {
        unsafe { self.ptr.as_ref().key() }
    }

    /// Returns the cached height of the subtree rooted here. A leaf has height 1.
    pub fn height(&self) -> usize {
        unsafe { Node::height(Some(self.ptr)) }
    }

    /// Returns `height(right) - height(left)`, counting a missing child as 0.
    pub fn balance_factor(&self) -> isize {
        unsafe { Node::balance_factor(self.ptr) }
    }

    pub fn left(&self) -> Option<NodeRef<'tree, K>> {
        Self::link(unsafe { Node::left(self.ptr) })
    }

    pub fn right(&self) -> Option<NodeRef<'tree, K>> {
        Self::link(unsafe { Node::right(self.ptr) })
    }

    /// Returns the parent of this node, or `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'tree, K>> {
        Self::link(unsafe { Node::parent(self.ptr) })
    }

    pub fn is_leaf(&self) -> bool {
        unsafe { Node::links(self.ptr).as_ref().is_leaf() }
    }
}

impl<K> Clone for NodeRef<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for NodeRef<'_, K> {}

impl<K> PartialEq for NodeRef<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<K> Eq for NodeRef<'_, K> {}

impl<K: fmt::Debug> fmt::Debug for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}
