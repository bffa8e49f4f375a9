use core::{iter::FusedIterator, marker::PhantomData};

use crate::{
    node::{Dir, Link, Node},
    CountdownTree,
};

enum CameFrom {
    Parent,
    LeftChild,
    Here,
    RightChild,
}

/// An in-order iterator over the keys of a [`CountdownTree`].
///
/// Equal keys are yielded in the order they were inserted, unless a
/// two-children removal has since moved keys between nodes.
pub struct Iter<'tree, K> {
    front_cur: Link<K>,
    front_from: CameFrom,

    len: usize,
    _tree: PhantomData<&'tree CountdownTree<K>>,
}

impl<'tree, K> Iter<'tree, K> {
    pub(crate) fn new(tree: &'tree CountdownTree<K>) -> Self {
        Iter {
            front_cur: tree.root,
            front_from: CameFrom::Parent,
            len: tree.len(),
            _tree: PhantomData,
        }
    }
}

impl<'tree, K> Iterator for Iter<'tree, K> {
    type Item = &'tree K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let mut cur = self.front_cur?;

        loop {
            match self.front_from {
                CameFrom::Parent => {
                    // Entering a subtree: its minimum is next.
                    cur = unsafe { Node::min(cur) };
                    self.front_from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::Here;
                    self.len -= 1;

                    return Some(unsafe { cur.as_ref().key() });
                }

                CameFrom::Here => {
                    if let Some(right) = unsafe { Node::right(cur) } {
                        self.front_from = CameFrom::Parent;
                        cur = right;
                    } else if let Some(parent) = unsafe { Node::parent(cur) } {
                        self.front_from = match unsafe { Node::which_child(parent, cur) } {
                            Dir::Left => CameFrom::LeftChild,
                            Dir::Right => CameFrom::RightChild,
                        };
                        cur = parent;
                    } else {
                        unreachable!("iterator ran past the last node with elements left")
                    }
                }

                CameFrom::RightChild => {
                    // Climb until we arrive at a parent from its left side.
                    while let Some(parent) = unsafe { Node::parent(cur) } {
                        match unsafe { Node::which_child(parent, cur) } {
                            Dir::Left => break,
                            Dir::Right => cur = parent,
                        }
                    }

                    let parent = unsafe { Node::parent(cur) }
                        .expect("iterator ran past the last node with elements left");
                    cur = parent;
                    self.front_from = CameFrom::LeftChild;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}
