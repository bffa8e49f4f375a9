//! A binary search tree that rebalances on a countdown.
//!
//! [`CountdownTree`] does not restore balance after each mutation the way an
//! AVL or red-black tree does. Instead every insert and remove decrements a
//! countdown, and when the countdown runs out the whole tree is rebalanced in
//! one post-order pass with AVL rotations. Bursts of mutations therefore pay
//! only for the descent, at the price of the tree drifting out of balance
//! between passes.
//!
//! After a pass the countdown restarts at `max(height, min_period)`, so the
//! amortized cost of a pass stays proportional to the work that could have
//! unbalanced the tree. See [`Config`] for the knobs.
//!
//! Keys may repeat. A key equal to a node's key is placed in its right
//! subtree, so equal keys are visited in insertion order.
#![cfg_attr(not(test), no_std)]

extern crate alloc;
#[cfg(feature = "model")]
extern crate std;

use core::{borrow::Borrow, fmt, ptr::NonNull};

use cordyceps::Linked;

mod config;
mod debug;
mod iter;
mod node;
mod node_ref;
mod validate;

#[cfg(any(test, feature = "model"))]
pub mod model;


pub use config::Config;
pub use iter::Iter;
pub use node_ref::NodeRef;
pub use validate::Violation;

use node::{Link, Node, Removed};

/// An ordered multiset of keys, rebalanced every [`countdown`] operations.
///
/// [`countdown`]: CountdownTree::countdown
pub struct CountdownTree<K> {
    root: Link<K>,
    len: usize,
    countdown: usize,
    config: Config,
}

impl<K> CountdownTree<K> {
    /// Returns a new empty tree using [`Config::DEFAULT`].
    pub const fn new() -> CountdownTree<K> {
        CountdownTree::with_config(Config::DEFAULT)
    }

    /// Returns a new empty tree using `config`.
    pub const fn with_config(config: Config) -> CountdownTree<K> {
        CountdownTree {
            root: None,
            len: 0,
            countdown: config.initial_countdown.get(),
            config,
        }
    }

    /// Returns `true` if the tree contains no keys.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of keys in the tree, counting duplicates.
    #[doc(alias = "size")]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree; 0 when empty, 1 for a single key.
    pub fn height(&self) -> usize {
        unsafe { Node::height(self.root) }
    }

    /// Returns the number of inserts and removes left before the next
    /// rebalance pass.
    pub const fn countdown(&self) -> usize {
        self.countdown
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a read-only view of the root node.
    pub fn root(&self) -> Option<NodeRef<'_, K>> {
        self.root.map(NodeRef::new)
    }

    /// Returns the minimum key.
    pub fn first(&self) -> Option<&K> {
        self.root
            .map(|root| unsafe { Node::min(root).as_ref().key() })
    }

    /// Returns the maximum key.
    pub fn last(&self) -> Option<&K> {
        self.root
            .map(|root| unsafe { Node::max(root).as_ref().key() })
    }

    /// Returns an iterator over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }

    /// Clears the tree, removing all keys.
    ///
    /// The countdown is left where it was.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root.take();

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node, which has no left child.
                let cur = Node::min(cur);
                let parent = Node::parent(cur);

                // Elevate its right subtree (if any) into its place.
                let Removed { replacement, .. } = Node::remove(cur);
                self.len -= 1;

                opt_cur = replacement.or(parent);
            }
        }

        debug_assert_eq!(self.len(), 0);
    }
}

impl<K: Ord + fmt::Debug> CountdownTree<K> {
    /// Inserts `key`, keeping any keys equal to it.
    ///
    /// Counts towards the countdown and may trigger a rebalance pass.
    pub fn insert(&mut self, key: K) {
        let ptr = Node::into_ptr(Node::new(key));

        match self.root {
            None => self.root = Some(ptr),
            Some(root) => unsafe {
                let parent = Node::insert(root, ptr);
                Node::refresh_heights(Some(parent));
            },
        }

        self.len += 1;
        self.tick();
    }

    /// Removes one occurrence of `key` and returns it.
    ///
    /// Returns `None` and leaves the tree untouched if `key` is absent. Either
    /// way the call counts towards the countdown and may trigger a rebalance
    /// pass.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removed = self.search(key).map(|victim| unsafe {
            let Removed {
                replacement,
                node,
                stale,
            } = Node::remove(victim);

            if self.root == Some(victim) {
                self.root = replacement;
            }

            Node::refresh_heights(stale);
            self.len -= 1;

            node.into_key()
        });

        self.tick();
        removed
    }

    /// Returns `true` if the tree holds at least one key equal to `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    /// Rebalances the whole tree now and restarts the countdown, exactly as if
    /// the countdown had just run out.
    pub fn rebalance(&mut self) {
        let height_before = self.height();

        if let Some(root) = self.root {
            unsafe {
                Node::rebalance(root);

                // Rotations at the top may have moved `root` down.
                self.root = Some(Node::topmost(root));
            }
        }

        self.countdown = self.config.period_for(self.height());

        log::debug!(
            "rebalanced {} keys: height {height_before} -> {}, next pass in {} operations",
            self.len,
            self.height(),
            self.countdown
        );
    }

    fn search<Q>(&self, key: &Q) -> Option<NonNull<Node<K>>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.and_then(|root| unsafe { Node::search(root, key) })
    }

    fn tick(&mut self) {
        self.countdown -= 1;

        if self.countdown == 0 {
            self.rebalance();
        }
    }
}

impl<K> Default for CountdownTree<K> {
    fn default() -> Self {
        CountdownTree::new()
    }
}

impl<K> Drop for CountdownTree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Ord + fmt::Debug> Extend<K> for CountdownTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord + fmt::Debug> FromIterator<K> for CountdownTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = CountdownTree::new();
        tree.extend(iter);
        tree
    }
}

impl<'tree, K> IntoIterator for &'tree CountdownTree<K> {
    type Item = &'tree K;
    type IntoIter = Iter<'tree, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
