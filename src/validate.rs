use alloc::{string::String, vec, vec::Vec};
use core::fmt::{self, Write};

use crate::{CountdownTree, NodeRef};

/// A structural inconsistency found by [`CountdownTree::validate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Violation<'tree, K> {
    /// A node's cached height does not match its children.
    Height {
        key: &'tree K,
        height: usize,
        expected: usize,
    },

    /// A key in the left subtree of `parent` is greater than `parent`'s key.
    LeftOrder { parent: &'tree K, child: &'tree K },

    /// A key in the right subtree of `parent` is less than `parent`'s key.
    RightOrder { parent: &'tree K, child: &'tree K },

    /// A child's parent link does not point back at its parent.
    ParentLink { parent: &'tree K, child: &'tree K },

    /// The root has a parent link.
    RootParent { key: &'tree K },

    /// The number of reachable nodes differs from the recorded length.
    Size { counted: usize, recorded: usize },
}

impl<K: fmt::Debug> fmt::Display for Violation<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Height {
                key,
                height,
                expected,
            } => write!(f, "height of {key:?} is {height}, expected {expected}"),
            Violation::LeftOrder { parent, child } => {
                write!(f, "left subtree of {parent:?} holds key {child:?}")
            }
            Violation::RightOrder { parent, child } => {
                write!(f, "right subtree of {parent:?} holds key {child:?}")
            }
            Violation::ParentLink { parent, child } => {
                write!(f, "parent link of {child:?} does not point at {parent:?}")
            }
            Violation::RootParent { key } => write!(f, "root {key:?} has a parent link"),
            Violation::Size { counted, recorded } => write!(
                f,
                "number of nodes ({counted}) doesn't match length ({recorded})"
            ),
        }
    }
}

impl<K: Ord + fmt::Debug> CountdownTree<K> {
    /// Walks the whole tree and reports every broken invariant.
    ///
    /// Checks key ordering, parent links, cached heights and the recorded
    /// length. The tree is not modified and checking does not stop at the first
    /// problem; an empty vector means the tree is consistent.
    pub fn validate(&self) -> Vec<Violation<'_, K>> {
        let mut violations = Vec::new();
        let mut counted = 0;

        if let Some(root) = self.root() {
            if root.parent().is_some() {
                violations.push(Violation::RootParent { key: root.key() });
            }

            let mut stack = vec![Bounded {
                node: root,
                lower: None,
                upper: None,
            }];

            while let Some(bounded) = stack.pop() {
                counted += 1;
                check_node(bounded, &mut stack, &mut violations);
            }
        }

        if counted != self.len() {
            violations.push(Violation::Size {
                counted,
                recorded: self.len(),
            });
        }

        violations
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn assert_invariants(&self) {
        let violations = self.validate();

        if !violations.is_empty() {
            let mut msg = String::new();
            for violation in &violations {
                let _ = write!(msg, "\n  - {violation}");
            }

            panic!(
                "tree has {} invariant violation(s):{msg}",
                violations.len()
            );
        }
    }

    /// Asserts that every balance factor is in `-1..=1`.
    #[doc(hidden)]
    #[track_caller]
    pub fn assert_balanced(&self) {
        let mut stack: Vec<_> = self.root().into_iter().collect();

        while let Some(node) = stack.pop() {
            let balance = node.balance_factor();
            assert!(
                (-1..=1).contains(&balance),
                "{:?} has balance factor {balance}",
                node.key()
            );

            stack.extend(node.left());
            stack.extend(node.right());
        }
    }
}

// A node awaiting checks, with the nearest ancestor keys it must lie between.
struct Bounded<'tree, K> {
    node: NodeRef<'tree, K>,
    lower: Option<&'tree K>,
    upper: Option<&'tree K>,
}

fn check_node<'tree, K: Ord>(
    Bounded { node, lower, upper }: Bounded<'tree, K>,
    stack: &mut Vec<Bounded<'tree, K>>,
    violations: &mut Vec<Violation<'tree, K>>,
) {
    let expected = 1 + node
        .left()
        .map(|n| n.height())
        .max(node.right().map(|n| n.height()))
        .unwrap_or(0);

    if node.height() != expected {
        violations.push(Violation::Height {
            key: node.key(),
            height: node.height(),
            expected,
        });
    }

    // Rotations can leave equal keys on either side, so bounds are inclusive.
    if let Some(upper) = upper.filter(|&upper| node.key() > upper) {
        violations.push(Violation::LeftOrder {
            parent: upper,
            child: node.key(),
        });
    }

    if let Some(lower) = lower.filter(|&lower| node.key() < lower) {
        violations.push(Violation::RightOrder {
            parent: lower,
            child: node.key(),
        });
    }

    for (child, lower, upper) in [
        (node.left(), lower, Some(node.key())),
        (node.right(), Some(node.key()), upper),
    ] {
        let Some(child) = child else { continue };

        if child.parent() != Some(node) {
            violations.push(Violation::ParentLink {
                parent: node.key(),
                child: child.key(),
            });
        }

        stack.push(Bounded {
            node: child,
            lower,
            upper,
        });
    }
}
