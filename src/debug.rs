use alloc::{collections::VecDeque, string::String, vec};
use core::fmt;

use crate::{CountdownTree, NodeRef};

/// Renders the subtree as `(key [height] L=<left> R=<right>)`, writing nothing
/// for a missing child.
impl<K: fmt::Display> fmt::Display for NodeRef<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step<'tree, K> {
            Open(NodeRef<'tree, K>),
            Text(&'static str),
        }

        let mut stack = vec![Step::Open(*self)];

        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Open(node) => node,
                Step::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
            };

            write!(f, "({} [{}] L=", node.key(), node.height())?;

            // Popped in reverse: left subtree, " R=", right subtree, ")".
            stack.push(Step::Text(")"));
            stack.extend(node.right().map(Step::Open));
            stack.push(Step::Text(" R="));
            stack.extend(node.left().map(Step::Open));
        }

        Ok(())
    }
}

/// Renders the tree in the same format as [`NodeRef`]; an empty tree renders
/// as the empty string.
impl<K: fmt::Display> fmt::Display for CountdownTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => write!(f, "{root}"),
            None => Ok(()),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for CountdownTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display> CountdownTree<K> {
    /// Writes a Graphviz rendering of the tree to `w`, one rank per depth.
    ///
    /// Nodes are labelled `key [height]`; missing children are drawn as points
    /// so the left/right shape stays visible.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let Some(root) = self.root() else {
            return write!(w, "digraph \"graph-{name}\" {{}}");
        };

        enum Item<'tree, K> {
            Node(NodeRef<'tree, K>, usize),
            Missing(usize),
        }

        // Keys may repeat, so vertices are named by visit order.
        let mut next_id = 0;
        let mut id = || {
            next_id += 1;
            next_id - 1
        };

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root, id()));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut edges = String::new();

        while !queue.is_empty() {
            use fmt::Write;

            write!(w, "{{rank=same; ")?;

            for _ in 0..queue.len() {
                let Some(item) = queue.pop_front() else {
                    break;
                };

                let (node, node_id) = match item {
                    Item::Node(node, node_id) => (node, node_id),
                    Item::Missing(missing_id) => {
                        write!(w, "\"graph{name}-{missing_id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                write!(
                    w,
                    "\"graph{name}-{node_id}\" [label=\"{} [{}]\"]; ",
                    node.key(),
                    node.height()
                )?;

                for child in [node.left(), node.right()] {
                    let child_id = id();
                    queue.push_back(match child {
                        Some(child) => Item::Node(child, child_id),
                        None => Item::Missing(child_id),
                    });

                    writeln!(
                        edges,
                        "\"graph{name}-{node_id}\" -> \"graph{name}-{child_id}\";"
                    )?;
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&edges)?;

        w.write_str(" }\n}")
    }
}
