//! Rendering of resolved subtrees as `termtree` trees.

use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeRef, Record};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

/// One node whose child trees are still being built.
struct Frame<'a, R: Record> {
    node: NodeRef<'a, R>,
    /// Children not yet visited, last-to-first
    pending: Vec<NodeRef<'a, R>>,
    leaves: Vec<Tree<String>>,
}

impl<'a, R: Record> Frame<'a, R> {
    fn new(node: NodeRef<'a, R>) -> Self {
        let mut pending: Vec<_> = node.children().collect();
        pending.reverse();
        Self {
            node,
            pending,
            leaves: Vec::new(),
        }
    }

    fn into_tree(self) -> Tree<String> {
        Tree::new(self.node.record().label()).with_leaves(self.leaves)
    }
}

impl<R: Record> TreeNodeConvert for NodeRef<'_, R> {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let mut stack = vec![Frame::new(*self)];

        while let Some(frame) = stack.last_mut() {
            if let Some(child) = frame.pending.pop() {
                stack.push(Frame::new(child));
                continue;
            }
            let Some(done) = stack.pop() else { break };
            let tree = done.into_tree();
            match stack.last_mut() {
                Some(parent) => parent.leaves.push(tree),
                None => return tree,
            }
        }

        Tree::new(self.record().label())
    }
}

/// Drop a tree level by level instead of recursing once per nesting level.
pub fn dismantle<D: Display>(tree: Tree<D>) {
    let mut pending = vec![tree];
    while let Some(mut tree) = pending.pop() {
        pending.append(&mut tree.leaves);
    }
}
