use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::node::Node;
use crate::domain::record::Record;
use crate::domain::view::{Priority, Shape, View};

/// Resolved, immutable forest.
///
/// Holds every node in an arena plus the cached depth-first order: linked
/// trees first, then unlinked clusters. Nothing is mutated after resolution,
/// so a `Forest` can be shared read-only across threads.
pub struct Forest<R: Record> {
    arena: Arena<Node<R>>,
    lookup: HashMap<R::Id, Index>,
    order: Vec<Index>,
}

impl<R: Record> Forest<R> {
    pub(crate) fn from_parts(
        arena: Arena<Node<R>>,
        lookup: HashMap<R::Id, Index>,
        order: Vec<Index>,
    ) -> Self {
        Self {
            arena,
            lookup,
            order,
        }
    }

    pub fn node_at(&self, index: Index) -> Option<NodeRef<'_, R>> {
        self.arena.get(index).map(|node| NodeRef { forest: self, node })
    }

    pub fn get(&self, id: &R::Id) -> Option<NodeRef<'_, R>> {
        self.lookup.get(id).and_then(|&index| self.node_at(index))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All nodes in cached depth-first order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_, R>> + '_ {
        self.order.iter().filter_map(move |&index| self.node_at(index))
    }

    pub fn roots(&self) -> View<'_, R> {
        self.select(|node| node.is_root())
    }

    pub fn unlinked_bases(&self) -> View<'_, R> {
        self.select(|node| !node.is_linked() && node.is_base())
    }

    /// Nodes attached to a genuine root.
    #[instrument(level = "trace", skip(self))]
    pub fn linked(&self, shape: Shape) -> View<'_, R> {
        match shape {
            Shape::Tree => self.roots(),
            Shape::Linear => self.select(|node| node.is_linked()),
        }
    }

    /// Nodes whose chain ends at a missing or self-referencing parent.
    #[instrument(level = "trace", skip(self))]
    pub fn unlinked(&self, shape: Shape) -> View<'_, R> {
        match shape {
            Shape::Tree => self.unlinked_bases(),
            Shape::Linear => self.select(|node| !node.is_linked()),
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn both(&self, shape: Shape, priority: Priority) -> View<'_, R> {
        match priority {
            Priority::LinkedFirst => self.linked(shape).chain(self.unlinked(shape)),
            Priority::UnlinkedFirst => self.unlinked(shape).chain(self.linked(shape)),
        }
    }

    fn select(&self, keep: impl Fn(&Node<R>) -> bool) -> View<'_, R> {
        View::new(self.iter().filter(|node| keep(node.node())).collect())
    }
}

impl<R: Record> fmt::Debug for Forest<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forest")
            .field("nodes", &self.order.len())
            .field("roots", &self.roots().len())
            .field("unlinked_bases", &self.unlinked_bases().len())
            .finish()
    }
}

/// Borrowed handle to one node of a resolved forest.
///
/// Follows the arena back-references so relationship queries return
/// further handles instead of raw slots.
pub struct NodeRef<'a, R: Record> {
    forest: &'a Forest<R>,
    node: &'a Node<R>,
}

impl<R: Record> Clone for NodeRef<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Record> Copy for NodeRef<'_, R> {}

impl<R: Record> PartialEq for NodeRef<'_, R> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.forest, other.forest) && self.node.index() == other.node.index()
    }
}

impl<R: Record> Eq for NodeRef<'_, R> {}

impl<R: Record> Deref for NodeRef<'_, R> {
    type Target = Node<R>;

    fn deref(&self) -> &Self::Target {
        self.node
    }
}

impl<R: Record> fmt::Debug for NodeRef<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.node.id())
            .field("linked", &self.node.is_linked())
            .field("base", &self.node.is_base())
            .finish()
    }
}

impl<R: Record> fmt::Display for NodeRef<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}

impl<'a, R: Record> NodeRef<'a, R> {
    pub fn node(&self) -> &'a Node<R> {
        self.node
    }

    pub fn parent(&self) -> Option<NodeRef<'a, R>> {
        self.node
            .parent_index()
            .and_then(|index| self.forest.node_at(index))
    }

    pub fn root(&self) -> Option<NodeRef<'a, R>> {
        self.node
            .root_index()
            .and_then(|index| self.forest.node_at(index))
    }

    pub fn base(&self) -> NodeRef<'a, R> {
        self.forest
            .node_at(self.node.base_index())
            .unwrap_or(*self)
    }

    /// Children in sibling order; empty when the node has none.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a, R>> + 'a {
        let forest = self.forest;
        self.node
            .child_indices()
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&index| forest.node_at(index))
    }

    /// Maximum nesting depth below this node, 0 without children.
    ///
    /// Computed bottom-up with an explicit stack; every node visited keeps
    /// its own depth cached, so later calls anywhere in the subtree are O(1).
    pub fn depth_of_subtree(&self) -> usize {
        if let Some(depth) = self.node.cached_depth() {
            return depth;
        }

        let mut stack = vec![(*self, false)];
        while let Some((current, expanded)) = stack.pop() {
            if current.node.cached_depth().is_some() {
                continue;
            }
            if expanded {
                let depth = current
                    .children()
                    .filter_map(|child| child.node.cached_depth())
                    .map(|depth| depth + 1)
                    .max()
                    .unwrap_or(0);
                current.node.cache_depth(depth);
            } else {
                stack.push((current, true));
                stack.extend(current.children().map(|child| (child, false)));
            }
        }

        self.node.cached_depth().unwrap_or(0)
    }

    /// Parent hops up to `base`; computed on first call, cached afterwards.
    ///
    /// The walk stops at the first ancestor with a cached distance and
    /// caches every node it passed on the way.
    pub fn distance_to_base(&self) -> usize {
        if let Some(distance) = self.node.cached_distance() {
            return distance;
        }

        let mut uncached = Vec::new();
        let mut known = None;
        let mut cursor = Some(*self);
        while let Some(node) = cursor {
            if let Some(distance) = node.node.cached_distance() {
                known = Some(distance);
                break;
            }
            uncached.push(node);
            cursor = node.parent();
        }

        // Topmost uncached node is the base itself unless an ancestor was cached
        let mut distance = known.map_or(0, |distance| distance + 1);
        for node in uncached.iter().rev() {
            node.node.cache_distance(distance);
            distance += 1;
        }

        self.node.cached_distance().unwrap_or(0)
    }

    /// Same as `distance_to_base` for linked nodes, `None` when unlinked.
    pub fn distance_to_root(&self) -> Option<usize> {
        self.node.is_linked().then(|| self.distance_to_base())
    }

    /// Pre-order descendants within `max_depth` hops (unlimited if `None`).
    ///
    /// `include_self` only applies to this node; every descendant reached is
    /// emitted. `descendants(Some(0), false)` is empty and
    /// `descendants(Some(1), false)` yields the immediate children.
    pub fn descendants(&self, max_depth: Option<usize>, include_self: bool) -> Vec<NodeRef<'a, R>> {
        let mut found = Vec::new();
        let mut stack = vec![(*self, max_depth, include_self)];

        while let Some((current, budget, emit)) = stack.pop() {
            if emit {
                found.push(current);
            }
            if budget == Some(0) {
                continue;
            }
            let remaining = budget.map(|depth| depth - 1);
            // Push children in reverse order for left-to-right traversal
            let children: Vec<_> = current.children().collect();
            for child in children.into_iter().rev() {
                stack.push((child, remaining, true));
            }
        }

        found
    }
}
