use std::fmt;
use std::sync::OnceLock;

use generational_arena::Index;

use crate::domain::record::Record;

/// One record wrapped with its resolved tree relationships.
///
/// `parent`, `root` and `base` are observational back-references into the
/// owning arena. `children` is the only ownership edge and points downward.
#[derive(Debug)]
pub struct Node<R: Record> {
    /// Slot of this node in the arena
    index: Index,
    /// Wrapped record, carried through untouched
    record: R,
    /// Parent slot, None for bases
    parent: Option<Index>,
    /// Topmost node of a genuinely rooted chain, None when unlinked
    root: Option<Index>,
    /// Topmost reachable node, always set after resolution
    base: Option<Index>,
    /// Child slots in sibling order, None when childless
    children: Option<Vec<Index>>,
    /// Hops to `base` (cache)
    distance: OnceLock<usize>,
    /// Longest downward path in hops (cache)
    depth: OnceLock<usize>,
}

impl<R: Record> Node<R> {
    /// A record declaring no parent starts out as its own root.
    pub(crate) fn new(index: Index, record: R) -> Self {
        let root = if record.parent_id().is_none() {
            Some(index)
        } else {
            None
        };
        Self {
            index,
            record,
            parent: None,
            root,
            base: None,
            children: None,
            distance: OnceLock::new(),
            depth: OnceLock::new(),
        }
    }

    /// Attach to `parent`, inheriting its root and base; `None` makes this
    /// node its own base and leaves `root` as constructed.
    pub(crate) fn set_parent(&mut self, parent: Option<&Node<R>>) {
        match parent {
            Some(parent) => {
                self.parent = Some(parent.index);
                self.root = parent.root;
                self.base = parent.base;
            }
            None => {
                self.parent = None;
                self.base = Some(self.index);
            }
        }
    }

    pub(crate) fn set_children(&mut self, children: Vec<Index>) {
        if !children.is_empty() {
            self.children = Some(children);
        }
    }

    pub fn index(&self) -> Index {
        self.index
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn id(&self) -> R::Id {
        self.record.id()
    }

    pub fn parent_id(&self) -> Option<R::Id> {
        self.record.parent_id()
    }

    pub fn parent_index(&self) -> Option<Index> {
        self.parent
    }

    pub fn root_index(&self) -> Option<Index> {
        self.root
    }

    pub fn base_index(&self) -> Index {
        self.base.unwrap_or(self.index)
    }

    /// Child slots; `None` when the node has no children.
    pub fn child_indices(&self) -> Option<&[Index]> {
        self.children.as_deref()
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_linked(&self) -> bool {
        self.root.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.root == Some(self.index)
    }

    pub fn is_base(&self) -> bool {
        self.base == Some(self.index)
    }

    pub(crate) fn cached_distance(&self) -> Option<usize> {
        self.distance.get().copied()
    }

    /// First value wins.
    pub(crate) fn cache_distance(&self, distance: usize) {
        let _ = self.distance.set(distance);
    }

    pub(crate) fn cached_depth(&self) -> Option<usize> {
        self.depth.get().copied()
    }

    /// First value wins.
    pub(crate) fn cache_depth(&self, depth: usize) {
        let _ = self.depth.set(depth);
    }
}

impl<R: Record> fmt::Display for Node<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generational_arena::Arena;

    #[derive(Debug)]
    struct Row {
        id: u32,
        parent: Option<u32>,
    }

    impl Record for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn parent_id(&self) -> Option<u32> {
            self.parent
        }
    }

    fn insert(arena: &mut Arena<Node<Row>>, id: u32, parent: Option<u32>) -> Index {
        arena.insert_with(|idx| Node::new(idx, Row { id, parent }))
    }

    fn attach(arena: &mut Arena<Node<Row>>, child: Index, parent: Index) {
        if let (Some(child), Some(parent)) = arena.get2_mut(child, parent) {
            child.set_parent(Some(&*parent));
        }
    }

    #[test]
    fn test_new_node_without_parent_id_is_its_own_root() {
        let mut arena = Arena::new();
        let a = insert(&mut arena, 1, None);
        let b = insert(&mut arena, 2, Some(1));

        assert_eq!(arena[a].root_index(), Some(a));
        assert_eq!(arena[b].root_index(), None);
    }

    #[test]
    fn test_set_parent_copies_root_and_base() {
        let mut arena = Arena::new();
        let a = insert(&mut arena, 1, None);
        let a1 = insert(&mut arena, 2, Some(1));
        let a1i = insert(&mut arena, 3, Some(2));

        arena[a].set_parent(None);
        attach(&mut arena, a1, a);
        attach(&mut arena, a1i, a1);

        assert_eq!(arena[a].parent_index(), None);
        assert!(arena[a].is_root());
        assert!(arena[a].is_base());
        assert!(arena[a].is_linked());

        assert_eq!(arena[a1].parent_index(), Some(a));
        assert_eq!(arena[a1].root_index(), Some(a));
        assert_eq!(arena[a1].base_index(), a);
        assert!(arena[a1].is_linked());
        assert!(!arena[a1].is_root());
        assert!(!arena[a1].is_base());

        assert_eq!(arena[a1i].parent_index(), Some(a1));
        assert_eq!(arena[a1i].root_index(), Some(a));
        assert_eq!(arena[a1i].base_index(), a);
    }

    #[test]
    fn test_set_parent_none_on_orphan_makes_unlinked_base() {
        let mut arena = Arena::new();
        let orphan = insert(&mut arena, 4, Some(1));

        arena[orphan].set_parent(None);

        assert_eq!(arena[orphan].parent_index(), None);
        assert_eq!(arena[orphan].root_index(), None);
        assert!(arena[orphan].is_base());
        assert!(!arena[orphan].is_linked());
        assert!(!arena[orphan].is_root());
    }

    #[test]
    fn test_set_children_keeps_none_for_empty() {
        let mut arena = Arena::new();
        let a = insert(&mut arena, 1, None);
        let b = insert(&mut arena, 2, Some(2));

        arena[a].set_children(Vec::new());
        assert!(arena[a].child_indices().is_none());
        assert!(!arena[a].has_children());

        arena[a].set_children(vec![b]);
        assert_eq!(arena[a].child_indices(), Some(&[b][..]));
    }

    #[test]
    fn test_cached_distance_keeps_first_value() {
        let mut arena = Arena::new();
        let a = insert(&mut arena, 1, None);

        assert_eq!(arena[a].cached_distance(), None);
        arena[a].cache_distance(3);
        arena[a].cache_distance(7);
        assert_eq!(arena[a].cached_distance(), Some(3));
    }

    #[test]
    fn test_cached_depth_keeps_first_value() {
        let mut arena = Arena::new();
        let a = insert(&mut arena, 1, None);

        assert_eq!(arena[a].cached_depth(), None);
        arena[a].cache_depth(2);
        arena[a].cache_depth(5);
        assert_eq!(arena[a].cached_depth(), Some(2));
    }
}
