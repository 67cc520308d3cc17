//! Query projections over a resolved forest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::forest::NodeRef;
use crate::domain::record::Record;

/// Shape of a query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Only top-level entries (roots or bases), subtrees reachable via children
    #[default]
    Tree,
    /// Every node individually, in depth-first pre-order
    Linear,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Tree => write!(f, "tree"),
            Shape::Linear => write!(f, "linear"),
        }
    }
}

impl FromStr for Shape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(Shape::Tree),
            "linear" => Ok(Shape::Linear),
            other => Err(format!("unknown shape '{other}' (expected tree or linear)")),
        }
    }
}

/// Which half of the forest comes first when both are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    #[default]
    #[serde(rename = "linked")]
    LinkedFirst,
    #[serde(rename = "unlinked")]
    UnlinkedFirst,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::LinkedFirst => write!(f, "linked"),
            Priority::UnlinkedFirst => write!(f, "unlinked"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linked" | "linked-first" => Ok(Priority::LinkedFirst),
            "unlinked" | "unlinked-first" => Ok(Priority::UnlinkedFirst),
            other => Err(format!(
                "unknown priority '{other}' (expected linked or unlinked)"
            )),
        }
    }
}

/// Ordered selection of nodes from a forest.
///
/// Entries keep the forest's cached depth-first order. Ids are unique
/// within a view.
pub struct View<'a, R: Record> {
    entries: Vec<NodeRef<'a, R>>,
}

impl<'a, R: Record> View<'a, R> {
    pub(crate) fn new(entries: Vec<NodeRef<'a, R>>) -> Self {
        Self { entries }
    }

    /// Append `other`; the two views must not share nodes.
    pub(crate) fn chain(mut self, other: View<'a, R>) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn get(&self, id: &R::Id) -> Option<NodeRef<'a, R>> {
        self.entries.iter().copied().find(|node| node.id() == *id)
    }

    pub fn first(&self) -> Option<NodeRef<'a, R>> {
        self.entries.first().copied()
    }

    pub fn ids(&self) -> Vec<R::Id> {
        self.entries.iter().map(|node| node.id()).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|node| node.record().label()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'a, R>> + '_ {
        self.entries.iter().copied()
    }
}

impl<'a, R: Record> IntoIterator for View<'a, R> {
    type Item = NodeRef<'a, R>;
    type IntoIter = std::vec::IntoIter<NodeRef<'a, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<R: Record> fmt::Debug for View<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("tree", Shape::Tree)]
    #[case("Linear", Shape::Linear)]
    fn test_shape_from_str(#[case] input: &str, #[case] expected: Shape) {
        assert_eq!(input.parse::<Shape>(), Ok(expected));
    }

    #[rstest]
    #[case("linked", Priority::LinkedFirst)]
    #[case("unlinked-first", Priority::UnlinkedFirst)]
    fn test_priority_from_str(#[case] input: &str, #[case] expected: Priority) {
        assert_eq!(input.parse::<Priority>(), Ok(expected));
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        assert!("forest".parse::<Shape>().is_err());
    }
}
