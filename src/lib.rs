//! Resolve flat, unordered parent-linked records into a forest.
//!
//! Records whose ancestry reaches a genuinely parentless record form linked
//! trees; records whose chain ends at a missing or self-referencing parent
//! form unlinked clusters. Both are available as nested (tree) or flattened
//! depth-first (linear) views.
//!
//! ```
//! use forestry::application::Entry;
//! use forestry::domain::{ForestBuilder, Shape};
//!
//! let forest = ForestBuilder::new(vec![
//!     Entry::numbered(2, Some(1), "A.1"),
//!     Entry::numbered(1, None, "A"),
//!     Entry::numbered(3, Some(9), "orphan"),
//! ])
//! .resolve()
//! .unwrap();
//!
//! assert_eq!(forest.linked(Shape::Linear).labels(), vec!["A", "A.1"]);
//! assert_eq!(forest.unlinked(Shape::Tree).labels(), vec!["orphan"]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod tree_traits;
pub mod util;

pub use domain::{
    CyclePolicy, DomainError, Forest, ForestBuilder, Node, NodeRef, Priority, Record, Shape, View,
};
