//! The record contract: anything with an id and an optional parent id.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Input entity resolved into a forest.
///
/// Only `id` and `parent_id` are inspected; everything else a record carries
/// is passed through untouched.
pub trait Record {
    type Id: Clone + Eq + Hash + Debug + Display;

    fn id(&self) -> Self::Id;

    /// `None` means the record declares no parent.
    fn parent_id(&self) -> Option<Self::Id>;

    /// Text shown by renderers.
    fn label(&self) -> String {
        self.id().to_string()
    }
}
