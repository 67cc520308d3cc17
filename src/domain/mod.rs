//! Domain layer: forest resolution and queries
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod error;
pub mod forest;
pub mod node;
pub mod record;
pub mod view;

pub use builder::{CyclePolicy, ForestBuilder, ForestResult};
pub use error::DomainError;
pub use forest::{Forest, NodeRef};
pub use node::Node;
pub use record::Record;
pub use view::{Priority, Shape, View};
