//! Forest service: loads record files and resolves them with the configured policy.

use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use crate::application::entry::{Entry, Key};
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::loader::load_records;
use crate::config::Settings;
use crate::domain::{Forest, ForestBuilder, NodeRef, Record};

/// Loads and resolves record files according to `Settings`.
pub struct ForestService {
    settings: Settings,
}

impl ForestService {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Forest<Entry>> {
        let records = load_records(path)?;
        info!(count = records.len(), "loaded records");
        self.resolve(records)
    }

    pub fn resolve(&self, records: Vec<Entry>) -> ApplicationResult<Forest<Entry>> {
        let forest = ForestBuilder::new(records)
            .with_cycle_policy(self.settings.cycle_policy)
            .resolve()?;
        Ok(forest)
    }

    /// Look up a node, failing with `UnknownNode` if absent.
    pub fn find<'a>(forest: &'a Forest<Entry>, id: &Key) -> ApplicationResult<NodeRef<'a, Entry>> {
        forest
            .get(id)
            .ok_or_else(|| ApplicationError::UnknownNode(id.to_string()))
    }
}

/// Serializable view of one resolved node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub id: Key,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Key>,
    pub label: String,
    pub base: Key,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Key>,
    pub linked: bool,
    pub distance: usize,
    pub depth: usize,
}

impl NodeSummary {
    pub fn from_node(node: NodeRef<'_, Entry>) -> Self {
        Self {
            id: node.id(),
            parent: node.parent().map(|parent| parent.id()),
            label: node.record().label(),
            base: node.base().id(),
            root: node.root().map(|root| root.id()),
            linked: node.is_linked(),
            distance: node.distance_to_base(),
            depth: node.depth_of_subtree(),
        }
    }
}

/// Aggregate counts over a resolved forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForestSummary {
    pub nodes: usize,
    pub trees: usize,
    pub unlinked_bases: usize,
    pub linked_nodes: usize,
    pub unlinked_nodes: usize,
    pub max_depth: usize,
}

impl ForestSummary {
    pub fn of<R: Record>(forest: &Forest<R>) -> Self {
        let linked_nodes = forest.iter().filter(|node| node.is_linked()).count();
        let max_depth = forest
            .iter()
            .filter(|node| node.is_base())
            .map(|base| base.depth_of_subtree())
            .max()
            .unwrap_or(0);
        Self {
            nodes: forest.len(),
            trees: forest.roots().len(),
            unlinked_bases: forest.unlinked_bases().len(),
            linked_nodes,
            unlinked_nodes: forest.len() - linked_nodes,
            max_depth,
        }
    }
}
