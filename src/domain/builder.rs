//! Forest builder: resolves a flat record set into linked trees and unlinked clusters.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::domain::error::DomainError;
use crate::domain::forest::Forest;
use crate::domain::node::Node;
use crate::domain::record::Record;

/// Result type for forest operations.
pub type ForestResult<T> = Result<T, DomainError>;

/// How parent chains that loop back on themselves (two or more hops) are handled.
///
/// A record naming itself as parent is never a cycle: it is treated as
/// parentless and becomes an unlinked base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Fail resolution with `DomainError::CyclicReference`
    #[default]
    Reject,
    /// Cut each cycle at its earliest record, which becomes an unlinked base
    Unlink,
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePolicy::Reject => write!(f, "reject"),
            CyclePolicy::Unlink => write!(f, "unlink"),
        }
    }
}

impl FromStr for CyclePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(CyclePolicy::Reject),
            "unlink" => Ok(CyclePolicy::Unlink),
            other => Err(format!(
                "unknown cycle policy '{other}' (expected reject or unlink)"
            )),
        }
    }
}

/// Unresolved phase: raw records waiting for `resolve`.
///
/// Records may arrive in any order; parents need not precede children.
/// Record order is significant only as a tie-break: siblings, roots and
/// unlinked bases all keep their input order.
pub struct ForestBuilder<R: Record> {
    records: Vec<R>,
    cycle_policy: CyclePolicy,
}

impl<R: Record> Default for ForestBuilder<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            cycle_policy: CyclePolicy::default(),
        }
    }
}

impl<R: Record> ForestBuilder<R> {
    pub fn new(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            records: records.into_iter().collect(),
            cycle_policy: CyclePolicy::default(),
        }
    }

    pub fn with_cycle_policy(mut self, cycle_policy: CyclePolicy) -> Self {
        self.cycle_policy = cycle_policy;
        self
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve every parent link and produce the ordered, immutable forest.
    ///
    /// # Errors
    ///
    /// * `DuplicateIdentifier` when two records share an id.
    /// * `CyclicReference` when parent links form a loop of two or more
    ///   records and the policy is `CyclePolicy::Reject`.
    #[instrument(level = "debug", skip(self), fields(records = self.records.len(), policy = %self.cycle_policy))]
    pub fn resolve(self) -> ForestResult<Forest<R>> {
        let cycle_policy = self.cycle_policy;
        let count = self.records.len();

        let mut arena = Arena::with_capacity(count);
        let mut positions: HashMap<R::Id, usize> = HashMap::with_capacity(count);
        let mut slots: Vec<Index> = Vec::with_capacity(count);

        for record in self.records {
            let id = record.id();
            if positions.contains_key(&id) {
                return Err(DomainError::DuplicateIdentifier(id.to_string()));
            }
            let index = arena.insert_with(|index| Node::new(index, record));
            positions.insert(id, slots.len());
            slots.push(index);
        }

        let mut parents = effective_parents(&arena, &positions, &slots);

        let cycles = detect_cycles(&parents);
        if !cycles.is_empty() {
            let ids_of = |cycle: &[usize]| -> Vec<String> {
                cycle
                    .iter()
                    .filter_map(|&pos| arena.get(slots[pos]))
                    .map(|node| node.id().to_string())
                    .collect()
            };
            match cycle_policy {
                CyclePolicy::Reject => {
                    return Err(DomainError::CyclicReference {
                        cycle: ids_of(&cycles[0]),
                    });
                }
                CyclePolicy::Unlink => {
                    for cycle in &cycles {
                        if let Some(&first) = cycle.iter().min() {
                            warn!(cycle = ?ids_of(cycle), "cutting parent cycle");
                            parents[first] = None;
                        }
                    }
                }
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (pos, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent {
                children[parent].push(pos);
            }
        }

        // Roots first, then unlinked bases, each group in input order
        let (roots, orphans): (Vec<usize>, Vec<usize>) = (0..count)
            .filter(|&pos| parents[pos].is_none())
            .partition(|&pos| {
                arena
                    .get(slots[pos])
                    .is_some_and(|node| node.parent_id().is_none())
            });
        debug!(roots = roots.len(), unlinked = orphans.len(), "found bases");

        let mut order = Vec::with_capacity(count);
        for base in roots.into_iter().chain(orphans) {
            let mut stack = vec![base];
            while let Some(pos) = stack.pop() {
                let index = slots[pos];
                match parents[pos] {
                    Some(parent) => {
                        if let (Some(node), Some(parent)) = arena.get2_mut(index, slots[parent]) {
                            node.set_parent(Some(&*parent));
                        }
                    }
                    None => {
                        if let Some(node) = arena.get_mut(index) {
                            node.set_parent(None);
                        }
                    }
                }
                if let Some(node) = arena.get_mut(index) {
                    node.set_children(children[pos].iter().map(|&child| slots[child]).collect());
                    trace!(id = %node.id(), linked = node.is_linked(), "resolved node");
                }
                order.push(index);

                // Push children in reverse order for left-to-right traversal
                for &child in children[pos].iter().rev() {
                    stack.push(child);
                }
            }
        }
        debug_assert_eq!(order.len(), count, "every node hangs below some base");

        let lookup = positions
            .into_iter()
            .map(|(id, pos)| (id, slots[pos]))
            .collect();

        Ok(Forest::from_parts(arena, lookup, order))
    }
}

/// Parent slot per record: `None` for a missing parent id, a parent id that
/// names no record, or a record naming itself.
fn effective_parents<R: Record>(
    arena: &Arena<Node<R>>,
    positions: &HashMap<R::Id, usize>,
    slots: &[Index],
) -> Vec<Option<usize>> {
    slots
        .iter()
        .enumerate()
        .map(|(pos, &index)| {
            let parent_id = arena.get(index).and_then(|node| node.parent_id())?;
            match positions.get(&parent_id) {
                Some(&parent) if parent == pos => {
                    trace!(id = %parent_id, "self-referencing parent treated as absent");
                    None
                }
                Some(&parent) => Some(parent),
                None => {
                    trace!(parent = %parent_id, "parent not in record set");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

/// Finds every cycle in a parent-slot table.
///
/// Each slot has at most one outgoing edge, so a walk up the chain either
/// reaches a settled (black) slot, ends at a base, or meets a slot of the
/// current walk (gray). Cycles are disjoint and listed in parent-chain order,
/// starting where the walk first entered them.
fn detect_cycles(parents: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut marks = vec![Mark::White; parents.len()];
    let mut cycles = Vec::new();

    for start in 0..parents.len() {
        let mut path = Vec::new();
        let mut cursor = Some(start);

        while let Some(slot) = cursor {
            match marks[slot] {
                Mark::Black => break,
                Mark::Gray => {
                    if let Some(entry) = path.iter().position(|&seen| seen == slot) {
                        cycles.push(path[entry..].to_vec());
                    }
                    break;
                }
                Mark::White => {
                    marks[slot] = Mark::Gray;
                    path.push(slot);
                    cursor = parents[slot];
                }
            }
        }

        for slot in path {
            marks[slot] = Mark::Black;
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_cycles_on_chain_finds_nothing() {
        let parents = vec![None, Some(0), Some(1), Some(1)];
        assert!(detect_cycles(&parents).is_empty());
    }

    #[test]
    fn test_detect_cycles_finds_two_cycle_once() {
        let parents = vec![Some(1), Some(0)];
        assert_eq!(detect_cycles(&parents), vec![vec![0, 1]]);
    }

    #[test]
    fn test_detect_cycles_reports_only_the_loop_not_the_tail() {
        // 0 -> 1 -> 2 -> 3 -> 1
        let parents = vec![Some(1), Some(2), Some(3), Some(1)];
        assert_eq!(detect_cycles(&parents), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_detect_cycles_finds_disjoint_cycles() {
        let parents = vec![Some(1), Some(0), None, Some(4), Some(3)];
        assert_eq!(detect_cycles(&parents), vec![vec![0, 1], vec![3, 4]]);
    }

    #[test]
    fn test_cycle_policy_round_trip_through_str() {
        assert_eq!("unlink".parse::<CyclePolicy>(), Ok(CyclePolicy::Unlink));
        assert_eq!(CyclePolicy::Reject.to_string(), "reject");
        assert!("ignore".parse::<CyclePolicy>().is_err());
    }
}
