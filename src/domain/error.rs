//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations found while resolving a record set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("cyclic parent reference: {}", render_cycle(.cycle))]
    CyclicReference { cycle: Vec<String> },
}

fn render_cycle(cycle: &[String]) -> String {
    let mut chain = cycle.join(" -> ");
    if let Some(first) = cycle.first() {
        chain.push_str(" -> ");
        chain.push_str(first);
    }
    chain
}
