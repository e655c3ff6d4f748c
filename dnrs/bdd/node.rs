use std::fmt::Display;

use derive_more::derive::From;

use crate::network::SwitchId;

/// Identifier of a BDD node as it appears in the input text.
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Debug, Hash, From)]
pub struct NodeId(pub u64);

/// The infeasible terminal: no assignment below it keeps the network radial.
pub const SINK: NodeId = NodeId(0);

/// The always-satisfied terminal: every constraint is already met.
pub const TOP: NodeId = NodeId(1);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decision node: branch on the state of a single switch.
///
/// Children are referenced by id, not by owning pointer; the diagram is an
/// acyclic but heavily shared DAG, so nodes live in the
/// [`crate::bdd::NodeStore`] arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BddNode {
    pub id: NodeId,
    /// Decision-variable index; variable `k` decides switch ordinal `k`.
    pub variable: u32,
    /// Child taken when the switch stays open.
    pub low: NodeId,
    /// Child taken when the switch is closed.
    pub high: NodeId,
}

impl BddNode {
    /// The switch this node decides on.
    #[must_use]
    pub fn switch(&self) -> SwitchId {
        SwitchId(self.variable)
    }
}

impl Display for BddNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: (~{}?{}:{})",
            self.id, self.variable, self.low, self.high
        )
    }
}
