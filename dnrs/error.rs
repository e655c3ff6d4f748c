//! Fatal precondition violations.
//!
//! The network/BDD pair is assumed internally consistent. Every variant here
//! means the input is malformed and the run must abort; there is no partial
//! failure or retry semantics anywhere in the crate.
use thiserror::Error;

use crate::bdd::NodeId;
use crate::network::{SectionId, SwitchId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("root section {root} is adjacent to {switch}; root sections may join only other sections")]
    RootTouchesSwitch { root: SectionId, switch: SwitchId },

    #[error("independent components cover {covered} elements but the network has {expected} switches and non-root sections")]
    ComponentCoverage { covered: usize, expected: usize },

    #[error("switch ordinals interleave across components: {switch} follows a component ending at {previous}")]
    UnorderedComponents {
        switch: SwitchId,
        previous: SwitchId,
    },

    #[error("{0} lies inside a component but is flagged as a substation")]
    SubstationInsideComponent(SectionId),

    #[error("closing {0} reaches the infeasible sink; the diagram admits no feasible closed branch for it")]
    InfeasibleClosedBranch(SwitchId),

    #[error("BDD node {0} is not present in the store")]
    UnknownNode(NodeId),

    #[error("the satisfied terminal is unreachable from the top decision node")]
    UnreachableTerminal,
}
