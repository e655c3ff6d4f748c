//! Enumeration of feasible switch configurations within one component.
use std::collections::BTreeSet;

use crate::bdd::{NodeId, NodeStore, SINK};
use crate::component::Component;
use crate::error::ConsistencyError;
use crate::network::SwitchId;

/// All `(closed switches, exit node)` pairs reachable from `entry` while
/// deciding only switches belonging to `component`.
///
/// A node deciding a switch outside the component is outside this
/// sub-problem's jurisdiction and becomes an *exit*: the configuration
/// accumulated so far is emitted unchanged. For an internal node the open
/// branch is taken unless it leads to the infeasible sink, and the closed
/// branch is always taken; a closed branch into the sink means the diagram
/// is not a radiality diagram and aborts the run.
///
/// Deterministic and exhaustive: results come out in BDD traversal order,
/// open branches before closed ones. Worst case is exponential in the
/// component's switch count, bounded in practice by BDD sharing and by
/// components being small.
pub(crate) fn feasible_configs(
    store: &NodeStore,
    entry: NodeId,
    component: &Component,
    closed: &BTreeSet<SwitchId>,
) -> Result<Vec<(BTreeSet<SwitchId>, NodeId)>, ConsistencyError> {
    let node = store.get(entry)?;
    if !component.contains_switch(node.switch()) {
        return Ok(vec![(closed.clone(), entry)]);
    }

    let mut configs = Vec::new();
    if node.low != SINK {
        configs.extend(feasible_configs(store, node.low, component, closed)?);
    }

    if node.high == SINK {
        return Err(ConsistencyError::InfeasibleClosedBranch(node.switch()));
    }
    let mut with_closed = closed.clone();
    with_closed.insert(node.switch());
    configs.extend(feasible_configs(store, node.high, component, &with_closed)?);

    Ok(configs)
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::feasible_configs;
    use crate::bdd::{BddNode, NodeId, NodeStore, TOP};
    use crate::btreeset;
    use crate::component::Component;
    use crate::error::ConsistencyError;
    use crate::network::{Element, SwitchId};

    fn node(id: u64, variable: u32, low: u64, high: u64) -> BddNode {
        BddNode {
            id: NodeId(id),
            variable,
            low: NodeId(low),
            high: NodeId(high),
        }
    }

    fn component(switches: &[u32]) -> Component {
        Component::new(
            switches
                .iter()
                .map(|ordinal| Element::Switch(SwitchId(*ordinal)))
                .collect(),
        )
    }

    #[test]
    fn node_outside_component_is_an_exit() {
        let store = NodeStore::with_nodes([node(10, 1, 11, 12), node(11, 2, 0, 1)]);
        let comp = component(&[1]);

        let configs =
            feasible_configs(&store, NodeId(11), &comp, &BTreeSet::new()).unwrap();
        assert_eq!(configs, vec![(BTreeSet::new(), NodeId(11))]);
    }

    #[test]
    fn enumerates_open_and_closed_branches() {
        // at least one of w1, w2 must close
        let store = NodeStore::with_nodes([
            node(10, 1, 11, 12),
            node(11, 2, 0, 1),
            node(12, 2, 1, 1),
        ]);
        let comp = component(&[1, 2]);

        let configs =
            feasible_configs(&store, NodeId(10), &comp, &BTreeSet::new()).unwrap();
        assert_eq!(
            configs,
            vec![
                (btreeset!(SwitchId(2)), TOP),
                (btreeset!(SwitchId(1)), TOP),
                (btreeset!(SwitchId(1), SwitchId(2)), TOP),
            ]
        );
    }

    #[test]
    fn enumeration_is_deterministic() {
        let store = NodeStore::with_nodes([
            node(10, 1, 11, 12),
            node(11, 2, 0, 1),
            node(12, 2, 1, 1),
        ]);
        let comp = component(&[1, 2]);

        let first = feasible_configs(&store, NodeId(10), &comp, &BTreeSet::new()).unwrap();
        let second = feasible_configs(&store, NodeId(10), &comp, &BTreeSet::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn closed_branch_into_sink_is_fatal() {
        // "exactly one of two" necessarily sends w1-closed, w2-closed to
        // the sink
        let store = NodeStore::with_nodes([
            node(10, 1, 11, 12),
            node(11, 2, 0, 1),
            node(12, 2, 1, 0),
        ]);
        let comp = component(&[1, 2]);

        assert_eq!(
            feasible_configs(&store, NodeId(10), &comp, &BTreeSet::new()).unwrap_err(),
            ConsistencyError::InfeasibleClosedBranch(SwitchId(2))
        );
    }

    #[test]
    fn accumulated_switches_are_not_shared_across_branches() {
        // after exploring the closed branch of w1, the open branch of the
        // sibling must not see w1 in its configuration
        let store = NodeStore::with_nodes([
            node(10, 1, 11, 12),
            node(11, 2, 1, 1),
            node(12, 2, 1, 1),
        ]);
        let comp = component(&[1, 2]);

        let configs =
            feasible_configs(&store, NodeId(10), &comp, &BTreeSet::new()).unwrap();
        assert_eq!(
            configs,
            vec![
                (BTreeSet::new(), TOP),
                (btreeset!(SwitchId(2)), TOP),
                (btreeset!(SwitchId(1)), TOP),
                (btreeset!(SwitchId(1), SwitchId(2)), TOP),
            ]
        );
    }
}
