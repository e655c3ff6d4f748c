//! The weighted decision graph linking component sub-problems.
use std::collections::BTreeSet;

use petgraph::algo::astar;
use petgraph::graphmap::DiGraphMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bdd::{NodeId, NodeStore};
use crate::component::Component;
use crate::error::ConsistencyError;
use crate::network::{Element, Loss, Network, SectionId, SwitchId};
use crate::optimize::enumerate::feasible_configs;

/// Weight and switch configuration of one decision-graph edge.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecisionEdge {
    pub(crate) loss: Loss,
    pub(crate) config: BTreeSet<SwitchId>,
}

/// Per-pass memoization of component losses, keyed by the canonical
/// (sorted) closed-switch set. Each distinct set is evaluated at most once.
#[derive(Debug, Default)]
pub(crate) struct LossCache {
    entries: FxHashMap<Vec<SwitchId>, Loss>,
}

impl LossCache {
    pub(crate) fn get_or_compute(
        &mut self,
        closed: &BTreeSet<SwitchId>,
        compute: impl FnOnce() -> Loss,
    ) -> Loss {
        let key: Vec<SwitchId> = closed.iter().copied().collect();
        *self.entries.entry(key).or_insert_with(compute)
    }
}

/// Directed graph over BDD entry/exit nodes, built one component at a time.
/// Read-only once the shortest-path query runs.
pub(crate) struct DecisionGraph {
    graph: DiGraphMap<NodeId, DecisionEdge>,
}

impl DecisionGraph {
    pub(crate) fn new() -> DecisionGraph {
        DecisionGraph {
            graph: DiGraphMap::new(),
        }
    }

    /// Record an edge, keeping the cheapest candidate per `(entry, exit)`
    /// pair. Ties keep the first-seen configuration.
    pub(crate) fn add_edge(&mut self, entry: NodeId, exit: NodeId, edge: DecisionEdge) {
        match self.graph.edge_weight(entry, exit) {
            Some(existing) if existing.loss <= edge.loss => {}
            _ => {
                self.graph.add_edge(entry, exit, edge);
            }
        }
    }

    pub(crate) fn edge(&self, entry: NodeId, exit: NodeId) -> Option<&DecisionEdge> {
        self.graph.edge_weight(entry, exit)
    }

    /// Expand every entry node of the frontier through `component`,
    /// producing the next frontier.
    pub(crate) fn expand_component(
        &mut self,
        network: &Network,
        store: &NodeStore,
        entries: &BTreeSet<NodeId>,
        component: &Component,
    ) -> Result<BTreeSet<NodeId>, ConsistencyError> {
        let component_roots = component_roots(network, component)?;

        let mut cache = LossCache::default();
        let mut next_entries = BTreeSet::new();
        for &entry in entries {
            for (closed, exit) in feasible_configs(store, entry, component, &BTreeSet::new())? {
                next_entries.insert(exit);
                let loss = cache.get_or_compute(&closed, || {
                    component_loss(network, &component_roots, &closed)
                });
                self.add_edge(
                    entry,
                    exit,
                    DecisionEdge {
                        loss,
                        config: closed,
                    },
                );
            }
        }

        debug!(
            entries = entries.len(),
            exits = next_entries.len(),
            "expanded component"
        );
        Ok(next_entries)
    }

    /// Cheapest path from `start` to `goal`. Weights are non-negative, so
    /// `astar` with a zero estimate is a Dijkstra search that also recovers
    /// the path.
    pub(crate) fn shortest_path(
        &self,
        start: NodeId,
        goal: NodeId,
    ) -> Result<(Loss, Vec<NodeId>), ConsistencyError> {
        astar(
            &self.graph,
            start,
            |node| node == goal,
            |(_, _, edge)| edge.loss,
            |_| Loss::default(),
        )
        .ok_or(ConsistencyError::UnreachableTerminal)
    }
}

/// `(boundary section, barrier)` pairs describing where `component` hangs
/// off a substation-fed section. The barrier is every section neighbor of
/// the boundary section; treating those as open circuit isolates the
/// component for loss evaluation.
fn component_roots(
    network: &Network,
    component: &Component,
) -> Result<Vec<(SectionId, BTreeSet<SectionId>)>, ConsistencyError> {
    let mut component_roots = Vec::new();
    for section in component.sections() {
        let neighbors = network.neighbors(Element::Section(section));
        let section_neighbors: BTreeSet<SectionId> = neighbors
            .iter()
            .filter_map(|neighbor| neighbor.as_section())
            .collect();
        let feeds_from_substation = section_neighbors
            .iter()
            .any(|s| network.section(*s).is_some_and(|sec| sec.substation));
        if !feeds_from_substation {
            continue;
        }
        if network.section(section).is_some_and(|sec| sec.substation) {
            return Err(ConsistencyError::SubstationInsideComponent(section));
        }
        component_roots.push((section, section_neighbors));
    }
    Ok(component_roots)
}

/// Loss of a component configuration: evaluated independently per boundary
/// root and summed.
fn component_loss(
    network: &Network,
    component_roots: &[(SectionId, BTreeSet<SectionId>)],
    closed: &BTreeSet<SwitchId>,
) -> Loss {
    let mut total = Loss::default();
    for (root, barrier) in component_roots {
        total += network.loss(*root, closed, barrier);
    }
    total
}
