//! Staged construction of the decision graph and the final search.
use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::bdd::{NodeStore, TOP};
use crate::btreeset;
use crate::component::find_components;
use crate::error::ConsistencyError;
use crate::network::{Loss, Network, SwitchId};
use crate::optimize::graph::DecisionGraph;
use crate::optimize::report::Solution;

/// One optimization run over an explicit network/diagram pair.
///
/// Holds references only; all intermediate state (decision graph, loss
/// caches, enumeration results) is scoped to [`Optimizer::run`] and dropped
/// when it returns.
pub struct Optimizer<'a> {
    network: &'a Network,
    store: &'a NodeStore,
}

impl<'a> Optimizer<'a> {
    #[must_use]
    pub fn new(network: &'a Network, store: &'a NodeStore) -> Optimizer<'a> {
        Optimizer { network, store }
    }

    /// Compute the closed-switch set with minimal total resistive loss.
    ///
    /// Components are processed in finder order, threading the frontier of
    /// BDD entry nodes from the top decision node down; the completed
    /// decision graph is then queried for the cheapest path to the
    /// satisfied terminal.
    #[instrument(skip_all)]
    pub fn run(&self) -> Result<Solution, ConsistencyError> {
        let components = find_components(self.network)?;
        let root = self.store.root();

        let mut graph = DecisionGraph::new();
        let mut entries = btreeset!(root);
        for component in &components {
            entries = graph.expand_component(self.network, self.store, &entries, component)?;
        }

        let (feeder_loss, path) = graph.shortest_path(root, TOP)?;

        let mut closed: BTreeSet<SwitchId> = BTreeSet::new();
        for pair in path.windows(2) {
            let edge = graph.edge(pair[0], pair[1]).unwrap_or_else(|| {
                panic!("path edge {} -> {} missing from decision graph", pair[0], pair[1])
            });
            closed.extend(edge.config.iter().copied());
        }

        let mut minimum_loss = Loss::default();
        for root_section in self.network.root_sections() {
            minimum_loss += self
                .network
                .loss(root_section, &closed, &BTreeSet::new());
        }

        debug!(
            closed = closed.len(),
            feeder_loss = feeder_loss.0,
            minimum_loss = minimum_loss.0,
            "optimization finished"
        );
        Ok(Solution::new(self.network, minimum_loss, feeder_loss, closed))
    }
}
