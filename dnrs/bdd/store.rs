//! Arena of parsed BDD nodes, indexed by id.
use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bdd::{BddNode, NodeId, SINK, TOP};
use crate::error::ConsistencyError;

/// Immutable lookup of BDD nodes.
///
/// The satisfied terminal is pre-seeded as `1: (~0?1:1)` before parsing; the
/// infeasible sink `0` is implicit and never stored. The *root* is the node
/// deciding variable 1, i.e. the top decision of the diagram.
#[derive(Debug)]
pub struct NodeStore {
    nodes: FxHashMap<NodeId, BddNode>,
    root: NodeId,
}

impl NodeStore {
    /// Parse a node list, one node per line: `ID: (~VAR?LOW:HIGH)`.
    ///
    /// Tokenization is lenient: any run of non-alphanumeric characters
    /// separates fields, so plain `ID VAR LOW HIGH` lines parse as well.
    pub fn from_reader(reader: &mut dyn std::io::BufRead) -> Result<NodeStore> {
        let mut nodes = FxHashMap::default();
        nodes.insert(
            TOP,
            BddNode {
                id: TOP,
                variable: 0,
                low: TOP,
                high: TOP,
            },
        );

        let mut root = None;
        let mut lineno = 0_usize;
        loop {
            lineno += 1;
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(err) => bail!("could not read line {lineno}: {err}"),
            }
            if line.trim().is_empty() {
                continue;
            }
            let node =
                parse_node(&line).with_context(|| format!("malformed node on line {lineno}"))?;
            if node.variable == 1 {
                root = Some(node.id);
            }
            nodes.insert(node.id, node);
        }

        let Some(root) = root else {
            bail!("no node decides variable 1; cannot locate the top decision node");
        };

        debug!(nodes = nodes.len(), root = root.0, "parsed BDD node store");
        Ok(NodeStore { nodes, root })
    }

    /// Build a store directly from nodes; the root is the node deciding
    /// variable 1.
    #[cfg(test)]
    pub(crate) fn with_nodes(nodes: impl IntoIterator<Item = BddNode>) -> NodeStore {
        let mut table = FxHashMap::default();
        table.insert(
            TOP,
            BddNode {
                id: TOP,
                variable: 0,
                low: TOP,
                high: TOP,
            },
        );
        let mut root = None;
        for node in nodes {
            if node.variable == 1 {
                root = Some(node.id);
            }
            table.insert(node.id, node);
        }
        NodeStore {
            nodes: table,
            root: root.expect("a node deciding variable 1 must be present"),
        }
    }

    /// The top decision node of the diagram.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Result<&BddNode, ConsistencyError> {
        self.nodes.get(&id).ok_or(ConsistencyError::UnknownNode(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn parse_node(line: &str) -> Result<BddNode> {
    let fields: Vec<&str> = line
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|field| !field.is_empty())
        .collect();
    if fields.len() < 4 {
        bail!("node record '{line}' must contain id, variable, low and high fields");
    }

    let mut numbers = [0_u64; 4];
    for (at, field) in fields[..4].iter().enumerate() {
        numbers[at] = match field.parse::<u64>() {
            Ok(number) => number,
            Err(err) => bail!("could not parse field '{field}': {err}"),
        };
    }

    let id = NodeId(numbers[0]);
    if id == SINK {
        bail!("node id 0 is reserved for the infeasible sink");
    }

    Ok(BddNode {
        id,
        variable: u32::try_from(numbers[1]).context("variable index does not fit in 32 bits")?,
        low: NodeId(numbers[2]),
        high: NodeId(numbers[3]),
    })
}
