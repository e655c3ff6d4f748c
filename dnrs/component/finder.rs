use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::component::UnionFind;
use crate::error::ConsistencyError;
use crate::network::{Element, Network, SectionId, SwitchId};

/// One independent component: a cluster of switches plus the sections around
/// them that can be optimized without reference to any other component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    members: BTreeSet<Element>,
}

impl Component {
    pub(crate) fn new(members: BTreeSet<Element>) -> Component {
        Component { members }
    }

    #[must_use]
    pub fn members(&self) -> &BTreeSet<Element> {
        &self.members
    }

    #[must_use]
    pub fn contains_switch(&self, switch: SwitchId) -> bool {
        self.members.contains(&Element::Switch(switch))
    }

    pub fn switches(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.members.iter().filter_map(|member| member.as_switch())
    }

    pub fn sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.members.iter().filter_map(|member| member.as_section())
    }
}

/// Partition switches and non-root sections into ordered independent
/// components.
///
/// Two phases: first, union-find clustering over all junctions that do not
/// touch a root section; second, a widening pass that keys groups by their
/// switches (in ascending ordinal order) and extends each group with the
/// full neighborhood of every switch in it, capturing boundary elements
/// shared with adjacent sections.
pub fn find_components(network: &Network) -> Result<Vec<Component>, ConsistencyError> {
    let roots = network.root_sections();
    for root in &roots {
        for neighbor in network.neighbors(Element::Section(*root)) {
            if let Element::Switch(switch) = neighbor {
                return Err(ConsistencyError::RootTouchesSwitch {
                    root: *root,
                    switch,
                });
            }
        }
    }

    let mut elements: BTreeSet<Element> = network.switch_ids().map(Element::Switch).collect();
    elements.extend(
        network
            .section_ids()
            .filter(|section| !roots.contains(section))
            .map(Element::Section),
    );

    // phase one: cluster everything that touches without crossing a root
    let mut uf = UnionFind::new();
    for element in &elements {
        uf.insert(*element);
    }
    for element in &elements {
        let mut neighborhood: BTreeSet<Element> = BTreeSet::new();
        for junction in network.junctions() {
            if !junction.contains(element) {
                continue;
            }
            let touches_root = junction
                .iter()
                .any(|member| member.as_section().is_some_and(|s| roots.contains(&s)));
            if touches_root {
                continue;
            }
            neighborhood.extend(junction.iter().copied());
        }
        neighborhood.remove(element);
        for neighbor in neighborhood {
            uf.union(*element, neighbor);
        }
    }

    // phase two: group switches by representative, then widen each group
    // with the neighborhoods of its switches
    let mut next_ordinal = 0_usize;
    let mut groups: BTreeMap<Element, (usize, BTreeSet<Element>)> = BTreeMap::new();
    for switch in network.switch_ids() {
        let representative = uf.find(Element::Switch(switch));
        let (_, members) = groups.entry(representative).or_insert_with(|| {
            next_ordinal += 1;
            (next_ordinal, BTreeSet::new())
        });
        members.insert(Element::Switch(switch));
        members.extend(network.neighbors(Element::Switch(switch)));
    }

    let mut components: Vec<(usize, BTreeSet<Element>)> = groups.into_values().collect();
    components.sort_by_key(|(ordinal, _)| *ordinal);

    let covered: usize = components.iter().map(|(_, members)| members.len()).sum();
    let union: BTreeSet<Element> = components
        .iter()
        .flat_map(|(_, members)| members.iter().copied())
        .collect();
    if covered != elements.len() || union != elements {
        return Err(ConsistencyError::ComponentCoverage {
            covered,
            expected: elements.len(),
        });
    }

    // switch ordinal ranges must be strictly increasing across components
    let mut previous: Option<SwitchId> = None;
    for (_, members) in &components {
        let switches: Vec<SwitchId> = members
            .iter()
            .filter_map(|member| member.as_switch())
            .collect();
        let first = switches[0];
        let last = switches[switches.len() - 1];
        if let Some(previous) = previous {
            if first <= previous {
                return Err(ConsistencyError::UnorderedComponents {
                    switch: first,
                    previous,
                });
            }
        }
        previous = Some(last);
    }

    debug!(components = components.len(), "partitioned network");
    Ok(components
        .into_iter()
        .map(|(_, members)| Component::new(members))
        .collect())
}
