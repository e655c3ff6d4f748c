use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Display;

use derive_more::derive::{Add, AddAssign, From};
use num_complex::Complex64;
use rustc_hash::FxHashMap;

use crate::btreeset;

/// Ordinal of a switch. Matches the decision-variable index of the BDD:
/// variable `k` decides `switch_k`.
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Debug, Hash, From)]
pub struct SwitchId(pub u32);

impl Display for SwitchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "switch_{:04}", self.0)
    }
}

/// Identifier of a line section.
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Debug, Hash, From)]
pub struct SectionId(pub u32);

impl Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "section_{:04}", self.0)
    }
}

/// A network element: a line section or a controllable switch.
///
/// The derived order puts sections before switches; the component finder
/// relies on this when it walks elements in a stable order.
#[derive(PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Debug, Hash, From)]
pub enum Element {
    Section(SectionId),
    Switch(SwitchId),
}

impl Element {
    #[must_use]
    pub fn as_section(self) -> Option<SectionId> {
        match self {
            Element::Section(id) => Some(id),
            Element::Switch(_) => None,
        }
    }

    #[must_use]
    pub fn as_switch(self) -> Option<SwitchId> {
        match self {
            Element::Section(_) => None,
            Element::Switch(id) => Some(id),
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Section(id) => id.fmt(f),
            Element::Switch(id) => id.fmt(f),
        }
    }
}

/// Total resistive power loss, in the units implied by the input data.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, From, Add, AddAssign)]
pub struct Loss(pub f64);

/// One line section: per-phase load current and complex line impedance.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Substation-connected sections are the roots of the network.
    pub substation: bool,
    pub load: [f64; 3],
    pub impedance: [Complex64; 3],
}

/// A controllable switch. The external numbering, when present, is used
/// only for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Switch {
    pub original_number: Option<u32>,
}

/// The static network: read-only once built.
///
/// Topology is kept as *junctions*: each junction is the set of elements
/// electrically joined at one point, and two elements are adjacent iff they
/// share a junction.
#[derive(Debug, Default)]
pub struct Network {
    sections: BTreeMap<SectionId, Section>,
    switches: BTreeMap<SwitchId, Switch>,
    junctions: Vec<BTreeSet<Element>>,
}

impl Network {
    #[must_use]
    pub fn new() -> Network {
        Network::default()
    }

    pub fn add_section(&mut self, id: SectionId, section: Section) {
        self.sections.insert(id, section);
    }

    pub fn add_switch(&mut self, id: SwitchId, switch: Switch) {
        self.switches.insert(id, switch);
    }

    pub fn add_junction(&mut self, elements: impl IntoIterator<Item = Element>) {
        self.junctions.push(elements.into_iter().collect());
    }

    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    #[must_use]
    pub fn switch(&self, id: SwitchId) -> Option<&Switch> {
        self.switches.get(&id)
    }

    #[must_use]
    pub fn contains(&self, element: Element) -> bool {
        match element {
            Element::Section(id) => self.sections.contains_key(&id),
            Element::Switch(id) => self.switches.contains_key(&id),
        }
    }

    pub fn sections(&self) -> impl Iterator<Item = (SectionId, &Section)> {
        self.sections.iter().map(|(id, section)| (*id, section))
    }

    pub fn section_ids(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.sections.keys().copied()
    }

    pub fn switch_ids(&self) -> impl Iterator<Item = SwitchId> + '_ {
        self.switches.keys().copied()
    }

    #[must_use]
    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn junctions(&self) -> &[BTreeSet<Element>] {
        &self.junctions
    }

    /// Substation-connected sections. These partition the rest of the
    /// network into candidate independent components.
    #[must_use]
    pub fn root_sections(&self) -> BTreeSet<SectionId> {
        self.sections
            .iter()
            .filter(|(_, section)| section.substation)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every element sharing a junction with `element`.
    #[must_use]
    pub fn neighbors(&self, element: Element) -> BTreeSet<Element> {
        let mut neighbors = BTreeSet::new();
        for junction in &self.junctions {
            if junction.contains(&element) {
                neighbors.extend(junction.iter().copied());
            }
        }
        neighbors.remove(&element);
        neighbors
    }

    /// Resistive loss of the subtree energized from `root` under the given
    /// closed-switch set.
    ///
    /// Energization crosses a switch only when it is closed and never enters
    /// a section in `barrier`; barrier sections act as open circuits, which
    /// is how a component is evaluated in isolation from its siblings. The
    /// per-phase current through a section is its own load plus everything
    /// fed through it downstream, and each section dissipates
    /// `current^2 * Re(impedance)` per phase.
    #[must_use]
    pub fn loss(
        &self,
        root: SectionId,
        closed: &BTreeSet<SwitchId>,
        barrier: &BTreeSet<SectionId>,
    ) -> Loss {
        let (order, parent) = self.energize(root, closed, barrier);

        let mut downstream: FxHashMap<SectionId, [f64; 3]> = order
            .iter()
            .map(|id| (*id, self.sections[id].load))
            .collect();
        for id in order.iter().rev() {
            let Some(up) = parent.get(id).copied() else {
                continue;
            };
            let feed = downstream[id];
            if let Some(through) = downstream.get_mut(&up) {
                for phase in 0..3 {
                    through[phase] += feed[phase];
                }
            }
        }

        let mut loss = Loss::default();
        for id in &order {
            let section = &self.sections[id];
            let current = downstream[id];
            for phase in 0..3 {
                loss += Loss(current[phase].powi(2) * section.impedance[phase].re);
            }
        }
        loss
    }

    /// Breadth-first feeding tree from `root`: visit order plus the parent
    /// section of every fed section. Radiality of the configuration is the
    /// BDD's responsibility; the first path found wins.
    fn energize(
        &self,
        root: SectionId,
        closed: &BTreeSet<SwitchId>,
        barrier: &BTreeSet<SectionId>,
    ) -> (Vec<SectionId>, FxHashMap<SectionId, SectionId>) {
        let mut order = Vec::new();
        let mut parent = FxHashMap::default();
        let mut visited: BTreeSet<Element> = btreeset!(Element::Section(root));
        let mut queue: VecDeque<SectionId> = VecDeque::from([root]);

        let feed = |from: SectionId,
                    to: Element,
                    visited: &mut BTreeSet<Element>,
                    parent: &mut FxHashMap<SectionId, SectionId>,
                    queue: &mut VecDeque<SectionId>| {
            let Element::Section(to) = to else { return };
            if visited.contains(&Element::Section(to)) || barrier.contains(&to) {
                return;
            }
            visited.insert(Element::Section(to));
            parent.insert(to, from);
            queue.push_back(to);
        };

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for neighbor in self.neighbors(Element::Section(id)) {
                if visited.contains(&neighbor) {
                    continue;
                }
                match neighbor {
                    Element::Section(_) => {
                        feed(id, neighbor, &mut visited, &mut parent, &mut queue);
                    }
                    Element::Switch(switch) => {
                        if !closed.contains(&switch) {
                            continue;
                        }
                        visited.insert(neighbor);
                        for far in self.neighbors(neighbor) {
                            feed(id, far, &mut visited, &mut parent, &mut queue);
                        }
                    }
                }
            }
        }

        (order, parent)
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use num_complex::Complex64;
    use pretty_assertions::assert_eq;

    use super::{Element, Loss, Network, Section, SectionId, Switch, SwitchId};
    use crate::btreeset;

    fn section(load: f64, resistance: f64) -> Section {
        Section {
            substation: false,
            load: [load; 3],
            impedance: [Complex64::new(resistance, 0.12); 3],
        }
    }

    fn substation(resistance: f64) -> Section {
        Section {
            substation: true,
            ..section(0.0, resistance)
        }
    }

    /// `root -- a -- w1 -- b`: one feeder behind one switch.
    fn chain() -> Network {
        let mut network = Network::new();
        network.add_section(SectionId(1), substation(0.05));
        network.add_section(SectionId(2), section(1.0, 0.1));
        network.add_section(SectionId(3), section(2.0, 0.2));
        network.add_switch(SwitchId(1), Switch::default());
        network.add_junction([
            Element::Section(SectionId(1)),
            Element::Section(SectionId(2)),
        ]);
        network.add_junction([Element::Section(SectionId(2)), Element::Switch(SwitchId(1))]);
        network.add_junction([Element::Switch(SwitchId(1)), Element::Section(SectionId(3))]);
        network
    }

    fn phases(per_phase: f64) -> Loss {
        Loss(per_phase * 3.0)
    }

    fn assert_close(actual: Loss, expected: Loss) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn neighbors_via_junctions() {
        let network = chain();
        assert_eq!(
            network.neighbors(Element::Section(SectionId(2))),
            btreeset!(
                Element::Section(SectionId(1)),
                Element::Switch(SwitchId(1))
            )
        );
        assert_eq!(
            network.neighbors(Element::Switch(SwitchId(1))),
            btreeset!(
                Element::Section(SectionId(2)),
                Element::Section(SectionId(3))
            )
        );
    }

    #[test]
    fn root_sections_are_substation_flagged() {
        let network = chain();
        assert_eq!(network.root_sections(), btreeset!(SectionId(1)));
    }

    #[test]
    fn loss_of_fully_closed_chain() {
        let network = chain();
        let closed = btreeset!(SwitchId(1));
        // current: root 3.0, a 3.0, b 2.0 per phase
        let expected = phases(3.0 * 3.0 * 0.05 + 3.0 * 3.0 * 0.1 + 2.0 * 2.0 * 0.2);
        assert_close(network.loss(SectionId(1), &closed, &BTreeSet::new()), expected);
    }

    #[test]
    fn open_switch_cuts_the_feed() {
        let network = chain();
        // only root and a are fed; b hangs dead behind the open switch
        let expected = phases(1.0 * 1.0 * 0.05 + 1.0 * 1.0 * 0.1);
        assert_close(
            network.loss(SectionId(1), &BTreeSet::new(), &BTreeSet::new()),
            expected,
        );
    }

    #[test]
    fn barrier_sections_are_open_circuit() {
        let network = chain();
        let closed = btreeset!(SwitchId(1));
        let barrier = btreeset!(SectionId(1));
        // evaluated from a with the root barred: a feeds itself and b
        let expected = phases(3.0 * 3.0 * 0.1 + 2.0 * 2.0 * 0.2);
        assert_close(network.loss(SectionId(2), &closed, &barrier), expected);
    }
}
