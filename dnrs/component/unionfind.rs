use rustc_hash::FxHashMap;

use crate::network::Element;

/// Disjoint-set structure over network elements.
///
/// Clustering only: no ranking, no removals. Elements must be inserted
/// before they participate in `find` or `union`.
#[derive(Debug, Default)]
pub struct UnionFind {
    parent: FxHashMap<Element, Element>,
}

impl UnionFind {
    #[must_use]
    pub fn new() -> UnionFind {
        UnionFind::default()
    }

    pub fn insert(&mut self, element: Element) {
        self.parent.entry(element).or_insert(element);
    }

    /// Representative of the set containing `element`. Compresses the
    /// walked chain.
    pub fn find(&mut self, element: Element) -> Element {
        let mut representative = element;
        while self.parent[&representative] != representative {
            representative = self.parent[&representative];
        }

        let mut current = element;
        while current != representative {
            let next = self.parent[&current];
            self.parent.insert(current, representative);
            current = next;
        }

        representative
    }

    /// Merge the sets containing `a` and `b`.
    pub fn union(&mut self, a: Element, b: Element) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent.insert(root_a, root_b);
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::UnionFind;
    use crate::network::{Element, SectionId, SwitchId};

    fn switch(ordinal: u32) -> Element {
        Element::Switch(SwitchId(ordinal))
    }

    fn section(ordinal: u32) -> Element {
        Element::Section(SectionId(ordinal))
    }

    #[test]
    fn singletons_are_their_own_representative() {
        let mut uf = UnionFind::new();
        uf.insert(switch(1));
        uf.insert(section(1));
        assert_eq!(uf.find(switch(1)), switch(1));
        assert_eq!(uf.find(section(1)), section(1));
    }

    #[test]
    fn union_merges_transitively() {
        let mut uf = UnionFind::new();
        for ordinal in 1..=4 {
            uf.insert(switch(ordinal));
        }
        uf.union(switch(1), switch(2));
        uf.union(switch(3), switch(4));
        assert_ne!(uf.find(switch(1)), uf.find(switch(3)));

        uf.union(switch(2), switch(3));
        let representative = uf.find(switch(1));
        for ordinal in 2..=4 {
            assert_eq!(uf.find(switch(ordinal)), representative);
        }
    }

    #[test]
    fn reinsertion_keeps_membership() {
        let mut uf = UnionFind::new();
        uf.insert(switch(1));
        uf.insert(switch(2));
        uf.union(switch(1), switch(2));
        uf.insert(switch(1));
        assert_eq!(uf.find(switch(1)), uf.find(switch(2)));
    }
}
