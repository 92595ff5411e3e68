//! Alignment container: ordered mappings with complexity partitions and
//! per-entity lookup indices.
//!
//! Indices store positions into the insertion-ordered mapping list, so
//! iteration order is stable and a lookup never clones a mapping.

use crate::entity::EntityId;
use crate::mapping::{Mapping, MappingKey, MappingRelation};
use crate::ontology::{RelationGraph, SimpleAlignment};
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct Alignment {
    mappings: Vec<Mapping>,
    positions: AHashMap<MappingKey, usize>,
    simple: Vec<usize>,
    complex: Vec<usize>,
    /// atomic entity id -> positions of mappings mentioning it in entity1
    by_source: AHashMap<EntityId, Vec<usize>>,
    /// atomic entity id -> positions of mappings mentioning it in entity2
    by_target: AHashMap<EntityId, Vec<usize>>,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `mapping`, returning `true` if it was new.
    ///
    /// A mapping with the same identity is absorbed: the held similarity is
    /// raised to the incoming one if that is higher, and never lowered.
    pub fn add(&mut self, mapping: Mapping) -> bool {
        if let Some(&pos) = self.positions.get(mapping.key()) {
            let held = &mut self.mappings[pos];
            if mapping.similarity() > held.similarity() {
                tracing::trace!(
                    mapping = %mapping,
                    previous = held.similarity(),
                    "duplicate mapping raised similarity"
                );
            }
            held.raise_similarity(mapping.similarity());
            return false;
        }

        let pos = self.mappings.len();
        if mapping.is_simple() {
            self.simple.push(pos);
        } else {
            self.complex.push(pos);
        }
        for id in mapping.entity1().atomic_entities() {
            self.by_source.entry(id.clone()).or_default().push(pos);
        }
        for id in mapping.entity2().atomic_entities() {
            self.by_target.entry(id.clone()).or_default().push(pos);
        }
        self.positions.insert(mapping.key().clone(), pos);
        self.mappings.push(mapping);
        true
    }

    pub fn add_all<I>(&mut self, mappings: I)
    where
        I: IntoIterator<Item = Mapping>,
    {
        for mapping in mappings {
            self.add(mapping);
        }
    }

    pub fn contains(&self, mapping: &Mapping) -> bool {
        self.positions.contains_key(mapping.key())
    }

    pub fn contains_key(&self, key: &MappingKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn position(&self, key: &MappingKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn mapping(&self, pos: usize) -> Option<&Mapping> {
        self.mappings.get(pos)
    }

    pub fn similarity_of(&self, key: &MappingKey) -> Option<f64> {
        self.position(key).map(|pos| self.mappings[pos].similarity())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mapping> {
        self.mappings.iter()
    }

    pub fn simple_mappings(&self) -> impl Iterator<Item = &Mapping> + '_ {
        self.simple.iter().map(|&pos| &self.mappings[pos])
    }

    pub fn complex_mappings(&self) -> impl Iterator<Item = &Mapping> + '_ {
        self.complex.iter().map(|&pos| &self.mappings[pos])
    }

    pub fn simple_len(&self) -> usize {
        self.simple.len()
    }

    pub fn complex_len(&self) -> usize {
        self.complex.len()
    }

    /// Positions of mappings whose entity1 mentions `id`, in insertion order.
    pub fn source_positions(&self, id: &EntityId) -> &[usize] {
        self.by_source.get(id).map_or(&[], Vec::as_slice)
    }

    /// Positions of mappings whose entity2 mentions `id`, in insertion order.
    pub fn target_positions(&self, id: &EntityId) -> &[usize] {
        self.by_target.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn mappings_by_source_entity<'a>(
        &'a self,
        id: &EntityId,
    ) -> impl Iterator<Item = &'a Mapping> + 'a {
        let positions = self.source_positions(id);
        positions.iter().map(move |&pos| &self.mappings[pos])
    }

    pub fn mappings_by_target_entity<'a>(
        &'a self,
        id: &EntityId,
    ) -> impl Iterator<Item = &'a Mapping> + 'a {
        let positions = self.target_positions(id);
        positions.iter().map(move |&pos| &self.mappings[pos])
    }

    /// True iff a simple mapping has `id` as its entity1.
    pub fn entity_is_mapped(&self, id: &EntityId) -> bool {
        self.source_positions(id)
            .iter()
            .any(|&pos| self.mappings[pos].is_simple())
    }

    /// True iff a simple mapping has `id` as its entity2.
    pub fn target_is_mapped(&self, id: &EntityId) -> bool {
        self.target_positions(id)
            .iter()
            .any(|&pos| self.mappings[pos].is_simple())
    }

    /// Highest similarity among simple mappings `a -> b`, any relationship.
    pub fn get(&self, a: &EntityId, b: &EntityId) -> Option<f64> {
        self.source_positions(a)
            .iter()
            .map(|&pos| &self.mappings[pos])
            .filter(|m| m.is_simple() && m.entity2().entity_id() == Some(b))
            .map(Mapping::similarity)
            .reduce(f64::max)
    }

    pub fn count_relationship(&self, relationship: MappingRelation) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.relationship() == relationship)
            .count()
    }

    /// Every mapping stated from the other side.
    pub fn reversed(&self) -> Self {
        self.mappings.iter().map(Mapping::reversed).collect()
    }

    /// Views this alignment as a [`SimpleAlignment`] over `graph`.
    pub fn anchored<'a>(&'a self, graph: &'a dyn RelationGraph) -> AnchoredAlignment<'a> {
        AnchoredAlignment {
            alignment: self,
            graph,
        }
    }
}

impl Extend<Mapping> for Alignment {
    fn extend<I: IntoIterator<Item = Mapping>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl FromIterator<Mapping> for Alignment {
    fn from_iter<I: IntoIterator<Item = Mapping>>(iter: I) -> Self {
        let mut alignment = Alignment::new();
        alignment.add_all(iter);
        alignment
    }
}

impl<'a> IntoIterator for &'a Alignment {
    type Item = &'a Mapping;
    type IntoIter = std::slice::Iter<'a, Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Anchored view
// ============================================================================

/// An [`Alignment`] paired with the relation graph needed for
/// ancestor-aware containment queries.
#[derive(Clone, Copy)]
pub struct AnchoredAlignment<'a> {
    alignment: &'a Alignment,
    graph: &'a dyn RelationGraph,
}

impl<'a> AnchoredAlignment<'a> {
    pub fn alignment(&self) -> &'a Alignment {
        self.alignment
    }
}

impl SimpleAlignment for AnchoredAlignment<'_> {
    fn get(&self, a: &EntityId, b: &EntityId) -> Option<f64> {
        self.alignment.get(a, b)
    }

    fn contains_entity(&self, id: &EntityId) -> bool {
        self.alignment.entity_is_mapped(id) || self.alignment.target_is_mapped(id)
    }

    fn contains_ancestral_mapping(&self, a: &EntityId, b: &EntityId) -> bool {
        let mut a_side = self.graph.ancestors(a);
        a_side.insert(a.clone());
        let mut b_side = self.graph.ancestors(b);
        b_side.insert(b.clone());

        a_side.iter().any(|x| {
            b_side
                .iter()
                .filter(|y| !(x == a && *y == b))
                .any(|y| self.links(x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Comparator, Expression};
    use crate::ontology::HierarchyGraph;

    fn simple(a: &str, b: &str, sim: f64) -> Mapping {
        Mapping::equivalence(Expression::class(a), Expression::class(b), sim)
    }

    fn complex(a: &str, p: &str, sim: f64) -> Mapping {
        Mapping::equivalence(
            Expression::class(a),
            Expression::occurrence(Expression::relation(p), Comparator::GreaterThan, 0),
            sim,
        )
    }

    #[test]
    fn test_add_partitions_and_indexes() {
        let mut a = Alignment::new();
        assert!(a.add(simple("s:A", "t:B", 0.9)));
        assert!(a.add(complex("s:Dog", "t:hasPet", 0.7)));

        assert_eq!(a.len(), 2);
        assert_eq!(a.simple_len(), 1);
        assert_eq!(a.complex_len(), 1);
        assert_eq!(a.mappings_by_source_entity(&"s:Dog".into()).count(), 1);
        assert_eq!(a.mappings_by_target_entity(&"t:hasPet".into()).count(), 1);
        assert_eq!(a.mappings_by_target_entity(&"t:nothing".into()).count(), 0);
    }

    #[test]
    fn test_duplicate_is_idempotent_and_only_raises() {
        let mut a = Alignment::new();
        a.add(simple("s:A", "t:B", 0.5));
        assert!(!a.add(simple("s:A", "t:B", 0.8)));
        assert_eq!(a.len(), 1);
        assert_eq!(a.get(&"s:A".into(), &"t:B".into()), Some(0.8));

        a.add(simple("s:A", "t:B", 0.1));
        assert_eq!(a.get(&"s:A".into(), &"t:B".into()), Some(0.8));
        assert_eq!(a.source_positions(&"s:A".into()).len(), 1);
    }

    #[test]
    fn test_similarity_of_tracks_raised_duplicates() {
        let mut a = Alignment::new();
        let dog = complex("s:Dog", "t:hasPet", 0.4);
        a.add(dog.clone());
        assert_eq!(a.similarity_of(dog.key()), Some(0.4));

        a.add(complex("s:Dog", "t:hasPet", 0.7));
        assert_eq!(a.similarity_of(dog.key()), Some(0.7));
        assert_eq!(a.similarity_of(complex("s:Cat", "t:hasPet", 0.7).key()), None);
    }

    #[test]
    fn test_entity_is_mapped_only_counts_simple_sources() {
        let mut a = Alignment::new();
        a.add(complex("s:Dog", "t:hasPet", 0.7));
        a.add(simple("s:A", "t:B", 0.9));
        assert!(!a.entity_is_mapped(&"s:Dog".into()));
        assert!(a.entity_is_mapped(&"s:A".into()));
        assert!(!a.entity_is_mapped(&"t:B".into()));
        assert!(a.target_is_mapped(&"t:B".into()));
    }

    #[test]
    fn test_get_is_direction_sensitive() {
        let a: Alignment = [simple("s:A", "t:B", 0.9)].into_iter().collect();
        assert_eq!(a.get(&"s:A".into(), &"t:B".into()), Some(0.9));
        assert_eq!(a.get(&"t:B".into(), &"s:A".into()), None);
    }

    #[test]
    fn test_ancestral_mapping() {
        let mut graph = HierarchyGraph::new();
        graph
            .add_subclass("s:Dog", "s:Animal")
            .add_subclass("t:Puppy", "t:Pet");
        let a: Alignment = [simple("s:Animal", "t:Pet", 0.9)].into_iter().collect();
        let anchored = a.anchored(&graph);

        assert!(anchored.contains_ancestral_mapping(&"s:Dog".into(), &"t:Puppy".into()));
        assert!(anchored.contains_ancestral_mapping(&"s:Dog".into(), &"t:Pet".into()));
        assert!(anchored.contains_ancestral_mapping(&"t:Puppy".into(), &"s:Dog".into()));
        // a direct mapping alone is not ancestral
        assert!(!anchored.contains_ancestral_mapping(&"s:Animal".into(), &"t:Pet".into()));
        assert!(anchored.contains_entity(&"t:Pet".into()));
        assert!(!anchored.contains_entity(&"s:Dog".into()));
    }

    #[test]
    fn test_reversed() {
        let a: Alignment = [simple("s:A", "t:B", 0.9), complex("s:Dog", "t:hasPet", 0.7)]
            .into_iter()
            .collect();
        let r = a.reversed();
        assert_eq!(r.len(), 2);
        assert!(r.entity_is_mapped(&"t:B".into()));
        assert_eq!(r.mappings_by_source_entity(&"t:hasPet".into()).count(), 1);
    }
}
