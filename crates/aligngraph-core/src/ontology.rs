//! Collaborator seams: ontology access, the relation graph and the input
//! simple alignment.
//!
//! Loading ontologies from files is done elsewhere; the in-memory
//! [`OntologyStore`] and [`HierarchyGraph`] are what a loader fills in (and
//! what tests build by hand).

use crate::entity::{EntityId, EntityKind};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// ============================================================================
// Traits
// ============================================================================

/// Read access to one ontology's entities and lexicon.
///
/// Sets are ordered so every traversal that drives a tie-break is
/// deterministic.
pub trait Ontology: Send + Sync {
    fn entities_of_type(&self, kind: EntityKind) -> BTreeSet<EntityId>;

    /// Primary name of the entity, if the ontology knows it.
    fn name(&self, id: &EntityId) -> Option<&str>;

    /// All lexicon entries for the entity in `language`.
    fn lexicon_names(&self, id: &EntityId, language: &str) -> BTreeSet<String>;

    /// Name with the id's local fragment as fallback.
    fn display_name<'a>(&'a self, id: &'a EntityId) -> &'a str {
        self.name(id).unwrap_or_else(|| id.local_name())
    }
}

/// Class hierarchy and property signatures, spanning both ontologies.
pub trait RelationGraph: Send + Sync {
    /// Direct superclasses.
    fn superclasses(&self, id: &EntityId) -> BTreeSet<EntityId>;

    fn domains(&self, property: &EntityId) -> BTreeSet<EntityId>;

    fn ranges(&self, property: &EntityId) -> BTreeSet<EntityId>;

    /// Transitive superclasses, excluding `id` itself.
    fn ancestors(&self, id: &EntityId) -> BTreeSet<EntityId> {
        let mut out = BTreeSet::new();
        let mut queue: VecDeque<EntityId> = self.superclasses(id).into_iter().collect();
        while let Some(next) = queue.pop_front() {
            if next == *id || !out.insert(next.clone()) {
                continue;
            }
            queue.extend(self.superclasses(&next));
        }
        out
    }
}

/// An already validated set of 1:1 correspondences used as anchors.
pub trait SimpleAlignment: Send + Sync {
    /// Similarity of the simple mapping `a -> b` (direction-sensitive).
    fn get(&self, a: &EntityId, b: &EntityId) -> Option<f64>;

    /// True if `id` takes part in any simple mapping, on either side.
    fn contains_entity(&self, id: &EntityId) -> bool;

    /// True if a simple mapping links `a` (or an ancestor) to `b` (or an
    /// ancestor), other than a direct `a`/`b` mapping.
    fn contains_ancestral_mapping(&self, a: &EntityId, b: &EntityId) -> bool;

    /// Mapped in either direction.
    fn links(&self, a: &EntityId, b: &EntityId) -> bool {
        self.get(a, b).is_some() || self.get(b, a).is_some()
    }
}

// ============================================================================
// In-memory ontology
// ============================================================================

#[derive(Debug, Clone)]
struct EntityRecord {
    kind: EntityKind,
    name: String,
    lexicon: BTreeMap<String, BTreeSet<String>>,
}

/// In-memory [`Ontology`].
///
/// `add_entity` also files the name under the store's default language, so
/// an ontology without extra labels still has a usable lexicon.
#[derive(Debug, Clone)]
pub struct OntologyStore {
    iri: String,
    default_language: String,
    entities: BTreeMap<EntityId, EntityRecord>,
}

impl OntologyStore {
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            default_language: "en".to_string(),
            entities: BTreeMap::new(),
        }
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn iri(&self) -> &str {
        &self.iri
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn add_entity(
        &mut self,
        id: impl Into<EntityId>,
        kind: EntityKind,
        name: impl Into<String>,
    ) -> &mut Self {
        let name = name.into();
        let mut lexicon = BTreeMap::new();
        lexicon.insert(
            self.default_language.clone(),
            BTreeSet::from([name.clone()]),
        );
        self.entities.insert(id.into(), EntityRecord { kind, name, lexicon });
        self
    }

    pub fn add_class(&mut self, id: impl Into<EntityId>, name: impl Into<String>) -> &mut Self {
        self.add_entity(id, EntityKind::Class, name)
    }

    pub fn add_object_property(
        &mut self,
        id: impl Into<EntityId>,
        name: impl Into<String>,
    ) -> &mut Self {
        self.add_entity(id, EntityKind::ObjectProperty, name)
    }

    /// Adds a lexicon entry; ignored for unknown ids.
    pub fn add_label(
        &mut self,
        id: &EntityId,
        language: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Self {
        if let Some(record) = self.entities.get_mut(id) {
            record
                .lexicon
                .entry(language.into())
                .or_default()
                .insert(label.into());
        }
        self
    }

    pub fn kind_of(&self, id: &EntityId) -> Option<EntityKind> {
        self.entities.get(id).map(|r| r.kind)
    }
}

impl Ontology for OntologyStore {
    fn entities_of_type(&self, kind: EntityKind) -> BTreeSet<EntityId> {
        self.entities
            .iter()
            .filter(|(_, r)| r.kind == kind)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn name(&self, id: &EntityId) -> Option<&str> {
        self.entities.get(id).map(|r| r.name.as_str())
    }

    fn lexicon_names(&self, id: &EntityId, language: &str) -> BTreeSet<String> {
        self.entities
            .get(id)
            .and_then(|r| r.lexicon.get(language))
            .cloned()
            .unwrap_or_default()
    }
}

// ============================================================================
// In-memory relation graph
// ============================================================================

/// In-memory [`RelationGraph`]. One graph holds both ontologies; ids of the
/// two ontologies never collide.
#[derive(Debug, Clone, Default)]
pub struct HierarchyGraph {
    superclasses: BTreeMap<EntityId, BTreeSet<EntityId>>,
    domains: BTreeMap<EntityId, BTreeSet<EntityId>>,
    ranges: BTreeMap<EntityId, BTreeSet<EntityId>>,
}

impl HierarchyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_subclass(
        &mut self,
        sub: impl Into<EntityId>,
        sup: impl Into<EntityId>,
    ) -> &mut Self {
        self.superclasses
            .entry(sub.into())
            .or_default()
            .insert(sup.into());
        self
    }

    pub fn add_domain(
        &mut self,
        property: impl Into<EntityId>,
        domain: impl Into<EntityId>,
    ) -> &mut Self {
        self.domains
            .entry(property.into())
            .or_default()
            .insert(domain.into());
        self
    }

    pub fn add_range(
        &mut self,
        property: impl Into<EntityId>,
        range: impl Into<EntityId>,
    ) -> &mut Self {
        self.ranges
            .entry(property.into())
            .or_default()
            .insert(range.into());
        self
    }

    /// Subclasses of `id` (direct only).
    pub fn subclasses(&self, id: &EntityId) -> BTreeSet<EntityId> {
        self.superclasses
            .iter()
            .filter(|(_, sups)| sups.contains(id))
            .map(|(sub, _)| sub.clone())
            .collect()
    }
}

impl RelationGraph for HierarchyGraph {
    fn superclasses(&self, id: &EntityId) -> BTreeSet<EntityId> {
        self.superclasses.get(id).cloned().unwrap_or_default()
    }

    fn domains(&self, property: &EntityId) -> BTreeSet<EntityId> {
        self.domains.get(property).cloned().unwrap_or_default()
    }

    fn ranges(&self, property: &EntityId) -> BTreeSet<EntityId> {
        self.ranges.get(property).cloned().unwrap_or_default()
    }
}
