//! Complex correspondence discovery.
//!
//! Two sub-matchers infer mappings between a source class and a compound
//! target expression:
//!
//! - [`AttributeOccurrenceMatcher`]: `c ≡ occurrence(p > 0)` (or its inverse)
//!   when `c`'s parent is already anchored to the domain (range) of `p`;
//! - [`AttributeDomainMatcher`]: `c ≡ domain(p all C)` found by splitting the
//!   label of `c` into a class part and a property part.
//!
//! Both run once per direction; mappings found from the second ontology's
//! side are flipped so entity1 always belongs to the first ontology.
//! [`ComplexMatcher`] runs both and unions the results.

pub mod adr;
pub mod aor;

pub use adr::AttributeDomainMatcher;
pub use aor::AttributeOccurrenceMatcher;

use aligngraph_core::{
    Alignment, EntityId, EntityKind, Mapping, MatchConfig, Ontology, RelationGraph,
    SimilarityPrimitives, SimpleAlignment,
};
use std::collections::BTreeSet;

// ============================================================================
// Matching context
// ============================================================================

/// Everything one matching pass reads. Passed by reference; nothing here is
/// mutated during a pass.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub source: &'a dyn Ontology,
    pub target: &'a dyn Ontology,
    pub graph: &'a dyn RelationGraph,
    /// Validated simple mappings (source -> target) used as anchors
    pub input: &'a dyn SimpleAlignment,
    pub similarity: &'a dyn SimilarityPrimitives,
    pub config: &'a MatchConfig,
}

impl<'a> MatchContext<'a> {
    pub fn new(
        source: &'a dyn Ontology,
        target: &'a dyn Ontology,
        graph: &'a dyn RelationGraph,
        input: &'a dyn SimpleAlignment,
        similarity: &'a dyn SimilarityPrimitives,
        config: &'a MatchConfig,
    ) -> Self {
        Self {
            source,
            target,
            graph,
            input,
            similarity,
            config,
        }
    }

    /// Same context with the ontologies swapped.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            ..*self
        }
    }

    /// Source classes with no simple mapping yet, in id order.
    pub(crate) fn unmapped_source_classes(&self) -> Vec<EntityId> {
        self.source
            .entities_of_type(EntityKind::Class)
            .into_iter()
            .filter(|c| !self.input.contains_entity(c))
            .collect()
    }

    /// Domain/range signatures of every target object property.
    pub(crate) fn target_properties(&self) -> Vec<PropertySignature> {
        self.target
            .entities_of_type(EntityKind::ObjectProperty)
            .into_iter()
            .map(|id| PropertySignature {
                name: self.target.display_name(&id).to_string(),
                domains: self.graph.domains(&id),
                ranges: self.graph.ranges(&id),
                id,
            })
            .collect()
    }

    /// Runs `per_class` for every unmapped source class and concatenates the
    /// results in class order. With `config.parallel` the classes are
    /// sharded over the rayon pool; candidates of different classes never
    /// compete, so the output is identical.
    pub(crate) fn collect_per_class<F>(&self, per_class: F) -> Vec<Mapping>
    where
        F: Fn(&EntityId) -> Vec<Mapping> + Sync,
    {
        let classes = self.unmapped_source_classes();
        if self.config.parallel {
            use rayon::prelude::*;

            let shards: Vec<Vec<Mapping>> = classes.par_iter().map(|c| per_class(c)).collect();
            shards.into_iter().flatten().collect()
        } else {
            classes.iter().flat_map(|c| per_class(c)).collect()
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PropertySignature {
    pub id: EntityId,
    pub name: String,
    pub domains: BTreeSet<EntityId>,
    pub ranges: BTreeSet<EntityId>,
}

// ============================================================================
// Matchers
// ============================================================================

/// A producer of compound mappings.
pub trait Matcher {
    fn name(&self) -> &'static str;

    /// Mappings found with `ctx.source` as the class side, entity1 in
    /// `ctx.source`.
    fn match_directed(&self, ctx: &MatchContext<'_>) -> Vec<Mapping>;

    /// Both directions, unioned; entity1 always belongs to `ctx.source`.
    fn align(&self, ctx: &MatchContext<'_>) -> Alignment {
        let mut alignment: Alignment = self.match_directed(ctx).into_iter().collect();
        alignment.add_all(
            self.match_directed(&ctx.reversed())
                .iter()
                .map(Mapping::reversed),
        );
        tracing::info!(
            matcher = self.name(),
            mappings = alignment.len(),
            "matching pass finished"
        );
        alignment
    }
}

/// Attribute-occurrence plus attribute-domain matching, unioned.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexMatcher {
    aor: AttributeOccurrenceMatcher,
    adr: AttributeDomainMatcher,
}

impl ComplexMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs AOR and ADR in both directions and unions all four results.
    pub fn match_ontologies(&self, ctx: &MatchContext<'_>) -> Alignment {
        let mut alignment = self.aor.align(ctx);
        alignment.extend(self.adr.align(ctx).iter().cloned());
        tracing::info!(
            mappings = alignment.len(),
            threshold = ctx.config.threshold,
            "complex matching finished"
        );
        alignment
    }
}
