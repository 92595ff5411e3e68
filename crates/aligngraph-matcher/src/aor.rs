//! Attribute-occurrence matching.
//!
//! A source class `c` whose parent is anchored (via the input simple
//! alignment) to the domain of a target relation `p` may be the set of
//! things that have a `p`:
//!
//! ```text
//!   Animal ──simple──► Owner ◄──domain── hasPet
//!     ▲
//!   Dog        ⇒   Dog ≡ occurrence(hasPet > 0)
//! ```
//!
//! Anchoring on the range side yields the inverse restriction instead.

use crate::{MatchContext, Matcher, PropertySignature};
use aligngraph_core::{Comparator, EntityId, Expression, Mapping};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeOccurrenceMatcher;

impl AttributeOccurrenceMatcher {
    pub fn new() -> Self {
        Self
    }

    fn match_class(
        &self,
        ctx: &MatchContext<'_>,
        properties: &[PropertySignature],
        class: &EntityId,
    ) -> Vec<Mapping> {
        let class_name = ctx.source.display_name(class);
        let mut out = Vec::new();

        for parent in ctx.graph.superclasses(class) {
            let mut accepted: Vec<(Expression, f64)> = Vec::new();

            for property in properties {
                let domain_anchored = is_anchored(ctx, &parent, &property.domains);
                let range_anchored = is_anchored(ctx, &parent, &property.ranges);
                if !domain_anchored && !range_anchored {
                    continue;
                }

                let similarity = ctx.similarity.name_similarity(
                    class_name,
                    &property.name,
                    ctx.config.use_thesaurus,
                );
                if similarity < ctx.config.threshold {
                    tracing::trace!(
                        class = %class,
                        property = %property.id,
                        similarity,
                        "occurrence candidate below threshold"
                    );
                    continue;
                }

                let relation = Expression::relation(property.id.clone());
                if domain_anchored {
                    let expr = Expression::occurrence(relation.clone(), Comparator::GreaterThan, 0);
                    accepted.push((expr, similarity));
                }
                if range_anchored {
                    let expr = Expression::occurrence(
                        Expression::inverse(relation),
                        Comparator::GreaterThan,
                        0,
                    );
                    accepted.push((expr, similarity));
                }
            }

            if let Some(mapping) = combine(class, accepted) {
                tracing::debug!(parent = %parent, mapping = %mapping, "occurrence mapping");
                out.push(mapping);
            }
        }
        out
    }
}

impl Matcher for AttributeOccurrenceMatcher {
    fn name(&self) -> &'static str {
        "attribute-occurrence"
    }

    fn match_directed(&self, ctx: &MatchContext<'_>) -> Vec<Mapping> {
        let properties = ctx.target_properties();
        ctx.collect_per_class(|class| self.match_class(ctx, &properties, class))
    }
}

/// `parent` is linked to one of `entities` or, failing that, to one of
/// their ancestors. A domain reached both ways still yields one candidate.
fn is_anchored(ctx: &MatchContext<'_>, parent: &EntityId, entities: &BTreeSet<EntityId>) -> bool {
    if entities.iter().any(|e| ctx.input.links(parent, e)) {
        return true;
    }
    entities.iter().any(|e| {
        ctx.graph
            .ancestors(e)
            .iter()
            .any(|ancestor| ctx.input.links(parent, ancestor))
    })
}

/// One candidate maps as-is; several become a union scored by the weakest.
fn combine(class: &EntityId, accepted: Vec<(Expression, f64)>) -> Option<Mapping> {
    let source = Expression::class(class.clone());
    match accepted.len() {
        0 => None,
        1 => {
            let (expr, similarity) = accepted.into_iter().next()?;
            Some(Mapping::equivalence(source, expr, similarity))
        }
        _ => {
            let similarity = accepted
                .iter()
                .map(|(_, s)| *s)
                .fold(f64::INFINITY, f64::min);
            match Expression::union(accepted.into_iter().map(|(e, _)| e)) {
                Ok(target) => Some(Mapping::equivalence(source, target, similarity)),
                Err(err) => {
                    tracing::warn!(
                        class = %class,
                        error = %err,
                        "could not build occurrence union"
                    );
                    None
                }
            }
        }
    }
}
