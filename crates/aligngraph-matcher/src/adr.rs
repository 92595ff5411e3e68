//! Attribute-domain-restriction matching.
//!
//! A source label such as "Accepted Paper" is split into a class part that
//! matches a target class ("Paper") and a residual ("accepted") that should
//! match a target relation ranging over that class ("accepts"). The result
//! is `AcceptedPaper ≡ domain(accepts all Paper)`.
//!
//! When the residual matches no relation name, a relation still qualifies
//! if its domain is already linked to the source class through the input
//! alignment; such candidates earn no lexical credit for the relation.

use crate::{MatchContext, Matcher, PropertySignature};
use aligngraph_core::similarity::{stem, tokenize, word_set};
use aligngraph_core::{EntityId, EntityKind, Expression, Mapping, Quantifier};
use std::collections::BTreeSet;

const PROPERTY_WEIGHT: f64 = 0.3;
const CLASS_WEIGHT: f64 = 0.7;

#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeDomainMatcher;

/// A target class with its ancestors (for range checks) and labels.
struct TargetClass {
    id: EntityId,
    family: BTreeSet<EntityId>,
    names: BTreeSet<String>,
}

impl AttributeDomainMatcher {
    pub fn new() -> Self {
        Self
    }

    fn match_class(
        &self,
        ctx: &MatchContext<'_>,
        classes: &[TargetClass],
        properties: &[PropertySignature],
        class: &EntityId,
    ) -> Vec<Mapping> {
        let mut out = Vec::new();
        let class_threshold = ctx.config.threshold / 2.0;

        for source_name in ctx.source.lexicon_names(class, &ctx.config.language) {
            let source_len = source_name.chars().count();
            let mut best: Option<(Expression, f64)> = None;

            for target in classes {
                for target_name in &target.names {
                    // a longer target label cannot be a sub-phrase of this one
                    if target_name.chars().count() > source_len {
                        continue;
                    }
                    let class_sim = ctx.similarity.word_similarity(&source_name, target_name, true);
                    if class_sim < class_threshold {
                        continue;
                    }
                    let residual = residual_phrase(&source_name, target_name);

                    for property in properties {
                        if property.ranges.is_disjoint(&target.family) {
                            continue;
                        }
                        let prop_sim =
                            ctx.similarity.word_similarity(&residual, &property.name, true);
                        let score = if prop_sim > 0.0 {
                            PROPERTY_WEIGHT * prop_sim + CLASS_WEIGHT * class_sim
                        } else if domain_is_anchored(ctx, class, &property.domains) {
                            CLASS_WEIGHT * class_sim
                        } else {
                            continue;
                        };

                        if best.as_ref().map_or(true, |(_, s)| score > *s) {
                            let expr = Expression::domain_restriction(
                                Expression::relation(property.id.clone()),
                                Expression::class(target.id.clone()),
                                Quantifier::All,
                            );
                            best = Some((expr, score));
                        }
                    }
                }
            }

            if let Some((expr, score)) = best {
                let mapping = Mapping::equivalence(Expression::class(class.clone()), expr, score);
                tracing::debug!(
                    label = %source_name,
                    mapping = %mapping,
                    "domain restriction mapping"
                );
                out.push(mapping);
            } else {
                tracing::trace!(
                    class = %class,
                    label = %source_name,
                    "no domain restriction candidate"
                );
            }
        }
        out
    }
}

impl Matcher for AttributeDomainMatcher {
    fn name(&self) -> &'static str {
        "attribute-domain"
    }

    fn match_directed(&self, ctx: &MatchContext<'_>) -> Vec<Mapping> {
        let classes: Vec<TargetClass> = ctx
            .target
            .entities_of_type(EntityKind::Class)
            .into_iter()
            .map(|id| {
                let mut family = ctx.graph.ancestors(&id);
                family.insert(id.clone());
                let names = ctx.target.lexicon_names(&id, &ctx.config.language);
                TargetClass { id, family, names }
            })
            .filter(|tc| !tc.names.is_empty())
            .collect();
        let properties = ctx.target_properties();

        ctx.collect_per_class(|class| self.match_class(ctx, &classes, &properties, class))
    }
}

/// Words of `source` whose stems do not occur in `target`, space-joined.
fn residual_phrase(source: &str, target: &str) -> String {
    let shared = word_set(target, true);
    tokenize(source)
        .into_iter()
        .filter(|w| !shared.contains(&stem(w)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Some domain entity is linked to `class` directly, inversely, or through
/// ancestors in the input alignment.
fn domain_is_anchored(
    ctx: &MatchContext<'_>,
    class: &EntityId,
    domains: &BTreeSet<EntityId>,
) -> bool {
    domains
        .iter()
        .any(|d| ctx.input.links(class, d) || ctx.input.contains_ancestral_mapping(class, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residual_phrase() {
        assert_eq!(residual_phrase("Accepted Paper", "Paper"), "accepted");
        assert_eq!(residual_phrase("Accepted Papers", "paper"), "accepted");
        assert_eq!(residual_phrase("Paper", "Paper"), "");
    }
}
