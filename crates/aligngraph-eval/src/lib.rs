//! Alignment evaluation against a reference.
//!
//! ## Scoring
//!
//! ```text
//! candidate m ──┬──► identical mapping in reference ──► credit 1.0
//!               │
//!               └──► otherwise: pool = reference mappings sharing a
//!                    source-side AND a target-side entity with m
//!                          │
//!                          ├──► empty pool ──► unscored
//!                          └──► credit max Jaccard(elements(m), elements(r))
//! ```
//!
//! Every credit is also recorded against the reference mapping that earned
//! it, keeping only the best per reference mapping. Recall is the sum of
//! those best scores, so a reference mapping counts at most once however
//! many candidates partially match it.
//!
//! Verdicts are written to a status table owned by the [`Evaluation`]; the
//! alignments themselves are never modified.

use aligngraph_core::{
    Alignment, ElementSet, Mapping, MappingKey, MappingRelation, MappingStatus,
    SimilarityPrimitives,
};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Sum of per-candidate credits
    pub precision_credit: f64,
    /// Candidates contradicting an `Incompatible` reference entry
    pub conflicts: usize,
    /// Sum of the best credit earned by each reference mapping
    pub recall_credit: f64,
    statuses: AHashMap<MappingKey, MappingStatus>,
    /// reference position -> best credit earned
    best_scores: BTreeMap<usize, f64>,
}

impl Evaluation {
    /// Verdict for a candidate mapping; `Unverified` when it was not scored.
    pub fn status_of(&self, mapping: &Mapping) -> MappingStatus {
        self.statuses
            .get(mapping.key())
            .copied()
            .unwrap_or_default()
    }

    /// Best credit per reference mapping, keyed by reference position.
    pub fn best_scores(&self) -> &BTreeMap<usize, f64> {
        &self.best_scores
    }

    pub fn count_status(&self, status: MappingStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    /// Precision, recall and F-measure relative to the alignment sizes.
    ///
    /// Reference entries marked `Incompatible` are not expected to be found
    /// and are left out of the recall denominator.
    pub fn report(&self, candidate: &Alignment, reference: &Alignment) -> EvaluationReport {
        let expected =
            reference.len() - reference.count_relationship(MappingRelation::Incompatible);
        let precision = ratio(self.precision_credit, candidate.len());
        let recall = ratio(self.recall_credit, expected);
        let f_measure = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        EvaluationReport {
            precision,
            recall,
            f_measure,
        }
    }

    fn set_status(&mut self, mapping: &Mapping, status: MappingStatus) {
        self.statuses.insert(mapping.key().clone(), status);
    }

    /// Raises the recorded credit of reference mapping `pos`; never lowers it.
    fn credit_reference(&mut self, pos: usize, score: f64) {
        let entry = self.best_scores.entry(pos).or_insert(score);
        if score > *entry {
            *entry = score;
        }
    }

    fn finish(&mut self) {
        self.recall_credit = self.best_scores.values().sum();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub precision: f64,
    pub recall: f64,
    pub f_measure: f64,
}

fn ratio(credit: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        credit / count as f64
    }
}

// ============================================================================
// Evaluator
// ============================================================================

pub struct Evaluator<'a> {
    similarity: &'a dyn SimilarityPrimitives,
}

impl<'a> Evaluator<'a> {
    pub fn new(similarity: &'a dyn SimilarityPrimitives) -> Self {
        Self { similarity }
    }

    /// Exact-or-partial scoring for alignments containing compound mappings.
    pub fn evaluate(&self, candidate: &Alignment, reference: &Alignment) -> Evaluation {
        let mut eval = Evaluation::default();
        let mut reference_elements: Vec<Option<ElementSet>> = vec![None; reference.len()];

        for mapping in candidate {
            if let Some(pos) = reference.position(mapping.key()) {
                eval.precision_credit += 1.0;
                eval.set_status(mapping, MappingStatus::Correct);
                eval.credit_reference(pos, 1.0);
                continue;
            }

            let pool = comparison_pool(mapping, reference);
            if pool.is_empty() {
                tracing::trace!(mapping = %mapping, "no comparable reference mapping");
                continue;
            }

            let elements = mapping.elements();
            let mut best: Option<(usize, f64)> = None;
            for pos in pool {
                let Some(reference_mapping) = reference.mapping(pos) else {
                    continue;
                };
                let ref_elements =
                    reference_elements[pos].get_or_insert_with(|| reference_mapping.elements());
                let sim = self.similarity.weighted_jaccard(&elements, ref_elements);
                if best.map_or(true, |(_, s)| sim > s) {
                    best = Some((pos, sim));
                }
            }

            if let Some((pos, sim)) = best {
                tracing::debug!(
                    mapping = %mapping,
                    reference = pos,
                    similarity = sim,
                    "partial match"
                );
                eval.precision_credit += sim;
                eval.set_status(mapping, MappingStatus::Unknown);
                eval.credit_reference(pos, sim);
            }
        }

        eval.finish();
        tracing::info!(
            candidates = candidate.len(),
            references = reference.len(),
            precision_credit = eval.precision_credit,
            recall_credit = eval.recall_credit,
            "alignment evaluated"
        );
        eval
    }

    /// Identity-only scoring with conflict detection, for 1:1 alignments.
    pub fn evaluate_simple(&self, candidate: &Alignment, reference: &Alignment) -> Evaluation {
        let mut eval = Evaluation::default();

        for mapping in candidate {
            if let Some(pos) = reference.position(mapping.key()) {
                eval.precision_credit += 1.0;
                eval.set_status(mapping, MappingStatus::Correct);
                eval.credit_reference(pos, 1.0);
            } else if contradicts_reference(mapping, reference) {
                tracing::debug!(mapping = %mapping, "conflicts with reference");
                eval.conflicts += 1;
                eval.set_status(mapping, MappingStatus::Incorrect);
            } else {
                eval.set_status(mapping, MappingStatus::Incorrect);
            }
        }

        eval.finish();
        tracing::info!(
            candidates = candidate.len(),
            references = reference.len(),
            correct = eval.precision_credit,
            conflicts = eval.conflicts,
            "simple alignment evaluated"
        );
        eval
    }

    pub fn report(&self, candidate: &Alignment, reference: &Alignment) -> EvaluationReport {
        self.evaluate(candidate, reference).report(candidate, reference)
    }
}

/// Reference positions sharing at least one source-side and one target-side
/// atomic entity with `mapping`, in reference order.
fn comparison_pool(mapping: &Mapping, reference: &Alignment) -> Vec<usize> {
    let by_source: BTreeSet<usize> = mapping
        .entity1()
        .atomic_entities()
        .into_iter()
        .flat_map(|id| reference.source_positions(id).iter().copied())
        .collect();
    if by_source.is_empty() {
        return Vec::new();
    }
    let by_target: BTreeSet<usize> = mapping
        .entity2()
        .atomic_entities()
        .into_iter()
        .flat_map(|id| reference.target_positions(id).iter().copied())
        .collect();
    by_source.intersection(&by_target).copied().collect()
}

/// The reference holds the same entity pair with `Incompatible` where the
/// candidate claims a positive relationship, or the other way round.
fn contradicts_reference(mapping: &Mapping, reference: &Alignment) -> bool {
    let with = |relationship| MappingKey {
        entity1: mapping.entity1().clone(),
        entity2: mapping.entity2().clone(),
        relationship,
    };
    match mapping.relationship() {
        MappingRelation::Incompatible => [
            MappingRelation::Equivalence,
            MappingRelation::Subsumes,
            MappingRelation::SubsumedBy,
        ]
        .into_iter()
        .any(|r| reference.contains_key(&with(r))),
        _ => reference.contains_key(&with(MappingRelation::Incompatible)),
    }
}
