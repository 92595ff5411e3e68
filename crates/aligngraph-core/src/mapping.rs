//! Correspondences between two expressions.

use crate::expression::{Element, ElementSet, Expression};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingRelation {
    Equivalence,
    /// entity1 subsumes entity2
    Subsumes,
    /// entity1 is subsumed by entity2
    SubsumedBy,
    Incompatible,
}

impl MappingRelation {
    /// The relationship seen from the other side.
    pub fn inverse(self) -> Self {
        match self {
            MappingRelation::Subsumes => MappingRelation::SubsumedBy,
            MappingRelation::SubsumedBy => MappingRelation::Subsumes,
            other => other,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MappingRelation::Equivalence => "=",
            MappingRelation::Subsumes => ">",
            MappingRelation::SubsumedBy => "<",
            MappingRelation::Incompatible => "!",
        }
    }
}

/// Evaluation verdict for a candidate mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    #[default]
    Unverified,
    Correct,
    Incorrect,
    Unknown,
}

/// Identity of a mapping: similarity and status are annotations on top of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MappingKey {
    pub entity1: Expression,
    pub entity2: Expression,
    pub relationship: MappingRelation,
}

/// A correspondence `entity1 relationship entity2` with a confidence score.
///
/// Immutable once built; the only mutation is raising the similarity when an
/// alignment absorbs a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(flatten)]
    key: MappingKey,
    similarity: f64,
}

impl Mapping {
    /// Similarity is clamped into `[0, 1]`; NaN becomes 0.
    pub fn new(
        entity1: Expression,
        entity2: Expression,
        relationship: MappingRelation,
        similarity: f64,
    ) -> Self {
        Self {
            key: MappingKey {
                entity1,
                entity2,
                relationship,
            },
            similarity: clamp_similarity(similarity),
        }
    }

    pub fn equivalence(entity1: Expression, entity2: Expression, similarity: f64) -> Self {
        Self::new(entity1, entity2, MappingRelation::Equivalence, similarity)
    }

    pub fn entity1(&self) -> &Expression {
        &self.key.entity1
    }

    pub fn entity2(&self) -> &Expression {
        &self.key.entity2
    }

    pub fn relationship(&self) -> MappingRelation {
        self.key.relationship
    }

    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    pub fn key(&self) -> &MappingKey {
        &self.key
    }

    pub fn is_simple(&self) -> bool {
        self.key.entity1.is_atomic() && self.key.entity2.is_atomic()
    }

    /// Same correspondence stated from the other ontology's side.
    pub fn reversed(&self) -> Self {
        Self {
            key: MappingKey {
                entity1: self.key.entity2.clone(),
                entity2: self.key.entity1.clone(),
                relationship: self.key.relationship.inverse(),
            },
            similarity: self.similarity,
        }
    }

    /// Decomposition of both sides plus the relationship token.
    pub fn elements(&self) -> ElementSet {
        let mut out = ElementSet::new();
        self.key.entity1.collect_elements(&mut out);
        self.key.entity2.collect_elements(&mut out);
        out.insert(Element::Relationship(self.key.relationship));
        out
    }

    pub(crate) fn raise_similarity(&mut self, similarity: f64) {
        let similarity = clamp_similarity(similarity);
        if similarity > self.similarity {
            self.similarity = similarity;
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({:.3})",
            self.key.entity1,
            self.key.relationship.symbol(),
            self.key.entity2,
            self.similarity
        )
    }
}

fn clamp_similarity(similarity: f64) -> f64 {
    if similarity.is_nan() {
        0.0
    } else {
        similarity.clamp(0.0, 1.0)
    }
}
