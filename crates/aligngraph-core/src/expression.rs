//! EDOAL-style expression algebra for compound correspondences.
//!
//! An [`Expression`] is either an atomic entity reference or a constructor
//! applied to sub-expressions. For partial comparison every expression
//! decomposes into a flat [`ElementSet`]: the atomic entities it mentions plus
//! one [`Constructor`] token per structural constructor it uses. The
//! decomposition walks the tree directly; the [`fmt::Display`] rendering is
//! for logs only and is never parsed back.

use crate::entity::{EntityId, EntityKind};
use crate::error::ExpressionError;
use crate::mapping::MappingRelation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Restriction parameters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Equals,
    GreaterThan,
    LessThan,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Equals => "=",
            Comparator::GreaterThan => ">",
            Comparator::LessThan => "<",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    All,
    Exists,
}

impl Quantifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Quantifier::All => "all",
            Quantifier::Exists => "exists",
        }
    }
}

/// Coarse sort of an expression: what it can stand in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionKind {
    Class,
    Relation,
    Individual,
}

// ============================================================================
// Expression
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", try_from = "ExpressionRepr")]
pub enum Expression {
    EntityRef {
        id: EntityId,
        kind: EntityKind,
    },
    Inverse {
        relation: Box<Expression>,
    },
    /// Disjunction; members are kept as a set and always number two or more.
    Union {
        members: BTreeSet<Expression>,
    },
    /// Entities with `relation` occurring `comparator value` times.
    AttributeOccurrenceRestriction {
        relation: Box<Expression>,
        comparator: Comparator,
        value: u32,
    },
    /// Entities whose `relation` values lie in `class` (under `quantifier`).
    AttributeDomainRestriction {
        relation: Box<Expression>,
        class: Box<Expression>,
        quantifier: Quantifier,
    },
}

/// Unchecked wire shape; unions are rebuilt through [`Expression::union`].
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ExpressionRepr {
    EntityRef {
        id: EntityId,
        kind: EntityKind,
    },
    Inverse {
        relation: Box<Expression>,
    },
    Union {
        members: Vec<Expression>,
    },
    AttributeOccurrenceRestriction {
        relation: Box<Expression>,
        comparator: Comparator,
        value: u32,
    },
    AttributeDomainRestriction {
        relation: Box<Expression>,
        class: Box<Expression>,
        quantifier: Quantifier,
    },
}

impl TryFrom<ExpressionRepr> for Expression {
    type Error = ExpressionError;

    fn try_from(repr: ExpressionRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            ExpressionRepr::EntityRef { id, kind } => Expression::EntityRef { id, kind },
            ExpressionRepr::Inverse { relation } => Expression::Inverse { relation },
            ExpressionRepr::Union { members } => return Expression::union(members),
            ExpressionRepr::AttributeOccurrenceRestriction {
                relation,
                comparator,
                value,
            } => Expression::AttributeOccurrenceRestriction {
                relation,
                comparator,
                value,
            },
            ExpressionRepr::AttributeDomainRestriction {
                relation,
                class,
                quantifier,
            } => Expression::AttributeDomainRestriction {
                relation,
                class,
                quantifier,
            },
        })
    }
}

impl Expression {
    pub fn entity(id: impl Into<EntityId>, kind: EntityKind) -> Self {
        Expression::EntityRef {
            id: id.into(),
            kind,
        }
    }

    pub fn class(id: impl Into<EntityId>) -> Self {
        Self::entity(id, EntityKind::Class)
    }

    /// Object property reference.
    pub fn relation(id: impl Into<EntityId>) -> Self {
        Self::entity(id, EntityKind::ObjectProperty)
    }

    pub fn inverse(relation: Expression) -> Self {
        Expression::Inverse {
            relation: Box::new(relation),
        }
    }

    /// Builds a disjunction.
    ///
    /// Nested unions are flattened and duplicates collapse; a single
    /// distinct member is returned as-is rather than wrapped.
    pub fn union<I>(members: I) -> Result<Self, ExpressionError>
    where
        I: IntoIterator<Item = Expression>,
    {
        let mut flat = BTreeSet::new();
        for member in members {
            match member {
                Expression::Union { members } => flat.extend(members),
                other => {
                    flat.insert(other);
                }
            }
        }

        let mut kinds = flat.iter().map(Expression::kind);
        let Some(first) = kinds.next() else {
            return Err(ExpressionError::EmptyUnion);
        };
        if let Some(second) = kinds.find(|k| *k != first) {
            return Err(ExpressionError::MixedUnion { first, second });
        }

        if flat.len() == 1 {
            return flat.into_iter().next().ok_or(ExpressionError::EmptyUnion);
        }
        Ok(Expression::Union { members: flat })
    }

    pub fn occurrence(relation: Expression, comparator: Comparator, value: u32) -> Self {
        Expression::AttributeOccurrenceRestriction {
            relation: Box::new(relation),
            comparator,
            value,
        }
    }

    pub fn domain_restriction(
        relation: Expression,
        class: Expression,
        quantifier: Quantifier,
    ) -> Self {
        Expression::AttributeDomainRestriction {
            relation: Box::new(relation),
            class: Box::new(class),
            quantifier,
        }
    }

    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::EntityRef { kind, .. } if kind.is_relation() => ExpressionKind::Relation,
            Expression::EntityRef { kind, .. } => match kind {
                EntityKind::Individual => ExpressionKind::Individual,
                _ => ExpressionKind::Class,
            },
            Expression::Inverse { .. } => ExpressionKind::Relation,
            Expression::Union { members } => members
                .iter()
                .next()
                .map_or(ExpressionKind::Class, Expression::kind),
            Expression::AttributeOccurrenceRestriction { .. }
            | Expression::AttributeDomainRestriction { .. } => ExpressionKind::Class,
        }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, Expression::EntityRef { .. })
    }

    /// The referenced id when this is an atomic expression.
    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            Expression::EntityRef { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Every atomic entity mentioned anywhere in the expression.
    pub fn atomic_entities(&self) -> BTreeSet<&EntityId> {
        let mut out = BTreeSet::new();
        self.visit_entities(&mut |id| {
            out.insert(id);
        });
        out
    }

    fn visit_entities<'a>(&'a self, f: &mut impl FnMut(&'a EntityId)) {
        match self {
            Expression::EntityRef { id, .. } => f(id),
            Expression::Inverse { relation } => relation.visit_entities(f),
            Expression::Union { members } => {
                for member in members {
                    member.visit_entities(f);
                }
            }
            Expression::AttributeOccurrenceRestriction { relation, .. } => {
                relation.visit_entities(f)
            }
            Expression::AttributeDomainRestriction { relation, class, .. } => {
                relation.visit_entities(f);
                class.visit_entities(f);
            }
        }
    }

    /// Flat element decomposition used for partial comparison.
    pub fn elements(&self) -> ElementSet {
        let mut out = ElementSet::new();
        self.collect_elements(&mut out);
        out
    }

    pub fn collect_elements(&self, out: &mut ElementSet) {
        match self {
            Expression::EntityRef { id, .. } => {
                out.insert(Element::Entity(id.clone()));
            }
            Expression::Inverse { relation } => {
                out.insert(Element::Constructor(Constructor::Inverse));
                relation.collect_elements(out);
            }
            Expression::Union { members } => {
                out.insert(Element::Constructor(Constructor::Union));
                for member in members {
                    member.collect_elements(out);
                }
            }
            Expression::AttributeOccurrenceRestriction {
                relation,
                comparator,
                ..
            } => {
                out.insert(Element::Constructor(Constructor::OccurrenceRestriction));
                out.insert(Element::Constructor(Constructor::Comparator(*comparator)));
                relation.collect_elements(out);
            }
            Expression::AttributeDomainRestriction {
                relation,
                class,
                quantifier,
            } => {
                out.insert(Element::Constructor(Constructor::DomainRestriction));
                out.insert(Element::Constructor(Constructor::Quantifier(*quantifier)));
                relation.collect_elements(out);
                class.collect_elements(out);
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::EntityRef { id, .. } => write!(f, "<{id}>"),
            Expression::Inverse { relation } => write!(f, "inverse({relation})"),
            Expression::Union { members } => {
                f.write_str("or(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
            Expression::AttributeOccurrenceRestriction {
                relation,
                comparator,
                value,
            } => write!(f, "occurrence({relation} {} {value})", comparator.symbol()),
            Expression::AttributeDomainRestriction {
                relation,
                class,
                quantifier,
            } => write!(f, "domain({relation} {} {class})", quantifier.keyword()),
        }
    }
}

// ============================================================================
// Decomposition elements
// ============================================================================

/// Structural constructor tokens emitted by decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constructor {
    Union,
    Inverse,
    OccurrenceRestriction,
    DomainRestriction,
    Comparator(Comparator),
    Quantifier(Quantifier),
}

/// One member of a flat decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Entity(EntityId),
    Constructor(Constructor),
    Relationship(MappingRelation),
}

pub type ElementSet = BTreeSet<Element>;
