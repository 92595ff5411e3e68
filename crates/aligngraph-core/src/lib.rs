//! Aligngraph core: the data model shared by the matcher and the evaluator.
//!
//! ```text
//!  Ontology / RelationGraph        SimilarityPrimitives
//!  (collaborator traits)           (lexical scoring)
//!            │                              │
//!            ▼                              ▼
//!  ┌──────────────────┐   ┌──────────────────────────────┐
//!  │ Expression       │──►│ Mapping (entity1, entity2,   │
//!  │ (EDOAL algebra)  │   │ relationship, similarity)    │
//!  └──────────────────┘   └──────────────┬───────────────┘
//!                                        ▼
//!                         ┌──────────────────────────────┐
//!                         │ Alignment                    │
//!                         │ simple / complex partitions  │
//!                         │ source / target indices      │
//!                         └──────────────────────────────┘
//! ```
//!
//! Everything here is synchronous and free of I/O. Ontology loading and
//! alignment persistence live outside this workspace; the traits in
//! [`ontology`] are the seam they plug into.

pub mod alignment;
pub mod config;
pub mod entity;
pub mod error;
pub mod expression;
pub mod mapping;
pub mod ontology;
pub mod similarity;

pub use alignment::{Alignment, AnchoredAlignment};
pub use config::MatchConfig;
pub use entity::{EntityId, EntityKind};
pub use error::{ConfigError, ExpressionError};
pub use expression::{
    Comparator, Constructor, Element, ElementSet, Expression, ExpressionKind, Quantifier,
};
pub use mapping::{Mapping, MappingKey, MappingRelation, MappingStatus};
pub use ontology::{HierarchyGraph, Ontology, OntologyStore, RelationGraph, SimpleAlignment};
pub use similarity::{LexicalSimilarity, SimilarityPrimitives, SynonymTable, Thesaurus};
