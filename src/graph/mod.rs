//! Relationship graph: person records, the store, and validated edits.
//!
//! The store is a petgraph `StableGraph` keyed by stable person ids. All
//! structural edits go through the [`MutationEngine`], which keeps the
//! cardinality and sex rules intact.

mod mutation;
mod person;
mod store;

pub use mutation::{MutationEngine, RelationKind, TargetSpec};
pub use person::{NewPerson, Person, PersonId, Relation, Relations, Sex, SpecialRelation};
pub use store::RelationshipStore;
