//! Error types for relationship edits and tree sessions.
//!
//! Every variant is a local validation failure. The failing operation is
//! rejected as a whole and the relationship store is left untouched.

use crate::graph::{PersonId, Sex};

/// Why a relationship edit was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("{person} already has two parents")]
    TooManyParents { person: PersonId },

    #[error("{person} already has a {sex} parent ({existing})")]
    DuplicateParentSex {
        person: PersonId,
        sex: Sex,
        existing: PersonId,
    },

    #[error("person {0} does not exist")]
    DanglingReference(PersonId),

    #[error("{0} has no recorded parents to share with a sibling")]
    AmbiguousSiblingBase(PersonId),

    #[error("{0} cannot be related to themselves")]
    SelfRelation(PersonId),

    #[error("person {0} already exists")]
    DuplicatePerson(PersonId),
}

/// Errors surfaced by a [`crate::FamilyTree`] session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("root person {0} is not in the tree")]
    MissingRoot(PersonId),

    #[error("snapshot for tree '{tree_id}' was superseded by a newer request")]
    StaleSnapshot { tree_id: String },

    #[error(transparent)]
    Mutation(#[from] MutationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_sex_message_names_the_sex() {
        let err = MutationError::DuplicateParentSex {
            person: PersonId::from("p1"),
            sex: Sex::Male,
            existing: PersonId::from("p2"),
        };
        assert_eq!(err.to_string(), "p1 already has a male parent (p2)");
    }

    #[test]
    fn test_mutation_error_converts_into_tree_error() {
        let err: TreeError = MutationError::DanglingReference(PersonId::from("x")).into();
        assert_eq!(err.to_string(), "person x does not exist");
    }
}
