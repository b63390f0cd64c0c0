//! Validated relationship edits.
//!
//! [`MutationEngine::create_or_link_person`] is the only way edges enter the
//! store. Every request is validated in full before anything is written, so
//! a rejected request leaves the store exactly as it was.
//!
//! Rules enforced on any person gaining a parent:
//! - no two known-sex parents share a sex (checked first, so a same-sex
//!   third parent reports `DuplicateParentSex`);
//! - at most two parents.

use tracing::{debug, info};

use super::person::{NewPerson, PersonId, Sex};
use super::store::RelationshipStore;
use crate::error::MutationError;

/// The kind of relationship being created from the source's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Target becomes a parent of the source.
    Parent,
    /// Target becomes a child of the source.
    Child,
    /// Source and target become partners.
    Partner,
    /// Target adopts the source's parents. No direct edge is created.
    Sibling,
    /// Informal label recorded on the source only.
    Special(String),
}

impl From<&str> for RelationKind {
    fn from(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "parent" => RelationKind::Parent,
            "child" => RelationKind::Child,
            "partner" => RelationKind::Partner,
            "sibling" => RelationKind::Sibling,
            other => RelationKind::Special(other.to_owned()),
        }
    }
}

/// Who the new relationship points at.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSpec {
    /// A person already in the store.
    Existing(PersonId),
    /// A person to be created with a fresh id.
    New(NewPerson),
}

impl TargetSpec {
    fn existing_id(&self) -> Option<&PersonId> {
        match self {
            TargetSpec::Existing(id) => Some(id),
            TargetSpec::New(_) => None,
        }
    }
}

/// Parents a child has (or will have), used to admit additions one by one.
struct ParentSlots {
    child: PersonId,
    taken: Vec<(PersonId, Sex)>,
}

impl ParentSlots {
    fn for_child(store: &RelationshipStore, child: &PersonId) -> Self {
        let taken = store
            .parents(child)
            .into_iter()
            .map(|p| {
                let sex = store.person(&p).map(|person| person.sex).unwrap_or_default();
                (p, sex)
            })
            .collect();
        Self {
            child: child.clone(),
            taken,
        }
    }

    /// Check that one more parent of `sex` would keep the set valid.
    fn check(&self, sex: Sex) -> Result<(), MutationError> {
        if sex.is_known() {
            if let Some((existing, _)) = self.taken.iter().find(|(_, s)| *s == sex) {
                return Err(MutationError::DuplicateParentSex {
                    person: self.child.clone(),
                    sex,
                    existing: existing.clone(),
                });
            }
        }
        if self.taken.len() >= 2 {
            return Err(MutationError::TooManyParents {
                person: self.child.clone(),
            });
        }
        Ok(())
    }

    /// Admit `parent` with `sex`. Returns false when it is already a parent.
    fn admit(&mut self, parent: &PersonId, sex: Sex) -> Result<bool, MutationError> {
        if self.taken.iter().any(|(p, _)| p == parent) {
            return Ok(false);
        }
        self.check(sex)?;
        self.taken.push((parent.clone(), sex));
        Ok(true)
    }
}

/// Applies relationship edits to a borrowed store.
pub struct MutationEngine<'a> {
    store: &'a mut RelationshipStore,
}

impl<'a> MutationEngine<'a> {
    pub fn new(store: &'a mut RelationshipStore) -> Self {
        Self { store }
    }

    /// Link `source` to a target by `kind`, creating the target first when it
    /// is given as inline data.
    ///
    /// Returns the target's id (freshly generated for [`TargetSpec::New`]).
    ///
    /// # Errors
    ///
    /// - `DanglingReference` when the source or an existing target is missing.
    /// - `SelfRelation` when source and target are the same person.
    /// - `DuplicateParentSex` / `TooManyParents` when a person would end up
    ///   with an invalid set of parents.
    /// - `AmbiguousSiblingBase` when a sibling is requested for a source with
    ///   no recorded parents.
    pub fn create_or_link_person(
        &mut self,
        source: &PersonId,
        target: TargetSpec,
        kind: RelationKind,
    ) -> Result<PersonId, MutationError> {
        let source_sex = self
            .store
            .person(source)
            .map(|p| p.sex)
            .ok_or_else(|| MutationError::DanglingReference(source.clone()))?;

        let target_sex = match &target {
            TargetSpec::Existing(id) => {
                if id == source {
                    return Err(MutationError::SelfRelation(id.clone()));
                }
                self.store
                    .person(id)
                    .map(|p| p.sex)
                    .ok_or_else(|| MutationError::DanglingReference(id.clone()))?
            }
            TargetSpec::New(data) => data.sex,
        };

        let sibling_parents = match &kind {
            RelationKind::Parent => {
                let mut slots = ParentSlots::for_child(self.store, source);
                match target.existing_id() {
                    Some(id) => {
                        slots.admit(id, target_sex)?;
                    }
                    None => slots.check(target_sex)?,
                }
                Vec::new()
            }
            RelationKind::Child => {
                if let Some(id) = target.existing_id() {
                    ParentSlots::for_child(self.store, id).admit(source, source_sex)?;
                }
                Vec::new()
            }
            RelationKind::Sibling => self.plan_sibling(source, target.existing_id())?,
            RelationKind::Partner | RelationKind::Special(_) => Vec::new(),
        };

        let target_id = match target {
            TargetSpec::Existing(id) => id,
            TargetSpec::New(data) => {
                let id = PersonId::generate();
                self.store.insert_person(data.into_person(id.clone()))?;
                debug!("created person {id} for {kind:?} link from {source}");
                id
            }
        };

        match &kind {
            RelationKind::Parent => self.store.link_parent(&target_id, source)?,
            RelationKind::Child => self.store.link_parent(source, &target_id)?,
            RelationKind::Partner => self.store.link_partners(source, &target_id)?,
            RelationKind::Sibling => {
                for parent in &sibling_parents {
                    self.store.link_parent(parent, &target_id)?;
                }
            }
            RelationKind::Special(label) => self.store.link_special(source, &target_id, label)?,
        }

        info!("linked {source} -> {target_id} as {kind:?}");
        Ok(target_id)
    }

    /// Parents the target must gain to become the source's sibling.
    fn plan_sibling(
        &self,
        source: &PersonId,
        target: Option<&PersonId>,
    ) -> Result<Vec<PersonId>, MutationError> {
        let parents = self.store.parents(source);
        if parents.is_empty() {
            return Err(MutationError::AmbiguousSiblingBase(source.clone()));
        }
        let Some(target) = target else {
            return Ok(parents);
        };
        if parents.contains(target) {
            return Err(MutationError::SelfRelation(target.clone()));
        }

        let mut slots = ParentSlots::for_child(self.store, target);
        let mut additions = Vec::with_capacity(parents.len());
        for parent in parents {
            let sex = self
                .store
                .person(&parent)
                .map(|p| p.sex)
                .unwrap_or_default();
            if slots.admit(&parent, sex)? {
                additions.push(parent);
            }
        }
        Ok(additions)
    }
}
