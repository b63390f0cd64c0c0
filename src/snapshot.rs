//! Tree snapshots delivered by the person/relationship service.
//!
//! A snapshot carries every person of one tree plus typed relationship edges.
//! Each edge reads "target is the `relation` of source", e.g.
//! `{source: kid, target: mom, relation: MOTHER}`.
//!
//! Loading creates all persons first, then replays edges through the
//! mutation engine in three passes: parent/child/partner, sibling, special.
//! Sibling edges need parents in place, so they go second. An edge the
//! engine rejects is logged and reported, and the rest of the load goes on.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::MutationError;
use crate::graph::{MutationEngine, Person, PersonId, RelationKind, RelationshipStore, TargetSpec};

/// Relation tag vocabulary of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Father,
    Mother,
    Son,
    Daughter,
    Brother,
    Sister,
    Husband,
    Wife,
    Grandfather,
    Grandmother,
    Grandson,
    Granddaughter,
    Uncle,
    Aunt,
    Nephew,
    Niece,
    Cousin,
}

impl RelationType {
    pub const ALL: [RelationType; 17] = [
        RelationType::Father,
        RelationType::Mother,
        RelationType::Son,
        RelationType::Daughter,
        RelationType::Brother,
        RelationType::Sister,
        RelationType::Husband,
        RelationType::Wife,
        RelationType::Grandfather,
        RelationType::Grandmother,
        RelationType::Grandson,
        RelationType::Granddaughter,
        RelationType::Uncle,
        RelationType::Aunt,
        RelationType::Nephew,
        RelationType::Niece,
        RelationType::Cousin,
    ];

    /// Parse a tag case-insensitively (`"MOTHER"`, `"mother"`).
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|relation| relation.label().eq_ignore_ascii_case(tag))
    }

    /// Map the tag onto the editor's relation kinds.
    pub fn kind(self) -> RelationKind {
        match self {
            RelationType::Father | RelationType::Mother => RelationKind::Parent,
            RelationType::Son | RelationType::Daughter => RelationKind::Child,
            RelationType::Husband | RelationType::Wife => RelationKind::Partner,
            RelationType::Brother | RelationType::Sister => RelationKind::Sibling,
            special => RelationKind::Special(special.label().to_owned()),
        }
    }

    /// Lowercase tag, used as the kind of special relations.
    pub fn label(self) -> &'static str {
        match self {
            RelationType::Father => "father",
            RelationType::Mother => "mother",
            RelationType::Son => "son",
            RelationType::Daughter => "daughter",
            RelationType::Brother => "brother",
            RelationType::Sister => "sister",
            RelationType::Husband => "husband",
            RelationType::Wife => "wife",
            RelationType::Grandfather => "grandfather",
            RelationType::Grandmother => "grandmother",
            RelationType::Grandson => "grandson",
            RelationType::Granddaughter => "granddaughter",
            RelationType::Uncle => "uncle",
            RelationType::Aunt => "aunt",
            RelationType::Nephew => "nephew",
            RelationType::Niece => "niece",
            RelationType::Cousin => "cousin",
        }
    }

    fn pass(self) -> u8 {
        match self.kind() {
            RelationKind::Parent | RelationKind::Child | RelationKind::Partner => 0,
            RelationKind::Sibling => 1,
            RelationKind::Special(_) => 2,
        }
    }
}

/// One typed edge of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub source: PersonId,
    pub target: PersonId,
    pub relation: RelationType,
}

/// Full contents of one tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub tree_id: String,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,
}

/// An edge that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedEdge {
    pub record: RelationshipRecord,
    pub reason: String,
    #[serde(skip)]
    pub error: MutationError,
}

/// Outcome of loading a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub persons: usize,
    pub relationships: usize,
    pub rejected_persons: Vec<PersonId>,
    pub rejected: Vec<RejectedEdge>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.rejected_persons.is_empty()
    }
}

impl TreeSnapshot {
    /// Load persons and edges into `store`.
    pub fn load_into(self, store: &mut RelationshipStore) -> LoadReport {
        let mut report = LoadReport::default();

        for person in self.persons {
            let id = person.id.clone();
            match store.insert_person(person) {
                Ok(()) => report.persons += 1,
                Err(err) => {
                    warn!("tree {}: skipping person: {err}", self.tree_id);
                    report.rejected_persons.push(id);
                }
            }
        }

        let mut records = self.relationships;
        // Stable, so edges keep their order within a pass.
        records.sort_by_key(|r| r.relation.pass());

        let mut engine = MutationEngine::new(store);
        for record in records {
            let applied = engine.create_or_link_person(
                &record.source,
                TargetSpec::Existing(record.target.clone()),
                record.relation.kind(),
            );
            match applied {
                Ok(_) => report.relationships += 1,
                Err(error) => {
                    warn!(
                        "tree {}: rejected {:?} {} -> {}: {error}",
                        self.tree_id, record.relation, record.source, record.target
                    );
                    report.rejected.push(RejectedEdge {
                        reason: error.to_string(),
                        record,
                        error,
                    });
                }
            }
        }

        info!(
            "tree {}: loaded {} persons, {} relationships, {} rejected",
            self.tree_id,
            report.persons,
            report.relationships,
            report.rejected.len() + report.rejected_persons.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Sex, SpecialRelation};

    fn pid(id: &str) -> PersonId {
        PersonId::from(id)
    }

    fn load(snapshot: TreeSnapshot) -> (RelationshipStore, LoadReport) {
        let mut store = RelationshipStore::new();
        let report = snapshot.load_into(&mut store);
        (store, report)
    }

    const SNAPSHOT: &str = r#"{
        "treeId": "t1",
        "persons": [
            {"id": 1, "name": "Kid", "sex": "M"},
            {"id": 2, "name": "Dad", "sex": "M", "birthPlace": "Oslo"},
            {"id": 3, "name": "Mom", "sex": "F"},
            {"id": 4, "name": "Sis", "sex": "F"},
            {"id": 5, "name": "Uncle", "sex": "M"}
        ],
        "relationships": [
            {"source": 1, "target": 4, "relation": "SISTER"},
            {"source": 1, "target": 5, "relation": "UNCLE"},
            {"source": 2, "target": 3, "relation": "WIFE"},
            {"source": 1, "target": 2, "relation": "FATHER"},
            {"source": 3, "target": 1, "relation": "SON"}
        ]
    }"#;

    #[test]
    fn test_relation_type_mapping() {
        assert_eq!(RelationType::Mother.kind(), RelationKind::Parent);
        assert_eq!(RelationType::Daughter.kind(), RelationKind::Child);
        assert_eq!(RelationType::Husband.kind(), RelationKind::Partner);
        assert_eq!(RelationType::Brother.kind(), RelationKind::Sibling);
        assert_eq!(
            RelationType::Cousin.kind(),
            RelationKind::Special("cousin".into())
        );
        let parsed: RelationType = serde_json::from_str(r#""GRANDDAUGHTER""#).unwrap();
        assert_eq!(parsed, RelationType::Granddaughter);
        assert_eq!(RelationType::parse(" Wife"), Some(RelationType::Wife));
        assert_eq!(RelationType::parse("godmother"), None);
    }

    #[test]
    fn test_load_snapshot() {
        let snapshot: TreeSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let (store, report) = load(snapshot);

        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.persons, 5);
        assert_eq!(report.relationships, 5);

        assert_eq!(store.parents(&pid("1")), vec![pid("2"), pid("3")]);
        assert_eq!(store.partners(&pid("3")), vec![pid("2")]);
        assert_eq!(store.person(&pid("2")).unwrap().birth_place.as_deref(), Some("Oslo"));
    }

    #[test]
    fn test_sibling_applied_after_parents() {
        let snapshot: TreeSnapshot = serde_json::from_str(SNAPSHOT).unwrap();
        let (store, _) = load(snapshot);

        // SISTER came first in the payload but needs the parents in place
        assert_eq!(store.parents(&pid("4")), vec![pid("2"), pid("3")]);
        assert_eq!(
            store.special_relations(&pid("1")),
            vec![SpecialRelation {
                kind: "uncle".into(),
                person: pid("5"),
            }]
        );
    }

    #[test]
    fn test_invalid_edges_are_reported_not_fatal() {
        let snapshot = TreeSnapshot {
            tree_id: "t2".into(),
            persons: vec![
                Person::new("kid", "Kid", Sex::Male),
                Person::new("d1", "Dad", Sex::Male),
                Person::new("d2", "Other dad", Sex::Male),
                Person::new("kid", "Duplicate", Sex::Male),
            ],
            relationships: vec![
                RelationshipRecord {
                    source: pid("kid"),
                    target: pid("d1"),
                    relation: RelationType::Father,
                },
                RelationshipRecord {
                    source: pid("kid"),
                    target: pid("d2"),
                    relation: RelationType::Father,
                },
                RelationshipRecord {
                    source: pid("kid"),
                    target: pid("ghost"),
                    relation: RelationType::Cousin,
                },
            ],
        };
        let (store, report) = load(snapshot);

        assert_eq!(report.persons, 3);
        assert_eq!(report.rejected_persons, vec![pid("kid")]);
        assert_eq!(report.relationships, 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(matches!(
            report.rejected[0].error,
            MutationError::DuplicateParentSex { .. }
        ));
        assert_eq!(
            report.rejected[1].error,
            MutationError::DanglingReference(pid("ghost"))
        );
        assert_eq!(store.parents(&pid("kid")), vec![pid("d1")]);
        assert_eq!(store.person(&pid("kid")).unwrap().name, "Kid");
    }
}
