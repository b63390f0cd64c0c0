//! Person records and the relation vocabulary stored on graph edges.
//!
//! A person carries only its own descriptive data. The four relationship
//! lists (parents, children, partners, special relations) are read from the
//! edges of the relationship graph, see [`super::RelationshipStore`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable person identifier.
///
/// The backend hands out either numeric or string ids. Both are normalized
/// to their string form so the two never collide in maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    /// Create a new PersonId from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id for a person created by the editor.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the raw string value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PersonId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for PersonId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for PersonId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from(n),
            // JS numbers may arrive as floats; integral ones keep their integer form.
            RawId::Float(f) if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 => {
                Self::from(f as u64)
            }
            RawId::Float(f) => Self(f.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Recorded sex of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl<'de> Deserialize<'de> for Sex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Sex::parse).unwrap_or_default())
    }
}

impl Sex {
    /// Parse the loose labels the backend uses. Anything unrecognized is unknown.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Sex::Male,
            "f" | "female" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    /// Whether this sex is known. Unknown-sex parents are never in conflict.
    #[inline]
    pub fn is_known(self) -> bool {
        self != Sex::Unknown
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Descriptive data of one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
}

impl Person {
    /// Create a person with just a name and sex.
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>, sex: Sex) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sex,
            birth_date: None,
            birth_place: None,
            portrait: None,
        }
    }
}

/// Inline data for a person that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub portrait: Option<String>,
}

impl NewPerson {
    pub fn new(name: impl Into<String>, sex: Sex) -> Self {
        Self {
            name: name.into(),
            sex,
            ..Default::default()
        }
    }

    /// Materialize into a person with the given id.
    pub fn into_person(self, id: PersonId) -> Person {
        Person {
            id,
            name: self.name,
            sex: self.sex,
            birth_date: self.birth_date,
            birth_place: self.birth_place,
            portrait: self.portrait,
        }
    }
}

/// Edge weight in the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// Directed parent → child edge. Read as `children` from the source and
    /// as `parents` from the target.
    Parent,
    /// A single edge per couple, read as `partners` from both endpoints.
    Partner,
    /// One-directional informal relation (uncle, cousin, ...), read only
    /// from the source.
    Special(String),
}

/// A special relation as seen from its source person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecialRelation {
    pub kind: String,
    pub person: PersonId,
}

/// The four relationship lists of one person, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relations {
    pub parents: Vec<PersonId>,
    pub children: Vec<PersonId>,
    pub partners: Vec<PersonId>,
    pub special_relations: Vec<SpecialRelation>,
}
