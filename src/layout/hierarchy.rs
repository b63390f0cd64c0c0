//! Hierarchy builder: relationship graph → display tree.
//!
//! The relationship graph is cyclic and multi-rooted (couples, shared
//! ancestors). A single depth-first walk from the chosen root turns it into a
//! tree of display nodes:
//!
//! 1. Partners are drawn on the same row as display children of the person.
//! 2. Children are grouped under a synthetic union node half a generation
//!    below the person, which then branches down to each child.
//! 3. Parents are grouped the same way under a union node half a generation
//!    above.
//!
//! A shared `visited` set makes the walk cycle-safe. The first path that
//! reaches a person draws it; every later path skips it. This first-visit-wins
//! policy is fixed, not configurable.

use std::collections::HashSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::TreeError;
use crate::graph::{PersonId, RelationshipStore};

/// Generation index in half steps. Person rows sit on whole generations,
/// union connectors on the half generations between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Level(i32);

impl Level {
    /// Level of the root person.
    pub const ROOT: Level = Level(0);

    /// Level of a whole generation (negative = ancestors).
    pub const fn generation(n: i32) -> Self {
        Self(n * 2)
    }

    /// Child generation.
    pub const fn below(self) -> Self {
        Self(self.0 + 2)
    }

    /// Parent generation.
    pub const fn above(self) -> Self {
        Self(self.0 - 2)
    }

    /// Half a generation down (union of children).
    pub const fn half_below(self) -> Self {
        Self(self.0 + 1)
    }

    /// Half a generation up (union of parents).
    pub const fn half_above(self) -> Self {
        Self(self.0 - 1)
    }

    /// Whether this is a connector row between two generations.
    pub const fn is_half(self) -> bool {
        self.0 % 2 != 0
    }

    /// Generation as a float, e.g. `0.5` for a union under the root.
    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 2.0
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.as_f32())
    }
}

/// Which relatives a union node gathers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionDirection {
    Children,
    Parents,
}

/// Identity of a display node.
///
/// Union ids derive from their anchor person and direction, so rebuilding the
/// tree from an unchanged store always yields the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DisplayId {
    Person(PersonId),
    Union {
        anchor: PersonId,
        direction: UnionDirection,
    },
}

impl DisplayId {
    pub fn is_union(&self) -> bool {
        matches!(self, DisplayId::Union { .. })
    }

    /// The person behind a person node.
    pub fn person(&self) -> Option<&PersonId> {
        match self {
            DisplayId::Person(id) => Some(id),
            DisplayId::Union { .. } => None,
        }
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayId::Person(id) => write!(f, "{id}"),
            DisplayId::Union {
                anchor,
                direction: UnionDirection::Children,
            } => write!(f, "union:children:{anchor}"),
            DisplayId::Union {
                anchor,
                direction: UnionDirection::Parents,
            } => write!(f, "union:parents:{anchor}"),
        }
    }
}

impl Serialize for DisplayId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One node of the display tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub id: DisplayId,
    pub level: Level,
    /// Order hint among nodes created from the same parent.
    pub position: usize,
    /// Drawn edges, as indices into the owning [`DisplayTree`].
    pub children: Vec<usize>,
}

impl DisplayNode {
    pub fn is_union(&self) -> bool {
        self.id.is_union()
    }
}

/// Arena of display nodes. Index 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTree {
    nodes: Vec<DisplayNode>,
}

impl DisplayTree {
    /// The root node.
    pub fn root(&self) -> &DisplayNode {
        &self.nodes[0]
    }

    pub fn root_index(&self) -> usize {
        0
    }

    pub fn node(&self, index: usize) -> Option<&DisplayNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayNode> {
        self.nodes.iter()
    }
}

struct HierarchyBuilder<'a> {
    store: &'a RelationshipStore,
    visited: HashSet<PersonId>,
    nodes: Vec<DisplayNode>,
}

/// Build the display tree rooted at `root`.
///
/// Every person appears at most once. An isolated person yields a single
/// leaf node.
///
/// # Errors
///
/// `MissingRoot` when the root is not in the store.
pub fn build_hierarchy(
    store: &RelationshipStore,
    root: &PersonId,
) -> Result<DisplayTree, TreeError> {
    let mut builder = HierarchyBuilder {
        store,
        visited: HashSet::with_capacity(store.person_count()),
        nodes: Vec::with_capacity(store.person_count()),
    };

    match builder.visit(root, Level::ROOT, 0) {
        Some(_) => Ok(DisplayTree {
            nodes: builder.nodes,
        }),
        None => Err(TreeError::MissingRoot(root.clone())),
    }
}

impl HierarchyBuilder<'_> {
    /// Visit a person, returning its arena index, or None when it is unknown
    /// or already drawn (this guard is what breaks cycles).
    fn visit(&mut self, person: &PersonId, level: Level, position: usize) -> Option<usize> {
        if !self.store.contains(person) || !self.visited.insert(person.clone()) {
            return None;
        }

        let index = self.nodes.len();
        self.nodes.push(DisplayNode {
            id: DisplayId::Person(person.clone()),
            level,
            position,
            children: Vec::new(),
        });

        let mut drawn = Vec::new();

        // Partners share the row
        let mut next_position = position;
        for partner in self.store.partners(person) {
            if let Some(child) = self.visit(&partner, level, next_position + 1) {
                next_position += 1;
                drawn.push(child);
            }
        }

        let children = self.visit_all(self.store.children(person), level.below());
        if !children.is_empty() {
            drawn.push(self.push_union(
                person,
                UnionDirection::Children,
                level.half_below(),
                position,
                children,
            ));
        }

        let parents = self.visit_all(self.store.parents(person), level.above());
        if !parents.is_empty() {
            drawn.push(self.push_union(
                person,
                UnionDirection::Parents,
                level.half_above(),
                position,
                parents,
            ));
        }

        self.nodes[index].children = drawn;
        Some(index)
    }

    fn visit_all(&mut self, people: Vec<PersonId>, level: Level) -> Vec<usize> {
        let mut drawn = Vec::with_capacity(people.len());
        for person in &people {
            if let Some(index) = self.visit(person, level, drawn.len()) {
                drawn.push(index);
            }
        }
        drawn
    }

    fn push_union(
        &mut self,
        anchor: &PersonId,
        direction: UnionDirection,
        level: Level,
        position: usize,
        children: Vec<usize>,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(DisplayNode {
            id: DisplayId::Union {
                anchor: anchor.clone(),
                direction,
            },
            level,
            position,
            children,
        });
        index
    }
}
