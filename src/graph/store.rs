//! RelationshipStore - the single source of truth for the family graph.
//!
//! Persons are nodes of a petgraph `StableGraph`, relationships are typed
//! edges. Each structural link is stored exactly once:
//!
//! - parent/child is one directed `Relation::Parent` edge (parent → child),
//!   so `children` and `parents` are always mutual inverses;
//! - a couple is one `Relation::Partner` edge read from both endpoints,
//!   so `partners` is always symmetric;
//! - special relations are `Relation::Special` edges read from the source only.
//!
//! Edges can only be added between nodes that exist, which rules out
//! dangling references. Cardinality and sex rules are enforced by the
//! mutation engine before it calls the `link_*` methods.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use std::collections::HashMap;

use super::person::{Person, PersonId, Relation, Relations, SpecialRelation};
use crate::error::MutationError;

/// In-memory relationship graph for one family tree.
#[derive(Debug, Clone, Default)]
pub struct RelationshipStore {
    /// Nodes hold the person record, edges the relation.
    graph: StableGraph<Person, Relation, Directed>,

    /// Map from stable PersonId to petgraph NodeIndex
    index: HashMap<PersonId, NodeIndex>,

    /// Bumped on every successful write.
    revision: u64,
}

impl RelationshipStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Persons
    // =========================================================================

    /// Insert a person under its own id.
    pub fn insert_person(&mut self, person: Person) -> Result<(), MutationError> {
        if self.index.contains_key(&person.id) {
            return Err(MutationError::DuplicatePerson(person.id));
        }
        let id = person.id.clone();
        let node = self.graph.add_node(person);
        self.index.insert(id, node);
        self.revision += 1;
        Ok(())
    }

    /// Whether a person with this id exists.
    pub fn contains(&self, id: &PersonId) -> bool {
        self.index.contains_key(id)
    }

    /// Look up a person record.
    pub fn person(&self, id: &PersonId) -> Option<&Person> {
        self.index.get(id).and_then(|&node| self.graph.node_weight(node))
    }

    /// Iterate over all persons in insertion order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.graph
            .node_indices()
            .filter_map(|node| self.graph.node_weight(node))
    }

    /// Get the number of persons.
    pub fn person_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of stored relation edges.
    pub fn relation_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Monotonic write counter, used to detect stale layouts.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Remove every person and relation.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.index.clear();
        self.revision += 1;
    }

    // =========================================================================
    // Relationship lists
    // =========================================================================

    /// Parents of a person, in the order they were linked.
    pub fn parents(&self, id: &PersonId) -> Vec<PersonId> {
        self.related(id, Direction::Incoming, |r| matches!(r, Relation::Parent))
    }

    /// Children of a person, in the order they were linked.
    pub fn children(&self, id: &PersonId) -> Vec<PersonId> {
        self.related(id, Direction::Outgoing, |r| matches!(r, Relation::Parent))
    }

    /// Partners of a person, in the order they were linked.
    pub fn partners(&self, id: &PersonId) -> Vec<PersonId> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .filter(|e| matches!(e.weight(), Relation::Partner))
            .map(|e| (e.id(), e.target()))
            .chain(
                self.graph
                    .edges_directed(node, Direction::Incoming)
                    .filter(|e| matches!(e.weight(), Relation::Partner))
                    .map(|e| (e.id(), e.source())),
            )
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        self.resolve(edges)
    }

    /// Special relations recorded on a person, in the order they were linked.
    pub fn special_relations(&self, id: &PersonId) -> Vec<SpecialRelation> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .filter_map(|e| match e.weight() {
                Relation::Special(kind) => Some((e.id(), kind.clone(), e.target())),
                _ => None,
            })
            .collect();
        edges.sort_by_key(|(edge, _, _)| *edge);
        edges
            .into_iter()
            .filter_map(|(_, kind, target)| {
                self.graph.node_weight(target).map(|p| SpecialRelation {
                    kind,
                    person: p.id.clone(),
                })
            })
            .collect()
    }

    /// All four relationship lists of a person.
    pub fn relations(&self, id: &PersonId) -> Option<Relations> {
        self.contains(id).then(|| Relations {
            parents: self.parents(id),
            children: self.children(id),
            partners: self.partners(id),
            special_relations: self.special_relations(id),
        })
    }

    /// Whether `parent` is recorded as a parent of `child`.
    pub fn is_parent_of(&self, parent: &PersonId, child: &PersonId) -> bool {
        self.find_edge(parent, child, |r| matches!(r, Relation::Parent))
    }

    /// Whether the two persons are partners (in either direction).
    pub fn are_partners(&self, a: &PersonId, b: &PersonId) -> bool {
        self.find_edge(a, b, |r| matches!(r, Relation::Partner))
            || self.find_edge(b, a, |r| matches!(r, Relation::Partner))
    }

    // =========================================================================
    // Raw links (validated by the mutation engine)
    // =========================================================================

    /// Record `parent` as a parent of `child`. Idempotent.
    pub(crate) fn link_parent(
        &mut self,
        parent: &PersonId,
        child: &PersonId,
    ) -> Result<(), MutationError> {
        if self.is_parent_of(parent, child) {
            return Ok(());
        }
        let (from, to) = self.endpoints(parent, child)?;
        self.graph.add_edge(from, to, Relation::Parent);
        self.revision += 1;
        Ok(())
    }

    /// Record `a` and `b` as partners. Idempotent.
    pub(crate) fn link_partners(
        &mut self,
        a: &PersonId,
        b: &PersonId,
    ) -> Result<(), MutationError> {
        if self.are_partners(a, b) {
            return Ok(());
        }
        let (from, to) = self.endpoints(a, b)?;
        self.graph.add_edge(from, to, Relation::Partner);
        self.revision += 1;
        Ok(())
    }

    /// Record a one-directional special relation on `source`.
    pub(crate) fn link_special(
        &mut self,
        source: &PersonId,
        target: &PersonId,
        kind: &str,
    ) -> Result<(), MutationError> {
        if self
            .special_relations(source)
            .iter()
            .any(|r| r.kind == kind && &r.person == target)
        {
            return Ok(());
        }
        let (from, to) = self.endpoints(source, target)?;
        self.graph
            .add_edge(from, to, Relation::Special(kind.to_owned()));
        self.revision += 1;
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn endpoints(
        &self,
        a: &PersonId,
        b: &PersonId,
    ) -> Result<(NodeIndex, NodeIndex), MutationError> {
        let from = self
            .index
            .get(a)
            .ok_or_else(|| MutationError::DanglingReference(a.clone()))?;
        let to = self
            .index
            .get(b)
            .ok_or_else(|| MutationError::DanglingReference(b.clone()))?;
        Ok((*from, *to))
    }

    fn find_edge(&self, a: &PersonId, b: &PersonId, want: impl Fn(&Relation) -> bool) -> bool {
        let (Some(&from), Some(&to)) = (self.index.get(a), self.index.get(b)) else {
            return false;
        };
        self.graph
            .edges_connecting(from, to)
            .any(|e| want(e.weight()))
    }

    /// Neighbors over matching edges in one direction, sorted by edge index.
    /// Edges are never removed, so edge index order is insertion order.
    fn related(
        &self,
        id: &PersonId,
        direction: Direction,
        want: impl Fn(&Relation) -> bool,
    ) -> Vec<PersonId> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(node, direction)
            .filter(|e| want(e.weight()))
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other)
            })
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        self.resolve(edges)
    }

    fn resolve(&self, edges: Vec<(EdgeIndex, NodeIndex)>) -> Vec<PersonId> {
        edges
            .into_iter()
            .filter_map(|(_, node)| self.graph.node_weight(node).map(|p| p.id.clone()))
            .collect()
    }
}
