//! Layout pipeline: store → hierarchy → entries → positions → edges.
//!
//! The payload is everything a renderer needs: positioned nodes, classified
//! connectors and the bounds for initial framing. It records the store
//! revision it was computed from so stale payloads can be detected.

use serde::Serialize;
use tracing::{debug, warn};

use super::edges::{EdgeKind, PathKind, classify_edges};
use super::generations::{Bounds, Point, layout_generations};
use super::hierarchy::{DisplayId, build_hierarchy};
use super::stratify::flatten;
use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::graph::{PersonId, RelationshipStore, Sex};

/// A positioned display node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: DisplayId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<PersonId>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
    pub is_union: bool,
    pub level: f32,
    pub x: f32,
    pub y: f32,
}

/// A classified connector between two display nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub source: DisplayId,
    pub target: DisplayId,
    pub path: PathKind,
    pub kind: EdgeKind,
    pub color: String,
    pub dashed: bool,
}

/// Render-ready result of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PersonId>,
    pub revision: u64,
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl LayoutPayload {
    /// Empty payload for a store revision.
    pub fn empty(revision: u64) -> Self {
        Self {
            revision,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by display id.
    pub fn node(&self, id: &DisplayId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Position of a node by display id.
    pub fn position(&self, id: &DisplayId) -> Option<Point> {
        self.node(id).map(|n| Point::new(n.x, n.y))
    }

    /// Node positions as a flat `[x0, y0, x1, y1, ...]` buffer in node order.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.nodes.iter().flat_map(|n| [n.x, n.y]).collect()
    }
}

/// Run the full pipeline for `root`.
///
/// # Errors
///
/// `MissingRoot` when the root is not in the store.
pub fn try_compute_layout(
    store: &RelationshipStore,
    root: &PersonId,
    config: &TreeConfig,
) -> Result<LayoutPayload, TreeError> {
    let tree = build_hierarchy(store, root)?;
    let entries = flatten(&tree);
    let generations = layout_generations(&entries, &config.layout);
    let classified = classify_edges(&entries, store);

    let nodes: Vec<LayoutNode> = entries
        .iter()
        .map(|entry| {
            let point = generations
                .positions
                .get(&entry.id)
                .copied()
                .unwrap_or_default();
            let person = entry.id.person().and_then(|id| store.person(id));
            LayoutNode {
                id: entry.id.clone(),
                person_id: entry.id.person().cloned(),
                label: person.map(|p| p.name.clone()).unwrap_or_default(),
                sex: person.map(|p| p.sex),
                portrait: person.and_then(|p| p.portrait.clone()),
                is_union: entry.is_union,
                level: entry.level.as_f32(),
                x: point.x,
                y: point.y,
            }
        })
        .collect();

    let edges: Vec<LayoutEdge> = classified
        .into_iter()
        .map(|edge| LayoutEdge {
            color: config.palette.color(edge.style.kind).to_owned(),
            source: edge.source,
            target: edge.target,
            path: edge.style.path,
            kind: edge.style.kind,
            dashed: edge.style.dashed,
        })
        .collect();

    debug!(
        "layout for {root}: {} nodes, {} edges, revision {}",
        nodes.len(),
        edges.len(),
        store.revision()
    );

    Ok(LayoutPayload {
        root: Some(root.clone()),
        revision: store.revision(),
        nodes,
        edges,
        bounds: generations.bounds,
    })
}

/// Run the full pipeline. A missing root is not fatal: it yields an empty
/// payload.
pub fn compute_layout(
    store: &RelationshipStore,
    root: &PersonId,
    config: &TreeConfig,
) -> LayoutPayload {
    match try_compute_layout(store, root, config) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("{err}; rendering an empty layout");
            LayoutPayload::empty(store.revision())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{MutationEngine, NewPerson, Person, RelationKind, TargetSpec};

    fn pid(id: &str) -> PersonId {
        PersonId::from(id)
    }

    fn couple_with_kid() -> RelationshipStore {
        let mut store = RelationshipStore::new();
        store.insert_person(Person::new("p1", "Pat", Sex::Male)).unwrap();
        store.insert_person(Person::new("p2", "Sam", Sex::Female)).unwrap();
        store.insert_person(Person::new("p3", "Kim", Sex::Male)).unwrap();
        let mut engine = MutationEngine::new(&mut store);
        engine
            .create_or_link_person(&pid("p1"), TargetSpec::Existing(pid("p2")), RelationKind::Partner)
            .unwrap();
        engine
            .create_or_link_person(&pid("p2"), TargetSpec::Existing(pid("p3")), RelationKind::Child)
            .unwrap();
        store
    }

    #[test]
    fn test_missing_root_yields_empty_payload() {
        let store = couple_with_kid();
        let payload = compute_layout(&store, &pid("nobody"), &TreeConfig::default());
        assert!(payload.is_empty());
        assert!(payload.edges.is_empty());
        assert_eq!(payload.revision, store.revision());
        assert!(matches!(
            try_compute_layout(&store, &pid("nobody"), &TreeConfig::default()),
            Err(TreeError::MissingRoot(_))
        ));
    }

    #[test]
    fn test_payload_nodes_and_edges() {
        let store = couple_with_kid();
        let config = TreeConfig::default();
        let payload = compute_layout(&store, &pid("p1"), &config);

        assert_eq!(payload.nodes.len(), 4);
        assert_eq!(payload.edges.len(), 3);

        let p1 = payload.node(&DisplayId::Person(pid("p1"))).unwrap();
        assert_eq!(p1.label, "Pat");
        assert_eq!(p1.sex, Some(Sex::Male));

        let union = payload.nodes.iter().find(|n| n.is_union).unwrap();
        assert_eq!(union.level, 0.5);
        assert_eq!(union.person_id, None);
        assert_eq!(union.y, 0.5 * config.layout.level_height);

        let partner_edge = &payload.edges[0];
        assert_eq!(partner_edge.kind, EdgeKind::Partner);
        assert_eq!(partner_edge.color, config.palette.partner);
    }

    #[test]
    fn test_layout_is_deterministic() {
        let store = couple_with_kid();
        let config = TreeConfig::default();
        let first = compute_layout(&store, &pid("p1"), &config);
        let second = compute_layout(&store, &pid("p1"), &config);
        assert_eq!(first, second);
        assert_eq!(first.positions_flat(), second.positions_flat());
    }

    #[test]
    fn test_positions_flat_interleaves() {
        let store = couple_with_kid();
        let payload = compute_layout(&store, &pid("p1"), &TreeConfig::default());
        let flat = payload.positions_flat();
        assert_eq!(flat.len(), payload.nodes.len() * 2);
        assert_eq!(flat[0], payload.nodes[0].x);
        assert_eq!(flat[1], payload.nodes[0].y);
    }

    #[test]
    fn test_new_person_appears_after_relayout() {
        let mut store = couple_with_kid();
        let config = TreeConfig::default();
        let before = compute_layout(&store, &pid("p1"), &config);

        let kid = MutationEngine::new(&mut store)
            .create_or_link_person(
                &pid("p1"),
                TargetSpec::New(NewPerson::new("Lou", Sex::Female)),
                RelationKind::Child,
            )
            .unwrap();
        let after = compute_layout(&store, &pid("p1"), &config);

        assert!(after.revision > before.revision);
        assert!(before.node(&DisplayId::Person(kid.clone())).is_none());
        assert_eq!(after.node(&DisplayId::Person(kid)).unwrap().level, 1.0);
    }
}
