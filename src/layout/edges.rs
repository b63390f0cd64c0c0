//! Edge classifier: connector geometry and semantic color for drawn edges.
//!
//! Only display-tree parent → child pairs are classified, so the cost is
//! linear in the number of drawn edges.

use std::collections::HashMap;

use serde::Serialize;

use super::hierarchy::DisplayId;
use super::stratify::Entry;
use crate::config::EdgePalette;
use crate::graph::RelationshipStore;

/// Connector geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Straight,
    Curve,
}

/// Semantic meaning of a connector, mapped to a color by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Parent,
    Child,
    Partner,
    Union,
    Neutral,
}

impl EdgePalette {
    /// Color for a semantic edge kind.
    pub fn color(&self, kind: EdgeKind) -> &str {
        match kind {
            EdgeKind::Parent => &self.parent,
            EdgeKind::Child => &self.child,
            EdgeKind::Partner => &self.partner,
            EdgeKind::Union => &self.union,
            EdgeKind::Neutral => &self.neutral,
        }
    }
}

/// How one connector should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeStyle {
    pub path: PathKind,
    pub kind: EdgeKind,
    pub dashed: bool,
}

/// A classified display edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEdge {
    pub source: DisplayId,
    pub target: DisplayId,
    pub style: EdgeStyle,
}

/// Classify the connector from `source` to `target`.
///
/// Rules, first match wins:
/// 1. either end is a union: straight, dashed;
/// 2. partners (either direction): partner curve;
/// 3. target is one of source's children: child curve;
/// 4. source is one of target's parents: parent curve;
/// 5. otherwise a neutral curve.
pub fn classify(source: &Entry, target: &Entry, store: &RelationshipStore) -> EdgeStyle {
    let curve = |kind| EdgeStyle {
        path: PathKind::Curve,
        kind,
        dashed: false,
    };

    let (Some(from), Some(to)) = (source.id.person(), target.id.person()) else {
        return EdgeStyle {
            path: PathKind::Straight,
            kind: EdgeKind::Union,
            dashed: true,
        };
    };

    if store.partners(from).contains(to) || store.partners(to).contains(from) {
        curve(EdgeKind::Partner)
    } else if store.children(from).contains(to) {
        curve(EdgeKind::Child)
    } else if store.parents(to).contains(from) {
        curve(EdgeKind::Parent)
    } else {
        curve(EdgeKind::Neutral)
    }
}

/// Classify every drawn edge of a flattened tree, in entry order.
pub fn classify_edges(entries: &[Entry], store: &RelationshipStore) -> Vec<ClassifiedEdge> {
    let by_id: HashMap<&DisplayId, &Entry> = entries.iter().map(|e| (&e.id, e)).collect();

    entries
        .iter()
        .filter_map(|target| {
            let source = by_id.get(target.parent_id.as_ref()?)?;
            Some(ClassifiedEdge {
                source: source.id.clone(),
                target: target.id.clone(),
                style: classify(source, target, store),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Person, PersonId, RelationKind, Sex, TargetSpec, MutationEngine};
    use crate::layout::hierarchy::{build_hierarchy, Level, UnionDirection};
    use crate::layout::stratify::flatten;

    fn pid(id: &str) -> PersonId {
        PersonId::from(id)
    }

    fn entry(id: DisplayId) -> Entry {
        Entry {
            is_union: id.is_union(),
            id,
            parent_id: None,
            node: 0,
            level: Level::ROOT,
            position: 0,
            order: 0,
        }
    }

    fn person_entry(id: &str) -> Entry {
        entry(DisplayId::Person(pid(id)))
    }

    fn store() -> RelationshipStore {
        let mut store = RelationshipStore::new();
        for (id, sex) in [
            ("a", Sex::Male),
            ("b", Sex::Female),
            ("kid", Sex::Male),
            ("stranger", Sex::Unknown),
        ] {
            store.insert_person(Person::new(id, id, sex)).unwrap();
        }
        let mut engine = MutationEngine::new(&mut store);
        engine
            .create_or_link_person(&pid("a"), TargetSpec::Existing(pid("b")), RelationKind::Partner)
            .unwrap();
        engine
            .create_or_link_person(&pid("a"), TargetSpec::Existing(pid("kid")), RelationKind::Child)
            .unwrap();
        store
    }

    #[test]
    fn test_union_endpoint_is_straight_and_dashed() {
        let store = store();
        let union = entry(DisplayId::Union {
            anchor: pid("a"),
            direction: UnionDirection::Children,
        });
        let style = classify(&person_entry("a"), &union, &store);
        assert_eq!(
            style,
            EdgeStyle {
                path: PathKind::Straight,
                kind: EdgeKind::Union,
                dashed: true,
            }
        );
        assert_eq!(classify(&union, &person_entry("kid"), &store).kind, EdgeKind::Union);
    }

    #[test]
    fn test_partner_edge_either_direction() {
        let store = store();
        for (from, to) in [("a", "b"), ("b", "a")] {
            let style = classify(&person_entry(from), &person_entry(to), &store);
            assert_eq!(style.kind, EdgeKind::Partner);
            assert_eq!(style.path, PathKind::Curve);
            assert!(!style.dashed);
        }
    }

    #[test]
    fn test_child_and_parent_edges() {
        let store = store();
        assert_eq!(
            classify(&person_entry("a"), &person_entry("kid"), &store).kind,
            EdgeKind::Child
        );
        assert_eq!(
            classify(&person_entry("kid"), &person_entry("a"), &store).kind,
            EdgeKind::Neutral
        );
        assert_eq!(
            classify(&person_entry("a"), &person_entry("stranger"), &store).kind,
            EdgeKind::Neutral
        );
    }

    #[test]
    fn test_classify_edges_covers_display_edges_only() {
        let store = store();
        let tree = build_hierarchy(&store, &pid("a")).unwrap();
        let entries = flatten(&tree);
        let edges = classify_edges(&entries, &store);

        // a -> b (partner), a -> union, union -> kid
        assert_eq!(edges.len(), entries.len() - 1);
        assert_eq!(edges[0].style.kind, EdgeKind::Partner);
        assert!(edges[1..].iter().all(|e| e.style.dashed));
    }

    #[test]
    fn test_palette_lookup() {
        let palette = EdgePalette::default();
        assert_eq!(palette.color(EdgeKind::Partner), palette.partner);
    }
}
