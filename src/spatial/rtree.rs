//! R-tree based spatial index over laid-out node centers, using rstar.
//!
//! Points are keyed by their slot in [`crate::layout::LayoutPayload::nodes`].

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::LayoutPayload;

/// A node center with its payload slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    pub slot: usize,
    pub x: f32,
    pub y: f32,
}

impl NodePoint {
    pub fn new(slot: usize, x: f32, y: f32) -> Self {
        Self { slot, x, y }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index for hit testing display nodes.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load the person nodes of a payload. Union connectors are not
    /// selectable and are left out.
    pub fn from_payload(payload: &LayoutPayload) -> Self {
        let points = payload
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.is_union)
            .map(|(slot, n)| NodePoint::new(slot, n.x, n.y))
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Find the nearest node within a maximum distance.
    pub fn nearest_within(&self, x: f32, y: f32, max_distance: f32) -> Option<usize> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.slot)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
