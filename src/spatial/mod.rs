//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index over laid-out node
//! centers, used by the view controller to pick nodes under the cursor.

mod rtree;

pub use rtree::SpatialIndex;
