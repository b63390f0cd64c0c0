//! Family tree layout pipeline.
//!
//! Each stage is a pure function of the previous one's output and never
//! touches the relationship store except to read it:
//!
//! - `hierarchy`: cycle-safe walk from the root into a display tree with
//!   synthetic union nodes
//! - `stratify`: pre-order flattening into parent-indexed entries
//! - `generations`: per-generation centered row placement
//! - `edges`: connector geometry and semantic color
//! - `payload`: assembly into the render-ready result

pub mod edges;
pub mod generations;
pub mod hierarchy;
pub mod payload;
pub mod stratify;

pub use edges::{ClassifiedEdge, EdgeKind, EdgeStyle, PathKind, classify, classify_edges};
pub use generations::{Bounds, GenerationLayout, Point, layout_generations};
pub use hierarchy::{DisplayId, DisplayNode, DisplayTree, Level, UnionDirection, build_hierarchy};
pub use payload::{LayoutEdge, LayoutNode, LayoutPayload, compute_layout, try_compute_layout};
pub use stratify::{Entry, flatten};
