//! Position calculator: one centered row per generation.
//!
//! 1. Group entries by level. Levels are sparse and keyed by value, so a
//!    missing generation simply has no row.
//! 2. Order each row. Person rows keep the source tree's pre-order; union
//!    rows are ordered by their recorded position, then pre-order.
//! 3. `y = level * level_height`. Each row is centered on x = 0 with
//!    `node_width + sibling_gap` between neighboring centers.
//!
//! Rows are not aligned to their parents here. Vertical alignment comes from
//! the union nodes the hierarchy builder inserts.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::hierarchy::{DisplayId, Level};
use super::stratify::Entry;
use crate::config::LayoutConfig;

/// A point in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds of the node centers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    fn around(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    fn include(&mut self, p: Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow by `dx` left and right, `dy` up and down.
    pub fn expanded(&self, dx: f32, dy: f32) -> Self {
        Self {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

/// Result of the position calculation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationLayout {
    pub positions: HashMap<DisplayId, Point>,
    /// None when there was nothing to lay out.
    pub bounds: Option<Bounds>,
}

/// Compute a position for every entry.
pub fn layout_generations(entries: &[Entry], config: &LayoutConfig) -> GenerationLayout {
    let mut rows: BTreeMap<Level, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        rows.entry(entry.level).or_default().push(entry);
    }

    let mut positions = HashMap::with_capacity(entries.len());
    let mut bounds: Option<Bounds> = None;
    let step = config.node_width + config.sibling_gap;

    for (level, mut row) in rows {
        // Unions compare by recorded position; persons keep pre-order.
        row.sort_by_key(|e| (if e.is_union { e.position } else { 0 }, e.order));

        let count = row.len() as f32;
        let total_width = count * config.node_width + (count - 1.0) * config.sibling_gap;
        let first_x = -total_width / 2.0 + config.node_width / 2.0;
        let y = level.as_f32() * config.level_height;

        for (i, entry) in row.iter().enumerate() {
            let point = Point::new(first_x + i as f32 * step, y);
            match bounds.as_mut() {
                Some(b) => b.include(point),
                None => bounds = Some(Bounds::around(point)),
            }
            positions.insert(entry.id.clone(), point);
        }
    }

    GenerationLayout { positions, bounds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PersonId;
    use crate::layout::hierarchy::UnionDirection;

    fn person(id: &str, level: Level, order: usize) -> Entry {
        Entry {
            id: DisplayId::Person(PersonId::from(id)),
            parent_id: None,
            node: order,
            level,
            position: 0,
            is_union: false,
            order,
        }
    }

    fn union(anchor: &str, level: Level, position: usize, order: usize) -> Entry {
        Entry {
            id: DisplayId::Union {
                anchor: PersonId::from(anchor),
                direction: UnionDirection::Children,
            },
            parent_id: None,
            node: order,
            level,
            position,
            is_union: true,
            order,
        }
    }

    fn at(layout: &GenerationLayout, id: &str) -> Point {
        layout.positions[&DisplayId::Person(PersonId::from(id))]
    }

    #[test]
    fn test_empty() {
        let layout = layout_generations(&[], &LayoutConfig::default());
        assert!(layout.positions.is_empty());
        assert_eq!(layout.bounds, None);
    }

    #[test]
    fn test_single_entry_centered_at_origin() {
        let layout = layout_generations(&[person("p1", Level::ROOT, 0)], &LayoutConfig::default());
        assert_eq!(at(&layout, "p1"), Point::new(0.0, 0.0));
        assert_eq!(layout.bounds.unwrap().width(), 0.0);
    }

    #[test]
    fn test_row_is_centered_and_evenly_spaced() {
        let config = LayoutConfig {
            node_width: 100.0,
            node_height: 50.0,
            sibling_gap: 20.0,
            level_height: 150.0,
        };
        let entries = [
            person("a", Level::generation(1), 0),
            person("b", Level::generation(1), 1),
            person("c", Level::generation(1), 2),
        ];
        let layout = layout_generations(&entries, &config);

        // total = 3*100 + 2*20 = 340, first center = -170 + 50
        assert_eq!(at(&layout, "a"), Point::new(-120.0, 150.0));
        assert_eq!(at(&layout, "b"), Point::new(0.0, 150.0));
        assert_eq!(at(&layout, "c"), Point::new(120.0, 150.0));
    }

    #[test]
    fn test_sparse_and_half_levels() {
        let config = LayoutConfig::default();
        let entries = [
            person("root", Level::ROOT, 0),
            union("root", Level::ROOT.half_below(), 0, 1),
            person("grandkid", Level::generation(2), 2),
        ];
        let layout = layout_generations(&entries, &config);

        assert_eq!(at(&layout, "grandkid").y, 2.0 * config.level_height);
        let union_point = layout.positions[&entries[1].id];
        assert_eq!(union_point, Point::new(0.0, 0.5 * config.level_height));

        let bounds = layout.bounds.unwrap();
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.max_y, 2.0 * config.level_height);
    }

    #[test]
    fn test_unions_on_a_row_order_by_position() {
        let level = Level::ROOT.half_below();
        let entries = [union("late", level, 3, 0), union("early", level, 1, 1)];
        let layout = layout_generations(&entries, &LayoutConfig::default());

        let late = layout.positions[&entries[0].id];
        let early = layout.positions[&entries[1].id];
        assert!(early.x < late.x);
    }

    #[test]
    fn test_no_two_siblings_share_x() {
        let entries: Vec<Entry> = (0..7)
            .map(|i| person(&format!("p{i}"), Level::ROOT, i))
            .collect();
        let layout = layout_generations(&entries, &LayoutConfig::default());

        let mut xs: Vec<f32> = layout.positions.values().map(|p| p.x).collect();
        xs.sort_by(f32::total_cmp);
        xs.dedup();
        assert_eq!(xs.len(), 7);
    }
}
