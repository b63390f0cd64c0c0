//! Configuration for layout, edge colors and the view.
//!
//! Every struct deserializes from a partial JS object: missing fields fall
//! back to their defaults.

use serde::{Deserialize, Serialize};

/// Geometry of the generation layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of a person card.
    pub node_width: f32,
    /// Height of a person card.
    pub node_height: f32,
    /// Horizontal gap between neighbors on the same row.
    pub sibling_gap: f32,
    /// Vertical distance between two generations.
    pub level_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 160.0,
            node_height: 80.0,
            sibling_gap: 40.0,
            level_height: 120.0,
        }
    }
}

/// Colors for each semantic edge kind, as CSS color strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgePalette {
    pub parent: String,
    pub child: String,
    pub partner: String,
    pub union: String,
    pub neutral: String,
}

impl Default for EdgePalette {
    fn default() -> Self {
        Self {
            parent: "#4a90d9".into(),
            child: "#50b36b".into(),
            partner: "#d9534f".into(),
            union: "#9aa0a6".into(),
            neutral: "#6c757d".into(),
        }
    }
}

/// Limits of the pan/zoom controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Screen-space padding kept around the tree when fitting it.
    pub fit_padding: f32,
    /// Screen-space radius within which a click selects a node.
    pub hit_radius: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 4.0,
            fit_padding: 32.0,
            hit_radius: 40.0,
        }
    }
}

/// Top-level configuration of a tree session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeConfig {
    pub layout: LayoutConfig,
    pub palette: EdgePalette,
    pub view: ViewConfig,
    /// Maximum log level: "error", "warn", "info", "debug" or "trace".
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: TreeConfig =
            serde_json::from_str(r#"{"layout": {"nodeWidth": 200}, "logLevel": "debug"}"#)
                .unwrap();
        assert_eq!(config.layout.node_width, 200.0);
        assert_eq!(config.layout.sibling_gap, 40.0);
        assert_eq!(config.palette, EdgePalette::default());
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: TreeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TreeConfig::default());
    }
}
