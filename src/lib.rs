//! Family Tree - WASM Module
//!
//! This module provides the relationship graph, layout pipeline and view
//! state behind the family tree editor. It is compiled to WebAssembly and
//! exposes a JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Relationship store (petgraph StableGraph) and validated edits
//! - `layout`: Display hierarchy, generation rows and edge classification
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `view`: Pan/zoom transform and selection
//! - `snapshot`: Tree snapshots from the backend
//! - `tree`: The editing session tying the above together

use js_sys::Float32Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod snapshot;
pub mod spatial;
pub mod tree;
pub mod view;

pub use config::TreeConfig;
pub use error::{MutationError, TreeError};
pub use graph::{NewPerson, Person, PersonId, RelationKind, RelationshipStore, Sex, TargetSpec};
pub use layout::{DisplayId, LayoutPayload, compute_layout};
pub use snapshot::{LoadReport, RelationType, TreeSnapshot};
pub use tree::{FamilyTree, LoadTicket};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if let Err(err) = logging::init_logging(logging::default_log_level()) {
        web_sys::console::warn_1(&JsValue::from_str(&err));
    }
}

/// Map a relation label from the UI onto a relation kind.
///
/// Accepts the structural kinds (`parent`, `child`, `partner`, `sibling`)
/// and the backend tags (`MOTHER`, `son`, ...). Anything else is a special
/// relation under that label.
pub fn parse_relation(label: &str) -> RelationKind {
    match RelationKind::from(label) {
        RelationKind::Special(tag) => RelationType::parse(&tag)
            .map(RelationType::kind)
            .unwrap_or(RelationKind::Special(tag)),
        structural => structural,
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

/// Main entry point for the family tree editor.
///
/// This struct wraps the internal FamilyTree session and provides the public
/// API exposed to JavaScript.
#[wasm_bindgen]
pub struct FamilyTreeWasm {
    tree: FamilyTree,
}

#[wasm_bindgen]
impl FamilyTreeWasm {
    /// Create a session. `config` may be omitted or partial.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FamilyTreeWasm, JsError> {
        let config = parse_config(config)?;
        if let Some(level) = &config.log_level {
            logging::init_logging(level).map_err(|err| JsError::new(&err))?;
        }
        Ok(Self {
            tree: FamilyTree::new(config),
        })
    }

    /// Replace the configuration.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config = parse_config(config)?;
        if let Some(level) = &config.log_level {
            logging::init_logging(level).map_err(|err| JsError::new(&err))?;
        }
        self.tree.set_config(config);
        Ok(())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Start a request for a tree. Pass the ticket back to `applySnapshot`.
    #[wasm_bindgen(js_name = requestTree)]
    pub fn request_tree(&mut self, tree_id: String) -> LoadTicket {
        self.tree.request_tree(tree_id)
    }

    /// Apply the snapshot answering `ticket`.
    ///
    /// Returns the load report. Fails when a newer request superseded this
    /// one.
    #[wasm_bindgen(js_name = applySnapshot)]
    pub fn apply_snapshot(
        &mut self,
        ticket: &LoadTicket,
        snapshot: JsValue,
    ) -> Result<JsValue, JsError> {
        let snapshot: TreeSnapshot = serde_wasm_bindgen::from_value(snapshot)?;
        let report = self.tree.apply_snapshot(ticket, snapshot)?;
        to_js(&report)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Add a standalone person record. Returns its id.
    #[wasm_bindgen(js_name = addPerson)]
    pub fn add_person(&mut self, person: JsValue) -> Result<String, JsError> {
        let person: Person = serde_wasm_bindgen::from_value(person)?;
        Ok(self.tree.add_person(person)?.to_string())
    }

    /// Relate `target` to `source`.
    ///
    /// `target` is either an existing person id or an inline person object
    /// (`{name, sex, ...}`). Returns the target's id.
    #[wasm_bindgen(js_name = createOrLinkPerson)]
    pub fn create_or_link_person(
        &mut self,
        source: JsValue,
        target: JsValue,
        relation: &str,
    ) -> Result<String, JsError> {
        let source: PersonId = serde_wasm_bindgen::from_value(source)?;
        let target = if target.is_string() || target.as_f64().is_some() {
            TargetSpec::Existing(serde_wasm_bindgen::from_value(target)?)
        } else {
            TargetSpec::New(serde_wasm_bindgen::from_value(target)?)
        };
        let id = self
            .tree
            .create_or_link_person(&source, target, parse_relation(relation))?;
        Ok(id.to_string())
    }

    /// Choose the root person.
    #[wasm_bindgen(js_name = setRoot)]
    pub fn set_root(&mut self, root: JsValue) -> Result<(), JsError> {
        let root: PersonId = serde_wasm_bindgen::from_value(root)?;
        Ok(self.tree.set_root(root)?)
    }

    /// Relationship lists of one person, or undefined when unknown.
    pub fn relations(&self, id: JsValue) -> Result<JsValue, JsError> {
        let id: PersonId = serde_wasm_bindgen::from_value(id)?;
        match self.tree.store().relations(&id) {
            Some(relations) => to_js(&relations),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Get the number of persons in the tree.
    #[wasm_bindgen(js_name = personCount)]
    pub fn person_count(&self) -> usize {
        self.tree.store().person_count()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// The render payload: nodes, edges and bounds.
    pub fn layout(&mut self) -> Result<JsValue, JsError> {
        to_js(self.tree.layout())
    }

    /// Node positions as [x0, y0, x1, y1, ...] in payload node order.
    #[wasm_bindgen(js_name = positionsFlat)]
    pub fn positions_flat(&mut self) -> Float32Array {
        Float32Array::from(&self.tree.layout().positions_flat()[..])
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.tree.pan_by(dx, dy);
    }

    #[wasm_bindgen(js_name = zoomAt)]
    pub fn zoom_at(&mut self, factor: f32, sx: f32, sy: f32) {
        self.tree.zoom_at(factor, sx, sy);
    }

    /// Frame the whole tree. Returns false when there is nothing to frame.
    pub fn fit(&mut self, viewport_width: f32, viewport_height: f32) -> bool {
        self.tree.fit(viewport_width, viewport_height)
    }

    /// Current transform as `{panX, panY, zoom}`.
    #[wasm_bindgen(js_name = getTransform)]
    pub fn get_transform(&self) -> Result<JsValue, JsError> {
        to_js(&self.tree.transform())
    }

    /// Select the person under a screen point. Returns its id, if any.
    #[wasm_bindgen(js_name = selectAt)]
    pub fn select_at(&mut self, sx: f32, sy: f32) -> Option<String> {
        self.tree.select_at(sx, sy).map(|id| id.to_string())
    }

    /// Select a person by id. Returns false when it is not drawn.
    pub fn select(&mut self, id: JsValue) -> Result<bool, JsError> {
        let id: PersonId = serde_wasm_bindgen::from_value(id)?;
        Ok(self.tree.select(DisplayId::Person(id)))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.tree.clear_selection();
    }

    pub fn selected(&self) -> Option<String> {
        self.tree.selected().map(|id| id.to_string())
    }
}

fn parse_config(config: JsValue) -> Result<TreeConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(TreeConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(config)?)
}
