//! A family tree editing session.
//!
//! [`FamilyTree`] owns the relationship store, the chosen root, the cached
//! layout and the view state. Snapshot loads are last-request-wins: only the
//! most recently issued [`LoadTicket`] may replace the store.

use tracing::{debug, info};
use wasm_bindgen::prelude::*;

use crate::config::TreeConfig;
use crate::error::TreeError;
use crate::graph::{MutationEngine, Person, PersonId, RelationKind, RelationshipStore, TargetSpec};
use crate::layout::{DisplayId, LayoutPayload, compute_layout};
use crate::snapshot::{LoadReport, TreeSnapshot};
use crate::view::{ViewController, ViewTransform};

/// Handle for one outstanding snapshot request.
#[wasm_bindgen]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    seq: u64,
    tree_id: String,
}

impl LoadTicket {
    pub fn tree_id(&self) -> &str {
        &self.tree_id
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[wasm_bindgen]
impl LoadTicket {
    #[wasm_bindgen(getter = treeId)]
    pub fn js_tree_id(&self) -> String {
        self.tree_id.clone()
    }
}

/// What a cached payload was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LayoutKey {
    revision: u64,
    root: Option<PersonId>,
    config_epoch: u64,
}

struct CachedLayout {
    key: LayoutKey,
    payload: LayoutPayload,
}

pub struct FamilyTree {
    store: RelationshipStore,
    tree_id: Option<String>,
    root: Option<PersonId>,
    config: TreeConfig,
    config_epoch: u64,
    view: ViewController,
    cache: Option<CachedLayout>,
    pending: Option<LoadTicket>,
    next_seq: u64,
}

impl FamilyTree {
    pub fn new(config: TreeConfig) -> Self {
        Self {
            store: RelationshipStore::new(),
            tree_id: None,
            root: None,
            view: ViewController::new(config.view.clone()),
            config,
            config_epoch: 0,
            cache: None,
            pending: None,
            next_seq: 0,
        }
    }

    pub fn store(&self) -> &RelationshipStore {
        &self.store
    }

    pub fn tree_id(&self) -> Option<&str> {
        self.tree_id.as_deref()
    }

    pub fn root(&self) -> Option<&PersonId> {
        self.root.as_ref()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    /// Replace the configuration. The next layout is recomputed.
    pub fn set_config(&mut self, config: TreeConfig) {
        self.view.set_config(config.view.clone());
        self.config = config;
        self.config_epoch += 1;
    }

    /// Choose the person the tree is drawn from.
    ///
    /// # Errors
    ///
    /// `MissingRoot` when the person is not in the store; the current root
    /// is kept.
    pub fn set_root(&mut self, root: PersonId) -> Result<(), TreeError> {
        if !self.store.contains(&root) {
            return Err(TreeError::MissingRoot(root));
        }
        debug!("root set to {root}");
        self.root = Some(root);
        Ok(())
    }

    // =========================================================================
    // Snapshot loading
    // =========================================================================

    /// Register a request for `tree_id`, superseding any outstanding one.
    pub fn request_tree(&mut self, tree_id: impl Into<String>) -> LoadTicket {
        self.next_seq += 1;
        let ticket = LoadTicket {
            seq: self.next_seq,
            tree_id: tree_id.into(),
        };
        debug!("requested tree {} (#{})", ticket.tree_id, ticket.seq);
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Replace the session contents with a snapshot answering `ticket`.
    ///
    /// The current root is kept when it survives the load, otherwise the
    /// first person of the snapshot becomes the root.
    ///
    /// # Errors
    ///
    /// `StaleSnapshot` when `ticket` is not the latest request or the
    /// snapshot is for another tree. The store is not touched.
    pub fn apply_snapshot(
        &mut self,
        ticket: &LoadTicket,
        snapshot: TreeSnapshot,
    ) -> Result<LoadReport, TreeError> {
        if self.pending.as_ref() != Some(ticket) || snapshot.tree_id != ticket.tree_id {
            return Err(TreeError::StaleSnapshot {
                tree_id: snapshot.tree_id,
            });
        }
        self.pending = None;

        let tree_id = snapshot.tree_id.clone();
        self.store.clear();
        let report = snapshot.load_into(&mut self.store);

        if !self.root.as_ref().is_some_and(|root| self.store.contains(root)) {
            self.root = self.store.persons().next().map(|p| p.id.clone());
        }
        info!(
            "tree {tree_id} is active, root {}",
            self.root.as_ref().map_or("<none>", PersonId::as_str)
        );
        self.tree_id = Some(tree_id);
        Ok(report)
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Create or link a person relative to `source`. Returns the target id.
    ///
    /// # Errors
    ///
    /// Any [`crate::error::MutationError`]; the store is unchanged on error.
    pub fn create_or_link_person(
        &mut self,
        source: &PersonId,
        target: TargetSpec,
        kind: RelationKind,
    ) -> Result<PersonId, TreeError> {
        let id = MutationEngine::new(&mut self.store).create_or_link_person(source, target, kind)?;
        Ok(id)
    }

    /// Add a person with no relationships yet, e.g. the first of a new tree.
    pub fn add_person(&mut self, person: Person) -> Result<PersonId, TreeError> {
        let id = person.id.clone();
        self.store.insert_person(person)?;
        if self.root.is_none() {
            self.root = Some(id.clone());
        }
        Ok(id)
    }

    // =========================================================================
    // Layout and view
    // =========================================================================

    /// The layout for the current store, root and config, recomputed only
    /// when one of them changed since the last call.
    pub fn layout(&mut self) -> &LayoutPayload {
        let key = LayoutKey {
            revision: self.store.revision(),
            root: self.root.clone(),
            config_epoch: self.config_epoch,
        };
        if self.cache.as_ref().is_some_and(|cached| cached.key != key) {
            self.cache = None;
        }

        let cached = self.cache.get_or_insert_with(|| {
            let payload = match &key.root {
                Some(root) => compute_layout(&self.store, root, &self.config),
                None => LayoutPayload::empty(key.revision),
            };
            self.view.sync(&payload);
            CachedLayout { key, payload }
        });
        &cached.payload
    }

    pub fn transform(&self) -> ViewTransform {
        self.view.transform()
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.view.pan_by(dx, dy);
    }

    pub fn zoom_at(&mut self, factor: f32, sx: f32, sy: f32) {
        self.view.zoom_at(factor, sx, sy);
    }

    /// Frame the whole layout in a viewport. Returns false for an empty tree.
    pub fn fit(&mut self, viewport_width: f32, viewport_height: f32) -> bool {
        let Some(bounds) = self.layout().bounds else {
            return false;
        };
        self.view
            .fit_bounds(bounds, &self.config.layout, viewport_width, viewport_height);
        true
    }

    pub fn selected(&self) -> Option<&DisplayId> {
        self.view.selected()
    }

    pub fn select(&mut self, id: DisplayId) -> bool {
        self.layout();
        self.view.select(id)
    }

    pub fn clear_selection(&mut self) {
        self.view.clear_selection();
    }

    /// Hit test at a screen point against the current layout.
    pub fn select_at(&mut self, sx: f32, sy: f32) -> Option<DisplayId> {
        self.layout();
        self.view.select_at(sx, sy).cloned()
    }
}

impl Default for FamilyTree {
    fn default() -> Self {
        Self::new(TreeConfig::default())
    }
}
