//! Browser smoke tests for the wasm-bindgen surface.
//!
//! Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use family_tree_wasm::{FamilyTreeWasm, NewPerson, Person, Sex, TreeConfig, TreeSnapshot};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn session() -> FamilyTreeWasm {
    FamilyTreeWasm::new(JsValue::UNDEFINED).unwrap()
}

#[wasm_bindgen_test]
fn test_edit_and_layout_from_js_values() {
    let mut tree = session();
    let p1 = serde_wasm_bindgen::to_value(&Person::new("p1", "Pat", Sex::Male)).unwrap();
    assert_eq!(tree.add_person(p1).unwrap(), "p1");

    let kid = serde_wasm_bindgen::to_value(&NewPerson::new("Kim", Sex::Female)).unwrap();
    let kid_id = tree
        .create_or_link_person(JsValue::from_str("p1"), kid, "child")
        .unwrap();
    assert_eq!(tree.person_count(), 2);

    // p1, union, kid
    assert_eq!(tree.positions_flat().length(), 6);
    assert!(tree.layout().unwrap().is_object());

    assert!(tree.fit(800.0, 600.0));
    assert!(tree.select(JsValue::from_str(&kid_id)).unwrap());
    assert_eq!(tree.selected(), Some(kid_id));
}

#[wasm_bindgen_test]
fn test_invalid_edit_surfaces_as_error() {
    let mut tree = session();
    let p1 = serde_wasm_bindgen::to_value(&Person::new("p1", "Pat", Sex::Male)).unwrap();
    tree.add_person(p1).unwrap();

    let result = tree.create_or_link_person(
        JsValue::from_str("p1"),
        JsValue::from_str("nobody"),
        "parent",
    );
    assert!(result.is_err());
    assert_eq!(tree.person_count(), 1);
}

#[wasm_bindgen_test]
fn test_superseded_snapshot_is_rejected() {
    let mut tree = session();
    let old = tree.request_tree("a".into());
    let new = tree.request_tree("b".into());
    assert_eq!(new.js_tree_id(), "b");

    let snapshot = |tree_id: &str| {
        serde_wasm_bindgen::to_value(&TreeSnapshot {
            tree_id: tree_id.into(),
            persons: vec![Person::new(tree_id, tree_id, Sex::Unknown)],
            relationships: Vec::new(),
        })
        .unwrap()
    };

    assert!(tree.apply_snapshot(&new, snapshot("b")).is_ok());
    assert!(tree.apply_snapshot(&old, snapshot("a")).is_err());
    assert_eq!(tree.person_count(), 1);
}

#[wasm_bindgen_test]
fn test_repeated_init_keeps_logging_usable() {
    // start already ran init once; later installs must only reload the level
    family_tree_wasm::init();
    family_tree_wasm::init();

    let with_level = |level: &str| {
        let config = TreeConfig {
            log_level: Some(level.into()),
            ..TreeConfig::default()
        };
        serde_wasm_bindgen::to_value(&config).unwrap()
    };
    assert!(FamilyTreeWasm::new(with_level("trace")).is_ok());
    assert!(FamilyTreeWasm::new(with_level("loud")).is_err());
}
