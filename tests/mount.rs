// Browser smoke tests for mount, remount, and teardown. Run with
// `wasm-pack test --headless --chrome`; the host build compiles this file
// to nothing.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use web_sys::{MouseEvent, window};

wasm_bindgen_test_configure!(run_in_browser);

fn root_count() -> u32 {
    window()
        .unwrap()
        .document()
        .unwrap()
        .query_selector_all("#vf-root")
        .unwrap()
        .length()
}

#[wasm_bindgen_test]
fn remount_keeps_a_single_widget() {
    valentine_flow::start_flow().unwrap();
    // A second mount replaces the first instead of stacking a second copy
    // (and a second render loop) on top of it.
    valentine_flow::start_flow().unwrap();
    assert_eq!(root_count(), 1);

    valentine_flow::stop_flow();
    assert_eq!(root_count(), 0);
    // Teardown is idempotent.
    valentine_flow::stop_flow();
    assert_eq!(root_count(), 0);
}

#[wasm_bindgen_test]
fn pointer_moves_anywhere_on_the_overlay_are_handled() {
    valentine_flow::start_flow().unwrap();
    let doc = window().unwrap().document().unwrap();

    // Open the letter so a question is active.
    let intro = doc.get_element_by_id("vf-intro").unwrap();
    intro
        .dispatch_event(&MouseEvent::new("click").unwrap())
        .unwrap();

    // The overlay root, not just the card, tracks the pointer.
    let root = doc.get_element_by_id("vf-root").unwrap();
    assert!(
        root.dispatch_event(&MouseEvent::new("mousemove").unwrap())
            .unwrap()
    );

    valentine_flow::stop_flow();
}
