//! Valentine flow core crate.
//!
//! A browser widget that walks through a sequence of playful yes/no
//! questions where "No" always advances and "Yes" actively evades the
//! pointer. All state transitions, evasion geometry, and the countdown are
//! pure Rust (testable natively); the DOM wiring lives in `flow` and is
//! driven through `start_flow()` from JS.

use wasm_bindgen::prelude::*;

pub mod flow;

pub use flow::evasion;
pub use flow::state::{ControlPose, FlowState, NoOutcome, View};
pub use flow::steps::{EvasionTag, STEPS, StepDesc, TIMER_DURATION_SECS, advance};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Mount the flow into `document.body` and start its timers.
#[wasm_bindgen]
pub fn start_flow() -> Result<(), JsValue> {
    flow::start_flow_mode()
}

/// Unmount the flow and cancel every scheduled timer.
#[wasm_bindgen]
pub fn stop_flow() {
    flow::stop_flow_mode()
}
