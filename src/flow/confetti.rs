//! Celebration collaborator: binding to the global `confetti` function that
//! the host page loads from the canvas-confetti script. Fire-and-forget; the
//! return value is never consulted.

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_name = confetti)]
    fn confetti_js(options: &JsValue) -> Result<(), JsValue>;
}

/// One particle burst description.
#[derive(Clone, Copy, Debug)]
pub struct BurstSpec {
    pub particle_count: u32,
    pub spread_degrees: f64,
    pub gravity: f64,
    pub scalar: f64,
}

/// Burst fired repeatedly while the success view celebrates.
pub const SUCCESS_BURST: BurstSpec = BurstSpec {
    particle_count: 50,
    spread_degrees: 160.0,
    gravity: 0.6,
    scalar: 1.2,
};

/// Burst cadence and total celebration length (ms).
pub const BURST_EVERY_MS: u32 = 250;
pub const CELEBRATION_MS: u32 = 2_000;

/// Fire one burst. A missing or throwing `confetti` global is logged and
/// otherwise ignored; the flow never depends on the effect.
pub fn fire(spec: &BurstSpec) {
    let opts = Object::new();
    let set = |key: &str, value: f64| {
        let _ = Reflect::set(&opts, &JsValue::from_str(key), &JsValue::from_f64(value));
    };
    set("particleCount", spec.particle_count as f64);
    set("spread", spec.spread_degrees);
    set("gravity", spec.gravity);
    set("scalar", spec.scalar);
    if let Err(err) = confetti_js(&opts) {
        log::warn!("confetti call failed: {err:?}");
    }
}
