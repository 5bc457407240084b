//! Browser bindings
//!
//! The page owns the canvas, input listeners and `requestAnimationFrame`
//! loop; it forwards each frame here and draws from the JSON snapshot.

use wasm_bindgen::prelude::*;

use crate::persistence::LocalStorageStore;
use crate::sim::{RunSession, TickInput};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by an earlier module instance
        return;
    }
    log::info!("KidneyQuest core loaded");
}

/// A run session driven from JavaScript
#[wasm_bindgen]
pub struct WebRun {
    session: RunSession,
    input: TickInput,
}

#[wasm_bindgen]
impl WebRun {
    /// `tuning_json` may be empty to use the built-in tuning
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, tuning_json: &str) -> WebRun {
        let tuning = if tuning_json.is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json).unwrap_or_else(|e| {
                log::warn!("{e}; using default tuning");
                Tuning::default()
            })
        };
        WebRun {
            session: RunSession::new(tuning, seed, Box::new(LocalStorageStore::new())),
            input: TickInput::default(),
        }
    }

    pub fn press(&mut self) {
        self.input.action_press = true;
    }

    pub fn release(&mut self) {
        self.input.action_release = true;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause_toggle = true;
    }

    pub fn set_horizontal(&mut self, direction: f32) {
        self.input.horizontal = direction;
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    /// Advance one frame; `now_ms` is the `requestAnimationFrame` timestamp
    pub fn frame(&mut self, now_ms: f64) {
        self.session.frame(now_ms / 1000.0, &self.input);
        // Edge-triggered inputs last one frame
        self.input.action_press = false;
        self.input.action_release = false;
        self.input.pause_toggle = false;
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_default()
    }

    pub fn events_json(&self) -> String {
        serde_json::to_string(self.session.events()).unwrap_or_default()
    }

    pub fn high_score(&self) -> u64 {
        self.session.high_score()
    }
}
