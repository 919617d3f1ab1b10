//! Browser bindings
//!
//! The page owns the canvas, pointer listeners and the `requestAnimationFrame`
//! loop. It forwards drag events here and calls `frame()` once per animation
//! frame, drawing from the returned JSON snapshot.

use glam::Vec2;
use wasm_bindgen::prelude::*;

use crate::platform::{LocalStorage, SystemClock};
use crate::session::Session;
use crate::settings::Settings;
use crate::sim::InputEvent;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Drag Bounce starting...");
}

fn to_js(err: serde_json::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One game instance bound to the page
#[wasm_bindgen]
pub struct DragBounce {
    session: Session<SystemClock, LocalStorage>,
}

#[wasm_bindgen]
impl DragBounce {
    /// Create a game; a valid `settings_json` replaces the stored settings
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> DragBounce {
        let settings = match settings_json.as_deref().map(Settings::from_json) {
            Some(Ok(settings)) => {
                settings.save();
                settings
            }
            Some(Err(e)) => {
                log::warn!("Invalid settings JSON, using stored settings: {}", e);
                Settings::load()
            }
            None => Settings::load(),
        };
        log::info!(
            "Game ready ({}x{}, {})",
            settings.viewport.width,
            settings.viewport.height,
            settings.step_mode.as_str()
        );
        DragBounce {
            session: Session::new(settings, SystemClock::new(), LocalStorage::new()),
        }
    }

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self) {
        self.session.input(InputEvent::DragStart);
    }

    /// Pointer moved by (dx, dy); pass NaN velocity when the host has none
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, dx: f32, dy: f32, vx: f32, vy: f32) {
        let velocity = (vx.is_finite() && vy.is_finite()).then(|| Vec2::new(vx, vy));
        self.session.input(InputEvent::DragMove {
            delta: Vec2::new(dx, dy),
            velocity,
        });
    }

    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) {
        self.session.input(InputEvent::DragEnd);
    }

    #[wasm_bindgen(js_name = playAgain)]
    pub fn play_again(&mut self) {
        self.session.input(InputEvent::PlayAgain);
    }

    /// Advance to now and return the frame snapshot as JSON
    pub fn frame(&mut self) -> Result<String, JsValue> {
        self.session.frame();
        serde_json::to_string(&self.session.snapshot()).map_err(to_js)
    }

    /// Whether the host should keep its animation loop running
    #[wasm_bindgen(js_name = needsFrames)]
    pub fn needs_frames(&self) -> bool {
        self.session.state().is_alive() && self.session.state().has_pending_work()
    }

    #[wasm_bindgen(js_name = highScores)]
    pub fn high_scores(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.leaderboard().entries).map_err(to_js)
    }

    /// Stop all timers; call when the component unmounts
    pub fn teardown(&mut self) {
        self.session.teardown();
    }
}
