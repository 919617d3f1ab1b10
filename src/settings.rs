//! Game settings
//!
//! Physics tuning, viewport, round length and stepping mode. Persisted as
//! JSON (a file on native, LocalStorage on web); anything missing or invalid
//! falls back to defaults.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::ROUND_SECONDS;

/// How the physics integrator consumes frame time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// One integration step per frame using the measured frame delta
    #[default]
    Variable,
    /// Fixed-size steps from an accumulator (deterministic replay)
    Fixed { hz: f32 },
}

impl StepMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepMode::Variable => "variable",
            StepMode::Fixed { .. } => "fixed",
        }
    }

    /// Parse "variable", "fixed" (120 Hz) or "fixed:<hz>"
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "variable" | "var" => Some(StepMode::Variable),
            "fixed" => Some(StepMode::Fixed { hz: 120.0 }),
            _ => {
                let hz = s.strip_prefix("fixed:")?.parse::<f32>().ok()?;
                (hz.is_finite() && hz > 0.0).then_some(StepMode::Fixed { hz })
            }
        }
    }
}

/// Physical properties of the thrown object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Object height (it is five times as wide)
    pub size: f32,
    /// Downward acceleration (units/s²)
    pub gravity: f32,
    /// Fraction of vertical speed kept on bounce
    pub bounciness: f32,
    /// Scales the horizontal spring lag applied on bounce
    pub friction: f32,
    /// Per-frame multiplicative damping of vertical speed in the air
    pub air_damping: f32,
    /// Per-frame multiplicative decay of rotation in the air
    pub rotation_decay: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            size: 80.0,
            gravity: 1500.0,
            bounciness: 0.7,
            friction: 0.95,
            air_damping: 0.995,
            rotation_decay: 0.9,
        }
    }
}

/// Play area dimensions (y grows downward)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub physics: PhysicsSettings,
    pub viewport: Viewport,
    /// Round length in seconds
    pub round_seconds: u32,
    pub step_mode: StepMode,
    /// Suppress screen shake
    pub reduced_motion: bool,
    /// Seed for cosmetic randomness (shake jitter)
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            physics: PhysicsSettings::default(),
            viewport: Viewport::default(),
            round_seconds: ROUND_SECONDS,
            step_mode: StepMode::Variable,
            reduced_motion: false,
            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Object footprint (width, height)
    pub fn object_size(&self) -> Vec2 {
        Vec2::new(self.physics.size * 5.0, self.physics.size)
    }

    /// Top edge of the object when resting on the floor
    pub fn floor_y(&self) -> f32 {
        (self.viewport.height - self.physics.size).max(0.0)
    }

    /// Where the object sits at the start and end of a round
    pub fn rest_position(&self) -> Vec2 {
        let size = self.object_size();
        Vec2::new(
            self.viewport.width / 2.0 - size.x / 2.0,
            self.viewport.height / 2.0 - size.y / 2.0,
        )
    }

    /// Clamp nonsensical values into something playable
    pub fn validated(mut self) -> Self {
        let defaults = PhysicsSettings::default();
        let p = &mut self.physics;

        if !(p.size.is_finite() && p.size > 0.0) {
            p.size = defaults.size;
        }
        if !(p.gravity.is_finite() && p.gravity > 0.0) {
            p.gravity = defaults.gravity;
        }
        p.bounciness = if p.bounciness.is_finite() {
            p.bounciness.clamp(0.0, 0.99)
        } else {
            defaults.bounciness
        };
        if !p.friction.is_finite() {
            p.friction = defaults.friction;
        }
        p.air_damping = if p.air_damping.is_finite() {
            p.air_damping.clamp(0.0, 1.0)
        } else {
            defaults.air_damping
        };
        p.rotation_decay = if p.rotation_decay.is_finite() {
            p.rotation_decay.clamp(0.0, 1.0)
        } else {
            defaults.rotation_decay
        };

        let viewport = Viewport::default();
        if !(self.viewport.width.is_finite() && self.viewport.width > 0.0) {
            self.viewport.width = viewport.width;
        }
        if !(self.viewport.height.is_finite() && self.viewport.height > self.physics.size) {
            self.viewport.height = viewport.height.max(self.physics.size * 2.0);
        }

        self.round_seconds = self.round_seconds.max(1);
        if let StepMode::Fixed { hz } = self.step_mode {
            if !(hz.is_finite() && hz > 0.0) {
                self.step_mode = StepMode::Fixed { hz: 120.0 };
            }
        }
        self
    }

    /// Parse settings JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::validated)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "drag_bounce_settings";

    /// Load settings from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings at {} ({e}), using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), crate::persistence::StorageError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        if let Ok(storage) = crate::platform::storage::local_storage() {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Invalid stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = match crate::platform::storage::local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                log::warn!("Could not save settings: {e}");
                return;
            }
        };
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings: {e:?}"),
            },
            Err(e) => log::warn!("Could not serialize settings: {e}"),
        }
    }
}
