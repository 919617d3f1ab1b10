//! Drag Bounce - a throw-it-around arcade toy with combo scoring
//!
//! Core modules:
//! - `sim`: Simulation (physics, input tracking, scoring, round lifecycle)
//! - `highscores`: Top-5 leaderboard
//! - `persistence`: Storage collaborator for the leaderboard
//! - `platform`: Clock and browser storage abstraction
//! - `settings`: Data-driven physics/round configuration
//! - `session`: Owns one game instance and wires the pieces together

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::{HighScoreEntry, Leaderboard};
pub use session::Session;
pub use settings::{Settings, StepMode};

/// Game configuration constants
pub mod consts {
    /// Minimum interval between accepted drag samples (~60 fps)
    pub const DRAG_THROTTLE_MS: f64 = 16.0;
    /// Award a drag tick every N accepted samples
    pub const DRAG_TICK_EVERY: u32 = 5;
    /// Points for a drag tick
    pub const DRAG_TICK_POINTS: u32 = 1;
    /// Accumulated drag distance that triggers a distance bonus
    pub const DISTANCE_THRESHOLD: f32 = 50.0;
    /// Distance bonus = distance / DISTANCE_DIVISOR, clamped
    pub const DISTANCE_DIVISOR: f32 = 20.0;
    pub const DISTANCE_MIN_POINTS: u32 = 3;
    pub const DISTANCE_MAX_POINTS: u32 = 10;
    /// Drag speed (units/s) above which a speed burst may fire
    pub const SPEED_BURST_THRESHOLD: f32 = 500.0;
    /// Speed bursts only fire on every N-th accepted sample
    pub const SPEED_BURST_EVERY: u32 = 10;
    pub const SPEED_DIVISOR: f32 = 100.0;
    pub const SPEED_MAX_POINTS: u32 = 15;
    /// Flat points for picking up / letting go
    pub const DRAG_START_POINTS: u32 = 5;
    pub const DRAG_END_POINTS: u32 = 5;

    /// Bounce points = |vy| / BOUNCE_DIVISOR, clamped
    pub const BOUNCE_DIVISOR: f32 = 100.0;
    pub const BOUNCE_MIN_POINTS: u32 = 10;
    pub const BOUNCE_MAX_POINTS: u32 = 30;
    /// Minimum time between scored bounces
    pub const BOUNCE_COOLDOWN_MS: f64 = 300.0;

    /// Largest frame delta fed to the integrator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Maximum substeps per frame in fixed-step mode
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Settle when a frame moves less than this...
    pub const SETTLE_POSITION_EPSILON: f32 = 0.1;
    /// ...and vertical speed is below this...
    pub const SETTLE_VELOCITY_EPSILON: f32 = 10.0;
    /// ...while within this distance of the floor
    pub const SETTLE_FLOOR_TOLERANCE: f32 = 1.0;
    /// Rotational impulse per unit of horizontal friction on bounce
    pub const BOUNCE_SPIN_FACTOR: f32 = 0.1;
    /// Held rotation per unit of horizontal drag delta
    pub const DRAG_TILT_FACTOR: f32 = 2.0;
    /// Horizontal drag speed mapped to full wiggle
    pub const WIGGLE_SPEED_SCALE: f32 = 1000.0;
    /// Spring that smooths horizontal position (lag drives bounce friction)
    pub const SPRING_X_STIFFNESS: f32 = 200.0;
    pub const SPRING_X_DAMPING: f32 = 20.0;
    pub const SPRING_X_MASS: f32 = 1.0;
    /// Largest integration step for the smoothing spring (s)
    pub const SPRING_MAX_STEP: f32 = 1.0 / 120.0;

    /// Consecutive scoring events closer than this extend the combo
    pub const COMBO_WINDOW_MS: f64 = 1000.0;
    /// Breaking a combo larger than this shows a penalty popup
    pub const COMBO_BREAK_PENALTY_MIN: u32 = 5;
    /// Combo decay bar starts full at this value...
    pub const COMBO_TIMER_FULL: u32 = 100;
    /// ...and loses one unit per period
    pub const COMBO_DECAY_PERIOD_MS: f64 = 30.0;

    /// Popups disappear after this long
    pub const POPUP_DURATION_MS: f64 = 800.0;
    /// Most-recent popups kept alive
    pub const MAX_POPUPS: usize = 10;

    /// Single awards at or above this shake the screen
    pub const SHAKE_MIN_POINTS: u32 = 20;
    pub const SHAKE_COOLDOWN_MS: f64 = 500.0;
    pub const SHAKE_DURATION_MS: f64 = 300.0;
    /// Max jitter offset per axis while shaking
    pub const SHAKE_MAGNITUDE: f32 = 2.0;

    /// Countdown tick period
    pub const COUNTDOWN_PERIOD_MS: f64 = 1000.0;
    /// Default round length in seconds
    pub const ROUND_SECONDS: u32 = 10;

    /// Leaderboard size
    pub const MAX_HIGH_SCORES: usize = 5;
}

/// Clamp `floor(value / divisor)` into `[min, max]` as whole points
#[inline]
pub fn clamp_points(value: f32, divisor: f32, min: u32, max: u32) -> u32 {
    let raw = if value.is_finite() && divisor > 0.0 {
        (value / divisor).floor().max(0.0) as u32
    } else {
        0
    };
    raw.clamp(min, max)
}
