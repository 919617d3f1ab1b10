//! Game state and presentation snapshot
//!
//! Everything that changes between frames lives in [`GameState`]; the update
//! functions in `tick` are the only writers.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::input::InputTracker;
use super::physics::{Physics, PhysicsMode};
use super::round::{Round, RoundPhase, RoundResult, TimerUrgency};
use super::scoring::{ComboFlavor, Popup, Scoring};
use super::timer::FrameDriver;
use crate::consts::SHAKE_MAGNITUDE;
use crate::settings::Settings;

/// Complete simulation state for one game instance
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    pub round: Round,
    pub physics: Physics,
    pub input: InputTracker,
    pub scoring: Scoring,
    /// Frame requests for the physics loop
    pub frames: FrameDriver,
    /// Result of the most recent finished round (until "play again")
    pub last_result: Option<RoundResult>,
    /// Time of the previous raw drag move (spring smoothing while held)
    pub(crate) last_move_ms: Option<f64>,
    /// Cleared on teardown; nothing mutates state afterwards
    alive: bool,
    /// Cosmetic randomness only
    rng: Pcg32,
}

impl GameState {
    pub fn new(settings: Settings) -> Self {
        let settings = settings.validated();
        let rest = settings.rest_position();
        Self {
            round: Round::new(settings.round_seconds),
            physics: Physics::new(rest),
            input: InputTracker::new(),
            scoring: Scoring::new(),
            frames: FrameDriver::new(),
            last_result: None,
            last_move_ms: None,
            alive: true,
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    /// Cancel every timer and frame request; later calls become no-ops
    pub fn teardown(&mut self) {
        self.alive = false;
        self.round.cancel_timers();
        self.scoring.freeze();
        self.frames.cancel();
    }

    /// True while any cooperative timer or frame request is pending
    pub fn has_pending_work(&self) -> bool {
        self.round.is_counting_down() || self.scoring.combo.is_decaying() || self.frames.is_scheduled()
    }

    /// Everything the presentation layer needs for one frame
    pub fn snapshot(&mut self, now: f64) -> Snapshot {
        let shaking = self.scoring.is_shaking(now) && !self.settings.reduced_motion;
        let shake_offset = if shaking {
            Vec2::new(
                self.rng.random_range(-SHAKE_MAGNITUDE..=SHAKE_MAGNITUDE),
                self.rng.random_range(-SHAKE_MAGNITUDE..=SHAKE_MAGNITUDE),
            )
        } else {
            Vec2::ZERO
        };

        let combo = &self.scoring.combo;
        Snapshot {
            position: self.physics.body.pos,
            rotation: self.physics.body.rotation,
            held: self.physics.mode == PhysicsMode::Held,
            settled: self.physics.mode == PhysicsMode::Settled,
            score: self.scoring.score,
            combo: combo.count,
            multiplier: combo.multiplier,
            is_on_fire: combo.is_on_fire(),
            combo_timer: combo.remaining,
            flavor: ComboFlavor::from_combo(combo.count).as_str(),
            time_remaining: self.round.time_remaining,
            urgency: self.round.urgency(),
            popups: self.scoring.popups.iter().copied().collect(),
            phase: self.round.phase,
            shake_offset,
            wiggle: self.input.wiggle(),
            last_result: self.last_result,
        }
    }
}

/// Read-only view handed to the presentation layer each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub position: Vec2,
    pub rotation: f32,
    pub held: bool,
    pub settled: bool,
    pub score: u64,
    pub combo: u32,
    pub multiplier: u32,
    pub is_on_fire: bool,
    /// Combo decay bar, 0..=100
    pub combo_timer: u32,
    pub flavor: &'static str,
    pub time_remaining: u32,
    pub urgency: TimerUrgency,
    pub popups: Vec<Popup>,
    pub phase: RoundPhase,
    /// Zero unless the screen is shaking
    pub shake_offset: Vec2,
    pub wiggle: f32,
    pub last_result: Option<RoundResult>,
}
