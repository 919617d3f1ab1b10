//! Falling/bouncing object integrator
//!
//! Screen coordinates: y grows downward, the floor is the largest y the
//! object's top edge may reach. Only the floor bounces; the side walls just
//! stop the object, and while held it is clamped to the whole viewport.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp_points;
use crate::consts::*;
use crate::settings::Settings;

/// Who owns the object's position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicsMode {
    /// Position follows the pointer, integration suspended
    Held,
    /// Integrating under gravity
    Free,
    /// At rest; only a new grab/release starts integration again
    Settled,
}

/// Position, velocity and tilt of the object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees, decays toward 0
    pub rotation: f32,
}

impl ObjectState {
    pub fn at_rest(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
        }
    }
}

/// Damped spring that trails a target value
///
/// Smooths horizontal position; the lag between the raw and smoothed x is
/// what turns into friction when the object hits the floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    pub value: f32,
    pub velocity: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Spring {
    pub fn new(value: f32, stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
            stiffness,
            damping,
            mass: mass.max(f32::EPSILON),
        }
    }

    /// Advance `dt` seconds toward `target`
    ///
    /// Semi-implicit Euler in substeps of at most [`SPRING_MAX_STEP`]; `dt` is
    /// capped at [`MAX_FRAME_DT`] so a stalled host cannot fling the value.
    pub fn step(&mut self, target: f32, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        let dt = dt.min(MAX_FRAME_DT);
        let substeps = (dt / SPRING_MAX_STEP).ceil().max(1.0) as u32;
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            let force = -self.stiffness * (self.value - target) - self.damping * self.velocity;
            self.velocity += force / self.mass * h;
            self.value += self.velocity * h;
        }
    }

    /// Jump straight to `value` with no motion
    pub fn snap(&mut self, value: f32) {
        self.value = value;
        self.velocity = 0.0;
    }
}

/// Floor impact worth scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceEvent {
    /// |vy| just before reflection
    pub impact_speed: f32,
    pub points: u32,
    pub pos: Vec2,
}

/// Bounce points for an impact speed
pub fn bounce_points(impact_speed: f32) -> u32 {
    clamp_points(
        impact_speed.abs(),
        BOUNCE_DIVISOR,
        BOUNCE_MIN_POINTS,
        BOUNCE_MAX_POINTS,
    )
}

/// Largest x the object's left edge may reach
fn max_x(settings: &Settings) -> f32 {
    (settings.viewport.width - settings.object_size().x).max(0.0)
}

/// What one integration step produced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepOutcome {
    pub bounce: Option<BounceEvent>,
    pub settled: bool,
}

/// The integrator: object state plus the bookkeeping between frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Physics {
    pub body: ObjectState,
    pub mode: PhysicsMode,
    pub smoothed_x: Spring,
    /// y after the previous step (settle detection)
    last_y: f32,
    /// When the last scored bounce happened
    last_bounce_ms: Option<f64>,
}

impl Physics {
    pub fn new(rest: Vec2) -> Self {
        Self {
            body: ObjectState::at_rest(rest),
            mode: PhysicsMode::Settled,
            smoothed_x: Spring::new(rest.x, SPRING_X_STIFFNESS, SPRING_X_DAMPING, SPRING_X_MASS),
            last_y: rest.y,
            last_bounce_ms: None,
        }
    }

    pub fn is_held(&self) -> bool {
        self.mode == PhysicsMode::Held
    }

    /// Needs frames (free and not yet at rest)
    pub fn is_free(&self) -> bool {
        self.mode == PhysicsMode::Free
    }

    /// Pointer picked the object up: stop falling
    pub fn grab(&mut self) {
        self.mode = PhysicsMode::Held;
        self.body.vel = Vec2::ZERO;
    }

    /// Move the held object by a pointer delta, clamped to the viewport
    ///
    /// `elapsed` (seconds since the previous move) advances the smoothing spring.
    pub fn drag_by(&mut self, delta: Vec2, elapsed: f32, settings: &Settings) {
        if !self.is_held() {
            return;
        }
        let max = Vec2::new(max_x(settings), settings.floor_y());
        self.body.pos = (self.body.pos + delta).clamp(Vec2::ZERO, max);
        self.body.rotation = delta.x * DRAG_TILT_FACTOR;
        self.smoothed_x.step(self.body.pos.x, elapsed.min(MAX_FRAME_DT));
    }

    /// Pointer let go: start falling from the current spot
    pub fn release(&mut self) {
        self.mode = PhysicsMode::Free;
        self.body.vel = Vec2::ZERO;
        self.last_y = self.body.pos.y;
    }

    /// Teleport to `rest` with no motion
    pub fn snap_to(&mut self, rest: Vec2) {
        self.body = ObjectState::at_rest(rest);
        self.smoothed_x.snap(rest.x);
        self.last_y = rest.y;
        self.mode = PhysicsMode::Settled;
    }

    /// Forget bounce history (new round)
    pub fn reset_bounce_cooldown(&mut self) {
        self.last_bounce_ms = None;
    }

    /// Integrate one step of `dt` seconds ending at `now`
    pub fn step(&mut self, dt: f32, now: f64, settings: &Settings) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if !self.is_free() || !(dt > 0.0) {
            return outcome;
        }

        let p = &settings.physics;
        let floor = settings.floor_y();

        self.body.vel.y += p.gravity * dt;
        let mut new_y = self.body.pos.y + self.body.vel.y * dt;

        if new_y >= floor {
            new_y = floor;
            let impact = self.body.vel.y.abs();
            self.body.vel.y = -self.body.vel.y * p.bounciness;

            let vx = (self.body.pos.x - self.smoothed_x.value) * p.friction;
            self.body.vel.x = vx;
            self.body.pos.x += vx * dt;
            self.body.rotation += vx * BOUNCE_SPIN_FACTOR;
            let wall = max_x(settings);
            if !(0.0..=wall).contains(&self.body.pos.x) {
                self.body.pos.x = self.body.pos.x.clamp(0.0, wall);
                self.body.vel.x = 0.0;
            }

            let cooled = self
                .last_bounce_ms
                .is_none_or(|last| now - last >= BOUNCE_COOLDOWN_MS);
            if cooled {
                self.last_bounce_ms = Some(now);
                outcome.bounce = Some(BounceEvent {
                    impact_speed: impact,
                    points: bounce_points(impact),
                    pos: Vec2::new(self.body.pos.x, new_y),
                });
            }
        } else {
            self.body.vel.y *= p.air_damping;
            self.body.rotation *= p.rotation_decay;
        }

        self.smoothed_x.step(self.body.pos.x, dt);

        // Thresholds scale with one frame of gravity so low frame rates
        // still come to rest instead of hopping forever
        let speed_limit = SETTLE_VELOCITY_EPSILON.max(p.gravity * dt);
        let move_limit = SETTLE_POSITION_EPSILON.max(p.gravity * dt * dt);
        if (new_y - self.last_y).abs() < move_limit
            && self.body.vel.y.abs() < speed_limit
            && new_y >= floor - SETTLE_FLOOR_TOLERANCE
        {
            self.body.vel = Vec2::ZERO;
            self.body.pos.y = floor;
            self.last_y = floor;
            self.mode = PhysicsMode::Settled;
            outcome.settled = true;
            log::debug!("Object settled at x={:.1}", self.body.pos.x);
            return outcome;
        }

        self.last_y = new_y;
        self.body.pos.y = new_y;
        outcome
    }
}
