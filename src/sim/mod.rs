//! Simulation module
//!
//! All gameplay logic lives here. This module is pure:
//! - Time comes in as an explicit `now` (milliseconds)
//! - Timers are cooperative and polled, never threaded
//! - No rendering, storage or platform dependencies

pub mod input;
pub mod physics;
pub mod round;
pub mod scoring;
pub mod state;
pub mod tick;
pub mod timer;

pub use input::{DragSample, InputEvent, InputTracker};
pub use physics::{BounceEvent, ObjectState, Physics, PhysicsMode, bounce_points};
pub use round::{Round, RoundPhase, RoundResult, TimerUrgency};
pub use scoring::{Award, ComboFlavor, ComboState, Popup, ScoreEvent, Scoring, is_on_fire, multiplier_for};
pub use state::{GameState, Snapshot};
pub use tick::{TickReport, handle_input, tick};
pub use timer::{FrameDriver, FrameSteps, Interval};
