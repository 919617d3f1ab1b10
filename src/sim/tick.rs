//! Per-event and per-frame update functions
//!
//! [`handle_input`] applies one presentation event, [`tick`] advances every
//! cooperative timer and the physics loop to `now`. Both are no-ops once the
//! state has been torn down.

use glam::Vec2;

use super::input::InputEvent;
use super::physics::PhysicsMode;
use super::round::{RoundPhase, RoundResult};
use super::scoring::{Award, ScoreEvent, drag_score_events};
use super::state::GameState;
use crate::consts::MAX_FRAME_DT;

/// What an update did (for logging, tests and the session layer)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub awards: Vec<(ScoreEvent, Award)>,
    pub round_started: bool,
    /// Set on the one update that ended the round
    pub round_ended: Option<RoundResult>,
    pub bounces: u32,
    pub settled: bool,
    pub combo_expired: bool,
}

impl TickReport {
    pub fn points(&self) -> u64 {
        self.awards.iter().map(|(_, a)| a.awarded).sum()
    }
}

/// Score an event if the round is live
fn score(state: &mut GameState, event: ScoreEvent, origin: Vec2, now: f64, report: &mut TickReport) {
    if !state.round.is_active() {
        return;
    }
    let award = state.scoring.award(event, origin, now);
    log::debug!("{} +{} (x{})", event.label(), award.awarded, award.multiplier);
    report.awards.push((event, award));
}

/// Bring the countdown and combo decay up to `now`
///
/// Returns true if the round ended here.
fn run_timers(state: &mut GameState, now: f64, report: &mut TickReport) -> bool {
    if state.round.advance(now) {
        report.round_ended = Some(end_round(state, now));
        return true;
    }
    if state.round.is_active() && state.scoring.decay(now) {
        report.combo_expired = true;
    }
    false
}

fn start_round_if_idle(state: &mut GameState, now: f64, report: &mut TickReport) {
    if state.round.begin(now) {
        state.last_result = None;
        report.round_started = true;
        log::info!("Round started ({} s)", state.round.round_seconds());
    }
}

fn grab(state: &mut GameState, now: f64) {
    state.physics.grab();
    // Physics frames stop while held
    state.frames.cancel();
    state.input.begin();
    state.last_move_ms = Some(now);
}

/// Apply one input event at time `now`
pub fn handle_input(state: &mut GameState, event: InputEvent, now: f64) -> TickReport {
    let mut report = TickReport::default();
    if !state.is_alive() {
        return report;
    }

    // Timers due before this event fire first; an expired round eats it
    if run_timers(state, now, &mut report) {
        return report;
    }

    if let InputEvent::PlayAgain = event {
        play_again(state);
        return report;
    }

    // Results screen: the object stays parked until "play again"
    if state.round.phase == RoundPhase::Ended {
        return report;
    }

    match event {
        InputEvent::DragStart => {
            start_round_if_idle(state, now, &mut report);
            grab(state, now);
            let origin = state.physics.body.pos;
            score(state, ScoreEvent::DragStart, origin, now, &mut report);
        }
        InputEvent::DragMove { delta, velocity } => {
            start_round_if_idle(state, now, &mut report);
            if !state.physics.is_held() {
                // Missed the start notification; pick the object up silently
                log::debug!("Drag move without drag start, grabbing");
                grab(state, now);
            }

            let elapsed = state
                .last_move_ms
                .map(|last| ((now - last).max(0.0) / 1000.0) as f32)
                .unwrap_or(0.0)
                .min(MAX_FRAME_DT);
            state.last_move_ms = Some(now);
            state.physics.drag_by(delta, elapsed, &state.settings);

            if let Some(sample) = state.input.sample(delta, velocity, now) {
                let origin = state.physics.body.pos;
                for event in drag_score_events(&sample, &mut state.input) {
                    score(state, event, origin, now, &mut report);
                }
            }
        }
        InputEvent::DragEnd => {
            if state.physics.is_held() {
                state.physics.release();
                state.frames.request(now);
                state.last_move_ms = None;
                let origin = state.physics.body.pos;
                score(state, ScoreEvent::DragEnd, origin, now, &mut report);
                state.input.end();
            }
        }
        InputEvent::PlayAgain => {}
    }

    report
}

/// Advance timers and physics to `now`
pub fn tick(state: &mut GameState, now: f64) -> TickReport {
    let mut report = TickReport::default();
    if !state.is_alive() {
        return report;
    }

    if run_timers(state, now, &mut report) {
        return report;
    }

    let steps = state.frames.frame(now, state.settings.step_mode);
    for _ in 0..steps.count {
        let outcome = state.physics.step(steps.dt, now, &state.settings);
        if let Some(bounce) = outcome.bounce {
            report.bounces += 1;
            let event = ScoreEvent::Bounce {
                impact_speed: bounce.impact_speed,
            };
            score(state, event, bounce.pos, now, &mut report);
        }
        if outcome.settled {
            report.settled = true;
            state.frames.cancel();
            break;
        }
    }

    state.scoring.expire_popups(now);
    report
}

/// Active -> Ended bookkeeping: freeze scoring, park the object
fn end_round(state: &mut GameState, now: f64) -> RoundResult {
    state.scoring.freeze();
    state.frames.cancel();
    state.input.reset();
    state.last_move_ms = None;
    let rest = state.settings.rest_position();
    state.physics.snap_to(rest);

    let result = RoundResult {
        score: state.scoring.score,
        max_combo: state.scoring.combo.max_count,
        ended_at: now,
        rank: None,
    };
    state.last_result = Some(result);
    log::info!(
        "Round over: score {} (max combo {})",
        result.score,
        result.max_combo
    );
    result
}

/// Ended -> Idle with a clean slate
fn play_again(state: &mut GameState) {
    if !state.round.reset() {
        return;
    }
    state.scoring.reset();
    state.input.reset();
    state.frames.cancel();
    state.last_move_ms = None;
    state.last_result = None;
    let rest = state.settings.rest_position();
    state.physics.snap_to(rest);
    state.physics.reset_bounce_cooldown();
    debug_assert_eq!(state.physics.mode, PhysicsMode::Settled);
    log::info!("Ready for a new round");
}
