//! One game instance: state + clock + leaderboard storage
//!
//! The host forwards input events and calls [`Session::frame`] from its
//! redraw loop. Finished rounds are recorded and persisted here, which keeps
//! the simulation itself free of storage concerns.

use crate::highscores::{HighScoreEntry, Leaderboard};
use crate::persistence::ScoreStorage;
use crate::platform::Clock;
use crate::settings::Settings;
use crate::sim::{GameState, InputEvent, RoundResult, Snapshot, TickReport, handle_input, tick};

pub struct Session<C: Clock, S: ScoreStorage> {
    state: GameState,
    leaderboard: Leaderboard,
    clock: C,
    storage: S,
}

impl<C: Clock, S: ScoreStorage> Session<C, S> {
    /// Start a session, loading the leaderboard (failures start it empty)
    pub fn new(settings: Settings, clock: C, storage: S) -> Self {
        let leaderboard = Leaderboard::load_from(&storage);
        Self {
            state: GameState::new(settings),
            leaderboard,
            clock,
            storage,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Forward one presentation event
    ///
    /// Timers that came due first still end the round, in which case the
    /// event itself is dropped.
    pub fn input(&mut self, event: InputEvent) -> TickReport {
        let now = self.clock.now_ms();
        let report = handle_input(&mut self.state, event, now);
        self.finish(report)
    }

    /// Advance timers and physics to the clock's current time
    pub fn frame(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        let report = tick(&mut self.state, now);
        self.finish(report)
    }

    fn finish(&mut self, mut report: TickReport) -> TickReport {
        if let Some(result) = report.round_ended.as_mut() {
            self.finalize(result);
        }
        report
    }

    pub fn snapshot(&mut self) -> Snapshot {
        let now = self.clock.now_ms();
        self.state.snapshot(now)
    }

    /// Whether the last finished round made the leaderboard
    pub fn is_new_high_score(&self) -> bool {
        self.state
            .last_result
            .is_some_and(|r| r.is_new_high_score())
    }

    /// Stop every timer; the session ignores all later calls
    pub fn teardown(&mut self) {
        self.state.teardown();
        log::debug!("Session torn down");
    }

    /// Record a finished round and persist the board
    fn finalize(&mut self, result: &mut RoundResult) {
        let entry = HighScoreEntry {
            score: result.score,
            timestamp: self.clock.unix_ms(),
            max_combo: result.max_combo,
        };
        let outcome = self.leaderboard.record(entry);
        result.rank = outcome.rank;
        self.state.last_result = Some(*result);
        if let Some(rank) = outcome.rank {
            log::info!("New high score {} at rank {}", result.score, rank);
        }
        self.leaderboard.save_to(&mut self.storage);
    }
}

impl<C: Clock, S: ScoreStorage> Drop for Session<C, S> {
    fn drop(&mut self) {
        self.state.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::platform::ManualClock;
    use crate::sim::RoundPhase;
    use glam::Vec2;

    fn session() -> (Session<ManualClock, MemoryStorage>, ManualClock) {
        let clock = ManualClock::with_epoch(1_700_000_000_000.0);
        let session = Session::new(Settings::default(), clock.clone(), MemoryStorage::new());
        (session, clock)
    }

    /// Play one round: a drag, a throw, then let the timer run out
    fn play_round(session: &mut Session<ManualClock, MemoryStorage>, clock: &ManualClock, moves: u32) {
        session.input(InputEvent::DragStart);
        for _ in 0..moves {
            clock.advance(20.0);
            session.input(InputEvent::DragMove {
                delta: Vec2::new(6.0, -2.0),
                velocity: Some(Vec2::new(700.0, 0.0)),
            });
            session.frame();
        }
        session.input(InputEvent::DragEnd);
        while session.state().phase() != RoundPhase::Ended {
            clock.advance(16.0);
            session.frame();
        }
    }

    #[test]
    fn test_round_is_recorded_and_saved() {
        let (mut session, clock) = session();
        play_round(&mut session, &clock, 30);

        let score = session.state().scoring.score;
        assert!(score > 0);
        assert!(session.is_new_high_score());
        assert_eq!(session.leaderboard().top_score(), Some(score));
        assert_eq!(session.storage().saves, 1);

        let entry = &session.leaderboard().entries[0];
        assert!(entry.timestamp >= 1_700_000_000_000.0);
        assert!(entry.max_combo >= 1);
    }

    #[test]
    fn test_play_again_then_second_round() {
        let (mut session, clock) = session();
        play_round(&mut session, &clock, 30);
        session.input(InputEvent::PlayAgain);
        assert_eq!(session.state().phase(), RoundPhase::Idle);
        assert!(!session.is_new_high_score());

        clock.advance(5_000.0);
        session.frame();
        assert_eq!(session.state().phase(), RoundPhase::Idle);

        play_round(&mut session, &clock, 5);
        assert_eq!(session.leaderboard().entries.len(), 2);
        assert_eq!(session.storage().saves, 2);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let clock = ManualClock::new();
        let session = Session::new(Settings::default(), clock, MemoryStorage::with_raw("nope"));
        assert!(session.leaderboard().is_empty());
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let clock = ManualClock::new();
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;
        let mut session = Session::new(Settings::default(), clock.clone(), storage);
        play_round(&mut session, &clock, 3);
        assert_eq!(session.leaderboard().entries.len(), 1);
        assert!(session.storage().raw().is_none());
    }

    #[test]
    fn test_not_a_high_score_when_board_full() {
        let stored = r#"[{"score":9000,"timestamp":0},{"score":8000,"timestamp":0},
            {"score":7000,"timestamp":0},{"score":6000,"timestamp":0},{"score":5000,"timestamp":0}]"#;
        let clock = ManualClock::new();
        let mut session = Session::new(Settings::default(), clock.clone(), MemoryStorage::with_raw(stored));
        play_round(&mut session, &clock, 2);
        assert!(!session.is_new_high_score());
        assert_eq!(session.leaderboard().scores(), vec![9000, 8000, 7000, 6000, 5000]);
    }

    #[test]
    fn test_late_input_records_expired_round() {
        let (mut session, clock) = session();
        session.input(InputEvent::DragStart);
        clock.advance(10_500.0);
        let report = session.input(InputEvent::DragEnd);
        assert_eq!(report.round_ended.map(|r| r.score), Some(5));
        assert_eq!(session.leaderboard().scores(), vec![5]);
        assert_eq!(session.storage().saves, 1);
        assert!(session.is_new_high_score());

        clock.advance(16.0);
        assert!(session.frame().round_ended.is_none());
        assert_eq!(session.storage().saves, 1);
    }

    #[test]
    fn test_teardown_ignores_later_calls() {
        let (mut session, clock) = session();
        session.input(InputEvent::DragStart);
        session.teardown();
        clock.advance(60_000.0);
        let report = session.frame();
        assert!(report.round_ended.is_none());
        assert_eq!(session.state().phase(), RoundPhase::Active);
        assert!(!session.state().has_pending_work());
        assert_eq!(session.storage().saves, 0);
    }

    #[test]
    fn test_snapshot_tracks_state() {
        let (mut session, clock) = session();
        session.input(InputEvent::DragStart);
        clock.advance(1_000.0);
        session.frame();
        let snap = session.snapshot();
        assert_eq!(snap.phase, RoundPhase::Active);
        assert_eq!(snap.time_remaining, 9);
        assert_eq!(snap.score, 5);
        assert!(snap.held);
    }
}
