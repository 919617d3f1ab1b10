//! Round lifecycle: Idle -> Active -> Ended -> Idle
//!
//! The countdown is a 1 s [`Interval`] that only runs while Active.

use serde::{Deserialize, Serialize};

use super::timer::Interval;
use crate::consts::COUNTDOWN_PERIOD_MS;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the first drag
    Idle,
    /// Countdown running, scoring live
    Active,
    /// Results showing, scoring frozen
    Ended,
}

/// How close the countdown is to zero (display hint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerUrgency {
    Normal,
    Warning,
    Critical,
}

impl TimerUrgency {
    pub fn from_seconds(seconds: u32) -> Self {
        match seconds {
            0..=3 => TimerUrgency::Critical,
            4..=5 => TimerUrgency::Warning,
            _ => TimerUrgency::Normal,
        }
    }
}

/// Summary of a finished round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub score: u64,
    pub max_combo: u32,
    /// Monotonic ms when the round ended
    pub ended_at: f64,
    /// Leaderboard rank, once recorded
    pub rank: Option<usize>,
}

impl RoundResult {
    pub fn is_new_high_score(&self) -> bool {
        self.rank.is_some()
    }
}

/// Round controller state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub phase: RoundPhase,
    /// Whole seconds left, never below 0
    pub time_remaining: u32,
    pub started_at: Option<f64>,
    round_seconds: u32,
    countdown: Interval,
}

impl Round {
    pub fn new(round_seconds: u32) -> Self {
        Self {
            phase: RoundPhase::Idle,
            time_remaining: round_seconds,
            started_at: None,
            round_seconds,
            countdown: Interval::new(COUNTDOWN_PERIOD_MS),
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    pub fn round_seconds(&self) -> u32 {
        self.round_seconds
    }

    pub fn urgency(&self) -> TimerUrgency {
        TimerUrgency::from_seconds(self.time_remaining)
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_running()
    }

    /// Idle -> Active. Returns true if this call started the round.
    pub fn begin(&mut self, now: f64) -> bool {
        if self.phase != RoundPhase::Idle {
            return false;
        }
        self.phase = RoundPhase::Active;
        self.time_remaining = self.round_seconds;
        self.started_at = Some(now);
        self.countdown.start(now);
        true
    }

    /// Run countdown ticks due by `now`
    ///
    /// Returns true only on the call that moved the round to Ended.
    pub fn advance(&mut self, now: f64) -> bool {
        if !self.is_active() {
            return false;
        }
        while self.countdown.fire_due(now).is_some() {
            self.time_remaining = self.time_remaining.saturating_sub(1);
            if self.time_remaining == 0 {
                self.phase = RoundPhase::Ended;
                self.countdown.cancel();
                return true;
            }
        }
        false
    }

    /// Ended -> Idle ("play again"). Returns true if it reset.
    pub fn reset(&mut self) -> bool {
        if self.phase != RoundPhase::Ended {
            return false;
        }
        *self = Self::new(self.round_seconds);
        true
    }

    /// Stop the countdown without changing phase (teardown)
    pub fn cancel_timers(&mut self) {
        self.countdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_only_from_idle() {
        let mut round = Round::new(10);
        assert!(round.begin(500.0));
        assert!(!round.begin(600.0));
        assert_eq!(round.started_at, Some(500.0));
        assert!(round.is_counting_down());
    }

    #[test]
    fn test_countdown_once_per_second() {
        let mut round = Round::new(10);
        round.begin(0.0);
        for second in 1..10 {
            assert!(!round.advance(second as f64 * 1000.0 - 1.0));
            assert_eq!(round.time_remaining, 10 - (second - 1));
            assert!(!round.advance(second as f64 * 1000.0));
            assert_eq!(round.time_remaining, 10 - second);
        }
        assert!(round.advance(10_000.0));
        assert_eq!(round.time_remaining, 0);
        assert_eq!(round.phase, RoundPhase::Ended);
    }

    #[test]
    fn test_end_fires_exactly_once() {
        let mut round = Round::new(10);
        round.begin(0.0);
        // One very late poll catches up and ends
        assert!(round.advance(60_000.0));
        assert!(!round.advance(61_000.0));
        assert!(!round.advance(120_000.0));
        assert_eq!(round.time_remaining, 0);
        assert!(!round.is_counting_down());
    }

    #[test]
    fn test_idle_does_not_count_down() {
        let mut round = Round::new(10);
        assert!(!round.advance(50_000.0));
        assert_eq!(round.time_remaining, 10);
        assert_eq!(round.phase, RoundPhase::Idle);
    }

    #[test]
    fn test_reset_only_from_ended() {
        let mut round = Round::new(3);
        assert!(!round.reset());
        round.begin(0.0);
        assert!(!round.reset());
        round.advance(3000.0);
        assert!(round.reset());
        assert_eq!(round.phase, RoundPhase::Idle);
        assert_eq!(round.time_remaining, 3);
        assert_eq!(round.started_at, None);
    }

    #[test]
    fn test_cancel_timers_stops_countdown() {
        let mut round = Round::new(10);
        round.begin(0.0);
        round.cancel_timers();
        assert!(!round.advance(20_000.0));
        assert_eq!(round.time_remaining, 10);
    }

    #[test]
    fn test_urgency() {
        assert_eq!(TimerUrgency::from_seconds(10), TimerUrgency::Normal);
        assert_eq!(TimerUrgency::from_seconds(5), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_seconds(3), TimerUrgency::Critical);
        assert_eq!(TimerUrgency::from_seconds(0), TimerUrgency::Critical);
    }
}
