//! Scoring, combo and multiplier rules
//!
//! Every scoring event goes through [`Scoring::add_points`]. Combos grow while
//! events arrive less than a second apart; a decay bar, refilled by each event
//! and drained by a 30 ms timer, clears the combo when it runs out.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::{DragSample, InputTracker};
use super::timer::Interval;
use crate::clamp_points;
use crate::consts::*;

/// Penalty popups float this far above the event origin
const PENALTY_POPUP_RISE: f32 = 40.0;

/// Something that earns points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScoreEvent {
    /// Every N-th accepted drag sample
    DragTick,
    /// Accumulated drag distance crossed the threshold
    DistanceThreshold { distance: f32 },
    /// Fast drag on an every-N-th sample
    SpeedBurst { speed: f32 },
    DragStart,
    DragEnd,
    /// Floor impact (|vy| before reflection)
    Bounce { impact_speed: f32 },
}

impl ScoreEvent {
    /// Base points before the multiplier
    pub fn points(&self) -> u32 {
        match *self {
            ScoreEvent::DragTick => DRAG_TICK_POINTS,
            ScoreEvent::DistanceThreshold { distance } => clamp_points(
                distance,
                DISTANCE_DIVISOR,
                DISTANCE_MIN_POINTS,
                DISTANCE_MAX_POINTS,
            ),
            ScoreEvent::SpeedBurst { speed } => {
                clamp_points(speed, SPEED_DIVISOR, 0, SPEED_MAX_POINTS)
            }
            ScoreEvent::DragStart => DRAG_START_POINTS,
            ScoreEvent::DragEnd => DRAG_END_POINTS,
            ScoreEvent::Bounce { impact_speed } => super::physics::bounce_points(impact_speed),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreEvent::DragTick => "drag",
            ScoreEvent::DistanceThreshold { .. } => "distance",
            ScoreEvent::SpeedBurst { .. } => "speed",
            ScoreEvent::DragStart => "drag start",
            ScoreEvent::DragEnd => "drag end",
            ScoreEvent::Bounce { .. } => "bounce",
        }
    }
}

/// Scoring events produced by one accepted drag sample, in award order
pub fn drag_score_events(sample: &DragSample, tracker: &mut InputTracker) -> Vec<ScoreEvent> {
    let mut events = Vec::new();

    if sample.index % DRAG_TICK_EVERY == 0 {
        events.push(ScoreEvent::DragTick);
    }

    if tracker.distance() > DISTANCE_THRESHOLD {
        let distance = tracker.take_distance();
        events.push(ScoreEvent::DistanceThreshold { distance });
    }

    let speed = sample.speed();
    if speed > SPEED_BURST_THRESHOLD && sample.index % SPEED_BURST_EVERY == 0 {
        events.push(ScoreEvent::SpeedBurst { speed });
    }

    events
}

/// Multiplier tier for a combo count
pub fn multiplier_for(combo: u32) -> u32 {
    match combo {
        0..5 => 1,
        5..10 => 2,
        10..20 => 3,
        20..30 => 4,
        _ => 5,
    }
}

/// Top three multiplier tiers
pub fn is_on_fire(multiplier: u32) -> bool {
    multiplier >= 3
}

/// Cosmetic name for how hot the combo is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboFlavor {
    Regular,
    Toasted,
    Seared,
    Spicy,
    Hot,
    Golden,
    Glowing,
    Radioactive,
    Cosmic,
    Mystical,
    Legendary,
    Rainbow,
}

impl ComboFlavor {
    pub fn from_combo(combo: u32) -> Self {
        match combo {
            0 => ComboFlavor::Regular,
            1..5 => ComboFlavor::Toasted,
            5..10 => ComboFlavor::Seared,
            10..15 => ComboFlavor::Spicy,
            15..20 => ComboFlavor::Hot,
            20..25 => ComboFlavor::Golden,
            25..30 => ComboFlavor::Glowing,
            30..40 => ComboFlavor::Radioactive,
            40..50 => ComboFlavor::Cosmic,
            50..75 => ComboFlavor::Mystical,
            75..100 => ComboFlavor::Legendary,
            _ => ComboFlavor::Rainbow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComboFlavor::Regular => "Regular",
            ComboFlavor::Toasted => "Toasted",
            ComboFlavor::Seared => "Seared",
            ComboFlavor::Spicy => "Spicy",
            ComboFlavor::Hot => "Hot",
            ComboFlavor::Golden => "Golden",
            ComboFlavor::Glowing => "Glowing",
            ComboFlavor::Radioactive => "Radioactive",
            ComboFlavor::Cosmic => "Cosmic",
            ComboFlavor::Mystical => "Mystical",
            ComboFlavor::Legendary => "Legendary",
            ComboFlavor::Rainbow => "RAINBOW",
        }
    }
}

/// Floating score text (visual only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Popup {
    pub id: u64,
    /// Negative for a broken combo
    pub value: i64,
    pub pos: Vec2,
    pub created_ms: f64,
}

/// Live combo and its decay bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboState {
    pub count: u32,
    pub multiplier: u32,
    pub last_score_ms: Option<f64>,
    /// 0..=100, refilled by every scoring event
    pub remaining: u32,
    /// Highest count reached this round
    pub max_count: u32,
    decay: Interval,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            multiplier: 1,
            last_score_ms: None,
            remaining: 0,
            max_count: 0,
            decay: Interval::new(COMBO_DECAY_PERIOD_MS),
        }
    }
}

impl ComboState {
    pub fn is_on_fire(&self) -> bool {
        is_on_fire(self.multiplier)
    }

    pub fn is_decaying(&self) -> bool {
        self.decay.is_running()
    }

    fn set_count(&mut self, count: u32) {
        self.count = count;
        self.multiplier = multiplier_for(count);
        self.max_count = self.max_count.max(count);
    }

    /// Drop the combo without a penalty (decay ran out)
    fn clear(&mut self) {
        self.count = 0;
        self.multiplier = 1;
        self.remaining = 0;
        self.decay.cancel();
    }
}

/// Result of one [`Scoring::add_points`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub base: u32,
    pub multiplier: u32,
    pub awarded: u64,
    pub combo: u32,
    /// Size of the combo this event broke, if it showed a penalty
    pub broken_combo: Option<u32>,
}

/// Score accumulator, combo machine, popups and screen shake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoring {
    pub score: u64,
    pub combo: ComboState,
    pub popups: VecDeque<Popup>,
    next_popup_id: u64,
    last_shake_ms: Option<f64>,
    shake_until_ms: Option<f64>,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            score: 0,
            combo: ComboState::default(),
            popups: VecDeque::with_capacity(MAX_POPUPS),
            next_popup_id: 0,
            last_shake_ms: None,
            shake_until_ms: None,
        }
    }
}

impl Scoring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Award `amount` base points for an event at `origin`
    pub fn add_points(&mut self, amount: u32, origin: Vec2, now: f64) -> Award {
        let within_window = self
            .combo
            .last_score_ms
            .is_some_and(|last| now - last < COMBO_WINDOW_MS);

        let mut broken_combo = None;
        if within_window {
            self.combo.set_count(self.combo.count + 1);
        } else {
            let outgoing = self.combo.count;
            if outgoing > COMBO_BREAK_PENALTY_MIN {
                log::debug!("Combo of {} broken", outgoing);
                broken_combo = Some(outgoing);
                self.push_popup(
                    -(outgoing as i64),
                    origin - Vec2::new(0.0, PENALTY_POPUP_RISE),
                    now,
                );
            }
            self.combo.set_count(1);
        }
        self.combo.last_score_ms = Some(now);

        // The tier this event unlocked already applies to it
        let multiplier = self.combo.multiplier;
        let awarded = amount as u64 * multiplier as u64;
        self.score = self.score.saturating_add(awarded);
        self.push_popup(awarded as i64, origin, now);

        if awarded >= SHAKE_MIN_POINTS as u64
            && self
                .last_shake_ms
                .is_none_or(|last| now - last > SHAKE_COOLDOWN_MS)
        {
            self.last_shake_ms = Some(now);
            self.shake_until_ms = Some(now + SHAKE_DURATION_MS);
        }

        self.combo.remaining = COMBO_TIMER_FULL;
        self.combo.decay.start(now);

        Award {
            base: amount,
            multiplier,
            awarded,
            combo: self.combo.count,
            broken_combo,
        }
    }

    /// Score an event
    pub fn award(&mut self, event: ScoreEvent, origin: Vec2, now: f64) -> Award {
        self.add_points(event.points(), origin, now)
    }

    /// Drain the decay bar for every 30 ms period elapsed up to `now`
    ///
    /// Returns true on the call that cleared the combo.
    pub fn decay(&mut self, now: f64) -> bool {
        while self.combo.decay.fire_due(now).is_some() {
            self.combo.remaining = self.combo.remaining.saturating_sub(1);
            if self.combo.remaining == 0 {
                self.combo.clear();
                return true;
            }
        }
        false
    }

    /// Drop popups older than their display time
    pub fn expire_popups(&mut self, now: f64) {
        self.popups
            .retain(|p| now - p.created_ms < POPUP_DURATION_MS);
    }

    pub fn is_shaking(&self, now: f64) -> bool {
        self.shake_until_ms.is_some_and(|until| now < until)
    }

    /// Stop the decay timer, leaving the combo as it is
    pub fn freeze(&mut self) {
        self.combo.decay.cancel();
    }

    /// Everything back to a fresh round
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn push_popup(&mut self, value: i64, pos: Vec2, now: f64) {
        let id = self.next_popup_id;
        self.next_popup_id += 1;
        self.popups.push_back(Popup {
            id,
            value,
            pos,
            created_ms: now,
        });
        while self.popups.len() > MAX_POPUPS {
            self.popups.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_multiplier_tier_boundaries() {
        let table = [
            (0, 1),
            (4, 1),
            (5, 2),
            (9, 2),
            (10, 3),
            (19, 3),
            (20, 4),
            (29, 4),
            (30, 5),
            (500, 5),
        ];
        for (combo, expected) in table {
            assert_eq!(multiplier_for(combo), expected, "combo {combo}");
            assert_eq!(is_on_fire(multiplier_for(combo)), expected >= 3);
        }
    }

    proptest! {
        #[test]
        fn prop_multiplier_monotonic(a in 0u32..1000, b in 0u32..1000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(multiplier_for(lo) <= multiplier_for(hi));
            prop_assert!((1..=5).contains(&multiplier_for(a)));
        }

        #[test]
        fn prop_score_never_decreases(gaps in proptest::collection::vec(0u32..2500, 1..80),
                                      amounts in proptest::collection::vec(0u32..40, 80)) {
            let mut scoring = Scoring::new();
            let mut now = 0.0;
            let mut last = 0;
            for (gap, amount) in gaps.iter().zip(amounts.iter()) {
                now += *gap as f64;
                scoring.decay(now);
                scoring.add_points(*amount, Vec2::ZERO, now);
                prop_assert!(scoring.score >= last);
                last = scoring.score;
            }
        }
    }

    #[test]
    fn test_event_points() {
        assert_eq!(ScoreEvent::DragTick.points(), 1);
        assert_eq!(ScoreEvent::DistanceThreshold { distance: 51.0 }.points(), 3);
        assert_eq!(ScoreEvent::DistanceThreshold { distance: 150.0 }.points(), 7);
        assert_eq!(ScoreEvent::DistanceThreshold { distance: 900.0 }.points(), 10);
        assert_eq!(ScoreEvent::SpeedBurst { speed: 750.0 }.points(), 7);
        assert_eq!(ScoreEvent::SpeedBurst { speed: 4000.0 }.points(), 15);
        assert_eq!(ScoreEvent::DragStart.points(), 5);
        assert_eq!(ScoreEvent::Bounce { impact_speed: 250.0 }.points(), 10);
        assert_eq!(ScoreEvent::Bounce { impact_speed: 3500.0 }.points(), 30);
    }

    #[test]
    fn test_combo_builds_within_window() {
        let mut scoring = Scoring::new();
        let first = scoring.add_points(5, Vec2::ZERO, 0.0);
        assert_eq!(first.combo, 1);
        assert_eq!(first.awarded, 5);

        for i in 1..=4 {
            scoring.add_points(1, Vec2::ZERO, i as f64 * 100.0);
        }
        assert_eq!(scoring.combo.count, 5);
        assert_eq!(scoring.combo.multiplier, 2);
        // The fifth event is already doubled
        assert_eq!(scoring.score, 5 + 1 + 1 + 1 + 2);
    }

    #[test]
    fn test_unlocked_tier_applies_to_unlocking_event() {
        let mut scoring = Scoring::new();
        for i in 0..9 {
            scoring.add_points(1, Vec2::ZERO, i as f64 * 10.0);
        }
        let award = scoring.add_points(10, Vec2::ZERO, 90.0);
        assert_eq!(award.combo, 10);
        assert_eq!(award.multiplier, 3);
        assert_eq!(award.awarded, 30);
        assert!(scoring.combo.is_on_fire());
    }

    #[test]
    fn test_combo_break_penalty_popup() {
        let mut scoring = Scoring::new();
        for i in 0..7 {
            scoring.add_points(1, Vec2::new(0.0, 100.0), i as f64 * 10.0);
        }
        let before = scoring.score;
        let award = scoring.add_points(4, Vec2::new(0.0, 100.0), 2000.0);
        assert_eq!(award.broken_combo, Some(7));
        assert_eq!(award.combo, 1);
        assert_eq!(award.awarded, 4);
        assert_eq!(scoring.score, before + 4);

        let n = scoring.popups.len();
        let penalty = scoring.popups[n - 2];
        assert_eq!(penalty.value, -7);
        assert_eq!(penalty.pos, Vec2::new(0.0, 60.0));
    }

    #[test]
    fn test_small_combo_break_has_no_penalty() {
        let mut scoring = Scoring::new();
        for i in 0..5 {
            scoring.add_points(1, Vec2::ZERO, i as f64 * 10.0);
        }
        let award = scoring.add_points(1, Vec2::ZERO, 5000.0);
        assert_eq!(award.broken_combo, None);
        assert!(scoring.popups.iter().all(|p| p.value > 0));
    }

    #[test]
    fn test_decay_resets_exactly_once() {
        let mut scoring = Scoring::new();
        scoring.add_points(1, Vec2::ZERO, 0.0);
        scoring.add_points(1, Vec2::ZERO, 0.0);
        assert_eq!(scoring.combo.remaining, 100);

        // 99 ticks: still alive
        let mut now = 0.0;
        for _ in 0..99 {
            now += COMBO_DECAY_PERIOD_MS;
            assert!(!scoring.decay(now));
        }
        assert_eq!(scoring.combo.remaining, 1);
        assert_eq!(scoring.combo.count, 2);

        // 100th tick clears it
        now += COMBO_DECAY_PERIOD_MS;
        assert!(scoring.decay(now));
        assert_eq!(scoring.combo.count, 0);
        assert_eq!(scoring.combo.multiplier, 1);
        assert!(!scoring.combo.is_decaying());

        // Nothing more fires afterwards
        assert!(!scoring.decay(now + 10_000.0));
        assert_eq!(scoring.combo.max_count, 2);
    }

    #[test]
    fn test_decay_catches_up_in_one_poll() {
        let mut scoring = Scoring::new();
        scoring.add_points(1, Vec2::ZERO, 0.0);
        assert!(!scoring.decay(1500.0));
        assert_eq!(scoring.combo.remaining, 50);
        assert!(scoring.decay(3000.0));
    }

    #[test]
    fn test_scoring_refills_decay_bar() {
        let mut scoring = Scoring::new();
        scoring.add_points(1, Vec2::ZERO, 0.0);
        scoring.decay(900.0);
        assert_eq!(scoring.combo.remaining, 70);
        scoring.add_points(1, Vec2::ZERO, 900.0);
        assert_eq!(scoring.combo.remaining, 100);
        // Restarted from 900, so 2999 ms after it is still alive
        assert!(!scoring.decay(3899.0));
        assert!(scoring.decay(3900.0));
    }

    #[test]
    fn test_popups_capped_and_expire() {
        let mut scoring = Scoring::new();
        for i in 0..15 {
            scoring.add_points(1, Vec2::ZERO, i as f64);
        }
        assert_eq!(scoring.popups.len(), MAX_POPUPS);
        assert_eq!(scoring.popups.back().unwrap().id, 14);

        scoring.expire_popups(14.0 + POPUP_DURATION_MS - 1.0);
        assert_eq!(scoring.popups.len(), 1);
        scoring.expire_popups(14.0 + POPUP_DURATION_MS);
        assert!(scoring.popups.is_empty());
    }

    #[test]
    fn test_popup_cap_does_not_touch_score() {
        let mut capped = Scoring::new();
        for i in 0..40 {
            capped.add_points(2, Vec2::ZERO, i as f64 * 10.0);
        }
        let expected: u64 = (1..=40u32).map(|c| 2 * multiplier_for(c) as u64).sum();
        assert_eq!(capped.score, expected);
    }

    #[test]
    fn test_screen_shake_throttled() {
        let mut scoring = Scoring::new();
        scoring.add_points(25, Vec2::ZERO, 0.0);
        assert!(scoring.is_shaking(100.0));
        assert!(!scoring.is_shaking(300.0));

        scoring.add_points(25, Vec2::ZERO, 400.0);
        assert!(!scoring.is_shaking(450.0), "within cooldown");

        scoring.add_points(25, Vec2::ZERO, 501.0);
        assert!(scoring.is_shaking(600.0));
    }

    #[test]
    fn test_drag_score_events() {
        let mut tracker = InputTracker::new();
        let mut events = Vec::new();
        let mut now = 0.0;
        for _ in 0..10 {
            if let Some(sample) = tracker.sample(Vec2::new(3.0, 0.0), Some(Vec2::new(900.0, 0.0)), now) {
                events.extend(drag_score_events(&sample, &mut tracker));
            }
            now += 20.0;
        }
        let ticks = events.iter().filter(|e| **e == ScoreEvent::DragTick).count();
        assert_eq!(ticks, 2);
        let bursts: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ScoreEvent::SpeedBurst { .. }))
            .collect();
        assert_eq!(bursts.len(), 1);
        // 30 units of distance never crosses the threshold
        assert!(!events.iter().any(|e| matches!(e, ScoreEvent::DistanceThreshold { .. })));
        assert_eq!(tracker.distance(), 30.0);
    }

    #[test]
    fn test_distance_threshold_resets_accumulator() {
        let mut tracker = InputTracker::new();
        let sample = tracker.sample(Vec2::new(40.0, 20.0), None, 0.0).unwrap();
        let events = drag_score_events(&sample, &mut tracker);
        assert_eq!(events, vec![ScoreEvent::DistanceThreshold { distance: 60.0 }]);
        assert_eq!(events[0].points(), 3);
        assert_eq!(tracker.distance(), 0.0);
    }

    #[test]
    fn test_combo_flavor() {
        assert_eq!(ComboFlavor::from_combo(0).as_str(), "Regular");
        assert_eq!(ComboFlavor::from_combo(4), ComboFlavor::Toasted);
        assert_eq!(ComboFlavor::from_combo(12), ComboFlavor::Spicy);
        assert_eq!(ComboFlavor::from_combo(99), ComboFlavor::Legendary);
        assert_eq!(ComboFlavor::from_combo(100).as_str(), "RAINBOW");
    }
}
