//! Pointer/drag input tracking
//!
//! Turns raw drag notifications into throttled samples and keeps the running
//! counters the scoring rules read. Nothing in here awards points.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DRAG_THROTTLE_MS, WIGGLE_SPEED_SCALE};

/// Events sent by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    DragStart,
    DragMove {
        delta: Vec2,
        /// Velocity as reported by the pointer system (units/s), if any
        #[serde(default)]
        velocity: Option<Vec2>,
    },
    DragEnd,
    PlayAgain,
}

/// One accepted drag sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub delta: Vec2,
    pub velocity: Vec2,
    pub timestamp: f64,
    /// Milliseconds since the previous accepted sample (0 for the first)
    pub elapsed_ms: f64,
    /// 1-based count of accepted samples in this drag
    pub index: u32,
}

impl DragSample {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Replace non-finite components with zero
fn sanitize(v: Vec2) -> Vec2 {
    if !v.is_finite() {
        log::debug!("Zeroing non-finite drag input {v:?}");
    }
    Vec2::new(
        if v.x.is_finite() { v.x } else { 0.0 },
        if v.y.is_finite() { v.y } else { 0.0 },
    )
}

/// Throttles drag moves and accumulates counters between samples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputTracker {
    last_accepted_ms: Option<f64>,
    /// Accepted samples since the drag began
    accepted: u32,
    /// Drag distance (|dx| + |dy|) since the last distance award, throttled
    /// moves included
    distance: f32,
    /// 0..1, from the last accepted horizontal speed
    wiggle: f32,
    /// Moves dropped by the throttle (diagnostics)
    dropped: u32,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new drag began
    pub fn begin(&mut self) {
        self.reset();
    }

    /// The drag ended
    pub fn end(&mut self) {
        self.reset();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn wiggle(&self) -> f32 {
        self.wiggle
    }

    /// Hand the accumulated distance to the caller and restart it
    pub fn take_distance(&mut self) -> f32 {
        std::mem::take(&mut self.distance)
    }

    /// Feed one raw drag move
    ///
    /// Returns `None` when the move arrived within the throttle interval of
    /// the last accepted one. Its distance still counts.
    pub fn sample(&mut self, delta: Vec2, velocity: Option<Vec2>, now: f64) -> Option<DragSample> {
        let delta = sanitize(delta);
        self.distance += delta.x.abs() + delta.y.abs();

        let elapsed_ms = match self.last_accepted_ms {
            Some(last) if now - last < DRAG_THROTTLE_MS => {
                self.dropped += 1;
                return None;
            }
            Some(last) => now - last,
            None => 0.0,
        };

        let velocity = match velocity {
            Some(v) => sanitize(v),
            // Derive from the delta; a zero interval gives no velocity
            None if elapsed_ms > 0.0 => sanitize(delta / (elapsed_ms as f32 / 1000.0)),
            None => Vec2::ZERO,
        };

        self.last_accepted_ms = Some(now);
        self.accepted += 1;
        self.wiggle = (velocity.x.abs() / WIGGLE_SPEED_SCALE).clamp(0.0, 1.0);

        Some(DragSample {
            delta,
            velocity,
            timestamp: now,
            elapsed_ms,
            index: self.accepted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_drops_fast_moves() {
        let mut tracker = InputTracker::new();
        tracker.begin();
        assert!(tracker.sample(Vec2::new(1.0, 0.0), None, 100.0).is_some());
        assert!(tracker.sample(Vec2::new(1.0, 0.0), None, 110.0).is_none());
        let s = tracker.sample(Vec2::new(1.0, 0.0), None, 116.0).unwrap();
        assert_eq!(s.index, 2);
        assert_eq!(s.elapsed_ms, 16.0);
        assert_eq!(tracker.dropped(), 1);
    }

    #[test]
    fn test_dropped_moves_still_accumulate_distance() {
        let mut tracker = InputTracker::new();
        tracker.sample(Vec2::new(3.0, -4.0), None, 0.0);
        tracker.sample(Vec2::new(-2.0, 1.0), None, 5.0);
        assert_eq!(tracker.distance(), 10.0);
        assert_eq!(tracker.accepted(), 1);
        assert_eq!(tracker.take_distance(), 10.0);
        assert_eq!(tracker.distance(), 0.0);
    }

    #[test]
    fn test_reported_velocity_wins() {
        let mut tracker = InputTracker::new();
        let s = tracker
            .sample(Vec2::new(1.0, 0.0), Some(Vec2::new(600.0, 800.0)), 0.0)
            .unwrap();
        assert_eq!(s.speed(), 1000.0);
        assert_eq!(tracker.wiggle(), 0.6);
    }

    #[test]
    fn test_derived_velocity_guards_zero_interval() {
        let mut tracker = InputTracker::new();
        let first = tracker.sample(Vec2::new(8.0, 0.0), None, 0.0).unwrap();
        assert_eq!(first.velocity, Vec2::ZERO);

        let second = tracker.sample(Vec2::new(8.0, 0.0), None, 20.0).unwrap();
        assert!((second.velocity.x - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_non_finite_input_is_zeroed() {
        let mut tracker = InputTracker::new();
        let s = tracker
            .sample(Vec2::new(f32::NAN, 2.0), Some(Vec2::new(f32::INFINITY, 1.0)), 0.0)
            .unwrap();
        assert_eq!(s.delta, Vec2::new(0.0, 2.0));
        assert_eq!(s.velocity, Vec2::new(0.0, 1.0));
        assert_eq!(tracker.distance(), 2.0);
    }

    #[test]
    fn test_end_resets_counters() {
        let mut tracker = InputTracker::new();
        tracker.sample(Vec2::new(5.0, 5.0), None, 0.0);
        tracker.end();
        assert_eq!(tracker.accepted(), 0);
        assert_eq!(tracker.distance(), 0.0);
        // Throttle window does not carry into the next drag
        assert!(tracker.sample(Vec2::ZERO, None, 1.0).is_some());
    }

    #[test]
    fn test_input_event_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"drag_move","delta":[1.0,2.0]}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::DragMove {
                delta: Vec2::new(1.0, 2.0),
                velocity: None
            }
        );
    }
}
