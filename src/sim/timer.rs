//! Cooperative scheduling primitives
//!
//! Nothing here sleeps or spawns. A host calls into the simulation with the
//! current time and each primitive reports what became due. Cancelling simply
//! clears the schedule, so a callback that was due is skipped on the next poll.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};
use crate::settings::StepMode;

/// Repeating timer with a fixed period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    period_ms: f64,
    next_due: Option<f64>,
}

impl Interval {
    pub const fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            next_due: None,
        }
    }

    /// (Re)start so the first firing is one period after `now`
    pub fn start(&mut self, now: f64) {
        if self.period_ms > 0.0 {
            self.next_due = Some(now + self.period_ms);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Pop one overdue firing, returning its scheduled time
    ///
    /// Call in a loop: a host that polls late gets every missed firing, in
    /// order, and can cancel between them.
    pub fn fire_due(&mut self, now: f64) -> Option<f64> {
        let due = self.next_due?;
        if now < due {
            return None;
        }
        self.next_due = Some(due + self.period_ms);
        Some(due)
    }
}

/// Integration steps produced by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSteps {
    pub count: u32,
    /// Seconds per step
    pub dt: f32,
}

impl FrameSteps {
    pub const NONE: Self = Self { count: 0, dt: 0.0 };
}

/// Per-frame callback request, the `requestAnimationFrame` analogue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameDriver {
    scheduled: bool,
    last_frame: Option<f64>,
    accumulator: f32,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for frames starting now; the first frame measures from `now`
    pub fn request(&mut self, now: f64) {
        self.scheduled = true;
        self.last_frame = Some(now);
        self.accumulator = 0.0;
    }

    /// Stop delivering frames
    pub fn cancel(&mut self) {
        self.scheduled = false;
        self.last_frame = None;
        self.accumulator = 0.0;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Seconds since the previous frame, capped at [`MAX_FRAME_DT`]
    fn take_dt(&mut self, now: f64) -> f32 {
        let last = self.last_frame.unwrap_or(now);
        self.last_frame = Some(now.max(last));
        let dt = ((now - last) / 1000.0) as f32;
        if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        }
    }

    /// Advance to `now` and report the integration steps to run
    pub fn frame(&mut self, now: f64, mode: StepMode) -> FrameSteps {
        if !self.scheduled {
            return FrameSteps::NONE;
        }
        let dt = self.take_dt(now);
        match mode {
            StepMode::Variable => {
                if dt > 0.0 {
                    FrameSteps { count: 1, dt }
                } else {
                    FrameSteps::NONE
                }
            }
            StepMode::Fixed { hz } => {
                let step = 1.0 / hz;
                self.accumulator += dt;
                let mut count = 0;
                while self.accumulator >= step && count < MAX_SUBSTEPS {
                    self.accumulator -= step;
                    count += 1;
                }
                // Drop time we could not catch up on (spiral of death)
                if count == MAX_SUBSTEPS {
                    self.accumulator = self.accumulator.min(step);
                }
                FrameSteps { count, dt: step }
            }
        }
    }
}
