//! Time sources
//!
//! The simulation never reads a clock itself; the session asks a [`Clock`]
//! once per call and passes the timestamp down.

use std::cell::Cell;
use std::rc::Rc;

/// Millisecond time source
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin
    fn now_ms(&self) -> f64;
    /// Unix timestamp in milliseconds (for leaderboard dates)
    fn unix_ms(&self) -> f64;
}

/// Real time: `Instant` on native, `performance.now()` in the browser
#[derive(Debug, Clone)]
pub struct SystemClock {
    #[cfg(not(target_arch = "wasm32"))]
    origin: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn unix_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

#[cfg(target_arch = "wasm32")]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        // performance.now() is monotonic; Date.now() only as a last resort
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn unix_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Hand-driven clock for tests and headless runs
///
/// Clones share the same time, so a test can keep one handle and advance it
/// while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
    epoch: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose wall time starts at `epoch_ms`
    pub fn with_epoch(epoch_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(0.0)),
            epoch: epoch_ms,
        }
    }

    pub fn set(&self, ms: f64) {
        // Monotonic: never step backwards
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }

    pub fn advance(&self, ms: f64) {
        if ms > 0.0 {
            self.now.set(self.now.get() + ms);
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn unix_ms(&self) -> f64 {
        self.epoch + self.now.get()
    }
}
