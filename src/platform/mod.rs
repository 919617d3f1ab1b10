//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time (monotonic frame clock + wall clock for leaderboard dates)
//! - Storage (LocalStorage on web)

pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod storage;

pub use time::{Clock, ManualClock, SystemClock};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
