//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks (fixed-rate pacing)
//! - Input events (queued, drained once per frame)

pub mod input;
pub mod time;

pub use input::EventQueue;
pub use time::FramePacer;
#[cfg(not(target_arch = "wasm32"))]
pub use time::FrameClock;
