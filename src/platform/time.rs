//! Frame pacing
//!
//! The browser hands us frames at the display's refresh rate; the simulation
//! ticks at a fixed rate. The accumulator converts one into the other.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

use crate::consts::MAX_SUBSTEPS;

/// Longest host frame we try to catch up on (seconds)
const MAX_FRAME_TIME: f64 = 0.1;

/// Fixed-rate tick accumulator
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: f64,
    accumulator: f64,
    max_substeps: u32,
}

impl FramePacer {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            interval: 1.0 / frame_rate.max(1) as f64,
            accumulator: 0.0,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    /// Seconds per tick
    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Feed elapsed host time, get the number of ticks to run now
    ///
    /// Long stalls (tab in background, debugger) are clamped rather than
    /// replayed, and leftover backlog beyond the substep cap is dropped.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulator += elapsed.min(MAX_FRAME_TIME);
        }

        let mut ticks = 0;
        while self.accumulator >= self.interval && ticks < self.max_substeps {
            self.accumulator -= self.interval;
            ticks += 1;
        }
        if ticks == self.max_substeps {
            self.accumulator = self.accumulator.min(self.interval);
        }
        ticks
    }
}

/// Sleep-based pacing for the native loop
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl FrameClock {
    pub fn new(frame_rate: u32) -> Self {
        let interval = Duration::from_secs_f64(1.0 / frame_rate.max(1) as f64);
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    /// Block until the next tick is due
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
            self.next += self.interval;
        } else {
            // Running behind: don't try to catch up
            self.next = now + self.interval;
        }
    }
}
