//! Tick clock for the cooperative scheduler
//!
//! The host drives the director once per frame with a simulated and a real
//! delta. Simulated time may stand still (paused) while real time advances.

use serde::{Deserialize, Serialize};

/// A discrete tick identifier (one `Director::update` call)
pub type Tick = u64;

/// Tick counter plus the deltas of the current tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    tick: Tick,
    sim_delta: f64,
    real_delta: f64,
    sim_elapsed: f64,
    real_elapsed: f64,
}

impl Clock {
    /// Create a clock at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next tick
    ///
    /// Negative or non-finite deltas are treated as zero.
    pub fn advance(&mut self, sim_delta: f64, real_delta: f64) {
        self.tick += 1;
        self.sim_delta = sanitize(sim_delta);
        self.real_delta = sanitize(real_delta);
        self.sim_elapsed += self.sim_delta;
        self.real_elapsed += self.real_delta;
    }

    /// Current tick number (0 before the first update)
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Simulated seconds covered by the current tick
    pub fn sim_delta(&self) -> f64 {
        self.sim_delta
    }

    /// Wall-clock seconds covered by the current tick
    pub fn real_delta(&self) -> f64 {
        self.real_delta
    }

    /// Total simulated seconds so far
    pub fn sim_elapsed(&self) -> f64 {
        self.sim_elapsed
    }

    /// Total wall-clock seconds so far
    pub fn real_elapsed(&self) -> f64 {
        self.real_elapsed
    }

    /// Whether simulated time stood still this tick
    pub fn is_paused(&self) -> bool {
        self.sim_delta == 0.0
    }
}

fn sanitize(delta: f64) -> f64 {
    if delta.is_finite() && delta > 0.0 {
        delta
    } else {
        0.0
    }
}
