//! Fixed-timestep accumulator.
//!
//! Frame time is added to an accumulator and consumed in whole fixed steps, so the physics
//! world always advances in identical increments no matter how fast frames arrive. A slow frame
//! runs several steps back to back; a pathologically slow one is capped at `max_steps` and the
//! rest of its time is dropped.

use std::time::Duration;

use log::warn;

use crate::constants::{FIXED_STEP, MAX_CATCH_UP_STEPS};

/// What one frame's worth of accumulation did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameSteps {
    /// Steps executed this frame.
    pub steps: u32,
    /// Simulated time discarded by the catch-up clamp.
    pub dropped: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationClock {
    accumulated: Duration,
    fixed_step: Duration,
    max_steps: u32,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(FIXED_STEP, MAX_CATCH_UP_STEPS)
    }
}

impl SimulationClock {
    /// # Panics
    /// If `fixed_step` is zero or `max_steps` is zero.
    pub fn new(fixed_step: Duration, max_steps: u32) -> Self {
        assert!(!fixed_step.is_zero(), "fixed step must be non-zero");
        assert!(max_steps > 0, "at least one catch-up step is required");
        Self {
            accumulated: Duration::ZERO,
            fixed_step,
            max_steps,
        }
    }

    pub fn fixed_step(&self) -> Duration {
        self.fixed_step
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Time carried over to the next frame. Always `< fixed_step` between frames.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Account for `frame` of elapsed time, calling `step` once per consumed fixed step.
    pub fn advance(&mut self, frame: Duration, mut step: impl FnMut(Duration)) -> FrameSteps {
        self.accumulated += frame;

        let mut steps = 0;
        while self.accumulated >= self.fixed_step && steps < self.max_steps {
            step(self.fixed_step);
            self.accumulated -= self.fixed_step;
            steps += 1;
        }

        let mut dropped = Duration::ZERO;
        if self.accumulated >= self.fixed_step {
            let remainder = Duration::from_nanos(
                (self.accumulated.as_nanos() % self.fixed_step.as_nanos()) as u64,
            );
            dropped = self.accumulated - remainder;
            self.accumulated = remainder;
            warn!(
                "frame needed more than {} steps; dropped {:?} of simulated time",
                self.max_steps, dropped
            );
        }

        FrameSteps { steps, dropped }
    }
}
