//! Fixed-step clock
//!
//! Turns display-frame timestamps into a whole number of fixed simulation
//! steps, carrying the remainder forward in an accumulator.

use crate::consts::{MAX_FRAME_DELTA_MS, SIM_STEP_MS};

#[derive(Debug, Clone)]
pub struct ClockScheduler {
    step_ms: f64,
    max_delta_ms: f64,
    accumulator: f64,
    previous: Option<f64>,
}

impl Default for ClockScheduler {
    fn default() -> Self {
        Self::new(SIM_STEP_MS, MAX_FRAME_DELTA_MS)
    }
}

impl ClockScheduler {
    pub fn new(step_ms: f64, max_delta_ms: f64) -> Self {
        Self {
            step_ms,
            max_delta_ms,
            accumulator: 0.0,
            previous: None,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Unconsumed time carried to the next frame
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Forget the previous timestamp; the next `advance` only seeds
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.previous = None;
    }

    /// Feed a frame timestamp (ms) and get the number of fixed steps to run
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(previous) = self.previous else {
            if now_ms.is_finite() {
                self.previous = Some(now_ms);
            }
            return 0;
        };

        if !now_ms.is_finite() || self.step_ms <= 0.0 {
            return 0;
        }
        self.previous = Some(now_ms.max(previous));

        // Backwards timestamps count as zero elapsed time
        let elapsed = (now_ms - previous).clamp(0.0, self.max_delta_ms);
        self.accumulator += elapsed;

        let steps = (self.accumulator / self.step_ms).floor();
        self.accumulator -= steps * self.step_ms;
        steps as u32
    }
}
