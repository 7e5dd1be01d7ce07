//! Fixed-timestep accumulator
//!
//! Hosts render at whatever rate they get; the simulation only ever sees
//! `SIM_DT` steps. Frame time is clamped and the number of catch-up ticks per
//! frame is bounded so a slow device degrades into slow motion instead of a
//! spiral of death.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone)]
pub struct FixedStepper {
    step: f32,
    max_substeps: u32,
    max_frame_dt: f32,
    accumulator: f32,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS, MAX_FRAME_DT)
    }
}

impl FixedStepper {
    pub fn new(step: f32, max_substeps: u32, max_frame_dt: f32) -> Self {
        Self {
            step,
            max_substeps: max_substeps.max(1),
            max_frame_dt,
            accumulator: 0.0,
        }
    }

    /// Feed one rendered frame's elapsed time and run the ticks it pays for.
    ///
    /// Returns the number of ticks run. Leftover time carries to the next
    /// frame; backlog beyond one frame's worth of substeps is dropped.
    pub fn advance(&mut self, frame_dt: f32, mut tick: impl FnMut(f32)) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.max_frame_dt)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            tick(self.step);
            self.accumulator -= self.step;
            substeps += 1;
        }

        let max_backlog = self.step * self.max_substeps as f32;
        if self.accumulator > max_backlog {
            log::debug!(
                "Dropping {:.3}s of simulation backlog",
                self.accumulator - max_backlog
            );
            self.accumulator = max_backlog;
        }

        substeps
    }

    /// Fraction of a step waiting in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}
