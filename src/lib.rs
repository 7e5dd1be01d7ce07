//! Rooftop Runner - simulation core of a side-scrolling rooftop runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, roofs, tricks, world generation)
//! - `tuning`: Data-driven game balance
//! - `driver`: Fixed-timestep accumulator for hosts that render at a variable rate

pub mod driver;
pub mod sim;
pub mod tuning;

pub use driver::FixedStepper;
pub use tuning::Tuning;

/// Fixed world constants shared with render collaborators
pub mod consts {
    /// Fixed simulation timestep (tunables assume 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Longest frame the driver will try to catch up on (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Internal resolution
    pub const INTERNAL_WIDTH: f32 = 960.0;
    pub const INTERNAL_HEIGHT: f32 = 540.0;

    /// Lethal line: the run ends when the player's feet reach it
    pub const GROUND_Y: f32 = 500.0;
    /// Roof slab thickness
    pub const PLATFORM_THICKNESS: f32 = 24.0;

    /// Fairness band for non-collapsing roof tops
    pub const ROOF_MIN_Y: f32 = 160.0;
    pub const ROOF_MAX_Y: f32 = GROUND_Y - 40.0;

    /// World is generated this far past the right edge of the viewport
    pub const LOOKAHEAD: f32 = 600.0;
    /// Platforms are dropped once their right edge is left of this
    pub const PLATFORM_DESPAWN_X: f32 = -200.0;
    /// Gates are dropped once their right edge is left of this
    pub const GATE_DESPAWN_X: f32 = -220.0;
    /// Collapsing roofs are dropped once their top is this far below the viewport
    pub const ROOF_DESPAWN_BELOW: f32 = 200.0;
    /// Width given to a roof whose width became non-finite
    pub const FALLBACK_PLATFORM_W: f32 = 150.0;

    /// Player anchor and hitbox
    pub const PLAYER_X: f32 = 180.0;
    pub const PLAYER_W: f32 = 28.0;
    pub const PLAYER_H: f32 = 40.0;

    /// Starting roof
    pub const START_PLATFORM_X: f32 = -60.0;
    pub const START_PLATFORM_W: f32 = 900.0;
    pub const START_PLATFORM_Y: f32 = 400.0;

    /// Distance at which difficulty saturates
    pub const DIFFICULTY_DISTANCE: f32 = 10_000.0;

    /// Gate collaborator budget during reset
    pub const RESET_GATE_ATTEMPTS: u32 = 20;
    pub const RESET_GATE_TARGET: usize = 3;
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Hermite ease on [0, 1]
#[inline]
pub fn smoothstep(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}
