//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (generation order, left to right)
//! - No rendering or platform dependencies

pub mod difficulty;
pub mod input;
pub mod player;
pub mod roof;
pub mod state;
pub mod tick;
pub mod trick;
pub mod world;

pub use difficulty::difficulty01;
pub use input::{Pulses, TickInput};
pub use player::{Landing, can_jump, start_dive, try_jump, update_dash, update_player};
pub use roof::{RoofStage, update_roofs};
pub use state::{
    DashState, DivePhase, Gate, LandingLabel, LandingQuality, MotionKind, Platform, Player,
    RunState, SpawnCursor, SpinState, TrickIntent, TrickKind,
};
pub use tick::{tick, tick_with_gates, update_speed};
pub use trick::{can_start_trick, grade_landing, try_start_trick, update_trick};
pub use world::{
    GateSpawnContext, GateSpawner, NoGates, reset_platforms, scroll_world, spawn_next_platform,
};
