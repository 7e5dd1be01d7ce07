//! Difficulty curve
//!
//! One distance-derived knob in [0, 1] drives every generator and roof tunable.

use crate::consts::DIFFICULTY_DISTANCE;

/// Difficulty at a given run distance
#[inline]
pub fn difficulty01(distance: f32) -> f32 {
    (distance / DIFFICULTY_DISTANCE).clamp(0.0, 1.0)
}
