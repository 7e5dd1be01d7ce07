//! Roof stress, collapse and motion
//!
//! Each roof is a small state machine: Stable → Cracking → Collapsing → Removed.
//! Only the roof under the player takes load. Once a roof collapses its motion
//! freezes and it free-falls until it is far below the viewport.

use super::difficulty::difficulty01;
use super::state::{MotionKind, Platform, RunState};
use crate::consts::*;
use crate::{clamp01, smoothstep};

/// Lifecycle stage of a roof, derived from its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoofStage {
    Stable,
    Cracking,
    Collapsing,
}

impl Platform {
    pub fn stage(&self) -> RoofStage {
        if self.collapsing {
            RoofStage::Collapsing
        } else if self.stress > 0.0 {
            RoofStage::Cracking
        } else {
            RoofStage::Stable
        }
    }

    /// Advance rise/crumble easing; returns true while the roof is still moving
    pub fn advance_motion(&mut self, dt: f32) -> bool {
        if self.collapsing || self.motion == MotionKind::None || self.motion_t >= 1.0 {
            return false;
        }

        self.motion_t = clamp01(self.motion_t + self.motion_rate * dt);
        let eased = self.base_y + self.target_offset * smoothstep(self.motion_t);
        let y = eased.clamp(ROOF_MIN_Y, ROOF_MAX_Y);
        if y != eased {
            // Pinned against the fairness band
            self.motion_t = 1.0;
        }
        self.pos.y = y;
        self.motion_t < 1.0
    }

    /// Switch to free fall
    fn begin_collapse(&mut self) {
        self.collapsing = true;
        self.fall_vy = 0.0;
        self.crack01 = 1.0;
        self.heavy_bumped = false;
    }
}

/// Update stress, collapse, falling and motion for every roof.
///
/// `burning` is true when the player is pressing down on the roof (diving or
/// holding dive while standing), which multiplies the stress rate.
pub fn update_roofs(state: &mut RunState, dt: f32, burning: bool) {
    let d = difficulty01(state.distance);
    let collapse_time = state.tuning.collapse_time(d);
    let bump = state.tuning.heavy_bump_fraction(d) * collapse_time;
    let stress_rate = state.tuning.roof_stress_per_sec
        * if burning || state.player.diving {
            state.tuning.roof_dive_stress_mult
        } else {
            1.0
        };
    let heavy_landing = state.heavy_landing_t > 0.0;
    let coyote_time = state.tuning.coyote_time_sec;
    let player = &mut state.player;

    for roof in &mut state.platforms {
        if roof.collapsing {
            roof.pos.y += roof.fall_vy * dt;
            roof.fall_vy += state.tuning.roof_fall_gravity * dt;
            continue;
        }

        let supported = player.is_supported_by(roof.id);
        if supported {
            roof.stress += stress_rate * dt;
            if heavy_landing && !roof.heavy_bumped {
                roof.stress += bump;
                roof.heavy_bumped = true;
            }
        }
        roof.crack01 = clamp01(roof.stress / collapse_time);

        if roof.stress >= collapse_time {
            roof.begin_collapse();
            log::debug!(
                "Roof {} collapsing (stress {:.2} >= {:.2})",
                roof.id,
                roof.stress,
                collapse_time
            );
            if supported {
                player.detach(coyote_time);
            }
            continue;
        }

        roof.advance_motion(dt);

        if supported {
            // The roof carries the player
            player.pos.y = roof.top() - player.size.y;
            player.vy = 0.0;
        }
    }

    let floor = INTERNAL_HEIGHT + ROOF_DESPAWN_BELOW;
    state
        .platforms
        .retain(|roof| !(roof.collapsing && roof.top() > floor));
}
