//! Player controller
//!
//! Gravity with variable jump height, float, dive and dash, plus the swept
//! top-only landing test against roofs.

use super::input::TickInput;
use super::state::{DivePhase, LandingLabel, Platform, Player, RunState};
use super::trick::grade_landing;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{clamp01, lerp, smoothstep};

/// What happened when the player touched down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    pub platform_id: u32,
    /// The player was diving when they landed
    pub heavy: bool,
    pub label: Option<LandingLabel>,
}

/// Jump permission.
///
/// With both jumps available the player must be grounded or inside the coyote
/// or land-grace window. The second jump works anywhere.
pub fn can_jump(player: &Player) -> bool {
    match player.jumps_remaining {
        2 => player.on_ground || player.coyote_t > 0.0 || player.land_grace_t > 0.0,
        1 => true,
        _ => false,
    }
}

/// Jump if permitted; returns whether the jump happened
pub fn try_jump(player: &mut Player, tuning: &Tuning) -> bool {
    if !can_jump(player) {
        return false;
    }

    let impulse = if player.jumps_remaining == 2 {
        tuning.jump_velocity
    } else {
        tuning.double_jump_velocity
    };
    player.vy = -impulse;
    player.jumps_remaining -= 1;
    player.on_ground = false;
    player.support = None;
    player.coyote_t = 0.0;
    player.land_grace_t = 0.0;
    player.jump_cut = 0.0;
    player.diving = false;
    player.dive_phase = DivePhase::None;
    player.dive_t = 0.0;
    true
}

/// Latch a dive; only works in the air
pub fn start_dive(player: &mut Player, tuning: &Tuning) -> bool {
    if player.on_ground || player.diving {
        return false;
    }

    player.diving = true;
    player.dive_phase = DivePhase::Anticipate;
    player.dive_t = 0.0;
    player.spin.clear();
    player.vy = player.vy.max(tuning.dive_min_down_vy);
    true
}

/// Advance anticipate → commit, or clear the phase when not diving
fn update_dive_phase(player: &mut Player, tuning: &Tuning, dt: f32) {
    if !player.diving || player.on_ground {
        player.dive_phase = DivePhase::None;
        player.dive_t = 0.0;
        return;
    }

    player.dive_t += dt;
    if player.dive_phase == DivePhase::Anticipate && player.dive_t >= tuning.dive_anticipate_sec {
        player.dive_phase = DivePhase::Commit;
    }
}

/// Dash trigger and offset smoothing.
///
/// Faster falls give shorter dashes. The offset chases its target with
/// exponential smoothing but never moves more than `dash_max_step` per tick.
pub fn update_dash(player: &mut Player, tuning: &Tuning, dash_pressed: bool, dt: f32) {
    let airborne = !player.on_ground;
    let fall_speed = player.vy.max(0.0);
    let dash = &mut player.dash;

    if dash_pressed && airborne && dash.cooldown <= 0.0 {
        let scale =
            (1.0 - fall_speed / tuning.dash_fall_speed_ref).clamp(tuning.dash_min_scale, 1.0);
        dash.target = tuning.dash_distance * scale;
        dash.cooldown = tuning.dash_cooldown_sec;
        dash.impulse_t = tuning.dash_impulse_sec;
    }

    if !airborne {
        dash.target = (dash.target - tuning.dash_return_per_sec * dt).max(0.0);
    }

    let smoothing = 1.0 - (-tuning.dash_smooth * dt).exp();
    let step = ((dash.target - dash.offset) * smoothing)
        .clamp(-tuning.dash_max_step, tuning.dash_max_step);
    dash.offset += step;
    dash.offset_vel = if dt > 0.0 { step / dt } else { 0.0 };

    player.pos.x = PLAYER_X + dash.offset;
}

/// Effective gravity and fall-speed cap for this tick
fn gravity_for(
    player: &mut Player,
    tuning: &Tuning,
    float_held: bool,
    jump_held: bool,
    dt: f32,
) -> (f32, f32) {
    let mut gravity = tuning.gravity;
    let mut max_fall = tuning.max_fall_speed;

    if player.vy > 0.0 {
        player.jump_cut = 0.0;
        gravity *= tuning.fall_gravity_mult;
    } else if player.vy < 0.0 {
        if jump_held {
            player.jump_cut = 0.0;
        } else {
            player.jump_cut = (player.jump_cut + tuning.jump_cut_ramp_per_sec * dt).min(1.0);
        }
        gravity *= 1.0 + (tuning.jump_cut_max - 1.0) * player.jump_cut;
    }

    if float_held && !player.diving && player.float_fuel > 0.0 {
        let dash_share = clamp01(player.dash.offset.abs() / tuning.dash_distance);
        let float_mult =
            (tuning.float_gravity_mult + tuning.float_dash_penalty * dash_share).min(1.0);
        gravity *= float_mult;
        player.float_fuel = (player.float_fuel - dt).max(0.0);
    }

    if player.diving {
        let blend = match player.dive_phase {
            DivePhase::Anticipate => smoothstep(player.dive_t / tuning.dive_anticipate_sec),
            _ => 1.0,
        };
        gravity *= lerp(1.0, tuning.dive_gravity_mult, blend);
        max_fall = lerp(max_fall, tuning.dive_max_fall_speed, blend);
    }

    (gravity, max_fall)
}

/// First roof in generation order whose top the player's feet crossed
fn find_landing<'a>(
    platforms: &'a [Platform],
    player: &Player,
    prev_bottom: f32,
) -> Option<&'a Platform> {
    let bottom = player.bottom();
    platforms.iter().find(|p| {
        !p.collapsing && p.overlaps_x(player) && prev_bottom <= p.top() && bottom >= p.top()
    })
}

/// Snap onto `platform` and reset air state
fn land(player: &mut Player, platform: &Platform, tuning: &Tuning) -> Landing {
    let heavy = player.diving;
    let label = grade_landing(player, tuning);

    player.place_on(platform);
    player.jumps_remaining = 2;
    player.coyote_t = tuning.coyote_time_sec;
    player.land_grace_t = tuning.land_grace_sec;
    player.jump_cut = 0.0;
    player.diving = false;
    player.dive_phase = DivePhase::None;
    player.dive_t = 0.0;
    player.spin.clear();
    player.float_fuel = player.float_fuel_max;

    Landing {
        platform_id: platform.id,
        heavy,
        label,
    }
}

/// Integrate the player for one tick; returns the landing, if any
pub fn update_player(state: &mut RunState, input: &TickInput, dt: f32) -> Option<Landing> {
    let tuning = &state.tuning;
    let player = &mut state.player;

    update_dash(player, tuning, input.dash_pressed, dt);
    update_dive_phase(player, tuning, dt);

    if player.on_ground {
        let support = player
            .support
            .and_then(|id| state.platforms.iter().find(|p| p.id == id))
            .filter(|p| !p.collapsing && p.overlaps_x(player));
        match support {
            Some(roof) => {
                player.pos.y = roof.top() - player.size.y;
                player.vy = 0.0;
                player.coyote_t = tuning.coyote_time_sec;
            }
            // Walked off the edge
            None => player.detach(tuning.coyote_time_sec),
        }
    }

    let mut landing = None;
    if player.on_ground {
        player.float_fuel =
            (player.float_fuel + tuning.float_regen_per_sec * dt).min(player.float_fuel_max);
    } else {
        let (gravity, max_fall) =
            gravity_for(player, tuning, input.float_held, input.jump_held, dt);
        let prev_bottom = player.bottom();
        player.vy = (player.vy + gravity * dt).min(max_fall);
        player.pos.y += player.vy * dt;

        if player.vy >= 0.0 {
            if let Some(roof) = find_landing(&state.platforms, player, prev_bottom) {
                landing = Some(land(player, roof, tuning));
            }
        }
    }

    if let Some(landed) = landing {
        if landed.heavy {
            state.heavy_landing_t = state.tuning.heavy_landing_sec;
        }
        if let Some(label) = landed.label {
            state.landing_label = Some(label);
            state.landing_label_t = state.tuning.landing_label_sec;
        }
        log::debug!(
            "Landed on roof {} (heavy={}, label={:?})",
            landed.platform_id,
            landed.heavy,
            landed.label.map(|l| l.quality)
        );
    }

    if state.player.bottom() >= GROUND_Y {
        state.end_run();
    }

    landing
}
