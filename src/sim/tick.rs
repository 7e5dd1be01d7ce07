//! Fixed timestep simulation tick
//!
//! Composes every subsystem in a fixed order. Constants assume a 1/60 s step;
//! `dt` is not used to re-derive them.

use super::input::TickInput;
use super::player::{start_dive, try_jump, update_player};
use super::roof::update_roofs;
use super::state::RunState;
use super::trick::{try_start_trick, update_trick};
use super::world::{GateSpawner, NoGates, scroll_world};

/// Advance the run by one fixed timestep
pub fn tick(state: &mut RunState, input: &mut TickInput, dt: f32) {
    tick_with_gates(state, input, dt, &mut NoGates);
}

/// Advance the run by one fixed timestep, letting `gates` place gates as roofs spawn
pub fn tick_with_gates(
    state: &mut RunState,
    input: &mut TickInput,
    dt: f32,
    gates: &mut dyn GateSpawner,
) {
    if !dt.is_finite() || dt <= 0.0 {
        log::warn!("Ignoring tick with invalid dt {}", dt);
        return;
    }

    state.sanitize();
    state.time += dt;

    // Presses made while the run is stopped never carry into the next run
    if !state.running || state.game_over {
        input.take_jump();
        input.take_dive();
        input.take_trick();
        return;
    }

    state.anim_time += dt;
    decay_timers(state, dt);

    if input.take_jump() {
        state.jump_buffer_t = state.tuning.jump_buffer_sec;
        try_buffered_jump(state);
    }
    if input.take_dive() {
        start_dive(&mut state.player, &state.tuning);
    }
    if let Some(intent) = input.take_trick() {
        try_start_trick(&mut state.player, intent);
    }

    update_speed(state, dt);
    state.distance += state.speed * dt;

    scroll_world(state, dt, gates);
    let burning = input.dive_held && state.player.on_ground;
    update_roofs(state, dt, burning);
    update_trick(&mut state.player, &state.tuning, dt);
    update_player(state, input, dt);

    if state.game_over {
        return;
    }

    // Coyote or land grace may have opened up since the press
    try_buffered_jump(state);
}

/// Count every window timer down toward zero
fn decay_timers(state: &mut RunState, dt: f32) {
    let decay = |t: &mut f32| *t = (*t - dt).max(0.0);

    decay(&mut state.jump_buffer_t);
    decay(&mut state.heavy_landing_t);
    decay(&mut state.landing_label_t);
    if state.landing_label_t <= 0.0 {
        state.landing_label = None;
    }

    let player = &mut state.player;
    decay(&mut player.coyote_t);
    decay(&mut player.land_grace_t);
    decay(&mut player.spin.cooldown);
    decay(&mut player.dash.cooldown);
    decay(&mut player.dash.impulse_t);
}

/// Spend the jump buffer if a jump is currently allowed
fn try_buffered_jump(state: &mut RunState) -> bool {
    if state.jump_buffer_t <= 0.0 {
        return false;
    }
    if try_jump(&mut state.player, &state.tuning) {
        state.jump_buffer_t = 0.0;
        return true;
    }
    false
}

/// Ease the scroll speed toward the time-ramped target
pub fn update_speed(state: &mut RunState, dt: f32) {
    let tuning = &state.tuning;
    let target = (tuning.speed_start + tuning.speed_ramp_per_sec * state.anim_time)
        .clamp(tuning.speed_start, tuning.speed_max);
    let smoothing = 1.0 - (-tuning.speed_smooth * dt).exp();
    state.speed += (target - state.speed) * smoothing;
}
