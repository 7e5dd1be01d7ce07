//! Rooftop Runner headless entry point
//!
//! Runs one seeded run under a simple autopilot, driven through the same
//! fixed-step accumulator a rendering host would use.
//!
//! Usage: `rooftop-runner [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
use rooftop_runner::sim::{RunState, TickInput, TrickIntent, can_start_trick, tick};
#[cfg(not(target_arch = "wasm32"))]
use rooftop_runner::{FixedStepper, Tuning};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use env_logger::Env;

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(raw) => raw.parse::<u64>().unwrap_or_else(|e| {
            log::warn!("Ignoring seed {raw:?}: {e}");
            0
        }),
        None => 0,
    };
    let tuning = args.next().map(|path| load_tuning(&path)).unwrap_or_default();

    log::info!("Rooftop Runner (headless) seed={seed}");
    let mut state = RunState::with_tuning(seed, tuning);
    let mut input = TickInput::default();
    let mut stepper = FixedStepper::default();

    // Host frames at 50 Hz so the accumulator carries remainders
    const FRAME_DT: f32 = 0.02;
    const MAX_FRAMES: u32 = 50 * 600;
    let mut frames = 0;
    let mut ticks = 0u64;
    let mut next_report = 1000.0;

    while state.running && frames < MAX_FRAMES {
        autopilot(&state, &mut input);
        ticks += u64::from(stepper.advance(FRAME_DT, |dt| tick(&mut state, &mut input, dt)));
        frames += 1;

        if state.distance >= next_report {
            log::info!(
                "distance={:.0} speed={:.0} roofs={}",
                state.distance,
                state.speed,
                state.platforms.len()
            );
            next_report += 1000.0;
        }
    }

    println!(
        "seed {seed}: {:.0} px in {:.1}s over {ticks} ticks ({})",
        state.distance,
        state.time,
        if state.game_over { "fell" } else { "time limit" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts link the library directly
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Tuning {
    let loaded = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("Loaded tuning from {path}");
            tuning
        }
        Err(e) => {
            log::warn!("Failed to load tuning from {path}: {e}, using defaults");
            Tuning::default()
        }
    }
}

/// Jump near roof edges, double jump when dropping past the launch height,
/// and throw a trick at the top of each arc.
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &RunState, input: &mut TickInput) {
    let player = &state.player;
    input.float_held = !player.on_ground && player.vy > 0.0;
    input.jump_held = !player.on_ground && player.vy < 0.0;

    if let Some(roof) = state.support_platform() {
        let runway = roof.right() - player.right();
        let warning = roof.crack01 > 0.85;
        if runway < state.speed * 0.12 || warning {
            input.press_jump();
        }
    } else if player.jumps_remaining == 1 && player.vy > 200.0 {
        let over_roof = state
            .platforms
            .iter()
            .any(|p| p.overlaps_x(player) && p.top() >= player.bottom());
        if !over_roof {
            input.press_jump();
        }
    } else if player.vy.abs() < 60.0 && can_start_trick(player) {
        input.press_trick(TrickIntent::Up);
    }
}
