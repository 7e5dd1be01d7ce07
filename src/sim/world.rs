//! Procedural roof generation and world scrolling
//!
//! Roofs are generated left to right into a lookahead buffer past the right
//! edge of the viewport. Each tick only tops the buffer back up.

use rand::Rng;
use rand_pcg::Pcg32;

use super::difficulty::difficulty01;
use super::state::{Gate, MotionKind, Platform, RunState, SpawnCursor};
use crate::consts::*;

/// What a gate collaborator gets to work with when asked for a gate
pub struct GateSpawnContext<'a> {
    /// Current difficulty
    pub difficulty: f32,
    /// Suggested placement probability at this difficulty
    pub gate_chance: f32,
    /// Roofs in generation order; the last one is the newest
    pub platforms: &'a [Platform],
    pub gates: &'a mut Vec<Gate>,
    pub rng: &'a mut Pcg32,
    next_id: &'a mut u32,
}

impl<'a> GateSpawnContext<'a> {
    pub fn new(state: &'a mut RunState) -> Self {
        let difficulty = difficulty01(state.distance);
        Self {
            difficulty,
            gate_chance: state.tuning.gate_chance(difficulty),
            platforms: &state.platforms,
            gates: &mut state.gates,
            rng: &mut state.rng,
            next_id: &mut state.next_id,
        }
    }

    /// Allocate an id from the run's entity counter
    pub fn next_entity_id(&mut self) -> u32 {
        let id = *self.next_id;
        *self.next_id += 1;
        id
    }
}

/// Hook that may append gates while the world is generated
pub trait GateSpawner {
    fn spawn_gate(&mut self, ctx: &mut GateSpawnContext<'_>);
}

impl<F> GateSpawner for F
where
    F: FnMut(&mut GateSpawnContext<'_>),
{
    fn spawn_gate(&mut self, ctx: &mut GateSpawnContext<'_>) {
        self(ctx)
    }
}

/// Gate collaborator that never places anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGates;

impl GateSpawner for NoGates {
    fn spawn_gate(&mut self, _ctx: &mut GateSpawnContext<'_>) {}
}

/// Highest ladder index the generator may pick at difficulty `d`
fn max_level_index(d: f32, levels: usize) -> usize {
    let top = levels.saturating_sub(1);
    if d < 0.15 {
        0
    } else if d < 0.35 {
        top.min(1)
    } else {
        ((top as f32 * d).ceil() as usize).clamp(top.min(1), top)
    }
}

/// Append one roof after the generator cursor and return its id
pub fn spawn_next_platform(state: &mut RunState) -> u32 {
    let id = state.next_entity_id();
    let d = difficulty01(state.distance);
    let tuning = &state.tuning;
    let rng = &mut state.rng;

    let gap = rng.random_range(tuning.gap_min..=tuning.gap_max(d));
    let (width_lo, width_hi) = tuning.width_range(d);
    let width = rng.random_range(width_lo..=width_hi);

    let level = rng.random_range(0..=max_level_index(d, tuning.height_levels.len()));
    let max_step = tuning.max_step(d);
    let prev_y = state.cursor.base_y;
    let level_y = tuning
        .height_levels
        .get(level)
        .copied()
        .unwrap_or(prev_y);
    let y = level_y
        .clamp(prev_y - max_step, prev_y + max_step)
        .clamp(ROOF_MIN_Y, ROOF_MAX_Y);

    let x = state.cursor.right + gap;
    let mut platform = Platform::new(id, x, y, width);

    if rng.random::<f32>() < tuning.motion_chance(d) {
        let amplitude = tuning.motion_amplitude(d) * rng.random_range(0.6..=1.0);
        let (motion, offset) = if rng.random_bool(0.5) {
            (MotionKind::Rise, -amplitude)
        } else {
            (MotionKind::Crumble, amplitude)
        };
        platform.motion = motion;
        platform.target_offset = offset;
        platform.motion_rate = rng.random_range(tuning.motion_rate_min..=tuning.motion_rate_max);
    }

    log::debug!(
        "Spawned roof {} at x={:.0} y={:.0} w={:.0} gap={:.0} motion={:?} (d={:.2})",
        id,
        x,
        y,
        width,
        gap,
        platform.motion,
        d
    );

    state.cursor = SpawnCursor {
        right: platform.right(),
        base_y: platform.base_y,
    };
    state.platforms.push(platform);
    id
}

/// Lay out the opening stretch of a run
pub fn reset_platforms(state: &mut RunState, gates: &mut dyn GateSpawner) {
    state.platforms.clear();

    let id = state.next_entity_id();
    let start = Platform::new(id, START_PLATFORM_X, START_PLATFORM_Y, START_PLATFORM_W);
    state.cursor = SpawnCursor {
        right: start.right(),
        base_y: start.base_y,
    };
    state.platforms.push(start);

    while state.cursor.right <= INTERNAL_WIDTH + LOOKAHEAD {
        spawn_next_platform(state);
    }

    for _ in 0..RESET_GATE_ATTEMPTS {
        if state.gates.len() >= RESET_GATE_TARGET {
            break;
        }
        gates.spawn_gate(&mut GateSpawnContext::new(state));
    }
}

/// Move the world left by `speed * dt`, drop what fell off and refill the lookahead
pub fn scroll_world(state: &mut RunState, dt: f32, gates: &mut dyn GateSpawner) {
    let shift = state.speed * dt;

    for platform in &mut state.platforms {
        platform.pos.x -= shift;
    }
    for gate in &mut state.gates {
        gate.pos.x -= shift;
    }
    state.cursor.right -= shift;

    state.platforms.retain(|p| p.right() >= PLATFORM_DESPAWN_X);
    state.gates.retain(|g| g.right() >= GATE_DESPAWN_X);

    while state.cursor.right <= INTERNAL_WIDTH + LOOKAHEAD {
        spawn_next_platform(state);
        gates.spawn_gate(&mut GateSpawnContext::new(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn gate_at(ctx: &mut GateSpawnContext<'_>) {
        let Some(roof) = ctx.platforms.last() else {
            return;
        };
        let pos = Vec2::new(roof.left() + roof.size.x * 0.5, roof.top() - 140.0);
        let id = ctx.next_entity_id();
        ctx.gates.push(Gate {
            id,
            pos,
            size: Vec2::new(40.0, 100.0),
            required_kind: None,
            hit: false,
            missed: false,
        });
    }

    #[test]
    fn test_reset_fills_lookahead() {
        let state = RunState::new(1);
        assert!(!state.platforms.is_empty());
        assert!(state.rightmost_edge() >= INTERNAL_WIDTH + LOOKAHEAD);
        let start = &state.platforms[0];
        assert_eq!(start.motion, MotionKind::None);
        assert_eq!(start.size.x, START_PLATFORM_W);
    }

    #[test]
    fn test_early_roofs_use_lowest_level() {
        let state = RunState::new(3);
        let lowest = state.tuning.height_levels[0];
        for roof in state.platforms.iter().skip(1) {
            assert_eq!(roof.base_y, lowest);
            assert_eq!(roof.motion, MotionKind::None);
        }
    }

    #[test]
    fn test_empty_height_ladder_keeps_previous_level() {
        let mut state = RunState::new(3);
        state.tuning.height_levels.clear();
        let prev_y = state.cursor.base_y;
        let id = spawn_next_platform(&mut state);
        let roof = state.platform(id).expect("roof was spawned");
        assert_eq!(roof.base_y, prev_y);
    }

    #[test]
    fn test_reset_gate_attempts_are_bounded() {
        let mut calls = 0u32;
        let mut spawner = |_ctx: &mut GateSpawnContext<'_>| calls += 1;
        let mut state = RunState::new(5);
        state.reset_with_gates(5, &mut spawner);
        assert_eq!(calls, RESET_GATE_ATTEMPTS);
        assert!(state.gates.is_empty());
    }

    #[test]
    fn test_reset_stops_at_three_gates() {
        let mut calls = 0u32;
        let mut spawner = |ctx: &mut GateSpawnContext<'_>| {
            calls += 1;
            gate_at(ctx);
        };
        let mut state = RunState::new(5);
        state.reset_with_gates(5, &mut spawner);
        assert_eq!(calls, 3);
        assert_eq!(state.gates.len(), RESET_GATE_TARGET);
    }

    #[test]
    fn test_scroll_shifts_and_refills() {
        let mut state = RunState::new(11);
        let first_x = state.platforms[0].pos.x;
        let dt = 1.0 / 60.0;
        scroll_world(&mut state, dt, &mut NoGates);
        let expected = first_x - state.speed * dt;
        assert!((state.platforms[0].pos.x - expected).abs() < 1e-3);

        for _ in 0..600 {
            scroll_world(&mut state, dt, &mut NoGates);
            assert!(state.rightmost_edge() > INTERNAL_WIDTH + LOOKAHEAD);
            assert!(state.platforms.iter().all(|p| p.right() >= PLATFORM_DESPAWN_X));
        }
        // The start roof is long gone after ten seconds
        assert_ne!(state.platforms[0].size.x, START_PLATFORM_W);
    }

    #[test]
    fn test_scroll_drops_gates_past_left_edge() {
        let mut state = RunState::new(2);
        state.gates.push(Gate {
            id: 999,
            // Right edge -230, already past the despawn line
            pos: Vec2::new(-270.0, 200.0),
            size: Vec2::new(40.0, 100.0),
            required_kind: None,
            hit: false,
            missed: true,
        });
        state.gates.push(Gate {
            id: 1000,
            // Right edge -190, still on the keep side
            pos: Vec2::new(-230.0, 200.0),
            size: Vec2::new(40.0, 100.0),
            required_kind: None,
            hit: false,
            missed: false,
        });
        state.speed = 0.0;
        scroll_world(&mut state, 1.0 / 60.0, &mut NoGates);
        assert_eq!(state.gates.len(), 1);
        assert_eq!(state.gates[0].id, 1000);
    }

    #[test]
    fn test_scroll_offers_gate_per_new_roof() {
        let mut state = RunState::new(4);
        let mut offered = 0usize;
        let mut spawner = |_ctx: &mut GateSpawnContext<'_>| offered += 1;
        let mut spawned = 0usize;
        for _ in 0..120 {
            let ids_before = state.platforms.last().map(|p| p.id);
            scroll_world(&mut state, 1.0 / 60.0, &mut spawner);
            let ids_after = state.platforms.last().map(|p| p.id);
            if let (Some(a), Some(b)) = (ids_before, ids_after) {
                spawned += (b - a) as usize;
            }
        }
        assert!(spawned > 0);
        assert_eq!(offered, spawned);
    }

    proptest! {
        #[test]
        fn prop_generated_roofs_are_fair(seed in any::<u64>(), distance in 0.0f32..20_000.0) {
            let mut state = RunState::new(seed);
            state.distance = distance;
            let d = difficulty01(distance);
            let max_step = state.tuning.max_step(d);
            for _ in 0..40 {
                let prev = state.cursor;
                spawn_next_platform(&mut state);
                let roof = state.platforms.last().unwrap();
                let gap = roof.left() - prev.right;
                prop_assert!(gap >= state.tuning.gap_min - 0.05);
                prop_assert!(gap <= state.tuning.gap_max(d) + 0.05);
                prop_assert!((ROOF_MIN_Y..=ROOF_MAX_Y).contains(&roof.pos.y));
                prop_assert!((roof.base_y - prev.base_y).abs() <= max_step + 1e-3);
            }
        }

        #[test]
        fn prop_reset_invariants(seed in any::<u64>()) {
            let state = RunState::new(seed);
            prop_assert!(!state.platforms.is_empty());
            prop_assert!(state.rightmost_edge() >= INTERNAL_WIDTH + LOOKAHEAD);
        }
    }
}
