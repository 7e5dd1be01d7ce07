//! Run state and core simulation types
//!
//! `RunState` is the single owned aggregate every update function threads
//! through. Renderers read it between ticks and never write to it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Dive sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DivePhase {
    #[default]
    None,
    /// Brief windup while dive gravity blends in
    Anticipate,
    /// Full dive gravity and fall speed
    Commit,
}

/// Directional intent attached to a trick press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrickIntent {
    #[default]
    Neutral,
    Up,
    Down,
    Left,
    Right,
}

/// Trick performed while spinning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrickKind {
    Spin,
    BackFlip,
    FrontFlip,
}

/// Landing grade for the trick performed during the last airtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LandingQuality {
    Sloppy,
    Clean,
    Perfect,
}

/// One-shot landing label, shown until its timer runs out
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandingLabel {
    pub quality: LandingQuality,
    pub kind: Option<TrickKind>,
    pub intent: TrickIntent,
    /// Spin progress at touchdown
    pub spin_prog: f32,
}

/// Roof motion assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionKind {
    #[default]
    None,
    /// Eases upward to `base_y + target_offset` (offset < 0)
    Rise,
    /// Sags downward to `base_y + target_offset` (offset > 0)
    Crumble,
}

/// Spin/trick state carried by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinState {
    pub spinning: bool,
    /// Seconds since the current spin started
    pub t: f32,
    /// 0..1, retained after the spin ends until landing or the next spin
    pub prog: f32,
    /// +1 or -1
    pub dir: f32,
    pub cooldown: f32,
    pub kind: Option<TrickKind>,
    pub intent: TrickIntent,
}

impl Default for SpinState {
    fn default() -> Self {
        Self {
            spinning: false,
            t: 0.0,
            prog: 0.0,
            dir: 1.0,
            cooldown: 0.0,
            kind: None,
            intent: TrickIntent::Neutral,
        }
    }
}

impl SpinState {
    /// Drop the current trick and its progress; cooldown and direction survive
    pub fn clear(&mut self) {
        self.spinning = false;
        self.t = 0.0;
        self.prog = 0.0;
        self.kind = None;
        self.intent = TrickIntent::Neutral;
    }
}

/// Horizontal dash state (offset from the player anchor)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashState {
    pub cooldown: f32,
    pub offset: f32,
    pub target: f32,
    pub offset_vel: f32,
    /// Remaining impulse time, read by camera/cosmetics
    pub impulse_t: f32,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical velocity, positive is down
    pub vy: f32,
    pub on_ground: bool,
    /// Id of the supporting platform (non-owning)
    pub support: Option<u32>,
    /// 0, 1 or 2
    pub jumps_remaining: u8,
    pub coyote_t: f32,
    pub land_grace_t: f32,
    /// 0..1, how far the early-release gravity ramp has progressed
    pub jump_cut: f32,
    pub float_fuel: f32,
    pub float_fuel_max: f32,
    pub diving: bool,
    pub dive_phase: DivePhase,
    pub dive_t: f32,
    pub spin: SpinState,
    pub dash: DashState,
}

impl Player {
    pub fn new(float_fuel_max: f32) -> Self {
        Self {
            pos: Vec2::new(PLAYER_X, START_PLATFORM_Y - PLAYER_H),
            size: Vec2::new(PLAYER_W, PLAYER_H),
            vy: 0.0,
            on_ground: false,
            support: None,
            jumps_remaining: 2,
            coyote_t: 0.0,
            land_grace_t: 0.0,
            jump_cut: 0.0,
            float_fuel: float_fuel_max,
            float_fuel_max,
            diving: false,
            dive_phase: DivePhase::None,
            dive_t: 0.0,
            spin: SpinState::default(),
            dash: DashState::default(),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Stand on `platform` without going through the landing path
    pub fn place_on(&mut self, platform: &Platform) {
        self.pos.y = platform.top() - self.size.y;
        self.vy = 0.0;
        self.on_ground = true;
        self.support = Some(platform.id);
    }

    /// Stop being supported by anything
    pub fn detach(&mut self, coyote_time: f32) {
        self.on_ground = false;
        self.support = None;
        self.coyote_t = coyote_time;
    }

    /// Whether the player is standing on the platform with `id`
    #[inline]
    pub fn is_supported_by(&self, id: u32) -> bool {
        self.on_ground && self.support == Some(id)
    }

    /// Repair non-finite fields and out-of-range counters.
    ///
    /// Defaults: position falls back to the anchor on the start roof height,
    /// velocities and timers to 0, fuel to 0, spin direction to +1.
    /// Returns true if anything was repaired.
    pub fn sanitize(&mut self) -> bool {
        let mut repaired = false;
        let mut fix = |value: &mut f32, default: f32| {
            if !value.is_finite() {
                *value = default;
                repaired = true;
            }
        };

        fix(&mut self.pos.x, PLAYER_X);
        fix(&mut self.pos.y, START_PLATFORM_Y - PLAYER_H);
        fix(&mut self.size.x, PLAYER_W);
        fix(&mut self.size.y, PLAYER_H);
        fix(&mut self.vy, 0.0);
        fix(&mut self.coyote_t, 0.0);
        fix(&mut self.land_grace_t, 0.0);
        fix(&mut self.jump_cut, 0.0);
        fix(&mut self.float_fuel_max, 0.0);
        fix(&mut self.float_fuel, 0.0);
        fix(&mut self.dive_t, 0.0);
        fix(&mut self.spin.t, 0.0);
        fix(&mut self.spin.prog, 0.0);
        fix(&mut self.spin.dir, 1.0);
        fix(&mut self.spin.cooldown, 0.0);
        fix(&mut self.dash.cooldown, 0.0);
        fix(&mut self.dash.offset, 0.0);
        fix(&mut self.dash.target, 0.0);
        fix(&mut self.dash.offset_vel, 0.0);
        fix(&mut self.dash.impulse_t, 0.0);

        if self.jumps_remaining > 2 {
            self.jumps_remaining = 2;
            repaired = true;
        }
        self.float_fuel_max = self.float_fuel_max.max(0.0);
        self.float_fuel = self.float_fuel.clamp(0.0, self.float_fuel_max);
        self.jump_cut = self.jump_cut.clamp(0.0, 1.0);
        self.spin.prog = self.spin.prog.clamp(0.0, 1.0);
        if self.diving && self.spin.spinning {
            self.spin.clear();
            repaired = true;
        }

        repaired
    }
}

/// A roof
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Reference Y for motion easing
    pub base_y: f32,
    pub motion: MotionKind,
    /// 0..1
    pub motion_t: f32,
    pub motion_rate: f32,
    pub target_offset: f32,
    /// Seconds of load accumulated
    pub stress: f32,
    /// 0..1 damage fraction derived from stress
    pub crack01: f32,
    pub collapsing: bool,
    /// Fall speed, only meaningful while collapsing
    pub fall_vy: f32,
    /// Whether a heavy landing already bumped this roof
    pub heavy_bumped: bool,
}

impl Platform {
    /// A static roof with clean stress bookkeeping
    pub fn new(id: u32, x: f32, y: f32, w: f32) -> Self {
        Self {
            id,
            pos: Vec2::new(x, y),
            size: Vec2::new(w, PLATFORM_THICKNESS),
            base_y: y,
            motion: MotionKind::None,
            motion_t: 0.0,
            motion_rate: 0.0,
            target_offset: 0.0,
            stress: 0.0,
            crack01: 0.0,
            collapsing: false,
            fall_vy: 0.0,
            heavy_bumped: false,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    /// Horizontal overlap with the player's hitbox
    #[inline]
    pub fn overlaps_x(&self, player: &Player) -> bool {
        player.left() < self.right() && player.right() > self.left()
    }

    /// Repair non-finite fields; returns true if anything changed.
    ///
    /// A roof that lost its horizontal position is moved past the despawn line
    /// so the next scroll retires it.
    pub fn sanitize(&mut self) -> bool {
        let mut repaired = false;
        let base_y = if self.base_y.is_finite() {
            self.base_y
        } else {
            START_PLATFORM_Y
        };
        let width = if self.size.x.is_finite() && self.size.x > 0.0 {
            self.size.x
        } else {
            FALLBACK_PLATFORM_W
        };
        let mut fix = |value: &mut f32, default: f32| {
            if !value.is_finite() {
                *value = default;
                repaired = true;
            }
        };

        fix(&mut self.size.x, width);
        fix(&mut self.pos.x, PLATFORM_DESPAWN_X - width - 1.0);
        fix(&mut self.base_y, START_PLATFORM_Y);
        fix(&mut self.pos.y, base_y);
        fix(&mut self.size.y, PLATFORM_THICKNESS);
        fix(&mut self.motion_t, 1.0);
        fix(&mut self.motion_rate, 0.0);
        fix(&mut self.target_offset, 0.0);
        fix(&mut self.stress, 0.0);
        fix(&mut self.crack01, 0.0);
        fix(&mut self.fall_vy, 0.0);

        repaired
    }
}

/// A trick gate. Placement and hit detection belong to the gate collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub required_kind: Option<TrickKind>,
    pub hit: bool,
    pub missed: bool,
}

impl Gate {
    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// Where the generator places the next roof
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpawnCursor {
    /// Right edge of the most recently spawned roof
    pub right: f32,
    /// Baseline of the most recently spawned roof
    pub base_y: f32,
}

/// Complete run state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct RunState {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub running: bool,
    pub game_over: bool,
    /// Simulation seconds since reset
    pub time: f32,
    /// Seconds the run has been live; pauses when not running
    pub anim_time: f32,
    pub distance: f32,
    pub speed: f32,
    pub jump_buffer_t: f32,
    pub landing_label: Option<LandingLabel>,
    pub landing_label_t: f32,
    pub heavy_landing_t: f32,
    /// Roofs in generation order (left to right)
    pub platforms: Vec<Platform>,
    /// Gates in generation order, owned by the gate collaborator's layout
    pub gates: Vec<Gate>,
    pub player: Player,
    pub cursor: SpawnCursor,
    pub(crate) next_id: u32,
}

impl RunState {
    /// Create a run with the default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = tuning.sanitized();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(tuning.float_fuel_max),
            tuning,
            running: false,
            game_over: false,
            time: 0.0,
            anim_time: 0.0,
            distance: 0.0,
            speed: 0.0,
            jump_buffer_t: 0.0,
            landing_label: None,
            landing_label_t: 0.0,
            heavy_landing_t: 0.0,
            platforms: Vec::new(),
            gates: Vec::new(),
            cursor: SpawnCursor::default(),
            next_id: 1,
        };
        state.reset(seed);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start a fresh run without a gate collaborator
    pub fn reset(&mut self, seed: u64) {
        self.reset_with_gates(seed, &mut super::world::NoGates);
    }

    /// Start a fresh run, letting `gates` seed the initial gate layout
    pub fn reset_with_gates(&mut self, seed: u64, gates: &mut dyn super::world::GateSpawner) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.running = true;
        self.game_over = false;
        self.time = 0.0;
        self.anim_time = 0.0;
        self.distance = 0.0;
        self.speed = self.tuning.speed_start;
        self.jump_buffer_t = 0.0;
        self.landing_label = None;
        self.landing_label_t = 0.0;
        self.heavy_landing_t = 0.0;
        self.next_id = 1;
        self.player = Player::new(self.tuning.float_fuel_max);
        self.gates.clear();

        super::world::reset_platforms(self, gates);

        if let Some(start) = self.platforms.first() {
            self.player.place_on(start);
            self.player.jumps_remaining = 2;
            self.player.coyote_t = self.tuning.coyote_time_sec;
        }

        log::info!(
            "Run reset: seed={}, platforms={}, gates={}",
            seed,
            self.platforms.len(),
            self.gates.len()
        );
    }

    /// Platform with the given id
    pub fn platform(&self, id: u32) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    /// The roof currently under the player's feet
    pub fn support_platform(&self) -> Option<&Platform> {
        if !self.player.on_ground {
            return None;
        }
        self.player.support.and_then(|id| self.platform(id))
    }

    /// Right edge of the world generated so far
    pub fn rightmost_edge(&self) -> f32 {
        self.platforms
            .iter()
            .map(Platform::right)
            .fold(self.cursor.right, f32::max)
    }

    /// End the run
    pub fn end_run(&mut self) {
        if !self.game_over {
            log::info!(
                "Game over: distance={:.0}, time={:.2}s",
                self.distance,
                self.anim_time
            );
        }
        self.game_over = true;
        self.running = false;
    }

    /// Per-tick numeric hygiene over the whole run.
    ///
    /// Defaults: speed falls back to `speed_start`, distance and timers to 0,
    /// a lost generator cursor to the last roof (or the start roof layout).
    /// Gates with non-finite geometry are dropped. Returns true if anything
    /// was repaired.
    pub fn sanitize(&mut self) -> bool {
        let mut repaired = false;
        let speed_start = self.tuning.speed_start;
        let mut fix = |value: &mut f32, default: f32| {
            if !value.is_finite() || *value < 0.0 {
                *value = default;
                repaired = true;
            }
        };

        fix(&mut self.speed, speed_start);
        fix(&mut self.distance, 0.0);
        fix(&mut self.time, 0.0);
        fix(&mut self.anim_time, 0.0);
        fix(&mut self.jump_buffer_t, 0.0);
        fix(&mut self.heavy_landing_t, 0.0);
        fix(&mut self.landing_label_t, 0.0);

        if self.player.sanitize() {
            log::warn!("Player had non-finite fields, repaired");
            repaired = true;
        }

        for roof in &mut self.platforms {
            if roof.sanitize() {
                log::warn!("Roof {} had non-finite fields, repaired", roof.id);
                repaired = true;
            }
        }

        let gates = self.gates.len();
        self.gates.retain(|g| g.pos.is_finite() && g.size.is_finite());
        if self.gates.len() != gates {
            log::warn!("Dropped {} gates with non-finite geometry", gates - self.gates.len());
            repaired = true;
        }

        if !self.cursor.right.is_finite() || !self.cursor.base_y.is_finite() {
            self.cursor = match self.platforms.last() {
                Some(last) => SpawnCursor {
                    right: last.right(),
                    base_y: last.base_y,
                },
                None => SpawnCursor {
                    right: START_PLATFORM_X + START_PLATFORM_W,
                    base_y: START_PLATFORM_Y,
                },
            };
            log::warn!("Spawn cursor was non-finite, re-derived");
            repaired = true;
        }

        repaired
    }
}
