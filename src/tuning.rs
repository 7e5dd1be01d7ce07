//! Gameplay tunables
//!
//! Every number the simulation was balanced against lives here, so a host can
//! ship an alternate balance table as JSON. Values assume a 60 Hz tick.

use serde::{Deserialize, Serialize};

use crate::lerp;

/// Gameplay balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scroll speed ===
    /// Initial scroll speed (px/s)
    pub speed_start: f32,
    /// Scroll speed cap (px/s)
    pub speed_max: f32,
    /// Target speed gain per second of animation time
    pub speed_ramp_per_sec: f32,
    /// Exponential smoothing rate toward the target speed
    pub speed_smooth: f32,

    // === Gravity and jumping ===
    pub gravity: f32,
    /// Gravity multiplier while falling
    pub fall_gravity_mult: f32,
    /// Gravity multiplier cap once the jump-cut ramp is full
    pub jump_cut_max: f32,
    /// Jump-cut ramp gain per second after jump is released
    pub jump_cut_ramp_per_sec: f32,
    pub max_fall_speed: f32,
    pub jump_velocity: f32,
    pub double_jump_velocity: f32,
    pub coyote_time_sec: f32,
    pub jump_buffer_sec: f32,
    pub land_grace_sec: f32,

    // === Float ===
    /// Gravity multiplier while floating (< 1)
    pub float_gravity_mult: f32,
    pub float_fuel_max: f32,
    pub float_regen_per_sec: f32,
    /// Extra float gravity multiplier at a full dash offset
    pub float_dash_penalty: f32,

    // === Dive ===
    pub dive_gravity_mult: f32,
    pub dive_max_fall_speed: f32,
    pub dive_anticipate_sec: f32,
    /// Downward speed forced on dive start
    pub dive_min_down_vy: f32,

    // === Dash ===
    pub dash_cooldown_sec: f32,
    pub dash_distance: f32,
    /// Smallest dash scale reached at high fall speed
    pub dash_min_scale: f32,
    /// Fall speed at which the dash scale bottoms out
    pub dash_fall_speed_ref: f32,
    pub dash_smooth: f32,
    /// Largest offset change per tick
    pub dash_max_step: f32,
    /// Rate at which the dash target returns to zero once grounded (px/s)
    pub dash_return_per_sec: f32,
    pub dash_impulse_sec: f32,

    // === Tricks ===
    pub spin_duration_sec: f32,
    pub spin_cooldown_sec: f32,
    pub clean_landing_prog: f32,
    pub perfect_landing_prog: f32,
    pub landing_label_sec: f32,

    // === Generator ===
    pub gap_min: f32,
    pub gap_max_easy: f32,
    pub gap_max_hard: f32,
    pub width_min_easy: f32,
    pub width_min_hard: f32,
    pub width_max_easy: f32,
    pub width_max_hard: f32,
    /// Roof top heights, lowest (closest to the ground) first
    pub height_levels: Vec<f32>,
    pub max_step_easy: f32,
    pub max_step_hard: f32,
    pub motion_chance_easy: f32,
    pub motion_chance_hard: f32,
    pub motion_amp_easy: f32,
    pub motion_amp_hard: f32,
    pub motion_rate_min: f32,
    pub motion_rate_max: f32,
    pub gate_chance_easy: f32,
    pub gate_chance_hard: f32,

    // === Roof stress ===
    pub roof_collapse_time_easy: f32,
    pub roof_collapse_time_hard: f32,
    /// Stress per second while supporting the player
    pub roof_stress_per_sec: f32,
    pub roof_dive_stress_mult: f32,
    /// Fraction of the collapse budget added by a heavy landing
    pub heavy_bump_easy: f32,
    pub heavy_bump_hard: f32,
    pub heavy_landing_sec: f32,
    pub roof_fall_gravity: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed_start: 320.0,
            speed_max: 620.0,
            speed_ramp_per_sec: 6.0,
            speed_smooth: 2.5,

            gravity: 2200.0,
            fall_gravity_mult: 1.35,
            jump_cut_max: 2.4,
            jump_cut_ramp_per_sec: 10.0,
            max_fall_speed: 1100.0,
            jump_velocity: 760.0,
            double_jump_velocity: 680.0,
            coyote_time_sec: 0.1,
            jump_buffer_sec: 0.12,
            land_grace_sec: 0.08,

            float_gravity_mult: 0.35,
            float_fuel_max: 0.6,
            float_regen_per_sec: 0.8,
            float_dash_penalty: 0.4,

            dive_gravity_mult: 2.6,
            dive_max_fall_speed: 1700.0,
            dive_anticipate_sec: 0.08,
            dive_min_down_vy: 220.0,

            dash_cooldown_sec: 0.6,
            dash_distance: 90.0,
            dash_min_scale: 0.4,
            dash_fall_speed_ref: 900.0,
            dash_smooth: 18.0,
            dash_max_step: 14.0,
            dash_return_per_sec: 120.0,
            dash_impulse_sec: 0.12,

            spin_duration_sec: 0.45,
            spin_cooldown_sec: 0.15,
            clean_landing_prog: 0.8,
            perfect_landing_prog: 0.98,
            landing_label_sec: 0.9,

            gap_min: 70.0,
            gap_max_easy: 160.0,
            gap_max_hard: 260.0,
            width_min_easy: 260.0,
            width_min_hard: 150.0,
            width_max_easy: 420.0,
            width_max_hard: 380.0,
            height_levels: vec![440.0, 390.0, 340.0, 290.0, 240.0, 190.0],
            max_step_easy: 70.0,
            max_step_hard: 140.0,
            motion_chance_easy: 0.0,
            motion_chance_hard: 0.35,
            motion_amp_easy: 30.0,
            motion_amp_hard: 90.0,
            motion_rate_min: 0.35,
            motion_rate_max: 0.8,
            gate_chance_easy: 0.05,
            gate_chance_hard: 0.35,

            roof_collapse_time_easy: 2.6,
            roof_collapse_time_hard: 1.2,
            roof_stress_per_sec: 1.0,
            roof_dive_stress_mult: 2.5,
            heavy_bump_easy: 0.22,
            heavy_bump_hard: 0.34,
            heavy_landing_sec: 0.18,
            roof_fall_gravity: 1800.0,
        }
    }
}

impl Tuning {
    /// Parse a balance table; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Repair values the simulation cannot run with.
    ///
    /// Non-finite or negative fields fall back to their defaults, inverted
    /// ranges are collapsed onto their lower bound and an empty height ladder
    /// is restored.
    pub fn sanitized(mut self) -> Self {
        let defaults = Tuning::default();

        macro_rules! repair {
            ($($field:ident),* $(,)?) => {
                $(
                    if !self.$field.is_finite() || self.$field < 0.0 {
                        log::warn!(
                            "tuning.{} = {} is invalid, using {}",
                            stringify!($field),
                            self.$field,
                            defaults.$field
                        );
                        self.$field = defaults.$field;
                    }
                )*
            };
        }

        repair!(
            speed_start, speed_max, speed_ramp_per_sec, speed_smooth,
            gravity, fall_gravity_mult, jump_cut_max, jump_cut_ramp_per_sec,
            max_fall_speed, jump_velocity, double_jump_velocity,
            coyote_time_sec, jump_buffer_sec, land_grace_sec,
            float_gravity_mult, float_fuel_max, float_regen_per_sec, float_dash_penalty,
            dive_gravity_mult, dive_max_fall_speed, dive_anticipate_sec, dive_min_down_vy,
            dash_cooldown_sec, dash_distance, dash_min_scale, dash_fall_speed_ref,
            dash_smooth, dash_max_step, dash_return_per_sec, dash_impulse_sec,
            spin_duration_sec, spin_cooldown_sec, clean_landing_prog,
            perfect_landing_prog, landing_label_sec,
            gap_min, gap_max_easy, gap_max_hard,
            width_min_easy, width_min_hard, width_max_easy, width_max_hard,
            max_step_easy, max_step_hard,
            motion_chance_easy, motion_chance_hard, motion_amp_easy, motion_amp_hard,
            motion_rate_min, motion_rate_max, gate_chance_easy, gate_chance_hard,
            roof_collapse_time_easy, roof_collapse_time_hard, roof_stress_per_sec,
            roof_dive_stress_mult, heavy_bump_easy, heavy_bump_hard,
            heavy_landing_sec, roof_fall_gravity,
        );

        // Durations that are divided by must stay positive
        for (value, default) in [
            (&mut self.spin_duration_sec, defaults.spin_duration_sec),
            (&mut self.dive_anticipate_sec, defaults.dive_anticipate_sec),
            (&mut self.roof_collapse_time_easy, defaults.roof_collapse_time_easy),
            (&mut self.roof_collapse_time_hard, defaults.roof_collapse_time_hard),
            (&mut self.dash_fall_speed_ref, defaults.dash_fall_speed_ref),
            (&mut self.dash_distance, defaults.dash_distance),
        ] {
            if *value <= 0.0 {
                *value = default;
            }
        }

        self.speed_max = self.speed_max.max(self.speed_start);
        self.gap_max_easy = self.gap_max_easy.max(self.gap_min);
        self.gap_max_hard = self.gap_max_hard.max(self.gap_min);
        self.width_max_easy = self.width_max_easy.max(self.width_min_easy);
        self.width_max_hard = self.width_max_hard.max(self.width_min_hard);
        self.motion_rate_max = self.motion_rate_max.max(self.motion_rate_min);
        self.dash_min_scale = self.dash_min_scale.min(1.0);

        self.height_levels.retain(|y| y.is_finite());
        if self.height_levels.is_empty() {
            log::warn!("tuning.height_levels is empty, using defaults");
            self.height_levels = defaults.height_levels;
        }

        self
    }

    /// Seconds of support a roof survives at difficulty `d`
    pub fn collapse_time(&self, d: f32) -> f32 {
        lerp(self.roof_collapse_time_easy, self.roof_collapse_time_hard, d)
    }

    /// Fraction of the collapse budget added by a heavy landing at difficulty `d`
    pub fn heavy_bump_fraction(&self, d: f32) -> f32 {
        lerp(self.heavy_bump_easy, self.heavy_bump_hard, d)
    }

    pub fn gap_max(&self, d: f32) -> f32 {
        lerp(self.gap_max_easy, self.gap_max_hard, d)
    }

    /// Roof width range at difficulty `d`
    pub fn width_range(&self, d: f32) -> (f32, f32) {
        let lo = lerp(self.width_min_easy, self.width_min_hard, d);
        let hi = lerp(self.width_max_easy, self.width_max_hard, d);
        (lo, hi.max(lo))
    }

    pub fn max_step(&self, d: f32) -> f32 {
        lerp(self.max_step_easy, self.max_step_hard, d)
    }

    pub fn motion_chance(&self, d: f32) -> f32 {
        lerp(self.motion_chance_easy, self.motion_chance_hard, d)
    }

    pub fn motion_amplitude(&self, d: f32) -> f32 {
        lerp(self.motion_amp_easy, self.motion_amp_hard, d)
    }

    /// Probability that a gate collaborator should place a gate at difficulty `d`
    pub fn gate_chance(&self, d: f32) -> f32 {
        lerp(self.gate_chance_easy, self.gate_chance_hard, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 1800.0 }"#).unwrap();
        assert_eq!(tuning.gravity, 1800.0);
        assert_eq!(tuning.speed_max, Tuning::default().speed_max);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(Tuning::from_json("{ gravity: ").is_err());
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let tuning = Tuning {
            gravity: -5.0,
            spin_duration_sec: 0.0,
            gap_max_easy: 10.0,
            height_levels: Vec::new(),
            ..Tuning::default()
        }
        .sanitized();

        let defaults = Tuning::default();
        assert_eq!(tuning.gravity, defaults.gravity);
        assert_eq!(tuning.spin_duration_sec, defaults.spin_duration_sec);
        assert_eq!(tuning.gap_max_easy, tuning.gap_min);
        assert_eq!(tuning.height_levels, defaults.height_levels);
    }

    #[test]
    fn test_curves_hit_endpoints() {
        let t = Tuning::default();
        assert_eq!(t.collapse_time(0.0), t.roof_collapse_time_easy);
        assert_eq!(t.collapse_time(1.0), t.roof_collapse_time_hard);
        assert!((t.heavy_bump_fraction(0.0) - 0.22).abs() < 1e-6);
        assert!((t.heavy_bump_fraction(1.0) - 0.34).abs() < 1e-6);
        assert!(t.collapse_time(1.0) < t.collapse_time(0.0));
    }
}
