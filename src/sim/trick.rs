//! Trick/spin state machine
//!
//! Idle → Spinning (fixed duration) → Cooldown → Idle. Diving and spinning are
//! mutually exclusive: a dive always wins.

use super::state::{LandingLabel, LandingQuality, Player, TrickIntent, TrickKind};
use crate::tuning::Tuning;

/// Trick and fixed direction selected by a directional intent.
/// `None` direction means "alternate from the previous spin".
fn trick_for(intent: TrickIntent) -> (TrickKind, Option<f32>) {
    match intent {
        TrickIntent::Up => (TrickKind::BackFlip, Some(-1.0)),
        TrickIntent::Down => (TrickKind::FrontFlip, Some(1.0)),
        TrickIntent::Neutral | TrickIntent::Left | TrickIntent::Right => (TrickKind::Spin, None),
    }
}

/// Whether a trick may start right now
pub fn can_start_trick(player: &Player) -> bool {
    !player.diving && !player.on_ground && !player.spin.spinning && player.spin.cooldown <= 0.0
}

/// Start a trick if the guards allow it; returns whether one started
pub fn try_start_trick(player: &mut Player, intent: TrickIntent) -> bool {
    if !can_start_trick(player) {
        return false;
    }

    let (kind, dir) = trick_for(intent);
    let spin = &mut player.spin;
    spin.dir = dir.unwrap_or(-spin.dir);
    spin.spinning = true;
    spin.t = 0.0;
    spin.prog = 0.0;
    spin.kind = Some(kind);
    spin.intent = intent;
    true
}

/// Advance the spin timer; called once per tick
pub fn update_trick(player: &mut Player, tuning: &Tuning, dt: f32) {
    if player.diving {
        player.spin.clear();
        return;
    }

    let spin = &mut player.spin;
    if !spin.spinning {
        return;
    }

    spin.t += dt;
    spin.prog = (spin.t / tuning.spin_duration_sec).clamp(0.0, 1.0);
    if spin.t >= tuning.spin_duration_sec {
        spin.spinning = false;
        spin.prog = 1.0;
        spin.cooldown = tuning.spin_cooldown_sec;
    }
}

/// Grade the trick carried into a landing, if any was performed
pub fn grade_landing(player: &Player, tuning: &Tuning) -> Option<LandingLabel> {
    let prog = player.spin.prog;
    if prog <= 0.0 {
        return None;
    }

    let quality = if prog >= tuning.perfect_landing_prog {
        LandingQuality::Perfect
    } else if prog >= tuning.clean_landing_prog {
        LandingQuality::Clean
    } else {
        LandingQuality::Sloppy
    };

    Some(LandingLabel {
        quality,
        kind: player.spin.kind,
        intent: player.spin.intent,
        spin_prog: prog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn airborne() -> Player {
        let mut player = Player::new(0.6);
        player.on_ground = false;
        player
    }

    #[test]
    fn test_guards() {
        let mut grounded = Player::new(0.6);
        grounded.on_ground = true;
        assert!(!try_start_trick(&mut grounded, TrickIntent::Neutral));

        let mut diving = airborne();
        diving.diving = true;
        assert!(!try_start_trick(&mut diving, TrickIntent::Neutral));

        let mut cooling = airborne();
        cooling.spin.cooldown = 0.1;
        assert!(!try_start_trick(&mut cooling, TrickIntent::Neutral));

        let mut player = airborne();
        assert!(try_start_trick(&mut player, TrickIntent::Neutral));
        assert!(!try_start_trick(&mut player, TrickIntent::Up));
    }

    #[test]
    fn test_flips_have_fixed_direction() {
        let mut player = airborne();
        try_start_trick(&mut player, TrickIntent::Up);
        assert_eq!(player.spin.kind, Some(TrickKind::BackFlip));
        assert_eq!(player.spin.dir, -1.0);

        let mut player = airborne();
        player.spin.dir = -1.0;
        try_start_trick(&mut player, TrickIntent::Down);
        assert_eq!(player.spin.kind, Some(TrickKind::FrontFlip));
        assert_eq!(player.spin.dir, 1.0);
    }

    #[test]
    fn test_spin_direction_alternates() {
        let tuning = Tuning::default();
        let mut player = airborne();
        let mut dirs = Vec::new();
        for intent in [TrickIntent::Left, TrickIntent::Neutral, TrickIntent::Right] {
            assert!(try_start_trick(&mut player, intent));
            assert_eq!(player.spin.kind, Some(TrickKind::Spin));
            dirs.push(player.spin.dir);
            while player.spin.spinning || player.spin.cooldown > 0.0 {
                update_trick(&mut player, &tuning, SIM_DT);
                player.spin.cooldown = (player.spin.cooldown - SIM_DT).max(0.0);
            }
        }
        assert_eq!(dirs, vec![-1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_spin_runs_for_fixed_duration_and_keeps_progress() {
        let tuning = Tuning::default();
        let mut player = airborne();
        try_start_trick(&mut player, TrickIntent::Neutral);

        update_trick(&mut player, &tuning, SIM_DT);
        assert!((player.spin.prog - SIM_DT / tuning.spin_duration_sec).abs() < 1e-5);

        let ticks = (tuning.spin_duration_sec / SIM_DT).ceil() as usize;
        for _ in 0..ticks {
            update_trick(&mut player, &tuning, SIM_DT);
        }
        assert!(!player.spin.spinning);
        assert_eq!(player.spin.prog, 1.0);
        assert_eq!(player.spin.cooldown, tuning.spin_cooldown_sec);
    }

    #[test]
    fn test_diving_clears_spin() {
        let tuning = Tuning::default();
        let mut player = airborne();
        try_start_trick(&mut player, TrickIntent::Neutral);
        update_trick(&mut player, &tuning, SIM_DT);
        player.diving = true;
        update_trick(&mut player, &tuning, SIM_DT);
        assert!(!player.spin.spinning);
        assert_eq!(player.spin.t, 0.0);
        assert_eq!(player.spin.prog, 0.0);
    }

    #[test]
    fn test_landing_grades() {
        let tuning = Tuning::default();
        let mut player = airborne();
        assert_eq!(grade_landing(&player, &tuning), None);

        player.spin.kind = Some(TrickKind::Spin);
        player.spin.prog = 1.0;
        assert_eq!(
            grade_landing(&player, &tuning).map(|l| l.quality),
            Some(LandingQuality::Perfect)
        );
        player.spin.prog = 0.85;
        assert_eq!(
            grade_landing(&player, &tuning).map(|l| l.quality),
            Some(LandingQuality::Clean)
        );
        player.spin.prog = 0.3;
        assert_eq!(
            grade_landing(&player, &tuning).map(|l| l.quality),
            Some(LandingQuality::Sloppy)
        );
    }
}
