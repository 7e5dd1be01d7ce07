//! Input snapshot consumed by the tick
//!
//! Level state (held buttons) is read as-is every tick. Presses are
//! edge-triggered pulses that the first tick to look at them drains, so a
//! frame that runs several ticks only reacts to a press once.

use super::state::TrickIntent;

/// Pending edge-triggered presses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pulses {
    pub jump: bool,
    pub dive: bool,
    pub trick: Option<TrickIntent>,
}

/// Input for one or more ticks
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub jump_held: bool,
    pub float_held: bool,
    pub dive_held: bool,
    pub dash_pressed: bool,
    pub(crate) pulses: Pulses,
}

impl TickInput {
    /// Arm a jump press
    pub fn press_jump(&mut self) {
        self.pulses.jump = true;
    }

    /// Arm a dive press
    pub fn press_dive(&mut self) {
        self.pulses.dive = true;
    }

    /// Arm a trick press; a newer press replaces an unconsumed one
    pub fn press_trick(&mut self, intent: TrickIntent) {
        self.pulses.trick = Some(intent);
    }

    /// Consume the jump press
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.pulses.jump)
    }

    /// Consume the dive press
    pub fn take_dive(&mut self) -> bool {
        std::mem::take(&mut self.pulses.dive)
    }

    /// Consume the trick press
    pub fn take_trick(&mut self) -> Option<TrickIntent> {
        self.pulses.trick.take()
    }

    /// Presses not yet seen by a tick
    pub fn pending(&self) -> Pulses {
        self.pulses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulses_drain_once() {
        let mut input = TickInput::default();
        input.press_jump();
        input.press_trick(TrickIntent::Up);
        input.press_dive();

        assert!(input.take_jump());
        assert!(!input.take_jump());
        assert_eq!(input.take_trick(), Some(TrickIntent::Up));
        assert_eq!(input.take_trick(), None);
        assert!(input.take_dive());
        assert_eq!(input.pending(), Pulses::default());
    }

    #[test]
    fn test_level_state_is_not_drained() {
        let mut input = TickInput {
            jump_held: true,
            float_held: true,
            ..Default::default()
        };
        input.take_jump();
        assert!(input.jump_held);
        assert!(input.float_held);
    }
}
