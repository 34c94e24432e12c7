//! Timed power-up and debuff effects
//!
//! Explosive, Pierce and Inked run independently. Re-activating an effect
//! refreshes its timer to the full duration; nothing stacks.

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::state::PowerupKind;
use crate::tuning::Tuning;

/// Effect identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Kills chain through neighbouring enemies
    Explosive,
    /// Bullets pass through up to three enemies
    Pierce,
    /// Debuff: player handling drops to 30%
    Inked,
}

impl EffectKind {
    pub const ALL: [EffectKind; 3] = [EffectKind::Explosive, EffectKind::Pierce, EffectKind::Inked];

    /// Full duration in seconds
    pub fn duration(self, tuning: &Tuning) -> f32 {
        match self {
            EffectKind::Explosive | EffectKind::Pierce => tuning.powerup_duration,
            EffectKind::Inked => tuning.inked_duration,
        }
    }
}

impl From<PowerupKind> for EffectKind {
    fn from(kind: PowerupKind) -> Self {
        match kind {
            PowerupKind::Explosive => EffectKind::Explosive,
            PowerupKind::Pierce => EffectKind::Pierce,
        }
    }
}

/// One effect's flag and countdown
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimedEffect {
    pub active: bool,
    /// Seconds left; only meaningful while active
    pub remaining: f32,
    /// Duration of the last activation
    pub duration: f32,
}

impl TimedEffect {
    pub fn activate(&mut self, duration: f32) {
        self.active = true;
        self.remaining = duration;
        self.duration = duration;
    }

    /// Count down; returns true on the frame the effect ends
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.active = false;
            return true;
        }
        false
    }

    /// Remaining time as a fraction of the full duration
    pub fn remaining_fraction(&self) -> f32 {
        if !self.active || self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// All timed effects on the player
#[derive(Debug, Clone, Default)]
pub struct ActiveEffects {
    pub explosive: TimedEffect,
    pub pierce: TimedEffect,
    pub inked: TimedEffect,
}

impl ActiveEffects {
    pub fn get(&self, kind: EffectKind) -> &TimedEffect {
        match kind {
            EffectKind::Explosive => &self.explosive,
            EffectKind::Pierce => &self.pierce,
            EffectKind::Inked => &self.inked,
        }
    }

    fn get_mut(&mut self, kind: EffectKind) -> &mut TimedEffect {
        match kind {
            EffectKind::Explosive => &mut self.explosive,
            EffectKind::Pierce => &mut self.pierce,
            EffectKind::Inked => &mut self.inked,
        }
    }

    pub fn is_active(&self, kind: EffectKind) -> bool {
        self.get(kind).active
    }

    /// (Re)start an effect at its full duration
    pub fn activate(&mut self, kind: EffectKind, tuning: &Tuning, events: &mut Vec<GameEvent>) {
        self.get_mut(kind).activate(kind.duration(tuning));
        log::debug!("Effect {:?} activated", kind);
        events.push(GameEvent::EffectActivated {
            kind,
            remaining_fraction: 1.0,
        });
    }

    /// Advance every active timer by `dt`
    pub fn tick(&mut self, dt: f32, events: &mut Vec<GameEvent>) {
        for kind in EffectKind::ALL {
            let effect = self.get_mut(kind);
            if !effect.active {
                continue;
            }
            if effect.tick(dt) {
                log::debug!("Effect {:?} expired", kind);
                events.push(GameEvent::EffectExpired { kind });
            } else {
                events.push(GameEvent::EffectProgress {
                    kind,
                    remaining_fraction: effect.remaining_fraction(),
                });
            }
        }
    }

    /// Drop every effect (new game)
    pub fn clear(&mut self, events: &mut Vec<GameEvent>) {
        for kind in EffectKind::ALL {
            let effect = self.get_mut(kind);
            if effect.active {
                events.push(GameEvent::EffectExpired { kind });
            }
            *effect = TimedEffect::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_effect_expires_after_duration() {
        let tuning = Tuning::default();
        let mut effects = ActiveEffects::default();
        let mut events = Vec::new();
        effects.activate(EffectKind::Inked, &tuning, &mut events);
        assert!(effects.is_active(EffectKind::Inked));

        for _ in 0..4 {
            effects.tick(1.0, &mut events);
        }
        assert!(effects.is_active(EffectKind::Inked));

        events.clear();
        effects.tick(1.0, &mut events);
        assert!(!effects.is_active(EffectKind::Inked));
        assert_eq!(effects.inked.remaining, 0.0);
        assert_eq!(events, vec![GameEvent::EffectExpired { kind: EffectKind::Inked }]);
    }

    #[test]
    fn test_effects_are_independent() {
        let tuning = Tuning::default();
        let mut effects = ActiveEffects::default();
        let mut events = Vec::new();
        effects.activate(EffectKind::Explosive, &tuning, &mut events);
        effects.activate(EffectKind::Inked, &tuning, &mut events);
        effects.tick(6.0, &mut events);
        assert!(effects.is_active(EffectKind::Explosive));
        assert!(!effects.is_active(EffectKind::Inked));
        assert!(!effects.is_active(EffectKind::Pierce));
    }

    #[test]
    fn test_overshoot_clamps_to_zero() {
        let mut effect = TimedEffect::default();
        effect.activate(1.0);
        assert!(effect.tick(3.0));
        assert_eq!(effect.remaining, 0.0);
        assert!(!effect.tick(1.0));
    }

    #[test]
    fn test_clear_reports_active_effects() {
        let tuning = Tuning::default();
        let mut effects = ActiveEffects::default();
        let mut events = Vec::new();
        effects.activate(EffectKind::Pierce, &tuning, &mut events);
        events.clear();
        effects.clear(&mut events);
        assert_eq!(events, vec![GameEvent::EffectExpired { kind: EffectKind::Pierce }]);
        assert!(!effects.is_active(EffectKind::Pierce));
    }

    proptest! {
        #[test]
        fn refresh_resets_to_full_duration(elapsed in 0.0f32..20.0) {
            let tuning = Tuning::default();
            let mut effects = ActiveEffects::default();
            let mut events = Vec::new();
            effects.activate(EffectKind::Pierce, &tuning, &mut events);
            effects.tick(elapsed, &mut events);
            effects.activate(EffectKind::Pierce, &tuning, &mut events);
            prop_assert!(effects.pierce.active);
            prop_assert_eq!(effects.pierce.remaining, tuning.powerup_duration);
        }
    }
}
