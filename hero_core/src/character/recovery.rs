//! Taking a Recovery

use super::Character;
use crate::effect::remove_effects;
use crate::types::{Characteristic, Condition};
use serde::{Deserialize, Serialize};

/// STUN and END before and after a Recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recovery {
    pub rec: i32,
    pub stun_before: i32,
    pub stun_after: i32,
    pub end_before: i32,
    pub end_after: i32,
}

impl Character {
    /// Add REC to STUN and END
    ///
    /// Neither goes above its maximum through recovery, but a value already
    /// above its maximum is left where it is. Regaining STUN above 0 wakes
    /// a knocked-out character.
    pub fn take_recovery(&mut self) -> Recovery {
        let rec = self.value(Characteristic::Rec);
        let (stun_before, stun_after) = self.recover(Characteristic::Stun, rec);
        let (end_before, end_after) = self.recover(Characteristic::End, rec);

        if stun_after > 0 {
            remove_effects(self, |e| e.condition == Some(Condition::KnockedOut));
        }

        tracing::debug!(character = %self.id, rec, stun_after, end_after, "recovery");
        Recovery {
            rec,
            stun_before,
            stun_after,
            end_before,
            end_after,
        }
    }

    fn recover(&mut self, characteristic: Characteristic, rec: i32) -> (i32, i32) {
        let Some(entry) = self.characteristics.get_mut(&characteristic) else {
            return (0, 0);
        };
        let before = entry.value;
        if entry.value < entry.max {
            entry.value = (entry.value + rec).min(entry.max);
        }
        (before, entry.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{insert_effect, TimedEffect};

    fn winded() -> Character {
        let mut c = Character::new("a", "Hero")
            .with_characteristic(Characteristic::Rec, 8)
            .with_characteristic(Characteristic::Stun, 30)
            .with_characteristic(Characteristic::End, 40);
        c.set_value(Characteristic::Stun, 25);
        c.set_value(Characteristic::End, 10);
        c
    }

    #[test]
    fn test_recovery_caps_at_max() {
        let mut c = winded();
        let r = c.take_recovery();
        assert_eq!(r.stun_after, 30);
        assert_eq!(r.end_after, 18);
        assert_eq!(c.value(Characteristic::Stun), 30);
    }

    #[test]
    fn test_recovery_keeps_values_above_max() {
        let mut c = winded();
        c.set_value(Characteristic::End, 45);
        c.take_recovery();
        assert_eq!(c.value(Characteristic::End), 45);
    }

    #[test]
    fn test_recovery_wakes_knocked_out() {
        let mut c = winded();
        c.set_value(Characteristic::Stun, -3);
        insert_effect(&mut c, TimedEffect::condition("blow", Condition::KnockedOut));
        c.take_recovery();
        assert_eq!(c.value(Characteristic::Stun), 5);
        assert!(!c.has_condition(Condition::KnockedOut));
    }
}
