//! Knockback

use crate::dice::{roll_d6s, DiceRoller, RollResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnockbackOutcome {
    None,
    Knockdown,
    Knockback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockbackResult {
    pub roll: RollResult,
    /// BODY x multiplier - roll - resistance
    pub total: i32,
    pub outcome: KnockbackOutcome,
    /// Distance knocked back, 2 per point of `total`
    pub distance: i32,
}

impl fmt::Display for KnockbackResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            KnockbackOutcome::None => f.write_str("No knockback"),
            KnockbackOutcome::Knockdown => f.write_str("inflicts Knockdown"),
            KnockbackOutcome::Knockback => write!(f, "Knocked back {}m", self.distance),
        }
    }
}

/// Roll knockback for `body` points of BODY
///
/// The roll is 2d6, with `dice_modifier` extra (or fewer) dice.
/// Knockback resistance comes off the total.
pub fn roll_knockback(
    body: i32,
    multiplier: i32,
    resistance: i32,
    dice_modifier: i32,
    dice: &mut impl DiceRoller,
) -> KnockbackResult {
    let count = (2 + dice_modifier).max(0) as u32;
    let roll = roll_d6s(dice, count);
    let total = body * multiplier - roll.total - resistance;
    let outcome = match total {
        t if t < 0 => KnockbackOutcome::None,
        0 => KnockbackOutcome::Knockdown,
        _ => KnockbackOutcome::Knockback,
    };
    let distance = if outcome == KnockbackOutcome::Knockback {
        total * 2
    } else {
        0
    };
    tracing::debug!(body, multiplier, resistance, roll = roll.total, total, ?outcome, "knockback rolled");
    KnockbackResult {
        roll,
        total,
        outcome,
        distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;

    #[test]
    fn test_knocked_back_twice_the_result() {
        let mut dice = ScriptedDice::new([3, 4]);
        let result = roll_knockback(10, 1, 0, 0, &mut dice);
        assert_eq!(result.total, 3);
        assert_eq!(result.outcome, KnockbackOutcome::Knockback);
        assert_eq!(result.distance, 6);
        assert_eq!(result.to_string(), "Knocked back 6m");
    }

    #[test]
    fn test_knockdown_and_none() {
        let mut dice = ScriptedDice::new([3, 4, 6, 6]);
        let result = roll_knockback(7, 1, 0, 0, &mut dice);
        assert_eq!(result.outcome, KnockbackOutcome::Knockdown);
        assert_eq!(result.distance, 0);

        let result = roll_knockback(5, 1, 0, 0, &mut dice);
        assert_eq!(result.outcome, KnockbackOutcome::None);
        assert_eq!(result.to_string(), "No knockback");
    }

    #[test]
    fn test_multiplier_resistance_and_extra_dice() {
        // 6 x 2 - (1 + 1 + 1) - 4 = 5
        let mut dice = ScriptedDice::new([1, 1, 1]);
        let result = roll_knockback(6, 2, 4, 1, &mut dice);
        assert_eq!(result.roll.faces.len(), 3);
        assert_eq!(result.total, 5);
        assert_eq!(result.distance, 10);

        // Removing every die leaves nothing to roll
        let mut dice = ScriptedDice::default();
        let result = roll_knockback(2, 1, 0, -2, &mut dice);
        assert!(result.roll.faces.is_empty());
        assert_eq!(result.distance, 4);
    }
}
