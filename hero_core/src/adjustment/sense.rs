//! Sense-affecting powers (Flash)

use crate::character::Character;
use crate::dice::DamageRoll;
use crate::effect::{insert_effect, remove_effects, TimedEffect};
use crate::power::PowerInstance;
use crate::types::Condition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseAffectingOutcome {
    /// BODY counted from the roll
    pub body: i32,
    pub flash_defense: i32,
    /// Seconds the target is blinded; 0 when the defense stopped it all
    pub seconds: i32,
}

/// Blind `target` for the counted BODY of a Flash roll less its Flash Defense
///
/// A new flash from the same power replaces the one still running.
pub fn apply_sense_affecting(
    attacker_id: &str,
    target: &Character,
    power: &PowerInstance,
    roll: &DamageRoll,
    flash_defense: i32,
) -> (Character, SenseAffectingOutcome) {
    let body = roll.counted_body();
    let seconds = (body - flash_defense.max(0)).max(0);
    let mut updated = target.clone();

    if seconds > 0 {
        remove_effects(&mut updated, |e| {
            e.source_power == power.id
                && e.source_character == attacker_id
                && e.condition == Some(Condition::Blind)
        });
        let mut effect = TimedEffect::condition(power.id.clone(), Condition::Blind)
            .from_character(attacker_id)
            .lasting(seconds as f64);
        effect.label = format!("{} ({}s)", power.name, seconds);
        insert_effect(&mut updated, effect);
    }
    tracing::debug!(target = %target.id, body, flash_defense, seconds, "sense-affecting applied");

    (
        updated,
        SenseAffectingOutcome {
            body,
            flash_defense,
            seconds,
        },
    )
}
