//! Effect expiry

use super::{remove_effects, TimedEffect};
use crate::character::Character;

/// Advance real-time effects by `seconds`, removing the ones that run out
///
/// Returns the expired effects, already reverted.
pub fn tick_effects(character: &mut Character, seconds: f64) -> Vec<TimedEffect> {
    for effect in &mut character.effects {
        if let Some(remaining) = effect.seconds_remaining.as_mut() {
            *remaining -= seconds;
        }
    }

    let expired = remove_effects(character, |e| {
        e.seconds_remaining.map(|s| s <= 0.0).unwrap_or(false)
    });
    for effect in &expired {
        tracing::debug!(character = %character.id, effect = %effect.label, "effect expired");
    }
    expired
}

/// Start the character's phase: effects lasting until now are removed
pub fn start_phase(character: &mut Character) -> Vec<TimedEffect> {
    let expired = remove_effects(character, |e| e.expires_next_phase);
    for effect in &expired {
        tracing::debug!(character = %character.id, effect = %effect.label, "effect ended at phase start");
    }
    expired
}
