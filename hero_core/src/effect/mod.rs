//! Timed effects
//!
//! Every lasting change to a character (adjustment powers, lingering DCV
//! penalties, conditions) is a [`TimedEffect`]. Applying one writes its
//! change into the characteristic table; removing it subtracts the same
//! change again, so a characteristic always equals its base plus the sum
//! of its live effects.

mod tick;

pub use tick::{start_phase, tick_effects};

use crate::character::Character;
use crate::types::{Characteristic, Condition};
use serde::{Deserialize, Serialize};

/// A bounded-duration change to a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Power that created the effect
    pub source_power: String,
    /// Character that owns the source power
    #[serde(default)]
    pub source_character: String,
    pub label: String,
    #[serde(default)]
    pub characteristic: Option<Characteristic>,
    /// Signed change applied to the characteristic value
    #[serde(default)]
    pub change: i32,
    /// The change also moves the characteristic maximum
    #[serde(default)]
    pub applies_to_max: bool,
    /// Active points behind an adjustment, used when it is merged
    #[serde(default)]
    pub active_points: f64,
    /// `None` lasts until removed
    #[serde(default)]
    pub seconds_remaining: Option<f64>,
    /// Removed at the start of the owner's next phase
    #[serde(default)]
    pub expires_next_phase: bool,
    #[serde(default)]
    pub condition: Option<Condition>,
}

impl TimedEffect {
    /// A change to one characteristic
    pub fn characteristic_change(
        source_power: impl Into<String>,
        label: impl Into<String>,
        characteristic: Characteristic,
        change: i32,
    ) -> Self {
        TimedEffect {
            source_power: source_power.into(),
            source_character: String::new(),
            label: label.into(),
            characteristic: Some(characteristic),
            change,
            applies_to_max: false,
            active_points: 0.0,
            seconds_remaining: None,
            expires_next_phase: false,
            condition: None,
        }
    }

    /// A condition with no characteristic change
    pub fn condition(source_power: impl Into<String>, condition: Condition) -> Self {
        TimedEffect {
            source_power: source_power.into(),
            source_character: String::new(),
            label: format!("{condition:?}"),
            characteristic: None,
            change: 0,
            applies_to_max: false,
            active_points: 0.0,
            seconds_remaining: None,
            expires_next_phase: false,
            condition: Some(condition),
        }
    }

    pub fn lasting(mut self, seconds: f64) -> Self {
        self.seconds_remaining = Some(seconds);
        self
    }

    pub fn until_next_phase(mut self) -> Self {
        self.expires_next_phase = true;
        self
    }

    pub fn on_max(mut self) -> Self {
        self.applies_to_max = true;
        self
    }

    pub fn from_character(mut self, source_character: impl Into<String>) -> Self {
        self.source_character = source_character.into();
        self
    }

    /// Whether this effect and `other` come from the same source and target
    /// the same characteristic or condition
    pub fn same_slot(&self, other: &TimedEffect) -> bool {
        self.source_power == other.source_power
            && self.source_character == other.source_character
            && self.characteristic == other.characteristic
            && self.condition == other.condition
    }
}

/// Add an effect unless one from the same source already occupies its slot
///
/// Returns `true` when the effect was added and its change applied.
pub fn insert_effect(character: &mut Character, effect: TimedEffect) -> bool {
    if character.effects.iter().any(|e| e.same_slot(&effect)) {
        return false;
    }
    apply_change(character, &effect, 1);
    character.effects.push(effect);
    true
}

/// Index of the live effect a source holds on a characteristic
pub fn find_effect(
    character: &Character,
    source_character: &str,
    source_power: &str,
    characteristic: Characteristic,
) -> Option<usize> {
    character.effects.iter().position(|e| {
        e.source_power == source_power
            && e.source_character == source_character
            && e.characteristic == Some(characteristic)
    })
}

/// Replace the change of a live effect, writing only the difference
pub fn update_effect(
    character: &mut Character,
    index: usize,
    new_change: i32,
    active_points: f64,
) {
    let Some(effect) = character.effects.get(index).cloned() else {
        return;
    };
    let delta = TimedEffect {
        change: new_change - effect.change,
        ..effect
    };
    apply_change(character, &delta, 1);
    if let Some(live) = character.effects.get_mut(index) {
        live.change = new_change;
        live.active_points = active_points;
    }
}

/// Remove effects matching `predicate`, reverting their changes
pub fn remove_effects(
    character: &mut Character,
    predicate: impl Fn(&TimedEffect) -> bool,
) -> Vec<TimedEffect> {
    let (removed, kept): (Vec<_>, Vec<_>) =
        character.effects.drain(..).partition(|e| predicate(e));
    character.effects = kept;
    for effect in &removed {
        apply_change(character, effect, -1);
    }
    removed
}

fn apply_change(character: &mut Character, effect: &TimedEffect, sign: i32) {
    if let Some(characteristic) = effect.characteristic {
        let change = effect.change * sign;
        let entry = character.characteristic_mut(characteristic);
        entry.value += change;
        if effect.applies_to_max {
            entry.max += change;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Character {
        Character::new("h", "Hero").with_characteristic(Characteristic::Dex, 18)
    }

    #[test]
    fn test_insert_is_idempotent_per_source() {
        let mut c = hero();
        let effect =
            TimedEffect::characteristic_change("haymaker", "DCV penalty", Characteristic::Dex, -2);
        assert!(insert_effect(&mut c, effect.clone()));
        assert!(!insert_effect(&mut c, effect));
        assert_eq!(c.effects.len(), 1);
        assert_eq!(c.value(Characteristic::Dex), 16);
        assert_eq!(c.max(Characteristic::Dex), 18);
    }

    #[test]
    fn test_remove_reverts_value_and_max() {
        let mut c = hero();
        insert_effect(
            &mut c,
            TimedEffect::characteristic_change("drain", "Drain DEX", Characteristic::Dex, -5).on_max(),
        );
        assert_eq!(c.value(Characteristic::Dex), 13);
        assert_eq!(c.max(Characteristic::Dex), 13);

        let removed = remove_effects(&mut c, |e| e.source_power == "drain");
        assert_eq!(removed.len(), 1);
        assert_eq!(c.value(Characteristic::Dex), 18);
        assert_eq!(c.max(Characteristic::Dex), 18);
    }

    #[test]
    fn test_update_writes_difference() {
        let mut c = hero();
        insert_effect(
            &mut c,
            TimedEffect::characteristic_change("aid", "Aid DEX", Characteristic::Dex, 3).on_max(),
        );
        let index = find_effect(&c, "", "aid", Characteristic::Dex).unwrap();
        assert!(find_effect(&c, "", "aid", Characteristic::Str).is_none());
        update_effect(&mut c, index, 5, 10.0);
        assert_eq!(c.value(Characteristic::Dex), 23);
        assert_eq!(c.effects[0].change, 5);
        assert!((c.effects[0].active_points - 10.0).abs() < f64::EPSILON);
    }
}
