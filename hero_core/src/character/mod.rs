//! Character records
//!
//! A [`Character`] is plain data: a characteristic table of current/max
//! pairs, the powers bought, and the timed effects currently applied.
//! Resolution engines take a character by reference and hand back a
//! changed clone.

mod endurance;
mod recovery;

pub use endurance::{EnduranceSource, EnduranceSpent};
pub use recovery::Recovery;

use crate::catalog::PowerCatalog;
use crate::cost::{compute_costs, CostContext, PowerCosts};
use crate::effect::{self, TimedEffect};
use crate::power::PowerInstance;
use crate::types::{CharacterKind, Characteristic, Condition, Edition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current and maximum value of one characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CharacteristicValue {
    pub value: i32,
    pub max: i32,
}

impl CharacteristicValue {
    pub fn new(value: i32) -> Self {
        CharacteristicValue { value, max: value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: CharacterKind,
    #[serde(default)]
    pub edition: Edition,
    #[serde(default)]
    pub characteristics: BTreeMap<Characteristic, CharacteristicValue>,
    #[serde(default)]
    pub powers: Vec<PowerInstance>,
    #[serde(default)]
    pub effects: Vec<TimedEffect>,
}

impl Character {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Character {
            id: id.into(),
            name: name.into(),
            kind: CharacterKind::default(),
            edition: Edition::default(),
            characteristics: BTreeMap::new(),
            powers: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: CharacterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_edition(mut self, edition: Edition) -> Self {
        self.edition = edition;
        self
    }

    /// Set a characteristic's value and maximum
    pub fn with_characteristic(mut self, characteristic: Characteristic, value: i32) -> Self {
        self.characteristics
            .insert(characteristic, CharacteristicValue::new(value));
        self
    }

    /// Fill in every characteristic not yet set with its catalog base
    pub fn with_base_characteristics(mut self, catalog: &PowerCatalog) -> Self {
        for characteristic in Characteristic::all() {
            if self.characteristics.contains_key(characteristic) {
                continue;
            }
            if let Some(definition) = catalog.lookup(characteristic.key(), self.edition) {
                self.characteristics
                    .insert(*characteristic, CharacteristicValue::new(definition.base));
            }
        }
        self
    }

    pub fn with_power(mut self, power: PowerInstance) -> Self {
        self.powers.push(power.prepared());
        self
    }

    pub fn characteristic(&self, characteristic: Characteristic) -> Option<&CharacteristicValue> {
        self.characteristics.get(&characteristic)
    }

    pub(crate) fn characteristic_mut(
        &mut self,
        characteristic: Characteristic,
    ) -> &mut CharacteristicValue {
        self.characteristics.entry(characteristic).or_default()
    }

    /// Current value, 0 when the characteristic is not tracked
    pub fn value(&self, characteristic: Characteristic) -> i32 {
        self.characteristic(characteristic)
            .map(|c| c.value)
            .unwrap_or(0)
    }

    pub fn max(&self, characteristic: Characteristic) -> i32 {
        self.characteristic(characteristic).map(|c| c.max).unwrap_or(0)
    }

    pub fn set_value(&mut self, characteristic: Characteristic, value: i32) {
        self.characteristic_mut(characteristic).value = value;
    }

    /// Add `delta` to the current value, returning the new value
    pub fn adjust(&mut self, characteristic: Characteristic, delta: i32) -> i32 {
        let entry = self.characteristic_mut(characteristic);
        entry.value += delta;
        entry.value
    }

    pub fn power(&self, id: &str) -> Option<&PowerInstance> {
        self.powers.iter().find(|p| p.id == id)
    }

    pub fn power_mut(&mut self, id: &str) -> Option<&mut PowerInstance> {
        self.powers.iter_mut().find(|p| p.id == id)
    }

    /// Powers with the given catalog identifier that are switched on
    pub fn active_powers<'a>(&'a self, xmlid: &'a str) -> impl Iterator<Item = &'a PowerInstance> {
        self.powers
            .iter()
            .filter(move |p| p.active && p.xmlid == xmlid)
    }

    /// Cost breakdown for one of this character's powers
    pub fn costs_for(&self, power: &PowerInstance, catalog: &PowerCatalog) -> PowerCosts {
        let parent = power.parent.as_deref().and_then(|id| self.power(id));
        let ctx = CostContext::new(catalog, self.edition).with_parent(parent);
        compute_costs(power, &ctx)
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.effects
            .iter()
            .any(|e| e.condition == Some(condition))
    }

    /// Why the character cannot act right now, if anything prevents it
    pub fn cannot_act_reason(&self) -> Option<String> {
        if self.has_condition(Condition::KnockedOut) {
            return Some("knocked out".to_string());
        }
        if let Some(stun) = self.characteristic(Characteristic::Stun) {
            if stun.value <= 0 {
                return Some(format!("STUN is {}", stun.value));
            }
        }
        if self.has_condition(Condition::Stunned) {
            return Some("stunned".to_string());
        }
        if self.has_condition(Condition::Aborted) {
            return Some("aborted to a defensive action".to_string());
        }
        None
    }

    pub fn can_act(&self) -> bool {
        self.cannot_act_reason().is_none()
    }

    /// Remove phase-limited effects at the start of this character's phase
    pub fn start_phase(&mut self) -> Vec<TimedEffect> {
        effect::start_phase(self)
    }

    /// Advance timed effects by `seconds`
    pub fn tick(&mut self, seconds: f64) -> Vec<TimedEffect> {
        effect::tick_effects(self, seconds)
    }
}
