//! Adjustment powers
//!
//! AID, DRAIN, TRANSFER, HEALING and SUPPRESS move a characteristic by a
//! number of levels bought with the rolled active points. Each use from
//! the same source on the same characteristic lands in one [`TimedEffect`]:
//! later uses merge into it, capped at the most the dice could ever roll.

mod return_rate;
mod sense;

pub use return_rate::return_seconds;
pub use sense::{apply_sense_affecting, SenseAffectingOutcome};

use crate::catalog::{AdjustmentKind, PowerCatalog, PowerFacet};
use crate::character::Character;
use crate::config::RulesConfig;
use crate::defense::DefenseProfile;
use crate::dice::{DamageRoll, ExtraDie};
use crate::effect::{find_effect, insert_effect, update_effect, TimedEffect};
use crate::power::PowerInstance;
use crate::types::Characteristic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An adjustment power that cannot be resolved as declared
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjustmentError {
    #[error("{power} names no characteristic to adjust")]
    MissingInput { power: String },

    #[error("{power} adjusts {input}, which is not a characteristic")]
    UnknownCharacteristic { power: String, input: String },

    #[error("{0} is not an adjustment power")]
    NotAnAdjustment(String),

    #[error("{character} has no power {power}")]
    UnknownPower { power: String, character: String },
}

/// One adjustment to one characteristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub kind: AdjustmentKind,
    pub power_id: String,
    pub label: String,
    /// Character that owns the power
    pub source_character: String,
    pub characteristic: Characteristic,
    /// Active points this use adds to the effect
    pub active_points: f64,
    /// Most active points the power's dice can ever reach; 0 for no cap
    pub max_effect: f64,
    /// Character points per level of the characteristic
    pub cost_per_point: f64,
    /// Seconds before the effect fades; `None` lasts until removed
    pub duration: Option<f64>,
    /// Raise the characteristic instead of lowering it
    pub raises: bool,
}

impl AdjustmentRequest {
    pub fn new(
        kind: AdjustmentKind,
        power_id: impl Into<String>,
        characteristic: Characteristic,
        active_points: f64,
        cost_per_point: f64,
    ) -> Self {
        AdjustmentRequest {
            kind,
            power_id: power_id.into(),
            label: format!("{kind:?} {characteristic}"),
            source_character: String::new(),
            characteristic,
            active_points,
            max_effect: 0.0,
            cost_per_point,
            duration: None,
            raises: !kind.is_negative(),
        }
    }
}

/// What one adjustment did to one characteristic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentOutcome {
    pub characteristic: Option<Characteristic>,
    /// Active points this use actually added
    pub active_points: f64,
    /// Active points behind the effect after this use
    pub total_active_points: f64,
    /// Signed change this use made to the characteristic
    pub levels: i32,
    /// Signed change of the whole effect
    pub total_levels: i32,
    pub merged: bool,
    pub created: bool,
}

fn levels_for(active_points: f64, cost_per_point: f64) -> i32 {
    let cost = if cost_per_point > 0.0 { cost_per_point } else { 1.0 };
    (active_points / cost).trunc() as i32
}

/// Apply one adjustment to `target`
///
/// HEALING restores lost points of the current value, never above the
/// maximum, and leaves no effect behind. Everything else creates or
/// merges into the effect from the same source on the same characteristic.
pub fn apply_adjustment(target: &mut Character, request: &AdjustmentRequest) -> AdjustmentOutcome {
    let mut outcome = AdjustmentOutcome {
        characteristic: Some(request.characteristic),
        ..Default::default()
    };

    if request.kind == AdjustmentKind::Healing {
        let levels = levels_for(request.active_points, request.cost_per_point);
        let value = target.value(request.characteristic);
        let restored = (target.max(request.characteristic) - value).clamp(0, levels.max(0));
        if restored > 0 {
            target.set_value(request.characteristic, value + restored);
        }
        outcome.active_points = request.active_points;
        outcome.total_active_points = request.active_points;
        outcome.levels = restored;
        outcome.total_levels = restored;
        return outcome;
    }

    let sign = if request.raises { 1 } else { -1 };
    let existing = find_effect(
        target,
        &request.source_character,
        &request.power_id,
        request.characteristic,
    );
    let (previous_points, previous_change) = existing
        .and_then(|index| target.effects.get(index))
        .map(|e| (e.active_points, e.change))
        .unwrap_or((0.0, 0));

    let mut active_points = request.active_points;
    let mut total = previous_points + active_points;
    if request.max_effect > 0.0 && total > request.max_effect {
        active_points = (request.max_effect - previous_points).max(0.0);
        total = previous_points + active_points;
    }
    outcome.active_points = active_points;
    outcome.total_active_points = total;
    if active_points <= 0.0 {
        outcome.total_levels = previous_change;
        tracing::debug!(power = %request.power_id, characteristic = %request.characteristic, "adjustment adds nothing");
        return outcome;
    }

    let new_change = sign * levels_for(total, request.cost_per_point);
    outcome.levels = new_change - previous_change;
    outcome.total_levels = new_change;

    match existing {
        Some(index) => {
            update_effect(target, index, new_change, total);
            if let Some(effect) = target.effects.get_mut(index) {
                effect.label = request.label.clone();
            }
            outcome.merged = true;
        }
        None => {
            let mut effect = TimedEffect::characteristic_change(
                request.power_id.clone(),
                request.label.clone(),
                request.characteristic,
                new_change,
            )
            .from_character(request.source_character.clone())
            .on_max();
            effect.active_points = total;
            if let Some(seconds) = request.duration {
                effect = effect.lasting(seconds);
            }
            outcome.created = insert_effect(target, effect);
        }
    }
    tracing::debug!(
        power = %request.power_id,
        characteristic = %request.characteristic,
        active_points,
        total,
        levels = outcome.levels,
        merged = outcome.merged,
        "adjustment applied"
    );
    outcome
}

/// Everything one use of an adjustment power did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentReport {
    pub kind: AdjustmentKind,
    /// Dice total before any defense
    pub rolled_active_points: f64,
    /// Power Defense subtracted (DRAIN, TRANSFER, SUPPRESS)
    pub defense: i32,
    pub max_effect: f64,
    pub duration: Option<f64>,
    /// Change to the target
    pub target: AdjustmentOutcome,
    /// TRANSFER: change to the attacker's receiving characteristic
    pub transferred: Option<AdjustmentOutcome>,
    pub warnings: Vec<String>,
}

impl AdjustmentReport {
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(characteristic) = self.target.characteristic {
            parts.push(format!("{:+} {}", self.target.levels, characteristic));
        }
        if let Some(transferred) = &self.transferred {
            if let Some(characteristic) = transferred.characteristic {
                parts.push(format!("{:+} {} to attacker", transferred.levels, characteristic));
            }
        }
        if parts.is_empty() {
            "No effect".to_string()
        } else {
            format!("{:?}: {}", self.kind, parts.join(", "))
        }
    }
}

/// Characteristics named by an adjustment's INPUT: "DEX" or "STR to DEX"
fn parse_input(power: &PowerInstance) -> Result<(Characteristic, Option<Characteristic>), AdjustmentError> {
    let input = power
        .input
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AdjustmentError::MissingInput {
            power: power.name.clone(),
        })?;
    let lower = input.to_ascii_lowercase();
    let (from, to) = match lower.find(" to ") {
        Some(at) => (&input[..at], Some(&input[at + 4..])),
        None => (input, None),
    };
    let lookup = |key: &str| {
        Characteristic::from_key(key).ok_or_else(|| AdjustmentError::UnknownCharacteristic {
            power: power.name.clone(),
            input: key.trim().to_string(),
        })
    };
    let from = lookup(from)?;
    let to = to.map(lookup).transpose()?;
    Ok((from, to))
}

/// Most active points the dice could roll: 6 per die, 3 for a half die
fn max_effect(roll: &DamageRoll) -> f64 {
    let spec = roll.spec();
    let half = if spec.extra == ExtraDie::HalfDie { 3.0 } else { 0.0 };
    spec.d6 as f64 * 6.0 + half
}

fn cost_per_point(
    characteristic: Characteristic,
    attacker: &Character,
    catalog: &PowerCatalog,
    config: &RulesConfig,
) -> f64 {
    let cost = catalog
        .lookup(characteristic.key(), attacker.edition)
        .map(|d| d.cost)
        .filter(|c| *c > 0.0)
        .unwrap_or(1.0);
    cost * config.adjustment_multiplier(characteristic)
}

/// How long an effect from `power` lasts
fn duration_for(
    power: &PowerInstance,
    kind: AdjustmentKind,
    config: &RulesConfig,
    warnings: &mut Vec<String>,
) -> Option<f64> {
    if kind == AdjustmentKind::Suppress {
        return None;
    }
    let Some(delayed) = power.find_modifier("DELAYEDRETURNRATE") else {
        return Some(config.adjustment_return_seconds);
    };
    let option = delayed.option_id.as_deref().unwrap_or("");
    match return_seconds(option) {
        Some(seconds) => Some(seconds),
        None => {
            let message = format!("DELAYEDRETURNRATE has unhandled option {option:?}");
            tracing::warn!(power = %power.id, "{}", message);
            warnings.push(message);
            Some(config.adjustment_return_seconds)
        }
    }
}

/// Resolve one rolled use of an adjustment power against `target`
///
/// DRAIN, TRANSFER and SUPPRESS lose the target's Power Defense (normal and
/// resistant) from the rolled active points first. TRANSFER also raises
/// the attacker's second characteristic by the points it took. Returns the
/// updated attacker and target; when both are the same character the two
/// records are identical.
pub fn resolve_adjustment(
    attacker: &Character,
    target: &Character,
    power_id: &str,
    roll: &DamageRoll,
    defense: &DefenseProfile,
    catalog: &PowerCatalog,
    config: &RulesConfig,
) -> Result<(Character, Character, AdjustmentReport), AdjustmentError> {
    let power = attacker
        .power(power_id)
        .ok_or_else(|| AdjustmentError::UnknownPower {
            power: power_id.to_string(),
            character: attacker.name.clone(),
        })?;
    let kind = match catalog.lookup(&power.xmlid, attacker.edition).map(|d| d.facet()) {
        Some(PowerFacet::Adjustment(kind)) => kind,
        _ => return Err(AdjustmentError::NotAnAdjustment(power.name.clone())),
    };
    let (from, to) = parse_input(power)?;

    let mut warnings = Vec::new();
    let rolled = roll.total() as f64;
    let defense_total = if kind.is_negative() {
        defense.defense + defense.resistant
    } else {
        0
    };
    let active_points = (rolled - defense_total as f64).max(0.0);
    let max = max_effect(roll);
    let duration = duration_for(power, kind, config, &mut warnings);

    let mut request = AdjustmentRequest::new(
        kind,
        power_id,
        from,
        active_points,
        cost_per_point(from, attacker, catalog, config),
    );
    request.label = format!("{} {} [{}]", power.xmlid, from, attacker.name);
    request.source_character = attacker.id.clone();
    request.max_effect = max;
    request.duration = duration;

    let same_character = attacker.id == target.id;
    let mut updated_target = target.clone();
    let outcome = apply_adjustment(&mut updated_target, &request);

    let mut updated_attacker = if same_character {
        updated_target.clone()
    } else {
        attacker.clone()
    };
    let transferred = match (kind, to) {
        (AdjustmentKind::Transfer, Some(to)) => {
            let mut gain = AdjustmentRequest::new(
                kind,
                power_id,
                to,
                outcome.active_points,
                cost_per_point(to, attacker, catalog, config),
            );
            gain.label = format!("{} {} [{}]", power.xmlid, to, attacker.name);
            gain.source_character = attacker.id.clone();
            gain.max_effect = max;
            gain.duration = duration;
            gain.raises = true;
            Some(apply_adjustment(&mut updated_attacker, &gain))
        }
        (AdjustmentKind::Transfer, None) => {
            let message = format!("{} transfers to no characteristic", power.name);
            tracing::warn!(power = %power.id, "{}", message);
            warnings.push(message);
            None
        }
        _ => None,
    };
    if same_character {
        updated_target = updated_attacker.clone();
    }

    let report = AdjustmentReport {
        kind,
        rolled_active_points: rolled,
        defense: defense_total,
        max_effect: max,
        duration,
        target: outcome,
        transferred,
        warnings,
    };
    Ok((updated_attacker, updated_target, report))
}
