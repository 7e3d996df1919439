//! Attack resolution
//!
//! [`resolve_to_hit`] takes an attacker, one of its powers and a list of
//! targets, and walks the declaration through its states:
//!
//! ```text
//! Declared -> RollToHit -> Hit | Miss
//!          -> Aborted             (Dodge, Block)
//!          -> ActivationFailed    (Requires A Roll)
//! ```
//!
//! Preconditions are checked before anything is spent or rolled. After
//! that END and charges are paid, the activation roll (if any) is made, the
//! lingering DCV effect is placed on the attacker, and a single 3d6 roll is
//! compared against every target.

mod aoe;
mod error;
mod options;
mod parameters;
mod profile;
mod range;

pub use aoe::{place_aoe, AoePlacement};
pub use error::AttackRefusal;
pub use options::AttackOptions;
pub use parameters::{autofire_max_shots, combat_skill_levels, AttackParameters, CombatSkillLevels};
pub use profile::{AttackProfile, AvadSpec};
pub use range::{effective_range_class, range_penalty};

use crate::catalog::{AdjustmentKind, Maneuver, PowerCatalog};
use crate::character::{Character, EnduranceSource, EnduranceSpent};
use crate::config::RulesConfig;
use crate::cost::endurance_cost;
use crate::dice::{roll_3d6, roll_d6s, DiceRoller, RollResult};
use crate::effect::{insert_effect, TimedEffect};
use crate::power::PowerInstance;
use crate::rounding::{ceil_whole, round_down_i32};
use crate::types::{Characteristic, Condition, DefendsWith, Tag};
use serde::{Deserialize, Serialize};

/// Where a declared attack ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackState {
    Declared,
    /// Rolled, with no targets to compare against
    RollToHit,
    Hit,
    Miss,
    Aborted,
    /// The Requires A Roll check failed; costs stay spent
    ActivationFailed,
}

/// A character targeted by an attack
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub character: &'a Character,
    /// Distance from the attacker, or from the explosion's center
    pub distance: f64,
}

impl<'a> Target<'a> {
    pub fn new(character: &'a Character, distance: f64) -> Self {
        Target {
            character,
            distance,
        }
    }
}

/// Roll result against one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target_id: String,
    pub name: String,
    /// Target's DCV or DMCV
    pub value: i32,
    /// Attack total after range and autofire modifiers for this target
    pub total: i32,
    pub hit: bool,
    /// Margin of the roll; `None` for explosions, which always hit
    pub by: Option<i32>,
    pub distance: f64,
    /// 0 for the first shot, 1.. for extra autofire shots
    pub shot: u32,
    pub tags: Vec<Tag>,
    /// Template and distance, for explosions
    pub note: Option<String>,
}

/// Result of a Requires A Roll activation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRoll {
    pub target: i32,
    pub roll: RollResult,
    pub success: bool,
}

/// Block roll against the OCV of the attack being blocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRoll {
    pub roll: RollResult,
    pub total: i32,
    pub against: Option<i32>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToHitResult {
    pub attacker_id: String,
    pub power_id: String,
    pub state: AttackState,
    pub profile: AttackProfile,
    pub parameters: AttackParameters,
    pub roll: Option<RollResult>,
    /// Total before per-target range modifiers
    pub total: i32,
    /// Every modifier that went into `total`
    pub tags: Vec<Tag>,
    pub targets: Vec<TargetOutcome>,
    pub endurance: Option<EnduranceSpent>,
    /// STUN taken to pay for END the attacker did not have
    pub stun_for_endurance: i32,
    pub charges_spent: i32,
    pub activation_roll: Option<ActivationRoll>,
    pub block: Option<BlockRoll>,
    /// Labels of the effects placed on the attacker
    pub effects_created: Vec<String>,
    pub warnings: Vec<String>,
}

impl ToHitResult {
    fn new(
        attacker: &Character,
        power_id: &str,
        profile: AttackProfile,
        parameters: AttackParameters,
    ) -> Self {
        ToHitResult {
            attacker_id: attacker.id.clone(),
            power_id: power_id.to_string(),
            state: AttackState::Declared,
            profile,
            parameters,
            roll: None,
            total: 0,
            tags: Vec::new(),
            targets: Vec::new(),
            endurance: None,
            stun_for_endurance: 0,
            charges_spent: 0,
            activation_roll: None,
            block: None,
            effects_created: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Ids of targets hit by at least one shot, in order
    pub fn hit_target_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for outcome in self.targets.iter().filter(|t| t.hit) {
            if !ids.contains(&outcome.target_id.as_str()) {
                ids.push(&outcome.target_id);
            }
        }
        ids
    }

    /// Number of shots that hit the given target
    pub fn hits_on(&self, target_id: &str) -> usize {
        self.targets
            .iter()
            .filter(|t| t.hit && t.target_id == target_id)
            .count()
    }

    pub fn is_hit(&self) -> bool {
        self.state == AttackState::Hit
    }
}

/// END for one use of the power, including the STR put behind it
fn attack_endurance(
    attacker: &Character,
    power: &PowerInstance,
    profile: &AttackProfile,
    options: &AttackOptions,
    catalog: &PowerCatalog,
) -> i32 {
    let costs = attacker.costs_for(power, catalog);
    let definition = catalog.lookup(&power.xmlid, attacker.edition);
    let mut end = endurance_cost(power, &costs, definition.as_ref());
    if profile.uses_strength {
        let strength = options
            .effective_str
            .unwrap_or_else(|| attacker.value(Characteristic::Str));
        if strength > 0 {
            end += round_down_i32(strength as f64 / 10.0).max(1);
        }
    }
    end
}

/// Check everything that refuses an attack before any cost is paid
fn check_preconditions(
    attacker: &Character,
    power: &PowerInstance,
    profile: &AttackProfile,
    is_attack: Option<bool>,
    end_needed: i32,
) -> Result<(), AttackRefusal> {
    if let Some(reason) = attacker.cannot_act_reason() {
        return Err(AttackRefusal::CannotAct {
            name: attacker.name.clone(),
            reason,
        });
    }
    if is_attack == Some(false) && profile.adjustment.is_none() && !profile.sense_affecting {
        return Err(AttackRefusal::NotAnAttack(power.name.clone()));
    }
    if let Some(charges) = power.charges {
        if charges.value <= 0 {
            return Err(AttackRefusal::NoCharges {
                power: power.name.clone(),
            });
        }
    }
    let source = attacker.endurance_source(power);
    if let EnduranceSource::Reserve(_) = source {
        let available = attacker.available_endurance(&source);
        if end_needed > available {
            return Err(AttackRefusal::ReserveExhausted {
                power: power.name.clone(),
                needed: end_needed,
                available,
            });
        }
    }
    Ok(())
}

/// Declare an attack and roll it against every target
///
/// Returns the attacker as changed by the attempt (END, charges, lingering
/// effects) and the per-target outcome. Refusals leave nothing changed.
pub fn resolve_to_hit(
    attacker: &Character,
    power_id: &str,
    options: &AttackOptions,
    targets: &[Target<'_>],
    catalog: &PowerCatalog,
    config: &RulesConfig,
    dice: &mut impl DiceRoller,
) -> Result<(Character, ToHitResult), AttackRefusal> {
    let power = attacker
        .power(power_id)
        .ok_or_else(|| AttackRefusal::UnknownPower {
            power: power_id.to_string(),
            character: attacker.name.clone(),
        })?;

    // Step 1: Describe the attack
    let edition = attacker.edition;
    let definition = catalog.lookup(&power.xmlid, edition);
    let costs = attacker.costs_for(power, catalog);
    let profile = AttackProfile::from_power(power, definition.as_ref(), &costs, edition);
    let end_needed = if config.use_endurance {
        attack_endurance(attacker, power, &profile, options, catalog)
    } else {
        0
    };

    // Step 2: Refuse before anything is spent
    check_preconditions(
        attacker,
        power,
        &profile,
        definition.as_ref().map(|d| d.is_attack()),
        end_needed,
    )?;

    let parameters = AttackParameters::build(attacker, power, &profile, options, config);
    let mut result = ToHitResult::new(attacker, power_id, profile, parameters);
    result.warnings.extend(costs.warnings.iter().cloned());
    result.warnings.extend(result.parameters.warnings.iter().cloned());
    if definition.is_none() {
        let message = format!("{} is not in the power catalog", power.xmlid);
        tracing::warn!(power = %power.id, "{}", message);
        result.warnings.push(message);
    }

    let mut updated = attacker.clone();

    // Step 3: Pay END and charges
    if end_needed > 0 {
        let source = attacker.endurance_source(power);
        let spent = if config.automation.writes_endurance(attacker.kind) {
            updated.draw_endurance(source, end_needed)
        } else {
            attacker.clone().draw_endurance(source, end_needed)
        };
        if spent.overdraw > 0 {
            let stun_dice = ceil_whole(spent.overdraw as f64 / 2.0) as u32;
            let stun = roll_d6s(dice, stun_dice).total;
            tracing::warn!(character = %attacker.id, stun, "STUN used for END");
            if config.automation.writes_endurance(attacker.kind) {
                updated.adjust(Characteristic::Stun, -stun);
            }
            result.stun_for_endurance = stun;
        }
        result.endurance = Some(spent);
    }
    if let Some(charges) = updated.power_mut(power_id).and_then(|p| p.charges.as_mut()) {
        charges.value -= 1;
        result.charges_spent = 1;
    }

    // Step 4: Requires A Roll
    if let Some(requirement) = power.find_modifier("REQUIRESASKILLROLL") {
        match requirement.option_number() {
            Some(target) => {
                let roll = roll_3d6(dice);
                let success = roll.total <= target;
                tracing::debug!(power = power_id, target, roll = roll.total, success, "activation roll");
                result.activation_roll = Some(ActivationRoll {
                    target,
                    roll,
                    success,
                });
                if !success {
                    result.state = AttackState::ActivationFailed;
                    return Ok((updated, result));
                }
            }
            None => {
                let message = format!("{} requires a roll but names no target number", power.name);
                tracing::warn!("{}", message);
                result.warnings.push(message);
            }
        }
    }

    // Step 5: Lingering DCV until the attacker's next phase
    let parameters = result.parameters.clone();
    if parameters.lingering_dcv != 0 || parameters.lingering_dmcv != 0 {
        let (characteristic, change) = if parameters.lingering_dmcv != 0 {
            (Characteristic::Dmcv, parameters.lingering_dmcv)
        } else {
            (Characteristic::Dcv, parameters.lingering_dcv)
        };
        let speed = attacker.value(Characteristic::Spd).max(1);
        let label = format!("{} {:+} {}", power.name, change, characteristic);
        let effect = TimedEffect::characteristic_change(power_id, label.clone(), characteristic, change)
            .from_character(&attacker.id)
            .lasting(ceil_whole(12.0 / speed as f64))
            .until_next_phase();
        if insert_effect(&mut updated, effect) {
            result.effects_created.push(label);
        }
    }

    // Step 6: Aborts
    let effect_text = power.effect.as_deref().unwrap_or("").to_ascii_lowercase();
    let blocking = parameters.has_maneuver(Maneuver::Block) || effect_text.contains("block");
    let abort_maneuver = parameters.maneuvers.iter().any(|m| m.is_abort());
    if abort_maneuver || effect_text.contains("abort") {
        let aborted = TimedEffect::condition(power_id, Condition::Aborted)
            .from_character(&attacker.id)
            .until_next_phase();
        if insert_effect(&mut updated, aborted) {
            result.effects_created.push(format!("Aborted [{}]", power.name));
        }
    }
    if abort_maneuver && !blocking {
        tracing::debug!(power = power_id, "attack aborted to a defensive maneuver");
        result.state = AttackState::Aborted;
        return Ok((updated, result));
    }

    // Step 7: One roll for every target
    let mut tags = vec![
        Tag::new(11, "base"),
        Tag::new(parameters.base_value, parameters.combat_value.characteristic().key()),
    ];
    tags.extend(parameters.modifiers.iter().cloned());
    let roll = roll_3d6(dice);
    let total = tags.iter().map(|t| t.value).sum::<i32>() - roll.total;
    tracing::debug!(power = power_id, roll = roll.total, total, "roll to hit");

    if blocking {
        let against = options.pending_attack_ocv;
        if against.is_none() {
            result
                .warnings
                .push("Block rolled without the OCV of the attack being blocked".to_string());
        }
        result.block = Some(BlockRoll {
            roll: roll.clone(),
            total,
            against,
            success: against.map(|ocv| total >= ocv).unwrap_or(false),
        });
        result.roll = Some(roll);
        result.total = total;
        result.tags = tags;
        result.state = AttackState::Aborted;
        return Ok((updated, result));
    }

    result.targets = evaluate_targets(&result, total, targets, config);
    result.roll = Some(roll);
    result.total = total;
    result.tags = tags;
    result.state = if targets.is_empty() {
        AttackState::RollToHit
    } else if result.targets.iter().any(|t| t.hit) {
        AttackState::Hit
    } else {
        AttackState::Miss
    };

    Ok((updated, result))
}

fn evaluate_targets(
    result: &ToHitResult,
    total: i32,
    targets: &[Target<'_>],
    config: &RulesConfig,
) -> Vec<TargetOutcome> {
    let profile = &result.profile;
    let parameters = &result.parameters;
    let always_hits = profile.area_always_hits || profile.adjustment == Some(AdjustmentKind::Aid);

    let mut ordered: Vec<&Target<'_>> = targets.iter().collect();
    if profile.is_explosion() {
        ordered.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }

    let mut outcomes = Vec::new();
    for target in &ordered {
        let value = defense_value(target.character, parameters.defends_with);
        let range_tags = parameters.range_tags(target.distance, profile, config);
        let target_total = total + range_tags.iter().map(|t| t.value).sum::<i32>();

        let mut outcome = TargetOutcome {
            target_id: target.character.id.clone(),
            name: target.character.name.clone(),
            value,
            total: target_total,
            hit: value <= target_total || always_hits,
            by: Some(target_total - value),
            distance: target.distance,
            shot: 0,
            tags: range_tags,
            note: None,
        };
        if let (true, Some(area)) = (profile.is_explosion(), profile.area) {
            outcome.value = 0;
            outcome.hit = true;
            outcome.by = None;
            outcome.note = Some(format!(
                "{:?} {} ({} from center)",
                area.shape, area.size, target.distance
            ));
        }
        tracing::debug!(
            target = %outcome.target_id,
            value = outcome.value,
            total = outcome.total,
            hit = outcome.hit,
            "target evaluated"
        );
        outcomes.push(outcome);
    }

    // Extra autofire shots at a lone target, each at a further -2
    if let [target] = targets {
        let first = outcomes.first().map(|o| (o.total, o.value, o.tags.clone()));
        if let Some((first_total, value, range_tags)) = first {
            for shot in 1..parameters.autofire_shots {
                let shot_total = first_total - 2 * shot as i32;
                let mut tags = range_tags.clone();
                tags.push(Tag::new(-2 * shot as i32, "Autofire"));
                outcomes.push(TargetOutcome {
                    target_id: target.character.id.clone(),
                    name: target.character.name.clone(),
                    value,
                    total: shot_total,
                    hit: value <= shot_total,
                    by: Some(shot_total - value),
                    distance: target.distance,
                    shot,
                    tags,
                    note: None,
                });
            }
        }
    }
    outcomes
}

fn defense_value(target: &Character, defends_with: DefendsWith) -> i32 {
    target.value(defends_with.characteristic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutomationLevel;
    use crate::dice::ScriptedDice;
    use crate::power::{Adder, Modifier, Pool};
    use crate::types::CharacterKind;

    fn attacker() -> Character {
        Character::new("hero", "Hero")
            .with_characteristic(Characteristic::Str, 15)
            .with_characteristic(Characteristic::Ocv, 13)
            .with_characteristic(Characteristic::Dcv, 5)
            .with_characteristic(Characteristic::Spd, 4)
            .with_characteristic(Characteristic::End, 30)
            .with_characteristic(Characteristic::Stun, 30)
            .with_power(PowerInstance::new("eb", "ENERGYBLAST", 8))
            .with_power(PowerInstance::new("punch", "HANDTOHANDATTACK", 2))
    }

    fn defender(id: &str, dcv: i32) -> Character {
        Character::new(id, id.to_uppercase())
            .with_characteristic(Characteristic::Dcv, dcv)
            .with_characteristic(Characteristic::Stun, 20)
    }

    fn all_automation() -> RulesConfig {
        RulesConfig {
            automation: AutomationLevel::All,
            ..RulesConfig::default()
        }
    }

    #[test]
    fn test_hit_and_margin() {
        let target = defender("villain", 3);
        let mut dice = ScriptedDice::new([3, 3, 3]);
        let (_, result) = resolve_to_hit(
            &attacker(),
            "eb",
            &AttackOptions::default(),
            &[Target::new(&target, 5.0)],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        // 11 + 13 - 9 = 15 against DCV 3
        assert_eq!(result.total, 15);
        assert_eq!(result.state, AttackState::Hit);
        assert_eq!(result.targets[0].by, Some(12));
        assert_eq!(result.hit_target_ids(), vec!["villain"]);
    }

    #[test]
    fn test_miss() {
        let target = defender("villain", 12);
        let mut dice = ScriptedDice::new([6, 6, 5]);
        let (_, result) = resolve_to_hit(
            &attacker(),
            "eb",
            &AttackOptions::default(),
            &[Target::new(&target, 5.0)],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.total, 7);
        assert_eq!(result.state, AttackState::Miss);
        assert_eq!(result.targets[0].by, Some(-5));
        assert!(result.hit_target_ids().is_empty());
    }

    #[test]
    fn test_range_penalty_applies_per_target() {
        let near = defender("near", 10);
        let far = defender("far", 10);
        let mut dice = ScriptedDice::new([4, 4, 4]);
        let (_, result) = resolve_to_hit(
            &attacker(),
            "eb",
            &AttackOptions::default(),
            &[Target::new(&near, 8.0), Target::new(&far, 40.0)],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        // 11 + 13 - 12 = 12; the far target is three bands out
        assert!(result.targets[0].hit);
        assert_eq!(result.targets[1].total, 6);
        assert!(!result.targets[1].hit);
    }

    #[test]
    fn test_cannot_act_refuses_before_rolling() {
        let mut stunned = attacker();
        insert_effect(
            &mut stunned,
            TimedEffect::condition("hit", Condition::Stunned).until_next_phase(),
        );
        let mut dice = ScriptedDice::new([1, 1, 1]);
        let err = resolve_to_hit(
            &stunned,
            "eb",
            &AttackOptions::default(),
            &[],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap_err();
        assert!(matches!(err, AttackRefusal::CannotAct { .. }));
        assert_eq!(dice.remaining(), 3);
    }

    #[test]
    fn test_unknown_power_and_non_attack() {
        let hero = attacker().with_power(PowerInstance::new("ff", "FORCEFIELD", 10));
        let mut dice = ScriptedDice::default();
        let catalog = PowerCatalog::with_defaults();
        let config = RulesConfig::default();

        let err = resolve_to_hit(&hero, "nope", &AttackOptions::default(), &[], &catalog, &config, &mut dice)
            .unwrap_err();
        assert!(matches!(err, AttackRefusal::UnknownPower { .. }));

        let err = resolve_to_hit(&hero, "ff", &AttackOptions::default(), &[], &catalog, &config, &mut dice)
            .unwrap_err();
        assert_eq!(err, AttackRefusal::NotAnAttack("FORCEFIELD".to_string()));
    }

    #[test]
    fn test_endurance_written_under_automation() {
        let target = defender("villain", 3);
        let catalog = PowerCatalog::with_defaults();

        let mut dice = ScriptedDice::new([3, 3, 3]);
        let (unchanged, result) = resolve_to_hit(
            &attacker(),
            "eb",
            &AttackOptions::default(),
            &[Target::new(&target, 5.0)],
            &catalog,
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.endurance.as_ref().map(|e| e.amount), Some(4));
        assert_eq!(unchanged.value(Characteristic::End), 30);

        let mut dice = ScriptedDice::new([3, 3, 3]);
        let (spent, _) = resolve_to_hit(
            &attacker(),
            "eb",
            &AttackOptions::default(),
            &[Target::new(&target, 5.0)],
            &catalog,
            &all_automation(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(spent.value(Characteristic::End), 26);
    }

    #[test]
    fn test_strength_adds_endurance() {
        let target = defender("villain", 3);
        let mut dice = ScriptedDice::new([3, 3, 3]);
        let (_, result) = resolve_to_hit(
            &attacker(),
            "punch",
            &AttackOptions::default(),
            &[Target::new(&target, 1.0)],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        // the maneuver itself costs nothing, 15 STR costs 1
        assert_eq!(result.endurance.as_ref().map(|e| e.amount), Some(1));
    }

    #[test]
    fn test_stun_for_endurance() {
        let mut tired = attacker();
        tired.set_value(Characteristic::End, 1);
        let target = defender("villain", 3);
        // 3 END short -> 2d6 STUN, then the to-hit roll
        let mut dice = ScriptedDice::new([4, 5, 3, 3, 3]);
        let (updated, result) = resolve_to_hit(
            &tired,
            "eb",
            &AttackOptions::default(),
            &[Target::new(&target, 5.0)],
            &PowerCatalog::with_defaults(),
            &all_automation(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.stun_for_endurance, 9);
        assert_eq!(updated.value(Characteristic::End), 0);
        assert_eq!(updated.value(Characteristic::Stun), 21);
        assert_eq!(result.total, 15);
    }

    #[test]
    fn test_reserve_refusal() {
        let mut reserve = PowerInstance::new("er", "ENDURANCERESERVE", 20);
        reserve.reserve = Some(Pool { value: 2, max: 20 });
        let mut blast = PowerInstance::new("eb2", "ENERGYBLAST", 8);
        blast.use_end_reserve = true;
        let hero = attacker().with_power(reserve).with_power(blast);

        let mut dice = ScriptedDice::new([3, 3, 3]);
        let err = resolve_to_hit(
            &hero,
            "eb2",
            &AttackOptions::default(),
            &[],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AttackRefusal::ReserveExhausted {
                power: "ENERGYBLAST".to_string(),
                needed: 4,
                available: 2
            }
        );
    }

    #[test]
    fn test_charges_spent_and_exhausted() {
        let gun = PowerInstance::new("gun", "RKA", 2)
            .with_modifier(Modifier::new("CHARGES", -0.5).with_alias("1"));
        let hero = attacker().with_power(gun);
        let target = defender("villain", 3);
        let catalog = PowerCatalog::with_defaults();
        let config = RulesConfig::default();

        let mut dice = ScriptedDice::new([3, 3, 3]);
        let (after, result) = resolve_to_hit(
            &hero,
            "gun",
            &AttackOptions::default(),
            &[Target::new(&target, 5.0)],
            &catalog,
            &config,
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.charges_spent, 1);
        assert_eq!(after.power("gun").and_then(|p| p.charges).map(|c| c.value), Some(0));

        let err = resolve_to_hit(&after, "gun", &AttackOptions::default(), &[], &catalog, &config, &mut dice)
            .unwrap_err();
        assert!(matches!(err, AttackRefusal::NoCharges { .. }));
    }

    #[test]
    fn test_failed_activation_keeps_costs_spent() {
        let gadget = PowerInstance::new("gadget", "ENERGYBLAST", 8)
            .with_modifier(Modifier::new("REQUIRESASKILLROLL", -0.5).with_alias("11-"));
        let hero = attacker().with_power(gadget);
        let target = defender("villain", 3);
        let mut dice = ScriptedDice::new([6, 5, 4, 1, 1, 1]);
        let (after, result) = resolve_to_hit(
            &hero,
            "gadget",
            &AttackOptions::default(),
            &[Target::new(&target, 5.0)],
            &PowerCatalog::with_defaults(),
            &all_automation(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.state, AttackState::ActivationFailed);
        assert!(result.roll.is_none());
        assert!(result.targets.is_empty());
        assert!(after.value(Characteristic::End) < 30);
        assert_eq!(dice.remaining(), 3);
    }

    #[test]
    fn test_haymaker_lingering_dcv_created_once() {
        let target = defender("villain", 3);
        let options = AttackOptions::default().with_maneuver(Maneuver::Haymaker);
        let catalog = PowerCatalog::with_defaults();
        let config = RulesConfig::default();

        let mut dice = ScriptedDice::new([3, 3, 3, 3, 3, 3]);
        let (after, result) = resolve_to_hit(
            &attacker(),
            "punch",
            &options,
            &[Target::new(&target, 1.0)],
            &catalog,
            &config,
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.effects_created.len(), 1);
        assert_eq!(after.value(Characteristic::Dcv), 0);
        let effect = &after.effects[0];
        assert!(effect.expires_next_phase);
        assert_eq!(effect.seconds_remaining, Some(3.0));

        let (again, result) = resolve_to_hit(
            &after,
            "punch",
            &options,
            &[Target::new(&target, 1.0)],
            &catalog,
            &config,
            &mut dice,
        )
        .unwrap();
        assert!(result.effects_created.is_empty());
        assert_eq!(again.value(Characteristic::Dcv), 0);
        assert_eq!(again.effects.len(), 1);
    }

    #[test]
    fn test_dodge_aborts_without_rolling() {
        let mut dice = ScriptedDice::new([3, 3, 3]);
        let (after, result) = resolve_to_hit(
            &attacker(),
            "punch",
            &AttackOptions::default().with_maneuver(Maneuver::Dodge),
            &[],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.state, AttackState::Aborted);
        assert!(result.roll.is_none());
        assert_eq!(dice.remaining(), 3);
        assert_eq!(after.value(Characteristic::Dcv), 8);
        assert!(after.has_condition(Condition::Aborted));
        assert!(!after.can_act());
    }

    #[test]
    fn test_block_rolls_against_pending_attack() {
        let options = AttackOptions {
            pending_attack_ocv: Some(8),
            ..AttackOptions::default().with_maneuver(Maneuver::Block)
        };
        let mut dice = ScriptedDice::new([4, 4, 4]);
        let (after, result) = resolve_to_hit(
            &attacker(),
            "punch",
            &options,
            &[],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.state, AttackState::Aborted);
        let block = result.block.unwrap();
        assert_eq!(block.total, 12);
        assert!(block.success);
        assert!(after.has_condition(Condition::Aborted));
    }

    #[test]
    fn test_autofire_extra_shots_on_single_target() {
        let gun = PowerInstance::new("mg", "RKA", 1)
            .with_modifier(Modifier::new("AUTOFIRE", 0.25).with_alias("5 Shots"));
        let hero = attacker().with_power(gun);
        let target = defender("villain", 6);
        let mut dice = ScriptedDice::new([4, 4, 4]);
        let (_, result) = resolve_to_hit(
            &hero,
            "mg",
            &AttackOptions {
                autofire_shots: Some(4),
                ..AttackOptions::default()
            },
            &[Target::new(&target, 5.0)],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        // 12, 10, 8, 6 against DCV 6
        assert_eq!(result.targets.len(), 4);
        assert_eq!(result.hits_on("villain"), 4);
        assert_eq!(result.targets[3].by, Some(0));
    }

    #[test]
    fn test_explosion_targets_sorted_and_always_hit() {
        let bomb = PowerInstance::new("bomb", "ENERGYBLAST", 6).with_modifier(
            Modifier::new("AOE", 0.0)
                .with_option("RADIUS")
                .with_levels(4)
                .with_adder(Adder::new("EXPLOSION", -0.5)),
        );
        let hero = attacker().with_power(bomb);
        let near = defender("near", 30);
        let far = defender("far", 30);
        let mut dice = ScriptedDice::new([6, 6, 6]);
        let (_, result) = resolve_to_hit(
            &hero,
            "bomb",
            &AttackOptions::default(),
            &[Target::new(&far, 3.0), Target::new(&near, 1.0)],
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.state, AttackState::Hit);
        assert_eq!(result.targets[0].target_id, "near");
        assert!(result.targets.iter().all(|t| t.hit && t.by.is_none()));
        assert!(result.targets[1].note.is_some());
    }

    #[test]
    fn test_npc_only_automation_skips_pc_endurance() {
        let pc = attacker().with_kind(CharacterKind::Pc);
        let config = RulesConfig {
            automation: AutomationLevel::NpcOnly,
            ..RulesConfig::default()
        };
        let mut dice = ScriptedDice::new([3, 3, 3]);
        let (after, result) = resolve_to_hit(
            &pc,
            "eb",
            &AttackOptions::default(),
            &[],
            &PowerCatalog::with_defaults(),
            &config,
            &mut dice,
        )
        .unwrap();
        assert_eq!(result.state, AttackState::RollToHit);
        assert_eq!(after.value(Characteristic::End), 30);
    }
}
