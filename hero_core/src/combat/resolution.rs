//! Damage resolution - landing a hit on one defender

use super::CombatResult;
use crate::adjustment::{apply_sense_affecting, resolve_adjustment};
use crate::attack::{AttackOptions, AttackProfile, AttackRefusal};
use crate::catalog::PowerCatalog;
use crate::character::Character;
use crate::config::RulesConfig;
use crate::damage::{calculate_damage, damage_classes, roll_damage, DamageDice};
use crate::defense::{determine_defenses, DefenseProfile};
use crate::dice::{DamageRoll, DiceRoller};
use crate::effect::{insert_effect, TimedEffect};
use crate::knockback::roll_knockback;
use crate::power::PowerInstance;
use crate::types::{Characteristic, Condition};

/// The dice an attack rolled and what went into them
#[derive(Debug, Clone, PartialEq)]
pub struct RolledDamage {
    pub dice: DamageDice,
    pub roll: DamageRoll,
}

/// Roll damage for a hit with `power_id`
///
/// One roll is shared by every target the attack hit; each target then
/// goes through [`resolve_damage`] with its own copy.
pub fn roll_attack_damage(
    attacker: &Character,
    power_id: &str,
    options: &AttackOptions,
    catalog: &PowerCatalog,
    dice: &mut impl DiceRoller,
) -> Result<RolledDamage, AttackRefusal> {
    let power = find_power(attacker, power_id)?;
    let (profile, costs) = describe(attacker, power, catalog);
    let damage = damage_classes(attacker, power, &profile, &costs, options);
    let roll = roll_damage(&damage.spec, power.standard_effect, dice);
    Ok(RolledDamage { dice: damage, roll })
}

/// One rolled hit about to be applied
#[derive(Debug, Clone, Copy)]
pub struct DamageApplication<'a> {
    pub power_id: &'a str,
    pub roll: &'a DamageRoll,
    /// Distance from an explosion's center; ignored by other attacks
    pub distance: f64,
    pub options: &'a AttackOptions,
}

impl<'a> DamageApplication<'a> {
    pub fn new(power_id: &'a str, roll: &'a DamageRoll, options: &'a AttackOptions) -> Self {
        DamageApplication {
            power_id,
            roll,
            distance: 0.0,
            options,
        }
    }

    pub fn at_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }
}

/// Resolve one hit against one defender
///
/// This function:
/// 1. Works out the defender's defenses against the attack
/// 2. Stops an all-or-nothing AVAD the defender has the defense for
/// 3. Drops explosion dice for distance and dice for Damage Negation
/// 4. Routes the roll to adjustment, sense-affecting or the damage pipeline
/// 5. Rolls knockback and decides stunned / knocked out
/// 6. Writes the result to the defender when the automation level allows it
///
/// Returns the updated attacker (changed only by a Transfer), the updated
/// defender and the combat result.
pub fn resolve_damage(
    attacker: &Character,
    defender: &Character,
    application: DamageApplication<'_>,
    catalog: &PowerCatalog,
    config: &RulesConfig,
    dice: &mut impl DiceRoller,
) -> Result<(Character, Character, CombatResult), AttackRefusal> {
    let power = find_power(attacker, application.power_id)?;
    let (profile, _) = describe(attacker, power, catalog);
    let options = application.options;

    let mut new_attacker = attacker.clone();
    let mut new_defender = defender.clone();
    let mut result = CombatResult::new();
    result.attacker_id = attacker.id.clone();
    result.defender_id = defender.id.clone();
    result.power_id = power.id.clone();

    // Step 1: Defenses
    let mut defenses = determine_defenses(defender, &profile, options.ignore_defense_ids.as_deref());

    // Step 2: All-or-nothing AVAD
    if let Some(avad) = profile.avad.as_ref().filter(|a| a.all_or_nothing) {
        if defenses.avad_total() > 0 {
            let reason = format!("{} did no damage: {} has {}", power.name, defender.name, avad.input);
            tracing::info!(attacker = %attacker.id, defender = %defender.id, "{}", reason);
            result.no_damage_reason = Some(reason);
            result.defenses = defenses;
            record_unchanged(&mut result, defender);
            return Ok((new_attacker, new_defender, result));
        }
        defenses = DefenseProfile {
            kind: defenses.kind,
            ..DefenseProfile::default()
        };
    }

    // Step 3: Explosion falloff and Damage Negation
    let mut roll = application.roll.clone();
    if let Some(area) = profile.area.filter(|a| a.explosion && a.size > 0) {
        let fraction = application.distance / area.size as f64;
        result.explosion_dice_removed = roll.apply_explosion_falloff(fraction);
    }
    if defenses.damage_negation > 0 {
        roll.negate(defenses.damage_negation, profile.killing);
        result.damage_negated = defenses.damage_negation;
    }

    let stun_before = defender.value(Characteristic::Stun);
    let body_before = defender.value(Characteristic::Body);

    // Step 4: Route by what the attack does
    if profile.adjustment.is_some() {
        let (source, target, report) =
            resolve_adjustment(attacker, defender, power.id.as_str(), &roll, &defenses, catalog, config)?;
        result.warnings.extend(report.warnings.iter().cloned());
        result.adjustment = Some(report);
        new_attacker = source;
        new_defender = target;
        result.applied = true;
    } else if profile.sense_affecting {
        let flash_defense = defenses.defense + defenses.resistant;
        let (target, outcome) =
            apply_sense_affecting(&attacker.id, defender, power, &roll, flash_defense);
        result.sense_affecting = Some(outcome);
        new_defender = target;
        result.applied = true;
    } else {
        let detail = calculate_damage(&roll, &profile, &defenses, options, config, dice);
        let mut stun = detail.stun;
        let body = detail.body;
        result.effects.extend(detail.effects.iter().cloned());
        if let Some(label) = detail.location_label() {
            result.effects.push(format!("Hit {label}"));
        }

        // Step 5: Automatons, stunned, knockback
        if takes_no_stun(defender) && stun > 0 {
            stun = 0;
            result.effects.push(format!("{} takes no STUN", defender.name));
        }
        result.stunned = config.use_stunned
            && stun > defender.value(Characteristic::Con)
            && !cannot_be_stunned(defender);
        result.knocked_out = stun_before > 0 && stun > 0 && stun_before - stun <= 0;

        if config.knockback && profile.knockback_multiplier > 0 {
            result.knockback = Some(roll_knockback(
                detail.body_after_defense,
                profile.knockback_multiplier,
                defenses.knockback_resistance,
                options.knockback_mod,
                dice,
            ));
        }

        result.stun_taken = stun;
        result.body_taken = body;
        result.damage = Some(detail);

        // Step 6: Write STUN and BODY
        if config.automation.writes_damage(defender.kind) {
            new_defender.adjust(Characteristic::Stun, -stun);
            new_defender.adjust(Characteristic::Body, -body);
            if result.stunned {
                insert_effect(
                    &mut new_defender,
                    TimedEffect::condition(power.id.clone(), Condition::Stunned)
                        .from_character(attacker.id.clone())
                        .until_next_phase(),
                );
            }
            if result.knocked_out {
                insert_effect(
                    &mut new_defender,
                    TimedEffect::condition(power.id.clone(), Condition::KnockedOut)
                        .from_character(attacker.id.clone()),
                );
            }
            result.applied = true;
        }
    }

    result.defenses = defenses;
    result.stun_before = stun_before;
    result.body_before = body_before;
    result.stun_after = stun_before - result.stun_taken;
    result.body_after = body_before - result.body_taken;

    // Hitting yourself leaves one record, not two
    if attacker.id == defender.id && profile.adjustment.is_none() {
        new_attacker = new_defender.clone();
    }

    tracing::info!(
        attacker = %attacker.id,
        defender = %defender.id,
        power = %power.id,
        applied = result.applied,
        "{}",
        result.summary()
    );

    Ok((new_attacker, new_defender, result))
}

fn find_power<'a>(attacker: &'a Character, power_id: &str) -> Result<&'a PowerInstance, AttackRefusal> {
    attacker
        .power(power_id)
        .ok_or_else(|| AttackRefusal::UnknownPower {
            power: power_id.to_string(),
            character: attacker.name.clone(),
        })
}

fn describe(
    attacker: &Character,
    power: &PowerInstance,
    catalog: &PowerCatalog,
) -> (AttackProfile, crate::cost::PowerCosts) {
    let definition = catalog.lookup(&power.xmlid, attacker.edition);
    let costs = attacker.costs_for(power, catalog);
    let profile = AttackProfile::from_power(power, definition.as_ref(), &costs, attacker.edition);
    (profile, costs)
}

fn record_unchanged(result: &mut CombatResult, defender: &Character) {
    result.stun_before = defender.value(Characteristic::Stun);
    result.stun_after = result.stun_before;
    result.body_before = defender.value(Characteristic::Body);
    result.body_after = result.body_before;
}

fn takes_no_stun(defender: &Character) -> bool {
    defender
        .active_powers("AUTOMATON")
        .any(|p| p.option_is("NOSTUN1") || p.option_is("NOSTUN2"))
}

fn cannot_be_stunned(defender: &Character) -> bool {
    takes_no_stun(defender)
        || defender
            .active_powers("AUTOMATON")
            .any(|p| p.option_is("CANNOTBESTUNNED"))
}
