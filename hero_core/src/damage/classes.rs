//! Damage classes: from a power and its declared options to the dice rolled

use crate::attack::{combat_skill_levels, AttackOptions, AttackProfile};
use crate::catalog::Maneuver;
use crate::character::Character;
use crate::cost::PowerCosts;
use crate::dice::{DamageRoll, DiceRoller, DiceSpec, ExtraDie};
use crate::power::PowerInstance;
use crate::rounding::floor_whole;
use crate::types::{Characteristic, Tag};
use serde::{Deserialize, Serialize};

/// Dice an attack rolls, with the trail of what went into them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageDice {
    pub spec: DiceSpec,
    pub killing: bool,
    /// Damage classes the final formula is worth
    pub dc: f64,
    pub tags: Vec<Tag>,
}

/// The formula bought on the power itself
fn base_spec(power: &PowerInstance) -> DiceSpec {
    if power.xmlid == "TELEKINESIS" {
        // Telekinesis is bought as STR
        return DiceSpec::d6((power.levels.max(0) / 5) as u32);
    }
    let extra = if power.find_adder("PLUSONEHALFDIE").is_some() {
        ExtraDie::HalfDie
    } else if power.find_adder("PLUSONEPIP").is_some() {
        ExtraDie::PlusOnePip
    } else if power.find_adder("MINUSONEPIP").is_some() {
        ExtraDie::MinusOnePip
    } else {
        ExtraDie::None
    };
    DiceSpec::new(power.levels.max(0) as u32, extra)
}

/// Work out the dice for one use of `power`
///
/// Damage classes from outside the power (STR behind a hand-to-hand
/// attack, Haymaker, combat skill levels, anything in `options.extra_dc`)
/// are reduced by the power's damage advantages before being added, so an
/// advantaged attack does not get its advantages twice.
pub fn damage_classes(
    attacker: &Character,
    power: &PowerInstance,
    profile: &AttackProfile,
    costs: &PowerCosts,
    options: &AttackOptions,
) -> DamageDice {
    let killing = profile.killing;
    let base = base_spec(power);
    let mut tags = vec![Tag::new(
        base.damage_classes(killing).floor() as i32,
        power.name.clone(),
    )];

    let mut extra = 0;
    if profile.uses_strength {
        let strength = options
            .effective_str
            .unwrap_or_else(|| attacker.value(Characteristic::Str));
        let str_dc = strength.max(0) / 5;
        if str_dc > 0 {
            extra += str_dc;
            tags.push(Tag::new(str_dc, format!("STR {strength}")));
        }
    }
    if options.has_maneuver(Maneuver::Haymaker) {
        extra += 4;
        tags.push(Tag::new(4, "Haymaker"));
    }
    if options.extra_dc != 0 {
        extra += options.extra_dc;
        tags.push(Tag::new(options.extra_dc, "extra DC"));
    }
    let csl = combat_skill_levels(attacker, power);
    if csl.dc >= 2 {
        extra += csl.dc / 2;
        tags.push(Tag::new(csl.dc / 2, "combat skill levels"));
    }

    let mut spec = base;
    if extra != 0 {
        let scaled = floor_whole(extra as f64 / (1.0 + costs.advantages_dc.max(0.0)));
        if scaled as i32 != extra {
            tags.push(Tag::new(scaled as i32 - extra, "advantages"));
        }
        spec = base.add_damage_classes(scaled, killing);
    }

    let dc = spec.damage_classes(killing);
    tracing::debug!(power = %power.id, %spec, dc, killing, "damage classes");
    DamageDice {
        spec,
        killing,
        dc,
        tags,
    }
}

/// Roll a damage formula, or take its standard effect
pub fn roll_damage(spec: &DiceSpec, standard_effect: bool, dice: &mut impl DiceRoller) -> DamageRoll {
    let roll = if standard_effect {
        spec.standard_effect()
    } else {
        spec.roll(dice)
    };
    tracing::debug!(%spec, faces = ?roll.faces, half_die = ?roll.half_die, total = roll.total(), "damage rolled");
    roll
}
