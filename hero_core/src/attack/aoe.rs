//! Placing an area-of-effect template in open space
//!
//! An area attack aimed at a spot rather than a target rolls against a
//! fixed target number. On a miss the template drifts: a 1d6 direction
//! (1 is straight past the target, counting clockwise) and a distance that
//! grows with the margin of the miss but never exceeds half the range.

use super::error::AttackRefusal;
use super::options::AttackOptions;
use super::range::{effective_range_class, range_penalty};
use crate::catalog::{Maneuver, PowerCatalog};
use crate::character::Character;
use crate::config::RulesConfig;
use crate::dice::{roll_3d6, DiceRoller, RollResult};
use crate::rounding::round_down_i32;
use crate::types::{Characteristic, Edition, Tag};
use serde::{Deserialize, Serialize};

/// Target number for a template placed beyond arm's reach
const PLACEMENT_TARGET_NUMBER: i32 = 3;

/// Where an area template ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AoePlacement {
    /// 0 when the template is placed without a roll
    pub target_number: i32,
    pub roll: Option<RollResult>,
    pub total: i32,
    pub hit: bool,
    pub miss_by: i32,
    /// 1d6 facing of the drift, 0 on a hit
    pub direction: u32,
    /// Drift in the edition's distance unit
    pub move_distance: i32,
    pub tags: Vec<Tag>,
}

fn auto_place_distance(edition: Edition) -> f64 {
    match edition {
        Edition::Fifth => 1.0,
        Edition::Sixth => 2.0,
    }
}

/// Roll to place an area template `distance_to_origin` away
pub fn place_aoe(
    attacker: &Character,
    power_id: &str,
    distance_to_origin: f64,
    options: &AttackOptions,
    catalog: &PowerCatalog,
    config: &RulesConfig,
    dice: &mut impl DiceRoller,
) -> Result<AoePlacement, AttackRefusal> {
    let power = attacker
        .power(power_id)
        .ok_or_else(|| AttackRefusal::UnknownPower {
            power: power_id.to_string(),
            character: attacker.name.clone(),
        })?;
    if let Some(reason) = attacker.cannot_act_reason() {
        return Err(AttackRefusal::CannotAct {
            name: attacker.name.clone(),
            reason,
        });
    }
    let edition = attacker.edition;

    if distance_to_origin <= auto_place_distance(edition) {
        tracing::debug!(power = power_id, distance_to_origin, "area placed without a roll");
        return Ok(AoePlacement {
            target_number: 0,
            roll: None,
            total: 0,
            hit: true,
            miss_by: 0,
            direction: 0,
            move_distance: 0,
            tags: Vec::new(),
        });
    }

    let mut tags = vec![Tag::new(11, "base")];
    tags.push(Tag::new(attacker.value(Characteristic::Ocv), "OCV"));
    if options.ocv_mod != 0 {
        tags.push(Tag::new(options.ocv_mod, &power.name));
    }
    if options.has_maneuver(Maneuver::Set) {
        tags.push(Tag::new(Maneuver::Set.info().ocv, "Set"));
    }
    let definition = catalog.lookup(&power.xmlid, edition);
    let range_class = effective_range_class(power, definition.as_ref());
    let penalty = range_penalty(distance_to_origin, edition, range_class, config);
    if penalty != 0 {
        tags.push(Tag::new(penalty, "range penalty"));
    }
    if options.has_maneuver(Maneuver::Brace) {
        let offset = (-penalty).min(Maneuver::Brace.info().ocv);
        if offset > 0 {
            tags.push(Tag::new(offset, "Brace"));
        }
    }

    let roll = roll_3d6(dice);
    let total = tags.iter().map(|t| t.value).sum::<i32>() - roll.total;
    let hit = total >= PLACEMENT_TARGET_NUMBER;

    let (miss_by, direction, move_distance) = if hit {
        (0, 0, 0)
    } else {
        let miss_by = PLACEMENT_TARGET_NUMBER - total;
        let direction = dice.roll_die(6);
        let drift = match edition {
            Edition::Fifth => miss_by as f64,
            Edition::Sixth => 2.0 * miss_by as f64,
        };
        let move_distance = round_down_i32((distance_to_origin / 2.0).min(drift));
        (miss_by, direction, move_distance)
    };

    tracing::debug!(
        power = power_id,
        roll = roll.total,
        total,
        hit,
        move_distance,
        "area placement"
    );

    Ok(AoePlacement {
        target_number: PLACEMENT_TARGET_NUMBER,
        roll: Some(roll),
        total,
        hit,
        miss_by,
        direction,
        move_distance,
        tags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::power::{Modifier, PowerInstance};

    fn bomber(edition: Edition) -> Character {
        Character::new("b", "Bomber")
            .with_edition(edition)
            .with_characteristic(Characteristic::Ocv, 3)
            .with_characteristic(Characteristic::Stun, 20)
            .with_power(
                PowerInstance::new("ball", "ENERGYBLAST", 6)
                    .with_modifier(Modifier::new("AOE", 0.0).with_option("RADIUS").with_levels(4)),
            )
    }

    #[test]
    fn test_close_placement_needs_no_roll() {
        let mut dice = ScriptedDice::new([6, 6, 6]);
        let placement = place_aoe(
            &bomber(Edition::Sixth),
            "ball",
            2.0,
            &AttackOptions::default(),
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert!(placement.hit);
        assert_eq!(placement.target_number, 0);
        assert_eq!(dice.remaining(), 3);
    }

    #[test]
    fn test_placement_hit() {
        // 11 + 3 - 10 = 4 >= 3
        let mut dice = ScriptedDice::new([3, 3, 4]);
        let placement = place_aoe(
            &bomber(Edition::Sixth),
            "ball",
            6.0,
            &AttackOptions::default(),
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert!(placement.hit);
        assert_eq!(placement.total, 4);
        assert_eq!(placement.move_distance, 0);
    }

    #[test]
    fn test_placement_miss_drifts() {
        // 11 + 3 - 4 (range at 20m) - 14 = -4, missed by 7
        let mut dice = ScriptedDice::new([5, 5, 4, 3]);
        let placement = place_aoe(
            &bomber(Edition::Sixth),
            "ball",
            20.0,
            &AttackOptions::default(),
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert!(!placement.hit);
        assert_eq!(placement.miss_by, 7);
        assert_eq!(placement.direction, 3);
        // min(20 / 2, 2 * 7)
        assert_eq!(placement.move_distance, 10);
    }

    #[test]
    fn test_fifth_edition_drift_is_shorter() {
        // 11 + 3 - 4 (range at 10") - 12 = -2, missed by 5
        let mut dice = ScriptedDice::new([4, 4, 4, 1]);
        let placement = place_aoe(
            &bomber(Edition::Fifth),
            "ball",
            10.0,
            &AttackOptions::default(),
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap();
        assert!(!placement.hit);
        assert_eq!(placement.miss_by, 5);
        assert_eq!(placement.move_distance, 5);
    }

    #[test]
    fn test_unknown_power_is_refused() {
        let mut dice = ScriptedDice::default();
        let err = place_aoe(
            &bomber(Edition::Sixth),
            "missing",
            10.0,
            &AttackOptions::default(),
            &PowerCatalog::with_defaults(),
            &RulesConfig::default(),
            &mut dice,
        )
        .unwrap_err();
        assert!(matches!(err, AttackRefusal::UnknownPower { .. }));
    }
}
