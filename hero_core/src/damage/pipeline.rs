//! The damage pipeline: from a rolled formula to STUN and BODY taken
//!
//! Stage order matters. Killing attacks multiply BODY by the hit location
//! after resistant defense, normal attacks multiply both STUN and BODY
//! after every defense, and the minimum damage rule runs before the
//! penetrating override.

use crate::attack::{AttackOptions, AttackProfile};
use crate::catalog::{HitLocation, Side};
use crate::config::{HitLocationTracking, RulesConfig};
use crate::defense::DefenseProfile;
use crate::dice::{count_body, roll_3d6, DamageRoll, DiceRoller, RollResult};
use crate::rounding::{ceil_whole, round_down_i32};
use crate::types::StunBodyDamage;
use serde::{Deserialize, Serialize};

/// Every number the pipeline produced, stage by stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageDetail {
    pub roll: DamageRoll,
    pub dice_total: i32,
    pub killing: bool,
    /// STUN and BODY before any defense
    pub stun_rolled: i32,
    pub body_rolled: i32,
    /// BODY counted from the faces (1 -> 0, 6 -> 2)
    pub counted_body: i32,
    pub stun_multiplier: i32,
    pub stun_multiplier_roll: Option<RollResult>,
    pub hit_location: Option<HitLocation>,
    pub side: Option<Side>,
    pub location_roll: Option<RollResult>,
    /// Minimum BODY of a penetrating attack, after impenetrable defense
    pub penetrating_body: i32,
    pub stun_after_defense: i32,
    pub body_after_defense: i32,
    /// Final STUN and BODY
    pub stun: i32,
    pub body: i32,
    /// Notes such as "minimum damage invoked"
    pub effects: Vec<String>,
}

impl DamageDetail {
    /// "Hit Left Arm" style label, when a location was struck
    pub fn location_label(&self) -> Option<String> {
        self.hit_location.map(|location| match self.side {
            Some(side) => format!("{side} {location}"),
            None => location.to_string(),
        })
    }
}

fn roll_stun_multiplier(attack: &AttackProfile, dice: &mut impl DiceRoller) -> RollResult {
    if attack.edition.is_fifth() {
        let die = dice.roll_die(6);
        RollResult {
            faces: vec![die],
            total: (die as i32 - 1).max(1),
        }
    } else {
        RollResult::from_faces(vec![dice.roll_die(3)])
    }
}

/// BODY of a Reduced Penetration attack: each half meets the defense on its own
fn reduced_penetration_body(body: i32, body_defense: i32) -> i32 {
    let half = body as f64 / 2.0;
    let first = ceil_whole(half) as i32;
    let second = body - first;
    (first - body_defense).max(0) + (second - body_defense).max(0)
}

/// Run a rolled damage formula through defenses and rules
///
/// `defense` should come from [`crate::defense::determine_defenses`]; damage
/// negation is expected to have been taken off `roll` already.
pub fn calculate_damage(
    roll: &DamageRoll,
    attack: &AttackProfile,
    defense: &DefenseProfile,
    options: &AttackOptions,
    config: &RulesConfig,
    dice: &mut impl DiceRoller,
) -> DamageDetail {
    let killing = attack.killing;
    let mut detail = DamageDetail {
        roll: roll.clone(),
        killing,
        stun_multiplier: 1,
        ..Default::default()
    };

    // Step 1: Dice total
    detail.dice_total = roll.total();
    detail.counted_body = roll.counted_body();

    // Step 2: Penetrating minimum
    if attack.penetrating > 0 {
        detail.penetrating_body = (count_body(&roll.faces) - defense.impenetrable).max(0);
    }

    // Step 3: Hit location
    let location = if config.hit_locations && !attack.no_hit_locations {
        let location = match options.aim {
            Some(aimed) => Some(aimed),
            None => {
                let location_roll = roll_3d6(dice);
                let location = HitLocation::from_roll(location_roll.total);
                detail.location_roll = Some(location_roll);
                location
            }
        };
        if let Some(location) = location {
            if config.hit_location_tracking == HitLocationTracking::All && location.is_sided() {
                detail.side = Some(if dice.roll_die(2) == 1 {
                    Side::Left
                } else {
                    Side::Right
                });
            }
        }
        location
    } else {
        None
    };
    detail.hit_location = location;
    let multipliers = location.map(|l| l.multipliers());

    // Step 4: STUN and BODY split
    let mut stun;
    let mut body;
    if killing {
        body = detail.dice_total;
        let multiplier = match (options.stun_multiplier, multipliers) {
            (Some(declared), _) => declared,
            (None, Some(m)) => round_down_i32(m.stun),
            (None, None) => {
                let rolled = roll_stun_multiplier(attack, dice);
                let multiplier = rolled.total + attack.stun_multiplier_levels;
                detail.stun_multiplier_roll = Some(rolled);
                multiplier
            }
        };
        detail.stun_multiplier = multiplier.max(1);
        stun = body * detail.stun_multiplier;
    } else {
        stun = detail.dice_total;
        body = detail.counted_body;
    }
    detail.stun_rolled = stun;
    detail.body_rolled = body;

    // Step 5: Reduced Penetration splits BODY in two against its defense
    let body_defense = if killing {
        defense.resistant
    } else {
        defense.defense + defense.resistant
    };
    let body_defended = attack.reduced_penetration;
    if body_defended {
        body = reduced_penetration_body(body, body_defense);
    }

    // Step 6: Defenses
    stun -= defense.defense + defense.resistant;
    if !body_defended {
        body -= body_defense;
    }
    stun = stun.max(0);
    body = body.max(0);
    detail.stun_after_defense = stun;
    detail.body_after_defense = body;

    // Step 7: Location multipliers
    if let Some(m) = multipliers {
        if killing {
            body = round_down_i32(body as f64 * m.body);
        } else {
            stun = round_down_i32(stun as f64 * m.normal_stun);
            body = round_down_i32(body as f64 * m.body);
        }
    }

    // Step 8: Damage reduction
    if defense.damage_reduction > 0 {
        let keep = 1.0 - defense.damage_reduction.min(100) as f64 / 100.0;
        stun = round_down_i32(stun as f64 * keep);
        body = round_down_i32(body as f64 * keep);
    }

    // Step 9: Minimum damage
    if stun < body {
        stun = body;
        detail.effects.push("minimum damage invoked".to_string());
    }

    // Step 10: Penetrating override
    if detail.penetrating_body > body && killing {
        body = detail.penetrating_body;
        stun = stun.max(body * detail.stun_multiplier);
        detail.effects.push("penetrating damage".to_string());
    } else if detail.penetrating_body > stun && !killing {
        stun = detail.penetrating_body;
        detail.effects.push("penetrating damage".to_string());
    }

    // Step 11: STUN only, BODY only, effect only
    match attack.stun_body {
        StunBodyDamage::StunBody => {}
        StunBodyDamage::StunOnly => body = 0,
        StunBodyDamage::BodyOnly => stun = 0,
        StunBodyDamage::EffectOnly => {
            stun = 0;
            body = 0;
        }
    }

    detail.stun = stun;
    detail.body = body;
    tracing::debug!(
        power = %attack.power_id,
        total = detail.dice_total,
        stun,
        body,
        location = ?detail.hit_location,
        "damage calculated"
    );
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PowerCatalog;
    use crate::cost::{compute_costs, CostContext};
    use crate::dice::ScriptedDice;
    use crate::power::{Modifier, PowerInstance};
    use crate::types::Edition;
    use proptest::prelude::*;

    fn profile(power: &PowerInstance, edition: Edition) -> AttackProfile {
        let catalog = PowerCatalog::with_defaults();
        let definition = catalog.lookup(&power.xmlid, edition);
        let costs = compute_costs(power, &CostContext::new(&catalog, edition));
        AttackProfile::from_power(power, definition.as_ref(), &costs, edition)
    }

    fn defenses(defense: i32, resistant: i32) -> DefenseProfile {
        DefenseProfile {
            defense,
            resistant,
            ..Default::default()
        }
    }

    #[test]
    fn test_normal_attack_counts_body() {
        let attack = profile(&PowerInstance::new("eb", "ENERGYBLAST", 4), Edition::Sixth);
        let roll = DamageRoll::from_faces(vec![6, 1, 3, 4]);
        let mut dice = ScriptedDice::default();
        let detail = calculate_damage(
            &roll,
            &attack,
            &defenses(5, 0),
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        assert_eq!(detail.stun_rolled, 14);
        assert_eq!(detail.body_rolled, 4);
        assert_eq!(detail.stun, 9);
        assert_eq!(detail.body, 0);
    }

    #[test]
    fn test_killing_attack_rolls_stun_multiplier() {
        let attack = profile(&PowerInstance::new("rka", "RKA", 3), Edition::Sixth);
        let roll = DamageRoll::from_faces(vec![6, 6, 1]);
        let mut dice = ScriptedDice::new([2]);
        let detail = calculate_damage(
            &roll,
            &attack,
            &DefenseProfile::default(),
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        assert_eq!(detail.body_rolled, 13);
        assert_eq!(detail.stun_multiplier, 2);
        assert_eq!(detail.stun_rolled, 26);
        assert_eq!(detail.stun, 26);
        assert_eq!(detail.body, 13);
    }

    #[test]
    fn test_killing_defenses() {
        let attack = profile(&PowerInstance::new("rka", "RKA", 3), Edition::Sixth);
        let roll = DamageRoll::from_faces(vec![5, 5, 2]);
        let options = AttackOptions {
            stun_multiplier: Some(3),
            ..AttackOptions::new()
        };
        let mut dice = ScriptedDice::default();
        let detail = calculate_damage(
            &roll,
            &attack,
            &defenses(10, 8),
            &options,
            &RulesConfig::default(),
            &mut dice,
        );
        // STUN 36 - 18, BODY 12 - 8
        assert_eq!(detail.stun, 18);
        assert_eq!(detail.body, 4);
        assert!(detail.stun_multiplier_roll.is_none());
    }

    #[test]
    fn test_fifth_edition_stun_multiplier_floor() {
        let attack = profile(&PowerInstance::new("hka", "HKA", 1), Edition::Fifth);
        let roll = DamageRoll::from_faces(vec![4]);
        let mut dice = ScriptedDice::new([1]);
        let detail = calculate_damage(
            &roll,
            &attack,
            &DefenseProfile::default(),
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        assert_eq!(detail.stun_multiplier, 1);
        assert_eq!(detail.stun, 4);
    }

    #[test]
    fn test_increased_stun_multiplier_adds_to_roll() {
        let power = PowerInstance::new("rka", "RKA", 1)
            .with_modifier(Modifier::new("INCREASEDSTUNMULTIPLIER", 0.25).with_levels(1));
        let attack = profile(&power, Edition::Sixth);
        let mut dice = ScriptedDice::new([3]);
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![5]),
            &attack,
            &DefenseProfile::default(),
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        assert_eq!(detail.stun_multiplier, 4);
        assert_eq!(detail.stun, 20);
    }

    #[test]
    fn test_hit_location_multipliers() {
        let config = RulesConfig {
            hit_locations: true,
            ..RulesConfig::default()
        };

        // Killing attack to the head: x5 STUN, x2 BODY after resistant defense
        let rka = profile(&PowerInstance::new("rka", "RKA", 2), Edition::Sixth);
        let options = AttackOptions::new().aimed_at(HitLocation::Head);
        let mut dice = ScriptedDice::default();
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![4, 4]),
            &rka,
            &defenses(10, 5),
            &options,
            &config,
            &mut dice,
        );
        assert_eq!(detail.stun_multiplier, 5);
        // STUN 40 - 15 = 25, BODY (8 - 5) x 2 = 6
        assert_eq!(detail.stun, 25);
        assert_eq!(detail.body, 6);
        assert!(detail.location_roll.is_none());

        // Normal attack rolled to the leg: x1/2 STUN and BODY after defenses
        let eb = profile(&PowerInstance::new("eb", "ENERGYBLAST", 6), Edition::Sixth);
        let mut dice = ScriptedDice::new([5, 5, 5]);
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![6, 6, 6, 6, 6, 6]),
            &eb,
            &defenses(6, 0),
            &AttackOptions::new(),
            &config,
            &mut dice,
        );
        assert_eq!(detail.hit_location, Some(HitLocation::Leg));
        assert!(detail.side.is_none());
        // STUN (36 - 6) / 2 = 15, BODY (12 - 6) / 2 = 3
        assert_eq!(detail.stun, 15);
        assert_eq!(detail.body, 3);
    }

    #[test]
    fn test_sided_location_rolls_side() {
        let config = RulesConfig {
            hit_locations: true,
            hit_location_tracking: HitLocationTracking::All,
            ..RulesConfig::default()
        };
        let eb = profile(&PowerInstance::new("eb", "ENERGYBLAST", 1), Edition::Sixth);
        let options = AttackOptions::new().aimed_at(HitLocation::Arm);
        let mut dice = ScriptedDice::new([2]);
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![3]),
            &eb,
            &DefenseProfile::default(),
            &options,
            &config,
            &mut dice,
        );
        assert_eq!(detail.side, Some(Side::Right));
        assert_eq!(detail.location_label().as_deref(), Some("Right Arm"));
    }

    #[test]
    fn test_no_hit_locations_power_skips_location() {
        let config = RulesConfig {
            hit_locations: true,
            ..RulesConfig::default()
        };
        let mut power = PowerInstance::new("eb", "ENERGYBLAST", 2);
        power.no_hit_locations = true;
        let attack = profile(&power, Edition::Sixth);
        let mut dice = ScriptedDice::new([1, 1, 1]);
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![4, 4]),
            &attack,
            &DefenseProfile::default(),
            &AttackOptions::new(),
            &config,
            &mut dice,
        );
        assert!(detail.hit_location.is_none());
        assert_eq!(dice.remaining(), 3);
    }

    #[test]
    fn test_damage_reduction_and_minimum_damage() {
        let attack = profile(&PowerInstance::new("eb", "ENERGYBLAST", 3), Edition::Sixth);
        let mut defense = defenses(0, 0);
        defense.damage_reduction = 50;
        let mut dice = ScriptedDice::default();
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![5, 5, 3]),
            &attack,
            &defense,
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        // STUN 13 * 0.5 = 6.5 -> 6, BODY 3 * 0.5 = 1.5 -> 1
        assert_eq!(detail.stun, 6);
        assert_eq!(detail.body, 1);

        // RKA against lots of PD and little rPD: BODY gets through, STUN doesn't
        let rka = profile(&PowerInstance::new("rka", "RKA", 2), Edition::Sixth);
        let options = AttackOptions {
            stun_multiplier: Some(1),
            ..AttackOptions::new()
        };
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![6, 6]),
            &rka,
            &defenses(20, 2),
            &options,
            &RulesConfig::default(),
            &mut dice,
        );
        assert_eq!(detail.body, 10);
        assert_eq!(detail.stun, 10);
        assert!(detail.effects.contains(&"minimum damage invoked".to_string()));
    }

    #[test]
    fn test_penetrating_minimum() {
        let power = PowerInstance::new("eb", "ENERGYBLAST", 4)
            .with_modifier(Modifier::new("PENETRATING", 0.5).with_levels(1));
        let attack = profile(&power, Edition::Sixth);
        let mut defense = defenses(30, 0);
        defense.impenetrable = 1;
        let mut dice = ScriptedDice::default();
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![6, 6, 4, 2]),
            &attack,
            &defense,
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        // counted 6 BODY, 1 stopped by impenetrable defense
        assert_eq!(detail.penetrating_body, 5);
        assert_eq!(detail.stun, 5);
        assert_eq!(detail.body, 0);
        assert!(detail.effects.contains(&"penetrating damage".to_string()));
    }

    #[test]
    fn test_reduced_penetration_splits_body() {
        let power = PowerInstance::new("rka", "RKA", 2)
            .with_modifier(Modifier::new("REDUCEDPENETRATION", -0.25));
        let attack = profile(&power, Edition::Sixth);
        let options = AttackOptions {
            stun_multiplier: Some(2),
            ..AttackOptions::new()
        };
        let mut dice = ScriptedDice::default();
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![6, 5]),
            &attack,
            &defenses(0, 4),
            &options,
            &RulesConfig::default(),
            &mut dice,
        );
        // BODY 11 splits 6 + 5, each half meets 4 rPD: 2 + 1
        assert_eq!(detail.body, 3);
        assert_eq!(detail.stun, 18);
    }

    #[test]
    fn test_stun_only_and_zero_dice() {
        let mut power = PowerInstance::new("eb", "ENERGYBLAST", 3);
        power.stun_body = Some(StunBodyDamage::StunOnly);
        let attack = profile(&power, Edition::Sixth);
        let mut dice = ScriptedDice::default();
        let detail = calculate_damage(
            &DamageRoll::from_faces(vec![4, 4, 4]),
            &attack,
            &DefenseProfile::default(),
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        assert_eq!(detail.stun, 12);
        assert_eq!(detail.body, 0);

        let detail = calculate_damage(
            &DamageRoll::default(),
            &attack,
            &defenses(5, 5),
            &AttackOptions::new(),
            &RulesConfig::default(),
            &mut dice,
        );
        assert_eq!(detail.stun, 0);
        assert_eq!(detail.body, 0);
    }

    proptest! {
        #[test]
        fn prop_stun_never_below_body(
            faces in prop::collection::vec(1u32..=6, 0..12),
            killing in any::<bool>(),
            multiplier in 1i32..=5,
            defense in 0i32..30,
            resistant in 0i32..30,
            reduction in 0i32..=75,
        ) {
            let xmlid = if killing { "RKA" } else { "ENERGYBLAST" };
            let attack = profile(&PowerInstance::new("p", xmlid, faces.len() as i32), Edition::Sixth);
            let mut pool = defenses(defense, resistant);
            pool.damage_reduction = reduction;
            let options = AttackOptions { stun_multiplier: Some(multiplier), ..AttackOptions::new() };
            let mut dice = ScriptedDice::default();
            let detail = calculate_damage(
                &DamageRoll::from_faces(faces),
                &attack,
                &pool,
                &options,
                &RulesConfig::default(),
                &mut dice,
            );
            prop_assert!(detail.stun_after_defense >= 0);
            prop_assert!(detail.body_after_defense >= 0);
            prop_assert!(detail.stun >= detail.body);
        }
    }
}
