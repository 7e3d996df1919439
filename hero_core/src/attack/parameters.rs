//! Everything that goes into the attack roll before the dice

use super::options::AttackOptions;
use super::profile::AttackProfile;
use super::range::range_penalty;
use crate::catalog::{HitLocation, Maneuver};
use crate::character::Character;
use crate::config::RulesConfig;
use crate::power::PowerInstance;
use crate::types::{CombatValue, DefendsWith, Tag};
use serde::{Deserialize, Serialize};

/// Combat skill levels the attacker has allocated to one attack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSkillLevels {
    pub ocv: i32,
    pub omcv: i32,
    pub dcv: i32,
    pub dmcv: i32,
    pub dc: i32,
    /// Names of the skills contributing
    pub sources: Vec<String>,
}

/// Sum the allocations of every combat skill level usable with `power`
///
/// A skill without adders covers every attack; otherwise one of its adders
/// must name the power.
pub fn combat_skill_levels(attacker: &Character, power: &PowerInstance) -> CombatSkillLevels {
    let mut levels = CombatSkillLevels::default();
    for skill in attacker.powers.iter().filter(|p| {
        p.active && matches!(p.xmlid.as_str(), "COMBAT_LEVELS" | "MENTAL_COMBAT_LEVELS")
    }) {
        let Some(allocation) = skill.combat_levels else {
            continue;
        };
        let applies = skill.adders.is_empty()
            || skill.adders.iter().any(|a| {
                a.option_id.as_deref() == Some(power.id.as_str())
                    || a.option_id.as_deref() == Some(power.name.as_str())
            });
        if !applies {
            continue;
        }
        levels.ocv += allocation.ocv;
        levels.omcv += allocation.omcv;
        levels.dcv += allocation.dcv;
        levels.dmcv += allocation.dmcv;
        levels.dc += allocation.dc;
        levels.sources.push(skill.name.clone());
    }
    levels
}

/// Shots an autofire power can fire at once
pub fn autofire_max_shots(power: &PowerInstance) -> u32 {
    let Some(autofire) = power.find_modifier("AUTOFIRE") else {
        return 0;
    };
    let shots = autofire.option_number().unwrap_or(0).max(0) as u32;
    let doublings = autofire
        .find_adder("DOUBLE")
        .map(|a| a.levels.clamp(0, 16) as u32)
        .unwrap_or(0);
    shots << doublings
}

/// Derived, per-attempt attack parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackParameters {
    pub combat_value: CombatValue,
    pub defends_with: DefendsWith,
    /// Attacker's OCV or OMCV
    pub base_value: i32,
    /// Non-zero modifiers applying to every target
    pub modifiers: Vec<Tag>,
    /// Aimed location, when hit locations are in play for this attack
    pub aim: Option<HitLocation>,
    pub maneuvers: Vec<Maneuver>,
    /// Brace is declared (offsets range penalties only)
    pub brace: i32,
    pub autofire_shots: u32,
    /// DCV change lasting until the attacker's next phase
    pub lingering_dcv: i32,
    pub lingering_dmcv: i32,
    pub combat_levels: CombatSkillLevels,
    pub warnings: Vec<String>,
}

impl AttackParameters {
    pub fn build(
        attacker: &Character,
        power: &PowerInstance,
        profile: &AttackProfile,
        options: &AttackOptions,
        config: &RulesConfig,
    ) -> Self {
        let mut modifiers = Vec::new();
        let mut warnings = Vec::new();
        let mut push = |value: i32, label: &str| {
            if value != 0 {
                modifiers.push(Tag::new(value, label));
            }
        };

        push(options.ocv_mod, &power.name);

        let mut maneuvers = Vec::new();
        let mut brace = 0;
        let mut maneuver_dcv = 0;
        for maneuver in &options.maneuvers {
            let info = maneuver.info();
            if info.optional && !config.optional_maneuvers {
                let message = format!("{} is an optional maneuver and is not in use", info.name);
                tracing::warn!("{}", message);
                warnings.push(message);
                continue;
            }
            maneuvers.push(*maneuver);
            if *maneuver == Maneuver::Brace {
                brace = info.ocv;
                continue;
            }
            push(info.ocv, info.name);
            maneuver_dcv += info.dcv;
        }

        if options.multiple_attack > 1 {
            push(-2 * (options.multiple_attack as i32 - 1), "Multiple Attack");
        }

        let combat_levels = combat_skill_levels(attacker, power);
        let csl_bonus = match profile.combat_value {
            CombatValue::Ocv => combat_levels.ocv,
            CombatValue::Omcv => combat_levels.omcv,
        };
        push(csl_bonus, "Combat Skill Levels");

        let aim = options
            .aim
            .filter(|_| config.hit_locations && !profile.no_hit_locations);
        if let Some(location) = aim {
            let penalty = location.multipliers().ocv;
            push(penalty, &location.to_string());
            if options.use_psl {
                if let Some(psl) = attacker
                    .powers
                    .iter()
                    .find(|p| p.active && p.xmlid == "PENALTY_SKILL_LEVELS")
                {
                    push(psl.levels.min(penalty.abs()).max(0), &psl.name);
                }
            }
        }

        let declared_shots = autofire_max_shots(power);
        let autofire_shots = options
            .autofire_shots
            .map(|s| s.min(declared_shots))
            .unwrap_or(declared_shots);

        AttackParameters {
            combat_value: profile.combat_value,
            defends_with: profile.defends_with,
            base_value: attacker.value(profile.combat_value.characteristic()),
            modifiers,
            aim,
            maneuvers,
            brace,
            autofire_shots,
            lingering_dcv: power.dcv + options.dcv_mod + combat_levels.dcv + maneuver_dcv,
            lingering_dmcv: combat_levels.dmcv,
            combat_levels,
            warnings,
        }
    }

    /// Sum of the modifiers that apply to every target
    pub fn total_modifier(&self) -> i32 {
        self.modifiers.iter().map(|t| t.value).sum()
    }

    /// Range modifier and Brace offset for a target at `distance`
    pub fn range_tags(
        &self,
        distance: f64,
        profile: &AttackProfile,
        config: &RulesConfig,
    ) -> Vec<Tag> {
        let mut tags = Vec::new();
        if self.combat_value != CombatValue::Ocv {
            return tags;
        }
        let penalty = range_penalty(distance, profile.edition, profile.range, config);
        if penalty != 0 {
            tags.push(Tag::new(penalty, "range penalty"));
        }
        let offset = (-penalty).min(self.brace);
        if offset > 0 {
            tags.push(Tag::new(offset, "Brace"));
        }
        tags
    }

    pub fn has_maneuver(&self, maneuver: Maneuver) -> bool {
        self.maneuvers.contains(&maneuver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PowerCatalog;
    use crate::cost::{compute_costs, CostContext};
    use crate::power::{Adder, CombatLevelAllocation, Modifier};
    use crate::types::{Characteristic, Edition};

    fn setup(power: PowerInstance) -> (Character, PowerInstance, AttackProfile) {
        let catalog = PowerCatalog::with_defaults();
        let definition = catalog.lookup(&power.xmlid, Edition::Sixth);
        let costs = compute_costs(&power, &CostContext::new(&catalog, Edition::Sixth));
        let profile = AttackProfile::from_power(&power, definition.as_ref(), &costs, Edition::Sixth);
        let attacker = Character::new("a", "Attacker")
            .with_characteristic(Characteristic::Ocv, 7)
            .with_characteristic(Characteristic::Omcv, 4);
        (attacker, power, profile)
    }

    #[test]
    fn test_zero_modifiers_are_not_listed() {
        let (attacker, power, profile) = setup(PowerInstance::new("eb", "ENERGYBLAST", 8));
        let params = AttackParameters::build(
            &attacker,
            &power,
            &profile,
            &AttackOptions::default(),
            &RulesConfig::default(),
        );
        assert_eq!(params.base_value, 7);
        assert!(params.modifiers.is_empty());
        assert_eq!(params.total_modifier(), 0);
    }

    #[test]
    fn test_set_haymaker_and_multiple_attack() {
        let (attacker, power, profile) = setup(PowerInstance::new("punch", "HANDTOHANDATTACK", 2));
        let options = AttackOptions {
            ocv_mod: 1,
            multiple_attack: 3,
            ..AttackOptions::default()
        }
        .with_maneuver(Maneuver::Set)
        .with_maneuver(Maneuver::Haymaker);
        let params =
            AttackParameters::build(&attacker, &power, &profile, &options, &RulesConfig::default());
        // +1 free, +1 Set, -4 Multiple Attack
        assert_eq!(params.total_modifier(), -2);
        assert_eq!(params.lingering_dcv, -5);
    }

    #[test]
    fn test_optional_maneuver_needs_rule() {
        let (attacker, power, profile) = setup(PowerInstance::new("eb", "ENERGYBLAST", 8));
        let options = AttackOptions::default().with_maneuver(Maneuver::SnapShot);
        let params =
            AttackParameters::build(&attacker, &power, &profile, &options, &RulesConfig::default());
        assert_eq!(params.total_modifier(), 0);
        assert_eq!(params.warnings.len(), 1);

        let config = RulesConfig {
            optional_maneuvers: true,
            ..RulesConfig::default()
        };
        let params = AttackParameters::build(&attacker, &power, &profile, &options, &config);
        assert_eq!(params.total_modifier(), -1);
    }

    #[test]
    fn test_aim_with_penalty_skill_levels() {
        let (attacker, power, profile) = setup(PowerInstance::new("eb", "ENERGYBLAST", 8));
        let attacker = attacker.with_power(PowerInstance::new("psl", "PENALTY_SKILL_LEVELS", 3));
        let config = RulesConfig {
            hit_locations: true,
            ..RulesConfig::default()
        };
        let options = AttackOptions {
            use_psl: true,
            ..AttackOptions::default().aimed_at(HitLocation::Head)
        };
        let params = AttackParameters::build(&attacker, &power, &profile, &options, &config);
        // -8 head, +3 PSL
        assert_eq!(params.total_modifier(), -5);
        assert_eq!(params.aim, Some(HitLocation::Head));

        // without the hit location rule the aim is ignored
        let params =
            AttackParameters::build(&attacker, &power, &profile, &options, &RulesConfig::default());
        assert_eq!(params.total_modifier(), 0);
        assert_eq!(params.aim, None);
    }

    #[test]
    fn test_combat_skill_levels_apply_to_named_attack() {
        let (attacker, power, profile) = setup(PowerInstance::new("eb", "ENERGYBLAST", 8));
        let mut broad = PowerInstance::new("csl1", "COMBAT_LEVELS", 2);
        broad.combat_levels = Some(CombatLevelAllocation {
            ocv: 1,
            dcv: 1,
            ..CombatLevelAllocation::default()
        });
        let mut other = PowerInstance::new("csl2", "COMBAT_LEVELS", 3);
        other.combat_levels = Some(CombatLevelAllocation {
            ocv: 3,
            ..CombatLevelAllocation::default()
        });
        let mut other_adder = Adder::new("ATTACK", 0.0);
        other_adder.option_id = Some("sword".to_string());
        other.adders.push(other_adder);

        let attacker = attacker.with_power(broad).with_power(other);
        let params = AttackParameters::build(
            &attacker,
            &power,
            &profile,
            &AttackOptions::default(),
            &RulesConfig::default(),
        );
        assert_eq!(params.total_modifier(), 1);
        assert_eq!(params.lingering_dcv, 1);
        assert_eq!(params.combat_levels.sources.len(), 1);
    }

    #[test]
    fn test_brace_only_offsets_range() {
        let (attacker, power, profile) = setup(PowerInstance::new("eb", "ENERGYBLAST", 8));
        let options = AttackOptions::default().with_maneuver(Maneuver::Brace);
        let config = RulesConfig::default();
        let params = AttackParameters::build(&attacker, &power, &profile, &options, &config);
        assert_eq!(params.total_modifier(), 0);

        let near = params.range_tags(4.0, &profile, &config);
        assert!(near.is_empty());

        let far = params.range_tags(64.0, &profile, &config);
        assert_eq!(far.iter().map(|t| t.value).sum::<i32>(), -4);

        let one_band = params.range_tags(16.0, &profile, &config);
        assert_eq!(one_band.iter().map(|t| t.value).sum::<i32>(), 0);
    }

    #[test]
    fn test_autofire_shots() {
        let power = PowerInstance::new("mg", "RKA", 2).with_modifier(
            Modifier::new("AUTOFIRE", 0.25)
                .with_alias("5 Shots")
                .with_adder(Adder::new("DOUBLE", 0.25).with_levels(1)),
        );
        assert_eq!(autofire_max_shots(&power), 10);
        assert_eq!(autofire_max_shots(&PowerInstance::new("eb", "ENERGYBLAST", 8)), 0);
    }
}
