//! Defenses whose use against an attack is a judgment call
//!
//! The engine never asks; it lists the options with a default choice, and
//! the caller passes back the ids it wants ignored.

use super::DefenseKind;
use crate::attack::AttackProfile;
use crate::catalog::AdjustmentKind;
use crate::character::Character;
use crate::power::PowerInstance;
use serde::{Deserialize, Serialize};

/// Powers the defense engine reads
pub(super) const DEFENSE_POWERS: &[&str] = &[
    "PD",
    "ED",
    "FORCEFIELD",
    "ARMOR",
    "FORCEWALL",
    "DAMAGERESISTANCE",
    "COMBAT_LUCK",
    "DENSITYINCREASE",
    "GROWTH",
    "POWERDEFENSE",
    "MENTALDEFENSE",
    "FLASHDEFENSE",
    "DAMAGEREDUCTION",
    "DAMAGENEGATION",
    "KBRESISTANCE",
];

/// A defense offered for confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseOption {
    pub power_id: String,
    pub name: String,
    /// Default choice: applied unless the caller says otherwise
    pub applied: bool,
    pub reason: String,
}

fn is_conditional(power: &PowerInstance) -> bool {
    power.has("ONLYAGAINSTLIMITEDTYPE") || power.has("CONDITIONALPOWER")
}

/// Conditional defenses the defender could bring against `attack`
///
/// Defenses limited to certain attacks are offered and default to applied.
/// Against an AVAD attack every defense is offered (Life Support too), and
/// only those matching the attack's named defense default to applied. Aid
/// is never defended against.
pub fn conditional_defense_options(
    defender: &Character,
    attack: &AttackProfile,
) -> Vec<DefenseOption> {
    if attack.adjustment == Some(AdjustmentKind::Aid) {
        return Vec::new();
    }
    let avad = attack.avad.as_ref();

    defender
        .powers
        .iter()
        .filter(|p| p.active)
        .filter(|p| {
            let defense = DEFENSE_POWERS.contains(&p.xmlid.as_str());
            (defense && (is_conditional(p) || avad.is_some()))
                || (avad.is_some() && p.xmlid == "LIFESUPPORT")
        })
        .map(|p| match avad {
            Some(avad) => {
                let applied = avad_matches(&avad.input, p);
                DefenseOption {
                    power_id: p.id.clone(),
                    name: p.name.clone(),
                    applied,
                    reason: if applied {
                        format!("matches {}", avad.input)
                    } else {
                        format!("does not match {}", avad.input)
                    },
                }
            }
            None => DefenseOption {
                power_id: p.id.clone(),
                name: p.name.clone(),
                applied: true,
                reason: "conditional defense".to_string(),
            },
        })
        .collect()
}

/// Ids of the options that default to not applied
pub fn default_ignored(options: &[DefenseOption]) -> Vec<String> {
    options
        .iter()
        .filter(|o| !o.applied)
        .map(|o| o.power_id.clone())
        .collect()
}

/// Pool an AVAD attack's named defense draws from
pub fn avad_kind(input: &str) -> DefenseKind {
    let upper = input.to_ascii_uppercase();
    if upper.contains("FLASH") {
        DefenseKind::Flash
    } else if upper.contains("POWER") {
        DefenseKind::Power
    } else if upper.contains("LIFE") {
        DefenseKind::LifeSupport
    } else if upper.contains("MENTAL") || upper.ends_with("MD") {
        DefenseKind::Mental
    } else if upper.ends_with("ED") || upper.contains("ENERGY") {
        DefenseKind::Energy
    } else if upper.ends_with("PD") || upper.contains("PHYSICAL") {
        DefenseKind::Physical
    } else {
        DefenseKind::None
    }
}

/// Whether a defense power is the one an AVAD attack names
pub fn avad_matches(input: &str, power: &PowerInstance) -> bool {
    let normalized = input.replace("Mental Defense", "MD").to_ascii_uppercase();
    let resistant_only = normalized.starts_with("RESISTANT");
    let kind = avad_kind(input);

    if !resistant_only && normalized == power.xmlid {
        return true;
    }
    if kind == DefenseKind::Mental && power.xmlid == "MENTALDEFENSE" && !resistant_only {
        return true;
    }

    let input_class = power.input.as_deref().unwrap_or("").to_ascii_uppercase();
    let class_matches = match kind {
        DefenseKind::Physical => input_class == "PHYSICAL",
        DefenseKind::Energy => input_class == "ENERGY",
        DefenseKind::Mental => input_class == "MENTAL",
        _ => false,
    };

    match power.xmlid.as_str() {
        "DAMAGEREDUCTION" => {
            let resistant = power
                .option_id
                .as_deref()
                .map(is_resistant_option)
                .unwrap_or(false);
            class_matches && (!resistant_only || resistant)
        }
        "DAMAGENEGATION" if !resistant_only => match kind {
            DefenseKind::Physical => power.has("PHYSICAL"),
            DefenseKind::Energy => power.has("ENERGY"),
            DefenseKind::Mental => power.has("MENTAL"),
            _ => false,
        },
        "FLASHDEFENSE" => kind == DefenseKind::Flash,
        "POWERDEFENSE" => kind == DefenseKind::Power,
        "LIFESUPPORT" => kind == DefenseKind::LifeSupport,
        "FORCEFIELD" | "ARMOR" => match kind {
            DefenseKind::Physical => power.defense.pd > 0,
            DefenseKind::Energy => power.defense.ed > 0,
            DefenseKind::Mental => power.defense.md > 0,
            DefenseKind::Power => power.defense.power > 0,
            _ => false,
        },
        _ => false,
    }
}

/// `RESISTANT50` is resistant, `NONRESISTANT50` is not
pub(super) fn is_resistant_option(option: &str) -> bool {
    let upper = option.to_ascii_uppercase();
    upper.contains("RESISTANT") && !upper.contains("NONRESISTANT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PowerCatalog;
    use crate::cost::{compute_costs, CostContext};
    use crate::power::{Adder, Modifier};
    use crate::types::Edition;

    fn profile(power: &PowerInstance) -> AttackProfile {
        let catalog = PowerCatalog::with_defaults();
        let definition = catalog.lookup(&power.xmlid, Edition::Sixth);
        let costs = compute_costs(power, &CostContext::new(&catalog, Edition::Sixth));
        AttackProfile::from_power(power, definition.as_ref(), &costs, Edition::Sixth)
    }

    fn avad_attack(input: &str) -> AttackProfile {
        profile(
            &PowerInstance::new("gas", "ENERGYBLAST", 6).with_modifier(
                Modifier::new("AVAD", 0.0)
                    .with_input(input)
                    .with_adder(Adder::new("NND", 0.0)),
            ),
        )
    }

    fn forcefield(id: &str, pd: i32, ed: i32) -> PowerInstance {
        let mut power = PowerInstance::new(id, "FORCEFIELD", pd + ed);
        power.defense.pd = pd;
        power.defense.ed = ed;
        power
    }

    #[test]
    fn test_avad_kinds() {
        assert_eq!(avad_kind("PD"), DefenseKind::Physical);
        assert_eq!(avad_kind("Resistant ED"), DefenseKind::Energy);
        assert_eq!(avad_kind("Mental Defense"), DefenseKind::Mental);
        assert_eq!(avad_kind("Power Defense"), DefenseKind::Power);
        assert_eq!(avad_kind("Flash Defense"), DefenseKind::Flash);
        assert_eq!(avad_kind("Life Support"), DefenseKind::LifeSupport);
        assert_eq!(avad_kind("Sonic"), DefenseKind::None);
    }

    #[test]
    fn test_avad_preselects_matching_defenses() {
        let defender = Character::new("d", "Defender")
            .with_power(forcefield("ff_pd", 10, 0))
            .with_power(forcefield("ff_ed", 0, 10))
            .with_power(PowerInstance::new("ls", "LIFESUPPORT", 5));

        let options = conditional_defense_options(&defender, &avad_attack("PD"));
        assert_eq!(options.len(), 3);
        let applied: Vec<&str> = options
            .iter()
            .filter(|o| o.applied)
            .map(|o| o.power_id.as_str())
            .collect();
        assert_eq!(applied, vec!["ff_pd"]);
        assert_eq!(default_ignored(&options), vec!["ff_ed".to_string(), "ls".to_string()]);

        let options = conditional_defense_options(&defender, &avad_attack("Life Support"));
        let applied: Vec<&str> = options
            .iter()
            .filter(|o| o.applied)
            .map(|o| o.power_id.as_str())
            .collect();
        assert_eq!(applied, vec!["ls"]);
    }

    #[test]
    fn test_limited_defenses_default_to_applied() {
        let limited = forcefield("vs_fire", 5, 5)
            .with_modifier(Modifier::new("ONLYAGAINSTLIMITEDTYPE", -1.0));
        let defender = Character::new("d", "Defender")
            .with_power(limited)
            .with_power(forcefield("plain", 5, 5));
        let attack = profile(&PowerInstance::new("eb", "ENERGYBLAST", 8));

        let options = conditional_defense_options(&defender, &attack);
        assert_eq!(options.len(), 1);
        assert!(options[0].applied);
        assert_eq!(options[0].power_id, "vs_fire");
    }

    #[test]
    fn test_aid_skips_conditional_defenses() {
        let limited = forcefield("vs_fire", 5, 5)
            .with_modifier(Modifier::new("CONDITIONALPOWER", -0.5));
        let defender = Character::new("d", "Defender").with_power(limited);
        let aid = profile(&PowerInstance::new("aid", "AID", 2).with_input("STR"));
        assert!(conditional_defense_options(&defender, &aid).is_empty());
    }

    #[test]
    fn test_damage_reduction_and_negation_matching() {
        let mut reduction = PowerInstance::new("dr", "DAMAGEREDUCTION", 0)
            .with_option("RESISTANT50")
            .with_input("Energy");
        reduction.name = "Damage Reduction".to_string();
        assert!(avad_matches("ED", &reduction));
        assert!(avad_matches("Resistant ED", &reduction));
        assert!(!avad_matches("PD", &reduction));

        let normal_reduction = PowerInstance::new("dr2", "DAMAGEREDUCTION", 0)
            .with_option("NONRESISTANT50")
            .with_input("Energy");
        assert!(!avad_matches("Resistant ED", &normal_reduction));

        let negation = PowerInstance::new("dn", "DAMAGENEGATION", 0)
            .with_modifier(Modifier::new("MENTAL", 0.0).with_levels(3));
        assert!(avad_matches("Mental Defense", &negation));
        assert!(!avad_matches("ED", &negation));
    }
}
