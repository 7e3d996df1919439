//! Defense determination
//!
//! Collects, for one defender against one attack, how much normal,
//! resistant and impenetrable defense applies, plus damage reduction,
//! damage negation and knockback resistance. Only the pool the attack
//! targets is read: PD for physical attacks, ED for energy, Mental Defense
//! for mental, Power Defense for adjustments, Flash Defense for flashes,
//! and the named defense for AVAD attacks.

mod conditional;

pub use conditional::{
    avad_kind, avad_matches, conditional_defense_options, default_ignored, DefenseOption,
};

use crate::attack::AttackProfile;
use crate::character::Character;
use crate::power::PowerInstance;
use crate::rounding::round_up_i32;
use crate::types::{AttackClass, Characteristic, Edition, Tag};
use conditional::{is_resistant_option, DEFENSE_POWERS};
use serde::{Deserialize, Serialize};

/// Defense pool an attack is resisted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseKind {
    #[default]
    Physical,
    Energy,
    Mental,
    Power,
    Flash,
    LifeSupport,
    /// An AVAD naming a defense nobody has
    None,
}

impl DefenseKind {
    pub fn for_attack(attack: &AttackProfile) -> DefenseKind {
        match attack.class {
            AttackClass::Physical | AttackClass::Entangle | AttackClass::Other => {
                DefenseKind::Physical
            }
            AttackClass::Energy => DefenseKind::Energy,
            AttackClass::Mental => DefenseKind::Mental,
            AttackClass::Adjustment => DefenseKind::Power,
            AttackClass::Flash => DefenseKind::Flash,
            AttackClass::Avad => attack
                .avad
                .as_ref()
                .map(|a| avad_kind(&a.input))
                .unwrap_or(DefenseKind::None),
        }
    }
}

/// Defenses one defender brings against one attack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfile {
    pub kind: DefenseKind,
    pub defense: i32,
    pub resistant: i32,
    /// Defense that stops penetrating damage
    pub impenetrable: i32,
    /// Percentage, the best applicable one
    pub damage_reduction: i32,
    /// Damage classes removed before damage is counted
    pub damage_negation: i32,
    pub knockback_resistance: i32,
    /// Life Support applies against an AVAD naming it
    pub life_support: bool,
    pub tags: Vec<Tag>,
}

impl DefenseProfile {
    /// Everything that counts as "having the defense" for an all-or-nothing AVAD
    pub fn avad_total(&self) -> i32 {
        self.defense
            + self.resistant
            + self.impenetrable
            + self.damage_reduction
            + self.damage_negation
            + self.knockback_resistance
            + i32::from(self.life_support)
    }

    fn add(&mut self, label: &str, normal: i32, resistant: i32) {
        if normal != 0 {
            self.defense += normal;
            self.tags.push(Tag::new(normal, label));
        }
        if resistant != 0 {
            self.resistant += resistant;
            self.tags.push(Tag::new(resistant, format!("{label} (resistant)")));
        }
    }
}

/// Hardened levels on a defense power
fn hardened_levels(power: &PowerInstance) -> i32 {
    power
        .find_modifier("HARDENED")
        .map(|m| m.levels.max(1))
        .unwrap_or(0)
}

/// Armor Piercing halves a defense that is not hardened enough, rounding
/// in the defender's favor
fn pierce(value: i32, piercing: i32, hardened: i32) -> i32 {
    if piercing > hardened && value > 0 {
        round_up_i32(value as f64 / 2.0)
    } else {
        value
    }
}

/// Normal and resistant defense a power adds to `kind`
fn power_contribution(power: &PowerInstance, kind: DefenseKind) -> (i32, i32) {
    let resistant = power.has("RESISTANT");
    let split = |value: i32| if resistant { (0, value) } else { (value, 0) };
    match (power.xmlid.as_str(), kind) {
        ("PD", DefenseKind::Physical) | ("ED", DefenseKind::Energy) => split(power.levels),
        ("FORCEFIELD" | "ARMOR" | "FORCEWALL", _) => {
            let levels = match kind {
                DefenseKind::Physical => power.defense.pd,
                DefenseKind::Energy => power.defense.ed,
                DefenseKind::Mental => power.defense.md,
                DefenseKind::Power => power.defense.power,
                _ => 0,
            };
            (0, levels)
        }
        ("COMBAT_LUCK", DefenseKind::Physical | DefenseKind::Energy) => (0, 3 * power.levels),
        ("DENSITYINCREASE", DefenseKind::Physical | DefenseKind::Energy) => (power.levels, 0),
        ("MENTALDEFENSE", DefenseKind::Mental)
        | ("POWERDEFENSE", DefenseKind::Power)
        | ("FLASHDEFENSE", DefenseKind::Flash) => split(power.levels),
        _ => (0, 0),
    }
}

fn damage_reduction(power: &PowerInstance, kind: DefenseKind) -> i32 {
    let class = power.input.as_deref().unwrap_or("").to_ascii_uppercase();
    let matches = matches!(
        (class.as_str(), kind),
        ("PHYSICAL", DefenseKind::Physical)
            | ("ENERGY", DefenseKind::Energy)
            | ("MENTAL", DefenseKind::Mental)
    );
    if !matches {
        return 0;
    }
    power
        .option_id
        .as_deref()
        .map(|o| o.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

fn damage_negation(power: &PowerInstance, kind: DefenseKind) -> i32 {
    let xmlid = match kind {
        DefenseKind::Physical => "PHYSICAL",
        DefenseKind::Energy => "ENERGY",
        DefenseKind::Mental => "MENTAL",
        _ => return 0,
    };
    power.find_modifier(xmlid).map(|m| m.levels).unwrap_or(0)
}

/// Work out what the defender subtracts from `attack`
///
/// `ignore_ids` lists defense powers the defender declared do not apply;
/// `None` takes the defaults from [`conditional_defense_options`].
pub fn determine_defenses(
    defender: &Character,
    attack: &AttackProfile,
    ignore_ids: Option<&[String]>,
) -> DefenseProfile {
    let kind = DefenseKind::for_attack(attack);
    let ignored: Vec<String> = match ignore_ids {
        Some(ids) => ids.to_vec(),
        None => default_ignored(&conditional_defense_options(defender, attack)),
    };
    let mut profile = DefenseProfile {
        kind,
        ..DefenseProfile::default()
    };

    // Natural defenses; an AVAD only counts them when it names them
    let natural = match kind {
        DefenseKind::Physical => Some(Characteristic::Pd),
        DefenseKind::Energy => Some(Characteristic::Ed),
        _ => None,
    };
    let avad_resistant_only = attack
        .avad
        .as_ref()
        .map(|a| a.input.to_ascii_uppercase().starts_with("RESISTANT"))
        .unwrap_or(false);
    if let Some(characteristic) = natural.filter(|_| !avad_resistant_only) {
        let value = pierce(defender.value(characteristic), attack.piercing, 0);
        profile.add(characteristic.key(), value, 0);
    }
    if kind == DefenseKind::Mental
        && defender.edition == Edition::Fifth
        && defender.active_powers("MENTALDEFENSE").next().is_some()
    {
        let free = defender.value(Characteristic::Ego) / 5;
        profile.add("EGO/5 Mental Defense", pierce(free, attack.piercing, 0), 0);
    }

    let mut resistant_cap = 0;
    for power in defender.powers.iter().filter(|p| p.active) {
        if ignored.contains(&power.id) {
            continue;
        }
        if power.xmlid == "LIFESUPPORT" && kind == DefenseKind::LifeSupport {
            profile.life_support = true;
            profile.tags.push(Tag::new(0, power.name.clone()));
            continue;
        }
        if !DEFENSE_POWERS.contains(&power.xmlid.as_str()) {
            continue;
        }

        let hardened = hardened_levels(power);
        let (normal, resistant) = power_contribution(power, kind);
        let normal = pierce(normal, attack.piercing, hardened);
        let resistant = pierce(resistant, attack.piercing, hardened);
        let normal = if avad_resistant_only { 0 } else { normal };
        profile.add(&power.name, normal, resistant);
        if power.has("IMPENETRABLE") {
            profile.impenetrable += normal + resistant;
        }

        match power.xmlid.as_str() {
            "DAMAGERESISTANCE" => {
                resistant_cap += match kind {
                    DefenseKind::Physical => power.defense.pd,
                    DefenseKind::Energy => power.defense.ed,
                    DefenseKind::Mental => power.defense.md,
                    DefenseKind::Power => power.defense.power,
                    _ => 0,
                };
            }
            "DAMAGEREDUCTION" => {
                let resistant_dr = power
                    .option_id
                    .as_deref()
                    .map(is_resistant_option)
                    .unwrap_or(false);
                if !avad_resistant_only || resistant_dr {
                    let percent = damage_reduction(power, kind);
                    if percent > profile.damage_reduction {
                        profile.damage_reduction = percent;
                    }
                }
            }
            "DAMAGENEGATION" => {
                let dc = damage_negation(power, kind);
                if dc > 0 {
                    profile.damage_negation += dc;
                    profile.tags.push(Tag::new(dc, format!("{} DC", power.name)));
                }
            }
            "DENSITYINCREASE" | "GROWTH" | "KBRESISTANCE" => {
                profile.knockback_resistance += power.levels;
            }
            _ => {}
        }
    }

    // Damage Resistance turns normal defense into resistant defense
    let converted = resistant_cap.min(profile.defense);
    if converted > 0 {
        profile.defense -= converted;
        profile.resistant += converted;
        profile
            .tags
            .push(Tag::new(converted, "Damage Resistance (now resistant)"));
    }

    if profile.damage_reduction > 0 {
        profile.tags.push(Tag::new(
            profile.damage_reduction,
            "% Damage Reduction",
        ));
    }

    tracing::debug!(
        defender = %defender.id,
        ?kind,
        defense = profile.defense,
        resistant = profile.resistant,
        impenetrable = profile.impenetrable,
        damage_reduction = profile.damage_reduction,
        damage_negation = profile.damage_negation,
        "defenses determined"
    );
    profile
}
