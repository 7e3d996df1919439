//! How a power attacks
//!
//! [`AttackProfile`] is built fresh from a power and its catalog entry each
//! time it is used. It answers the questions every engine downstream asks:
//! which combat values are rolled, which defenses apply, whether the attack
//! kills, and what it does to STUN and BODY.

use crate::catalog::{AdjustmentKind, PowerCategory, PowerDefinition, PowerFacet};
use crate::cost::{aoe_parameters, AreaOfEffect, PowerCosts};
use crate::power::PowerInstance;
use crate::types::{AttackClass, CombatValue, DefendsWith, Edition, RangeClass, StunBodyDamage};
use serde::{Deserialize, Serialize};

use super::range::effective_range_class;

/// An attack resisted by an unusual defense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvadSpec {
    /// Defense named by the attack ("Mental Defense", "ED", "Life Support")
    pub input: String,
    /// Full damage without the defense, nothing with it
    pub all_or_nothing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub power_id: String,
    pub xmlid: String,
    pub edition: Edition,
    pub class: AttackClass,
    pub killing: bool,
    pub combat_value: CombatValue,
    pub defends_with: DefendsWith,
    pub stun_body: StunBodyDamage,
    pub uses_strength: bool,
    pub no_hit_locations: bool,
    /// Armor Piercing levels
    pub piercing: i32,
    /// Penetrating levels
    pub penetrating: i32,
    pub reduced_penetration: bool,
    /// Increased Stun Multiplier levels
    pub stun_multiplier_levels: i32,
    pub knockback_multiplier: i32,
    pub range: RangeClass,
    pub adjustment: Option<AdjustmentKind>,
    pub sense_affecting: bool,
    pub avad: Option<AvadSpec>,
    pub area: Option<AreaOfEffect>,
    /// Every target in the area is hit without a roll against it
    pub area_always_hits: bool,
}

impl AttackProfile {
    pub fn from_power(
        power: &PowerInstance,
        definition: Option<&PowerDefinition>,
        costs: &PowerCosts,
        edition: Edition,
    ) -> Self {
        let facet = definition.map(|d| d.facet()).unwrap_or(PowerFacet::Other);
        let adjustment = match facet {
            PowerFacet::Adjustment(kind) => Some(kind),
            _ => None,
        };
        let sense_affecting = facet == PowerFacet::SenseAffecting;
        let mental = definition
            .map(|d| d.has_category(PowerCategory::Mental))
            .unwrap_or(false)
            || power.has("BOECV");
        let entangle = power.xmlid == "ENTANGLE";

        let avad = power.find_modifier("AVAD").map(|m| AvadSpec {
            input: m.input.clone().unwrap_or_default(),
            all_or_nothing: m.find_adder("NND").is_some(),
        });

        let class = if avad.is_some() {
            AttackClass::Avad
        } else if adjustment.is_some() {
            AttackClass::Adjustment
        } else if power.xmlid == "FLASH" {
            AttackClass::Flash
        } else if entangle {
            AttackClass::Entangle
        } else if mental {
            AttackClass::Mental
        } else {
            match power.input.as_deref().map(str::to_ascii_uppercase).as_deref() {
                Some("ED") | Some("ENERGY") => AttackClass::Energy,
                Some("PD") | Some("PHYSICAL") => AttackClass::Physical,
                _ if power.xmlid == "ENERGYBLAST" => AttackClass::Energy,
                _ => AttackClass::Physical,
            }
        };

        let killing = matches!(power.xmlid.as_str(), "HKA" | "RKA")
            || power
                .effect
                .as_deref()
                .map(|e| e.to_ascii_uppercase().contains("KILLING"))
                .unwrap_or(false);

        let mut stun_body = match power.stun_body {
            Some(declared) => declared,
            None if matches!(power.xmlid.as_str(), "EGOATTACK" | "MINDCONTROL") => {
                StunBodyDamage::StunOnly
            }
            None if adjustment.is_some() || sense_affecting || entangle => {
                StunBodyDamage::EffectOnly
            }
            None => StunBodyDamage::StunBody,
        };
        if power.has("STUNONLY") {
            stun_body = StunBodyDamage::StunOnly;
        }
        if power.has("DOESBODY") && stun_body == StunBodyDamage::StunOnly {
            stun_body = StunBodyDamage::StunBody;
        }

        let uses_strength = !(matches!(
            power.xmlid.as_str(),
            "ENERGYBLAST" | "RKA" | "FLASH" | "ENTANGLE" | "TELEKINESIS"
        ) || adjustment.is_some()
            || sense_affecting
            || mental
            || power.has("NOSTRBONUS"));

        let no_hit_locations = power.no_hit_locations
            || adjustment.is_some()
            || sense_affecting
            || mental
            || entangle;

        let knockback_multiplier = if mental
            || adjustment.is_some()
            || entangle
            || sense_affecting
            || power.has("NOKB")
        {
            0
        } else if power.has("DOUBLEKB") {
            2
        } else {
            1
        };

        let (combat_value, defends_with) = if mental {
            (CombatValue::Omcv, DefendsWith::Dmcv)
        } else {
            (CombatValue::Ocv, DefendsWith::Dcv)
        };

        let level_of = |xmlid: &str| {
            power
                .find_modifier(xmlid)
                .map(|m| m.levels.max(1))
                .unwrap_or(0)
        };

        let area = aoe_parameters(power, costs, edition);
        let area_always_hits = area.is_some()
            && !power.has("SELECTIVETARGET")
            && !power.has("NONSELECTIVETARGET");

        AttackProfile {
            power_id: power.id.clone(),
            xmlid: power.xmlid.clone(),
            edition,
            class,
            killing,
            combat_value,
            defends_with,
            stun_body,
            uses_strength,
            no_hit_locations,
            piercing: level_of("ARMORPIERCING"),
            penetrating: level_of("PENETRATING"),
            reduced_penetration: power.has("REDUCEDPENETRATION"),
            stun_multiplier_levels: level_of("INCREASEDSTUNMULTIPLIER"),
            knockback_multiplier,
            range: effective_range_class(power, definition),
            adjustment,
            sense_affecting,
            avad,
            area,
            area_always_hits,
        }
    }

    /// An explosion: targets are hit by distance and lose dice with it
    pub fn is_explosion(&self) -> bool {
        self.area.map(|a| a.explosion).unwrap_or(false)
    }

    /// A short list of labels describing the attack
    pub fn tags(&self) -> Vec<String> {
        let mut tags = vec![format!("{:?}", self.class).to_lowercase()];
        if self.killing {
            tags.push("killing".to_string());
        }
        if self.stun_body != StunBodyDamage::StunBody {
            tags.push(format!("{:?}", self.stun_body).to_lowercase());
        }
        if self.piercing > 0 {
            tags.push(format!("APx{}", self.piercing));
        }
        if self.penetrating > 0 {
            tags.push(format!("PENx{}", self.penetrating));
        }
        if let Some(area) = self.area {
            tags.push(format!("{:?}({})", area.shape, area.size).to_lowercase());
            if area.explosion {
                tags.push("explosion".to_string());
            }
        }
        tags
    }
}
