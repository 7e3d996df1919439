//! Option-driven cost per level
//!
//! Skill levels and a few talents price each level by the option chosen
//! on the power, and the tables differ between editions.

use crate::power::PowerInstance;
use crate::types::Edition;

/// Cost per level selected by the power's option, if the power has one
///
/// Unknown options log a warning and fall back to the catalog price.
pub fn option_cost_per_level(
    power: &PowerInstance,
    edition: Edition,
    warnings: &mut Vec<String>,
) -> Option<f64> {
    let option = power.option_id.as_deref().unwrap_or("");
    let cost = match power.xmlid.as_str() {
        "PENALTY_SKILL_LEVELS" => match (edition, option) {
            (Edition::Fifth, "SINGLE" | "TIGHT") => Some(2.0),
            (Edition::Fifth, "ALL") => Some(3.0),
            (Edition::Sixth, "SINGLE") => Some(1.0),
            (Edition::Sixth, "THREE" | "SINGLEDCV") => Some(2.0),
            (Edition::Sixth, "GROUPDCV" | "ALL") => Some(3.0),
            _ => None,
        },
        "MENTAL_COMBAT_LEVELS" => match (edition, option) {
            (Edition::Sixth, "SINGLE") => Some(1.0),
            (Edition::Sixth, "TIGHT") => Some(3.0),
            (Edition::Sixth, "BROAD") => Some(6.0),
            // Fifth edition prices these from the catalog
            (Edition::Fifth, _) => return None,
            _ => None,
        },
        "COMBAT_LEVELS" => match edition {
            Edition::Fifth => match option {
                "SINGLESINGLE" => Some(1.0),
                "SINGLESTRIKE" | "SINGLE" => Some(2.0),
                "MAGIC" | "MARTIAL" | "STRIKE" | "TIGHT" => Some(3.0),
                "BROAD" | "DECV" | "HTHDCV" | "TWODCV" | "TWOOCV" => Some(4.0),
                "DCV" | "HTH" | "MENTAL" | "RANGED" => Some(5.0),
                "HTHMENTAL" | "HTHRANGED" | "MENTALRANGED" => Some(6.0),
                "ALL" => Some(8.0),
                _ => None,
            },
            Edition::Sixth => match option {
                "SINGLE" => Some(2.0),
                "TIGHT" => Some(3.0),
                "BROAD" => Some(5.0),
                "HTH" | "RANGED" => Some(8.0),
                "ALL" => Some(10.0),
                _ => None,
            },
        },
        "SKILL_LEVELS" => match edition {
            Edition::Fifth => match option {
                "CHARACTERISTIC" | "SINGLEMOVEMENT" => Some(2.0),
                "ALLMOVEMENT" | "RELATED" => Some(3.0),
                "SIMILAR" => Some(5.0),
                "NONCOMBAT" => Some(8.0),
                "OVERALL" => Some(10.0),
                _ => None,
            },
            Edition::Sixth => match option {
                "CHARACTERISTIC" | "SINGLEMOVEMENT" => Some(2.0),
                "RELATED" | "ALLMOVEMENT" => Some(3.0),
                "GROUP" => Some(4.0),
                "SIMILAR" => Some(5.0),
                "AGILITY" => Some(6.0),
                "NONCOMBAT" => Some(10.0),
                "OVERALL" => Some(12.0),
                _ => None,
            },
        },
        "STRIKING_APPEARANCE" => return Some(if option == "ALL" { 3.0 } else { 2.0 }),
        "DEADLYBLOW" => match option {
            "VERYLIMITED" => Some(4.0),
            "LIMITED" => Some(7.0),
            "ANY" => Some(10.0),
            _ => None,
        },
        _ => return None,
    };

    if cost.is_none() {
        let message = format!(
            "unknown {} option {:?} on {}, using catalog cost",
            power.xmlid, option, power.name
        );
        tracing::warn!(power = %power.id, "{}", message);
        warnings.push(message);
    }
    cost
}
