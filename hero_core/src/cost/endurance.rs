//! Endurance cost of using a power

use super::PowerCosts;
use crate::catalog::PowerDefinition;
use crate::power::PowerInstance;
use crate::rounding::round_down_i32;

/// END spent each time the power is used
///
/// One END per 10 active points, at least 1. Increased and Reduced
/// Endurance scale that; powers that never cost END return 0.
pub fn endurance_cost(
    power: &PowerInstance,
    costs: &PowerCosts,
    definition: Option<&PowerDefinition>,
) -> i32 {
    let mut end = round_down_i32(costs.active_points as f64 / 10.0).max(1);

    if let Some(increased) = power.find_modifier("INCREASEDEND") {
        let factor = increased
            .option_id
            .as_deref()
            .map(|o| o.trim_matches(|c: char| c == 'x' || c == 'X'))
            .and_then(|o| o.parse::<i32>().ok())
            .unwrap_or(1);
        end *= factor.max(1);
    }

    match costs.reduced_end.as_deref() {
        Some("HALFEND") => {
            let full = round_down_i32(costs.active_points_without_end_mods / 10.0);
            end = round_down_i32(full as f64 / 2.0).max(1);
        }
        Some("ZERO") => end = 0,
        _ => {}
    }

    if !power.has("COSTSEND") {
        if !definition.map(|d| d.costs_endurance()).unwrap_or(false) {
            end = 0;
        }
        if power.find_modifier("CHARGES").is_some() {
            end = 0;
        }
    }

    // STR only costs END when it is used in an attack
    if power.xmlid == "STR" {
        end = 0;
    }

    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PowerCatalog;
    use crate::cost::{compute_costs, CostContext};
    use crate::power::Modifier;
    use crate::types::Edition;

    fn end_of(power: &PowerInstance) -> i32 {
        let catalog = PowerCatalog::with_defaults();
        let ctx = CostContext::new(&catalog, Edition::Sixth);
        let costs = compute_costs(power, &ctx);
        let def = catalog.lookup(&power.xmlid, Edition::Sixth);
        endurance_cost(power, &costs, def.as_ref())
    }

    #[test]
    fn test_one_end_per_ten_points() {
        assert_eq!(end_of(&PowerInstance::new("eb", "ENERGYBLAST", 10)), 5);
        assert_eq!(end_of(&PowerInstance::new("eb", "ENERGYBLAST", 1)), 1);
        // 45 AP rounds down to 4
        assert_eq!(end_of(&PowerInstance::new("rka", "RKA", 3)), 4);
    }

    #[test]
    fn test_reduced_endurance() {
        let half = PowerInstance::new("eb", "ENERGYBLAST", 12)
            .with_modifier(Modifier::new("REDUCEDEND", 0.25).with_option("HALFEND"));
        // 60 base points without the END advantage -> 6 END -> 3
        assert_eq!(end_of(&half), 3);

        let zero = PowerInstance::new("eb", "ENERGYBLAST", 12)
            .with_modifier(Modifier::new("REDUCEDEND", 0.5).with_option("ZERO"));
        assert_eq!(end_of(&zero), 0);
    }

    #[test]
    fn test_powers_without_end() {
        assert_eq!(end_of(&PowerInstance::new("ha", "HANDTOHANDATTACK", 4)), 0);
        assert_eq!(end_of(&PowerInstance::new("str", "STR", 20)), 0);
        let charged = PowerInstance::new("rka", "RKA", 2)
            .with_modifier(Modifier::new("CHARGES", -0.5).with_alias("8"));
        assert_eq!(end_of(&charged), 0);
    }

    #[test]
    fn test_increased_endurance() {
        let doubled = PowerInstance::new("eb", "ENERGYBLAST", 10)
            .with_modifier(Modifier::new("INCREASEDEND", -0.5).with_option("2x"));
        assert_eq!(end_of(&doubled), 10);
    }
}
