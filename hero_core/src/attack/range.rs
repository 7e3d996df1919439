//! Range class resolution and the range modifier

use crate::catalog::PowerDefinition;
use crate::config::RulesConfig;
use crate::power::PowerInstance;
use crate::rounding::ceil_whole;
use crate::types::{Edition, RangeClass};

/// Range class of a power once its range modifiers are applied
pub fn effective_range_class(
    power: &PowerInstance,
    definition: Option<&PowerDefinition>,
) -> RangeClass {
    let mut range = match definition {
        Some(d) => d.range.unwrap_or(if d.is_attack() {
            RangeClass::Standard
        } else {
            RangeClass::SelfOnly
        }),
        None => RangeClass::Standard,
    };

    if power.has("BOECV") {
        range = RangeClass::LineOfSight;
    }
    if range == RangeClass::SelfOnly && power.has("UOO") {
        range = RangeClass::NoRange;
    }
    if range == RangeClass::NoRange && power.has("RANGED") {
        range = RangeClass::Standard;
    }

    let first_of = |candidates: &[(&str, RangeClass)]| {
        candidates
            .iter()
            .find(|(xmlid, _)| power.has(xmlid))
            .map(|(_, class)| *class)
    };

    match range {
        RangeClass::Standard => first_of(&[
            ("NORANGE", RangeClass::NoRange),
            ("LOS", RangeClass::LineOfSight),
            ("LIMITEDRANGE", RangeClass::LimitedRange),
            ("RANGEBASEDONSTR", RangeClass::RangeBasedOnStr),
            ("NORANGEMODIFIER", RangeClass::NoRangeModifiers),
        ])
        .unwrap_or(range),
        RangeClass::LineOfSight => first_of(&[
            ("NORMALRANGE", RangeClass::LimitedNormalRange),
            ("RANGEBASEDONSTR", RangeClass::RangeBasedOnStr),
            ("NORANGE", RangeClass::NoRange),
        ])
        .unwrap_or(range),
        other => other,
    }
}

/// OCV modifier for attacking at `distance`
///
/// -2 for each doubling of distance past the first range band. Close
/// targets give no bonus.
pub fn range_penalty(
    distance: f64,
    edition: Edition,
    range_class: RangeClass,
    config: &RulesConfig,
) -> i32 {
    if !range_class.uses_range_penalty() || distance <= 0.0 {
        return 0;
    }
    let factor = config.range_factor_for(edition);
    let bands = ceil_whole((distance / factor).log2());
    (-2.0 * bands).min(0.0) as i32
}
