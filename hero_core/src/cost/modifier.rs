//! Base cost of modifiers and adders
//!
//! Imported records carry a declared cost, but a few modifiers are priced
//! by formula and the catalog may override the rest.

use crate::catalog::PowerCatalog;
use crate::power::{Adder, Modifier};
use crate::rounding::ceil_whole;
use crate::types::Edition;

/// Base cost of an adder placed directly on a power
///
/// Catalog override, else the declared cost.
pub fn adder_base_cost(adder: &Adder, catalog: &PowerCatalog, warnings: &mut Vec<String>) -> f64 {
    let declared = catalog
        .modifier(&adder.xmlid)
        .and_then(|info| info.base_cost)
        .filter(|c| *c != 0.0)
        .unwrap_or(adder.base_cost);
    sanitize(&adder.xmlid, declared, warnings)
}

/// Base cost of an adder nested under a modifier or another adder,
/// including `lvl_cost` per level
pub fn nested_adder_cost(adder: &Adder, catalog: &PowerCatalog, warnings: &mut Vec<String>) -> f64 {
    let per_level = adder.lvl_cost.unwrap_or(0.0) * adder.levels as f64;
    adder_base_cost(adder, catalog, warnings) + per_level
}

/// Base cost of a modifier, before levels and adders
pub fn modifier_base_cost(
    modifier: &Modifier,
    catalog: &PowerCatalog,
    edition: Edition,
    warnings: &mut Vec<String>,
) -> f64 {
    let cost = match modifier.xmlid.as_str() {
        "AOE" if edition == Edition::Sixth => match aoe_doubling_floor(modifier) {
            Some((min_level, min_doubles)) => {
                let levels = modifier.levels.max(min_level) as f64;
                0.25 * ceil_whole(levels.log2() - min_doubles as f64)
            }
            None => {
                let message = format!(
                    "unknown AOE shape {:?}, treating as no area",
                    modifier.option_id
                );
                tracing::error!("{}", message);
                warnings.push(message);
                0.0
            }
        },
        "REQUIRESASKILLROLL" => -modifier.base_cost.abs(),
        "EXPLOSION" => {
            let default_falloff = explosion_falloff(modifier, warnings);
            let levels = if modifier.levels > 0 {
                modifier.levels
            } else {
                default_falloff
            };
            modifier.base_cost + 0.25 * (levels - default_falloff) as f64
        }
        _ => match catalog.modifier(&modifier.xmlid) {
            Some(info) => info
                .base_cost
                .filter(|c| *c != 0.0)
                .unwrap_or(modifier.base_cost),
            None => {
                warn_once(
                    warnings,
                    format!(
                        "unknown modifier {}, keeping its declared cost {}",
                        modifier.xmlid, modifier.base_cost
                    ),
                );
                modifier.base_cost
            }
        },
    };
    sanitize(&modifier.xmlid, cost, warnings)
}

/// Smallest size and free doublings for each sixth-edition AOE shape
fn aoe_doubling_floor(modifier: &Modifier) -> Option<(i32, i32)> {
    match modifier.option_id.as_deref() {
        Some("SURFACE") | Some("ANY") => Some((2, 0)),
        Some("RADIUS") => Some((4, 1)),
        Some("CONE") => Some((8, 2)),
        Some("LINE") => Some((16, 3)),
        _ => None,
    }
}

/// DC falloff an explosion shape has without extra levels
pub(crate) fn explosion_falloff(modifier: &Modifier, warnings: &mut Vec<String>) -> i32 {
    match modifier.option_id.as_deref() {
        Some("CONE") => 2,
        Some("LINE") => 3,
        Some("NORMAL") | Some("RADIUS") | None => 1,
        Some(other) => {
            let message = format!("unknown explosion shape {other}, using 1 DC falloff");
            tracing::warn!("{}", message);
            warnings.push(message);
            1
        }
    }
}

fn sanitize(xmlid: &str, cost: f64, warnings: &mut Vec<String>) -> f64 {
    if cost.is_finite() {
        cost
    } else {
        warn_once(warnings, format!("modifier {xmlid} has no usable cost, using 0"));
        0.0
    }
}

/// A modifier is priced by both the advantage and the limitation pass, so
/// the same problem is only reported once
fn warn_once(warnings: &mut Vec<String>, message: String) {
    if !warnings.contains(&message) {
        tracing::warn!("{}", message);
        warnings.push(message);
    }
}
