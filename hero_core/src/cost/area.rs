//! Area of effect parameters

use super::modifier::explosion_falloff;
use super::PowerCosts;
use crate::power::{Modifier, PowerInstance};
use crate::types::Edition;
use serde::{Deserialize, Serialize};

/// Template shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AoeShape {
    Radius,
    Cone,
    Line,
    Surface,
    Any,
    Hex,
}

impl AoeShape {
    fn from_option(option: &str) -> Option<Self> {
        match option {
            "RADIUS" | "NORMAL" => Some(AoeShape::Radius),
            "CONE" => Some(AoeShape::Cone),
            "LINE" => Some(AoeShape::Line),
            "SURFACE" => Some(AoeShape::Surface),
            "ANY" => Some(AoeShape::Any),
            "HEX" => Some(AoeShape::Hex),
            _ => None,
        }
    }
}

/// Size of an area-of-effect template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaOfEffect {
    pub shape: AoeShape,
    /// Radius, length or side, in the edition's distance unit
    pub size: i32,
    pub width: i32,
    pub height: i32,
    pub explosion: bool,
    /// DCs lost per unit of distance from the center, for explosions
    pub dc_falloff: i32,
}

/// Template size for a power bought with AOE or EXPLOSION
///
/// Returns `None` for powers without an area, and for an area whose shape
/// is not recognized (logged).
pub fn aoe_parameters(
    power: &PowerInstance,
    costs: &PowerCosts,
    edition: Edition,
) -> Option<AreaOfEffect> {
    let modifier = power
        .find_modifier("AOE")
        .or_else(|| power.find_modifier("EXPLOSION"))?;
    let explosion = power.has("EXPLOSION");

    let option = modifier.option_id.as_deref().unwrap_or("RADIUS");
    let Some(shape) = AoeShape::from_option(option) else {
        tracing::error!(power = %power.id, option, "unknown AOE shape, treating as no area");
        return None;
    };

    let width_doubles = adder_levels(modifier, "DOUBLEWIDTH");
    let height_doubles = adder_levels(modifier, "DOUBLEHEIGHT");
    let (width, height) = match edition {
        Edition::Fifth => (1 << width_doubles.clamp(0, 30), 1 << height_doubles.clamp(0, 30)),
        Edition::Sixth => (width_doubles, height_doubles),
    };

    let mut dc_falloff = 0;
    let size = match edition {
        Edition::Sixth => {
            if explosion {
                dc_falloff = power
                    .find_adder("EXPLOSION")
                    .or_else(|| modifier.find_adder("EXPLOSION"))
                    .map(|a| a.levels)
                    .filter(|l| *l > 0)
                    .unwrap_or(1);
            }
            modifier.levels
        }
        Edition::Fifth if modifier.xmlid == "AOE" => {
            let aoe_advantage = costs.modifier_total("AOE").unwrap_or(0.0);
            let ap = (costs.active_points as f64 / (1.0 + aoe_advantage))
                .max(costs.base_points_plus_adders);
            let base = match shape {
                AoeShape::Cone => (1.0 + ap / 5.0).floor() as i32,
                AoeShape::Hex => 1,
                AoeShape::Line => (2.0 * ap / 5.0).floor() as i32,
                AoeShape::Any | AoeShape::Radius | AoeShape::Surface => {
                    (1.0 + ap / 10.0).floor() as i32
                }
            };
            let doubles = modifier
                .find_adder("DOUBLEAREA")
                .or_else(|| modifier.find_adder("DOUBLELENGTH"))
                .map(|a| a.levels)
                .unwrap_or(0);
            base << doubles.clamp(0, 20)
        }
        Edition::Fifth => {
            let mut ignored = Vec::new();
            let default_falloff = explosion_falloff(modifier, &mut ignored);
            dc_falloff = if modifier.levels > 0 {
                modifier.levels
            } else {
                default_falloff
            };
            let dc = costs.active_points_dc / 5;
            dc * dc_falloff
        }
    };

    Some(AreaOfEffect {
        shape,
        size,
        width,
        height,
        explosion,
        dc_falloff,
    })
}

fn adder_levels(modifier: &Modifier, xmlid: &str) -> i32 {
    modifier.find_adder(xmlid).map(|a| a.levels).unwrap_or(0)
}
