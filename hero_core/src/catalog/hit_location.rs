//! Hit location table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Body area struck by an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitLocation {
    Head,
    Hand,
    Arm,
    Shoulder,
    Chest,
    Stomach,
    Vitals,
    Thigh,
    Leg,
    Foot,
}

/// Damage multipliers and aim penalty of a location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationMultipliers {
    /// STUN multiplier for killing attacks
    pub stun: f64,
    /// STUN multiplier for normal attacks
    pub normal_stun: f64,
    pub body: f64,
    /// OCV modifier to aim at the location
    pub ocv: i32,
}

/// Left or right, for locations that come in pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl HitLocation {
    pub fn all() -> &'static [HitLocation] {
        &[
            HitLocation::Head,
            HitLocation::Hand,
            HitLocation::Arm,
            HitLocation::Shoulder,
            HitLocation::Chest,
            HitLocation::Stomach,
            HitLocation::Vitals,
            HitLocation::Thigh,
            HitLocation::Leg,
            HitLocation::Foot,
        ]
    }

    /// Location struck for a 3d6 total
    pub fn from_roll(total: i32) -> Option<HitLocation> {
        match total {
            3..=5 => Some(HitLocation::Head),
            6 => Some(HitLocation::Hand),
            7..=8 => Some(HitLocation::Arm),
            9 => Some(HitLocation::Shoulder),
            10..=11 => Some(HitLocation::Chest),
            12 => Some(HitLocation::Stomach),
            13 => Some(HitLocation::Vitals),
            14 => Some(HitLocation::Thigh),
            15..=16 => Some(HitLocation::Leg),
            17..=18 => Some(HitLocation::Foot),
            _ => None,
        }
    }

    pub fn multipliers(self) -> LocationMultipliers {
        let (stun, normal_stun, body, ocv) = match self {
            HitLocation::Head => (5.0, 2.0, 2.0, -8),
            HitLocation::Hand => (1.0, 0.5, 0.5, -6),
            HitLocation::Arm => (2.0, 0.5, 0.5, -5),
            HitLocation::Shoulder => (3.0, 1.0, 1.0, -5),
            HitLocation::Chest => (3.0, 1.0, 1.0, -5),
            HitLocation::Stomach => (4.0, 1.5, 1.0, -7),
            HitLocation::Vitals => (4.0, 1.5, 2.0, -8),
            HitLocation::Thigh => (2.0, 1.0, 1.0, -4),
            HitLocation::Leg => (2.0, 0.5, 0.5, -6),
            HitLocation::Foot => (1.0, 0.5, 0.5, -8),
        };
        LocationMultipliers {
            stun,
            normal_stun,
            body,
            ocv,
        }
    }

    /// Whether the location has a left and a right
    pub fn is_sided(self) -> bool {
        matches!(
            self,
            HitLocation::Hand
                | HitLocation::Shoulder
                | HitLocation::Arm
                | HitLocation::Thigh
                | HitLocation::Leg
                | HitLocation::Foot
        )
    }
}

impl fmt::Display for HitLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HitLocation::Head => "Head",
            HitLocation::Hand => "Hand",
            HitLocation::Arm => "Arm",
            HitLocation::Shoulder => "Shoulder",
            HitLocation::Chest => "Chest",
            HitLocation::Stomach => "Stomach",
            HitLocation::Vitals => "Vitals",
            HitLocation::Thigh => "Thigh",
            HitLocation::Leg => "Leg",
            HitLocation::Foot => "Foot",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("Left"),
            Side::Right => f.write_str("Right"),
        }
    }
}
