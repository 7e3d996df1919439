//! Combat maneuver table

use serde::{Deserialize, Serialize};

/// A combat maneuver the attacker declares alongside an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maneuver {
    Block,
    Brace,
    Disarm,
    Dodge,
    Grab,
    GrabBy,
    Haymaker,
    MoveBy,
    MoveThrough,
    Set,
    Shove,
    Strike,
    Throw,
    Trip,
    Choke,
    ClubWeapon,
    Cover,
    DiveForCover,
    Hipshot,
    PullingAPunch,
    RollWithAPunch,
    SnapShot,
    Strafe,
    SuppressionFire,
}

/// Table row for a maneuver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManeuverInfo {
    pub name: &'static str,
    pub phase: &'static str,
    /// Fixed OCV modifier; velocity-based maneuvers report 0
    pub ocv: i32,
    pub dcv: i32,
    pub effect: &'static str,
    pub optional: bool,
}

impl Maneuver {
    pub fn info(self) -> ManeuverInfo {
        let (name, phase, ocv, dcv, effect, optional) = match self {
            Maneuver::Block => ("Block", "1/2", 0, 0, "Blocks HTH attacks, Abort", false),
            Maneuver::Brace => (
                "Brace",
                "0",
                2,
                0,
                "+2 OCV only to offset the Range Modifier",
                false,
            ),
            Maneuver::Disarm => ("Disarm", "1/2", -2, 0, "Disarm target", false),
            Maneuver::Dodge => ("Dodge", "1/2", 0, 3, "Dodge all attacks, Abort", false),
            Maneuver::Grab => ("Grab", "1/2", -1, -2, "Grab two limbs", false),
            Maneuver::GrabBy => ("Grab By", "1/2", -3, -4, "Move and Grab object", false),
            Maneuver::Haymaker => ("Haymaker", "1/2*", 0, -5, "+4 Damage Classes", false),
            Maneuver::MoveBy => ("Move By", "1/2", -2, -2, "STR/2 + v/10 damage", false),
            Maneuver::MoveThrough => ("Move Through", "1/2", 0, -3, "STR + v/6 damage", false),
            Maneuver::Set => ("Set", "1", 1, 0, "Take extra time to aim", false),
            Maneuver::Shove => ("Shove", "1/2", -1, -1, "Push target back", false),
            Maneuver::Strike => ("Strike", "1/2", 0, 0, "STR or weapon", false),
            Maneuver::Throw => ("Throw", "1/2", 0, 0, "Throw object or character", false),
            Maneuver::Trip => ("Trip", "1/2", -1, -2, "Knock target prone", false),
            Maneuver::Choke => ("Choke", "1/2", -2, -2, "NND 1d6", true),
            Maneuver::ClubWeapon => ("Club Weapon", "1/2", 0, 0, "Killing weapon does normal damage", true),
            Maneuver::Cover => ("Cover", "1/2", -2, 0, "Target held at gunpoint", true),
            Maneuver::DiveForCover => ("Dive For Cover", "1/2", 0, 0, "Character avoids attack, Abort", true),
            Maneuver::Hipshot => ("Hipshot", "1/2", -1, 0, "+1 DEX only for purposes of initiative", true),
            Maneuver::PullingAPunch => ("Pulling A Punch", "1/2", -1, 0, "Strike, normal STUN damage, 1/2 BODY damage", true),
            Maneuver::RollWithAPunch => ("Roll With A Punch", "1/2", -2, -2, "Block after being hit, Abort", true),
            Maneuver::SnapShot => ("Snap Shot", "1", -1, 0, "Lets character duck back behind cover", true),
            Maneuver::Strafe => ("Strafe", "1/2", 0, -2, "Make Ranged Move By", true),
            Maneuver::SuppressionFire => ("Suppression Fire", "1/2", -2, 0, "Continuous fire through an area", true),
        };
        ManeuverInfo {
            name,
            phase,
            ocv,
            dcv,
            effect,
            optional,
        }
    }

    /// Whether declaring the maneuver aborts the character's next phase
    pub fn is_abort(self) -> bool {
        self.info().effect.to_ascii_lowercase().contains("abort")
    }

    /// Look up a maneuver by its display name, case-insensitive
    pub fn from_name(name: &str) -> Option<Maneuver> {
        MANEUVERS
            .iter()
            .copied()
            .find(|m| m.info().name.eq_ignore_ascii_case(name.trim()))
    }
}

const MANEUVERS: [Maneuver; 24] = [
    Maneuver::Block,
    Maneuver::Brace,
    Maneuver::Disarm,
    Maneuver::Dodge,
    Maneuver::Grab,
    Maneuver::GrabBy,
    Maneuver::Haymaker,
    Maneuver::MoveBy,
    Maneuver::MoveThrough,
    Maneuver::Set,
    Maneuver::Shove,
    Maneuver::Strike,
    Maneuver::Throw,
    Maneuver::Trip,
    Maneuver::Choke,
    Maneuver::ClubWeapon,
    Maneuver::Cover,
    Maneuver::DiveForCover,
    Maneuver::Hipshot,
    Maneuver::PullingAPunch,
    Maneuver::RollWithAPunch,
    Maneuver::SnapShot,
    Maneuver::Strafe,
    Maneuver::SuppressionFire,
];
