//! Per-attack choices made by the attacker

use crate::catalog::{HitLocation, Maneuver};
use serde::{Deserialize, Serialize};

/// Everything the attacker declares alongside an attack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackOptions {
    /// Free OCV modifier entered by the player
    #[serde(default)]
    pub ocv_mod: i32,
    /// Free DCV modifier, kept until the attacker's next phase
    #[serde(default)]
    pub dcv_mod: i32,
    /// Location aimed at; `None` rolls for it
    #[serde(default)]
    pub aim: Option<HitLocation>,
    /// Spend Penalty Skill Levels against the aim penalty
    #[serde(default)]
    pub use_psl: bool,
    #[serde(default)]
    pub maneuvers: Vec<Maneuver>,
    /// Attacks in a Multiple Attack, including this one
    #[serde(default)]
    pub multiple_attack: u32,
    /// STR put behind the attack; defaults to the attacker's STR
    #[serde(default)]
    pub effective_str: Option<i32>,
    /// Replaces the rolled or location stun multiplier
    #[serde(default)]
    pub stun_multiplier: Option<i32>,
    /// Extra d6 added to (or removed from) the knockback roll
    #[serde(default)]
    pub knockback_mod: i32,
    /// Defenses the target declared do not apply; `None` uses the defaults
    #[serde(default)]
    pub ignore_defense_ids: Option<Vec<String>>,
    /// OCV of the attack a Block is rolled against
    #[serde(default)]
    pub pending_attack_ocv: Option<i32>,
    /// Shots fired by an autofire attack at a single target
    #[serde(default)]
    pub autofire_shots: Option<u32>,
    /// Damage classes added from outside the power (combat skill levels)
    #[serde(default)]
    pub extra_dc: i32,
}

impl AttackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_maneuver(mut self, maneuver: Maneuver) -> Self {
        self.maneuvers.push(maneuver);
        self
    }

    pub fn aimed_at(mut self, location: HitLocation) -> Self {
        self.aim = Some(location);
        self
    }

    pub fn has_maneuver(&self, maneuver: Maneuver) -> bool {
        self.maneuvers.contains(&maneuver)
    }
}
