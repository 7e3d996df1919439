//! CombatResult - Outcome of damage resolution

use crate::adjustment::{AdjustmentReport, SenseAffectingOutcome};
use crate::damage::DamageDetail;
use crate::defense::DefenseProfile;
use crate::knockback::{KnockbackOutcome, KnockbackResult};
use serde::{Deserialize, Serialize};

/// Result of one hit landing on one defender
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub attacker_id: String,
    pub defender_id: String,
    pub power_id: String,

    // === Damage Breakdown ===
    /// Pipeline detail, for attacks that do STUN and BODY
    pub damage: Option<DamageDetail>,
    /// Defenses that applied
    pub defenses: DefenseProfile,
    /// Damage classes removed by Damage Negation
    pub damage_negated: i32,
    /// Faces dropped for distance from an explosion's center
    pub explosion_dice_removed: Vec<u32>,

    // === Other outcomes ===
    pub knockback: Option<KnockbackResult>,
    pub adjustment: Option<AdjustmentReport>,
    pub sense_affecting: Option<SenseAffectingOutcome>,

    // === State Changes ===
    pub stun_taken: i32,
    pub body_taken: i32,
    pub stun_before: i32,
    pub stun_after: i32,
    pub body_before: i32,
    pub body_after: i32,

    // === Flags ===
    pub stunned: bool,
    pub knocked_out: bool,
    /// STUN and BODY were written to the defender
    pub applied: bool,

    /// Why nothing got through, when nothing did
    pub no_damage_reason: Option<String>,
    /// Notes from every stage ("minimum damage invoked", "Hit Head")
    pub effects: Vec<String>,
    pub warnings: Vec<String>,
}

impl CombatResult {
    /// Create a new empty combat result
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(reason) = &self.no_damage_reason {
            parts.push(reason.clone());
        }

        if self.stun_taken > 0 || self.body_taken > 0 {
            parts.push(format!("{} STUN, {} BODY", self.stun_taken, self.body_taken));
        }

        if let Some(location) = self.damage.as_ref().and_then(|d| d.location_label()) {
            parts.push(format!("hit {location}"));
        }

        if let Some(adjustment) = &self.adjustment {
            parts.push(adjustment.summary());
        }

        if let Some(flash) = &self.sense_affecting {
            if flash.seconds > 0 {
                parts.push(format!("blinded for {}s", flash.seconds));
            }
        }

        if let Some(knockback) = &self.knockback {
            if knockback.outcome != KnockbackOutcome::None {
                parts.push(knockback.to_string());
            }
        }

        if self.stunned {
            parts.push("STUNNED".to_string());
        }

        if self.knocked_out {
            parts.push("KNOCKED OUT".to_string());
        }

        if parts.is_empty() {
            "No damage".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        assert_eq!(CombatResult::new().summary(), "No damage");
    }

    #[test]
    fn test_summary_lists_outcomes() {
        let result = CombatResult {
            stun_taken: 20,
            body_taken: 6,
            stunned: true,
            ..CombatResult::new()
        };
        assert_eq!(result.summary(), "20 STUN, 6 BODY, STUNNED");
    }
}
