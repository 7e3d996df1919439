//! Table rules chosen by the game master

use crate::types::{Characteristic, CharacterKind, Edition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::ConfigError;

/// Which results are written back to characters automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationLevel {
    /// Nothing is written; results are reported only
    #[default]
    None,
    /// NPCs spend END and take STUN/BODY
    NpcOnly,
    /// Everyone spends END, NPCs take STUN/BODY
    PcEndOnly,
    /// Everyone spends END and takes STUN/BODY
    All,
}

impl AutomationLevel {
    /// Whether END spent by a character of this kind is written
    pub fn writes_endurance(self, kind: CharacterKind) -> bool {
        match self {
            AutomationLevel::None => false,
            AutomationLevel::NpcOnly => kind == CharacterKind::Npc,
            AutomationLevel::PcEndOnly | AutomationLevel::All => true,
        }
    }

    /// Whether STUN/BODY taken by a character of this kind is written
    pub fn writes_damage(self, kind: CharacterKind) -> bool {
        match self {
            AutomationLevel::None => false,
            AutomationLevel::NpcOnly | AutomationLevel::PcEndOnly => kind == CharacterKind::Npc,
            AutomationLevel::All => true,
        }
    }
}

/// Whether sided hit locations roll for left/right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitLocationTracking {
    #[default]
    None,
    All,
}

/// Rule toggles read by every engine call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub hit_locations: bool,
    #[serde(default)]
    pub hit_location_tracking: HitLocationTracking,
    #[serde(default)]
    pub knockback: bool,
    #[serde(default = "default_true")]
    pub use_endurance: bool,
    #[serde(default = "default_true")]
    pub use_stunned: bool,
    #[serde(default)]
    pub automation: AutomationLevel,
    #[serde(default)]
    pub optional_maneuvers: bool,
    /// Seconds before an adjustment effect fades without a delayed return rate
    #[serde(default = "default_adjustment_return_seconds")]
    pub adjustment_return_seconds: f64,
    /// Distance per range band under sixth edition (meters)
    #[serde(default = "default_range_factor")]
    pub range_factor: f64,
    /// Distance per range band under fifth edition (inches)
    #[serde(default = "default_range_factor_5e")]
    pub range_factor_5e: f64,
    /// Extra cost multiplier per characteristic key when adjusting it
    #[serde(default)]
    pub adjustment_multipliers: BTreeMap<String, f64>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        RulesConfig {
            hit_locations: false,
            hit_location_tracking: HitLocationTracking::None,
            knockback: false,
            use_endurance: true,
            use_stunned: true,
            automation: AutomationLevel::None,
            optional_maneuvers: false,
            adjustment_return_seconds: default_adjustment_return_seconds(),
            range_factor: default_range_factor(),
            range_factor_5e: default_range_factor_5e(),
            adjustment_multipliers: BTreeMap::new(),
        }
    }
}

impl RulesConfig {
    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let rules: RulesConfig = super::load_toml(path)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let rules: RulesConfig = super::parse_toml(content)?;
        rules.validate()?;
        Ok(rules)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.range_factor <= 0.0 || self.range_factor_5e <= 0.0 {
            return Err(ConfigError::ValidationError(
                "range factors must be positive".to_string(),
            ));
        }
        if self.adjustment_return_seconds < 0.0 {
            return Err(ConfigError::ValidationError(
                "adjustment_return_seconds cannot be negative".to_string(),
            ));
        }
        for (key, multiplier) in &self.adjustment_multipliers {
            if Characteristic::from_key(key).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "unknown characteristic {key} in adjustment_multipliers"
                )));
            }
            if *multiplier <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "adjustment multiplier for {key} must be positive, got {multiplier}"
                )));
            }
        }
        Ok(())
    }

    /// Range band size for the given edition
    pub fn range_factor_for(&self, edition: Edition) -> f64 {
        match edition {
            Edition::Fifth => self.range_factor_5e,
            Edition::Sixth => self.range_factor,
        }
    }

    pub fn adjustment_multiplier(&self, characteristic: Characteristic) -> f64 {
        self.adjustment_multipliers
            .iter()
            .find(|(key, _)| Characteristic::from_key(key) == Some(characteristic))
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }
}

fn default_true() -> bool {
    true
}
fn default_adjustment_return_seconds() -> f64 {
    12.0
}
fn default_range_factor() -> f64 {
    8.0
}
fn default_range_factor_5e() -> f64 {
    4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_table_defaults() {
        let rules = RulesConfig::default();
        assert!(!rules.hit_locations);
        assert!(!rules.knockback);
        assert!(rules.use_endurance);
        assert!(rules.use_stunned);
        assert_eq!(rules.automation, AutomationLevel::None);
        assert!((rules.range_factor_for(Edition::Sixth) - 8.0).abs() < f64::EPSILON);
        assert!((rules.range_factor_for(Edition::Fifth) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_partial_rules() {
        let rules = RulesConfig::parse(
            r#"
hit_locations = true
knockback = true
automation = "npc_only"

[adjustment_multipliers]
DEX = 2.0
"#,
        )
        .unwrap();
        assert!(rules.hit_locations);
        assert!(rules.knockback);
        assert!(rules.use_endurance);
        assert_eq!(rules.automation, AutomationLevel::NpcOnly);
        assert!((rules.adjustment_multiplier(Characteristic::Dex) - 2.0).abs() < f64::EPSILON);
        assert!((rules.adjustment_multiplier(Characteristic::Str) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_bad_range_factor() {
        let err = RulesConfig::parse("range_factor = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_unknown_multiplier_key() {
        let err = RulesConfig::parse("[adjustment_multipliers]\nLUCK = 2.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_automation_levels() {
        use CharacterKind::*;
        assert!(!AutomationLevel::None.writes_endurance(Pc));
        assert!(AutomationLevel::NpcOnly.writes_damage(Npc));
        assert!(!AutomationLevel::NpcOnly.writes_endurance(Pc));
        assert!(AutomationLevel::PcEndOnly.writes_endurance(Pc));
        assert!(!AutomationLevel::PcEndOnly.writes_damage(Pc));
        assert!(AutomationLevel::All.writes_damage(Pc));
    }
}
