//! Core types shared by every engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rules edition a character is built under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edition {
    /// Older rule set (COMELINESS, 1d6-1 stun multiplier, 4" range bands)
    Fifth,
    #[default]
    Sixth,
}

impl Edition {
    pub fn is_fifth(self) -> bool {
        self == Edition::Fifth
    }
}

/// Player character or non-player character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterKind {
    Pc,
    #[default]
    Npc,
}

/// A characteristic tracked as a current/max pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Characteristic {
    Str,
    Dex,
    Con,
    Int,
    Ego,
    Pre,
    Com,
    Ocv,
    Dcv,
    Omcv,
    Dmcv,
    Spd,
    Pd,
    Ed,
    Rec,
    End,
    Body,
    Stun,
    Running,
    Swimming,
    Leaping,
}

impl Characteristic {
    /// All characteristics in sheet order
    pub fn all() -> &'static [Characteristic] {
        &[
            Characteristic::Str,
            Characteristic::Dex,
            Characteristic::Con,
            Characteristic::Int,
            Characteristic::Ego,
            Characteristic::Pre,
            Characteristic::Com,
            Characteristic::Ocv,
            Characteristic::Dcv,
            Characteristic::Omcv,
            Characteristic::Dmcv,
            Characteristic::Spd,
            Characteristic::Pd,
            Characteristic::Ed,
            Characteristic::Rec,
            Characteristic::End,
            Characteristic::Body,
            Characteristic::Stun,
            Characteristic::Running,
            Characteristic::Swimming,
            Characteristic::Leaping,
        ]
    }

    /// Catalog identifier (`"STR"`, `"RUNNING"`, ...)
    pub fn key(self) -> &'static str {
        match self {
            Characteristic::Str => "STR",
            Characteristic::Dex => "DEX",
            Characteristic::Con => "CON",
            Characteristic::Int => "INT",
            Characteristic::Ego => "EGO",
            Characteristic::Pre => "PRE",
            Characteristic::Com => "COM",
            Characteristic::Ocv => "OCV",
            Characteristic::Dcv => "DCV",
            Characteristic::Omcv => "OMCV",
            Characteristic::Dmcv => "DMCV",
            Characteristic::Spd => "SPD",
            Characteristic::Pd => "PD",
            Characteristic::Ed => "ED",
            Characteristic::Rec => "REC",
            Characteristic::End => "END",
            Characteristic::Body => "BODY",
            Characteristic::Stun => "STUN",
            Characteristic::Running => "RUNNING",
            Characteristic::Swimming => "SWIMMING",
            Characteristic::Leaping => "LEAPING",
        }
    }

    /// Parse a catalog identifier, case-insensitive
    pub fn from_key(key: &str) -> Option<Characteristic> {
        let upper = key.trim().to_ascii_uppercase();
        Characteristic::all().iter().copied().find(|c| c.key() == upper)
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How long a power stays in effect once used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationClass {
    Instant,
    Constant,
    Persistent,
    Inherent,
}

/// Range class of a power after range modifiers are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeClass {
    #[serde(rename = "self")]
    SelfOnly,
    NoRange,
    Standard,
    LineOfSight,
    LimitedRange,
    RangeBasedOnStr,
    NoRangeModifiers,
    LimitedNormalRange,
}

impl RangeClass {
    /// Whether the range penalty applies to attacks of this class
    pub fn uses_range_penalty(self) -> bool {
        matches!(
            self,
            RangeClass::Standard | RangeClass::LimitedRange | RangeClass::RangeBasedOnStr
        )
    }
}

/// Which damage pools an attack affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StunBodyDamage {
    #[default]
    StunBody,
    StunOnly,
    BodyOnly,
    EffectOnly,
}

/// Offensive combat value an attack is rolled with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatValue {
    #[default]
    Ocv,
    Omcv,
}

impl CombatValue {
    pub fn characteristic(self) -> Characteristic {
        match self {
            CombatValue::Ocv => Characteristic::Ocv,
            CombatValue::Omcv => Characteristic::Omcv,
        }
    }
}

/// Defensive combat value an attack is rolled against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefendsWith {
    #[default]
    Dcv,
    Dmcv,
}

impl DefendsWith {
    pub fn characteristic(self) -> Characteristic {
        match self {
            DefendsWith::Dcv => Characteristic::Dcv,
            DefendsWith::Dmcv => Characteristic::Dmcv,
        }
    }
}

/// Broad class of an attack, used to pick defenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackClass {
    #[default]
    Physical,
    Energy,
    Mental,
    Adjustment,
    Flash,
    Avad,
    Entangle,
    Other,
}

/// One contribution to a roll, kept for the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub value: i32,
    pub label: String,
}

impl Tag {
    pub fn new(value: i32, label: impl Into<String>) -> Self {
        Tag {
            value,
            label: label.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+} {}", self.value, self.label)
    }
}

/// Conditions tracked through timed effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Stunned,
    KnockedOut,
    Aborted,
    Blind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characteristic_keys_round_trip() {
        for c in Characteristic::all() {
            assert_eq!(Characteristic::from_key(c.key()), Some(*c));
        }
        assert_eq!(Characteristic::from_key("str"), Some(Characteristic::Str));
        assert_eq!(Characteristic::from_key("FLIGHT"), None);
    }

    #[test]
    fn test_characteristic_serde_uses_catalog_keys() {
        let json = serde_json::to_string(&Characteristic::Dmcv).unwrap();
        assert_eq!(json, "\"DMCV\"");
    }

    #[test]
    fn test_range_class_penalty() {
        assert!(RangeClass::Standard.uses_range_penalty());
        assert!(!RangeClass::LineOfSight.uses_range_penalty());
        assert!(!RangeClass::NoRangeModifiers.uses_range_penalty());
        assert!(!RangeClass::SelfOnly.uses_range_penalty());
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::new(-2, "range penalty").to_string(), "-2 range penalty");
        assert_eq!(Tag::new(1, "Set").to_string(), "+1 Set");
    }
}
