//! Power definitions and their behavioral facets

use crate::types::{Characteristic, DurationClass, RangeClass};
use serde::{Deserialize, Serialize};

/// Catalog category a power belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerCategory {
    Characteristic,
    Attack,
    Defense,
    Movement,
    Skill,
    Adjustment,
    Sense,
    SenseAffecting,
    Framework,
    Talent,
    Perk,
    Enhancer,
    Standard,
    Special,
    BodyAffecting,
    Mental,
    Martial,
    Compound,
    Custom,
    Automaton,
    Disadvantage,
    Size,
}

/// Behavior flags driving how the engines treat a power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerBehavior {
    Attack,
    Dice,
    Activatable,
    Adjustment,
    SenseAffecting,
    Movement,
    Characteristic,
    Framework,
    Skill,
    Enhancer,
}

/// Adjustment powers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Aid,
    Drain,
    Transfer,
    Healing,
    Suppress,
}

impl AdjustmentKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "AID" => Some(AdjustmentKind::Aid),
            "DRAIN" => Some(AdjustmentKind::Drain),
            "TRANSFER" => Some(AdjustmentKind::Transfer),
            "HEALING" => Some(AdjustmentKind::Healing),
            "SUPPRESS" => Some(AdjustmentKind::Suppress),
            _ => None,
        }
    }

    /// Drain-like adjustments lower the target and are resisted by Power Defense
    pub fn is_negative(self) -> bool {
        matches!(
            self,
            AdjustmentKind::Drain | AdjustmentKind::Transfer | AdjustmentKind::Suppress
        )
    }
}

/// Power frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkKind {
    List,
    VariablePowerPool,
    ElementalControl,
    Multipower,
}

impl FrameworkKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "LIST" => Some(FrameworkKind::List),
            "VPP" => Some(FrameworkKind::VariablePowerPool),
            "ELEMENTAL_CONTROL" => Some(FrameworkKind::ElementalControl),
            "MULTIPOWER" => Some(FrameworkKind::Multipower),
            _ => None,
        }
    }
}

/// The single facet an engine dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerFacet {
    Characteristic(Characteristic),
    Adjustment(AdjustmentKind),
    SenseAffecting,
    Attack,
    Framework(FrameworkKind),
    Enhancer,
    Skill,
    Movement,
    Defense,
    Other,
}

/// Immutable catalog entry for one power identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerDefinition {
    pub id: String,
    #[serde(default)]
    pub categories: Vec<PowerCategory>,
    #[serde(default)]
    pub behaviors: Vec<PowerBehavior>,
    /// Base value for characteristics
    #[serde(default)]
    pub base: i32,
    /// Character points per point of characteristic
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub cost_per_level: Option<f64>,
    #[serde(default)]
    pub duration: Option<DurationClass>,
    #[serde(default)]
    pub range: Option<RangeClass>,
    #[serde(default)]
    pub cost_end: Option<bool>,
}

/// Fifth-edition differences layered over a sixth-edition entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerOverride {
    pub id: String,
    #[serde(default)]
    pub categories: Option<Vec<PowerCategory>>,
    #[serde(default)]
    pub behaviors: Option<Vec<PowerBehavior>>,
    #[serde(default)]
    pub base: Option<i32>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub cost_per_level: Option<f64>,
    #[serde(default)]
    pub duration: Option<DurationClass>,
    #[serde(default)]
    pub range: Option<RangeClass>,
    #[serde(default)]
    pub cost_end: Option<bool>,
}

impl PowerDefinition {
    /// A bare entry with no categories
    pub fn new(id: impl Into<String>) -> Self {
        PowerDefinition {
            id: id.into(),
            categories: Vec::new(),
            behaviors: Vec::new(),
            base: 0,
            cost: 0.0,
            cost_per_level: None,
            duration: None,
            range: None,
            cost_end: None,
        }
    }

    pub fn has_category(&self, category: PowerCategory) -> bool {
        self.categories.contains(&category)
    }

    pub fn has_behavior(&self, behavior: PowerBehavior) -> bool {
        self.behaviors.contains(&behavior)
    }

    pub fn costs_endurance(&self) -> bool {
        self.cost_end.unwrap_or(false)
    }

    pub fn is_attack(&self) -> bool {
        self.has_category(PowerCategory::Attack) || self.has_behavior(PowerBehavior::Attack)
    }

    /// Pick the facet engines dispatch on
    ///
    /// A power can sit in several categories (Flash is an attack and
    /// sense-affecting); the most specific facet wins.
    pub fn facet(&self) -> PowerFacet {
        if self.has_category(PowerCategory::Characteristic) {
            if let Some(c) = Characteristic::from_key(&self.id) {
                return PowerFacet::Characteristic(c);
            }
        }
        if self.has_category(PowerCategory::Adjustment) {
            if let Some(kind) = AdjustmentKind::from_id(&self.id) {
                return PowerFacet::Adjustment(kind);
            }
        }
        if self.has_category(PowerCategory::SenseAffecting) && self.is_attack() {
            return PowerFacet::SenseAffecting;
        }
        if self.is_attack() {
            return PowerFacet::Attack;
        }
        if self.has_category(PowerCategory::Framework) {
            if let Some(kind) = FrameworkKind::from_id(&self.id) {
                return PowerFacet::Framework(kind);
            }
        }
        if self.has_category(PowerCategory::Enhancer) {
            return PowerFacet::Enhancer;
        }
        if self.has_category(PowerCategory::Skill) {
            return PowerFacet::Skill;
        }
        if self.has_category(PowerCategory::Movement) {
            return PowerFacet::Movement;
        }
        if self.has_category(PowerCategory::Defense) {
            return PowerFacet::Defense;
        }
        PowerFacet::Other
    }

    /// Layer a fifth-edition override over this entry
    pub fn with_override(&self, o: &PowerOverride) -> PowerDefinition {
        PowerDefinition {
            id: self.id.clone(),
            categories: o.categories.clone().unwrap_or_else(|| self.categories.clone()),
            behaviors: o.behaviors.clone().unwrap_or_else(|| self.behaviors.clone()),
            base: o.base.unwrap_or(self.base),
            cost: o.cost.unwrap_or(self.cost),
            cost_per_level: o.cost_per_level.or(self.cost_per_level),
            duration: o.duration.or(self.duration),
            range: o.range.or(self.range),
            cost_end: o.cost_end.or(self.cost_end),
        }
    }
}

impl From<&PowerOverride> for PowerDefinition {
    fn from(o: &PowerOverride) -> Self {
        PowerDefinition::new(o.id.clone()).with_override(o)
    }
}
