//! Purchased powers
//!
//! A [`PowerInstance`] is the declared record of a power as bought: its
//! catalog identifier, levels, adders and modifiers. Derived numbers (active
//! points, real cost, damage classes) are never stored here; the cost engine
//! computes them from the record on demand.

mod modifier;

pub use modifier::{Adder, Modifier};

use crate::types::StunBodyDamage;
use serde::{Deserialize, Serialize};

/// Remaining uses of a power bought with Charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charges {
    pub value: i32,
    pub max: i32,
    #[serde(default)]
    pub recoverable: bool,
}

/// Current/max pair for a pool carried by a power (Endurance Reserve)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub value: i32,
    pub max: i32,
}

/// Defense bought inside a Force Field, Armor or Barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DefenseLevels {
    #[serde(default)]
    pub pd: i32,
    #[serde(default)]
    pub ed: i32,
    #[serde(default)]
    pub md: i32,
    #[serde(default)]
    pub power: i32,
}

/// Dimensions of a Barrier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BarrierLevels {
    #[serde(default)]
    pub body: i32,
    #[serde(default)]
    pub length: i32,
    #[serde(default)]
    pub height: i32,
    /// Extra thickness in meters, bought in half-meter steps
    #[serde(default)]
    pub width: f64,
}

/// Points of a Combat Skill Level assigned for the current phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatLevelAllocation {
    #[serde(default)]
    pub ocv: i32,
    #[serde(default)]
    pub omcv: i32,
    #[serde(default)]
    pub dcv: i32,
    #[serde(default)]
    pub dmcv: i32,
    /// Levels spent on damage classes
    #[serde(default)]
    pub dc: i32,
}

/// A power as purchased by a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerInstance {
    /// Unique within the owning character
    pub id: String,
    /// Catalog identifier
    pub xmlid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub levels: i32,
    #[serde(default)]
    pub base_cost: f64,
    /// Explicit cost per level; otherwise taken from the catalog
    #[serde(default)]
    pub cost_per_level: Option<f64>,
    #[serde(default)]
    pub option_id: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub adders: Vec<Adder>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    #[serde(default)]
    pub everyman: bool,
    #[serde(default)]
    pub native_tongue: bool,
    /// Fixed slot in a Multipower
    #[serde(default)]
    pub ultra_slot: bool,
    #[serde(default)]
    pub add_modifiers_to_base: bool,
    /// Id of the framework or enhancer this power sits in
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub charges: Option<Charges>,
    /// Draw END from the character's Endurance Reserve
    #[serde(default)]
    pub use_end_reserve: bool,
    /// Stored END, for an Endurance Reserve
    #[serde(default)]
    pub reserve: Option<Pool>,
    #[serde(default)]
    pub standard_effect: bool,
    /// Maneuver effect text
    #[serde(default)]
    pub effect: Option<String>,
    /// OCV modifier while using this power
    #[serde(default)]
    pub ocv: i32,
    /// DCV modifier until the attacker's next phase
    #[serde(default)]
    pub dcv: i32,
    #[serde(default)]
    pub stun_body: Option<StunBodyDamage>,
    #[serde(default)]
    pub no_hit_locations: bool,
    #[serde(default)]
    pub defense: DefenseLevels,
    #[serde(default)]
    pub barrier: BarrierLevels,
    /// Duplication points
    #[serde(default)]
    pub points: i32,
    /// Follower base points
    #[serde(default)]
    pub base_points: Option<i32>,
    /// Follower count
    #[serde(default)]
    pub number: i32,
    #[serde(default)]
    pub combat_levels: Option<CombatLevelAllocation>,
}

impl PowerInstance {
    pub fn new(id: impl Into<String>, xmlid: impl Into<String>, levels: i32) -> Self {
        let xmlid = xmlid.into();
        PowerInstance {
            id: id.into(),
            name: xmlid.clone(),
            xmlid,
            levels,
            base_cost: 0.0,
            cost_per_level: None,
            option_id: None,
            input: None,
            adders: Vec::new(),
            modifiers: Vec::new(),
            everyman: false,
            native_tongue: false,
            ultra_slot: false,
            add_modifiers_to_base: false,
            parent: None,
            active: true,
            charges: None,
            use_end_reserve: false,
            reserve: None,
            standard_effect: false,
            effect: None,
            ocv: 0,
            dcv: 0,
            stun_body: None,
            no_hit_locations: false,
            defense: DefenseLevels::default(),
            barrier: BarrierLevels::default(),
            points: 0,
            base_points: None,
            number: 0,
            combat_levels: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_adder(mut self, adder: Adder) -> Self {
        self.adders.push(adder);
        self
    }

    pub fn with_option(mut self, option_id: impl Into<String>) -> Self {
        self.option_id = Some(option_id.into());
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn find_modifier(&self, xmlid: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.xmlid == xmlid)
    }

    pub fn find_adder(&self, xmlid: &str) -> Option<&Adder> {
        self.adders.iter().find(|a| a.xmlid == xmlid)
    }

    /// Whether a modifier or adder with this identifier appears anywhere on
    /// the power, including adders nested under modifiers
    pub fn has(&self, xmlid: &str) -> bool {
        self.find_modifier(xmlid).is_some()
            || self.find_adder(xmlid).is_some()
            || self
                .modifiers
                .iter()
                .any(|m| m.find_adder(xmlid).is_some())
    }

    pub fn option_is(&self, option_id: &str) -> bool {
        self.option_id.as_deref() == Some(option_id)
    }

    /// Charges declared by a CHARGES modifier, full
    pub fn declared_charges(&self) -> Option<Charges> {
        let charges = self.find_modifier("CHARGES")?;
        let max = charges.option_number()?;
        Some(Charges {
            value: max,
            max,
            recoverable: charges.find_adder("RECOVERABLE").is_some(),
        })
    }

    /// Fill in state derived from the declared modifiers
    pub fn prepared(mut self) -> Self {
        if self.charges.is_none() {
            self.charges = self.declared_charges();
        }
        self
    }
}

fn default_true() -> bool {
    true
}
