//! Power catalog
//!
//! Static classification data for every power and modifier identifier.
//! Sixth-edition entries are the baseline and fifth-edition entries are
//! layered over them, so [`PowerCatalog::lookup`] is a pure function of
//! `(identifier, edition)`.

mod definition;
mod hit_location;
mod maneuver;
mod modifier;

pub use definition::{
    AdjustmentKind, FrameworkKind, PowerBehavior, PowerCategory, PowerDefinition, PowerFacet,
    PowerOverride,
};
pub use hit_location::{HitLocation, LocationMultipliers, Side};
pub use maneuver::{Maneuver, ManeuverInfo};
pub use modifier::ModifierInfo;

use crate::types::{DurationClass, Edition, RangeClass};
use std::collections::HashMap;

/// Power and modifier lookup tables
#[derive(Debug, Clone, Default)]
pub struct PowerCatalog {
    powers: HashMap<String, PowerDefinition>,
    fifth: HashMap<String, PowerOverride>,
    modifiers: HashMap<String, ModifierInfo>,
}

impl PowerCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        PowerCatalog {
            powers: HashMap::new(),
            fifth: HashMap::new(),
            modifiers: HashMap::new(),
        }
    }

    /// Register a sixth-edition power
    pub fn register(&mut self, definition: PowerDefinition) {
        self.powers.insert(definition.id.clone(), definition);
    }

    /// Register a fifth-edition override
    pub fn register_fifth(&mut self, o: PowerOverride) {
        self.fifth.insert(o.id.clone(), o);
    }

    pub fn register_modifier(&mut self, info: ModifierInfo) {
        self.modifiers.insert(info.id.clone(), info);
    }

    /// Get the sixth-edition entry
    pub fn get(&self, id: &str) -> Option<&PowerDefinition> {
        self.powers.get(id)
    }

    /// Definition of `id` under `edition`
    ///
    /// Powers that only exist in fifth edition (COM) are not found under
    /// sixth. Callers treat `None` as "use only the data on the item".
    pub fn lookup(&self, id: &str, edition: Edition) -> Option<PowerDefinition> {
        match edition {
            Edition::Sixth => self.powers.get(id).cloned(),
            Edition::Fifth => match (self.powers.get(id), self.fifth.get(id)) {
                (Some(base), Some(o)) => Some(base.with_override(o)),
                (Some(base), None) => Some(base.clone()),
                (None, Some(o)) => Some(PowerDefinition::from(o)),
                (None, None) => None,
            },
        }
    }

    pub fn modifier(&self, id: &str) -> Option<&ModifierInfo> {
        self.modifiers.get(id)
    }

    /// Number of sixth-edition powers
    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// Load the embedded catalog
    pub fn with_defaults() -> Self {
        crate::config::default_catalog()
    }

    /// Smallest usable catalog: the primary characteristics and basic attacks
    pub fn minimal() -> Self {
        let mut catalog = Self::new();

        let characteristics: [(&str, i32, f64); 18] = [
            ("STR", 10, 1.0),
            ("DEX", 10, 2.0),
            ("CON", 10, 1.0),
            ("INT", 10, 1.0),
            ("EGO", 10, 1.0),
            ("PRE", 10, 1.0),
            ("OCV", 3, 5.0),
            ("DCV", 3, 5.0),
            ("OMCV", 3, 3.0),
            ("DMCV", 3, 3.0),
            ("SPD", 2, 10.0),
            ("PD", 2, 1.0),
            ("ED", 2, 1.0),
            ("REC", 4, 1.0),
            ("END", 20, 0.2),
            ("BODY", 10, 1.0),
            ("STUN", 20, 0.5),
            ("RUNNING", 12, 1.0),
        ];
        for (id, base, cost) in characteristics {
            catalog.register(PowerDefinition {
                categories: vec![PowerCategory::Characteristic],
                behaviors: vec![PowerBehavior::Characteristic],
                base,
                cost,
                duration: Some(DurationClass::Persistent),
                cost_end: Some(id == "STR"),
                ..PowerDefinition::new(id)
            });
        }

        let attacks: [(&str, f64, RangeClass); 3] = [
            ("ENERGYBLAST", 5.0, RangeClass::Standard),
            ("RKA", 15.0, RangeClass::Standard),
            ("HKA", 15.0, RangeClass::NoRange),
        ];
        for (id, cpl, range) in attacks {
            catalog.register(PowerDefinition {
                categories: vec![PowerCategory::Attack],
                behaviors: vec![PowerBehavior::Attack, PowerBehavior::Dice],
                cost_per_level: Some(cpl),
                range: Some(range),
                cost_end: Some(true),
                ..PowerDefinition::new(id)
            });
        }

        catalog
    }
}
