//! Modifier cost table

use serde::{Deserialize, Serialize};

/// Catalog data for an advantage, limitation or adder identifier
///
/// Most modifiers carry their cost on the imported record; an entry here
/// only overrides that cost or marks the modifier as one that changes how
/// the victim takes damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierInfo {
    pub id: String,
    #[serde(default)]
    pub base_cost: Option<f64>,
    /// Scales a limitation's value
    #[serde(default)]
    pub multiplier: Option<f64>,
    /// Counts toward active points for damage classes
    #[serde(default)]
    pub dc: bool,
}

impl ModifierInfo {
    pub fn new(id: impl Into<String>) -> Self {
        ModifierInfo {
            id: id.into(),
            base_cost: None,
            multiplier: None,
            dc: false,
        }
    }

    pub fn with_dc(mut self) -> Self {
        self.dc = true;
        self
    }
}
