//! Adders and modifiers as declared on a power

use serde::{Deserialize, Serialize};

/// A sub-parameter of a power or modifier with its own cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adder {
    pub xmlid: String,
    #[serde(default)]
    pub base_cost: f64,
    /// Cost per level when `base_cost` is 0
    #[serde(default)]
    pub lvl_cost: Option<f64>,
    /// Levels bought per `lvl_cost`
    #[serde(default)]
    pub lvl_val: Option<i32>,
    #[serde(default)]
    pub levels: i32,
    #[serde(default = "default_true")]
    pub selected: bool,
    /// Scales a limitation this adder belongs to
    #[serde(default)]
    pub multiplier: Option<f64>,
    #[serde(default)]
    pub option_id: Option<String>,
    #[serde(default)]
    pub adders: Vec<Adder>,
}

impl Adder {
    pub fn new(xmlid: impl Into<String>, base_cost: f64) -> Self {
        Adder {
            xmlid: xmlid.into(),
            base_cost,
            lvl_cost: None,
            lvl_val: None,
            levels: 0,
            selected: true,
            multiplier: None,
            option_id: None,
            adders: Vec::new(),
        }
    }

    pub fn with_levels(mut self, levels: i32) -> Self {
        self.levels = levels;
        self
    }
}

/// An advantage (non-negative cost) or limitation (negative cost)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub xmlid: String,
    /// Declared cost; limitations are negative
    #[serde(default)]
    pub base_cost: f64,
    #[serde(default)]
    pub levels: i32,
    #[serde(default)]
    pub option_id: Option<String>,
    #[serde(default)]
    pub option_alias: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    /// Private modifiers on a naked advantage apply to the advantage itself
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub adders: Vec<Adder>,
}

impl Modifier {
    pub fn new(xmlid: impl Into<String>, base_cost: f64) -> Self {
        Modifier {
            xmlid: xmlid.into(),
            base_cost,
            levels: 0,
            option_id: None,
            option_alias: None,
            input: None,
            private: false,
            adders: Vec::new(),
        }
    }

    pub fn with_option(mut self, option_id: impl Into<String>) -> Self {
        self.option_id = Some(option_id.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.option_alias = Some(alias.into());
        self
    }

    pub fn with_levels(mut self, levels: i32) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn with_adder(mut self, adder: Adder) -> Self {
        self.adders.push(adder);
        self
    }

    pub fn is_limitation(&self) -> bool {
        self.base_cost < 0.0
    }

    pub fn find_adder(&self, xmlid: &str) -> Option<&Adder> {
        self.adders.iter().find(|a| a.xmlid == xmlid)
    }

    pub fn option_is(&self, option_id: &str) -> bool {
        self.option_id.as_deref() == Some(option_id)
    }

    /// Leading number of the option alias or option id (`"14- roll"` -> 14)
    pub fn option_number(&self) -> Option<i32> {
        self.option_alias
            .as_deref()
            .and_then(leading_number)
            .or_else(|| self.option_id.as_deref().and_then(leading_number))
    }
}

fn leading_number(text: &str) -> Option<i32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn default_true() -> bool {
    true
}
