//! Scenario files: who is in the fight and who attacks whom

use hero_core::attack::AttackOptions;
use hero_core::character::Character;
use hero_core::config::{load_toml, parse_toml, ConfigError, RulesConfig};
use hero_core::power::PowerInstance;
use hero_core::types::{CharacterKind, Characteristic, Edition};
use hero_core::PowerCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("scenario has no character {0}")]
    UnknownCharacter(String),

    #[error("scenario is invalid: {0}")]
    Invalid(String),
}

/// A fight loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    /// Seed used when none is given on the command line
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default)]
    pub rules: RulesConfig,
    pub characters: Vec<CharacterSpec>,
    /// Attacks made each round, in order
    pub attacks: Vec<AttackSpec>,
}

fn default_rounds() -> u32 {
    1
}

/// A character as written in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: CharacterKind,
    #[serde(default)]
    pub edition: Edition,
    /// Values that differ from the catalog base, keyed "STR", "DEX", ...
    #[serde(default)]
    pub characteristics: BTreeMap<String, i32>,
    #[serde(default)]
    pub powers: Vec<PowerInstance>,
    /// Ids of powers switched on (and paid for) before the first round
    #[serde(default)]
    pub activate: Vec<String>,
}

/// One attack repeated every round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackSpec {
    pub attacker: String,
    pub power: String,
    pub defender: String,
    /// Range from attacker to defender
    #[serde(default)]
    pub distance: f64,
    /// Distance from an explosion's center
    #[serde(default)]
    pub from_center: f64,
    #[serde(default)]
    pub options: AttackOptions,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let scenario: Scenario = load_toml(path)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn parse(content: &str) -> Result<Self, SimError> {
        let scenario: Scenario = parse_toml(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), SimError> {
        if self.characters.is_empty() {
            return Err(SimError::Invalid("no characters".to_string()));
        }
        for (i, character) in self.characters.iter().enumerate() {
            if self.characters[..i].iter().any(|c| c.id == character.id) {
                return Err(SimError::Invalid(format!(
                    "character id {} is used twice",
                    character.id
                )));
            }
            if let Some(key) = character
                .characteristics
                .keys()
                .find(|k| Characteristic::from_key(k).is_none())
            {
                return Err(SimError::Invalid(format!(
                    "{} has unknown characteristic {key}",
                    character.id
                )));
            }
        }
        for attack in &self.attacks {
            for id in [&attack.attacker, &attack.defender] {
                if !self.characters.iter().any(|c| &c.id == id) {
                    return Err(SimError::UnknownCharacter(id.clone()));
                }
            }
        }
        Ok(())
    }

    /// Build every character, filling unset characteristics from the catalog
    pub fn build_characters(&self, catalog: &PowerCatalog) -> Vec<Character> {
        self.characters
            .iter()
            .map(|spec| {
                let mut character = Character::new(spec.id.clone(), spec.name.clone())
                    .with_kind(spec.kind)
                    .with_edition(spec.edition);
                for (key, value) in &spec.characteristics {
                    if let Some(characteristic) = Characteristic::from_key(key) {
                        character = character.with_characteristic(characteristic, *value);
                    }
                }
                let character = spec
                    .powers
                    .iter()
                    .cloned()
                    .fold(character, |c, power| c.with_power(power));
                character.with_base_characteristics(catalog)
            })
            .collect()
    }
}
