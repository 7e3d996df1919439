//! Power catalog loading

use crate::catalog::{ModifierInfo, PowerCatalog, PowerDefinition, PowerOverride};
use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Container for catalog tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub powers: Vec<PowerDefinition>,
    #[serde(default)]
    pub powers_5e: Vec<PowerOverride>,
    #[serde(default)]
    pub modifiers: Vec<ModifierInfo>,
}

impl CatalogConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for power in &self.powers {
            if power.id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "power with empty id".to_string(),
                ));
            }
            if !seen.insert(power.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate power id {}",
                    power.id
                )));
            }
        }
        Ok(())
    }

    fn into_catalog(self) -> PowerCatalog {
        let mut catalog = PowerCatalog::new();
        for power in self.powers {
            catalog.register(power);
        }
        for o in self.powers_5e {
            catalog.register_fifth(o);
        }
        for modifier in self.modifiers {
            catalog.register_modifier(modifier);
        }
        catalog
    }
}

/// Load a catalog from a TOML file
pub fn load_catalog(path: &Path) -> Result<PowerCatalog, ConfigError> {
    let config: CatalogConfig = super::load_toml(path)?;
    config.validate()?;
    Ok(config.into_catalog())
}

/// Load a catalog from a TOML string
pub fn parse_catalog(content: &str) -> Result<PowerCatalog, ConfigError> {
    let config: CatalogConfig = super::parse_toml(content)?;
    config.validate()?;
    Ok(config.into_catalog())
}

/// The embedded catalog
pub fn default_catalog() -> PowerCatalog {
    let powers = include_str!("../../config/powers.toml");
    let modifiers = include_str!("../../config/modifiers.toml");

    let mut catalog = parse_catalog(powers).unwrap_or_else(|e| {
        tracing::error!(error = %e, "embedded power catalog failed to parse, using minimal set");
        PowerCatalog::minimal()
    });
    match super::parse_toml::<CatalogConfig>(modifiers) {
        Ok(config) => {
            for modifier in config.modifiers {
                catalog.register_modifier(modifier);
            }
        }
        Err(e) => tracing::error!(error = %e, "embedded modifier table failed to parse"),
    }
    catalog
}
