//! hero_core - Combat and power resolution for point-buy superhero characters
//!
//! This library provides:
//! - Character: characteristics, powers and timed effects
//! - PowerCatalog: power definitions loaded from TOML
//! - Costs: active/real points, END, damage classes, areas of effect
//! - Attack Resolution: preconditions, END, to-hit rolls and areas
//! - Damage Resolution: dice, defenses, hit locations, STUN/BODY, knockback
//! - Adjustments: Aid, Drain, Transfer, Healing, Suppress and Flash

pub mod adjustment;
pub mod attack;
pub mod catalog;
pub mod character;
pub mod combat;
pub mod config;
pub mod cost;
pub mod damage;
pub mod defense;
pub mod dice;
pub mod effect;
pub mod knockback;
pub mod power;
pub mod prelude;
pub mod rounding;
pub mod types;

// Re-export core types for convenience
pub use adjustment::{apply_adjustment, resolve_adjustment, AdjustmentError, AdjustmentReport};
pub use attack::{place_aoe, resolve_to_hit, AttackOptions, AttackRefusal, Target, ToHitResult};
pub use catalog::{HitLocation, Maneuver, PowerCatalog, PowerDefinition};
pub use character::Character;
pub use combat::{resolve_damage, roll_attack_damage, CombatResult, DamageApplication};
pub use config::{AutomationLevel, ConfigError, RulesConfig};
pub use cost::{compute_costs, CostContext, PowerCosts};
pub use defense::{determine_defenses, DefenseProfile};
pub use dice::{DamageRoll, DiceRoller, RngDice, ScriptedDice};
pub use power::PowerInstance;
pub use types::{CharacterKind, Characteristic, Condition, Edition};
