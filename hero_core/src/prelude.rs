//! Prelude module for convenient imports
//!
//! ```rust
//! use hero_core::prelude::*;
//! ```

// Characters and powers
pub use crate::character::Character;
pub use crate::power::{Adder, Modifier, PowerInstance};
pub use crate::types::{CharacterKind, Characteristic, Condition, Edition, Tag};

// Catalog and rules
pub use crate::catalog::{HitLocation, Maneuver, PowerCatalog};
pub use crate::config::{AutomationLevel, HitLocationTracking, RulesConfig};

// Dice
pub use crate::dice::{DamageRoll, DiceRoller, DiceSpec, RngDice, ScriptedDice};

// Attacks
pub use crate::attack::{place_aoe, resolve_to_hit, AttackOptions, AttackRefusal, AttackState, Target};

// Damage and effects
pub use crate::combat::{resolve_damage, roll_attack_damage, CombatResult, DamageApplication};
pub use crate::effect::{start_phase, tick_effects, TimedEffect};
