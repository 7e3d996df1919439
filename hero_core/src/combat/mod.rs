//! Combat resolution - Apply a rolled hit to a defender

mod resolution;
mod result;

pub use resolution::{resolve_damage, roll_attack_damage, DamageApplication, RolledDamage};
pub use result::CombatResult;
