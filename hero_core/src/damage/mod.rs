//! Damage resolution
//!
//! [`damage_classes`] turns a power and the attacker's declared options
//! into a dice formula, [`roll_damage`] rolls it (or takes its standard
//! effect), and [`calculate_damage`] runs the roll through the defender's
//! defenses to the STUN and BODY actually taken.

mod classes;
mod pipeline;

pub use classes::{damage_classes, roll_damage, DamageDice};
pub use pipeline::{calculate_damage, DamageDetail};
