//! Reasons an attack or activation is refused before any roll

use crate::adjustment::AdjustmentError;
use thiserror::Error;

/// A precondition failure; the character is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttackRefusal {
    #[error("{name} cannot act: {reason}")]
    CannotAct { name: String, reason: String },

    #[error("{power} has no charges remaining")]
    NoCharges { power: String },

    #[error("{power} needs {needed} END but the endurance reserve holds {available}")]
    ReserveExhausted {
        power: String,
        needed: i32,
        available: i32,
    },

    #[error("{power} needs {needed} END to activate but only {available} is left")]
    InsufficientEndurance {
        power: String,
        needed: i32,
        available: i32,
    },

    #[error("{character} has no power {power}")]
    UnknownPower { power: String, character: String },

    #[error("{0} is not an attack")]
    NotAnAttack(String),

    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),
}
