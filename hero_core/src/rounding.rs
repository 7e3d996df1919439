//! Rounding rules
//!
//! The game rounds to the nearest whole number, with exact halves broken
//! toward whichever side benefits the player: costs and damage after
//! defenses round halves down, while target combat values round halves up.

/// Values within this distance of a half are treated as exact halves,
/// so accumulated float error (`4.4999999`) does not flip the result.
const HALF_TOLERANCE: f64 = 1e-9;

/// Round to nearest, exact halves round down (2.5 -> 2)
pub fn round_favor_player_down(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor <= 0.5 + HALF_TOLERANCE {
        floor
    } else {
        floor + 1.0
    }
}

/// Round to nearest, exact halves round up (2.5 -> 3)
pub fn round_favor_player_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 - HALF_TOLERANCE {
        floor + 1.0
    } else {
        floor
    }
}

/// `round_favor_player_down` as an integer
pub fn round_down_i32(value: f64) -> i32 {
    round_favor_player_down(value) as i32
}

/// `round_favor_player_up` as an integer
pub fn round_up_i32(value: f64) -> i32 {
    round_favor_player_up(value) as i32
}

/// Ceiling that ignores float noise just above a whole number
pub fn ceil_whole(value: f64) -> f64 {
    (value - HALF_TOLERANCE).ceil()
}

/// Floor that ignores float noise just below a whole number
pub fn floor_whole(value: f64) -> f64 {
    (value + HALF_TOLERANCE).floor()
}
