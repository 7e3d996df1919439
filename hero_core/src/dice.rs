//! Dice rolling
//!
//! Every random number the engine needs goes through [`DiceRoller`], so a
//! caller can swap the RNG for a fixed script and replay a combat exactly.

use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Source of die faces
pub trait DiceRoller {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll `count` dice with `sides` faces each
    fn roll_dice(&mut self, count: u32, sides: u32) -> Vec<u32> {
        (0..count).map(|_| self.roll_die(sides)).collect()
    }
}

/// Dice backed by any `rand` RNG
#[derive(Debug, Clone)]
pub struct RngDice<R> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        RngDice { rng }
    }
}

impl RngDice<ThreadRng> {
    /// Dice using the thread-local RNG
    pub fn thread() -> Self {
        RngDice::new(rand::thread_rng())
    }
}

impl<R: Rng> DiceRoller for RngDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rng.gen_range(1..=sides)
    }
}

/// Dice that return a predetermined sequence of faces
///
/// Faces are clamped into `1..=sides` for the die being rolled. Once the
/// script runs out every further roll returns 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        ScriptedDice {
            faces: faces.into_iter().collect(),
        }
    }

    /// Faces not yet consumed
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceRoller for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        match self.faces.pop_front() {
            Some(face) => face.clamp(1, sides),
            None => {
                tracing::warn!(sides, "scripted dice exhausted, rolling 1");
                1
            }
        }
    }
}

/// A plain roll: individual faces and their sum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub faces: Vec<u32>,
    pub total: i32,
}

impl RollResult {
    pub fn from_faces(faces: Vec<u32>) -> Self {
        let total = faces.iter().map(|f| *f as i32).sum();
        RollResult { faces, total }
    }
}

/// Roll 3d6 (to-hit, hit location, skill rolls)
pub fn roll_3d6(dice: &mut impl DiceRoller) -> RollResult {
    RollResult::from_faces(dice.roll_dice(3, 6))
}

/// Roll `count` d6
pub fn roll_d6s(dice: &mut impl DiceRoller, count: u32) -> RollResult {
    RollResult::from_faces(dice.roll_dice(count, 6))
}

/// Remainder after the whole dice of a damage formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraDie {
    #[default]
    None,
    HalfDie,
    PlusOnePip,
    MinusOnePip,
}

/// A damage formula such as `4d6`, `2½d6` or `1d6+1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceSpec {
    pub d6: u32,
    #[serde(default)]
    pub extra: ExtraDie,
}

impl DiceSpec {
    pub fn new(d6: u32, extra: ExtraDie) -> Self {
        DiceSpec { d6, extra }
    }

    pub fn d6(d6: u32) -> Self {
        DiceSpec {
            d6,
            extra: ExtraDie::None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.d6 == 0 && self.extra == ExtraDie::None
    }

    /// Build dice from damage classes
    ///
    /// Killing attacks count 3 DC per die with single DCs becoming a pip and
    /// pairs becoming a half die. Normal attacks count 1 DC per die; a
    /// fractional half or more becomes a half die and a fifth or more a pip.
    pub fn from_damage_classes(dc: f64, killing: bool) -> Self {
        if dc <= 0.0 {
            return DiceSpec::default();
        }
        if killing {
            let pips = dc.floor() as u32;
            let extra = match pips % 3 {
                1 => ExtraDie::PlusOnePip,
                2 => ExtraDie::HalfDie,
                _ => ExtraDie::None,
            };
            DiceSpec::new(pips / 3, extra)
        } else {
            let whole = dc.floor();
            let fraction = dc - whole;
            let extra = if fraction >= 0.5 {
                ExtraDie::HalfDie
            } else if fraction >= 0.2 {
                ExtraDie::PlusOnePip
            } else {
                ExtraDie::None
            };
            DiceSpec::new(whole as u32, extra)
        }
    }

    /// Damage classes this formula is worth
    pub fn damage_classes(&self, killing: bool) -> f64 {
        if killing {
            let extra = match self.extra {
                ExtraDie::None => 0.0,
                ExtraDie::PlusOnePip => 1.0,
                ExtraDie::HalfDie => 2.0,
                ExtraDie::MinusOnePip => -1.0,
            };
            (self.d6 as f64 * 3.0 + extra).max(0.0)
        } else {
            let extra = match self.extra {
                ExtraDie::None => 0.0,
                ExtraDie::PlusOnePip => 0.2,
                ExtraDie::HalfDie => 0.5,
                ExtraDie::MinusOnePip => -0.2,
            };
            (self.d6 as f64 + extra).max(0.0)
        }
    }

    /// Add (or with a negative value remove) whole damage classes
    pub fn add_damage_classes(&self, dc: f64, killing: bool) -> Self {
        DiceSpec::from_damage_classes(self.damage_classes(killing) + dc, killing)
    }

    /// Roll this formula
    pub fn roll(&self, dice: &mut impl DiceRoller) -> DamageRoll {
        let faces = dice.roll_dice(self.d6, 6);
        let half_die = match self.extra {
            ExtraDie::HalfDie => Some(dice.roll_die(3)),
            _ => None,
        };
        DamageRoll {
            faces,
            half_die,
            pip: self.pip(),
            standard_effect: false,
        }
    }

    /// Fixed average result: 3 per die, 1 per half die
    pub fn standard_effect(&self) -> DamageRoll {
        DamageRoll {
            faces: vec![3; self.d6 as usize],
            half_die: (self.extra == ExtraDie::HalfDie).then_some(1),
            pip: self.pip(),
            standard_effect: true,
        }
    }

    pub(crate) fn pip(&self) -> i32 {
        match self.extra {
            ExtraDie::PlusOnePip => 1,
            ExtraDie::MinusOnePip => -1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.extra {
            ExtraDie::None => write!(f, "{}d6", self.d6),
            ExtraDie::HalfDie => write!(f, "{}½d6", self.d6),
            ExtraDie::PlusOnePip => write!(f, "{}d6+1", self.d6),
            ExtraDie::MinusOnePip => write!(f, "{}d6-1", self.d6),
        }
    }
}

/// The faces of a rolled damage formula
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageRoll {
    /// Whole d6 faces
    pub faces: Vec<u32>,
    /// The half die, rolled as a d3
    pub half_die: Option<u32>,
    pub pip: i32,
    pub standard_effect: bool,
}

impl DamageRoll {
    pub fn from_faces(faces: Vec<u32>) -> Self {
        DamageRoll {
            faces,
            ..Default::default()
        }
    }

    /// Sum of every term, never below 0
    pub fn total(&self) -> i32 {
        let faces: i32 = self.faces.iter().map(|f| *f as i32).sum();
        let half = self.half_die.unwrap_or(0) as i32;
        (faces + half + self.pip).max(0)
    }

    /// BODY a normal attack does: 1 -> 0, 6 -> 2, else 1 per whole die
    ///
    /// A standard-effect roll also counts 1 BODY for the half die and the
    /// added pip.
    pub fn counted_body(&self) -> i32 {
        let mut body = count_body(&self.faces);
        if self.standard_effect {
            if self.half_die.is_some() {
                body += 1;
            }
            if self.pip > 0 {
                body += 1;
            }
        }
        body
    }

    /// The formula this roll was made with
    pub fn spec(&self) -> DiceSpec {
        let extra = if self.half_die.is_some() {
            ExtraDie::HalfDie
        } else if self.pip > 0 {
            ExtraDie::PlusOnePip
        } else if self.pip < 0 {
            ExtraDie::MinusOnePip
        } else {
            ExtraDie::None
        };
        DiceSpec::new(self.faces.len() as u32, extra)
    }

    /// Remove `dc` damage classes from an already rolled attack
    ///
    /// Whole dice come off the end of the roll. When the smaller formula
    /// needs a half die the roll did not have, it is read from the first die
    /// removed (1-2 -> 1, 3-4 -> 2, 5-6 -> 3). Returns the reduced formula.
    pub fn negate(&mut self, dc: i32, killing: bool) -> DiceSpec {
        if dc <= 0 {
            return self.spec();
        }
        let reduced = self.spec().add_damage_classes(-(dc as f64), killing);
        let keep = (reduced.d6 as usize).min(self.faces.len());
        let removed: Vec<u32> = self.faces.drain(keep..).collect();

        self.half_die = match reduced.extra {
            ExtraDie::HalfDie => self
                .half_die
                .or_else(|| removed.first().map(|face| (face + 1) / 2))
                .or(Some(if self.standard_effect { 1 } else { 0 })),
            _ => None,
        };
        self.pip = reduced.pip();
        reduced
    }

    /// Drop the highest whole dice for a target away from an explosion's center
    ///
    /// `fraction` is distance / radius. `floor(fraction * (n - 1))` dice are
    /// removed, so a target at the center loses none and one at the edge keeps
    /// only the lowest die. Returns the removed faces.
    pub fn apply_explosion_falloff(&mut self, fraction: f64) -> Vec<u32> {
        let n = self.faces.len();
        if n == 0 {
            return Vec::new();
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let remove = ((fraction * (n - 1) as f64).floor() as usize).min(n);
        self.faces.sort_unstable_by(|a, b| b.cmp(a));
        self.faces.drain(..remove).collect()
    }
}

/// Counted-body rule shared by normal damage and penetrating minimums
pub fn count_body(faces: &[u32]) -> i32 {
    faces
        .iter()
        .map(|face| match face {
            1 => 0,
            6 => 2,
            _ => 1,
        })
        .sum()
}
