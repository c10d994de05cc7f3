//! Turn dice sources.
//!
//! The engine never rolls its own turn dice; the boundary supplies one value
//! per turn through a [`DiceSource`].
use battle_core::BattleConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait DiceSource: Send {
    /// Next face, within `BattleConfig::DICE_MIN..=BattleConfig::DICE_MAX`.
    fn roll(&mut self) -> u8;
}

/// Reproducible six-sided dice.
#[derive(Clone, Debug)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DiceSource for SeededDice {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(BattleConfig::DICE_MIN..=BattleConfig::DICE_MAX)
    }
}

/// Scripted faces, repeated in order. Out-of-range faces are clamped.
#[derive(Clone, Debug)]
pub struct FixedDice {
    faces: Vec<u8>,
    cursor: usize,
}

impl FixedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: faces
                .into_iter()
                .map(|face| face.clamp(BattleConfig::DICE_MIN, BattleConfig::DICE_MAX))
                .collect(),
            cursor: 0,
        }
    }
}

impl DiceSource for FixedDice {
    fn roll(&mut self) -> u8 {
        let Some(face) = self.faces.get(self.cursor % self.faces.len().max(1)).copied() else {
            return BattleConfig::DICE_MIN;
        };
        self.cursor += 1;
        face
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dice_stay_on_the_die() {
        let mut dice = SeededDice::new(3);
        for _ in 0..200 {
            let face = dice.roll();
            assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn seeded_dice_are_reproducible() {
        let a: Vec<u8> = {
            let mut dice = SeededDice::new(11);
            (0..16).map(|_| dice.roll()).collect()
        };
        let b: Vec<u8> = {
            let mut dice = SeededDice::new(11);
            (0..16).map(|_| dice.roll()).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_dice_cycle_and_clamp() {
        let mut dice = FixedDice::new([6, 9, 0]);
        let faces: Vec<u8> = (0..4).map(|_| dice.roll()).collect();
        assert_eq!(faces, vec![6, 6, 1, 6]);
        assert_eq!(FixedDice::new([]).roll(), 1);
    }
}
