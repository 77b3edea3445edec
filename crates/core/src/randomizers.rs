//! Dice and roulette

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::random::RandomSource;

pub const DIE_FACES: u32 = 6;
pub const MAX_DICE: usize = 2;

/// Full turns a roulette wheel makes before settling
pub const MIN_SPINS: u32 = 4;
pub const MAX_SPINS: u32 = 6;

/// Minimum number of roulette options
pub const MIN_OPTIONS: usize = 2;

/// Outcome of rolling one or two dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub faces: Vec<u32>,
}

impl DiceRoll {
    pub fn sum(&self) -> u32 {
        self.faces.iter().sum()
    }
}

/// Roll `count` six-sided dice
pub fn roll_dice<R: RandomSource + ?Sized>(count: usize, rng: &mut R) -> Result<DiceRoll> {
    if count == 0 || count > MAX_DICE {
        return Err(Error::validation(format!(
            "You can roll between 1 and {} dice.",
            MAX_DICE
        )));
    }
    let faces = (0..count).map(|_| rng.next_in_range(1, DIE_FACES)).collect();
    Ok(DiceRoll { faces })
}

/// Where the wheel stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouletteSpin {
    pub index: usize,
    pub option: String,
    /// Clockwise rotation in degrees that brings `index` under the pointer
    pub rotation_deg: f64,
}

/// Spin a wheel over `options`.
///
/// The wheel never lands on `previous` twice in a row; a repeat is bumped to
/// the next segment.
pub fn spin_roulette<R: RandomSource + ?Sized>(
    options: &[String],
    previous: Option<usize>,
    rng: &mut R,
) -> Result<RouletteSpin> {
    if options.len() < MIN_OPTIONS {
        return Err(Error::validation(
            "Enter at least 2 options to spin the roulette.",
        ));
    }

    let count = options.len();
    let mut index = rng.next_index(count);
    if previous == Some(index) {
        index = (index + 1) % count;
    }

    let spins = rng.next_in_range(MIN_SPINS, MAX_SPINS);
    let segment = 360.0 / count as f64;
    let rotation_deg = f64::from(spins) * 360.0 - (index as f64 * segment + segment / 2.0);

    Ok(RouletteSpin {
        index,
        option: options[index].clone(),
        rotation_deg,
    })
}
