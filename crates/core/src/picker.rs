//! Single-shot name picker
//!
//! Picks one winner, with replacement, and builds the sequence of names the
//! host flips through before revealing it. Nothing is remembered between picks.

use crate::error::{Error, Result};
use crate::list_ops::shuffle;
use crate::random::RandomSource;

/// Minimum number of flips shown before the winner
pub const MIN_FLIPS: usize = 20;

/// Milliseconds between two flips in the reveal animation
pub const FLIP_INTERVAL_MS: u64 = 360;

/// A finished pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickResult {
    /// Names to flip through; the last one is the winner
    pub sequence: Vec<String>,
    pub winner: String,
}

impl PickResult {
    /// How long the host should animate before showing the winner
    pub fn reveal_duration_ms(&self) -> u64 {
        self.sequence.len() as u64 * FLIP_INTERVAL_MS
    }
}

/// Build the reveal sequence for `list`.
///
/// Lists with at least [`MIN_FLIPS`] entries flip through a full shuffle, so no
/// name repeats. Shorter lists are resampled with replacement up to
/// [`MIN_FLIPS`] steps.
pub fn reveal_sequence<R: RandomSource + ?Sized>(list: &[String], rng: &mut R) -> Vec<String> {
    if list.is_empty() {
        return Vec::new();
    }
    if list.len() >= MIN_FLIPS {
        return shuffle(list, rng);
    }
    (0..MIN_FLIPS)
        .map(|_| list[rng.next_index(list.len())].clone())
        .collect()
}

/// Pick a winner from `list`; the winner is always the last revealed name.
pub fn pick<R: RandomSource + ?Sized>(list: &[String], rng: &mut R) -> Result<PickResult> {
    let sequence = reveal_sequence(list, rng);
    let winner = sequence
        .last()
        .cloned()
        .ok_or_else(|| Error::validation("Enter a list or select a classroom."))?;
    Ok(PickResult { sequence, winner })
}
