//! List helpers shared by every tool: parsing pasted rosters and shuffling.

use crate::random::RandomSource;

/// Split raw text into a list of names.
///
/// One entry per line, trimmed, blank lines dropped. Order is kept and
/// duplicates are allowed (two students can share a name).
pub fn parse_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fisher-Yates shuffle of a slice in place
pub fn shuffle_in_place<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Shuffled copy of `items`; the input is left untouched.
pub fn shuffle<T: Clone, R: RandomSource + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut copy = items.to_vec();
    shuffle_in_place(&mut copy, rng);
    copy
}
