//! Balanced group partitioning

use crate::error::{Error, Result};
use crate::list_ops::shuffle;
use crate::random::RandomSource;

/// Smallest group size a caller may ask for
pub const MIN_GROUP_SIZE: usize = 2;

/// Smallest roster that can be split into groups
pub const MIN_STUDENTS: usize = 2;

/// How many groups a roster of `students` splits into at `target_size`.
///
/// A remainder of exactly one would leave somebody alone, so in that case one
/// group fewer is used and the extra student joins an existing group.
pub fn group_count(students: usize, target_size: usize) -> usize {
    let size = target_size.max(MIN_GROUP_SIZE);
    let mut count = students.div_ceil(size);
    if students % size == 1 && count > 1 {
        count -= 1;
    }
    count
}

/// Split `students` into shuffled groups of roughly `target_size`.
///
/// Students are shuffled and dealt round-robin, so group sizes differ by at
/// most one.
pub fn partition<R: RandomSource + ?Sized>(
    students: &[String],
    target_size: usize,
    rng: &mut R,
) -> Result<Vec<Vec<String>>> {
    if students.len() < MIN_STUDENTS {
        return Err(Error::validation(
            "At least 2 students are needed to make groups.",
        ));
    }

    let count = group_count(students.len(), target_size);
    let mut groups: Vec<Vec<String>> = vec![Vec::new(); count];
    for (index, student) in shuffle(students, rng).into_iter().enumerate() {
        groups[index % count].push(student);
    }
    Ok(groups)
}
