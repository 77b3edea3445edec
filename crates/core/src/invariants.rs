//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use std::collections::HashSet;

use crate::models::{Classroom, Document, OptionSet};
use crate::selection::SelectionSession;

/// Validate a classroom about to be stored
pub fn assert_classroom_invariants(classroom: &Classroom) {
    debug_assert!(
        !classroom.name.trim().is_empty(),
        "Classroom {} has empty name",
        classroom.id
    );

    debug_assert!(
        classroom.students.iter().all(|s| !s.trim().is_empty()),
        "Classroom {} has an empty student name",
        classroom.id
    );
}

/// Validate an option set about to be stored
pub fn assert_option_set_invariants(set: &OptionSet) {
    debug_assert!(
        set.options.len() >= 2,
        "Option set {} has {} options, expected at least 2",
        set.id,
        set.options.len()
    );
}

/// Ids must stay unique across the document
pub fn assert_document_invariants(document: &Document) {
    let mut seen = HashSet::new();
    for classroom in &document.classrooms {
        debug_assert!(
            seen.insert(classroom.id.as_str()),
            "Duplicate classroom id {}",
            classroom.id
        );
    }

    let mut seen = HashSet::new();
    for set in &document.option_sets {
        debug_assert!(seen.insert(set.id.as_str()), "Duplicate option set id {}", set.id);
    }
}

/// A partition must contain every student exactly once and no empty group
pub fn assert_partition_invariants(students: &[String], groups: &[Vec<String>]) {
    debug_assert!(
        groups.iter().all(|g| !g.is_empty()),
        "Partition produced an empty group"
    );

    let placed: usize = groups.iter().map(Vec::len).sum();
    debug_assert_eq!(
        placed,
        students.len(),
        "Partition placed {} of {} students",
        placed,
        students.len()
    );
}

/// Drawn and remaining names together never exceed the candidates
pub fn assert_session_invariants(session: &SelectionSession, candidates: usize) {
    let total = session.picked().len() + session.remaining().len();
    debug_assert!(
        total <= candidates,
        "Session holds {} names but only {} candidates were given",
        total,
        candidates
    );
}
