//! Draw-without-replacement sessions
//!
//! The turn-order tool shuffles the roster once and hands names out one at a
//! time until everybody has had a turn. The session remembers which roster it
//! was seeded from (its [`SourceKey`]) and silently re-seeds when the roster
//! changes under it.

use std::collections::HashSet;
use std::fmt;

use crate::list_ops::shuffle;
use crate::random::RandomSource;

/// Fingerprint of the list a session was seeded from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceKey(String);

impl SourceKey {
    /// Key for a typed list: `manual:<items joined with "|">`
    pub fn manual(items: &[String]) -> Self {
        Self(format!("manual:{}", items.join("|")))
    }

    /// Key for a saved classroom: `class:<id>`
    pub fn classroom(id: &str) -> Self {
        Self(format!("class:{}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Never seeded, or seeded from an empty list
    Empty,
    /// Names left to draw, or drawing has started
    Active,
    /// Everybody has been drawn
    Exhausted,
}

/// Result of asking for the next name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn(String),
    /// Every candidate has already been drawn. Not an error.
    Exhausted,
}

/// A shuffled pool consumed head first
#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    pool: Vec<String>,
    picked: Vec<String>,
    source_key: SourceKey,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reshuffle `candidates` into a fresh pool and forget the draw history
    pub fn reset<R: RandomSource + ?Sized>(
        &mut self,
        candidates: &[String],
        source_key: SourceKey,
        rng: &mut R,
    ) {
        self.pool = shuffle(candidates, rng);
        // draw from the front, pop from the back
        self.pool.reverse();
        self.picked.clear();
        self.source_key = source_key;
        tracing::debug!(source = %self.source_key, size = candidates.len(), "Selection pool reset");
    }

    /// Take the next name from the pool.
    ///
    /// If `source_key` does not match the key the pool was seeded from, the
    /// pool is reseeded from `candidates` first.
    pub fn draw_next<R: RandomSource + ?Sized>(
        &mut self,
        candidates: &[String],
        source_key: &SourceKey,
        rng: &mut R,
    ) -> DrawOutcome {
        if self.source_key.is_empty() || &self.source_key != source_key {
            self.reset(candidates, source_key.clone(), rng);
        }

        match self.pool.pop() {
            Some(name) => {
                self.picked.push(name.clone());
                tracing::debug!(remaining = self.pool.len(), "Drew next name");
                DrawOutcome::Drawn(name)
            }
            None => DrawOutcome::Exhausted,
        }
    }

    /// Forget the source so the next draw reseeds, whatever key it brings
    pub fn invalidate(&mut self) {
        self.source_key = SourceKey::default();
    }

    pub fn state(&self) -> SessionState {
        match (self.pool.is_empty(), self.picked.is_empty()) {
            (true, true) => SessionState::Empty,
            (true, false) => SessionState::Exhausted,
            _ => SessionState::Active,
        }
    }

    /// Names drawn so far, in draw order
    pub fn picked(&self) -> &[String] {
        &self.picked
    }

    /// Names still waiting, next one first
    pub fn remaining(&self) -> Vec<String> {
        self.pool.iter().rev().cloned().collect()
    }

    pub fn source_key(&self) -> &SourceKey {
        &self.source_key
    }
}

/// Names toggled out of a draw
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a name in or out of the set. Returns true if it is now excluded.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_string());
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// `roster` minus every excluded name, order kept
    pub fn filter(&self, roster: &[String]) -> Vec<String> {
        roster
            .iter()
            .filter(|name| !self.names.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{SeededRandom, SystemRandom};

    fn names(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_source_key_formats() {
        assert_eq!(SourceKey::manual(&names(&["A", "B"])).as_str(), "manual:A|B");
        assert_eq!(SourceKey::classroom("c-1").as_str(), "class:c-1");
        assert!(SourceKey::default().is_empty());
    }

    #[test]
    fn test_draws_every_candidate_once_then_exhausts() {
        let candidates = names(&["Ada", "Biel", "Cesc", "Dídac", "Eli"]);
        let key = SourceKey::manual(&candidates);
        let mut session = SelectionSession::new();
        let mut rng = SystemRandom;
        assert_eq!(session.state(), SessionState::Empty);

        session.reset(&candidates, key.clone(), &mut rng);
        assert_eq!(session.state(), SessionState::Active);

        for _ in 0..candidates.len() {
            assert!(matches!(
                session.draw_next(&candidates, &key, &mut rng),
                DrawOutcome::Drawn(_)
            ));
        }
        assert_eq!(session.state(), SessionState::Exhausted);
        assert_eq!(session.draw_next(&candidates, &key, &mut rng), DrawOutcome::Exhausted);

        let mut picked = session.picked().to_vec();
        picked.sort();
        let mut expected = candidates.clone();
        expected.sort();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_first_draw_seeds_pool() {
        let candidates = names(&["A", "B"]);
        let key = SourceKey::classroom("x");
        let mut session = SelectionSession::new();
        let outcome = session.draw_next(&candidates, &key, &mut SystemRandom);
        assert!(matches!(outcome, DrawOutcome::Drawn(_)));
        assert_eq!(session.source_key(), &key);
        assert_eq!(session.picked().len(), 1);
    }

    #[test]
    fn test_key_change_mid_pool_reseeds() {
        let first = names(&["A", "B", "C", "D"]);
        let second = names(&["X", "Y"]);
        let mut rng = SeededRandom::from_seed(11);
        let mut session = SelectionSession::new();

        let first_key = SourceKey::manual(&first);
        session.draw_next(&first, &first_key, &mut rng);
        session.draw_next(&first, &first_key, &mut rng);
        assert_eq!(session.picked().len(), 2);

        let second_key = SourceKey::manual(&second);
        let outcome = session.draw_next(&second, &second_key, &mut rng);
        match outcome {
            DrawOutcome::Drawn(name) => assert!(second.contains(&name)),
            DrawOutcome::Exhausted => panic!("fresh pool should not be exhausted"),
        }
        assert_eq!(session.picked().len(), 1);
        assert_eq!(session.remaining().len(), 1);
    }

    #[test]
    fn test_exhausted_session_reseeds_on_new_key() {
        let list = names(&["Solo"]);
        let key = SourceKey::manual(&list);
        let mut session = SelectionSession::new();
        let mut rng = SystemRandom;
        assert_eq!(
            session.draw_next(&list, &key, &mut rng),
            DrawOutcome::Drawn("Solo".into())
        );
        assert_eq!(session.draw_next(&list, &key, &mut rng), DrawOutcome::Exhausted);

        let other = SourceKey::classroom("abc");
        assert_eq!(
            session.draw_next(&list, &other, &mut rng),
            DrawOutcome::Drawn("Solo".into())
        );
    }

    #[test]
    fn test_invalidate_forces_reseed_with_same_key() {
        let list = names(&["A", "B", "C"]);
        let key = SourceKey::classroom("room");
        let mut session = SelectionSession::new();
        let mut rng = SystemRandom;
        for _ in 0..3 {
            session.draw_next(&list, &key, &mut rng);
        }
        assert_eq!(session.state(), SessionState::Exhausted);

        session.invalidate();
        let reduced = names(&["A", "C"]);
        assert!(matches!(
            session.draw_next(&reduced, &key, &mut rng),
            DrawOutcome::Drawn(_)
        ));
        assert_eq!(session.remaining().len(), 1);
    }

    #[test]
    fn test_remaining_lists_next_name_first() {
        let list = names(&["A", "B", "C"]);
        let key = SourceKey::manual(&list);
        let mut session = SelectionSession::new();
        let mut rng = SeededRandom::from_seed(5);
        session.reset(&list, key.clone(), &mut rng);
        let upcoming = session.remaining();
        match session.draw_next(&list, &key, &mut rng) {
            DrawOutcome::Drawn(name) => assert_eq!(name, upcoming[0]),
            DrawOutcome::Exhausted => panic!("pool should not be empty"),
        }
    }

    #[test]
    fn test_reset_with_empty_candidates_stays_empty() {
        let mut session = SelectionSession::new();
        session.reset(&[], SourceKey::manual(&[]), &mut SystemRandom);
        assert_eq!(session.state(), SessionState::Empty);
    }

    #[test]
    fn test_exclusion_toggle_and_filter() {
        let mut excluded = ExclusionSet::new();
        assert!(excluded.toggle("Berta"));
        assert!(excluded.contains("Berta"));
        let roster = names(&["Anna", "Berta", "Carles", "Berta"]);
        assert_eq!(excluded.filter(&roster), names(&["Anna", "Carles"]));

        assert!(!excluded.toggle("Berta"));
        assert!(excluded.is_empty());
        assert_eq!(excluded.filter(&roster), roster);
    }
}
