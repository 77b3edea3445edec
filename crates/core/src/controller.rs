//! Session controller
//!
//! Owns the document and every tab's transient state, and exposes the
//! commands the host UI calls. Each command validates its input, computes a
//! result, updates state and writes the document through to the store.
//! Validation failures return [`Error::Validation`] before anything changes.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{Error, LoadError, Result};
use crate::export;
use crate::groups::{self, MIN_GROUP_SIZE, MIN_STUDENTS};
use crate::invariants;
use crate::list_ops::parse_list;
use crate::models::{Classroom, Document, OptionSet, TimerSound};
use crate::picker::{self, PickResult};
use crate::random::{RandomSource, SystemRandom};
use crate::randomizers::{self, DiceRoll, RouletteSpin, MIN_OPTIONS};
use crate::selection::{DrawOutcome, ExclusionSet, SelectionSession, SessionState, SourceKey};
use crate::storage::{parse_import, DocumentStore, KeyValueStore};
use crate::timer::{Clock, Countdown, SystemClock, TimerEvent, TimerSnapshot};

const MSG_CLASS_NAME: &str = "Enter a name for the classroom.";
const MSG_CLASS_STUDENTS: &str = "Add at least one student.";
const MSG_SET_NAME: &str = "Enter a name for the option set.";
const MSG_SET_OPTIONS: &str = "Add at least 2 options.";
const MSG_NO_CANDIDATES: &str = "Enter a list or select a classroom.";
const MSG_GROUPS_FIRST: &str = "Generate the groups first.";

pub const MIN_SOUND_SECS: u32 = 1;
pub const MAX_SOUND_SECS: u32 = 15;

/// Where a picker or turn list comes from.
///
/// A non-empty typed list wins over the selected classroom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterInput {
    pub manual: String,
    pub class_id: String,
}

impl RosterInput {
    pub fn manual(text: impl Into<String>) -> Self {
        Self {
            manual: text.into(),
            class_id: String::new(),
        }
    }

    pub fn classroom(id: impl Into<String>) -> Self {
        Self {
            manual: String::new(),
            class_id: id.into(),
        }
    }
}

/// Result of asking for the next turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// `order` is 1-based
    Next { name: String, order: usize },
    /// Everybody has had a turn
    Exhausted,
}

/// Raised when the countdown reaches zero; the host plays the sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerAlert {
    pub sound: TimerSound,
    pub duration_secs: u32,
}

/// Classroom selection and exclusions for one drawing tab
#[derive(Debug, Default)]
struct DrawTab {
    class_id: String,
    excluded: ExclusionSet,
}

impl DrawTab {
    /// Returns true if the classroom changed (exclusions are then cleared)
    fn select_class(&mut self, id: &str) -> bool {
        if self.class_id == id {
            return false;
        }
        self.class_id = id.to_string();
        self.excluded.clear();
        true
    }

    /// Candidates after exclusions, plus the fingerprint of where they came from.
    /// Reading from a classroom does not change the tab's selected one.
    fn candidates(&self, document: &Document, input: &RosterInput) -> (Vec<String>, SourceKey) {
        let manual = parse_list(&input.manual);
        if !manual.is_empty() {
            let list = self.excluded.filter(&manual);
            let key = SourceKey::manual(&list);
            return (list, key);
        }

        let roster = document
            .classroom(&input.class_id)
            .map(|c| c.students.as_slice())
            .unwrap_or_default();
        (self.excluded.filter(roster), SourceKey::classroom(&input.class_id))
    }
}

pub struct SessionController<S, R = SystemRandom, C = SystemClock> {
    document: Document,
    store: DocumentStore<S>,
    rng: R,
    clock: C,
    picker: DrawTab,
    turns: DrawTab,
    turn_session: SelectionSession,
    last_roulette_index: Option<usize>,
    timer: Countdown,
}

impl<S: KeyValueStore> SessionController<S> {
    /// Controller over `store` with the system random source and wall clock
    pub fn new(store: S) -> Self {
        Self::with_parts(store, SystemRandom, SystemClock)
    }
}

impl<S: KeyValueStore, R: RandomSource, C: Clock> SessionController<S, R, C> {
    /// Load the stored document and set up fresh tabs
    pub fn with_parts(store: S, rng: R, clock: C) -> Self {
        let store = DocumentStore::new(store);
        let document = store.load();
        info!(
            classrooms = document.classrooms.len(),
            option_sets = document.option_sets.len(),
            "Document loaded"
        );
        let timer = Countdown::new(document.timer_duration_sec);
        Self {
            document,
            store,
            rng,
            clock,
            picker: DrawTab::default(),
            turns: DrawTab::default(),
            turn_session: SelectionSession::new(),
            last_roulette_index: None,
            timer,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &DocumentStore<S> {
        &self.store
    }

    fn persist(&mut self) -> Result<()> {
        invariants::assert_document_invariants(&self.document);
        self.store.save(&self.document)
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_else(Utc::now)
    }

    // ---- classrooms ----

    /// Create a classroom, or update `editing_id` in place. Returns its id.
    pub fn save_classroom(
        &mut self,
        editing_id: Option<&str>,
        name: &str,
        students_text: &str,
    ) -> Result<String> {
        let name = name.trim();
        let students = parse_list(students_text);
        if name.is_empty() {
            return Err(Error::validation(MSG_CLASS_NAME));
        }
        if students.is_empty() {
            return Err(Error::validation(MSG_CLASS_STUDENTS));
        }

        let id = match editing_id {
            Some(id) => {
                let classroom = self
                    .document
                    .classroom_mut(id)
                    .ok_or_else(|| Error::NotFound(format!("classroom {}", id)))?;
                classroom.name = name.to_string();
                classroom.students = students;
                invariants::assert_classroom_invariants(classroom);
                // roster changed under the same class key
                self.invalidate_turns_for(id);
                id.to_string()
            }
            None => {
                let classroom = Classroom::new(name.to_string(), students);
                invariants::assert_classroom_invariants(&classroom);
                let id = classroom.id.clone();
                self.document.classrooms.push(classroom);
                id
            }
        };

        self.persist()?;
        info!(classroom_id = %id, "Classroom saved");
        Ok(id)
    }

    pub fn delete_classroom(&mut self, id: &str) -> Result<()> {
        let before = self.document.classrooms.len();
        self.document.classrooms.retain(|c| c.id != id);
        if self.document.classrooms.len() == before {
            return Err(Error::NotFound(format!("classroom {}", id)));
        }

        if self.document.last_class_id == id {
            self.document.last_class_id.clear();
        }
        if self.picker.class_id == id {
            self.picker.select_class("");
        }
        if self.turns.class_id == id {
            self.turns.select_class("");
        }
        self.invalidate_turns_for(id);

        self.persist()?;
        info!(classroom_id = %id, "Classroom deleted");
        Ok(())
    }

    /// Make `id` the current classroom for every tab
    pub fn select_classroom(&mut self, id: &str) -> Result<()> {
        if self.document.classroom(id).is_none() {
            return Err(Error::NotFound(format!("classroom {}", id)));
        }
        self.document.last_class_id = id.to_string();
        self.picker.select_class(id);
        self.turns.select_class(id);
        self.persist()
    }

    /// Students of a classroom as newline-separated text
    pub fn classroom_students(&self, id: &str) -> Option<String> {
        self.document.classroom(id).map(Classroom::students_text)
    }

    // ---- option sets ----

    pub fn save_option_set(
        &mut self,
        editing_id: Option<&str>,
        name: &str,
        options_text: &str,
    ) -> Result<String> {
        let name = name.trim();
        let options = parse_list(options_text);
        if name.is_empty() {
            return Err(Error::validation(MSG_SET_NAME));
        }
        if options.len() < MIN_OPTIONS {
            return Err(Error::validation(MSG_SET_OPTIONS));
        }

        let id = match editing_id {
            Some(id) => {
                let set = self
                    .document
                    .option_set_mut(id)
                    .ok_or_else(|| Error::NotFound(format!("option set {}", id)))?;
                set.name = name.to_string();
                set.options = options;
                invariants::assert_option_set_invariants(set);
                id.to_string()
            }
            None => {
                let set = OptionSet::new(name.to_string(), options);
                invariants::assert_option_set_invariants(&set);
                let id = set.id.clone();
                self.document.option_sets.push(set);
                id
            }
        };

        self.persist()?;
        info!(option_set_id = %id, "Option set saved");
        Ok(id)
    }

    pub fn delete_option_set(&mut self, id: &str) -> Result<()> {
        let before = self.document.option_sets.len();
        self.document.option_sets.retain(|s| s.id != id);
        if self.document.option_sets.len() == before {
            return Err(Error::NotFound(format!("option set {}", id)));
        }
        if self.document.last_option_set_id == id {
            self.document.last_option_set_id.clear();
        }
        self.persist()
    }

    /// Remember `id` as the current option set and return its options
    pub fn select_option_set(&mut self, id: &str) -> Result<Vec<String>> {
        let options = self
            .document
            .option_set(id)
            .map(|s| s.options.clone())
            .ok_or_else(|| Error::NotFound(format!("option set {}", id)))?;
        self.document.last_option_set_id = id.to_string();
        self.persist()?;
        Ok(options)
    }

    // ---- groups ----

    /// Size offered when the user does not pick one
    pub fn default_group_size(&self) -> usize {
        self.document.last_group_size as usize
    }

    /// Seed the group size of a document that was never saved. Stored
    /// documents keep their own last size. Nothing is written.
    pub fn seed_group_size(&mut self, size: usize) {
        if matches!(self.store.try_load(), Err(LoadError::Missing)) {
            self.document.last_group_size =
                u32::try_from(size.max(MIN_GROUP_SIZE)).unwrap_or(u32::MAX);
        }
    }

    pub fn generate_groups(&mut self, roster_text: &str, size: usize) -> Result<Vec<Vec<String>>> {
        let students = parse_list(roster_text);
        if students.len() < MIN_STUDENTS {
            return Err(Error::validation(
                "At least 2 students are needed to make groups.",
            ));
        }

        let size = size.max(MIN_GROUP_SIZE);
        let groups = groups::partition(&students, size, &mut self.rng)?;
        invariants::assert_partition_invariants(&students, &groups);

        self.document.last_group_size = u32::try_from(size).unwrap_or(u32::MAX);
        self.document.last_groups = groups.clone();
        self.persist()?;
        info!(students = students.len(), groups = groups.len(), "Groups generated");
        Ok(groups)
    }

    // ---- picker ----

    pub fn pick(&mut self, input: &RosterInput) -> Result<PickResult> {
        let (candidates, _) = self.picker.candidates(&self.document, input);
        if candidates.is_empty() {
            return Err(Error::validation(MSG_NO_CANDIDATES));
        }
        let result = picker::pick(&candidates, &mut self.rng)?;
        debug!(candidates = candidates.len(), "Picked a name");
        Ok(result)
    }

    /// Point the picker at a classroom (empty for none) and remember it as
    /// the current one. Changing classroom clears the picker's exclusions.
    pub fn set_picker_class(&mut self, id: &str) -> Result<()> {
        self.check_class_id(id)?;
        self.picker.select_class(id);
        self.document.last_class_id = id.to_string();
        self.persist()
    }

    /// Returns true if `name` is now excluded from picks
    pub fn toggle_picker_exclusion(&mut self, name: &str) -> bool {
        self.picker.excluded.toggle(name)
    }

    pub fn picker_exclusions(&self) -> &ExclusionSet {
        &self.picker.excluded
    }

    // ---- turns ----

    fn turn_candidates(&mut self, input: &RosterInput) -> Result<(Vec<String>, SourceKey)> {
        let (candidates, key) = self.turns.candidates(&self.document, input);
        if candidates.is_empty() {
            return Err(Error::validation(MSG_NO_CANDIDATES));
        }
        Ok((candidates, key))
    }

    /// Reshuffle and hand out the first turn
    pub fn start_turns(&mut self, input: &RosterInput) -> Result<TurnOutcome> {
        let (candidates, key) = self.turn_candidates(input)?;
        self.turn_session.reset(&candidates, key, &mut self.rng);
        self.next_turn(input)
    }

    pub fn next_turn(&mut self, input: &RosterInput) -> Result<TurnOutcome> {
        let (candidates, key) = self.turn_candidates(input)?;
        let outcome = self.turn_session.draw_next(&candidates, &key, &mut self.rng);
        invariants::assert_session_invariants(&self.turn_session, candidates.len());

        Ok(match outcome {
            DrawOutcome::Drawn(name) => TurnOutcome::Next {
                name,
                order: self.turn_session.picked().len(),
            },
            DrawOutcome::Exhausted => {
                info!("All turns drawn");
                TurnOutcome::Exhausted
            }
        })
    }

    /// Reshuffle without drawing
    pub fn reset_turns(&mut self, input: &RosterInput) -> Result<()> {
        let (candidates, key) = self.turn_candidates(input)?;
        self.turn_session.reset(&candidates, key, &mut self.rng);
        Ok(())
    }

    /// Turn-order counterpart of [`Self::set_picker_class`]; a new classroom
    /// also starts a fresh round.
    pub fn set_turn_class(&mut self, id: &str) -> Result<()> {
        self.check_class_id(id)?;
        if self.turns.select_class(id) {
            self.turn_session.invalidate();
        }
        self.document.last_class_id = id.to_string();
        self.persist()
    }

    fn check_class_id(&self, id: &str) -> Result<()> {
        if id.is_empty() || self.document.classroom(id).is_some() {
            Ok(())
        } else {
            Err(Error::NotFound(format!("classroom {}", id)))
        }
    }

    fn invalidate_turns_for(&mut self, class_id: &str) {
        if self.turn_session.source_key() == &SourceKey::classroom(class_id) {
            self.turn_session.invalidate();
        }
    }

    /// Returns true if `name` is now excluded. The next turn reshuffles.
    pub fn toggle_turn_exclusion(&mut self, name: &str) -> bool {
        self.turn_session.invalidate();
        self.turns.excluded.toggle(name)
    }

    pub fn turn_exclusions(&self) -> &ExclusionSet {
        &self.turns.excluded
    }

    /// Names drawn so far, in order
    pub fn turn_history(&self) -> &[String] {
        self.turn_session.picked()
    }

    pub fn turn_state(&self) -> SessionState {
        self.turn_session.state()
    }

    // ---- dice & roulette ----

    pub fn roll_dice(&mut self, count: usize) -> Result<DiceRoll> {
        let roll = randomizers::roll_dice(count, &mut self.rng)?;
        debug!(faces = ?roll.faces, "Dice rolled");
        Ok(roll)
    }

    pub fn spin_roulette(&mut self, options_text: &str) -> Result<RouletteSpin> {
        let options = parse_list(options_text);
        let spin = randomizers::spin_roulette(&options, self.last_roulette_index, &mut self.rng)?;
        self.last_roulette_index = Some(spin.index);
        debug!(index = spin.index, "Roulette spun");
        Ok(spin)
    }

    // ---- timer ----

    pub fn timer(&self) -> &Countdown {
        &self.timer
    }

    /// Direct access to the countdown. Durations changed here are not saved.
    pub fn timer_mut(&mut self) -> &mut Countdown {
        &mut self.timer
    }

    pub fn timer_snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot(self.clock.now_ms())
    }

    pub fn start_timer(&mut self) {
        self.timer.start(self.clock.now_ms());
    }

    pub fn pause_timer(&mut self) {
        self.timer.pause(self.clock.now_ms());
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
    }

    /// Advance the countdown; returns the alert to play when it just ended
    pub fn tick_timer(&mut self) -> Option<TimerAlert> {
        match self.timer.tick(self.clock.now_ms())? {
            TimerEvent::Finished => Some(TimerAlert {
                sound: self.document.sound(),
                duration_secs: self.document.timer_sound_duration_sec,
            }),
        }
    }

    pub fn set_timer_minutes(&mut self, minutes: u32) -> Result<()> {
        self.timer.set_minutes(minutes)?;
        self.store_timer_duration()
    }

    pub fn set_timer_seconds(&mut self, seconds: u32) -> Result<()> {
        self.timer.set_seconds(seconds)?;
        self.store_timer_duration()
    }

    /// Step the duration up or down; `long` is the press-and-hold variant
    pub fn adjust_timer(&mut self, delta: i32, long: bool) -> Result<()> {
        if long {
            self.timer.adjust_step_long(delta)?;
        } else {
            self.timer.adjust_step(delta)?;
        }
        self.store_timer_duration()
    }

    fn store_timer_duration(&mut self) -> Result<()> {
        self.document.timer_duration_sec = self.timer.duration_secs();
        self.persist()
    }

    pub fn set_timer_sound(&mut self, sound: TimerSound) -> Result<()> {
        self.document.timer_sound = sound.as_str().to_string();
        self.persist()
    }

    pub fn set_timer_sound_duration(&mut self, seconds: u32) -> Result<()> {
        self.document.timer_sound_duration_sec = seconds.clamp(MIN_SOUND_SECS, MAX_SOUND_SECS);
        self.persist()
    }

    // ---- data ----

    pub fn export_json(&self) -> Result<String> {
        export::export_document(&self.document, self.now())
    }

    /// Printable page for the last generated groups
    pub fn export_print_html(&self) -> Result<String> {
        if self.document.last_groups.is_empty() {
            return Err(Error::validation(MSG_GROUPS_FIRST));
        }
        let class_name = self.document.last_classroom().map(|c| c.name.as_str());
        Ok(export::print_html(
            &self.document.last_groups,
            class_name,
            self.now().date_naive(),
        ))
    }

    /// Replace the whole document with an imported file.
    ///
    /// A rejected file leaves the current document untouched.
    pub fn import_json(&mut self, raw: &str) -> Result<()> {
        let document = parse_import(raw)?;
        self.document = document;
        self.reset_transient();
        self.persist()?;
        info!(
            classrooms = self.document.classrooms.len(),
            "Document imported"
        );
        Ok(())
    }

    /// Erase everything and start from the default document
    pub fn reset_all(&mut self) -> Result<()> {
        self.store.clear()?;
        self.document = Document::default();
        self.reset_transient();
        info!("All data erased");
        Ok(())
    }

    fn reset_transient(&mut self) {
        self.picker = DrawTab::default();
        self.turns = DrawTab::default();
        self.turn_session = SelectionSession::new();
        self.last_roulette_index = None;
        self.timer = Countdown::new(self.document.timer_duration_sec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use crate::storage::MemoryStore;
    use crate::timer::ManualClock;

    type TestController<'a> = SessionController<MemoryStore, SeededRandom, &'a ManualClock>;

    fn controller(clock: &ManualClock) -> TestController<'_> {
        SessionController::with_parts(MemoryStore::new(), SeededRandom::from_seed(1), clock)
    }

    #[test]
    fn test_classroom_validation_mutates_nothing() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        assert!(matches!(
            c.save_classroom(None, "  ", "Anna"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            c.save_classroom(None, "1A", "\n \n"),
            Err(Error::Validation(_))
        ));
        assert!(c.document().classrooms.is_empty());
        assert!(c.store().store().is_empty());
    }

    #[test]
    fn test_classroom_crud_writes_through() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let id = c.save_classroom(None, "1A", "Anna\nBiel").unwrap();
        assert_eq!(c.store().load().classrooms.len(), 1);

        c.save_classroom(Some(&id), "1A bis", "Anna\nBiel\nCarla").unwrap();
        let stored = c.store().load();
        assert_eq!(stored.classrooms[0].name, "1A bis");
        assert_eq!(stored.classrooms[0].students.len(), 3);

        c.select_classroom(&id).unwrap();
        assert_eq!(c.store().load().last_class_id, id);

        c.delete_classroom(&id).unwrap();
        let stored = c.store().load();
        assert!(stored.classrooms.is_empty());
        assert!(stored.last_class_id.is_empty());

        assert!(matches!(c.delete_classroom(&id), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_generate_groups_records_last_result() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let groups = c.generate_groups("A\nB\nC\nD\nE\nF\nG", 3).unwrap();
        assert_eq!(groups.len(), 2);
        let stored = c.store().load();
        assert_eq!(stored.last_group_size, 3);
        assert_eq!(stored.last_groups, groups);

        assert!(matches!(c.generate_groups("Solo", 2), Err(Error::Validation(_))));
        assert_eq!(c.store().load().last_groups, groups);
    }

    #[test]
    fn test_pick_respects_exclusions() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let id = c.save_classroom(None, "2B", "Pau\nQuim").unwrap();
        c.set_picker_class(&id).unwrap();
        assert!(c.toggle_picker_exclusion("Pau"));
        for _ in 0..20 {
            let result = c.pick(&RosterInput::classroom(&id)).unwrap();
            assert_eq!(result.winner, "Quim");
        }

        c.toggle_picker_exclusion("Quim");
        assert!(matches!(
            c.pick(&RosterInput::classroom(&id)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_changing_class_clears_exclusions() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let a = c.save_classroom(None, "A", "x\ny").unwrap();
        let b = c.save_classroom(None, "B", "z").unwrap();
        c.set_picker_class(&a).unwrap();
        c.toggle_picker_exclusion("x");
        c.set_picker_class(&a).unwrap();
        assert!(c.picker_exclusions().contains("x"));
        c.set_picker_class(&b).unwrap();
        assert!(c.picker_exclusions().is_empty());
    }

    #[test]
    fn test_exclusions_toggled_before_class_is_set_hold() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let id = c.save_classroom(None, "2B", "Pau\nQuim").unwrap();
        c.toggle_picker_exclusion("Pau");
        c.toggle_turn_exclusion("Pau");
        let input = RosterInput::classroom(&id);
        for _ in 0..40 {
            assert_eq!(c.pick(&input).unwrap().winner, "Quim");
        }
        assert!(c.picker_exclusions().contains("Pau"));

        assert_eq!(
            c.start_turns(&input).unwrap(),
            TurnOutcome::Next {
                name: "Quim".into(),
                order: 1
            }
        );
        assert_eq!(c.next_turn(&input).unwrap(), TurnOutcome::Exhausted);
    }

    #[test]
    fn test_tab_class_change_is_remembered() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let a = c.save_classroom(None, "A", "x").unwrap();
        let b = c.save_classroom(None, "B", "y").unwrap();
        c.set_picker_class(&a).unwrap();
        assert_eq!(c.store().load().last_class_id, a);
        c.set_turn_class(&b).unwrap();
        assert_eq!(c.store().load().last_class_id, b);
        assert!(matches!(c.set_turn_class("missing"), Err(Error::NotFound(_))));
        assert_eq!(c.document().last_class_id, b);
    }

    #[test]
    fn test_group_size_default_follows_last_run() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        c.seed_group_size(5);
        assert_eq!(c.default_group_size(), 5);
        c.generate_groups("a\nb\nc\nd", 2).unwrap();
        assert_eq!(c.default_group_size(), 2);

        // a stored document keeps its own size
        let store = c.store().store().clone();
        let mut reopened = SessionController::with_parts(store, SeededRandom::from_seed(1), &clock);
        reopened.seed_group_size(5);
        assert_eq!(reopened.default_group_size(), 2);
    }

    #[test]
    fn test_sound_duration_clamped() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        c.set_timer_sound_duration(15).unwrap();
        assert_eq!(c.document().timer_sound_duration_sec, 15);
        c.set_timer_sound_duration(40).unwrap();
        assert_eq!(c.document().timer_sound_duration_sec, MAX_SOUND_SECS);
        c.set_timer_sound_duration(0).unwrap();
        assert_eq!(c.document().timer_sound_duration_sec, MIN_SOUND_SECS);
    }

    #[test]
    fn test_import_with_duplicate_ids_is_rejected() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let raw = r#"{"classrooms": [
            {"id": "a", "name": "One", "students": ["x"]},
            {"id": "a", "name": "Two", "students": ["y"]}
        ]}"#;
        assert!(matches!(c.import_json(raw), Err(Error::Import(_))));
        assert!(c.document().classrooms.is_empty());
        c.save_classroom(None, "Still works", "z").unwrap();
    }

    #[test]
    fn test_turns_run_to_exhaustion() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let input = RosterInput::manual("Ada\nBen\nCai");
        let first = c.start_turns(&input).unwrap();
        assert!(matches!(first, TurnOutcome::Next { order: 1, .. }));
        assert!(matches!(c.next_turn(&input).unwrap(), TurnOutcome::Next { order: 2, .. }));
        assert!(matches!(c.next_turn(&input).unwrap(), TurnOutcome::Next { order: 3, .. }));
        assert_eq!(c.next_turn(&input).unwrap(), TurnOutcome::Exhausted);
        assert_eq!(c.turn_state(), SessionState::Exhausted);

        let mut history = c.turn_history().to_vec();
        history.sort();
        assert_eq!(history, vec!["Ada", "Ben", "Cai"]);
    }

    #[test]
    fn test_turn_exclusion_reseeds_pool() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let id = c.save_classroom(None, "C", "A\nB\nC\nD").unwrap();
        let input = RosterInput::classroom(&id);
        c.start_turns(&input).unwrap();
        c.next_turn(&input).unwrap();
        assert_eq!(c.turn_history().len(), 2);

        c.toggle_turn_exclusion("A");
        match c.next_turn(&input).unwrap() {
            TurnOutcome::Next { name, order } => {
                assert_ne!(name, "A");
                assert_eq!(order, 1);
            }
            TurnOutcome::Exhausted => panic!("fresh pool should not be exhausted"),
        }
    }

    #[test]
    fn test_editing_turn_classroom_reseeds_pool() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let id = c.save_classroom(None, "C", "A").unwrap();
        let input = RosterInput::classroom(&id);
        c.start_turns(&input).unwrap();
        assert_eq!(c.next_turn(&input).unwrap(), TurnOutcome::Exhausted);

        c.save_classroom(Some(&id), "C", "A\nB").unwrap();
        assert!(matches!(c.next_turn(&input).unwrap(), TurnOutcome::Next { .. }));
    }

    #[test]
    fn test_turns_need_a_candidate() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        assert!(matches!(
            c.next_turn(&RosterInput::default()),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_spin_roulette_avoids_repeat() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        let mut last = None;
        for _ in 0..50 {
            let spin = c.spin_roulette("Yes\nNo").unwrap();
            assert_ne!(Some(spin.index), last);
            last = Some(spin.index);
        }
        assert!(c.spin_roulette("Only").is_err());
    }

    #[test]
    fn test_option_set_lifecycle() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        assert!(c.save_option_set(None, "Sizes", "S").is_err());
        let id = c.save_option_set(None, "Sizes", "S\nM\nL").unwrap();
        assert_eq!(c.select_option_set(&id).unwrap(), vec!["S", "M", "L"]);
        assert_eq!(c.store().load().last_option_set_id, id);
        c.delete_option_set(&id).unwrap();
        assert!(c.store().load().last_option_set_id.is_empty());
    }

    #[test]
    fn test_timer_alert_and_duration_persist() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        c.set_timer_seconds(30).unwrap();
        c.set_timer_sound(TimerSound::Whistle).unwrap();
        assert_eq!(c.store().load().timer_duration_sec, 30);

        c.start_timer();
        clock.advance(29_000);
        assert_eq!(c.tick_timer(), None);
        assert_eq!(c.timer_snapshot().display, "00:01");
        clock.advance(1_000);
        assert_eq!(
            c.tick_timer(),
            Some(TimerAlert {
                sound: TimerSound::Whistle,
                duration_secs: 2
            })
        );
        assert_eq!(c.tick_timer(), None);
    }

    #[test]
    fn test_import_rejection_keeps_document() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        c.save_classroom(None, "Keep", "me").unwrap();
        let before = c.document().clone();

        let err = c
            .import_json(r#"{"classrooms": [{"id": 1, "name": "x", "students": []}]}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Import(_)));
        assert_eq!(c.document(), &before);
        assert_eq!(c.store().load(), before);
    }

    #[test]
    fn test_import_replaces_document() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        c.save_classroom(None, "Old", "a").unwrap();
        c.import_json(r#"{"classrooms": [{"id": "n1", "name": "New", "students": ["b"]}], "lastGroupSize": 4}"#)
            .unwrap();
        let stored = c.store().load();
        assert_eq!(stored.classrooms.len(), 1);
        assert_eq!(stored.classrooms[0].id, "n1");
        assert_eq!(stored.last_group_size, 4);
    }

    #[test]
    fn test_print_html_needs_groups() {
        let clock = ManualClock::new(1_760_000_000_000);
        let mut c = controller(&clock);
        assert!(matches!(c.export_print_html(), Err(Error::Validation(_))));
        c.generate_groups("a\nb\nc\nd", 2).unwrap();
        let html = c.export_print_html().unwrap();
        assert!(html.contains("Group 2"));
    }

    #[test]
    fn test_reset_all_restores_defaults() {
        let clock = ManualClock::new(0);
        let mut c = controller(&clock);
        c.save_classroom(None, "Gone", "x").unwrap();
        c.reset_all().unwrap();
        assert_eq!(c.document(), &Document::default());
        assert!(c.store().store().is_empty());
    }
}
