//! SortPot Core Library
//!
//! Classroom randomization tools: group maker, name picker, turn order,
//! dice, roulette and countdown timer, plus the persisted document they share.

pub mod controller;
pub mod error;
pub mod export;
pub mod groups;
pub mod invariants;
pub mod list_ops;
pub mod models;
pub mod picker;
pub mod random;
pub mod randomizers;
pub mod selection;
pub mod storage;
pub mod timer;

pub use controller::{RosterInput, SessionController, TimerAlert, TurnOutcome};
pub use error::{Error, ImportError, LoadError, Result};
pub use models::*;
pub use picker::PickResult;
pub use random::{RandomSource, SeededRandom, SystemRandom, ThreadRandom};
pub use randomizers::{DiceRoll, RouletteSpin};
pub use selection::{DrawOutcome, ExclusionSet, SelectionSession, SessionState, SourceKey};
pub use storage::{Database, DocumentStore, KeyValueStore, MemoryStore};
pub use timer::{Clock, Countdown, ManualClock, SystemClock, TimerSnapshot, TimerState};
