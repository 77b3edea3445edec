//! The persisted document
//!
//! Everything the user saves lives in one JSON object. Keys are camelCase to
//! stay compatible with files exported by earlier versions of the app.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Classroom, OptionSet};

pub const DEFAULT_GROUP_SIZE: u32 = 3;
pub const DEFAULT_SOUND_DURATION_SECS: u32 = 2;
pub const DEFAULT_TIMER_DURATION_SECS: u32 = 10 * 60;

/// Alert played when the countdown ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimerSound {
    #[default]
    BeepLong,
    Whistle,
    Siren,
    Bell,
    PoliceSiren,
    AirRaidSiren,
}

impl TimerSound {
    pub const ALL: [TimerSound; 6] = [
        TimerSound::BeepLong,
        TimerSound::Whistle,
        TimerSound::Siren,
        TimerSound::Bell,
        TimerSound::PoliceSiren,
        TimerSound::AirRaidSiren,
    ];

    /// Name as stored in the document
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerSound::BeepLong => "beep_long",
            TimerSound::Whistle => "whistle",
            TimerSound::Siren => "siren",
            TimerSound::Bell => "bell",
            TimerSound::PoliceSiren => "police_siren",
            TimerSound::AirRaidSiren => "air_raid_siren",
        }
    }

    /// Parse a stored name; unknown names fall back to the default beep
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == name)
            .unwrap_or_default()
    }

    /// Sounds backed by an audio file rather than synthesized tones
    pub fn audio_file(&self) -> Option<&'static str> {
        match self {
            TimerSound::Bell => Some("audio/church-bell.mp3"),
            TimerSound::PoliceSiren => Some("audio/police-siren.mp3"),
            TimerSound::AirRaidSiren => Some("audio/air-raid-siren.mp3"),
            _ => None,
        }
    }
}

/// Root of everything persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub classrooms: Vec<Classroom>,
    pub last_class_id: String,
    pub last_group_size: u32,
    /// Most recent partition, kept for printing
    pub last_groups: Vec<Vec<String>>,
    /// Stored as a plain name so unknown values never break loading
    pub timer_sound: String,
    pub timer_sound_duration_sec: u32,
    pub timer_duration_sec: u32,
    #[serde(rename = "rouletteSets")]
    pub option_sets: Vec<OptionSet>,
    #[serde(rename = "lastRouletteSetId")]
    pub last_option_set_id: String,
    /// Keys this version does not know about, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            classrooms: Vec::new(),
            last_class_id: String::new(),
            last_group_size: DEFAULT_GROUP_SIZE,
            last_groups: Vec::new(),
            timer_sound: TimerSound::default().as_str().to_string(),
            timer_sound_duration_sec: DEFAULT_SOUND_DURATION_SECS,
            timer_duration_sec: DEFAULT_TIMER_DURATION_SECS,
            option_sets: Vec::new(),
            last_option_set_id: String::new(),
            extra: Map::new(),
        }
    }
}

impl Document {
    pub fn classroom(&self, id: &str) -> Option<&Classroom> {
        self.classrooms.iter().find(|c| c.id == id)
    }

    pub fn classroom_mut(&mut self, id: &str) -> Option<&mut Classroom> {
        self.classrooms.iter_mut().find(|c| c.id == id)
    }

    pub fn option_set(&self, id: &str) -> Option<&OptionSet> {
        self.option_sets.iter().find(|s| s.id == id)
    }

    pub fn option_set_mut(&mut self, id: &str) -> Option<&mut OptionSet> {
        self.option_sets.iter_mut().find(|s| s.id == id)
    }

    pub fn sound(&self) -> TimerSound {
        TimerSound::from_name(&self.timer_sound)
    }

    /// The classroom last selected, if it still exists
    pub fn last_classroom(&self) -> Option<&Classroom> {
        if self.last_class_id.is_empty() {
            return None;
        }
        self.classroom(&self.last_class_id)
    }
}
