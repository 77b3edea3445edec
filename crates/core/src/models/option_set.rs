//! Roulette option sets

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved list of roulette options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    pub id: String,
    pub name: String,
    /// At least two entries
    pub options: Vec<String>,
}

impl OptionSet {
    pub fn new(name: String, options: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            options,
        }
    }

    pub fn options_text(&self) -> String {
        self.options.join("\n")
    }
}
