//! Document persistence
//!
//! The whole [`Document`] is stored as one JSON string under [`STORAGE_KEY`].
//! Loading never fails: a missing or unreadable document is replaced by the
//! default one. Stored keys are merged over the default one at a time, so
//! documents written by older or newer versions still load.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::error::{ImportError, LoadError, Result};
use crate::models::Document;
use crate::storage::traits::KeyValueStore;

/// Key the document is stored under
pub const STORAGE_KEY: &str = "elPotData";

/// Export-only key, dropped whenever a document is read back
pub const EXPORTED_AT_KEY: &str = "exportedAt";

/// Loads and saves the document through a key-value store
pub struct DocumentStore<S> {
    store: S,
}

impl<S: KeyValueStore> DocumentStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the stored document, reporting why it could not be read
    pub fn try_load(&self) -> std::result::Result<Document, LoadError> {
        let raw = self
            .store
            .get(STORAGE_KEY)
            .map_err(|e| LoadError::Storage(e.to_string()))?
            .ok_or(LoadError::Missing)?;
        let parsed: Value = serde_json::from_str(&raw)?;
        match parsed {
            Value::Object(map) => {
                let mut document = merge_keeping_valid_keys(map)?;
                normalize(&mut document);
                Ok(document)
            }
            _ => Err(LoadError::NotAnObject),
        }
    }

    /// Read the stored document, falling back to the default one
    #[instrument(skip(self))]
    pub fn load(&self) -> Document {
        match self.try_load() {
            Ok(document) => document,
            Err(LoadError::Missing) => Document::default(),
            Err(e) => {
                warn!(error = %e, "Stored document unreadable, starting from defaults");
                Document::default()
            }
        }
    }

    /// Write the document through to the store
    #[instrument(skip(self, document))]
    pub fn save(&mut self, document: &Document) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        self.store.set(STORAGE_KEY, &raw)
    }

    /// Forget the stored document
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(STORAGE_KEY)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

/// Shallow merge of `parsed` over the default document.
///
/// Top-level keys in `parsed` replace the default's; missing or null keys keep
/// the default. The export timestamp is dropped. Any value of the wrong type
/// fails the whole merge.
pub fn merge_over_default(parsed: Map<String, Value>) -> serde_json::Result<Document> {
    let mut merged = default_map()?;
    for (key, value) in parsed {
        if value.is_null() || key == EXPORTED_AT_KEY {
            continue;
        }
        merged.insert(key, value);
    }
    serde_json::from_value(Value::Object(merged))
}

/// Like [`merge_over_default`], but a key whose value has the wrong type keeps
/// its default instead of failing the merge.
pub fn merge_keeping_valid_keys(parsed: Map<String, Value>) -> serde_json::Result<Document> {
    let mut merged = default_map()?;
    let mut document = Document::default();
    for (key, value) in parsed {
        if value.is_null() || key == EXPORTED_AT_KEY {
            continue;
        }
        let previous = merged.insert(key.clone(), value);
        match serde_json::from_value(Value::Object(merged.clone())) {
            Ok(candidate) => document = candidate,
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring stored value of the wrong type");
                match previous {
                    Some(value) => merged.insert(key, value),
                    None => merged.remove(&key),
                };
            }
        }
    }
    Ok(document)
}

fn default_map() -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(Document::default())? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Trim student names, drop blank ones and drop entries whose id repeats an
/// earlier one.
pub fn normalize(document: &mut Document) {
    for classroom in &mut document.classrooms {
        classroom.students = classroom
            .students
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut seen = HashSet::new();
    document.classrooms.retain(|c| seen.insert(c.id.clone()));
    let mut seen = HashSet::new();
    document.option_sets.retain(|s| seen.insert(s.id.clone()));
}

/// Parse and validate an imported file.
///
/// The file must be a JSON object with a `classrooms` array whose entries all
/// carry a unique string `id`, a non-blank string `name` and an array of
/// string `students`. Option set ids must be unique too.
pub fn parse_import(raw: &str) -> std::result::Result<Document, ImportError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let map = match parsed {
        Value::Object(map) => map,
        _ => return Err(ImportError::InvalidShape("expected a JSON object".into())),
    };
    validate_classrooms(map.get("classrooms"))?;
    validate_unique_ids(map.get("rouletteSets"), "option set")?;
    let mut document = merge_over_default(map)?;
    normalize(&mut document);
    Ok(document)
}

fn validate_classrooms(value: Option<&Value>) -> std::result::Result<(), ImportError> {
    let classrooms = value
        .and_then(Value::as_array)
        .ok_or_else(|| ImportError::InvalidShape("missing classrooms list".into()))?;

    for (index, classroom) in classrooms.iter().enumerate() {
        let valid = classroom.get("id").is_some_and(Value::is_string)
            && classroom
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| !name.trim().is_empty())
            && classroom
                .get("students")
                .and_then(Value::as_array)
                .is_some_and(|students| students.iter().all(Value::is_string));
        if !valid {
            return Err(ImportError::InvalidShape(format!(
                "classroom {} is missing an id, a name or its students",
                index + 1
            )));
        }
    }
    validate_unique_ids(value, "classroom")
}

fn validate_unique_ids(value: Option<&Value>, what: &str) -> std::result::Result<(), ImportError> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return Ok(());
    };
    let mut seen = HashSet::new();
    for id in entries.iter().filter_map(|e| e.get("id")).filter_map(Value::as_str) {
        if !seen.insert(id) {
            return Err(ImportError::InvalidShape(format!(
                "{} id {} appears more than once",
                what, id
            )));
        }
    }
    Ok(())
}
