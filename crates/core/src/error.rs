//! Error types for SortPot Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// User input failed a precondition; nothing was mutated.
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Import rejected: {0}")]
    Import(#[from] ImportError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Whether this error should be shown to the user as a plain message
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Import(_) | Error::NotFound(_))
    }
}

/// Why the stored document could not be materialized.
///
/// Never surfaced to the user: `DocumentStore::load` recovers to the default
/// document.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no document stored")]
    Missing,

    #[error("storage unreadable: {0}")]
    Storage(String),

    #[error("stored document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("stored document is not a JSON object")]
    NotAnObject,
}

/// Why an imported file was rejected.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("the file could not be read as JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("the file does not have a valid SortPot format: {0}")]
    InvalidShape(String),
}

pub type Result<T> = std::result::Result<T, Error>;
