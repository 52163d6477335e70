//! Error types for snapshelf.

use std::fmt;

use thiserror::Error;

/// Result type alias using snapshelf's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// What kind of name collided in a [`Error::DuplicateName`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    User,
    Album,
    TagType,
    Tag,
    Photo,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NameKind::User => "User",
            NameKind::Album => "Album",
            NameKind::TagType => "Tag type",
            NameKind::Tag => "Tag",
            NameKind::Photo => "Photo",
        };
        f.write_str(label)
    }
}

/// Core error type for library, album and search operations.
///
/// Every variant is recoverable by the caller; no operation leaves state
/// half-mutated when it returns one of these.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or blank required field, or an out-of-range index
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Case-insensitive name collision
    #[error("{kind} already exists: {name}")]
    DuplicateName { kind: NameKind, name: String },

    /// No persisted record for a key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Album-from-search attempted with no matches
    #[error("Search produced no photos")]
    EmptyResult,

    /// Database operation failed (wraps rusqlite::Error)
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error, or a stored record with a bad shape
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn duplicate(kind: NameKind, name: impl Into<String>) -> Self {
        Error::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
