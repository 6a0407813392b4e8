//! Error types for keyed_tables

use thiserror::Error;

/// Result type alias for table operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in table operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Hash table is full (capacity {capacity})")]
    TableFull { capacity: usize },

    #[error("Internal hash table for {key1:?} is full (capacity {capacity})")]
    InnerTableFull { key1: String, capacity: usize },

    #[error("Invalid capacity ladder: {0}")]
    InvalidLadder(String),
}

impl Error {
    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        Error::NotFound(key.into())
    }

    /// True for the not-found case at any level.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True when either level of a table ran out of slots.
    pub fn is_full(&self) -> bool {
        matches!(self, Error::TableFull { .. } | Error::InnerTableFull { .. })
    }
}
