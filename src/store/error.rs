//! Document store error types
//!
//! Defines all errors that can occur in the store layer.

use crate::store::types::Collection;
use thiserror::Error;

/// Errors that can occur in the document store
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The SQLite backend rejected an operation
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Requested document does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: Collection, id: String },

    /// A document already exists under the requested key
    #[error("Document already exists: {collection}/{id}")]
    AlreadyExists { collection: Collection, id: String },

    /// Document bodies and patches must be JSON objects
    #[error("Document body must be a JSON object: {0}")]
    NotAnObject(String),

    /// Field path for a field-level update was empty
    #[error("Invalid field path: {0}")]
    InvalidPath(String),

    /// Invalid date range (start >= end)
    #[error("Invalid date range: start must be less than end")]
    InvalidRange,

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
