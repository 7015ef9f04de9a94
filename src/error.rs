//! Error types for the pet store
//!
//! Provides a unified error type for store and transport operations.

use thiserror::Error;

use crate::record::FieldValue;
use crate::schema::FieldKind;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Schema Errors
    // -------------------------------------------------------------------------
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Unknown index '{index}' on table '{table}'")]
    UnknownIndex { table: String, index: String },

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Duplicate key {key} for unique index '{index}' on table '{table}'")]
    DuplicateKey {
        table: String,
        index: String,
        key: FieldValue,
    },

    #[error("No record with {index} = {key} in table '{table}'")]
    NotFound {
        table: String,
        index: String,
        key: FieldValue,
    },

    #[error("Record for table '{table}' is missing indexed field '{field}'")]
    MissingField { table: String, field: String },

    #[error("Field '{field}' on table '{table}' expects {expected}, got {found}")]
    TypeMismatch {
        table: String,
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Table '{table}' has an active write transaction")]
    Busy { table: String },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether the caller may retry the same operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Busy { .. })
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
