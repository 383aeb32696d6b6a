//! Document store error types.
//!
//! This module defines the unified error type for all document store operations.

use thiserror::Error;

/// Unified errors from document store operations.
///
/// Used by the `DocumentStore` trait and its implementations. Covers both
/// low-level backend errors (connection, serialization) and rejected input.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Validation error (e.g., a document without an id).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the store backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Bulk indexing request had failures.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse response from the store backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the store backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl StoreError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk index error.
    pub fn bulk_index(msg: impl Into<String>) -> Self {
        Self::BulkIndexError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
