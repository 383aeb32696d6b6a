//! Error types for the page indexer repository.
//!
//! This module provides a unified error type for all document store operations.

mod store_error;

pub use store_error::StoreError;
