//! OpenSearch implementation of the document store.
//!
//! This module provides a concrete implementation of `DocumentStore`
//! using OpenSearch as the backend.

mod index_config;
mod store;

pub use index_config::{get_index_settings, get_versioned_index_name, IndexConfig, INDEX_NAME};
pub use store::OpenSearchStore;
