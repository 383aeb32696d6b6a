//! Document store trait definition.
//!
//! This module defines the abstract interface the indexer submits documents
//! through, allowing for different backend implementations.

use async_trait::async_trait;
use page_indexer_shared::PageDocument;

use crate::errors::StoreError;

/// Abstracts the underlying search store (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into the submission coordinator so the
/// pipeline can be tested with mock stores. Request timeouts are the
/// implementation's responsibility; no method may block indefinitely.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ensure the search index and any required aliases exist, creating them if necessary.
    ///
    /// Called once during application startup.
    async fn ensure_index_exists(&self) -> Result<(), StoreError>;

    /// Check whether the store is reachable.
    ///
    /// Never fails; an unreachable store answers `false`.
    async fn ping(&self) -> bool;

    /// Add (or replace) a set of documents, keyed by their `id` field.
    ///
    /// # Arguments
    ///
    /// * `documents` - The documents to index
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every document was accepted
    /// * `Err(StoreError)` - If the request failed or any document was rejected
    async fn add_documents(&self, documents: &[PageDocument]) -> Result<(), StoreError>;
}
