//! Loader module for the page indexer.
//!
//! Submits documents to the document store in fixed-size chunks after
//! checking that the store is reachable.

use std::sync::Arc;

use page_indexer_repository::DocumentStore;
use page_indexer_shared::PageDocument;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::IndexingError;

/// Number of documents per store request.
pub const CHUNK_SIZE: usize = 20;

/// Configuration for the submission coordinator.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents per store request.
    pub chunk_size: usize,
    /// Log document payloads before submitting them.
    pub log_payloads: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            log_payloads: false,
        }
    }
}

/// Lifecycle of one submission.
///
/// `Idle -> ConnectionChecked -> {Submitted | SubmissionFailed}`, or
/// `Idle -> Aborted` when the store is unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    ConnectionChecked,
    Submitted,
    SubmissionFailed,
    Aborted,
}

impl SubmissionState {
    /// Returns true once the submission can no longer change state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted | Self::SubmissionFailed | Self::Aborted)
    }
}

/// Coordinates the submission of one page's documents.
///
/// A coordinator is used for a single submission; create a new one per
/// page. Chunks already delivered are not rolled back when a later chunk
/// fails.
pub struct SubmissionCoordinator {
    store: Arc<dyn DocumentStore>,
    config: LoaderConfig,
    state: SubmissionState,
}

impl SubmissionCoordinator {
    /// Create a new coordinator for the given store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, LoaderConfig::default())
    }

    /// Create a new coordinator with custom configuration.
    pub fn with_config(store: Arc<dyn DocumentStore>, config: LoaderConfig) -> Self {
        Self {
            store,
            config: LoaderConfig {
                chunk_size: config.chunk_size.max(1),
                ..config
            },
            state: SubmissionState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Check that the store is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The store answered; state is `ConnectionChecked`
    /// * `Err(IndexingError::StoreUnavailable)` - The store did not answer; state is `Aborted`
    #[instrument(skip(self))]
    pub async fn check_connection(&mut self) -> Result<(), IndexingError> {
        if self.state.is_terminal() {
            return Err(IndexingError::config(format!(
                "Submission already finished in state {:?}",
                self.state
            )));
        }
        if self.state == SubmissionState::ConnectionChecked {
            return Ok(());
        }

        if self.store.ping().await {
            self.state = SubmissionState::ConnectionChecked;
            debug!("Document store is reachable");
            Ok(())
        } else {
            self.state = SubmissionState::Aborted;
            warn!("Document store did not answer the ping");
            Err(IndexingError::store_unavailable(
                "Document store did not answer the ping",
            ))
        }
    }

    /// Submit documents in chunks, checking the connection first if that
    /// has not happened yet.
    ///
    /// The first failing chunk stops the submission.
    ///
    /// # Arguments
    ///
    /// * `documents` - The documents to submit
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of documents submitted; state is `Submitted`
    /// * `Err(IndexingError)` - Store unavailable (`Aborted`) or a chunk failed (`SubmissionFailed`)
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub async fn submit(&mut self, documents: &[PageDocument]) -> Result<usize, IndexingError> {
        self.check_connection().await?;

        for (chunk_index, chunk) in documents.chunks(self.config.chunk_size).enumerate() {
            if self.config.log_payloads {
                match serde_json::to_string(chunk) {
                    Ok(payload) => {
                        debug!(chunk = chunk_index, payload = %payload, "Submitting chunk")
                    }
                    Err(e) => warn!(
                        chunk = chunk_index,
                        error = %e,
                        "Failed to serialize chunk for logging"
                    ),
                }
            }

            if let Err(e) = self.store.add_documents(chunk).await {
                self.state = SubmissionState::SubmissionFailed;
                error!(
                    chunk = chunk_index,
                    chunk_len = chunk.len(),
                    error = %e,
                    "Failed to submit documents"
                );
                return Err(IndexingError::submission(chunk_index, e.to_string()));
            }
        }

        self.state = SubmissionState::Submitted;
        info!(count = documents.len(), "Submitted documents");
        Ok(documents.len())
    }
}
