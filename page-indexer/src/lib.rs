//! # Page Indexer
//!
//! Turns rendered content pages into search documents and submits them to
//! a document store.
//!
//! ## Architecture
//!
//! One page render flows through:
//!
//! 1. **Gate**: decides whether the page should be indexed
//! 2. **Processor**: builds the page document (access groups, content, boost
//!    fields) and runs substitutes and augmenters
//! 3. **Decorator**: adds configured fields and runs field processors
//! 4. **Loader**: pings the store and submits documents in chunks
//! 5. **Orchestrator**: coordinates the flow and logs every outcome
//!
//! ## Modules
//!
//! - [`config`]: Options, site identity and dependency initialization
//! - [`request`]: Per-request render context
//! - [`gate`]: Eligibility rules
//! - [`access`]: Access group resolution
//! - [`tags`]: Tag-boost extraction
//! - [`content`]: Indexable content extraction
//! - [`processor`]: Document construction and extension points
//! - [`decorator`]: Field decoration and field processors
//! - [`loader`]: Batch submission
//! - [`orchestrator`]: The [`PageIndexer`] entry point
//! - [`errors`]: Error types for the indexer

pub mod access;
pub mod config;
pub mod content;
pub mod decorator;
pub mod errors;
pub mod gate;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod request;
pub mod tags;

pub use config::{Dependencies, IndexerOptions, SiteIdentity};
pub use errors::IndexingError;
pub use orchestrator::{IndexingOutcome, PageIndexer};
pub use request::{CrawlerContext, RenderRequest, RequestAccessGroups};

use page_indexer_repository::StoreError;
use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum StartupError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Document store error.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Indexing error.
    #[error("Indexing error: {0}")]
    IndexingError(#[from] IndexingError),
}

impl StartupError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
