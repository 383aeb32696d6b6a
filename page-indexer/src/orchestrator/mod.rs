//! Orchestrator module for the page indexer.
//!
//! Runs one page render through the gate, processor, decorator and loader.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use page_indexer_repository::DocumentStore;
use page_indexer_shared::PageRender;
use tracing::{debug, error, info, instrument, warn};

use crate::access::resolve_access_groups;
use crate::config::IndexerOptions;
use crate::decorator::{FieldDecorator, FieldProcessorRegistry};
use crate::errors::IndexingError;
use crate::gate::{self, Eligibility, EnablementPath, Rejection};
use crate::loader::{LoaderConfig, SubmissionCoordinator, CHUNK_SIZE};
use crate::processor::PageProcessor;
use crate::request::{RenderRequest, CRAWLER_AUDIT_NOTE};

/// Result of indexing one page render.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexingOutcome {
    /// Documents were submitted.
    Indexed { documents: usize },
    /// The page is not supposed to be indexed.
    Rejected(Rejection),
    /// Indexing was attempted and failed.
    Failed { code: u32, message: String },
}

impl IndexingOutcome {
    /// Returns true if documents were submitted.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }
}

/// Indexes page renders.
///
/// The host render pipeline calls [`index_page`](Self::index_page) once per
/// generated page. The indexer holds no per-request state and can be shared
/// between concurrent requests.
pub struct PageIndexer {
    options: IndexerOptions,
    processor: PageProcessor,
    decorator: FieldDecorator,
    field_processors: FieldProcessorRegistry,
    store: Arc<dyn DocumentStore>,
    /// Total number of pages indexed since startup.
    total_pages_indexed: AtomicU64,
    /// Total number of documents submitted since startup.
    total_documents_indexed: AtomicU64,
}

impl PageIndexer {
    /// Create a new indexer with the default decorator and the built-in
    /// field processors.
    pub fn new(
        options: IndexerOptions,
        processor: PageProcessor,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            options,
            processor,
            decorator: FieldDecorator::default(),
            field_processors: FieldProcessorRegistry::new(),
            store,
            total_pages_indexed: AtomicU64::new(0),
            total_documents_indexed: AtomicU64::new(0),
        }
    }

    /// Replace the field decorator.
    pub fn with_decorator(mut self, decorator: FieldDecorator) -> Self {
        self.decorator = decorator;
        self
    }

    /// Replace the field processor registry.
    pub fn with_field_processors(mut self, registry: FieldProcessorRegistry) -> Self {
        self.field_processors = registry;
        self
    }

    /// Pages and documents indexed since startup.
    pub fn totals(&self) -> (u64, u64) {
        (
            self.total_pages_indexed.load(Ordering::Relaxed),
            self.total_documents_indexed.load(Ordering::Relaxed),
        )
    }

    /// Index a page render.
    ///
    /// Never fails: rejections and errors are logged with their reason code
    /// and reported in the outcome.
    ///
    /// # Arguments
    ///
    /// * `page` - The rendered page
    /// * `request` - The request the page was rendered for; receives the
    ///   crawl worker's audit note
    #[instrument(skip(self, page, request), fields(page_id = page.id, language = page.language))]
    pub async fn index_page(
        &self,
        page: &PageRender,
        request: &mut RenderRequest,
    ) -> IndexingOutcome {
        match self.try_index_page(page, request).await {
            Ok(documents) => {
                info!(
                    page_id = page.id,
                    documents = documents,
                    "Page indexed"
                );
                IndexingOutcome::Indexed { documents }
            }
            Err(IndexingError::GateRejected(rejection)) => {
                info!(
                    page_id = page.id,
                    code = rejection.code(),
                    reason = rejection.message(),
                    "Page not indexed"
                );
                IndexingOutcome::Rejected(rejection)
            }
            Err(e) => {
                self.log_error(page, &e);
                IndexingOutcome::Failed {
                    code: e.code(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Index a page render, returning the number of submitted documents.
    ///
    /// Collaborator results that are rejected along the way are logged and
    /// do not fail the pass.
    pub async fn try_index_page(
        &self,
        page: &PageRender,
        request: &mut RenderRequest,
    ) -> Result<usize, IndexingError> {
        match gate::evaluate(page, request, &self.options) {
            Eligibility::Rejected(rejection) => return Err(rejection.into()),
            Eligibility::Eligible(EnablementPath::Crawler) => {
                if let Some(crawler) = request.crawler.as_mut() {
                    crawler.add_log(CRAWLER_AUDIT_NOTE);
                }
            }
            Eligibility::Eligible(EnablementPath::Direct) => {}
        }

        let mut coordinator = SubmissionCoordinator::with_config(
            Arc::clone(&self.store),
            LoaderConfig {
                chunk_size: CHUNK_SIZE,
                log_payloads: self.options.log_indexing,
            },
        );
        coordinator.check_connection().await?;

        let access_groups = resolve_access_groups(page, request);
        debug!(page_id = page.id, access_groups = ?access_groups, "Resolved access");

        let processed = self.processor.process(page, &access_groups);
        for rejected in &processed.rejected {
            self.log_error(page, rejected);
        }
        let mut documents = processed.documents;

        for e in self
            .decorator
            .decorate(&mut documents, &self.options.additional_fields, page)
        {
            self.log_error(page, &e);
        }

        for e in self
            .field_processors
            .apply(&self.options.field_processing_instructions, &mut documents)
        {
            self.log_error(page, &e);
        }

        let submitted = coordinator.submit(&documents).await?;

        self.total_pages_indexed.fetch_add(1, Ordering::Relaxed);
        self.total_documents_indexed
            .fetch_add(submitted as u64, Ordering::Relaxed);
        Ok(submitted)
    }

    fn log_error(&self, page: &PageRender, e: &IndexingError) {
        match e {
            IndexingError::InvalidCollaboratorResult { .. } => {
                warn!(
                    page_id = page.id,
                    code = e.code(),
                    error = %e,
                    "Rejected collaborator result"
                )
            }
            _ => error!(page_id = page.id, code = e.code(), error = %e, "Indexing failed"),
        }

        if self.options.log_exceptions {
            error!(page_id = page.id, code = e.code(), details = ?e, "Indexing exception");
        }
    }
}
