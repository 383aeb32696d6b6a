//! Page processor implementation.
//!
//! Turns a page render into the documents to index: the canonical page
//! document, possibly replaced by substitutes, plus documents contributed
//! by augmenters.

use std::sync::Arc;

use page_indexer_shared::{PageDocument, PageRender};
use tracing::{debug, instrument};

use crate::config::SiteIdentity;
use crate::errors::IndexingError;
use crate::processor::document_builder::DocumentBuilder;
use crate::processor::hooks::{Augmenter, Substitutor};

/// Documents produced for one page render.
#[derive(Debug, Default)]
pub struct ProcessedPage {
    /// The page document first, followed by accepted additional documents.
    pub documents: Vec<PageDocument>,
    /// Collaborator results that were rejected.
    pub rejected: Vec<IndexingError>,
}

/// Processor that transforms page renders into search documents.
///
/// The processor is responsible for:
/// - Building the canonical page document
/// - Running registered substitutes in order
/// - Collecting documents from registered augmenters
pub struct PageProcessor {
    builder: DocumentBuilder,
    substitutors: Vec<Arc<dyn Substitutor>>,
    augmenters: Vec<Arc<dyn Augmenter>>,
}

impl PageProcessor {
    /// Create a new page processor for documents owned by `site`.
    pub fn new(site: SiteIdentity) -> Self {
        Self {
            builder: DocumentBuilder::new(site),
            substitutors: Vec::new(),
            augmenters: Vec::new(),
        }
    }

    /// Register a substitute. Substitutes run in registration order.
    pub fn with_substitutor(mut self, substitutor: Arc<dyn Substitutor>) -> Self {
        self.substitutors.push(substitutor);
        self
    }

    /// Register an augmenter. Augmenters run in registration order.
    pub fn with_augmenter(mut self, augmenter: Arc<dyn Augmenter>) -> Self {
        self.augmenters.push(augmenter);
        self
    }

    /// Process a page render.
    ///
    /// # Arguments
    ///
    /// * `page` - The rendered page
    /// * `access_groups` - Resolved access groups of the page
    ///
    /// # Returns
    ///
    /// The documents to index and the collaborator results that were rejected.
    #[instrument(skip(self, page, access_groups), fields(page_id = page.id))]
    pub fn process(&self, page: &PageRender, access_groups: &[u32]) -> ProcessedPage {
        let mut rejected = Vec::new();
        let mut document = self.builder.build(page, access_groups);

        for substitutor in &self.substitutors {
            match substitute(substitutor.as_ref(), page, &document) {
                Ok(replacement) => document = replacement,
                Err(e) => rejected.push(e),
            }
        }

        let mut documents = vec![document];
        for augmenter in &self.augmenters {
            match augment(augmenter.as_ref(), page, &documents[0]) {
                Ok(additional) => documents.extend(additional),
                Err(e) => rejected.push(e),
            }
        }

        debug!(
            document_count = documents.len(),
            rejected_count = rejected.len(),
            "Processed page"
        );
        ProcessedPage {
            documents,
            rejected,
        }
    }
}

fn substitute(
    substitutor: &dyn Substitutor,
    page: &PageRender,
    document: &PageDocument,
) -> Result<PageDocument, IndexingError> {
    let collaborator = format!("substitute '{}'", substitutor.name());
    let replacement = substitutor
        .substitute(page, document)
        .map_err(|e| IndexingError::invalid_result(&collaborator, e.to_string()))?;

    replacement.validate().map_err(|field| {
        IndexingError::invalid_result(&collaborator, format!("missing required field '{}'", field))
    })?;
    Ok(replacement)
}

fn augment(
    augmenter: &dyn Augmenter,
    page: &PageRender,
    document: &PageDocument,
) -> Result<Vec<PageDocument>, IndexingError> {
    let collaborator = format!("augmenter '{}'", augmenter.name());
    let additional = augmenter
        .additional_documents(page, document)
        .map_err(|e| IndexingError::invalid_result(&collaborator, e.to_string()))?;

    for (index, candidate) in additional.iter().enumerate() {
        candidate.validate().map_err(|field| {
            IndexingError::invalid_result(
                &collaborator,
                format!("document {} is missing required field '{}'", index, field),
            )
        })?;
    }
    Ok(additional)
}
