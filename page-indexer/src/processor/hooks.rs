//! Document mutation extension points.
//!
//! Implementations are registered on the [`PageProcessor`](super::PageProcessor)
//! at startup and run in registration order, before field decoration.

use page_indexer_shared::{PageDocument, PageRender};

use crate::errors::IndexingError;

/// Replaces the page document wholesale.
pub trait Substitutor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Produce the replacement for `document`.
    ///
    /// A replacement that fails validation is rejected and the document is
    /// left unchanged.
    fn substitute(
        &self,
        page: &PageRender,
        document: &PageDocument,
    ) -> Result<PageDocument, IndexingError>;
}

/// Contributes additional documents alongside the page document.
pub trait Augmenter: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Produce documents to index next to `document`.
    ///
    /// If any contributed document fails validation, the whole
    /// contribution is rejected.
    fn additional_documents(
        &self,
        page: &PageRender,
        document: &PageDocument,
    ) -> Result<Vec<PageDocument>, IndexingError>;
}
