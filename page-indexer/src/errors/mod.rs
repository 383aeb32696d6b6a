//! Error types for the page indexing pipeline.

use thiserror::Error;

use crate::gate::Rejection;

/// Reason code logged for store connectivity failures.
pub const CODE_STORE_UNAVAILABLE: u32 = 1234790825;
/// Reason code logged for failed chunk submissions.
pub const CODE_SUBMISSION_FAILED: u32 = 1234790826;
/// Reason code logged for malformed collaborator output.
pub const CODE_INVALID_COLLABORATOR_RESULT: u32 = 1234790827;
/// Reason code logged for configuration problems.
pub const CODE_CONFIGURATION: u32 = 1234790828;

/// Errors that can occur while indexing one page render.
///
/// None of these escape [`PageIndexer::index_page`](crate::PageIndexer::index_page);
/// they are logged with their [`code`](IndexingError::code) and folded into an
/// [`IndexingOutcome`](crate::IndexingOutcome).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexingError {
    /// The page should not be indexed. Expected, not a failure.
    #[error("Page not indexed: {0}")]
    GateRejected(Rejection),

    /// The document store did not answer the liveness check.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A chunk of documents could not be delivered.
    #[error("Submission of chunk {chunk} failed: {message}")]
    SubmissionFailed {
        /// Zero-based index of the failing chunk.
        chunk: usize,
        message: String,
    },

    /// A substitute, augmenter, renderer or field processor returned malformed output.
    #[error("Invalid result from {collaborator}: {reason}")]
    InvalidCollaboratorResult { collaborator: String, reason: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl IndexingError {
    /// Create a store unavailable error.
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create a submission failure for the given chunk.
    pub fn submission(chunk: usize, msg: impl Into<String>) -> Self {
        Self::SubmissionFailed {
            chunk,
            message: msg.into(),
        }
    }

    /// Create an invalid collaborator result error.
    pub fn invalid_result(collaborator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCollaboratorResult {
            collaborator: collaborator.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Stable numeric reason code for logging.
    pub fn code(&self) -> u32 {
        match self {
            Self::GateRejected(rejection) => rejection.code(),
            Self::StoreUnavailable(_) => CODE_STORE_UNAVAILABLE,
            Self::SubmissionFailed { .. } => CODE_SUBMISSION_FAILED,
            Self::InvalidCollaboratorResult { .. } => CODE_INVALID_COLLABORATOR_RESULT,
            Self::Configuration(_) => CODE_CONFIGURATION,
        }
    }
}

impl From<Rejection> for IndexingError {
    fn from(rejection: Rejection) -> Self {
        Self::GateRejected(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(IndexingError::store_unavailable("down").code(), 1234790825);
        assert_eq!(IndexingError::submission(2, "boom").code(), 1234790826);
        assert_eq!(IndexingError::invalid_result("x", "y").code(), 1234790827);
        assert_eq!(IndexingError::config("bad").code(), 1234790828);
        assert_eq!(IndexingError::from(Rejection::NoSearch).code(), 1234523946);
    }

    #[test]
    fn test_display() {
        let err = IndexingError::submission(1, "timeout");
        assert_eq!(err.to_string(), "Submission of chunk 1 failed: timeout");

        let err = IndexingError::invalid_result("substitute 'news'", "missing field id");
        assert_eq!(
            err.to_string(),
            "Invalid result from substitute 'news': missing field id"
        );
    }
}
