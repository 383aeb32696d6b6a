//! Processor module for the page indexer.
//!
//! Transforms page renders into search documents.

mod content_hash;
mod document_builder;
mod hooks;
mod page_processor;

pub use content_hash::{compute_content_hash, validated_content_hash};
pub use document_builder::{DocumentBuilder, APP_KEY, PAGE_DOCUMENT_TYPE};
pub use hooks::{Augmenter, Substitutor};
pub use page_processor::{PageProcessor, ProcessedPage};
