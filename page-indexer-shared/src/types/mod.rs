//! This module defines the core data structures and types used across the page indexer.
//! It re-exports the page render input and the page document output.

pub mod page_document;
pub mod page_render;

pub use page_document::{PageDocument, REQUIRED_FIELDS};
pub use page_render::{AncestorPage, PageRender};
