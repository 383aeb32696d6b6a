//! # Page Indexer Shared
//!
//! This crate defines shared data structures and types used across the page indexer.
//! It includes the rendered page snapshot consumed by the indexer and the
//! ordered field-map document submitted to the search store.

pub mod types;

pub use types::page_document::PageDocument;
pub use types::page_render::{AncestorPage, PageRender};
