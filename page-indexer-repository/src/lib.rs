//! # Page Indexer Repository
//!
//! This crate provides the trait and implementations for submitting page
//! documents to a search store. It includes definitions for errors, the
//! `DocumentStore` interface, and a concrete implementation for OpenSearch.

pub mod errors;
pub mod interfaces;
pub mod opensearch;

pub use errors::StoreError;
pub use interfaces::DocumentStore;
pub use opensearch::OpenSearchStore;
