//! Configuration for the page indexer.
//!
//! Installation options, site identity and dependency wiring for the binary.

mod dependencies;
mod options;
mod site;

pub use dependencies::{ConnectionMode, Dependencies};
pub use options::IndexerOptions;
pub use site::SiteIdentity;
