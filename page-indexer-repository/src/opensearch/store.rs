//! OpenSearch document store implementation.
//!
//! This module provides the concrete implementation of `DocumentStore`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsAliasParts},
    BulkOperation, BulkOperations, BulkParts, OpenSearch,
};
use page_indexer_shared::PageDocument;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::StoreError;
use crate::interfaces::DocumentStore;
use crate::opensearch::index_config::{get_index_settings, get_versioned_index_name, IndexConfig};

/// OpenSearch document store.
///
/// Documents are written through the configured alias and keyed by their
/// `id` field, so re-indexing a page variant replaces the earlier document.
///
/// # Example
///
/// ```ignore
/// use page_indexer_repository::opensearch::IndexConfig;
/// let config = IndexConfig::new("pages", 0);
/// let store = OpenSearchStore::new("http://localhost:9200", config).await?;
///
/// if store.ping().await {
///     store.add_documents(&documents).await?;
/// }
/// ```
pub struct OpenSearchStore {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchStore {
    /// Create a new OpenSearch store connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and version
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchStore)` - A new store instance
    /// * `Err(StoreError)` - If connection setup fails
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, StoreError> {
        let parsed_url = Url::parse(url).map_err(|e| StoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| StoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            "Created OpenSearch store"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Build the bulk request body for a set of documents.
    fn bulk_body(documents: &[PageDocument]) -> Result<BulkOperations, StoreError> {
        let mut ops = BulkOperations::new();
        for document in documents {
            let id = document
                .id()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| StoreError::validation("Document has no id"))?;
            ops.push(BulkOperation::index(document).id(id))
                .map_err(|e| StoreError::serialization(e.to_string()))?;
        }
        Ok(ops)
    }

    /// Collect the per-item failures reported in a bulk response.
    fn bulk_failures(body: &Value) -> Vec<String> {
        if !body["errors"].as_bool().unwrap_or(false) {
            return Vec::new();
        }

        body["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let result = &item["index"];
                        let error = result.get("error")?;
                        Some(format!(
                            "{}: {}",
                            result["_id"].as_str().unwrap_or("?"),
                            error["reason"].as_str().unwrap_or("unknown reason")
                        ))
                    })
                    .collect()
            })
            .unwrap_or_else(|| vec!["bulk response reported errors".to_string()])
    }
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    /// Ensure the versioned index exists and the alias points at it.
    async fn ensure_index_exists(&self) -> Result<(), StoreError> {
        let alias = self.index_config.alias.as_str();

        let response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;

        if response.status_code().is_success() {
            debug!(alias = %alias, "Index alias already exists");
            return Ok(());
        }

        let index_name = get_versioned_index_name(Some(self.index_config.version));
        let mut body = get_index_settings(Some(self.index_config.version));
        body["aliases"] = serde_json::json!({ alias: {} });

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(body)
            .send()
            .await
            .map_err(|e| StoreError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(StoreError::index_creation(format!(
                "Index creation failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %index_name, alias = %alias, "Created search index");
        Ok(())
    }

    async fn ping(&self) -> bool {
        match self.client.ping().send().await {
            Ok(response) => response.status_code().is_success(),
            Err(e) => {
                warn!(error = %e, "OpenSearch ping failed");
                false
            }
        }
    }

    /// Index documents with a single bulk request.
    ///
    /// # Arguments
    ///
    /// * `documents` - The documents to index; each must carry an `id`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every document was accepted
    /// * `Err(StoreError)` - If the request failed or any item was rejected
    async fn add_documents(&self, documents: &[PageDocument]) -> Result<(), StoreError> {
        if documents.is_empty() {
            return Ok(());
        }

        let ops = Self::bulk_body(documents)?;

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_config.alias))
            .body(vec![ops])
            .send()
            .await
            .map_err(|e| StoreError::bulk_index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(StoreError::bulk_index(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::parse(e.to_string()))?;

        let failures = Self::bulk_failures(&body);
        if !failures.is_empty() {
            error!(failed = failures.len(), "Bulk request had item failures");
            return Err(StoreError::bulk_index(failures.join("; ")));
        }

        debug!(count = documents.len(), "Documents indexed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(id: &str) -> PageDocument {
        let mut doc = PageDocument::new();
        doc.set_field("id", id);
        doc.set_field("type", "pages");
        doc
    }

    #[test]
    fn test_bulk_body_requires_id() {
        let docs = vec![document("a"), PageDocument::new()];
        let result = OpenSearchStore::bulk_body(&docs);
        assert!(matches!(result, Err(StoreError::ValidationError(_))));
    }

    #[test]
    fn test_bulk_body_accepts_documents_with_ids() {
        let docs = vec![document("a"), document("b")];
        assert!(OpenSearchStore::bulk_body(&docs).is_ok());
    }

    #[test]
    fn test_bulk_failures_without_errors() {
        let body = json!({ "errors": false, "items": [] });
        assert!(OpenSearchStore::bulk_failures(&body).is_empty());
    }

    #[test]
    fn test_bulk_failures_collects_item_errors() {
        let body = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "a", "status": 201 } },
                { "index": { "_id": "b", "status": 400, "error": { "reason": "mapper_parsing_exception" } } }
            ]
        });

        let failures = OpenSearchStore::bulk_failures(&body);
        assert_eq!(failures, vec!["b: mapper_parsing_exception".to_string()]);
    }

    #[test]
    fn test_bulk_failures_without_items() {
        let body = json!({ "errors": true });
        assert_eq!(OpenSearchStore::bulk_failures(&body).len(), 1);
    }
}
