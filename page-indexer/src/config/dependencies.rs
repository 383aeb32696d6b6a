//! Dependency initialization and wiring for the page indexer binary.

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{IndexerOptions, SiteIdentity};
use crate::orchestrator::PageIndexer;
use crate::processor::PageProcessor;
use crate::StartupError;
use page_indexer_repository::opensearch::IndexConfig;
use page_indexer_repository::{DocumentStore, OpenSearchStore};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default index alias.
const DEFAULT_INDEX_ALIAS: &str = "pages";

/// Default site URL.
const DEFAULT_SITE_URL: &str = "http://localhost/";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection until successful.
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if not set or invalid.
    pub fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("retry").to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!("Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'");
                Self::Retry
            }
        }
    }

    fn from_env() -> Self {
        Self::parse(env::var("OPENSEARCH_CONNECTION_MODE").ok().as_deref())
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured page indexer.
    pub indexer: Arc<PageIndexer>,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_ALIAS`: Index alias name (default: "pages")
    /// - `PAGES_INDEX_VERSION`: Index version number (default: 0)
    /// - `OPENSEARCH_CONNECTION_MODE`: Connection mode - "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `SITE_URL`: Base URL of the site (default: http://localhost/)
    /// - `ENCRYPTION_KEY`: Installation secret (required)
    ///
    /// # Arguments
    ///
    /// * `options_path` - Path of the indexer options JSON file
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(StartupError)` - If initialization fails (connection failures only in fail-fast mode)
    pub async fn new(options_path: Option<&Path>) -> Result<Self, StartupError> {
        let opensearch_url =
            env::var("OPENSEARCH_URL").unwrap_or_else(|_| DEFAULT_OPENSEARCH_URL.to_string());
        let connection_mode = ConnectionMode::from_env();
        let retry_interval = env::var("OPENSEARCH_RETRY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());
        let encryption_key = env::var("ENCRYPTION_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StartupError::config("ENCRYPTION_KEY must be set"))?;
        let site = SiteIdentity::new(site_url, encryption_key);

        let options = match options_path {
            Some(path) => IndexerOptions::from_file(path)?,
            None => {
                warn!("No indexer options given, indexing is disabled");
                IndexerOptions::default()
            }
        };

        info!(
            opensearch_url = %opensearch_url,
            site_url = %site.site_url,
            connection_mode = ?connection_mode,
            retry_interval_secs = retry_interval,
            page_indexing = options.page_indexing,
            crawler_indexing = options.crawler_indexing,
            "Initializing dependencies"
        );

        let index_alias =
            env::var("INDEX_ALIAS").unwrap_or_else(|_| DEFAULT_INDEX_ALIAS.to_string());
        let index_version = env::var("PAGES_INDEX_VERSION")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);
        let index_config = IndexConfig::new(index_alias, index_version);

        let store = Self::connect_to_opensearch(
            &opensearch_url,
            index_config,
            connection_mode,
            Duration::from_secs(retry_interval),
        )
        .await?;

        info!("OpenSearch connection established");

        store
            .ensure_index_exists()
            .await
            .map_err(|e| StartupError::config(format!("Failed to ensure index exists: {}", e)))?;

        let processor = PageProcessor::new(site);
        let indexer = PageIndexer::new(options, processor, Arc::new(store));

        Ok(Self {
            indexer: Arc::new(indexer),
        })
    }

    /// Connect to OpenSearch with retry logic based on connection mode.
    async fn connect_to_opensearch(
        url: &str,
        index_config: IndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchStore, StartupError> {
        loop {
            match Self::try_connect_opensearch(url, index_config.clone()).await {
                Ok(store) => return Ok(store),
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(StartupError::config(format!(
                            "Failed to connect to OpenSearch: {}",
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to connect to OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }

    /// Create the store and check that it answers.
    async fn try_connect_opensearch(
        url: &str,
        index_config: IndexConfig,
    ) -> Result<OpenSearchStore, StartupError> {
        let store = OpenSearchStore::new(url, index_config).await?;

        if !store.ping().await {
            return Err(StartupError::config(format!(
                "OpenSearch at {} did not answer the ping",
                url
            )));
        }

        Ok(store)
    }
}
