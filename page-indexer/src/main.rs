//! Page Indexer Main Entry Point
//!
//! Indexes page renders stored as JSON files into OpenSearch.

use std::env;
use std::path::{Path, PathBuf};

use clap::Parser;
use dotenv::dotenv;
use page_indexer::{
    CrawlerContext, Dependencies, IndexingOutcome, PageIndexer, RenderRequest, StartupError,
};
use page_indexer_shared::PageRender;
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "page-indexer")]
#[command(about = "Index rendered pages into OpenSearch", long_about = None)]
struct Cli {
    /// Indexer options JSON file
    #[arg(long, env = "INDEXER_OPTIONS")]
    options: Option<PathBuf>,

    /// Page render JSON files to index
    #[arg(required = true)]
    pages: Vec<PathBuf>,
}

/// One page render together with the request it was rendered for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageJob {
    page: PageRender,
    #[serde(default)]
    visitor_groups: Vec<i64>,
    /// Raw group lists of the content elements rendered on the page.
    #[serde(default)]
    content_element_groups: Vec<String>,
    #[serde(default)]
    backend_session: bool,
    /// Set when a crawl worker triggered the render.
    #[serde(default)]
    crawler_instructions: Option<Vec<String>>,
}

impl PageJob {
    fn into_parts(self) -> (PageRender, RenderRequest) {
        let mut request = RenderRequest::for_visitor(self.visitor_groups);
        for groups in &self.content_element_groups {
            request
                .content_access
                .record_content_element("tt_content", groups);
        }
        request.backend_session = self.backend_session;
        if let Some(instructions) = self.crawler_instructions {
            request = request.with_crawler(CrawlerContext::running(instructions));
        }
        (self.page, request)
    }
}

/// Initialize tracing/logging.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("page_indexer=info"));

    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "page-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();

        info!(
            service_name = "page-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

async fn load_job(path: &Path) -> Result<PageJob, StartupError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StartupError::config(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| StartupError::config(format!("Failed to parse {}: {}", path.display(), e)))
}

async fn index_file(indexer: &PageIndexer, path: &Path) -> Option<IndexingOutcome> {
    let job = match load_job(path).await {
        Ok(job) => job,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Skipping page file");
            return None;
        }
    };

    let (page, mut request) = job.into_parts();
    let outcome = indexer.index_page(&page, &mut request).await;

    if let Some(crawler) = &request.crawler {
        for line in crawler.log() {
            info!(file = %path.display(), crawler_log = %line, "Crawler log");
        }
    }
    Some(outcome)
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    init_tracing();

    info!(page_files = cli.pages.len(), "Starting page indexer");

    let deps = match Dependencies::new(cli.options.as_deref()).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let mut failed = 0usize;
    for path in &cli.pages {
        match index_file(&deps.indexer, path).await {
            Some(IndexingOutcome::Failed { .. }) | None => failed += 1,
            Some(_) => {}
        }
    }

    let (pages, documents) = deps.indexer.totals();
    info!(
        pages_indexed = pages,
        documents_indexed = documents,
        failed = failed,
        "Page indexer finished"
    );

    Ok(())
}
