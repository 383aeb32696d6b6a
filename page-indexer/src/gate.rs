//! Eligibility gate.
//!
//! Decides whether a page render should be indexed at all. Evaluation is
//! pure: the caller logs rejections and writes the crawl worker's audit note.

use std::fmt;

use page_indexer_shared::PageRender;

use crate::config::IndexerOptions;
use crate::request::{RenderRequest, INDEXING_INSTRUCTION};

/// Why a page render is not indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The page disables search indexing.
    NoSearch,
    /// The page was rendered in non-cacheable mode.
    Uncacheable,
    /// The rendered content is a fallback for a different language.
    LanguageFallback,
    /// A backend session is active and indexing while logged in is disabled.
    BackendSession,
    /// Neither the direct nor the crawl enablement path is enabled.
    NotEnabled,
}

impl Rejection {
    /// Stable numeric reason code for logging.
    pub fn code(&self) -> u32 {
        match self {
            Self::NoSearch => 1234523946,
            Self::Uncacheable => 1234524030,
            Self::LanguageFallback => 1234524095,
            Self::BackendSession => 1246444055,
            Self::NotEnabled => 1234523900,
        }
    }

    /// Human-readable reason.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoSearch => "Indexing disabled for this page (no_search)",
            Self::Uncacheable => "Page is not cacheable (no_cache)",
            Self::LanguageFallback => {
                "Rendered content language differs from the requested language"
            }
            Self::BackendSession => {
                "Backend user is logged in and indexing while logged in is disabled"
            }
            Self::NotEnabled => "Indexing is not enabled for this request",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// The enablement path that made a page eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnablementPath {
    /// Installation and page indexing are enabled.
    Direct,
    /// A crawl worker requested indexing and crawler indexing is enabled.
    Crawler,
}

/// Result of the eligibility gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(EnablementPath),
    Rejected(Rejection),
}

impl Eligibility {
    /// Returns true if the page should be indexed.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible(_))
    }
}

/// Decide whether a page render should be indexed.
///
/// Rules are checked in order and the first failing rule decides the
/// rejection. The direct path is checked before the crawl path.
///
/// # Arguments
///
/// * `page` - The rendered page
/// * `request` - The request the page was rendered for
/// * `options` - Installation options
pub fn evaluate(
    page: &PageRender,
    request: &RenderRequest,
    options: &IndexerOptions,
) -> Eligibility {
    if page.no_search {
        return Eligibility::Rejected(Rejection::NoSearch);
    }
    if page.no_cache {
        return Eligibility::Rejected(Rejection::Uncacheable);
    }
    if page.language != page.content_language {
        return Eligibility::Rejected(Rejection::LanguageFallback);
    }
    if request.backend_session && !options.indexing_while_logged_in {
        return Eligibility::Rejected(Rejection::BackendSession);
    }

    if options.index_enable && options.page_indexing {
        return Eligibility::Eligible(EnablementPath::Direct);
    }

    let crawler_requested = request
        .crawler
        .as_ref()
        .is_some_and(|crawler| crawler.running && crawler.has_instruction(INDEXING_INSTRUCTION));
    if options.index_enable && options.crawler_indexing && crawler_requested {
        return Eligibility::Eligible(EnablementPath::Crawler);
    }

    Eligibility::Rejected(Rejection::NotEnabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::CrawlerContext;

    fn enabled() -> IndexerOptions {
        IndexerOptions {
            index_enable: true,
            page_indexing: true,
            ..Default::default()
        }
    }

    fn crawler_only() -> IndexerOptions {
        IndexerOptions {
            index_enable: true,
            crawler_indexing: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_direct_path() {
        let page = PageRender::default();
        let request = RenderRequest::default();

        assert_eq!(
            evaluate(&page, &request, &enabled()),
            Eligibility::Eligible(EnablementPath::Direct)
        );
    }

    #[test]
    fn test_no_search_always_rejects() {
        let page = PageRender {
            no_search: true,
            no_cache: true,
            ..Default::default()
        };
        let request =
            RenderRequest::default().with_crawler(CrawlerContext::running([INDEXING_INSTRUCTION]));
        let options = IndexerOptions {
            crawler_indexing: true,
            indexing_while_logged_in: true,
            ..enabled()
        };

        assert_eq!(
            evaluate(&page, &request, &options),
            Eligibility::Rejected(Rejection::NoSearch)
        );
    }

    #[test]
    fn test_rules_in_order() {
        let request = RenderRequest::default();

        let page = PageRender {
            no_cache: true,
            language: 1,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&page, &request, &enabled()),
            Eligibility::Rejected(Rejection::Uncacheable)
        );

        let page = PageRender {
            language: 1,
            content_language: 0,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&page, &request, &enabled()),
            Eligibility::Rejected(Rejection::LanguageFallback)
        );
    }

    #[test]
    fn test_backend_session() {
        let page = PageRender::default();
        let request = RenderRequest {
            backend_session: true,
            ..Default::default()
        };

        assert_eq!(
            evaluate(&page, &request, &enabled()),
            Eligibility::Rejected(Rejection::BackendSession)
        );

        let options = IndexerOptions {
            indexing_while_logged_in: true,
            ..enabled()
        };
        assert!(evaluate(&page, &request, &options).is_eligible());
    }

    #[test]
    fn test_page_indexing_alone_is_enough() {
        let page = PageRender {
            id: 5,
            content_hash: "abc".to_string(),
            fe_group: "2,3".to_string(),
            ..Default::default()
        };
        let raw = serde_json::json!({ "index": { "enablePageIndexing": true } });
        let options = IndexerOptions::from_value(&raw).unwrap();

        assert_eq!(
            evaluate(&page, &RenderRequest::for_visitor(vec![3]), &options),
            Eligibility::Eligible(EnablementPath::Direct)
        );
    }

    #[test]
    fn test_installation_switch_off() {
        let page = PageRender::default();
        let options = IndexerOptions {
            index_enable: false,
            page_indexing: true,
            crawler_indexing: true,
            ..Default::default()
        };

        assert_eq!(
            evaluate(&page, &RenderRequest::default(), &options),
            Eligibility::Rejected(Rejection::NotEnabled)
        );
    }

    #[test]
    fn test_crawler_path() {
        let page = PageRender::default();

        let request =
            RenderRequest::default().with_crawler(CrawlerContext::running([INDEXING_INSTRUCTION]));
        assert_eq!(
            evaluate(&page, &request, &crawler_only()),
            Eligibility::Eligible(EnablementPath::Crawler)
        );

        let request = RenderRequest::default().with_crawler(CrawlerContext::running(["tx_other"]));
        assert_eq!(
            evaluate(&page, &request, &crawler_only()),
            Eligibility::Rejected(Rejection::NotEnabled)
        );

        let mut idle = CrawlerContext::running([INDEXING_INSTRUCTION]);
        idle.running = false;
        let request = RenderRequest::default().with_crawler(idle);
        assert_eq!(
            evaluate(&page, &request, &crawler_only()),
            Eligibility::Rejected(Rejection::NotEnabled)
        );
    }

    #[test]
    fn test_rejection_display() {
        assert_eq!(Rejection::NoSearch.code(), 1234523946);
        assert!(Rejection::BackendSession.to_string().contains("1246444055"));
    }
}
