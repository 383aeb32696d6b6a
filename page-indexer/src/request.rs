//! Per-request render context.
//!
//! Everything the indexer needs to know about the request that produced a
//! page render, besides the render itself: who the visitor is, which access
//! restrictions the rendered content elements carried, and whether a crawl
//! worker triggered the render.

use crate::access::parse_group_list;

/// Processing instruction a crawl worker sets to request indexing.
pub const INDEXING_INSTRUCTION: &str = "tx_solr_reindex";

/// Note appended to the crawl worker's log when it triggers indexing.
pub const CRAWLER_AUDIT_NOTE: &str = "Page indexer is indexing";

/// Table name of page records. Page records are not content elements.
const PAGES_TABLE: &str = "pages";

/// Accumulates the visitor-group restrictions of every content element
/// rendered during one request.
///
/// One instance per request; never shared between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestAccessGroups {
    groups: Vec<i64>,
}

impl RequestAccessGroups {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the raw group list of a rendered content element.
    ///
    /// Records from the `pages` table are ignored; their restriction is
    /// taken from the page render itself.
    pub fn record_content_element(&mut self, table: &str, fe_group: &str) {
        if table == PAGES_TABLE {
            return;
        }
        self.groups.extend(parse_group_list(fe_group));
    }

    /// All groups recorded so far, in recording order, duplicates included.
    pub fn groups(&self) -> &[i64] {
        &self.groups
    }
}

/// Context of a crawl worker that triggered the render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlerContext {
    /// Whether the crawl worker is actively processing this request.
    pub running: bool,
    /// Instructions the crawl worker attached to this request.
    pub processing_instructions: Vec<String>,
    log: Vec<String>,
}

impl CrawlerContext {
    /// A running crawl worker with the given instructions.
    pub fn running(instructions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            running: true,
            processing_instructions: instructions.into_iter().map(Into::into).collect(),
            log: Vec::new(),
        }
    }

    /// Whether the given instruction was attached to this request.
    pub fn has_instruction(&self, instruction: &str) -> bool {
        self.processing_instructions
            .iter()
            .any(|candidate| candidate == instruction)
    }

    /// Append a line to the crawl worker's request log.
    pub fn add_log(&mut self, message: impl Into<String>) {
        self.log.push(message.into());
    }

    /// The crawl worker's request log.
    pub fn log(&self) -> &[String] {
        &self.log
    }
}

/// The request a page render was produced for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRequest {
    /// Groups the acting visitor belongs to.
    pub visitor_groups: Vec<i64>,
    /// Restrictions collected from rendered content elements.
    pub content_access: RequestAccessGroups,
    /// A backend/administrative session is active.
    pub backend_session: bool,
    /// Crawl worker context, if a crawl worker triggered the render.
    pub crawler: Option<CrawlerContext>,
}

impl RenderRequest {
    /// A request by a visitor with the given group memberships.
    pub fn for_visitor(visitor_groups: impl IntoIterator<Item = i64>) -> Self {
        Self {
            visitor_groups: visitor_groups.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Attach a crawl worker context.
    pub fn with_crawler(mut self, crawler: CrawlerContext) -> Self {
        self.crawler = Some(crawler);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_elements_accumulate() {
        let mut groups = RequestAccessGroups::new();
        groups.record_content_element("tt_content", "1,2");
        groups.record_content_element("tt_content", "");
        groups.record_content_element("pages", "7");
        groups.record_content_element("tt_content", "4");

        assert_eq!(groups.groups(), &[1, 2, 0, 4]);
    }

    #[test]
    fn test_crawler_instructions_and_log() {
        let mut crawler = CrawlerContext::running([INDEXING_INSTRUCTION]);
        assert!(crawler.running);
        assert!(crawler.has_instruction("tx_solr_reindex"));
        assert!(!crawler.has_instruction("tx_other"));

        crawler.add_log(CRAWLER_AUDIT_NOTE);
        assert_eq!(crawler.log(), &["Page indexer is indexing".to_string()]);
    }

    #[test]
    fn test_isolated_per_request() {
        let mut first = RenderRequest::for_visitor([1]);
        first.content_access.record_content_element("tt_content", "5");

        let second = RenderRequest::for_visitor([1]);
        assert!(second.content_access.groups().is_empty());
    }
}
