//! Canonical page document construction.

use page_indexer_shared::{PageDocument, PageRender};

use crate::access::{access_field, group_signature};
use crate::config::SiteIdentity;
use crate::content::ContentExtractor;
use crate::processor::content_hash::validated_content_hash;
use crate::tags::extract_boost_fields;

/// Application key stored in every document.
pub const APP_KEY: &str = "EXT:solr";

/// Document type of page documents.
pub const PAGE_DOCUMENT_TYPE: &str = "pages";

/// Builds the canonical document of a page render.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    site: SiteIdentity,
    site_hash: String,
}

impl DocumentBuilder {
    /// Create a builder for documents owned by `site`.
    pub fn new(site: SiteIdentity) -> Self {
        let site_hash = site.site_hash();
        Self { site, site_hash }
    }

    /// Unique document id of a page variant.
    ///
    /// `{siteHash}/pages/{uid}/{typeNum}/{language}/{groups}`, followed by
    /// `/{contentHash}` when the content hash is not empty.
    pub fn document_id(
        &self,
        page_id: u64,
        page_type: u32,
        language: u32,
        access_groups: &[u32],
        content_hash: &str,
    ) -> String {
        let mut id = format!(
            "{}/{}/{}/{}/{}/{}",
            self.site_hash,
            PAGE_DOCUMENT_TYPE,
            page_id,
            page_type,
            language,
            group_signature(access_groups)
        );
        if !content_hash.is_empty() {
            id.push('/');
            id.push_str(content_hash);
        }
        id
    }

    /// Build the document for `page`, visible to `access_groups`.
    pub fn build(&self, page: &PageRender, access_groups: &[u32]) -> PageDocument {
        let content_hash = validated_content_hash(page, &self.site.encryption_key);
        let extractor = ContentExtractor::new(&page.body);

        let mut document = PageDocument::new();
        document.set_field(
            "id",
            self.document_id(page.id, page.page_type, page.language, access_groups, &content_hash),
        );
        document.set_field("site", self.site.site_url.as_str());
        document.set_field("siteHash", self.site_hash.as_str());
        document.set_field("appKey", APP_KEY);
        document.set_field("type", PAGE_DOCUMENT_TYPE);
        document.set_field("contentHash", content_hash);

        document.set_field("uid", page.id);
        document.set_field("pid", page.parent_id);
        document.set_field("typeNum", page.page_type);
        document.set_field("created", page.created);
        document.set_field("changed", page.changed);
        document.set_field("language", page.language);
        document.set_field("access", access_field(access_groups));
        if let Some(endtime) = page.endtime.filter(|t| *t != 0) {
            document.set_field("endtime", endtime);
        }

        document.set_field("title", page.title.as_str());
        document.set_field("subTitle", page.subtitle.as_str());
        document.set_field("navTitle", page.nav_title.as_str());
        document.set_field("author", page.author.as_str());
        for keyword in split_keywords(&page.keywords) {
            document.add_field("keywords", keyword);
        }
        document.set_field("description", page.description.trim());
        document.set_field("abstract", page.abstract_text.trim());
        document.set_field("content", extractor.indexable_content());
        document.set_field("url", page.url.as_str());

        for (field, text) in extract_boost_fields(&extractor.marked_content()) {
            document.set_field(field, text);
        }

        document
    }
}

/// Split a comma-separated keyword list: trimmed, empty entries dropped,
/// duplicates removed in first-seen order.
fn split_keywords(raw: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !keywords.iter().any(|existing| existing == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::content_hash::compute_content_hash;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn builder() -> DocumentBuilder {
        DocumentBuilder::new(SiteIdentity::new("https://example.com/", "key"))
    }

    fn page() -> PageRender {
        PageRender {
            id: 5,
            parent_id: 1,
            title: "Home".to_string(),
            keywords: "news, events,,news , sports".to_string(),
            description: "  About us ".to_string(),
            body: "<h1>Welcome</h1><p>Body &amp; soul</p>".to_string(),
            url: "https://example.com/home".to_string(),
            created: 1_600_000_000,
            changed: 1_700_000_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_field_order_and_values() {
        let document = builder().build(&page(), &[3]);

        let names: Vec<&str> = document.field_names().collect();
        assert_eq!(
            names,
            vec![
                "id", "site", "siteHash", "appKey", "type", "contentHash", "uid", "pid",
                "typeNum", "created", "changed", "language", "access", "title", "subTitle",
                "navTitle", "author", "keywords", "description", "abstract", "content", "url",
                "tagsH1",
            ]
        );

        assert_eq!(document.get_str("access"), Some("c:3"));
        assert_eq!(document.get_str("type"), Some("pages"));
        assert_eq!(document.get_str("appKey"), Some("EXT:solr"));
        assert_eq!(document.get("uid"), Some(&json!(5)));
        assert_eq!(document.get("keywords"), Some(&json!(["news", "events", "sports"])));
        assert_eq!(document.get_str("description"), Some("About us"));
        assert_eq!(document.get_str("content"), Some("Welcome Body & soul"));
        assert_eq!(document.get_str("tagsH1"), Some(" Welcome"));
        assert!(document.validate().is_ok());
    }

    #[test]
    fn test_endtime_only_when_set() {
        let mut page = page();
        page.endtime = Some(0);
        assert!(!builder().build(&page, &[]).contains("endtime"));

        page.endtime = Some(1_800_000_000);
        assert_eq!(
            builder().build(&page, &[]).get("endtime"),
            Some(&json!(1_800_000_000))
        );
    }

    #[test]
    fn test_document_id() {
        let builder = builder();
        let site_hash = SiteIdentity::new("https://example.com/", "key").site_hash();

        assert_eq!(
            builder.document_id(5, 0, 1, &[2, 3], ""),
            format!("{}/pages/5/0/1/2,3", site_hash)
        );
        assert_eq!(
            builder.document_id(5, 0, 1, &[2, 3], "abc"),
            format!("{}/pages/5/0/1/2,3/abc", site_hash)
        );
        assert_ne!(
            builder.document_id(5, 0, 1, &[3], "abc"),
            builder.document_id(5, 0, 1, &[3], "abd")
        );
    }

    #[test]
    fn test_forged_content_hash_not_trusted() {
        let mut params = BTreeMap::new();
        params.insert("id".to_string(), "5".to_string());
        params.insert("tx_news".to_string(), "9".to_string());

        let mut page = page();
        page.request_parameters = params.clone();
        page.content_hash = "forged".to_string();

        let document = builder().build(&page, &[0]);
        assert_eq!(document.get_str("contentHash"), Some(""));
        assert!(document.id().is_some_and(|id| id.ends_with("/0")));

        page.content_hash = compute_content_hash(&params, "key");
        let document = builder().build(&page, &[0]);
        assert_eq!(document.get_str("contentHash"), Some(page.content_hash.as_str()));
        assert!(document.id().is_some_and(|id| id.ends_with(&page.content_hash)));
    }
}
