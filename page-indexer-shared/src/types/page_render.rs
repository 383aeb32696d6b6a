//! Page render types.
//!
//! A page render is the immutable snapshot of one generated page that the
//! indexer turns into documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One page in the ancestor chain of a rendered page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AncestorPage {
    /// The ancestor's page id.
    pub uid: u64,
    /// Raw visitor-group restriction, a comma-separated list of group ids.
    #[serde(default)]
    pub fe_group: String,
    /// Whether the restriction applies to all subpages.
    #[serde(default)]
    pub extend_to_subpages: bool,
}

/// A rendered content page.
///
/// Holds the identifiers, content fields, cache parameters and access
/// configuration of one page variant (language, page type and cache
/// parameter combination).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRender {
    /// Page id.
    pub id: u64,
    /// Page type / variant number.
    pub page_type: u32,
    /// Language the page is attributed to.
    pub language: u32,
    /// Language of the content that was actually rendered.
    pub content_language: u32,
    /// Parent page id.
    pub parent_id: u64,

    pub title: String,
    pub subtitle: String,
    pub nav_title: String,
    pub author: String,
    /// Comma-separated keyword list.
    pub keywords: String,
    pub description: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Rendered body markup.
    pub body: String,
    /// Absolute URL the page was requested with.
    pub url: String,

    /// Content hash claimed by the request.
    pub content_hash: String,
    /// Query parameters of the request, used to recompute the content hash.
    pub request_parameters: BTreeMap<String, String>,
    /// The page disables search indexing.
    pub no_search: bool,
    /// The page was rendered in non-cacheable mode.
    pub no_cache: bool,

    /// Creation timestamp (unix seconds).
    pub created: i64,
    /// Last change timestamp (unix seconds).
    pub changed: i64,
    /// Optional expiry timestamp (unix seconds).
    pub endtime: Option<i64>,

    /// Raw visitor-group restriction configured on the page itself.
    pub fe_group: String,
    /// Ancestor chain from the site root down to this page.
    pub ancestors: Vec<AncestorPage>,
}

impl PageRender {
    /// Look up a page property by its document-facing name.
    ///
    /// Used to substitute page values into configured fields.
    pub fn property(&self, name: &str) -> Option<String> {
        let value = match name {
            "uid" | "id" => self.id.to_string(),
            "pid" => self.parent_id.to_string(),
            "typeNum" => self.page_type.to_string(),
            "language" => self.language.to_string(),
            "title" => self.title.clone(),
            "subTitle" | "subtitle" => self.subtitle.clone(),
            "navTitle" => self.nav_title.clone(),
            "author" => self.author.clone(),
            "keywords" => self.keywords.clone(),
            "description" => self.description.clone(),
            "abstract" => self.abstract_text.clone(),
            "url" => self.url.clone(),
            "created" => self.created.to_string(),
            "changed" => self.changed.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let json = r#"{
            "id": 5,
            "pageType": 0,
            "title": "Home",
            "abstract": "Short",
            "feGroup": "2,3",
            "requestParameters": {"id": "5"},
            "ancestors": [{"uid": 1, "feGroup": "4", "extendToSubpages": true}]
        }"#;

        let page: PageRender = serde_json::from_str(json).unwrap();

        assert_eq!(page.id, 5);
        assert_eq!(page.title, "Home");
        assert_eq!(page.abstract_text, "Short");
        assert_eq!(page.fe_group, "2,3");
        assert!(!page.no_search);
        assert!(page.endtime.is_none());
        assert_eq!(page.ancestors.len(), 1);
        assert!(page.ancestors[0].extend_to_subpages);
        assert_eq!(page.request_parameters.get("id").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_property_lookup() {
        let page = PageRender {
            id: 7,
            title: "About".to_string(),
            author: "Jane".to_string(),
            ..Default::default()
        };

        assert_eq!(page.property("uid").as_deref(), Some("7"));
        assert_eq!(page.property("title").as_deref(), Some("About"));
        assert_eq!(page.property("author").as_deref(), Some("Jane"));
        assert!(page.property("unknown").is_none());
    }
}
