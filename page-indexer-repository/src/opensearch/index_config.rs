//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the page search index.

use serde_json::{json, Value};

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The alias name for the search index (used for all operations).
    pub alias: String,
    /// The version number for the index (e.g., 0 for "pages_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version` - The version number
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }
}

/// The base name of the search index (without version).
pub const INDEX_NAME: &str = "pages";

/// Get the versioned index name.
///
/// # Arguments
///
/// * `version` - The version number (defaults to 0 if None)
///
/// # Returns
///
/// The versioned index name (e.g., "pages_v0")
pub fn get_versioned_index_name(version: Option<u32>) -> String {
    let v = version.unwrap_or(0);
    format!("{}_v{}", INDEX_NAME, v)
}

/// Get the index settings and mappings for the page search index.
///
/// The configuration includes:
/// - **Keyword fields**: identifiers, access rules and hashes used for filtering
/// - **Text fields**: page content and the tag-boost fields
/// - **Dynamic templates**: typed handling of configured additional fields by suffix
///
/// # Arguments
///
/// * `version` - Optional version number (currently unused)
pub fn get_index_settings(_version: Option<u32>) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic_templates": [
                { "strings": { "match": "*_stringS", "mapping": { "type": "keyword" } } },
                { "texts": { "match": "*_textS", "mapping": { "type": "text" } } },
                { "text_tokens": { "match": "*_textTS", "mapping": { "type": "text" } } },
                { "text_sort": { "match": "*_textSortS", "mapping": { "type": "text", "fields": { "sort": { "type": "keyword" } } } } },
                { "text_whitespace": { "match": "*_textWstS", "mapping": { "type": "text", "analyzer": "whitespace" } } }
            ],
            "properties": {
                "id": { "type": "keyword" },
                "site": { "type": "keyword" },
                "siteHash": { "type": "keyword" },
                "appKey": { "type": "keyword" },
                "type": { "type": "keyword" },
                "contentHash": { "type": "keyword" },
                "uid": { "type": "long" },
                "pid": { "type": "long" },
                "typeNum": { "type": "integer" },
                "created": { "type": "date", "format": "epoch_second||strict_date_optional_time" },
                "changed": { "type": "date", "format": "epoch_second||strict_date_optional_time" },
                "endtime": { "type": "date", "format": "epoch_second||strict_date_optional_time" },
                "language": { "type": "integer" },
                "access": { "type": "keyword" },
                "title": {
                    "type": "text",
                    "fields": { "raw": { "type": "keyword" } }
                },
                "subTitle": { "type": "text" },
                "navTitle": { "type": "text" },
                "author": { "type": "text" },
                "keywords": { "type": "keyword" },
                "description": { "type": "text" },
                "abstract": { "type": "text" },
                "content": { "type": "text" },
                "url": { "type": "keyword", "index": false },
                "tagsH1": { "type": "text" },
                "tagsH2H3": { "type": "text" },
                "tagsH4H5H6": { "type": "text" },
                "tagsInline": { "type": "text" },
                "tagsA": { "type": "text" }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_settings_structure() {
        let settings = get_index_settings(None);

        assert!(settings["settings"]["number_of_shards"].is_number());
        assert!(settings["settings"]["number_of_replicas"].is_number());

        let properties = &settings["mappings"]["properties"];
        assert_eq!(properties["id"]["type"], "keyword");
        assert_eq!(properties["access"]["type"], "keyword");
        assert_eq!(properties["content"]["type"], "text");

        for field in ["tagsH1", "tagsH2H3", "tagsH4H5H6", "tagsInline", "tagsA"] {
            assert_eq!(properties[field]["type"], "text", "field {}", field);
        }

        assert_eq!(
            settings["mappings"]["dynamic_templates"]
                .as_array()
                .map(Vec::len),
            Some(5)
        );
    }

    #[test]
    fn test_index_name() {
        assert_eq!(INDEX_NAME, "pages");
    }

    #[test]
    fn test_versioned_index_name() {
        assert_eq!(get_versioned_index_name(None), "pages_v0");
        assert_eq!(get_versioned_index_name(Some(0)), "pages_v0");
        assert_eq!(get_versioned_index_name(Some(3)), "pages_v3");
    }
}
