//! Page document types for the search index.
//!
//! This module defines the document structure that is indexed in the search engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields every document must carry before it may be submitted.
pub const REQUIRED_FIELDS: [&str; 4] = ["id", "site", "siteHash", "type"];

/// Document representation for the search index.
///
/// A document is an ordered mapping of field name to value. Single-valued
/// fields hold a scalar JSON value; multi-valued fields (keywords, for
/// instance) hold a JSON array. Field order is insertion order and survives
/// serialization.
///
/// # Example
///
/// ```
/// use page_indexer_shared::PageDocument;
///
/// let mut doc = PageDocument::new();
/// doc.set_field("title", "Welcome");
/// doc.add_field("keywords", "news");
/// doc.add_field("keywords", "events");
///
/// assert_eq!(doc.get_str("title"), Some("Welcome"));
/// assert_eq!(doc.get("keywords").and_then(|v| v.as_array()).map(Vec::len), Some(2));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PageDocument {
    fields: Map<String, Value>,
}

impl PageDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Set a field, replacing any previous value.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Add a value to a field.
    ///
    /// The first value is stored as a scalar. Adding a second value turns
    /// the field into a multi-valued array.
    pub fn add_field(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();

        match self.fields.get_mut(&name) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }

    /// Get the raw value of a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a mutable reference to the raw value of a field.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Get a field as a string slice, if it is a single string value.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    /// Returns true if the document has the given field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The document's unique identifier, if set.
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Check that the document carries every required field with a
    /// non-empty value.
    ///
    /// Returns the name of the first missing field on failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        for field in REQUIRED_FIELDS {
            let present = match self.fields.get(field) {
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Null) | None => false,
                Some(_) => true,
            };
            if !present {
                return Err(field);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> PageDocument {
        let mut doc = PageDocument::new();
        doc.set_field("id", "abc/pages/1/0/0/0");
        doc.set_field("site", "https://example.com/");
        doc.set_field("siteHash", "abc");
        doc.set_field("type", "pages");
        doc
    }

    #[test]
    fn test_add_field_becomes_multi_valued() {
        let mut doc = PageDocument::new();
        doc.add_field("keywords", "a");
        assert_eq!(doc.get("keywords"), Some(&json!("a")));

        doc.add_field("keywords", "b");
        doc.add_field("keywords", "c");
        assert_eq!(doc.get("keywords"), Some(&json!(["a", "b", "c"])));
    }

    #[test]
    fn test_set_field_overwrites() {
        let mut doc = PageDocument::new();
        doc.set_field("title", "first");
        doc.set_field("title", "second");
        assert_eq!(doc.get_str("title"), Some("second"));
        assert_eq!(doc.field_names().count(), 1);
    }

    #[test]
    fn test_field_order_is_preserved() {
        let mut doc = PageDocument::new();
        doc.set_field("id", "1");
        doc.set_field("site", "s");
        doc.set_field("abstract", "a");
        let names: Vec<&str> = doc.field_names().collect();
        assert_eq!(names, vec!["id", "site", "abstract"]);

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"id":"1","site":"s","abstract":"a"}"#);
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut doc = PageDocument::new();
        doc.set_field("a", 1);
        doc.set_field("b", 2);
        doc.set_field("c", 3);
        assert_eq!(doc.remove("b"), Some(json!(2)));
        let names: Vec<&str> = doc.field_names().collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_validate() {
        assert!(valid_document().validate().is_ok());

        let mut doc = valid_document();
        doc.set_field("siteHash", "");
        assert_eq!(doc.validate(), Err("siteHash"));

        let mut doc = valid_document();
        doc.remove("id");
        assert_eq!(doc.validate(), Err("id"));
    }

    #[test]
    fn test_serialization() {
        let mut doc = valid_document();
        doc.add_field("keywords", "x");
        doc.add_field("keywords", "y");

        let json = serde_json::to_string(&doc).unwrap();
        let deserialized: PageDocument = serde_json::from_str(&json).unwrap();

        assert_eq!(doc, deserialized);
        assert_eq!(deserialized.id(), Some("abc/pages/1/0/0/0"));
    }
}
