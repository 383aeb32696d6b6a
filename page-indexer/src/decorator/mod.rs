//! Field decoration pipeline.
//!
//! Adds configured fields to every document of a page and runs the
//! configured field processing instructions afterwards.

mod processors;
mod renderer;

use std::sync::Arc;

use page_indexer_shared::{PageDocument, PageRender};
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use unicode_normalization::UnicodeNormalization;

use crate::errors::IndexingError;

pub use processors::{FieldProcessor, FieldProcessorRegistry};
pub use renderer::{ContentRenderer, PageFieldRenderer};

/// Field name suffixes of string and text typed fields.
pub const TYPED_FIELD_SUFFIXES: [&str; 5] =
    ["_stringS", "_textS", "_textTS", "_textSortS", "_textWstS"];

/// Returns true if the field name carries a string or text type suffix.
pub fn is_typed_text_field(field: &str) -> bool {
    TYPED_FIELD_SUFFIXES
        .iter()
        .any(|suffix| field.ends_with(suffix))
}

/// Normalize text for string and text typed fields: NFC composition,
/// control characters other than tab and newline removed.
pub fn normalize_text(text: &str) -> String {
    text.nfc()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn normalize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_text(&s)),
        Value::Array(values) => Value::Array(values.into_iter().map(normalize_value).collect()),
        other => other,
    }
}

/// Applies configured additional fields to documents.
///
/// Literal entries are stored as configured. Object entries are directives
/// rendered by the [`ContentRenderer`]. Fields are set, not appended, so
/// decorating twice yields the same document.
pub struct FieldDecorator {
    renderer: Arc<dyn ContentRenderer>,
}

impl Default for FieldDecorator {
    fn default() -> Self {
        Self::new(Arc::new(PageFieldRenderer))
    }
}

impl FieldDecorator {
    /// Create a decorator that renders directives with `renderer`.
    pub fn new(renderer: Arc<dyn ContentRenderer>) -> Self {
        Self { renderer }
    }

    /// Apply `additional_fields` to every document.
    ///
    /// # Arguments
    ///
    /// * `documents` - The documents to decorate
    /// * `additional_fields` - Field name to literal value or render directive
    /// * `page` - The page the documents were built from
    ///
    /// # Returns
    ///
    /// Errors of directives that could not be rendered. Their fields are
    /// skipped; all other fields are still applied.
    #[instrument(skip_all, fields(field_count = additional_fields.len()))]
    pub fn decorate(
        &self,
        documents: &mut [PageDocument],
        additional_fields: &Map<String, Value>,
        page: &PageRender,
    ) -> Vec<IndexingError> {
        let mut errors = Vec::new();

        for (field, configured) in additional_fields {
            let value = match configured {
                Value::Null => continue,
                Value::Object(_) => match self.renderer.render(field, configured, page) {
                    Ok(rendered) => Value::String(rendered),
                    Err(e) => {
                        errors.push(e);
                        continue;
                    }
                },
                literal => literal.clone(),
            };

            let value = if is_typed_text_field(field) {
                normalize_value(value)
            } else {
                value
            };

            for document in documents.iter_mut() {
                document.set_field(field.as_str(), value.clone());
            }
        }

        debug!(
            document_count = documents.len(),
            error_count = errors.len(),
            "Decorated documents"
        );
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> PageRender {
        PageRender {
            id: 3,
            title: "Cafe\u{301}".to_string(),
            author: "Kim".to_string(),
            ..Default::default()
        }
    }

    fn config(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_literals_and_directives() {
        let mut documents = vec![PageDocument::new(), PageDocument::new()];
        let fields = config(json!({
            "category_stringS": "News",
            "priority_intS": 3,
            "byline_textS": { "value": "{title} by {author}" },
            "skipped": null
        }));

        let errors = FieldDecorator::default().decorate(&mut documents, &fields, &page());

        assert!(errors.is_empty());
        for document in &documents {
            assert_eq!(document.get_str("category_stringS"), Some("News"));
            assert_eq!(document.get("priority_intS"), Some(&json!(3)));
            assert_eq!(document.get_str("byline_textS"), Some("Caf\u{e9} by Kim"));
            assert!(!document.contains("skipped"));
        }
    }

    #[test]
    fn test_untyped_fields_stored_as_is() {
        let mut documents = vec![PageDocument::new()];
        let fields = config(json!({ "raw": { "field": "title" }, "raw_textS": { "field": "title" } }));

        FieldDecorator::default().decorate(&mut documents, &fields, &page());

        assert_eq!(documents[0].get_str("raw"), Some("Cafe\u{301}"));
        assert_eq!(documents[0].get_str("raw_textS"), Some("Caf\u{e9}"));
    }

    #[test]
    fn test_idempotent() {
        let fields = config(json!({
            "a_stringS": "x\u{7}y",
            "b": { "value": "{uid}" },
            "c": ["one", "two"]
        }));
        let decorator = FieldDecorator::default();

        let mut once = vec![PageDocument::new()];
        decorator.decorate(&mut once, &fields, &page());

        let mut twice = vec![PageDocument::new()];
        decorator.decorate(&mut twice, &fields, &page());
        decorator.decorate(&mut twice, &fields, &page());

        assert_eq!(once, twice);
        assert_eq!(once[0].get_str("a_stringS"), Some("xy"));
        assert_eq!(once[0].get_str("b"), Some("3"));
    }

    #[test]
    fn test_render_errors_skip_field() {
        let mut documents = vec![PageDocument::new()];
        let fields = config(json!({ "bad": { "unknown": true }, "good": "ok" }));

        let errors = FieldDecorator::default().decorate(&mut documents, &fields, &page());

        assert_eq!(errors.len(), 1);
        assert!(!documents[0].contains("bad"));
        assert_eq!(documents[0].get_str("good"), Some("ok"));
    }

    #[test]
    fn test_typed_suffixes() {
        assert!(is_typed_text_field("title_stringS"));
        assert!(is_typed_text_field("body_textWstS"));
        assert!(!is_typed_text_field("count_intS"));
        assert!(!is_typed_text_field("stringS"));
    }
}
