//! Field processing instructions.
//!
//! A field processor transforms one field across all documents of a page.
//! Instructions are looked up by name in a [`FieldProcessorRegistry`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use page_indexer_shared::PageDocument;
use serde_json::Value;
use tracing::debug;

use crate::errors::IndexingError;

/// Transforms a field on a set of documents.
pub trait FieldProcessor: Send + Sync {
    /// Process `field` on every document. Documents without the field are left alone.
    fn process(&self, field: &str, documents: &mut [PageDocument]) -> Result<(), IndexingError>;
}

/// Converts unix timestamps to `YYYY-MM-DDTHH:MM:SSZ`.
pub struct TimestampToIsoDate;

impl TimestampToIsoDate {
    fn convert(field: &str, value: &Value) -> Result<Value, IndexingError> {
        let seconds = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            IndexingError::invalid_result(
                "timestampToIsoDate",
                format!("field '{}' is not a timestamp: {}", field, value),
            )
        })?;

        let date = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            IndexingError::invalid_result(
                "timestampToIsoDate",
                format!("field '{}' timestamp {} is out of range", field, seconds),
            )
        })?;

        Ok(Value::String(date.format("%Y-%m-%dT%H:%M:%SZ").to_string()))
    }
}

impl FieldProcessor for TimestampToIsoDate {
    fn process(&self, field: &str, documents: &mut [PageDocument]) -> Result<(), IndexingError> {
        map_values(field, documents, Self::convert)
    }
}

/// Upper-cases string values.
pub struct Uppercase;

impl FieldProcessor for Uppercase {
    fn process(&self, field: &str, documents: &mut [PageDocument]) -> Result<(), IndexingError> {
        map_values(field, documents, |_, value| Ok(map_string(value, str::to_uppercase)))
    }
}

/// Lower-cases string values.
pub struct Lowercase;

impl FieldProcessor for Lowercase {
    fn process(&self, field: &str, documents: &mut [PageDocument]) -> Result<(), IndexingError> {
        map_values(field, documents, |_, value| Ok(map_string(value, str::to_lowercase)))
    }
}

fn map_string(value: &Value, f: fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

/// Apply `convert` to every value of `field`, element-wise for multi-valued fields.
///
/// All values are converted before any document is written, so a failing
/// value leaves every document untouched.
fn map_values<F>(
    field: &str,
    documents: &mut [PageDocument],
    convert: F,
) -> Result<(), IndexingError>
where
    F: Fn(&str, &Value) -> Result<Value, IndexingError>,
{
    let converted = documents
        .iter()
        .map(|document| {
            document
                .get(field)
                .map(|current| match current {
                    Value::Array(values) => values
                        .iter()
                        .map(|value| convert(field, value))
                        .collect::<Result<Vec<_>, _>>()
                        .map(Value::Array),
                    value => convert(field, value),
                })
                .transpose()
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (document, value) in documents.iter_mut().zip(converted) {
        if let (Some(value), Some(slot)) = (value, document.get_mut(field)) {
            *slot = value;
        }
    }
    Ok(())
}

/// Field processors by instruction name.
#[derive(Clone)]
pub struct FieldProcessorRegistry {
    processors: HashMap<String, Arc<dyn FieldProcessor>>,
}

impl Default for FieldProcessorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldProcessorRegistry {
    /// A registry with the built-in instructions `timestampToIsoDate`,
    /// `uppercase` and `lowercase`.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("timestampToIsoDate", Arc::new(TimestampToIsoDate));
        registry.register("uppercase", Arc::new(Uppercase));
        registry.register("lowercase", Arc::new(Lowercase));
        registry
    }

    /// A registry without any instructions.
    pub fn empty() -> Self {
        Self {
            processors: HashMap::new(),
        }
    }

    /// Register a processor under `instruction`, replacing any previous one.
    pub fn register(&mut self, instruction: impl Into<String>, processor: Arc<dyn FieldProcessor>) {
        self.processors.insert(instruction.into(), processor);
    }

    /// Returns true if a processor is registered under `instruction`.
    pub fn contains(&self, instruction: &str) -> bool {
        self.processors.contains_key(instruction)
    }

    /// Run the configured instructions in order.
    ///
    /// # Arguments
    ///
    /// * `instructions` - `(field, instruction)` pairs
    /// * `documents` - The documents to process
    ///
    /// # Returns
    ///
    /// Errors of unknown instructions and failed processors. A failing
    /// instruction does not stop the ones after it.
    pub fn apply(
        &self,
        instructions: &[(String, String)],
        documents: &mut [PageDocument],
    ) -> Vec<IndexingError> {
        let mut errors = Vec::new();

        for (field, instruction) in instructions {
            let Some(processor) = self.processors.get(instruction) else {
                errors.push(IndexingError::invalid_result(
                    format!("field processor '{}'", instruction),
                    format!("unknown instruction for field '{}'", field),
                ));
                continue;
            };

            match processor.process(field, documents) {
                Ok(()) => debug!(field = %field, instruction = %instruction, "Processed field"),
                Err(e) => errors.push(e),
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn documents() -> Vec<PageDocument> {
        let mut first = PageDocument::new();
        first.set_field("changed", 1_700_000_000);
        first.set_field("author", "Kim Lee");
        first.add_field("keywords", "News");
        first.add_field("keywords", "Events");

        let mut second = PageDocument::new();
        second.set_field("changed", "0");
        vec![first, second]
    }

    fn instructions(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(f, i)| (f.to_string(), i.to_string()))
            .collect()
    }

    #[test]
    fn test_builtin_instructions() {
        let mut docs = documents();
        let errors = FieldProcessorRegistry::new().apply(
            &instructions(&[
                ("changed", "timestampToIsoDate"),
                ("author", "uppercase"),
                ("keywords", "lowercase"),
            ]),
            &mut docs,
        );

        assert!(errors.is_empty());
        assert_eq!(docs[0].get_str("changed"), Some("2023-11-14T22:13:20Z"));
        assert_eq!(docs[1].get_str("changed"), Some("1970-01-01T00:00:00Z"));
        assert_eq!(docs[0].get_str("author"), Some("KIM LEE"));
        assert_eq!(docs[0].get("keywords"), Some(&json!(["news", "events"])));
        assert!(!docs[1].contains("author"));
    }

    #[test]
    fn test_unknown_instruction_does_not_stop_others() {
        let mut docs = documents();
        let errors = FieldProcessorRegistry::new().apply(
            &instructions(&[("author", "reverse"), ("author", "lowercase")]),
            &mut docs,
        );

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], IndexingError::InvalidCollaboratorResult { .. }));
        assert_eq!(docs[0].get_str("author"), Some("kim lee"));
    }

    #[test]
    fn test_invalid_timestamp() {
        let mut docs = documents();
        let errors = FieldProcessorRegistry::new()
            .apply(&instructions(&[("author", "timestampToIsoDate")]), &mut docs);

        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_failed_conversion_leaves_all_documents_unchanged() {
        let mut first = PageDocument::new();
        first.set_field("changed", 86400);
        let mut second = PageDocument::new();
        second.set_field("changed", "n/a");
        let mut docs = vec![first, second];

        let errors = FieldProcessorRegistry::new()
            .apply(&instructions(&[("changed", "timestampToIsoDate")]), &mut docs);

        assert_eq!(errors.len(), 1);
        assert_eq!(docs[0].get("changed"), Some(&json!(86400)));
        assert_eq!(docs[1].get_str("changed"), Some("n/a"));
    }

    struct Prefix;

    impl FieldProcessor for Prefix {
        fn process(
            &self,
            field: &str,
            documents: &mut [PageDocument],
        ) -> Result<(), IndexingError> {
            for document in documents.iter_mut() {
                let current = document.get_str(field).unwrap_or_default().to_string();
                document.set_field(field, format!("pre-{}", current));
            }
            Ok(())
        }
    }

    #[test]
    fn test_custom_processor() {
        let mut registry = FieldProcessorRegistry::empty();
        assert!(!registry.contains("prefix"));
        registry.register("prefix", Arc::new(Prefix));

        let mut docs = documents();
        let errors = registry.apply(&instructions(&[("author", "prefix")]), &mut docs);

        assert!(errors.is_empty());
        assert_eq!(docs[0].get_str("author"), Some("pre-Kim Lee"));
        assert_eq!(docs[1].get_str("author"), Some("pre-"));
    }
}
