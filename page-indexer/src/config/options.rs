//! Installation-wide indexer options.
//!
//! Options arrive as a JSON object. Keys may be nested
//! (`{"index": {"enablePageIndexing": true}}`) or flat dotted
//! (`{"index.enablePageIndexing": true}`).

use std::path::Path;

use serde_json::{Map, Value};

use crate::errors::IndexingError;

/// Parsed indexer options.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexerOptions {
    /// Installation-level indexing switch (`config.indexEnable`). Only an
    /// explicit false value turns it off.
    pub index_enable: bool,
    /// Index pages on normal renders (`index.enablePageIndexing`).
    pub page_indexing: bool,
    /// Index pages rendered by the crawl worker (`index.enableCrawlerIndexing`).
    pub crawler_indexing: bool,
    /// Index even while a backend session is active (`index.enableIndexingWhileLoggedIn`).
    pub indexing_while_logged_in: bool,
    /// Field name to literal value or render directive (`index.additionalFields`).
    pub additional_fields: Map<String, Value>,
    /// Field name to processing instruction name, in configuration order
    /// (`index.fieldProcessingInstructions`).
    pub field_processing_instructions: Vec<(String, String)>,
    /// Log caught errors with their full debug representation (`logging.exceptions`).
    pub log_exceptions: bool,
    /// Log submitted document payloads (`logging.indexing`).
    pub log_indexing: bool,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self {
            index_enable: true,
            page_indexing: false,
            crawler_indexing: false,
            indexing_while_logged_in: false,
            additional_fields: Map::new(),
            field_processing_instructions: Vec::new(),
            log_exceptions: false,
            log_indexing: false,
        }
    }
}

impl IndexerOptions {
    /// Parse options from a JSON value.
    ///
    /// # Arguments
    ///
    /// * `raw` - The options object
    ///
    /// # Returns
    ///
    /// * `Ok(IndexerOptions)` - The parsed options
    /// * `Err(IndexingError)` - If the value is not an object or a map-valued key holds something else
    pub fn from_value(raw: &Value) -> Result<Self, IndexingError> {
        if !raw.is_object() {
            return Err(IndexingError::config("Indexer options must be a JSON object"));
        }

        let additional_fields = match lookup(raw, "index.additionalFields") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(IndexingError::config(
                    "index.additionalFields must be an object",
                ))
            }
        };

        let field_processing_instructions = match lookup(raw, "index.fieldProcessingInstructions")
        {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(field, instruction)| match instruction.as_str() {
                    Some(name) => Ok((field.clone(), name.to_string())),
                    None => Err(IndexingError::config(format!(
                        "Processing instruction for field '{}' must be a string",
                        field
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(IndexingError::config(
                    "index.fieldProcessingInstructions must be an object",
                ))
            }
        };

        Ok(Self {
            index_enable: lookup(raw, "config.indexEnable").map_or(true, flag_value),
            page_indexing: flag(raw, "index.enablePageIndexing"),
            crawler_indexing: flag(raw, "index.enableCrawlerIndexing"),
            indexing_while_logged_in: flag(raw, "index.enableIndexingWhileLoggedIn"),
            additional_fields,
            field_processing_instructions,
            log_exceptions: flag(raw, "logging.exceptions"),
            log_indexing: flag(raw, "logging.indexing"),
        })
    }

    /// Read and parse options from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, IndexingError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IndexingError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let raw: Value = serde_json::from_str(&contents).map_err(|e| {
            IndexingError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Self::from_value(&raw)
    }
}

/// Look up a dotted key, trying the flat form first and then the nested path.
fn lookup<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    if let Some(value) = raw.get(key) {
        return Some(value);
    }

    let mut current = raw;
    for segment in key.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Read a boolean switch. Accepts booleans, numbers (non-zero is true) and
/// the strings "1" and "true".
fn flag(raw: &Value, key: &str) -> bool {
    lookup(raw, key).is_some_and(flag_value)
}

fn flag_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}
