//! Rendering of dynamic field directives.

use lazy_static::lazy_static;
use page_indexer_shared::PageRender;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::errors::IndexingError;

lazy_static! {
    static ref PLACEHOLDER_REGEXP: Regex = Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").unwrap();
}

/// Computes a field value from a directive and the page render.
pub trait ContentRenderer: Send + Sync {
    /// Render the directive configured for `field`.
    fn render(
        &self,
        field: &str,
        directive: &Value,
        page: &PageRender,
    ) -> Result<String, IndexingError>;
}

/// Renders directives from page properties.
///
/// Understands `{"field": "title"}`, which copies one page property, and
/// `{"value": "{title} - {author}"}`, a template whose placeholders are
/// replaced by page properties. Unknown placeholders are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageFieldRenderer;

impl ContentRenderer for PageFieldRenderer {
    fn render(
        &self,
        field: &str,
        directive: &Value,
        page: &PageRender,
    ) -> Result<String, IndexingError> {
        let collaborator = format!("renderer for field '{}'", field);

        if let Some(property) = directive.get("field") {
            let name = property.as_str().ok_or_else(|| {
                IndexingError::invalid_result(&collaborator, "'field' must be a string")
            })?;
            return page.property(name).ok_or_else(|| {
                IndexingError::invalid_result(
                    &collaborator,
                    format!("unknown page property '{}'", name),
                )
            });
        }

        if let Some(template) = directive.get("value") {
            let template = template.as_str().ok_or_else(|| {
                IndexingError::invalid_result(&collaborator, "'value' must be a string")
            })?;
            let rendered = PLACEHOLDER_REGEXP.replace_all(template, |caps: &Captures| {
                page.property(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            });
            return Ok(rendered.into_owned());
        }

        Err(IndexingError::invalid_result(
            &collaborator,
            "directive needs a 'field' or 'value' entry",
        ))
    }
}
