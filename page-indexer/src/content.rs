//! Content extraction from rendered page markup.

use scraper::{Html, Node};

/// Marks the start of a region that should be indexed.
pub const SEARCH_BEGIN_MARKER: &str = "<!--TYPO3SEARCH_begin-->";
/// Marks the end of a region that should be indexed.
pub const SEARCH_END_MARKER: &str = "<!--TYPO3SEARCH_end-->";

/// Elements whose text is never indexed.
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Extracts indexable content from a page body.
#[derive(Debug, Clone, Copy)]
pub struct ContentExtractor<'a> {
    body: &'a str,
}

impl<'a> ContentExtractor<'a> {
    pub fn new(body: &'a str) -> Self {
        Self { body }
    }

    /// Markup inside the search markers, concatenated. The whole body when
    /// no markers are present.
    pub fn marked_content(&self) -> String {
        if !self.body.contains(SEARCH_BEGIN_MARKER) {
            return self.body.to_string();
        }

        let mut marked = String::new();
        for (index, section) in self.body.split(SEARCH_BEGIN_MARKER).enumerate() {
            if index == 0 {
                continue;
            }
            let region = section
                .split_once(SEARCH_END_MARKER)
                .map_or(section, |(inside, _)| inside);
            marked.push_str(region);
            marked.push(' ');
        }
        marked
    }

    /// Plain text of the marked content: scripts, styles and comments
    /// dropped, entities decoded, whitespace collapsed.
    pub fn indexable_content(&self) -> String {
        let fragment = Html::parse_fragment(&self.marked_content());

        let mut text = String::new();
        for node in fragment.tree.root().descendants() {
            let Node::Text(content) = node.value() else {
                continue;
            };
            let skipped = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| SKIPPED_ELEMENTS.contains(&element.name()))
            });
            if !skipped {
                text.push_str(content);
                text.push(' ');
            }
        }

        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
