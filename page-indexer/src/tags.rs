//! Tag-boost extraction.
//!
//! Collects the text of headings, inline emphasis and links from rendered
//! markup into boost fields. Best effort: markup is scanned with regular
//! expressions, not parsed.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Boost fields in document order.
pub const BOOST_FIELDS: [&str; 5] = ["tagsH1", "tagsH2H3", "tagsH4H5H6", "tagsInline", "tagsA"];

/// Tag to boost field mapping.
const TAG_MAPPING: [(&str, &str); 12] = [
    ("h1", "tagsH1"),
    ("h2", "tagsH2H3"),
    ("h3", "tagsH2H3"),
    ("h4", "tagsH4H5H6"),
    ("h5", "tagsH4H5H6"),
    ("h6", "tagsH4H5H6"),
    ("u", "tagsInline"),
    ("b", "tagsInline"),
    ("strong", "tagsInline"),
    ("i", "tagsInline"),
    ("em", "tagsInline"),
    ("a", "tagsA"),
];

lazy_static! {
    static ref COMMENT_REGEXP: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref ANY_TAG_REGEXP: Regex =
        Regex::new(r"(?s)</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap();
    static ref OPEN_TAG_REGEXP: Regex =
        Regex::new(r"(?i)<(h[1-6]|u|b|strong|i|em|a)(?:\s[^>]*)?>").unwrap();
    static ref CLOSE_TAG_REGEXPS: HashMap<&'static str, Regex> = TAG_MAPPING
        .iter()
        .map(|(tag, _)| (*tag, Regex::new(&format!(r"(?i)</{}\s*>", tag)).unwrap()))
        .collect();
    static ref URL_TEXT_REGEXP: Regex = Regex::new(
        r"(?i)(?:http://|https://|ftp://|mailto:|smb://|afp://|file://|gopher://|news://|ssl://|sslv2://|sslv3://|tls://|tcp://|udp://|www\.)[a-z0-9]+"
    )
    .unwrap();
}

fn boost_field(tag: &str) -> Option<&'static str> {
    TAG_MAPPING
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, field)| *field)
}

/// Remove comments and every tag that has no boost field.
fn strip_unmapped_tags(markup: &str) -> String {
    let without_comments = COMMENT_REGEXP.replace_all(markup, "");
    ANY_TAG_REGEXP
        .replace_all(&without_comments, |caps: &Captures| {
            if boost_field(&caps[1].to_ascii_lowercase()).is_some() {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// Extract boost field text from markup.
///
/// Every `<tag ...>text</tag>` occurrence of a mapped tag appends
/// `" " + text` to the tag's boost field, matching the closing tag
/// non-greedily. Anchors whose text looks like a URL are skipped. Markup
/// nested inside a matched element is removed from the extracted text.
///
/// # Returns
///
/// `(field, text)` pairs in [`BOOST_FIELDS`] order, only for fields that
/// received text.
pub fn extract_boost_fields(markup: &str) -> Vec<(&'static str, String)> {
    let content = strip_unmapped_tags(markup);
    let mut collected: HashMap<&'static str, String> = HashMap::new();

    let mut position = 0;
    while let Some(open) = OPEN_TAG_REGEXP.captures_at(&content, position) {
        let whole = match open.get(0) {
            Some(m) => m,
            None => break,
        };
        let tag = open[1].to_ascii_lowercase();
        let (Some(field), Some(close_regexp)) =
            (boost_field(&tag), CLOSE_TAG_REGEXPS.get(tag.as_str()))
        else {
            position = whole.end();
            continue;
        };

        let Some(close) = close_regexp.find_at(&content, whole.end()) else {
            // Unclosed; keep scanning after the opening tag.
            position = whole.end();
            continue;
        };

        let inner = &content[whole.end()..close.start()];
        position = close.end();

        if tag == "a" && URL_TEXT_REGEXP.is_match(inner) {
            continue;
        }

        let text = ANY_TAG_REGEXP.replace_all(inner, "");
        let entry = collected.entry(field).or_default();
        entry.push(' ');
        entry.push_str(&text);
    }

    BOOST_FIELDS
        .iter()
        .filter_map(|field| collected.remove(field).map(|text| (*field, text)))
        .collect()
}
