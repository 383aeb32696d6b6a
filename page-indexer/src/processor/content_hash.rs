//! Content hash validation.
//!
//! The content hash distinguishes cacheable variants of the same page. A
//! request may claim any hash, so the claim is only trusted when it equals
//! the hash recomputed from the request's cache-relevant parameters.

use std::collections::BTreeMap;

use page_indexer_shared::PageRender;
use sha2::{Digest, Sha256};

/// Request parameter carrying the claimed content hash itself.
const HASH_PARAMETER: &str = "cHash";

/// Compute the content hash of a parameter set.
///
/// Parameters other than `cHash` are serialised as `key=value` pairs joined
/// by `&` in key order and hashed together with the encryption key. A
/// request without cache-relevant parameters has the empty hash.
pub fn compute_content_hash(parameters: &BTreeMap<String, String>, encryption_key: &str) -> String {
    let relevant: Vec<String> = parameters
        .iter()
        .filter(|(key, _)| key.as_str() != HASH_PARAMETER)
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    if relevant.is_empty() {
        return String::new();
    }

    let mut hasher = Sha256::new();
    hasher.update(encryption_key.as_bytes());
    hasher.update(relevant.join("&").as_bytes());
    hex::encode(hasher.finalize())
}

/// The page's content hash if it matches the recomputed one, otherwise the empty string.
pub fn validated_content_hash(page: &PageRender, encryption_key: &str) -> String {
    let expected = compute_content_hash(&page.request_parameters, encryption_key);
    if !expected.is_empty() && page.content_hash == expected {
        expected
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parameters(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_hash_ignores_order_and_chash() {
        let a = compute_content_hash(&parameters(&[("id", "5"), ("L", "1")]), "key");
        let b = compute_content_hash(
            &parameters(&[("L", "1"), ("cHash", "whatever"), ("id", "5")]),
            "key",
        );

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_parameters_means_empty_hash() {
        assert_eq!(compute_content_hash(&BTreeMap::new(), "key"), "");
        assert_eq!(compute_content_hash(&parameters(&[("cHash", "x")]), "key"), "");
    }

    #[test]
    fn test_validated_hash() {
        let params = parameters(&[("id", "5"), ("tx_news", "3")]);
        let expected = compute_content_hash(&params, "key");

        let mut page = PageRender {
            request_parameters: params,
            content_hash: expected.clone(),
            ..Default::default()
        };
        assert_eq!(validated_content_hash(&page, "key"), expected);

        page.content_hash = "forged".to_string();
        assert_eq!(validated_content_hash(&page, "key"), "");

        page.content_hash = expected;
        assert_eq!(validated_content_hash(&page, "other-key"), "");
    }
}
