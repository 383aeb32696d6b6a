//! Identity of the installation that owns the indexed documents.

use sha2::{Digest, Sha256};

/// The owning installation's base URL and secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteIdentity {
    /// Base URL of the site, stored in every document's `site` field.
    pub site_url: String,
    /// Installation secret used for the site hash and content hash validation.
    pub encryption_key: String,
}

impl SiteIdentity {
    /// Create a new site identity.
    pub fn new(site_url: impl Into<String>, encryption_key: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            encryption_key: encryption_key.into(),
        }
    }

    /// Hex SHA-256 of `site_url + "/" + encryption_key`.
    ///
    /// Scopes queries to documents of this installation without exposing the key.
    pub fn site_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.site_url.as_bytes());
        hasher.update(b"/");
        hasher.update(self.encryption_key.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_hash_is_stable_hex() {
        let site = SiteIdentity::new("https://example.com/", "secret");
        let hash = site.site_hash();

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, site.site_hash());
    }

    #[test]
    fn test_site_hash_depends_on_key() {
        let a = SiteIdentity::new("https://example.com/", "one");
        let b = SiteIdentity::new("https://example.com/", "two");
        assert_ne!(a.site_hash(), b.site_hash());
    }
}
