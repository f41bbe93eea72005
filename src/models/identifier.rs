//! Document identifiers and URL list parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Normalized key for a tracked document, derived from its source URL.
///
/// Two raw inputs that normalize to the same string are the same document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Normalize a raw identifier.
    ///
    /// Surrounding whitespace is trimmed, a protocol-relative `//host/...`
    /// prefix gets an `https:` scheme, and anything that parses as a URL is
    /// re-serialized so scheme/host case and escaping are canonical.
    /// Returns `None` for input that is empty after trimming.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let with_scheme = match trimmed.strip_prefix("//") {
            Some(rest) if !rest.is_empty() => format!("https://{}", rest),
            Some(_) => return None,
            None => trimmed.to_string(),
        };

        let canonical = match Url::parse(&with_scheme) {
            Ok(url) if url.has_host() => url.to_string(),
            _ => with_scheme,
        };

        Some(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split raw textarea input into candidate URLs.
///
/// Commas and line breaks both separate entries. Entries are trimmed and
/// empty ones dropped; input order is preserved and duplicates are kept.
pub fn split_url_list(raw: &str) -> Vec<String> {
    raw.split([',', '\n', '\r'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_commas_and_newlines() {
        let urls = split_url_list("http://a.com/x.pdf, http://b.com/y.pdf\nhttp://c.com/z.pdf");
        assert_eq!(
            urls,
            vec!["http://a.com/x.pdf", "http://b.com/y.pdf", "http://c.com/z.pdf"]
        );
    }

    #[test]
    fn test_split_drops_empty_entries() {
        let urls = split_url_list(" ,\n\r\n http://a.com/x.pdf ,, \n");
        assert_eq!(urls, vec!["http://a.com/x.pdf"]);
        assert!(split_url_list("").is_empty());
        assert!(split_url_list(" , \n ").is_empty());
    }

    #[test]
    fn test_split_keeps_duplicates_in_order() {
        let urls = split_url_list("http://b.com/1,http://a.com/2,http://b.com/1");
        assert_eq!(urls, vec!["http://b.com/1", "http://a.com/2", "http://b.com/1"]);
    }

    #[test]
    fn test_normalize_protocol_relative() {
        let id = DocumentId::normalize("//cdn.example.com/statement.pdf").unwrap();
        assert_eq!(id.as_str(), "https://cdn.example.com/statement.pdf");
    }

    #[test]
    fn test_normalize_collapses_equivalent_inputs() {
        let a = DocumentId::normalize("  HTTPS://CDN.example.com/statement.pdf ").unwrap();
        let b = DocumentId::normalize("//cdn.example.com/statement.pdf").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_normalize_keeps_plain_urls() {
        let id = DocumentId::normalize("http://a.com/x.pdf").unwrap();
        assert_eq!(id.as_str(), "http://a.com/x.pdf");
    }

    #[test]
    fn test_normalize_non_url_falls_back_to_trimmed() {
        let id = DocumentId::normalize("  report-2023.pdf ").unwrap();
        assert_eq!(id.as_str(), "report-2023.pdf");
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(DocumentId::normalize("").is_none());
        assert!(DocumentId::normalize("   ").is_none());
        assert!(DocumentId::normalize("//").is_none());
    }
}
