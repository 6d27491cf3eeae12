//! Core domain types for page committers metadata.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Date format used everywhere: cache timestamps, commit dates, page context.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in UTC, formatted as `YYYY-MM-DD`.
pub fn today_utc() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Contributor
// ---------------------------------------------------------------------------

/// One identity that has edited a page, as reported by the remote
/// contributors listing. Identity key is `login`; constructed once from
/// scraped HTML and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// Account login on the git host.
    pub login: String,
    /// Display name. The contributors-list markup carries no separate
    /// display name, so this always equals `login`.
    pub name: String,
    /// Profile URL on the git host.
    pub url: String,
    /// Avatar image URL, query string stripped.
    pub avatar: String,
}

// ---------------------------------------------------------------------------
// Cache document
// ---------------------------------------------------------------------------

/// Cached committers data for a single page, keyed by its
/// forward-slash-normalized path in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCacheEntry {
    /// Date of the most recent commit touching the page (`YYYY-MM-DD`, UTC).
    pub last_commit_date: String,
    /// Contributors in the order the remote listing reported them.
    pub authors: Vec<Contributor>,
}

/// The single persisted cache artifact (`page-authors.json`): read once at
/// build start, mutated in memory per page, written once at build end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDocument {
    /// When the document was saved. An entry is trusted only if its page's
    /// current commit date is strictly earlier than this.
    #[serde(default)]
    pub cache_date: String,
    /// Per-page cached entries, keyed by repository-relative path.
    #[serde(default)]
    pub page_authors: BTreeMap<String, PageCacheEntry>,
}

// ---------------------------------------------------------------------------
// Page context
// ---------------------------------------------------------------------------

/// Fields the annotator attaches to a page's rendering context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    /// Contributors for the page; empty when unknown, excluded, or disabled.
    #[serde(default)]
    pub committers: Vec<Contributor>,
    /// Date of the page's most recent commit, when determinable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_document_json_shape() {
        let mut doc = CacheDocument {
            cache_date: "2024-03-01".into(),
            page_authors: BTreeMap::new(),
        };
        doc.page_authors.insert(
            "docs/index.md".into(),
            PageCacheEntry {
                last_commit_date: "2024-02-14".into(),
                authors: vec![Contributor {
                    login: "octocat".into(),
                    name: "octocat".into(),
                    url: "https://github.com/octocat".into(),
                    avatar: "https://avatars.githubusercontent.com/u/1".into(),
                }],
            },
        );

        let json = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(json["cache_date"], "2024-03-01");
        assert_eq!(
            json["page_authors"]["docs/index.md"]["last_commit_date"],
            "2024-02-14"
        );
        assert_eq!(
            json["page_authors"]["docs/index.md"]["authors"][0]["login"],
            "octocat"
        );
    }

    #[test]
    fn empty_cache_document_deserializes() {
        let doc: CacheDocument = serde_json::from_str("{}").expect("parse");
        assert!(doc.cache_date.is_empty());
        assert!(doc.page_authors.is_empty());
    }

    #[test]
    fn today_is_date_shaped() {
        let today = today_utc();
        assert_eq!(today.len(), 10);
        assert_eq!(today.as_bytes()[4], b'-');
        assert_eq!(today.as_bytes()[7], b'-');
    }
}
