//! Persistent page-authors cache.
//!
//! One JSON document per project, `<cache_dir>/page-authors.json`, read once
//! at build start and overwritten once at build end. The write is a plain
//! overwrite, not a temp-file-then-rename: the cache is advisory and a
//! partial write self-heals on the next successful build.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use bylines_shared::{BylinesError, CacheDocument, Result};

/// File name of the persisted cache document.
pub const CACHE_FILE_NAME: &str = "page-authors.json";

/// Path of the cache file under `cache_dir`.
pub fn cache_file(cache_dir: &Path) -> PathBuf {
    cache_dir.join(CACHE_FILE_NAME)
}

/// Load the cache document if one exists.
///
/// An absent file is a cold start, not an error. A present but malformed
/// file is an error: silently discarding cached history would mask
/// corruption, so the diagnostic names the offending file instead.
pub fn load(cache_dir: &Path) -> Result<Option<CacheDocument>> {
    let path = cache_file(cache_dir);

    if !path.exists() {
        debug!(?path, "no cache file, cold start");
        return Ok(None);
    }

    info!(?path, "found page authors cache file, loading it");
    let contents = fs::read_to_string(&path).map_err(|e| BylinesError::io(&path, e))?;
    let doc = serde_json::from_str(&contents)
        .map_err(|e| BylinesError::parse(format!("{}: {e}", path.display())))?;

    Ok(Some(doc))
}

/// Persist the cache document, creating `cache_dir` as needed and fully
/// overwriting any prior file.
pub fn save(cache_dir: &Path, doc: &CacheDocument) -> Result<()> {
    fs::create_dir_all(cache_dir).map_err(|e| BylinesError::io(cache_dir, e))?;

    let path = cache_file(cache_dir);
    let json = serde_json::to_string(doc).map_err(|e| BylinesError::parse(e.to_string()))?;
    fs::write(&path, json).map_err(|e| BylinesError::io(&path, e))?;

    info!(?path, pages = doc.page_authors.len(), "saved page authors cache file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bylines_shared::{Contributor, PageCacheEntry};
    use tempfile::TempDir;

    fn sample_document() -> CacheDocument {
        let mut doc = CacheDocument {
            cache_date: "2024-03-01".into(),
            ..CacheDocument::default()
        };
        doc.page_authors.insert(
            "docs/index.md".into(),
            PageCacheEntry {
                last_commit_date: "2024-02-14".into(),
                authors: vec![Contributor {
                    login: "alice".into(),
                    name: "alice".into(),
                    url: "https://github.com/alice".into(),
                    avatar: "https://avatars.example.com/alice.png".into(),
                }],
            },
        );
        doc
    }

    #[test]
    fn roundtrip_preserves_entries() {
        let dir = TempDir::new().unwrap();
        let doc = sample_document();

        save(dir.path(), &doc).unwrap();
        let loaded = load(dir.path()).unwrap().expect("cache present");

        assert_eq!(loaded, doc);
    }

    #[test]
    fn missing_file_is_cold_start() {
        let dir = TempDir::new().unwrap();
        assert!(load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn save_creates_nested_cache_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join(".cache/plugin/git-committers");

        save(&nested, &sample_document()).unwrap();
        assert!(cache_file(&nested).exists());
    }

    #[test]
    fn malformed_cache_is_a_hard_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(cache_file(dir.path()), "{not json").unwrap();

        let err = load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(CACHE_FILE_NAME));
    }

    #[test]
    fn save_overwrites_prior_content() {
        let dir = TempDir::new().unwrap();
        save(dir.path(), &sample_document()).unwrap();

        let empty = CacheDocument {
            cache_date: "2024-04-01".into(),
            ..CacheDocument::default()
        };
        save(dir.path(), &empty).unwrap();

        let loaded = load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.cache_date, "2024-04-01");
        assert!(loaded.page_authors.is_empty());
    }
}
