//! Build-session orchestration.
//!
//! [`BuildSession`] is the explicit per-build state threaded through the
//! site build lifecycle: created at configuration time, fed the cache at
//! pre-build, asked to annotate each page, and flushed at post-build.
//! Nothing in per-page processing is allowed to abort the build; every
//! recoverable condition resolves to "no data for this page".

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};

use bylines_shared::{
    AppConfig, DATE_FORMAT, CacheDocument, PageCacheEntry, PageContext, Result, today_utc,
};

use crate::cache;
use crate::exclude::exclude;
use crate::fetch::ContributorClient;
use crate::history::GitHistory;

/// One build's worth of committers state.
pub struct BuildSession {
    config: AppConfig,
    /// False when disabled by config or degraded (no repository configured).
    active: bool,
    cache_dir: PathBuf,
    history: Option<GitHistory>,
    client: Option<ContributorClient>,
    /// In-memory mirror of the persisted cache document.
    cache: CacheDocument,
    /// Cumulative wall-clock time spent annotating pages.
    total_time: Duration,
}

impl BuildSession {
    /// Configuration phase: validate the config, open the local repository
    /// and build the HTTP client.
    ///
    /// A missing `repository` is logged and degrades the session to
    /// inactive rather than failing the build.
    pub fn new(config: AppConfig, repo_root: &Path) -> Result<Self> {
        let cache_dir = repo_root.join(&config.cache_dir);

        if !config.enabled {
            info!("git committers DISABLED");
            return Ok(Self::inactive(config, cache_dir));
        }
        info!("git committers ENABLED");

        if config.repository.is_empty() {
            error!("repository not specified, committers resolution degraded to disabled");
            return Ok(Self::inactive(config, cache_dir));
        }

        let client = ContributorClient::new(config.host_url()?)?;
        let history = GitHistory::open(repo_root)?;

        Ok(Self {
            config,
            active: true,
            cache_dir,
            history: Some(history),
            client: Some(client),
            cache: CacheDocument::default(),
            total_time: Duration::ZERO,
        })
    }

    fn inactive(config: AppConfig, cache_dir: PathBuf) -> Self {
        Self {
            config,
            active: false,
            cache_dir,
            history: None,
            client: None,
            cache: CacheDocument::default(),
            total_time: Duration::ZERO,
        }
    }

    /// Point the session's HTTP client at a different host (test hook).
    #[cfg(test)]
    fn with_host(mut self, host: url::Url) -> Self {
        self.client = Some(ContributorClient::new(host).unwrap());
        self
    }

    /// Pre-build phase: load the persisted cache document if present.
    pub fn pre_build(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        if let Some(doc) = cache::load(&self.cache_dir)? {
            self.cache = doc;
        }
        Ok(())
    }

    /// Per-page phase: resolve committers and last commit date for the page
    /// at `src_path` (relative to the docs directory, as the site build
    /// reports it).
    pub fn page_context(&mut self, src_path: &str) -> PageContext {
        let start = Instant::now();
        let context = self.annotate(src_path);
        self.total_time += start.elapsed();
        context
    }

    fn annotate(&mut self, src_path: &str) -> PageContext {
        if !self.active {
            return PageContext::default();
        }
        if exclude(src_path, &self.config.exclude) {
            debug!(src_path, "page excluded from committers resolution");
            return PageContext::default();
        }

        let (Some(history), Some(client)) = (&self.history, &self.client) else {
            return PageContext::default();
        };

        let git_path = format!("{}{}", self.config.docs_path, src_path).replace('\\', "/");

        let last_commit_date = match history.last_commit_date(&git_path) {
            Ok(date) => date,
            Err(e) => {
                warn!(path = %git_path, error = %e, "git history lookup failed");
                return PageContext::default();
            }
        };

        // Not committed yet: today's date, nothing to fetch or cache.
        let Some(last_commit_date) = last_commit_date else {
            return PageContext {
                committers: Vec::new(),
                last_commit_date: Some(today_utc()),
            };
        };

        // Cache hit only when nothing was committed for this page since the
        // document was saved: page date strictly before the cache date.
        if let Some(entry) = self.cache.page_authors.get(&git_path) {
            if predates(&last_commit_date, &self.cache.cache_date) {
                debug!(path = %git_path, "cache hit, skipping fetch");
                return PageContext {
                    committers: entry.authors.clone(),
                    last_commit_date: Some(entry.last_commit_date.clone()),
                };
            }
        }

        let authors = client.contributors(
            &self.config.repository,
            &self.config.branch,
            &git_path,
        );
        self.cache.page_authors.insert(
            git_path,
            PageCacheEntry {
                last_commit_date: last_commit_date.clone(),
                authors: authors.clone(),
            },
        );

        PageContext {
            committers: authors,
            last_commit_date: Some(last_commit_date),
        }
    }

    /// Post-build phase: persist the (possibly updated) cache mirror with a
    /// fresh cache date and report the accumulated time.
    pub fn post_build(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.cache.cache_date = today_utc();
        cache::save(&self.cache_dir, &self.cache)?;
        info!(
            total_ms = self.total_time.as_millis(),
            "committers resolution finished"
        );
        Ok(())
    }

    /// Cumulative wall-clock time spent in [`Self::page_context`].
    pub fn total_time(&self) -> Duration {
        self.total_time
    }
}

/// Whether `page_date` is strictly earlier than `cache_date`. Unparseable
/// dates never qualify, so a damaged entry falls through to a fresh fetch.
fn predates(page_date: &str, cache_date: &str) -> bool {
    match (
        NaiveDate::parse_from_str(page_date, DATE_FORMAT),
        NaiveDate::parse_from_str(cache_date, DATE_FORMAT),
    ) {
        (Ok(page), Ok(cache)) => page < cache,
        _ => false,
    }
}
