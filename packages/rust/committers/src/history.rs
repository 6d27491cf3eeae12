//! Local commit history lookup.
//!
//! Answers one question per page: when was the most recent commit that
//! touched this path? The walk starts at HEAD, newest first, and stops at
//! the first touching commit rather than accumulating the whole history.

use std::path::Path;

use chrono::DateTime;
use git2::{Commit, Oid, Repository, Sort};
use tracing::debug;

use bylines_shared::{DATE_FORMAT, Result};

/// Handle to the local repository's history.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open the repository at (or above) `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let repo = Repository::discover(root)?;
        Ok(Self { repo })
    }

    /// Date (UTC, `YYYY-MM-DD`) of the most recent commit on the current
    /// branch touching `path`. `Ok(None)` when no commit touches the path,
    /// i.e. the file is new or untracked.
    pub fn last_commit_date(&self, path: &str) -> Result<Option<String>> {
        let target = Path::new(path);

        let mut revwalk = self.repo.revwalk()?;
        if revwalk.push_head().is_err() {
            // Unborn HEAD: repository has no commits at all.
            debug!(path, "repository has no commits");
            return Ok(None);
        }
        revwalk.set_sorting(Sort::TIME)?;

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            if self.touches(&commit, target)? {
                let date = format_authored_date(&commit);
                debug!(path, %oid, date, "found last commit for page");
                return Ok(Some(date));
            }
        }

        debug!(path, "no commit touches page yet");
        Ok(None)
    }

    /// Whether `commit` changed the blob at `path` relative to its parents.
    /// A root commit touches every path present in its tree.
    fn touches(&self, commit: &Commit<'_>, path: &Path) -> Result<bool> {
        let Some(current) = self.entry_id(commit, path)? else {
            // Path absent at this commit; deletions are irrelevant here
            // because the walk serves pages that exist in the worktree.
            return Ok(false);
        };

        if commit.parent_count() == 0 {
            return Ok(true);
        }

        for parent in commit.parents() {
            if self.entry_id(&parent, path)? == Some(current) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Blob id at `path` in the commit's tree, if present.
    fn entry_id(&self, commit: &Commit<'_>, path: &Path) -> Result<Option<Oid>> {
        let tree = commit.tree()?;
        Ok(tree.get_path(path).ok().map(|entry| entry.id()))
    }
}

/// Author timestamp of a commit as a UTC `YYYY-MM-DD` string.
fn format_authored_date(commit: &Commit<'_>) -> String {
    let seconds = commit.author().when().seconds();
    DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Signature, Time};
    use tempfile::TempDir;

    /// Commit `contents` at `path`, authored at `epoch_secs` UTC.
    fn commit_file(repo: &Repository, path: &str, contents: &str, epoch_secs: i64) {
        let workdir = repo.workdir().expect("non-bare repo");
        let file_path = workdir.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file_path, contents).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(path)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let sig = Signature::new("tester", "tester@example.com", &Time::new(epoch_secs, 0))
            .unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| repo.find_commit(oid).unwrap());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parents)
            .unwrap();
    }

    fn fixture() -> (TempDir, GitHistory) {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let history = GitHistory::open(dir.path()).unwrap();
        (dir, history)
    }

    // 2024-02-14 00:00:00 UTC
    const FEB_14: i64 = 1_707_868_800;
    // 2024-03-01 00:00:00 UTC
    const MAR_01: i64 = 1_709_251_200;

    #[test]
    fn reports_date_of_only_commit() {
        let (dir, history) = fixture();
        let repo = Repository::open(dir.path()).unwrap();
        commit_file(&repo, "docs/index.md", "# Home", FEB_14);

        let date = history.last_commit_date("docs/index.md").unwrap();
        assert_eq!(date.as_deref(), Some("2024-02-14"));
    }

    #[test]
    fn newest_touching_commit_wins() {
        let (dir, history) = fixture();
        let repo = Repository::open(dir.path()).unwrap();
        commit_file(&repo, "docs/index.md", "v1", FEB_14);
        commit_file(&repo, "docs/index.md", "v2", MAR_01);

        let date = history.last_commit_date("docs/index.md").unwrap();
        assert_eq!(date.as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn unrelated_commits_do_not_move_the_date() {
        let (dir, history) = fixture();
        let repo = Repository::open(dir.path()).unwrap();
        commit_file(&repo, "docs/index.md", "# Home", FEB_14);
        commit_file(&repo, "docs/other.md", "# Other", MAR_01);

        let date = history.last_commit_date("docs/index.md").unwrap();
        assert_eq!(date.as_deref(), Some("2024-02-14"));
    }

    #[test]
    fn empty_repository_has_no_dates() {
        let (_dir, history) = fixture();
        assert_eq!(history.last_commit_date("docs/index.md").unwrap(), None);
    }

    #[test]
    fn uncommitted_file_has_no_date() {
        let (dir, history) = fixture();
        let repo = Repository::open(dir.path()).unwrap();
        commit_file(&repo, "docs/index.md", "# Home", FEB_14);
        std::fs::write(dir.path().join("docs/new.md"), "draft").unwrap();

        let date = history.last_commit_date("docs/new.md").unwrap();
        assert_eq!(date, None);
    }
}
