use anyhow::{bail, Context, Result};
use git2::{Commit, Oid, Repository, Sort};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One non-merge commit as it appears in the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    /// Commit time, seconds since the epoch
    pub timestamp: i64,
    pub short_id: String,
    pub summary: String,
    pub author: String,
    /// Stable id of the change itself; cherry-picks share it with the
    /// original. `None` for commits that change no files.
    pub patch_id: Option<Oid>,
}

impl ChangelogEntry {
    /// Markdown list item linking the commit on the repository web page
    pub fn render(&self, repo_url: &str) -> String {
        format!(
            "* [{id}]({repo_url}/commit/{id}) {summary} - {author}",
            id = self.short_id,
            summary = self.summary,
            author = self.author,
        )
    }
}

/// Rewrites a changelog file from the git history of a theme folder
#[derive(Debug, Clone)]
pub struct Changelog {
    changelog_path: PathBuf,
    folder: PathBuf,
}

impl Changelog {
    /// `changelog_path` is resolved against `folder` when relative.
    pub fn new(changelog_path: impl AsRef<Path>, folder: impl Into<PathBuf>) -> Self {
        let folder = folder.into();
        Self {
            changelog_path: folder.join(changelog_path),
            folder,
        }
    }

    pub fn path(&self) -> &Path {
        &self.changelog_path
    }

    /// Collect non-merge commits reachable from HEAD but not from the
    /// previous version. `since` lists the names that version may go by in
    /// git, tried in order; an empty list collects the whole history.
    pub fn collect(&self, since: &[&str]) -> Result<Vec<ChangelogEntry>> {
        let repo = Repository::discover(&self.folder).with_context(|| {
            format!("No git repository found at {}", self.folder.display())
        })?;

        // Setting the sort order resets the walk, so it goes first.
        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push_head().context("Repository has no commits")?;

        if since.is_empty() {
            debug!("No previous version, collecting full history");
        } else {
            let boundary = resolve_version(&repo, since)?;
            debug!("Changelog boundary {} resolves to {}", since[0], boundary);
            walk.hide(boundary)?;
        }

        let mut entries = Vec::new();
        for oid in walk {
            let commit = repo.find_commit(oid?)?;
            if commit.parent_count() > 1 {
                continue;
            }

            let short_id = commit.as_object().short_id()?;
            let author = commit.author();
            entries.push(ChangelogEntry {
                timestamp: commit.time().seconds(),
                short_id: short_id.as_str().unwrap_or_default().to_string(),
                summary: commit.summary().unwrap_or_default().to_string(),
                author: author.name().unwrap_or("unknown").to_string(),
                patch_id: patch_id(&repo, &commit)?,
            });
        }

        Ok(entries)
    }

    /// Regenerate the changelog file: collect, sort newest first, drop
    /// cherry-picked repeats and overwrite the file. Returns the written entries.
    pub fn write(&self, repo_url: &str, since: &[&str]) -> Result<Vec<ChangelogEntry>> {
        let mut entries = self.collect(since)?;
        sort_entries(&mut entries);
        let entries = clean_entries(entries);

        let contents: String = entries
            .iter()
            .map(|entry| format!("{}\n", entry.render(repo_url)))
            .collect();

        self.replace_file(&contents)?;

        info!(
            "Wrote {} changelog entries to {}",
            entries.len(),
            self.changelog_path.display()
        );
        Ok(entries)
    }

    /// Non-empty lines of the changelog file
    pub fn read_lines(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.changelog_path).with_context(|| {
            format!("Failed to read {}", self.changelog_path.display())
        })?;
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn replace_file(&self, contents: &str) -> Result<()> {
        fs::write(&self.changelog_path, contents)
            .with_context(|| format!("Failed to write {}", self.changelog_path.display()))
    }
}

/// Newest first; commits with equal times keep their relative order.
pub fn sort_entries(entries: &mut [ChangelogEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Drop entries carrying the same change as a newer entry (cherry-picks
/// and re-applied patches). Commits that only share a message are kept.
/// Expects sorted input.
pub fn clean_entries(entries: Vec<ChangelogEntry>) -> Vec<ChangelogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| entry.patch_id.is_none_or(|id| seen.insert(id)))
        .collect()
}

/// Patch id of the diff a commit introduces over its parent
fn patch_id(repo: &Repository, commit: &Commit<'_>) -> Result<Option<Oid>> {
    let parent_tree = match commit.parent_count() {
        0 => None,
        _ => Some(commit.parent(0)?.tree()?),
    };
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&commit.tree()?), None)?;
    if diff.deltas().len() == 0 {
        return Ok(None);
    }
    Ok(Some(diff.patchid(None)?))
}

/// Find the commit for a released version. Each candidate is tried as
/// written, then `v`-prefixed.
fn resolve_version(repo: &Repository, candidates: &[&str]) -> Result<Oid> {
    for candidate in candidates {
        for rev in [candidate.to_string(), format!("v{}", candidate)] {
            if let Ok(object) = repo.revparse_single(&rev) {
                return Ok(object.peel_to_commit()?.id());
            }
        }
    }
    bail!(
        "Previous version {} not found in git history",
        candidates.join(" / ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: i64, id: &str, summary: &str, author: &str) -> ChangelogEntry {
        ChangelogEntry {
            timestamp,
            short_id: id.to_string(),
            summary: summary.to_string(),
            author: author.to_string(),
            patch_id: None,
        }
    }

    fn with_patch(mut entry: ChangelogEntry, patch: &str) -> ChangelogEntry {
        entry.patch_id = Some(Oid::from_str(patch).unwrap());
        entry
    }

    #[test]
    fn test_render_links_commit() {
        let e = entry(0, "abc1234", "Fixed header spacing", "Jane Doe");
        assert_eq!(
            e.render("https://github.com/Necr0/Casper"),
            "* [abc1234](https://github.com/Necr0/Casper/commit/abc1234) Fixed header spacing - Jane Doe"
        );
    }

    #[test]
    fn test_sort_newest_first() {
        let mut entries = vec![
            entry(100, "a", "old", "x"),
            entry(300, "c", "newest", "x"),
            entry(200, "b", "middle", "x"),
        ];
        sort_entries(&mut entries);
        let ids: Vec<_> = entries.iter().map(|e| e.short_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_clean_drops_repeated_patches_keeping_newest() {
        let entries = vec![
            with_patch(entry(300, "c", "Fixed nav", "Jane"), "aa"),
            with_patch(entry(200, "b", "Fixed nav", "Jane"), "bb"),
            with_patch(entry(150, "d", "Fixed nav (backport)", "John"), "aa"),
            entry(120, "e", "Empty commit", "Jane"),
            entry(110, "f", "Empty commit", "Jane"),
            with_patch(entry(100, "a", "Added dark mode", "Jane"), "cc"),
        ];
        let cleaned = clean_entries(entries);
        let ids: Vec<_> = cleaned.iter().map(|e| e.short_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "e", "f", "a"]);
    }

    #[test]
    fn test_relative_path_resolved_against_folder() {
        let changelog = Changelog::new("changelog.md", "/tmp/theme");
        assert_eq!(changelog.path(), Path::new("/tmp/theme/changelog.md"));

        let absolute = Changelog::new("/var/log/changes.md", "/tmp/theme");
        assert_eq!(absolute.path(), Path::new("/var/log/changes.md"));
    }

    #[test]
    fn test_collect_outside_repository_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let changelog = Changelog::new("changelog.md", temp.path());
        assert!(changelog.collect(&[]).is_err());
    }
}
