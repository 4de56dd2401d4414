//! Throwaway theme repositories built with git2, so tests do not depend on
//! a git binary or the user's git config.
#![allow(dead_code)]

use git2::{Commit, Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use themeship::config::{Config, GithubConfig, ReleaseSettings};

pub struct ThemeRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl ThemeRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit a change to `file` on HEAD
    pub fn commit(&self, file: &str, message: &str, author: &str, time: i64) -> Oid {
        let path = self.path().join(file);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(path, format!("{}\n{}", message, time)).unwrap();
        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = signature(author, time);
        let parent = self.head_commit();
        let parents: Vec<&Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    /// Commit off `parent` without moving HEAD
    pub fn side_commit(&self, parent: Oid, message: &str, time: i64) -> Oid {
        let parent = self.repo.find_commit(parent).unwrap();
        let tree = parent.tree().unwrap();
        let sig = signature("Side Author", time);
        self.repo
            .commit(None, &sig, &sig, message, &tree, &[&parent])
            .unwrap()
    }

    /// Commit off `parent` that writes `file`, without moving HEAD
    pub fn side_change(&self, parent: Oid, file: &str, message: &str, time: i64) -> Oid {
        let parent = self.repo.find_commit(parent).unwrap();
        let blob = self.repo.blob(message.as_bytes()).unwrap();
        let mut builder = self.repo.treebuilder(Some(&parent.tree().unwrap())).unwrap();
        builder.insert(file, blob, 0o100644).unwrap();
        let tree = self.repo.find_tree(builder.write().unwrap()).unwrap();
        let sig = signature("Side Author", time);
        self.repo
            .commit(None, &sig, &sig, message, &tree, &[&parent])
            .unwrap()
    }

    /// Apply the change of `source` on HEAD, keeping its author and message
    pub fn cherry_pick(&self, source: Oid, time: i64) -> Oid {
        let source = self.repo.find_commit(source).unwrap();
        let head = self.head_commit().unwrap();
        let mut index = self
            .repo
            .cherrypick_commit(&source, &head, 0, None)
            .unwrap();
        let tree = self
            .repo
            .find_tree(index.write_tree_to(&self.repo).unwrap())
            .unwrap();
        let committer = signature("Picker", time);
        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &source.author(),
                &committer,
                source.message().unwrap(),
                &tree,
                &[&head],
            )
            .unwrap();
        oid
    }

    /// Merge commit on HEAD with `other` as second parent
    pub fn merge(&self, other: Oid, message: &str, time: i64) -> Oid {
        let head = self.head_commit().unwrap();
        let other = self.repo.find_commit(other).unwrap();
        let tree = head.tree().unwrap();
        let sig = signature("Merger", time);
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&head, &other])
            .unwrap()
    }

    pub fn tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    pub fn changelog(&self) -> String {
        fs::read_to_string(self.path().join("changelog.md")).unwrap()
    }

    fn head_commit(&self) -> Option<Commit<'_>> {
        self.repo.head().ok().and_then(|head| head.peel_to_commit().ok())
    }
}

fn signature(author: &str, time: i64) -> Signature<'static> {
    let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
    Signature::new(author, &email, &Time::new(time, 0)).unwrap()
}

/// Config with complete credentials and default release settings
pub fn config_with_credentials() -> Config {
    Config {
        github: Some(GithubConfig {
            username: Some("casper-bot".to_string()),
            token: Some("ghp_123".into()),
        }),
        release: ReleaseSettings::default(),
    }
}
