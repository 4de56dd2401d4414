use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

/// A published (or draft) release as listed by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub draft: bool,
}

impl ReleaseRecord {
    /// Version this release stands for: its name, or the tag when unnamed
    pub fn version(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.tag_name,
        }
    }

    /// Names the release may go by in git: the version, then the tag
    pub fn git_refs(&self) -> Vec<&str> {
        let mut refs = vec![self.version()];
        if self.tag_name != self.version() {
            refs.push(&self.tag_name);
        }
        refs
    }
}

/// Payload for creating a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_commitish: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRelease {
    pub id: u64,
    pub release_url: String,
    pub upload_url: String,
}

#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Releases of the configured repository, most recent first
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>>;

    async fn create_release(&self, release: &DraftRelease) -> Result<CreatedRelease>;
}

// Lets callers keep a handle on a shared host (e.g. to inspect a mock afterwards).
#[async_trait]
impl<T: ReleaseHost + ?Sized> ReleaseHost for Arc<T> {
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>> {
        (**self).list_releases().await
    }

    async fn create_release(&self, release: &DraftRelease) -> Result<CreatedRelease> {
        (**self).create_release(release).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    ListReleases,
    CreateRelease(DraftRelease),
}

/// In-memory host that serves a fixed release list and records every call
#[derive(Debug, Default)]
pub struct MockReleaseHost {
    releases: Vec<ReleaseRecord>,
    calls: Mutex<Vec<HostCall>>,
}

impl MockReleaseHost {
    pub fn new(releases: Vec<ReleaseRecord>) -> Self {
        Self {
            releases,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Host whose history holds the given versions, most recent first
    pub fn with_versions(versions: &[&str]) -> Self {
        Self::new(
            versions
                .iter()
                .map(|v| ReleaseRecord {
                    name: Some(v.to_string()),
                    tag_name: v.to_string(),
                    html_url: format!("https://github.com/mock/releases/tag/{}", v),
                    draft: false,
                })
                .collect(),
        )
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().clone()
    }

    /// Releases submitted through `create_release`
    pub fn created(&self) -> Vec<DraftRelease> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::CreateRelease(release) => Some(release.clone()),
                HostCall::ListReleases => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HostCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ReleaseHost for MockReleaseHost {
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>> {
        self.lock().push(HostCall::ListReleases);
        Ok(self.releases.clone())
    }

    async fn create_release(&self, release: &DraftRelease) -> Result<CreatedRelease> {
        let mut calls = self.lock();
        calls.push(HostCall::CreateRelease(release.clone()));
        Ok(CreatedRelease {
            id: calls.len() as u64,
            release_url: format!(
                "https://github.com/mock/releases/tag/untagged-{}",
                release.tag_name
            ),
            upload_url: String::new(),
        })
    }
}

/// Reads from the real host but only logs the release it would create
pub struct DryRunHost {
    inner: Box<dyn ReleaseHost>,
}

impl DryRunHost {
    pub fn new(inner: Box<dyn ReleaseHost>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ReleaseHost for DryRunHost {
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>> {
        self.inner.list_releases().await
    }

    async fn create_release(&self, release: &DraftRelease) -> Result<CreatedRelease> {
        info!(
            "Dry run: would create draft {} (tag {}, prerelease: {})",
            release.name, release.tag_name, release.prerelease
        );
        info!("Dry run body:\n{}", release.body);
        Ok(CreatedRelease {
            id: 0,
            release_url: format!("(dry run) {}", release.tag_name),
            upload_url: String::new(),
        })
    }
}
