//! Release drafting: previous release → changelog → draft release.
//!
//! The three steps always run in that order, each awaited before the next,
//! so the draft body is built from a changelog regenerated for the same
//! version boundary.

use anyhow::Result;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::changelog::Changelog;
use crate::config::{Config, ReleaseConfig, ReleaseSettings};
use crate::host::{CreatedRelease, DraftRelease, ReleaseHost, ReleaseRecord};
use crate::version::VersionInfo;

/// Why a release run stopped before contacting the host.
/// The messages are what the maintainer sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("Invalid version.")]
    InvalidVersion,
    #[error("Please copy config.example.json and configure Github token.")]
    MissingCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Skipped(SkipReason),
    Drafted {
        /// Version the changelog starts after; `None` means full history
        previous_version: Option<String>,
        changelog_entries: usize,
        release: CreatedRelease,
    },
}

#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    /// Target version, usually `npm_package_version`
    pub version: Option<String>,
    /// `"<ships>,<compatible>"` Ghost versions, usually `GHOST`
    pub ghost_override: Option<String>,
    /// Theme folder holding the git repository and the changelog
    pub folder: PathBuf,
}

/// Draft a release for `request.version`.
///
/// `connect` builds the host once input and credentials have been checked,
/// so skipped runs never touch the network. Host and git failures propagate.
pub async fn draft_release<F>(
    request: &ReleaseRequest,
    config: Option<&Config>,
    connect: F,
) -> Result<ReleaseOutcome>
where
    F: FnOnce(&ReleaseSettings, ReleaseConfig) -> Result<Box<dyn ReleaseHost>>,
{
    let Some(version) = VersionInfo::derive(
        request.version.as_deref(),
        request.ghost_override.as_deref(),
    ) else {
        info!("{}", SkipReason::InvalidVersion);
        return Ok(ReleaseOutcome::Skipped(SkipReason::InvalidVersion));
    };

    info!("Draft release for {}.", version.new_version);

    let Some((config, credentials)) =
        config.and_then(|config| config.credentials().map(|creds| (config, creds)))
    else {
        warn!("{}", SkipReason::MissingCredentials);
        return Ok(ReleaseOutcome::Skipped(SkipReason::MissingCredentials));
    };
    let settings = &config.release;

    let host = connect(settings, credentials)?;

    let previous = previous_release(host.as_ref()).await?;
    let since = previous
        .as_ref()
        .map(ReleaseRecord::git_refs)
        .unwrap_or_default();

    let changelog = Changelog::new(&settings.changelog_path, request.folder.clone());
    let entries = changelog.write(&settings.repo_url(), &since)?;

    let draft = DraftRelease {
        tag_name: version.new_version.clone(),
        name: version.new_version.clone(),
        body: release_body(&version, &changelog.read_lines()?),
        draft: true,
        prerelease: false,
        target_commitish: settings.target_commitish.clone(),
    };
    let release = host.create_release(&draft).await?;

    info!("Release draft generated: {}", release.release_url);

    Ok(ReleaseOutcome::Drafted {
        previous_version: previous.map(|release| release.version().to_string()),
        changelog_entries: entries.len(),
        release,
    })
}

/// Most recent published release, if any
pub async fn previous_release(host: &dyn ReleaseHost) -> Result<Option<ReleaseRecord>> {
    let releases = host.list_releases().await?;

    match releases.into_iter().find(|release| !release.draft) {
        Some(release) => {
            info!("Previous version {}", release.version());
            Ok(Some(release))
        }
        None => {
            info!("No releases found. Skipping");
            Ok(None)
        }
    }
}

/// Compatibility header, a blank line, then the changelog lines
pub fn release_body(version: &VersionInfo, changelog_lines: &[String]) -> String {
    let mut body = version.compatibility_header();
    if !changelog_lines.is_empty() {
        body.push_str("\n\n");
        body.push_str(&changelog_lines.join("\n"));
    }
    body
}
