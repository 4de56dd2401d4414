use anyhow::Result;

use super::client::{DryRunHost, ReleaseHost};
use super::github::GithubClient;
use crate::config::{ReleaseConfig, ReleaseSettings};

/// Create the release host for the configured repository.
/// A dry run still lists real releases but never creates one.
pub fn create_host(
    settings: &ReleaseSettings,
    credentials: ReleaseConfig,
    dry_run: bool,
) -> Result<Box<dyn ReleaseHost>> {
    let github: Box<dyn ReleaseHost> = Box::new(GithubClient::new(settings, credentials)?);
    if dry_run {
        return Ok(Box::new(DryRunHost::new(github)));
    }
    Ok(github)
}
