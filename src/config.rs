use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::util::SecretString;

/// Config file names searched in the theme folder, in order.
const CONFIG_FILE_NAMES: [&str; 2] = ["config.json", "themeship.toml"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: Option<GithubConfig>,
    #[serde(default)]
    pub release: ReleaseSettings,
}

/// The `github` section as written by the maintainer. Both fields are
/// optional on disk; `Config::credentials` decides whether they are usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<SecretString>,
}

/// Credentials that are complete enough to talk to the release host.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    pub username: String,
    pub token: SecretString,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSettings {
    /// `owner/name` of the repository releases are drafted on
    #[serde(default = "default_repository")]
    pub repository: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// API root, without trailing slash (GitHub Enterprise or a test server)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Changelog location, relative to the theme folder
    #[serde(default = "default_changelog_path")]
    pub changelog_path: PathBuf,

    /// Branch or commit the tag is created from (default: host's default branch)
    #[serde(default)]
    pub target_commitish: Option<String>,

    /// HTTP request timeout in seconds (default: 60, 0 disables it)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            user_agent: default_user_agent(),
            api_url: default_api_url(),
            changelog_path: default_changelog_path(),
            target_commitish: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_repository() -> String {
    "Necr0/Casper".to_string()
}

fn default_user_agent() -> String {
    "Casper".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_changelog_path() -> PathBuf {
    PathBuf::from("changelog.md")
}

fn default_timeout() -> u64 {
    60
}

impl ReleaseSettings {
    /// Web URL of the repository, used for commit links in the changelog
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}", self.repository)
    }

    /// Releases endpoint for both listing and creating
    pub fn releases_uri(&self) -> String {
        format!(
            "{}/repos/{}/releases",
            self.api_url.trim_end_matches('/'),
            self.repository
        )
    }

    /// Per-request timeout, `None` when `timeout_secs` is 0
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Config {
    /// Load config from the theme folder or the user config directory
    pub fn load(folder: &Path) -> Option<Self> {
        Self::load_with_path(None, folder)
    }

    /// Load configuration from a specific path, or search the default locations.
    /// Returns `None` when nothing usable is found; a missing config is a normal
    /// state that disables releasing, not an error.
    pub fn load_with_path(path: Option<&Path>, folder: &Path) -> Option<Self> {
        if let Some(config_path) = path {
            debug!("Loading config from explicit path: {}", config_path.display());
            return Self::try_load(config_path);
        }

        for candidate in Self::search_paths(folder) {
            if candidate.exists() {
                return Self::try_load(&candidate);
            }
        }

        debug!("No config file found");
        None
    }

    fn search_paths(folder: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = CONFIG_FILE_NAMES
            .iter()
            .map(|name| folder.join(name))
            .collect();
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("themeship").join("config.json"));
        }
        paths
    }

    fn try_load(path: &Path) -> Option<Self> {
        if !path.exists() {
            debug!("Config file {} does not exist", path.display());
            return None;
        }
        match Self::load_from_path(path) {
            Ok(config) => {
                debug!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                warn!("Ignoring config {}: {:#}", path.display(), e);
                None
            }
        }
    }

    /// Parse a config file; `.toml` files as TOML, everything else as JSON
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config = if is_toml {
            toml::from_str(&content).context("Invalid TOML config")?
        } else {
            serde_json::from_str(&content).context("Invalid JSON config")?
        };
        Ok(config)
    }

    /// Credentials, if both username and token are configured and non-blank
    pub fn credentials(&self) -> Option<ReleaseConfig> {
        let github = self.github.as_ref()?;
        let username = github.username.as_deref().map(str::trim)?;
        let token = github.token.as_ref()?;

        if username.is_empty() || token.is_empty() {
            return None;
        }

        Some(ReleaseConfig {
            username: username.to_string(),
            token: token.clone(),
        })
    }
}
