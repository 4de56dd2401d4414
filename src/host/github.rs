use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;

use super::client::{CreatedRelease, DraftRelease, ReleaseHost, ReleaseRecord};
use crate::config::{ReleaseConfig, ReleaseSettings};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// GitHub REST client for one repository's releases
pub struct GithubClient {
    releases_uri: String,
    credentials: ReleaseConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GithubCreatedRelease {
    id: u64,
    html_url: String,
    #[serde(default)]
    upload_url: String,
}

impl GithubClient {
    pub fn new(settings: &ReleaseSettings, credentials: ReleaseConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            releases_uri: settings.releases_uri(),
            credentials,
            client: builder.build().context("failed to build HTTP client")?,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("accept", GITHUB_ACCEPT)
            .basic_auth(
                &self.credentials.username,
                Some(self.credentials.token.expose()),
            )
    }

    async fn check_status(response: Response, action: &str) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            bail!("GitHub API error while {} ({}): {}", action, status, error_text);
        }
        Ok(response)
    }
}

#[async_trait]
impl ReleaseHost for GithubClient {
    async fn list_releases(&self) -> Result<Vec<ReleaseRecord>> {
        debug!("Listing releases at {}", self.releases_uri);

        let response = self
            .authorized(self.client.get(&self.releases_uri))
            .send()
            .await
            .context("Failed to send request to GitHub API")?;
        let response = Self::check_status(response, "listing releases").await?;

        response
            .json()
            .await
            .context("Failed to parse GitHub releases response")
    }

    async fn create_release(&self, release: &DraftRelease) -> Result<CreatedRelease> {
        debug!(
            "Creating release {} at {} (draft: {})",
            release.tag_name, self.releases_uri, release.draft
        );

        let response = self
            .authorized(self.client.post(&self.releases_uri))
            .json(release)
            .send()
            .await
            .context("Failed to send request to GitHub API")?;
        let response = Self::check_status(response, "creating release").await?;

        let created: GithubCreatedRelease = response
            .json()
            .await
            .context("Failed to parse GitHub create release response")?;

        Ok(CreatedRelease {
            id: created.id,
            release_url: created.html_url,
            upload_url: created.upload_url,
        })
    }
}
