use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::host::factory;
use crate::release::{draft_release, ReleaseOutcome, ReleaseRequest};

pub async fn run(
    version: Option<String>,
    ghost_override: Option<String>,
    config_path: Option<String>,
    folder: String,
    repository_override: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let folder = PathBuf::from(folder);

    info!("Theme folder: {}", folder.display());
    if let Some(ref cfg) = config_path {
        info!("Config: {}", cfg);
    }
    info!("Dry run: {}", dry_run);

    let mut config = Config::load_with_path(config_path.as_deref().map(Path::new), &folder);

    if let (Some(config), Some(repository)) = (config.as_mut(), repository_override) {
        info!("CLI override: repository = {}", repository);
        config.release.repository = repository;
    }

    let request = ReleaseRequest {
        version,
        ghost_override,
        folder,
    };

    let outcome = draft_release(&request, config.as_ref(), |settings, credentials| {
        factory::create_host(settings, credentials, dry_run)
    })
    .await?;

    match outcome {
        ReleaseOutcome::Skipped(reason) => debug!("Release skipped: {:?}", reason),
        ReleaseOutcome::Drafted {
            previous_version,
            changelog_entries,
            ..
        } => debug!(
            "Drafted after {} with {} changelog entries",
            previous_version.as_deref().unwrap_or("(full history)"),
            changelog_entries
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_invalid_version_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let result = run(
            Some(String::new()),
            None,
            None,
            temp.path().to_string_lossy().to_string(),
            None,
            false,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_without_credentials_leaves_changelog_untouched() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.json");
        std::fs::write(&config_path, r#"{ "github": { "username": "casper-bot" } }"#).unwrap();

        let result = run(
            Some("1.2.0".to_string()),
            Some("2.10.1,2.10.0".to_string()),
            Some(config_path.to_string_lossy().to_string()),
            temp.path().to_string_lossy().to_string(),
            Some("someone/theme".to_string()),
            false,
        )
        .await;

        assert!(result.is_ok());
        assert!(!temp.path().join("changelog.md").exists());
    }
}
