use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use themeship::cli;

#[derive(Parser)]
#[command(name = "themeship", version)]
#[command(about = "Draft versioned theme releases with a generated changelog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the changelog and create a draft release on GitHub
    Release {
        /// Version to release (e.g., "1.2.0")
        #[arg(long, env = "npm_package_version")]
        version: Option<String>,

        /// Ghost versions as "<ships with>,<compatible with>" (e.g., "2.10.1,2.10.0")
        #[arg(long, env = "GHOST")]
        ghost: Option<String>,

        /// Path to config file (defaults to ./config.json, ./themeship.toml or ~/.config/themeship/config.json)
        #[arg(long)]
        config: Option<String>,

        /// Theme folder containing the git repository
        #[arg(long, default_value = ".")]
        folder: String,

        /// Override the repository releases are drafted on ("owner/name")
        #[arg(long)]
        repository: Option<String>,

        /// List releases and rewrite the changelog file, but only log the
        /// draft instead of creating it on GitHub
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Release {
            version,
            ghost,
            config,
            folder,
            repository,
            dry_run,
        } => {
            cli::release::run(version, ghost, config, folder, repository, dry_run).await?;
        }
    }

    Ok(())
}
