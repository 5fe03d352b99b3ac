//! GitHub provider credential validation tool
//!
//! Performs a single one-shot fetch against the real contents API to
//! confirm that a token, repository and path line up before wiring the
//! provider into an application.
//!
//! ## Usage
//!
//! ```bash
//! GITHUB_TOKEN=your_token \
//! GITHUB_OWNER=your_user \
//! GITHUB_REPOSITORY=config \
//! GITHUB_PATH=config.yaml \
//! cargo run --bin github_validation
//! ```

use std::env;

use anyhow::{Context, Result};
use remoteconf_core::ConfigManager;
use remoteconf_core::traits::ProviderOptions;
use remoteconf_provider_github::{GithubConfigManager, GithubOptions};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let options = GithubOptions {
        owner: env::var("GITHUB_OWNER").context("GITHUB_OWNER environment variable is required")?,
        repository: env::var("GITHUB_REPOSITORY")
            .context("GITHUB_REPOSITORY environment variable is required")?,
        branch: env::var("GITHUB_BRANCH").ok(),
        path: env::var("GITHUB_PATH").unwrap_or_else(|_| "config.yaml".to_string()),
        token: env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable is required")?,
        polling_interval_secs: None,
    };

    tracing::info!("validating options: {:?}", options);
    options.validate().context("options failed validation")?;

    let manager = GithubConfigManager::new(&options).context("failed to build manager")?;
    let value = manager
        .get(&options.path)
        .await
        .context("one-shot fetch failed")?;

    tracing::info!("fetch succeeded ({} bytes)", value.len());
    println!("{}", String::from_utf8_lossy(&value));

    Ok(())
}
