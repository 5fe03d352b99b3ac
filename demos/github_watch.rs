//! Watch a configuration file in a GitHub repository
//!
//! Registers the GitHub provider, performs an initial read through the
//! host-shaped bridge, then follows the watch channel and prints every
//! change until Ctrl-C.
//!
//! ## Usage
//!
//! ```bash
//! GITHUB_TOKEN=your_token \
//! GITHUB_OWNER=your_user \
//! GITHUB_REPOSITORY=config \
//! GITHUB_PATH=config.yaml \
//! cargo run --bin github_watch
//! ```
//!
//! Optional: `GITHUB_BRANCH` (repository default branch when unset),
//! `GITHUB_POLL_SECS` (default 60).

use std::env;
use std::io::Read;

use anyhow::{Context, Result};
use remoteconf_core::{ProviderDescriptor, RemoteConfigBridge};
use remoteconf_provider_github::{GithubOptions, register_github_provider};
use tracing::{info, warn};

struct GithubDescriptor {
    path: String,
}

impl ProviderDescriptor for GithubDescriptor {
    fn provider(&self) -> &str {
        "github"
    }

    fn endpoint(&self) -> &str {
        "github.com"
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn secret_keyring(&self) -> &str {
        ""
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let token = env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable is required")?;
    let owner = env::var("GITHUB_OWNER").context("GITHUB_OWNER environment variable is required")?;
    let repository =
        env::var("GITHUB_REPOSITORY").context("GITHUB_REPOSITORY environment variable is required")?;
    let path = env::var("GITHUB_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    let options = GithubOptions {
        owner,
        repository,
        branch: env::var("GITHUB_BRANCH").ok(),
        path: path.clone(),
        token,
        polling_interval_secs: env::var("GITHUB_POLL_SECS").ok().and_then(|s| s.parse().ok()),
    };

    register_github_provider(options).context("failed to register github provider")?;
    info!("github provider registered");

    let bridge = RemoteConfigBridge::new();
    let descriptor = GithubDescriptor { path };

    // Initial read, the way a host performs its first remote load
    let mut reader = bridge
        .get(&descriptor)
        .await
        .context("initial remote read failed")?;
    let mut initial = String::new();
    reader.read_to_string(&mut initial)?;
    info!("initial configuration:\n{}", initial);

    // Continuous change notification
    let (mut responses, stop_tx) = bridge.watch_channel(&descriptor);
    info!("watching {} for changes (Ctrl-C to stop)", descriptor.path());

    loop {
        tokio::select! {
            response = responses.recv() => {
                let Some(response) = response else {
                    warn!("watch channel closed");
                    break;
                };
                match (response.value, response.error) {
                    (Some(value), _) => {
                        info!("configuration changed:\n{}", String::from_utf8_lossy(&value));
                    }
                    (None, Some(err)) => warn!("watch error: {}", err),
                    (None, None) => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                let _ = stop_tx.send(true).await;
                break;
            }
        }
    }

    Ok(())
}
