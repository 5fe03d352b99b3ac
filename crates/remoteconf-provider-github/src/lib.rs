// # GitHub Configuration Provider
//
// Serves application configuration from a file tracked in a GitHub
// repository, via the repository contents API.
//
// ## Behavior
//
// - `get` performs one contents-API request and returns the raw file bytes
// - `watch` delegates to the core polling engine; the `ETag` response
//   header is the validation token, so unchanged content costs one
//   metadata-cheap request per tick and no re-parse downstream
// - NO retry logic (owned by the polling engine)
// - NO caching beyond the loop's last-seen token
//
// ## Authentication
//
// A personal access token or installation token with read access to the
// repository, sent as a bearer token. The token never appears in logs or
// in `Debug` output.
//
// ## API Reference
//
// - Get repository content: GET `/repos/{owner}/{repo}/contents/{path}`
// - Raw media type: `application/vnd.github.raw+json`

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use remoteconf_core::error::{Error, Result};
use remoteconf_core::traits::{
    ConfigManager, ContentSource, Fetched, ManagerFactory, ProviderOptions, SnapshotStream,
    StopReceiver, ValidationToken,
};
use remoteconf_core::{PollSettings, ProviderRegistry, registry, watch_source};

/// Registry id of this provider
pub const PROVIDER_ID: &str = "github";

/// GitHub API base URL
const GITHUB_API_BASE: &str = "https://api.github.com";

/// Media type asking the contents API for the raw file body
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// HTTP timeout for contents-API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for the GitHub provider
///
/// `polling_interval_secs` of zero or `None` means the manager applies the
/// 60 second default.
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubOptions {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repository: String,
    /// Branch to read from; the repository default branch when unset
    #[serde(default)]
    pub branch: Option<String>,
    /// Path of the configuration file inside the repository
    pub path: String,
    /// Access token with read permission on the repository
    pub token: String,
    /// Watch polling interval in seconds
    #[serde(default)]
    pub polling_interval_secs: Option<u64>,
}

// The token never appears in Debug output
impl std::fmt::Debug for GithubOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubOptions")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("path", &self.path)
            .field("token", &"<REDACTED>")
            .field("polling_interval_secs", &self.polling_interval_secs)
            .finish()
    }
}

impl ProviderOptions for GithubOptions {
    fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(Error::validation("github owner cannot be empty"));
        }
        if self.repository.trim().is_empty() {
            return Err(Error::validation("github repository cannot be empty"));
        }
        if self.path.trim().is_empty() {
            return Err(Error::validation("github file path cannot be empty"));
        }
        if self.token.is_empty() {
            return Err(Error::validation("github token cannot be empty"));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Error description from a failed contents-API response.
///
/// GitHub reports the cause in a JSON `message` field; fall back to the
/// status line when the body is not parseable.
async fn api_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("message")
                .and_then(|message| message.as_str())
                .map(|message| format!("{status}: {message}"))
        })
        .unwrap_or_else(|| status.to_string())
}

fn contents_url(options: &GithubOptions) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        GITHUB_API_BASE,
        options.owner,
        options.repository,
        options.path.trim_start_matches('/')
    )
}

/// Content source backed by the GitHub contents API
pub struct GithubContentSource {
    client: reqwest::Client,
    url: String,
    branch: Option<String>,
    location: String,
}

impl GithubContentSource {
    /// Build a source for the file the options point at.
    ///
    /// Fails with [`Error::Construction`] when the client cannot be built
    /// from the supplied credential material.
    pub fn new(options: &GithubOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(RAW_MEDIA_TYPE));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", options.token))
            .map_err(|_| Error::construction("github token contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .user_agent(concat!("remoteconf-github/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|err| Error::construction(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            url: contents_url(options),
            branch: options.branch.clone(),
            location: format!("{}/{}:{}", options.owner, options.repository, options.path),
        })
    }
}

#[async_trait]
impl ContentSource for GithubContentSource {
    async fn fetch(&self, _key: &str) -> Result<Fetched> {
        let mut request = self.client.get(&self.url);
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|err| Error::fetch(PROVIDER_ID, format!("request failed: {err}")))?;

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(Error::not_found(PROVIDER_ID, self.location.clone()));
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::auth(PROVIDER_ID, api_error_message(response).await));
            }
            _ => {
                return Err(Error::fetch(PROVIDER_ID, api_error_message(response).await));
            }
        }

        let token = response
            .headers()
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(|etag| ValidationToken::Etag(etag.to_string()));

        let value = response
            .bytes()
            .await
            .map_err(|err| Error::fetch(PROVIDER_ID, format!("failed to read body: {err}")))?
            .to_vec();

        debug!("fetched {} ({} bytes)", self.location, value.len());

        Ok(Fetched { value, token })
    }
}

/// Manager binding one validated [`GithubOptions`] to a content source
pub struct GithubConfigManager {
    source: Arc<dyn ContentSource>,
    settings: PollSettings,
}

impl GithubConfigManager {
    /// Build a manager against the real contents API
    pub fn new(options: &GithubOptions) -> Result<Self> {
        let source = GithubContentSource::new(options)?;
        let interval = options.polling_interval_secs.map(Duration::from_secs);
        Ok(Self::from_source(
            Arc::new(source),
            PollSettings::with_interval(interval),
        ))
    }

    /// Build a manager over any content source (custom transports, tests)
    pub fn from_source(source: Arc<dyn ContentSource>, settings: PollSettings) -> Self {
        Self { source, settings }
    }
}

#[async_trait]
impl ConfigManager for GithubConfigManager {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        // Already bound to a path via options; the host's key is accepted
        // for contract shape only
        self.source.fetch(key).await.map(|fetched| fetched.value)
    }

    fn watch(&self, key: &str, stop: StopReceiver) -> SnapshotStream {
        watch_source(Arc::clone(&self.source), key, self.settings, stop)
    }
}

/// Factory creating [`GithubConfigManager`] values from type-erased options
pub struct GithubFactory;

impl ManagerFactory for GithubFactory {
    fn create(&self, options: &dyn ProviderOptions) -> Result<Arc<dyn ConfigManager>> {
        let options = options
            .as_any()
            .downcast_ref::<GithubOptions>()
            .ok_or_else(|| Error::type_mismatch(PROVIDER_ID, "GithubOptions"))?;

        Ok(Arc::new(GithubConfigManager::new(options)?))
    }
}

/// Register the GitHub provider in the given registry
pub fn register(registry: &ProviderRegistry, options: GithubOptions) -> Result<()> {
    registry.register(PROVIDER_ID, &options, Arc::new(GithubFactory))
}

/// Register the GitHub provider in the process-wide registry
pub fn register_github_provider(options: GithubOptions) -> Result<()> {
    registry::register_provider(PROVIDER_ID, &options, Arc::new(GithubFactory))
}

/// Set the process-wide GitHub provider.
///
/// Retained for callers of the pre-registry API.
#[deprecated(note = "use register_github_provider instead")]
pub fn set_options(options: GithubOptions) -> Result<()> {
    register_github_provider(options)
}
