//! Test doubles and common utilities for contract tests
//!
//! Scripted sources and managers drive the polling engine and the bridge
//! without any real remote store.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use remoteconf_core::error::{Error, Result};
use remoteconf_core::traits::{
    ConfigManager, ContentSource, Fetched, ManagerFactory, ProviderOptions, Snapshot,
    SnapshotStream, StopReceiver, ValidationToken,
};
use remoteconf_core::{PollSettings, ProviderDescriptor, watch_source};

/// One step of a scripted fetch sequence
#[derive(Debug, Clone)]
pub enum FetchStep {
    /// Successful fetch with the given payload and optional ETag
    Content {
        value: &'static [u8],
        etag: Option<&'static str>,
    },
    /// Failed fetch
    Failure(&'static str),
}

impl FetchStep {
    fn run(&self) -> Result<Fetched> {
        match self {
            FetchStep::Content { value, etag } => Ok(Fetched {
                value: value.to_vec(),
                token: etag.map(|etag| ValidationToken::Etag(etag.to_string())),
            }),
            FetchStep::Failure(message) => Err(Error::fetch("scripted", *message)),
        }
    }
}

/// A content source that replays a fixed script, repeating the last step
/// once the script is exhausted
pub struct ScriptedSource {
    steps: Mutex<VecDeque<FetchStep>>,
    last: Mutex<Option<FetchStep>>,
    fetch_count: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(steps: impl IntoIterator<Item = FetchStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(None),
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// Source that always returns the same content and token
    pub fn constant(value: &'static [u8], etag: &'static str) -> Self {
        Self::new([FetchStep::Content {
            value,
            etag: Some(etag),
        }])
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch(&self, _key: &str) -> Result<Fetched> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let step = {
            let mut steps = self.steps.lock().unwrap();
            match steps.pop_front() {
                Some(step) => {
                    *self.last.lock().unwrap() = Some(step.clone());
                    step
                }
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .expect("scripted source has no steps"),
            }
        };

        step.run()
    }
}

/// A content source whose token moves on every fetch
pub struct EverChangingSource {
    fetch_count: AtomicUsize,
}

impl EverChangingSource {
    pub fn new() -> Self {
        Self {
            fetch_count: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for EverChangingSource {
    async fn fetch(&self, _key: &str) -> Result<Fetched> {
        let n = self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(Fetched {
            value: format!("rev-{n}").into_bytes(),
            token: Some(ValidationToken::Etag(format!("\"{n}\""))),
        })
    }
}

/// A manager polling a scripted source; `get` returns the next script step
pub struct ScriptedManager {
    source: Arc<ScriptedSource>,
    settings: PollSettings,
}

impl ScriptedManager {
    pub fn new(source: Arc<ScriptedSource>, settings: PollSettings) -> Self {
        Self { source, settings }
    }
}

#[async_trait]
impl ConfigManager for ScriptedManager {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.source.fetch(key).await.map(|fetched| fetched.value)
    }

    fn watch(&self, key: &str, stop: StopReceiver) -> SnapshotStream {
        watch_source(
            Arc::clone(&self.source) as Arc<dyn ContentSource>,
            key,
            self.settings,
            stop,
        )
    }
}

/// A manager returning fixed bytes; watch never emits
pub struct ByteManager {
    value: &'static [u8],
}

impl ByteManager {
    pub fn new(value: &'static [u8]) -> Self {
        Self { value }
    }
}

#[async_trait]
impl ConfigManager for ByteManager {
    async fn get(&self, _key: &str) -> Result<Vec<u8>> {
        Ok(self.value.to_vec())
    }

    fn watch(&self, _key: &str, _stop: StopReceiver) -> SnapshotStream {
        let (_tx, rx) = mpsc::unbounded_channel();
        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

/// A manager whose watch stream is fed by the test; records whether the
/// stop channel fired
pub struct ChannelManager {
    rx: Mutex<Option<mpsc::UnboundedReceiver<Snapshot>>>,
    stop_seen: Arc<AtomicBool>,
}

impl ChannelManager {
    pub fn new() -> (Self, mpsc::UnboundedSender<Snapshot>, Arc<AtomicBool>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop_seen = Arc::new(AtomicBool::new(false));

        let manager = Self {
            rx: Mutex::new(Some(rx)),
            stop_seen: Arc::clone(&stop_seen),
        };

        (manager, tx, stop_seen)
    }
}

#[async_trait]
impl ConfigManager for ChannelManager {
    async fn get(&self, _key: &str) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn watch(&self, _key: &str, mut stop: StopReceiver) -> SnapshotStream {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .expect("watch() can only be called once");

        let stop_seen = Arc::clone(&self.stop_seen);
        tokio::spawn(async move {
            let _ = stop.recv().await;
            stop_seen.store(true, Ordering::SeqCst);
        });

        Box::pin(UnboundedReceiverStream::new(rx))
    }
}

/// Factory handing out a pre-built manager
pub struct FixedFactory {
    manager: Arc<dyn ConfigManager>,
    create_count: Arc<AtomicUsize>,
}

impl FixedFactory {
    pub fn new(manager: Arc<dyn ConfigManager>) -> Self {
        Self {
            manager,
            create_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn create_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.create_count)
    }
}

impl ManagerFactory for FixedFactory {
    fn create(&self, _options: &dyn ProviderOptions) -> Result<Arc<dyn ConfigManager>> {
        self.create_count.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.manager))
    }
}

/// Factory that always fails
pub struct FailingFactory {
    error: fn() -> Error,
}

impl FailingFactory {
    pub fn new(error: fn() -> Error) -> Self {
        Self { error }
    }
}

impl ManagerFactory for FailingFactory {
    fn create(&self, _options: &dyn ProviderOptions) -> Result<Arc<dyn ConfigManager>> {
        Err((self.error)())
    }
}

/// Repository-shaped options used by end-to-end tests
#[derive(Debug, Clone)]
pub struct RepoOptions {
    pub repo: String,
    pub path: String,
    pub token: String,
}

impl RepoOptions {
    pub fn new(repo: &str, path: &str, token: &str) -> Self {
        Self {
            repo: repo.to_string(),
            path: path.to_string(),
            token: token.to_string(),
        }
    }
}

impl ProviderOptions for RepoOptions {
    fn validate(&self) -> Result<()> {
        if self.repo.is_empty() {
            return Err(Error::validation("repo cannot be empty"));
        }
        if self.path.is_empty() {
            return Err(Error::validation("path cannot be empty"));
        }
        if self.token.is_empty() {
            return Err(Error::validation("token cannot be empty"));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Options that never validate
pub struct RejectingOptions;

impl ProviderOptions for RejectingOptions {
    fn validate(&self) -> Result<()> {
        Err(Error::validation("missing required field"))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Minimal host descriptor for bridge tests
pub struct TestDescriptor {
    pub provider: String,
    pub endpoint: String,
    pub path: String,
    pub secret_keyring: String,
}

impl TestDescriptor {
    pub fn new(provider: &str, path: &str) -> Self {
        Self {
            provider: provider.to_string(),
            endpoint: String::new(),
            path: path.to_string(),
            secret_keyring: String::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

impl ProviderDescriptor for TestDescriptor {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn secret_keyring(&self) -> &str {
        &self.secret_keyring
    }
}
