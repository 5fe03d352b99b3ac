//! Host-facing bridge
//!
//! The host configuration library knows nothing about backend managers; it
//! hands every call a provider descriptor and expects three operations:
//! a one-shot `get`, a one-shot `watch`, and a continuous `watch_channel`
//! returning a response stream plus a cancellation channel.
//!
//! The bridge resolves the descriptor's provider id against the registry,
//! falling back to a small closed set of legacy well-known backends, and
//! translates between the manager's snapshot stream and the channel shapes
//! the host demands. Manager-internal cancellation and response types never
//! leak into the host contract.

use std::io::Cursor;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::{self, ProviderRegistry};
use crate::traits::{ConfigManager, Snapshot, StopSender, stop_channel};

/// Capacity of the response channel handed to the host
const RESPONSE_CHANNEL_CAPACITY: usize = 16;

/// Response shape consumed by the host configuration library
///
/// Snapshots map onto this verbatim: exactly one of `value` and `error`
/// is set.
#[derive(Debug)]
pub struct RemoteResponse {
    /// Full content of the watched object
    pub value: Option<Vec<u8>>,
    /// Cause of a failed fetch or resolution
    pub error: Option<Error>,
}

impl From<Snapshot> for RemoteResponse {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            value: snapshot.value,
            error: snapshot.error,
        }
    }
}

/// Descriptor the host passes to every remote-provider call
pub trait ProviderDescriptor: Send + Sync {
    /// Provider id, used to resolve a manager
    fn provider(&self) -> &str;
    /// Endpoint list, `;`-separated (legacy backends only)
    fn endpoint(&self) -> &str;
    /// Path of the watched object
    fn path(&self) -> &str;
    /// Optional secret keyring file (legacy backends only)
    fn secret_keyring(&self) -> &str;
}

/// Well-known backend kinds kept for backward compatibility
///
/// These predate the registry and are resolved by name once per call,
/// never extended. Unknown names fall back to [`Consul`](Self::Consul),
/// matching the historical dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyBackend {
    Etcd,
    #[serde(rename = "etcd3")]
    EtcdV3,
    Firestore,
    Nats,
    Consul,
}

impl LegacyBackend {
    /// Resolve a provider name to a legacy backend kind
    pub fn from_name(name: &str) -> Self {
        match name {
            "etcd" => Self::Etcd,
            "etcd3" => Self::EtcdV3,
            "firestore" => Self::Firestore,
            "nats" => Self::Nats,
            _ => Self::Consul,
        }
    }
}

/// Builds managers for the legacy backends
///
/// Implemented outside this crate by whoever still links the legacy store
/// SDKs; the bridge only supplies the descriptor's endpoint list and
/// optional keyring file. Legacy managers are constructed ad hoc per call
/// and are not stored in the registry.
pub trait LegacyManagerFactory: Send + Sync {
    /// Create a manager for one legacy backend kind
    fn create(
        &self,
        backend: LegacyBackend,
        endpoints: &[String],
        secret_keyring: Option<&str>,
    ) -> Result<Arc<dyn ConfigManager>>;
}

/// Bridge between the registry's managers and the host contract
pub struct RemoteConfigBridge {
    registry: Arc<ProviderRegistry>,
    legacy: Option<Arc<dyn LegacyManagerFactory>>,
}

impl RemoteConfigBridge {
    /// Bridge over the process-wide registry
    pub fn new() -> Self {
        Self::with_registry(registry::global())
    }

    /// Bridge over an explicit registry (isolated registries in tests)
    pub fn with_registry(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            legacy: None,
        }
    }

    /// Attach a factory for the legacy well-known backends
    pub fn with_legacy_factory(mut self, factory: Arc<dyn LegacyManagerFactory>) -> Self {
        self.legacy = Some(factory);
        self
    }

    /// One-shot fetch of the descriptor's path, wrapped as a byte reader
    pub async fn get(&self, rp: &dyn ProviderDescriptor) -> Result<Cursor<Vec<u8>>> {
        let manager = self.resolve(rp)?;
        let value = manager.get(rp.path()).await?;
        Ok(Cursor::new(value))
    }

    /// One-shot read behind the host's `Watch` entry point.
    ///
    /// The host re-invokes this itself on its own schedule; continuous
    /// change notification goes through [`watch_channel`](Self::watch_channel).
    pub async fn watch(&self, rp: &dyn ProviderDescriptor) -> Result<Cursor<Vec<u8>>> {
        self.get(rp).await
    }

    /// Start a continuous watch and return the host-shaped channel pair.
    ///
    /// On resolution failure the response channel carries exactly one
    /// error response and is then abandoned; the returned stop sender has
    /// no receiver, so a cancel attempt fails fast instead of hanging.
    ///
    /// On success a forwarding worker maps every snapshot into a
    /// [`RemoteResponse`] and, when the host signals (or drops) the stop
    /// channel, forwards the cancellation to the manager's own stop channel
    /// and terminates.
    pub fn watch_channel(
        &self,
        rp: &dyn ProviderDescriptor,
    ) -> (mpsc::Receiver<RemoteResponse>, StopSender) {
        let manager = match self.resolve(rp) {
            Ok(manager) => manager,
            Err(err) => {
                let (tx, rx) = mpsc::channel(1);
                let _ = tx.try_send(RemoteResponse {
                    value: None,
                    error: Some(err),
                });
                let (stop_tx, _) = stop_channel();
                return (rx, stop_tx);
            }
        };

        let (host_stop_tx, mut host_stop_rx) = stop_channel();
        let (manager_stop_tx, manager_stop_rx) = stop_channel();
        let (response_tx, response_rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);

        let mut snapshots = manager.watch(rp.path(), manager_stop_rx);
        let key = rp.path().to_string();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = host_stop_rx.recv() => {
                        debug!("host cancelled watch for {}", key);
                        let _ = manager_stop_tx.send(true).await;
                        return;
                    }
                    snapshot = snapshots.next() => {
                        let Some(snapshot) = snapshot else {
                            return;
                        };
                        if response_tx.send(snapshot.into()).await.is_err() {
                            let _ = manager_stop_tx.send(true).await;
                            return;
                        }
                    }
                }
            }
        });

        (response_rx, host_stop_tx)
    }

    /// Resolve a manager for the descriptor's provider id.
    ///
    /// Registry first; legacy fallback second; [`Error::NotRegistered`]
    /// when neither applies.
    fn resolve(&self, rp: &dyn ProviderDescriptor) -> Result<Arc<dyn ConfigManager>> {
        let name = rp.provider();

        if self.registry.is_registered(name) {
            return self.registry.manager(name);
        }

        let Some(legacy) = &self.legacy else {
            return Err(Error::not_registered(name));
        };

        let endpoints: Vec<String> = rp
            .endpoint()
            .split(';')
            .filter(|endpoint| !endpoint.is_empty())
            .map(str::to_string)
            .collect();
        let keyring = rp.secret_keyring();
        let keyring = (!keyring.is_empty()).then_some(keyring);

        legacy.create(LegacyBackend::from_name(name), &endpoints, keyring)
    }
}

impl Default for RemoteConfigBridge {
    fn default() -> Self {
        Self::new()
    }
}
