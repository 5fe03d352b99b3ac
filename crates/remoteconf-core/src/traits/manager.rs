// # Config Manager Trait
//
// Defines the contract every backend manager exposes to the registry and
// the host bridge:
//
// 1. **get()**: one synchronous fetch of the current remote content
// 2. **watch()**: a stream of snapshots driven by a background polling loop
//
// ## Usage
//
// ```rust,ignore
// use remoteconf_core::{ConfigManager, stop_channel};
// use tokio_stream::StreamExt;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let manager = /* ConfigManager implementation */;
//
//     // One-shot read
//     let bytes = manager.get("config.yaml").await?;
//
//     // Watch for changes
//     let (stop_tx, stop_rx) = stop_channel();
//     let mut snapshots = manager.watch("config.yaml", stop_rx);
//     while let Some(snapshot) = snapshots.next().await {
//         println!("snapshot: {:?}", snapshot);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::Stream;

use crate::error::{Error, Result};
use crate::traits::ProviderOptions;

/// One immutable fetch result emitted on a watch stream.
///
/// Exactly one of `value` and `error` is set. A snapshot always carries the
/// full content of the watched object at the time it was retrieved, never a
/// partial or merged state.
#[derive(Debug)]
pub struct Snapshot {
    /// Full content of the watched object
    pub value: Option<Vec<u8>>,
    /// Cause of a failed fetch
    pub error: Option<Error>,
}

impl Snapshot {
    /// Snapshot for content that changed since the last emission
    pub fn changed(value: Vec<u8>) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// Snapshot carrying a failed fetch
    pub fn failed(error: Error) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }

    /// Whether this snapshot carries an error rather than content
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Stream of snapshots returned by [`ConfigManager::watch`]
pub type SnapshotStream = Pin<Box<dyn Stream<Item = Snapshot> + Send + 'static>>;

/// Sending half of a watch cancellation channel
pub type StopSender = mpsc::Sender<bool>;

/// Receiving half of a watch cancellation channel
pub type StopReceiver = mpsc::Receiver<bool>;

/// Create a cancellation channel for a watch loop.
///
/// The channel is buffered so a canceller whose worker has already exited
/// gets an immediate error instead of blocking forever.
pub fn stop_channel() -> (StopSender, StopReceiver) {
    mpsc::channel(1)
}

/// Trait for backend manager implementations
///
/// A manager is bound to one validated options value and one remote content
/// source. The registry owns one instance per registered provider id and
/// hands out shared references; managers must therefore be thread-safe.
///
/// # Cancellation
///
/// Watching is cancelled cooperatively: the loop checks the stop channel
/// between fetch cycles, so an in-flight fetch is never preempted. Dropping
/// the stop sender cancels too.
#[async_trait]
pub trait ConfigManager: Send + Sync {
    /// Fetch the current remote content once.
    ///
    /// The manager is already bound to a path via its options; `key` is
    /// accepted for contract shape and may be ignored. Errors are returned
    /// directly and never retried internally.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Start a background polling loop and return its snapshot stream.
    ///
    /// The loop fetches immediately, emits the first result unconditionally,
    /// then emits a snapshot per detected change until `stop` is signalled.
    /// Each call spawns one long-lived worker; callers re-watching the same
    /// manager must cancel the previous loop or workers accumulate.
    fn watch(&self, key: &str, stop: StopReceiver) -> SnapshotStream;
}

impl std::fmt::Debug for dyn ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ConfigManager")
    }
}

/// Helper trait for constructing managers from options
///
/// Factories are registered together with the manager they produced so a
/// provider id can be re-registered later with fresh options.
pub trait ManagerFactory: Send + Sync {
    /// Create a manager from validated options.
    ///
    /// Typed factories downcast `options` to their concrete options type
    /// and fail with [`Error::TypeMismatch`] on a wrong type. Construction
    /// failures (bad credential format, unreachable auth endpoint) surface
    /// as [`Error::Construction`].
    fn create(&self, options: &dyn ProviderOptions) -> Result<Arc<dyn ConfigManager>>;
}
