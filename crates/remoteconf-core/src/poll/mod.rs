//! Change-detection polling engine
//!
//! One watch call spawns one long-lived loop that fetches the remote object
//! on a fixed interval and emits a snapshot only when the store's validation
//! token moved. Token equality is the sole change signal: two payloads
//! sharing a token count as unchanged, and content is never hashed.
//!
//! ## State machine
//!
//! ```text
//!  Idle ──tick──▶ Fetching ──▶ Changed   (emit, store token)
//!                     │
//!                     ├───────▶ Unchanged (emit nothing)
//!                     │
//!                     └───────▶ Failed    (emit error, keep token, backoff)
//!
//!  stop signal at any select point ──▶ terminate
//! ```
//!
//! The first fetch runs immediately and its result is emitted
//! unconditionally so consumers always receive an initial value.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::traits::{ContentSource, Snapshot, SnapshotStream, StopReceiver, ValidationToken};

/// Default polling interval applied when options leave it unset or zero
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Fixed delay after a failed fetch, so a broken remote is not hammered
const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Capacity of the snapshot channel handed to watchers
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Polling knobs shared by backend managers
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Fixed tick interval between fetches
    pub interval: Duration,
    /// Extra delay after a failed fetch
    pub error_backoff: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            error_backoff: DEFAULT_ERROR_BACKOFF,
        }
    }
}

impl PollSettings {
    /// Settings with the given interval; `None` or zero falls back to the
    /// 60 second default.
    pub fn with_interval(interval: Option<Duration>) -> Self {
        let mut settings = Self::default();
        if let Some(interval) = interval
            && !interval.is_zero()
        {
            settings.interval = interval;
        }
        settings
    }
}

/// Spawn the polling loop for one watched key and return its stream.
///
/// The loop runs until `stop` receives a message or its sender drops, or
/// until the returned stream is dropped. The stream is abandoned on
/// termination, not explicitly closed. Snapshots are emitted in fetch order;
/// the stored validation token is owned by the loop and never shared.
pub fn watch_source(
    source: Arc<dyn ContentSource>,
    key: impl Into<String>,
    settings: PollSettings,
    mut stop: StopReceiver,
) -> SnapshotStream {
    let key = key.into();
    let (tx, rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        debug!(
            "starting poll loop for {} (interval={:?})",
            key, settings.interval
        );

        // The first tick completes immediately, which doubles as the
        // unconditional initial fetch.
        let mut ticker = interval(settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_token: Option<ValidationToken> = None;
        let mut initial = true;

        loop {
            tokio::select! {
                _ = stop.recv() => {
                    debug!("poll loop for {} cancelled", key);
                    return;
                }
                _ = ticker.tick() => {
                    match source.fetch(&key).await {
                        Ok(fetched) => {
                            if initial || token_changed(&last_token, &fetched.token) {
                                debug!("content changed for {} (token={:?})", key, fetched.token);
                                last_token = fetched.token;
                                if tx.send(Snapshot::changed(fetched.value)).await.is_err() {
                                    debug!("receiver dropped, stopping poll loop for {}", key);
                                    return;
                                }
                            }
                            initial = false;
                        }
                        Err(err) => {
                            warn!("fetch failed for {}: {}", key, err);
                            if tx.send(Snapshot::failed(err)).await.is_err() {
                                return;
                            }
                            // The ticker is not reset; with Skip behavior the
                            // ticks elapsed during the backoff coalesce into
                            // one instead of firing back to back.
                            tokio::time::sleep(settings.error_backoff).await;
                        }
                    }
                }
            }
        }
    });

    Box::pin(ReceiverStream::new(rx))
}

/// Whether a fresh token signals a content change.
///
/// A source that reports no comparator gives us nothing to compare against;
/// such fetches count as unchanged after the initial emission.
fn token_changed(stored: &Option<ValidationToken>, fresh: &Option<ValidationToken>) -> bool {
    match (stored, fresh) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(stored), Some(fresh)) => stored != fresh,
    }
}
