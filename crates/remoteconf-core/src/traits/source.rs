// # Content Source Trait
//
// Defines the interface for reading one remote object.
//
// A content source is the seam between the polling engine and a concrete
// remote store SDK (repository contents API, object storage). One fetch
// returns the full content of the configured object plus the store's cheap
// change comparator (ETag header, last-modified stamp), since both arrive
// in the same response.
//
// ## Implementations
//
// - GitHub contents API: `remoteconf-provider-github` crate
// - Future: S3, GCS
//
// Tests drive the polling engine with scripted in-memory sources.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque comparator used to decide whether remote content changed.
///
/// Tokens are compared for equality only. They are never interpreted and
/// never persisted across process restarts; every watch starts with a fresh
/// fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationToken {
    /// HTTP entity tag as returned by the remote store
    Etag(String),
    /// Last-modified instant of the remote object
    LastModified(DateTime<Utc>),
}

/// The result of one remote read: full content plus its validation token.
///
/// `token` is `None` when the store reported no comparator for this read;
/// the polling engine then treats the content as unchanged.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Raw content of the remote object
    pub value: Vec<u8>,
    /// Change comparator reported alongside the content
    pub token: Option<ValidationToken>,
}

/// Trait for remote content source implementations
///
/// Implementations must be thread-safe and usable across async tasks. They
/// perform exactly one remote call per `fetch` and own no retry or backoff
/// logic; scheduling is owned by the polling engine.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Read the configured remote object once.
    ///
    /// `key` is the path the host asked for; sources already bound to a
    /// path via their options may ignore it.
    async fn fetch(&self, key: &str) -> Result<Fetched>;
}
