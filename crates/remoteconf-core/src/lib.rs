// # remoteconf-core
//
// Core library for sourcing application configuration from remote,
// versioned stores.
//
// ## Architecture Overview
//
// - **ContentSource**: Trait for reading one remote object plus its
//   validation token (ETag, last-modified)
// - **ConfigManager**: Fetch + watch contract every backend exposes
// - **ProviderRegistry**: Concurrency-safe table from provider id to its
//   constructed manager
// - **Polling engine**: Token-based change detection emitting immutable
//   snapshots on a stream
// - **RemoteConfigBridge**: Adapter translating manager streams and stop
//   channels into the host configuration library's contract
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The polling engine owns scheduling and
//    change detection; sources perform exactly one remote call per fetch
// 2. **Plugin-Based**: Backends are registered dynamically, no hard-coded
//    dispatch in the bridge
// 3. **Library-First**: Isolated registries and bridges can be constructed
//    for embedding and tests; the process-wide registry is a convenience
// 4. **Best-Effort Cancellation**: Watch loops stop cooperatively between
//    fetches, never preempting an in-flight remote call

pub mod bridge;
pub mod error;
pub mod poll;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use bridge::{
    LegacyBackend, LegacyManagerFactory, ProviderDescriptor, RemoteConfigBridge, RemoteResponse,
};
pub use error::{Error, Result};
pub use poll::{PollSettings, watch_source};
pub use registry::ProviderRegistry;
pub use traits::{
    ConfigManager, ContentSource, Fetched, ManagerFactory, ProviderOptions, Snapshot,
    SnapshotStream, StopReceiver, StopSender, ValidationToken, stop_channel,
};
