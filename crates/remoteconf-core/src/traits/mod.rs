//! Core traits for the remote configuration system
//!
//! This module defines the abstract interfaces that all backends must follow.
//!
//! - [`ContentSource`]: Read one remote object together with its validation token
//! - [`ConfigManager`]: Fetch + watch contract every backend manager exposes
//! - [`ProviderOptions`]: Per-backend configuration with a self-check
//! - [`ManagerFactory`]: Build a manager from validated options

pub mod manager;
pub mod options;
pub mod source;

pub use manager::{
    ConfigManager, ManagerFactory, Snapshot, SnapshotStream, StopReceiver, StopSender,
    stop_channel,
};
pub use options::ProviderOptions;
pub use source::{ContentSource, Fetched, ValidationToken};
