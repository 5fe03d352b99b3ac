//! Provider registry
//!
//! The registry maps a provider identifier to the backend manager built for
//! it, so the host bridge can resolve managers dynamically instead of
//! dispatching through hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use remoteconf_core::registry::ProviderRegistry;
//!
//! // Create a registry
//! let registry = ProviderRegistry::new();
//!
//! // Register a provider: options are validated, the factory builds the
//! // manager, and the registration is stored under the id
//! registry.register("github", &options, Arc::new(GithubFactory))?;
//!
//! // Resolve the manager later
//! let manager = registry.manager("github")?;
//! ```
//!
//! ## Registration
//!
//! Backend crates should expose a `register()` convenience that supplies
//! their own factory:
//!
//! ```rust,ignore
//! // In the remoteconf-provider-github crate
//! pub fn register(registry: &ProviderRegistry, options: GithubOptions) -> Result<()> {
//!     registry.register("github", &options, Arc::new(GithubFactory))
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{Error, Result};
use crate::traits::{ConfigManager, ManagerFactory, ProviderOptions};

/// A stored registration: the factory that built the manager and the
/// manager it built.
struct Registration {
    #[allow(dead_code)] // kept so an id can be rebuilt with fresh options
    factory: Arc<dyn ManagerFactory>,
    manager: Arc<dyn ConfigManager>,
}

/// Registry from provider identifier to its constructed manager
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes. Validation and manager construction happen
/// outside the lock; only the final insert is exclusive with concurrent
/// lookups, so readers never observe a partially-constructed entry.
///
/// ## Lifecycle
///
/// Entries are created by [`register`](ProviderRegistry::register),
/// replaced when the same id is registered again, and live for the life of
/// the registry. There is no teardown API; watch stop channels are the only
/// mechanism to end background work early.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, Registration>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate options, build the manager, and store the registration.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the options self-check fails; the factory
    ///   is never invoked
    /// - [`Error::TypeMismatch`] if the factory rejects the concrete
    ///   options type
    /// - [`Error::Construction`] if the factory cannot build a manager
    ///
    /// In every error case nothing is stored and any prior registration
    /// for the id is left untouched.
    pub fn register(
        &self,
        id: impl Into<String>,
        options: &dyn ProviderOptions,
        factory: Arc<dyn ManagerFactory>,
    ) -> Result<()> {
        let id = id.into();

        options.validate()?;

        // Construction can be slow (client setup, auth probes); keep it
        // outside the lock.
        let manager = factory.create(options).map_err(|err| match err {
            err @ (Error::TypeMismatch { .. } | Error::Construction(_)) => err,
            other => Error::construction(other.to_string()),
        })?;

        let mut providers = self.providers.write().unwrap();
        providers.insert(id, Registration { factory, manager });

        Ok(())
    }

    /// Check if a provider id is registered
    pub fn is_registered(&self, id: &str) -> bool {
        let providers = self.providers.read().unwrap();
        providers.contains_key(id)
    }

    /// Return the manager stored for a provider id
    ///
    /// # Errors
    ///
    /// [`Error::NotRegistered`] if the id has no registration.
    pub fn manager(&self, id: &str) -> Result<Arc<dyn ConfigManager>> {
        let providers = self.providers.read().unwrap();

        providers
            .get(id)
            .map(|registration| Arc::clone(&registration.manager))
            .ok_or_else(|| Error::not_registered(id))
    }

    /// List all registered provider ids
    pub fn providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap();
        providers.keys().cloned().collect()
    }
}

/// The process-wide registry behind the package-level convenience functions.
///
/// Application code populates it at startup via `register_provider` and the
/// backend crates' `register_*_provider` wrappers; the default
/// [`RemoteConfigBridge`](crate::bridge::RemoteConfigBridge) reads it for
/// the life of the process. Tests should construct isolated
/// [`ProviderRegistry`] values instead.
pub fn global() -> Arc<ProviderRegistry> {
    static GLOBAL: OnceLock<Arc<ProviderRegistry>> = OnceLock::new();
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(ProviderRegistry::new())))
}

/// Register a provider in the process-wide registry
pub fn register_provider(
    id: impl Into<String>,
    options: &dyn ProviderOptions,
    factory: Arc<dyn ManagerFactory>,
) -> Result<()> {
    global().register(id, options, factory)
}

/// Check membership in the process-wide registry
pub fn is_registered(id: &str) -> bool {
    global().is_registered(id)
}

/// Resolve a manager from the process-wide registry
pub fn manager(id: &str) -> Result<Arc<dyn ConfigManager>> {
    global().manager(id)
}
