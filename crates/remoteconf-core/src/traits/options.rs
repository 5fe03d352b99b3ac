// # Provider Options Trait
//
// Per-backend configuration record with a self-check. The registry calls
// `validate()` exactly once, synchronously, before any manager is
// constructed; a failed check aborts registration without building a client
// or spawning a task.

use std::any::Any;

use crate::error::Result;

/// Backend-specific configuration, checked before a manager is built.
pub trait ProviderOptions: Any + Send + Sync {
    /// Reject options missing any field the backend needs to authenticate
    /// and locate a unique object (non-empty identifiers, at least one
    /// credential form). Pure check, no side effects.
    fn validate(&self) -> Result<()>;

    /// Downcast support for typed convenience wrappers.
    fn as_any(&self) -> &dyn Any;
}
