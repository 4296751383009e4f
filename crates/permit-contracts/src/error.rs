//! Error types for the PERMIT workspace.
//!
//! Resolution itself never fails: unknown capabilities resolve to a denial
//! and malformed override entries are dropped. The variants here cover the
//! surrounding concerns: startup validation, configuration loading, store
//! access, and the `Authorizer::require` gate.

use thiserror::Error;

/// The unified error type for the PERMIT crates.
#[derive(Debug, Error)]
pub enum PermitError {
    /// The actor does not hold the capability after all layers were applied.
    #[error("capability '{capability}' is not granted to user '{user_id}'")]
    AccessDenied { capability: String, user_id: String },

    /// A write named a capability code that is not in the registry.
    #[error("unknown capability '{code}'")]
    UnknownCapability { code: String },

    /// A role name did not match any known role.
    #[error("unknown role '{role}'")]
    UnknownRole { role: String },

    /// An override list contained two records for the same key.
    #[error("duplicate override for '{capability}' on {subject}")]
    DuplicateOverride { subject: String, capability: String },

    /// The compiled-in registry or default grant table violates an invariant.
    ///
    /// Raised by startup validation, never during resolution.
    #[error("registry invariant violated: {reason}")]
    RegistryInvalid { reason: String },

    /// The override store could not be read or written.
    #[error("override store error: {reason}")]
    StoreError { reason: String },

    /// A configuration file is missing, unreadable, or malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the PERMIT crates.
pub type PermitResult<T> = Result<T, PermitError>;
