//! # permit-core
//!
//! The layered permission resolution engine.
//!
//! This crate provides:
//! - The compiled-in capability `registry` and the per-role `defaults`
//! - The pure `resolver` (`resolve`, `explain`, `resolve_all`)
//! - The `OverrideStore` / `OverrideWriter` repository traits
//! - The `Authorizer` that reads a store snapshot and resolves against it
//!
//! ## Usage
//!
//! ```rust,ignore
//! use permit_core::{resolver, validate};
//! use permit_contracts::{overrides::OverrideEntry, role::Role};
//!
//! validate()?;
//! let allowed = resolver::resolve(
//!     "create:risk",
//!     Role::Viewer,
//!     &[OverrideEntry::grant("create:risk")],
//!     &[],
//! );
//! ```

pub mod authorizer;
pub mod defaults;
pub mod registry;
pub mod resolver;
pub mod traits;

pub use authorizer::Authorizer;
pub use resolver::{explain, resolve, resolve_all, GrantSource, Resolution, Resolver};

use permit_contracts::error::PermitResult;

/// Validate the registry and the default grant table together.
///
/// Call once at process start. A failure means the compiled-in policy is
/// inconsistent and the process should not serve authorization checks.
pub fn validate() -> PermitResult<()> {
    registry::validate_registry()?;
    defaults::validate_defaults()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
