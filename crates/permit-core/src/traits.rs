//! Repository traits for override storage.
//!
//! The resolver never fetches data. Whatever persists overrides (a database,
//! a TOML file, an in-memory map in tests) implements `OverrideStore` and is
//! injected into the `Authorizer`, which reads a snapshot and hands it to
//! the pure resolver.

use permit_contracts::{
    error::PermitResult,
    overrides::{OverrideEntry, OverrideSnapshot, OverrideState},
    role::{Actor, Role, UserId},
};

use crate::resolver::OverrideIndex;

/// Read side of override storage.
///
/// Implementations must return at most one entry per capability in each
/// list. Reads should be cheap; the authorizer calls them on every check.
pub trait OverrideStore: Send + Sync {
    /// All role-level overrides recorded for `role`.
    fn role_overrides(&self, role: Role) -> PermitResult<Vec<OverrideEntry>>;

    /// All user-level overrides recorded for `user_id`.
    fn user_overrides(&self, user_id: &UserId) -> PermitResult<Vec<OverrideEntry>>;

    /// Read both lists for `actor` as one consistent input.
    ///
    /// The default reads them one after the other. Stores that can read both
    /// under a single lock or transaction should override this.
    fn snapshot(&self, actor: &Actor) -> PermitResult<OverrideSnapshot> {
        let role_overrides = self.role_overrides(actor.role)?;
        let user_overrides = self.user_overrides(&actor.user_id)?;
        Ok(OverrideSnapshot::new(role_overrides, user_overrides))
    }

    /// The override state recorded for one (role, capability) pair.
    ///
    /// Reads the list through `OverrideIndex`, so a store that breaks the
    /// one-entry-per-capability contract reports the same state the
    /// resolver acts on.
    fn role_override_state(&self, role: Role, capability: &str) -> PermitResult<OverrideState> {
        let entries = self.role_overrides(role)?;
        Ok(OverrideIndex::build(&entries).state(capability))
    }

    /// The override state recorded for one (user, capability) pair.
    fn user_override_state(&self, user_id: &UserId, capability: &str) -> PermitResult<OverrideState> {
        let entries = self.user_overrides(user_id)?;
        Ok(OverrideIndex::build(&entries).state(capability))
    }
}

/// Write side of override storage.
///
/// `Grant` and `Deny` upsert the record for the key; `Inherit` deletes it.
/// Implementations reject capability codes that are not registered.
pub trait OverrideWriter: Send + Sync {
    fn set_role_override(&self, role: Role, capability: &str, state: OverrideState) -> PermitResult<()>;

    fn set_user_override(&self, user_id: &UserId, capability: &str, state: OverrideState) -> PermitResult<()>;
}
