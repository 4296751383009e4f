//! The authorizer: store-backed entry point for authorization checks.
//!
//! Every call follows the same sequence:
//!
//!   Actor → OverrideStore::snapshot → Resolver → answer
//!
//! The store is read once per call and the resolver works on that owned
//! snapshot, so a concurrent override write can never be half-applied to a
//! single check.

use tracing::{debug, warn};

use permit_contracts::{
    capability::GrantedSet,
    error::{PermitError, PermitResult},
    overrides::OverrideSnapshot,
    role::Actor,
};

use crate::{
    resolver::{Resolution, Resolver},
    traits::OverrideStore,
};

/// Answers capability questions for actors using an injected override store.
///
/// Construct one at startup and share it; it holds no per-request state.
pub struct Authorizer {
    store: Box<dyn OverrideStore>,
}

impl Authorizer {
    pub fn new(store: Box<dyn OverrideStore>) -> Self {
        Self { store }
    }

    /// Read the override snapshot for `actor` from the store.
    pub fn snapshot(&self, actor: &Actor) -> PermitResult<OverrideSnapshot> {
        self.store.snapshot(actor)
    }

    /// Resolve `capability` for `actor`, reporting which layer decided.
    pub fn explain(&self, actor: &Actor, capability: &str) -> PermitResult<Resolution> {
        let snapshot = self.snapshot(actor)?;
        let resolution = Resolver::from_snapshot(actor.role, &snapshot).explain(capability);

        debug!(
            user_id = %actor.user_id,
            role = %actor.role,
            capability = %capability,
            granted = resolution.granted,
            source = ?resolution.source,
            taken_at = %snapshot.taken_at,
            "capability resolved"
        );

        Ok(resolution)
    }

    /// Return true if `actor` holds `capability`.
    pub fn check(&self, actor: &Actor, capability: &str) -> PermitResult<bool> {
        Ok(self.explain(actor, capability)?.granted)
    }

    /// Succeed only if `actor` holds `capability`.
    ///
    /// Intended for request middleware: a denial becomes
    /// `PermitError::AccessDenied`, which the caller maps to its own
    /// forbidden response.
    pub fn require(&self, actor: &Actor, capability: &str) -> PermitResult<()> {
        if self.check(actor, capability)? {
            return Ok(());
        }

        warn!(
            user_id = %actor.user_id,
            role = %actor.role,
            capability = %capability,
            "access denied"
        );

        Err(PermitError::AccessDenied {
            capability: capability.to_string(),
            user_id: actor.user_id.0.clone(),
        })
    }

    /// Every registered capability `actor` holds, e.g. to gate a navigation menu.
    pub fn granted(&self, actor: &Actor) -> PermitResult<GrantedSet> {
        let snapshot = self.snapshot(actor)?;
        debug!(
            user_id = %actor.user_id,
            role = %actor.role,
            taken_at = %snapshot.taken_at,
            "resolving capability set"
        );
        Ok(Resolver::from_snapshot(actor.role, &snapshot).granted())
    }
}
