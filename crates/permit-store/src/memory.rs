//! In-memory implementation of `OverrideStore` and `OverrideWriter`.
//!
//! `InMemoryOverrideStore` keeps every override in maps keyed by subject and
//! capability, so upsert-by-key falls out of map insertion and reverting to
//! Inherit is a removal. All state sits behind one `Mutex`; readers receive
//! owned copies and never hold the lock while resolving.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use permit_contracts::{
    capability::CapabilityCode,
    error::{PermitError, PermitResult},
    overrides::{OverrideEntry, OverrideSnapshot, OverrideState, RoleOverride, UserOverride},
    role::{Actor, Role, UserId},
};
use permit_core::{
    registry,
    traits::{OverrideStore, OverrideWriter},
};

type Grants = BTreeMap<CapabilityCode, bool>;

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct InMemoryState {
    pub(crate) roles: BTreeMap<Role, Grants>,
    pub(crate) users: BTreeMap<UserId, Grants>,
}

fn entries(grants: Option<&Grants>) -> Vec<OverrideEntry> {
    grants
        .map(|grants| {
            grants
                .iter()
                .map(|(capability, granted)| OverrideEntry { capability: capability.clone(), granted: *granted })
                .collect()
        })
        .unwrap_or_default()
}

/// Apply `state` to one key: upsert for Grant/Deny, remove for Inherit.
/// Empty per-subject maps are dropped so listings stay clean.
fn apply<K: Ord + Clone>(subjects: &mut BTreeMap<K, Grants>, subject: &K, capability: &str, state: OverrideState) {
    match state.granted() {
        Some(granted) => {
            subjects
                .entry(subject.clone())
                .or_default()
                .insert(CapabilityCode::new(capability), granted);
        }
        None => {
            if let Some(grants) = subjects.get_mut(subject) {
                grants.remove(capability);
                if grants.is_empty() {
                    subjects.remove(subject);
                }
            }
        }
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A mutable, thread-safe override store held entirely in memory.
///
/// Clones share the same underlying state, so an admin handler can write
/// through one clone while an `Authorizer` reads through another.
#[derive(Clone, Default)]
pub struct InMemoryOverrideStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted records, applying them in order.
    ///
    /// A later record for the same key replaces an earlier one.
    pub fn from_records(
        role_overrides: impl IntoIterator<Item = RoleOverride>,
        user_overrides: impl IntoIterator<Item = UserOverride>,
    ) -> PermitResult<Self> {
        let store = Self::new();
        for record in role_overrides {
            let state = OverrideState::from_granted(Some(record.granted));
            store.set_role_override(record.role, record.capability.as_str(), state)?;
        }
        for record in user_overrides {
            let state = OverrideState::from_granted(Some(record.granted));
            store.set_user_override(&record.user_id, record.capability.as_str(), state)?;
        }
        Ok(store)
    }

    fn lock(&self) -> PermitResult<MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| PermitError::StoreError {
            reason: format!("override state lock poisoned: {}", e),
        })
    }

    /// Every role override currently recorded, ordered by role then code.
    pub fn role_records(&self) -> PermitResult<Vec<RoleOverride>> {
        let state = self.lock()?;
        Ok(state
            .roles
            .iter()
            .flat_map(|(role, grants)| {
                grants.iter().map(move |(capability, granted)| RoleOverride {
                    role: *role,
                    capability: capability.clone(),
                    granted: *granted,
                })
            })
            .collect())
    }

    /// Every user override currently recorded, ordered by user then code.
    pub fn user_records(&self) -> PermitResult<Vec<UserOverride>> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .flat_map(|(user_id, grants)| {
                grants.iter().map(move |(capability, granted)| UserOverride {
                    user_id: user_id.clone(),
                    capability: capability.clone(),
                    granted: *granted,
                })
            })
            .collect())
    }

    /// Drop every override recorded for `user_id`, e.g. when the user is
    /// deleted. Returns how many records were removed.
    pub fn remove_user(&self, user_id: &UserId) -> PermitResult<usize> {
        let mut state = self.lock()?;
        let removed = state.users.remove(user_id).map(|grants| grants.len()).unwrap_or(0);

        info!(user_id = %user_id, removed, "user overrides removed");

        Ok(removed)
    }
}

// ── OverrideStore impl ────────────────────────────────────────────────────────

impl OverrideStore for InMemoryOverrideStore {
    fn role_overrides(&self, role: Role) -> PermitResult<Vec<OverrideEntry>> {
        let state = self.lock()?;
        Ok(entries(state.roles.get(&role)))
    }

    fn user_overrides(&self, user_id: &UserId) -> PermitResult<Vec<OverrideEntry>> {
        let state = self.lock()?;
        Ok(entries(state.users.get(user_id)))
    }

    /// Read both lists under a single lock acquisition.
    fn snapshot(&self, actor: &Actor) -> PermitResult<OverrideSnapshot> {
        let state = self.lock()?;
        Ok(OverrideSnapshot::new(
            entries(state.roles.get(&actor.role)),
            entries(state.users.get(&actor.user_id)),
        ))
    }

    fn role_override_state(&self, role: Role, capability: &str) -> PermitResult<OverrideState> {
        let state = self.lock()?;
        let granted = state.roles.get(&role).and_then(|grants| grants.get(capability)).copied();
        Ok(OverrideState::from_granted(granted))
    }

    fn user_override_state(&self, user_id: &UserId, capability: &str) -> PermitResult<OverrideState> {
        let state = self.lock()?;
        let granted = state.users.get(user_id).and_then(|grants| grants.get(capability)).copied();
        Ok(OverrideState::from_granted(granted))
    }
}

// ── OverrideWriter impl ───────────────────────────────────────────────────────

impl OverrideWriter for InMemoryOverrideStore {
    fn set_role_override(&self, role: Role, capability: &str, state: OverrideState) -> PermitResult<()> {
        if !registry::is_registered(capability) {
            return Err(PermitError::UnknownCapability { code: capability.to_string() });
        }

        let mut guard = self.lock()?;
        apply(&mut guard.roles, &role, capability, state);

        info!(role = %role, capability = %capability, state = %state, "role override set");

        Ok(())
    }

    fn set_user_override(&self, user_id: &UserId, capability: &str, state: OverrideState) -> PermitResult<()> {
        if !registry::is_registered(capability) {
            return Err(PermitError::UnknownCapability { code: capability.to_string() });
        }

        let mut guard = self.lock()?;
        apply(&mut guard.users, user_id, capability, state);

        info!(user_id = %user_id, capability = %capability, state = %state, "user override set");

        Ok(())
    }
}
