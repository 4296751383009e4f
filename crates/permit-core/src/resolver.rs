//! The layered resolver and the aggregator built on top of it.
//!
//! Precedence, highest first:
//!
//! 1. A user override for the capability decides.
//! 2. Otherwise a role override for the capability decides.
//! 3. Otherwise the role's default grant decides.
//!
//! Codes missing from the registry are denied before any layer is consulted,
//! so an override can never conjure a capability into existence.
//!
//! Everything here is pure: no I/O, no shared state, no caching. The same
//! inputs always produce the same answer, and calls may run concurrently.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use permit_contracts::{
    capability::{CapabilityCode, GrantedSet},
    overrides::{OverrideEntry, OverrideSnapshot, OverrideState},
    role::Role,
};

use crate::{defaults, registry};

/// Which layer produced a resolution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantSource {
    UserOverride,
    RoleOverride,
    RoleDefault,
    /// The code is not in the registry; always a denial.
    Unregistered,
}

/// The outcome of resolving one capability, with the layer that decided it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub granted: bool,
    pub source: GrantSource,
}

/// An override list indexed by capability code.
///
/// Callers are expected to pass lists with at most one entry per code. If
/// they do not, the last entry for a code wins and a warning is logged.
#[derive(Debug, Default)]
pub struct OverrideIndex<'a> {
    by_code: HashMap<&'a str, bool>,
}

impl<'a> OverrideIndex<'a> {
    pub fn build(entries: &'a [OverrideEntry]) -> Self {
        let mut by_code = HashMap::with_capacity(entries.len());
        for entry in entries {
            if by_code.insert(entry.capability.as_str(), entry.granted).is_some() {
                warn!(
                    capability = %entry.capability,
                    "override list holds more than one entry for capability; keeping the last"
                );
            }
        }
        Self { by_code }
    }

    /// The override state this list expresses for `code`.
    pub fn state(&self, code: &str) -> OverrideState {
        OverrideState::from_granted(self.by_code.get(code).copied())
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// A resolver bound to one role and one pair of override lists.
///
/// Indexing happens once in `new`; every subsequent lookup is O(1). Build one
/// per request (or per render) and discard it afterwards.
#[derive(Debug)]
pub struct Resolver<'a> {
    role: Role,
    role_overrides: OverrideIndex<'a>,
    user_overrides: OverrideIndex<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        role: Role,
        role_overrides: &'a [OverrideEntry],
        user_overrides: &'a [OverrideEntry],
    ) -> Self {
        Self {
            role,
            role_overrides: OverrideIndex::build(role_overrides),
            user_overrides: OverrideIndex::build(user_overrides),
        }
    }

    /// Bind a resolver to the lists in `snapshot`.
    pub fn from_snapshot(role: Role, snapshot: &'a OverrideSnapshot) -> Self {
        Self::new(role, &snapshot.role_overrides, &snapshot.user_overrides)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Resolve `code` and report which layer decided.
    pub fn explain(&self, code: &str) -> Resolution {
        if !registry::is_registered(code) {
            return Resolution { granted: false, source: GrantSource::Unregistered };
        }

        if let Some(granted) = self.user_overrides.state(code).granted() {
            return Resolution { granted, source: GrantSource::UserOverride };
        }

        if let Some(granted) = self.role_overrides.state(code).granted() {
            return Resolution { granted, source: GrantSource::RoleOverride };
        }

        Resolution {
            granted: defaults::is_default_grant(self.role, code),
            source: GrantSource::RoleDefault,
        }
    }

    pub fn resolve(&self, code: &str) -> bool {
        self.explain(code).granted
    }

    /// Every registered capability this resolver grants.
    pub fn granted(&self) -> GrantedSet {
        let granted: GrantedSet = registry::codes()
            .filter(|code| self.resolve(code))
            .map(CapabilityCode::from)
            .collect();

        debug!(
            role = %self.role,
            role_overrides = self.role_overrides.len(),
            user_overrides = self.user_overrides.len(),
            granted = granted.len(),
            "resolved capability set"
        );

        granted
    }
}

/// Resolve a single capability for a role and its override lists.
///
/// Unregistered codes resolve to `false`. Entries for other capabilities in
/// either list have no effect on the result.
pub fn resolve(
    code: &str,
    role: Role,
    role_overrides: &[OverrideEntry],
    user_overrides: &[OverrideEntry],
) -> bool {
    Resolver::new(role, role_overrides, user_overrides).resolve(code)
}

/// Like `resolve`, also reporting which layer decided.
pub fn explain(
    code: &str,
    role: Role,
    role_overrides: &[OverrideEntry],
    user_overrides: &[OverrideEntry],
) -> Resolution {
    Resolver::new(role, role_overrides, user_overrides).explain(code)
}

/// Compute every registered capability granted to a role and its overrides.
///
/// Freshly computed on each call; the lists are indexed once before the
/// registry is walked.
pub fn resolve_all(
    role: Role,
    role_overrides: &[OverrideEntry],
    user_overrides: &[OverrideEntry],
) -> GrantedSet {
    Resolver::new(role, role_overrides, user_overrides).granted()
}
