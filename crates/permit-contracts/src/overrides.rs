//! Override records and the three-state override value.
//!
//! An override is an explicit grant or deny at role or user granularity.
//! The absence of a record means "inherit from the next layer down"; that
//! state is never stored, only reported as `OverrideState::Inherit`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{
    capability::CapabilityCode,
    role::{Role, UserId},
};

/// The effective override value for one (subject, capability) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverrideState {
    /// No record exists; fall through to the next layer.
    #[default]
    Inherit,
    /// A record with `granted = true`.
    Grant,
    /// A record with `granted = false`.
    Deny,
}

impl OverrideState {
    /// Next state in the admin matrix cycle: Inherit → Grant → Deny → Inherit.
    pub fn cycle(self) -> Self {
        match self {
            OverrideState::Inherit => OverrideState::Grant,
            OverrideState::Grant => OverrideState::Deny,
            OverrideState::Deny => OverrideState::Inherit,
        }
    }

    /// Map a stored `granted` flag (or its absence) to a state.
    pub fn from_granted(granted: Option<bool>) -> Self {
        match granted {
            None => OverrideState::Inherit,
            Some(true) => OverrideState::Grant,
            Some(false) => OverrideState::Deny,
        }
    }

    /// The `granted` flag a record in this state carries. `None` for Inherit,
    /// which has no record.
    pub fn granted(self) -> Option<bool> {
        match self {
            OverrideState::Inherit => None,
            OverrideState::Grant => Some(true),
            OverrideState::Deny => Some(false),
        }
    }
}

impl fmt::Display for OverrideState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverrideState::Inherit => "inherit",
            OverrideState::Grant => "grant",
            OverrideState::Deny => "deny",
        };
        f.write_str(s)
    }
}

/// One override as the resolver sees it: the subject is implied by which
/// list the entry sits in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub capability: CapabilityCode,
    pub granted: bool,
}

impl OverrideEntry {
    pub fn new(capability: impl Into<String>, granted: bool) -> Self {
        Self { capability: CapabilityCode::new(capability), granted }
    }

    pub fn grant(capability: impl Into<String>) -> Self {
        Self::new(capability, true)
    }

    pub fn deny(capability: impl Into<String>) -> Self {
        Self::new(capability, false)
    }

    /// Parse a loosely-typed override record.
    ///
    /// Returns `None` unless `value` is an object with a non-empty string
    /// `capability` and a boolean `granted`. Extra fields are ignored.
    pub fn from_json(value: &Value) -> Option<Self> {
        let capability = value.get("capability")?.as_str()?;
        let granted = value.get("granted")?.as_bool()?;
        if capability.is_empty() {
            return None;
        }
        Some(Self::new(capability, granted))
    }
}

/// Parse a list of loosely-typed override records, dropping malformed ones.
///
/// A dropped record behaves exactly like a missing one (Inherit).
pub fn entries_from_json(values: &[Value]) -> Vec<OverrideEntry> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let entry = OverrideEntry::from_json(value);
            if entry.is_none() {
                warn!(index, record = %value, "skipping malformed override record");
            }
            entry
        })
        .collect()
}

/// A persisted role-level override, keyed by (role, capability).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverride {
    pub role: Role,
    pub capability: CapabilityCode,
    pub granted: bool,
}

impl RoleOverride {
    pub fn entry(&self) -> OverrideEntry {
        OverrideEntry { capability: self.capability.clone(), granted: self.granted }
    }
}

/// A persisted user-level override, keyed by (user_id, capability).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverride {
    pub user_id: UserId,
    pub capability: CapabilityCode,
    pub granted: bool,
}

impl UserOverride {
    pub fn entry(&self) -> OverrideEntry {
        OverrideEntry { capability: self.capability.clone(), granted: self.granted }
    }
}

/// The two override lists for one actor, read at a single point in time.
///
/// The resolver treats the pair as one input value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideSnapshot {
    pub role_overrides: Vec<OverrideEntry>,
    pub user_overrides: Vec<OverrideEntry>,
    /// Wall-clock time the snapshot was taken (UTC).
    pub taken_at: DateTime<Utc>,
}

impl OverrideSnapshot {
    pub fn new(role_overrides: Vec<OverrideEntry>, user_overrides: Vec<OverrideEntry>) -> Self {
        Self { role_overrides, user_overrides, taken_at: Utc::now() }
    }

    /// A snapshot with no overrides at all: pure role defaults.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
