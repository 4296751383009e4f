//! Role and actor identity types.
//!
//! Roles are a closed enumeration. Anything that arrives as a string (TOML,
//! JSON, CLI arguments) goes through `Role::from_str`, which rejects unknown
//! names instead of guessing. Serialization always writes the canonical name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PermitError;

/// The fixed user classes, each carrying a baseline set of capabilities.
///
/// Deserializing accepts the same names as `from_str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Role {
    /// Compliance team. Holds every registered capability by default.
    CcroTeam,
    /// Executive. Read access plus a single non-admin action.
    Ceo,
    /// Content owner. May create and edit, never delete or administer.
    Owner,
    /// Read-only viewer.
    Viewer,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Role; 4] = [Role::CcroTeam, Role::Ceo, Role::Owner, Role::Viewer];

    /// The canonical wire name ("CCRO_TEAM", "CEO", ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Role::CcroTeam => "CCRO_TEAM",
            Role::Ceo => "CEO",
            Role::Owner => "OWNER",
            Role::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PermitError;

    /// Parse a role name. Matching ignores ASCII case and accepts `-` in
    /// place of `_`, so "ccro-team" and "CCRO_TEAM" are the same role.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| PermitError::UnknownRole { role: s.to_string() })
    }
}

impl TryFrom<String> for Role {
    type Error = PermitError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Stable identifier of an individual user, as assigned by the user store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The subject of an authorization check: a user acting under a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self { user_id: UserId::new(user_id), role }
    }
}
