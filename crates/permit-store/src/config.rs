//! Override file schema.
//!
//! An override file is a TOML document with two arrays of tables. Each
//! entry is parsed on its own so that one malformed record does not take the
//! rest of the file down with it.
//!
//! Example:
//! ```toml
//! [[role_overrides]]
//! role = "VIEWER"
//! capability = "page:reports"
//! granted = false
//!
//! [[user_overrides]]
//! user_id = "u-42"
//! capability = "create:risk"
//! granted = true
//! ```

use serde::{Deserialize, Serialize};

use permit_contracts::{
    capability::CapabilityCode,
    overrides::{RoleOverride, UserOverride},
    role::{Role, UserId},
};

/// One `[[role_overrides]]` table as written in the file.
///
/// `role` is matched like a `--role` argument: "CCRO_TEAM", "ccro-team"
/// and "Ccro_Team" are the same role. An unknown name makes the record
/// malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverrideRecord {
    pub role: Role,
    pub capability: String,
    pub granted: bool,
}

impl From<RoleOverrideRecord> for RoleOverride {
    fn from(record: RoleOverrideRecord) -> Self {
        RoleOverride {
            role: record.role,
            capability: CapabilityCode::new(record.capability),
            granted: record.granted,
        }
    }
}

/// One `[[user_overrides]]` table as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverrideRecord {
    pub user_id: String,
    pub capability: String,
    pub granted: bool,
}

impl From<UserOverrideRecord> for UserOverride {
    fn from(record: UserOverrideRecord) -> Self {
        UserOverride {
            user_id: UserId::new(record.user_id),
            capability: CapabilityCode::new(record.capability),
            granted: record.granted,
        }
    }
}

/// The validated contents of an override file.
///
/// Malformed and unregistered records have already been dropped, and each
/// (subject, capability) key appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverrideConfig {
    pub role_overrides: Vec<RoleOverride>,
    pub user_overrides: Vec<UserOverride>,
}
