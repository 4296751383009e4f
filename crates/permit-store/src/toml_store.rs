//! TOML-backed, read-only override store.
//!
//! `TomlOverrideStore` loads role and user overrides from a TOML document
//! and implements `OverrideStore` from permit-core.
//!
//! Loading algorithm:
//!
//! 1. Parse the document as a TOML table. Syntax errors → `ConfigError`.
//! 2. For each entry of `role_overrides` and `user_overrides`:
//!    a. Deserialize it on its own. A missing or mistyped field, or an
//!       unknown role name, drops the entry with a warning.
//!    b. Drop entries naming a capability the registry does not know; they
//!       could never grant anything.
//! 3. Reject the file if any (subject, capability) key appears twice; the
//!    resolver requires unique keys and a file cannot express an upsert.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use permit_contracts::{
    error::{PermitError, PermitResult},
    overrides::{OverrideEntry, RoleOverride, UserOverride},
    role::{Role, UserId},
};
use permit_core::{registry, traits::OverrideStore};

use crate::config::{OverrideConfig, RoleOverrideRecord, UserOverrideRecord};

/// An `OverrideStore` whose contents come from a TOML document.
///
/// Construct via `from_toml_str` or `from_file`, then pass to an
/// `Authorizer`.
///
/// ```rust,ignore
/// use permit_store::TomlOverrideStore;
///
/// let store = TomlOverrideStore::from_file(Path::new("overrides.toml"))?;
/// let authorizer = Authorizer::new(Box::new(store));
/// ```
#[derive(Debug)]
pub struct TomlOverrideStore {
    config: OverrideConfig,
    by_role: HashMap<Role, Vec<OverrideEntry>>,
    by_user: HashMap<UserId, Vec<OverrideEntry>>,
}

impl TomlOverrideStore {
    /// Parse `s` as an override file.
    ///
    /// Returns `PermitError::ConfigError` if the TOML is malformed or a
    /// top-level key has the wrong shape, and `PermitError::DuplicateOverride`
    /// if a key is listed twice.
    pub fn from_toml_str(s: &str) -> PermitResult<Self> {
        let table: toml::Table = toml::from_str(s).map_err(|e| PermitError::ConfigError {
            reason: format!("failed to parse override TOML: {}", e),
        })?;

        let role_records: Vec<RoleOverrideRecord> = records(&table, "role_overrides")?;
        let user_records: Vec<UserOverrideRecord> = records(&table, "user_overrides")?;

        let config = OverrideConfig {
            role_overrides: validate_role_records(role_records)?,
            user_overrides: validate_user_records(user_records)?,
        };

        info!(
            role_overrides = config.role_overrides.len(),
            user_overrides = config.user_overrides.len(),
            "override file loaded"
        );

        Ok(Self::from_config(config))
    }

    /// Read the file at `path` and parse it as an override file.
    pub fn from_file(path: &Path) -> PermitResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PermitError::ConfigError {
            reason: format!("failed to read override file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// An empty store: every actor resolves to pure role defaults.
    pub fn empty() -> Self {
        Self::from_config(OverrideConfig::default())
    }

    fn from_config(config: OverrideConfig) -> Self {
        let mut by_role: HashMap<Role, Vec<OverrideEntry>> = HashMap::new();
        for record in &config.role_overrides {
            by_role.entry(record.role).or_default().push(record.entry());
        }

        let mut by_user: HashMap<UserId, Vec<OverrideEntry>> = HashMap::new();
        for record in &config.user_overrides {
            by_user.entry(record.user_id.clone()).or_default().push(record.entry());
        }

        Self { config, by_role, by_user }
    }

    /// The validated records this store was built from, in file order.
    pub fn config(&self) -> &OverrideConfig {
        &self.config
    }
}

impl OverrideStore for TomlOverrideStore {
    fn role_overrides(&self, role: Role) -> PermitResult<Vec<OverrideEntry>> {
        Ok(self.by_role.get(&role).cloned().unwrap_or_default())
    }

    fn user_overrides(&self, user_id: &UserId) -> PermitResult<Vec<OverrideEntry>> {
        Ok(self.by_user.get(user_id).cloned().unwrap_or_default())
    }
}

/// Deserialize every entry of the array at `key`, skipping malformed ones.
///
/// A missing key is an empty list. A key that is present but not an array
/// is a configuration error.
fn records<T: DeserializeOwned>(table: &toml::Table, key: &str) -> PermitResult<Vec<T>> {
    let items = match table.get(key) {
        None => return Ok(Vec::new()),
        Some(toml::Value::Array(items)) => items,
        Some(other) => {
            return Err(PermitError::ConfigError {
                reason: format!("'{}' must be an array of tables, found {}", key, other.type_str()),
            })
        }
    };

    let parsed = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let record: Result<T, toml::de::Error> = item.clone().try_into();
            match record {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(key, index, error = %e, "skipping malformed override record");
                    None
                }
            }
        })
        .collect();

    Ok(parsed)
}

fn is_known(capability: &str, subject: &str) -> bool {
    if registry::is_registered(capability) {
        return true;
    }
    warn!(capability, subject, "skipping override for unregistered capability");
    false
}

fn validate_role_records(records: Vec<RoleOverrideRecord>) -> PermitResult<Vec<RoleOverride>> {
    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(records.len());

    for record in records {
        let subject = format!("role {}", record.role);
        if !is_known(&record.capability, &subject) {
            continue;
        }
        if !seen.insert((record.role, record.capability.clone())) {
            return Err(PermitError::DuplicateOverride { subject, capability: record.capability });
        }
        debug!(role = %record.role, capability = %record.capability, granted = record.granted, "role override");
        validated.push(RoleOverride::from(record));
    }

    Ok(validated)
}

fn validate_user_records(records: Vec<UserOverrideRecord>) -> PermitResult<Vec<UserOverride>> {
    let mut seen = HashSet::new();
    let mut validated = Vec::with_capacity(records.len());

    for record in records {
        if record.user_id.trim().is_empty() {
            warn!(capability = %record.capability, "skipping user override with empty user_id");
            continue;
        }
        let subject = format!("user {}", record.user_id);
        if !is_known(&record.capability, &subject) {
            continue;
        }
        if !seen.insert((record.user_id.clone(), record.capability.clone())) {
            return Err(PermitError::DuplicateOverride { subject, capability: record.capability });
        }
        debug!(user_id = %record.user_id, capability = %record.capability, granted = record.granted, "user override");
        validated.push(UserOverride::from(record));
    }

    Ok(validated)
}
