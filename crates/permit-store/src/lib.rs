//! # permit-store
//!
//! Override stores for the PERMIT resolution engine.
//!
//! ## Overview
//!
//! This crate provides two implementations of
//! [`OverrideStore`](permit_core::traits::OverrideStore):
//!
//! - [`InMemoryOverrideStore`]: mutable, map-keyed, also implements
//!   [`OverrideWriter`](permit_core::traits::OverrideWriter). Backs admin
//!   tooling and tests.
//! - [`TomlOverrideStore`]: read-only, loaded from a TOML override file.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use permit_core::Authorizer;
//! use permit_store::TomlOverrideStore;
//!
//! let store = TomlOverrideStore::from_file(Path::new("overrides.toml"))?;
//! let authorizer = Authorizer::new(Box::new(store));
//! ```

pub mod config;
pub mod memory;
pub mod toml_store;

pub use config::{OverrideConfig, RoleOverrideRecord, UserOverrideRecord};
pub use memory::InMemoryOverrideStore;
pub use toml_store::TomlOverrideStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use permit_contracts::{
        capability::CapabilityCode,
        error::PermitError,
        overrides::{OverrideEntry, OverrideState, RoleOverride, UserOverride},
        role::{Actor, Role, UserId},
    };
    use permit_core::{
        traits::{OverrideStore, OverrideWriter},
        Authorizer,
    };

    use crate::{InMemoryOverrideStore, TomlOverrideStore};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn user(id: &str) -> UserId {
        UserId::new(id)
    }

    fn role_record(role: Role, capability: &str, granted: bool) -> RoleOverride {
        RoleOverride { role, capability: CapabilityCode::new(capability), granted }
    }

    fn user_record(user_id: &str, capability: &str, granted: bool) -> UserOverride {
        UserOverride { user_id: user(user_id), capability: CapabilityCode::new(capability), granted }
    }

    // ── InMemoryOverrideStore ─────────────────────────────────────────────────

    /// A second write for the same key replaces the first.
    #[test]
    fn test_memory_upsert_replaces() {
        let store = InMemoryOverrideStore::new();
        store.set_role_override(Role::Viewer, "create:risk", OverrideState::Grant).unwrap();
        store.set_role_override(Role::Viewer, "create:risk", OverrideState::Deny).unwrap();

        assert_eq!(store.role_overrides(Role::Viewer).unwrap(), vec![OverrideEntry::deny("create:risk")]);
        assert_eq!(
            store.role_override_state(Role::Viewer, "create:risk").unwrap(),
            OverrideState::Deny
        );
    }

    /// Writing Inherit deletes the record.
    #[test]
    fn test_memory_inherit_removes_record() {
        let store = InMemoryOverrideStore::new();
        let alice = user("alice");
        store.set_user_override(&alice, "page:audit", OverrideState::Grant).unwrap();
        store.set_user_override(&alice, "page:audit", OverrideState::Inherit).unwrap();

        assert!(store.user_overrides(&alice).unwrap().is_empty());
        assert!(store.user_records().unwrap().is_empty());
        assert_eq!(
            store.user_override_state(&alice, "page:audit").unwrap(),
            OverrideState::Inherit
        );
    }

    /// Cycling a matrix cell three times returns it to Inherit.
    #[test]
    fn test_memory_cycle_round_trip() {
        let store = InMemoryOverrideStore::new();
        let mut state = store.role_override_state(Role::Owner, "delete:risk").unwrap();

        for expected in [OverrideState::Grant, OverrideState::Deny, OverrideState::Inherit] {
            state = state.cycle();
            store.set_role_override(Role::Owner, "delete:risk", state).unwrap();
            assert_eq!(store.role_override_state(Role::Owner, "delete:risk").unwrap(), expected);
        }

        assert!(store.role_records().unwrap().is_empty());
    }

    /// Writes naming an unregistered capability are rejected.
    #[test]
    fn test_memory_rejects_unknown_capability() {
        let store = InMemoryOverrideStore::new();
        match store.set_role_override(Role::Ceo, "can:launch-rockets", OverrideState::Grant) {
            Err(PermitError::UnknownCapability { code }) => assert_eq!(code, "can:launch-rockets"),
            other => panic!("expected UnknownCapability, got {:?}", other),
        }
        assert!(store.role_overrides(Role::Ceo).unwrap().is_empty());
    }

    /// Overrides for one subject never show up for another.
    #[test]
    fn test_memory_subjects_are_isolated() {
        let store = InMemoryOverrideStore::new();
        store.set_role_override(Role::Owner, "delete:risk", OverrideState::Grant).unwrap();
        store.set_user_override(&user("alice"), "can:bypass-approval", OverrideState::Grant).unwrap();

        assert!(store.role_overrides(Role::Viewer).unwrap().is_empty());
        assert!(store.user_overrides(&user("bob")).unwrap().is_empty());

        let snapshot = store.snapshot(&Actor::new("alice", Role::Owner)).unwrap();
        assert_eq!(snapshot.role_overrides, vec![OverrideEntry::grant("delete:risk")]);
        assert_eq!(snapshot.user_overrides, vec![OverrideEntry::grant("can:bypass-approval")]);
    }

    #[test]
    fn test_memory_remove_user() {
        let store = InMemoryOverrideStore::new();
        let alice = user("alice");
        store.set_user_override(&alice, "edit:risk", OverrideState::Deny).unwrap();
        store.set_user_override(&alice, "edit:control", OverrideState::Deny).unwrap();

        assert_eq!(store.remove_user(&alice).unwrap(), 2);
        assert_eq!(store.remove_user(&alice).unwrap(), 0);
        assert!(store.user_overrides(&alice).unwrap().is_empty());
    }

    /// Records are applied in order, so a later record for a key wins.
    #[test]
    fn test_memory_from_records_later_record_replaces() {
        let store = InMemoryOverrideStore::from_records(
            vec![
                role_record(Role::Owner, "delete:risk", true),
                role_record(Role::Owner, "edit:risk", false),
                role_record(Role::Owner, "delete:risk", false),
            ],
            vec![
                user_record("u-1", "can:bypass-approval", false),
                user_record("u-1", "can:bypass-approval", true),
            ],
        )
        .unwrap();

        assert_eq!(
            store.role_overrides(Role::Owner).unwrap(),
            vec![OverrideEntry::deny("delete:risk"), OverrideEntry::deny("edit:risk")]
        );
        assert_eq!(
            store.user_overrides(&user("u-1")).unwrap(),
            vec![OverrideEntry::grant("can:bypass-approval")]
        );
        assert_eq!(store.role_records().unwrap().len(), 2);
        assert_eq!(store.user_records().unwrap().len(), 1);
    }

    #[test]
    fn test_memory_from_records_rejects_unknown_capability() {
        let result = InMemoryOverrideStore::from_records(
            vec![role_record(Role::Viewer, "page:dashboard", false)],
            vec![user_record("u-2", "can:launch-rockets", true)],
        );

        match result {
            Err(PermitError::UnknownCapability { code }) => assert_eq!(code, "can:launch-rockets"),
            Err(other) => panic!("expected UnknownCapability, got {:?}", other),
            Ok(_) => panic!("expected UnknownCapability, got a store"),
        }
    }

    /// Writes through one clone are visible to an authorizer reading another.
    #[test]
    fn test_memory_shared_with_authorizer() {
        let store = InMemoryOverrideStore::new();
        let authorizer = Authorizer::new(Box::new(store.clone()));
        let viewer = Actor::new("v-1", Role::Viewer);

        assert!(!authorizer.check(&viewer, "can:manage-users").unwrap());

        store.set_role_override(Role::Viewer, "can:manage-users", OverrideState::Grant).unwrap();
        assert!(authorizer.check(&viewer, "can:manage-users").unwrap());

        store.set_user_override(&user("v-1"), "can:manage-users", OverrideState::Deny).unwrap();
        assert!(!authorizer.check(&viewer, "can:manage-users").unwrap());

        store.set_user_override(&user("v-1"), "can:manage-users", OverrideState::Inherit).unwrap();
        assert!(authorizer.check(&viewer, "can:manage-users").unwrap());
    }

    #[test]
    fn test_memory_concurrent_checks() {
        let store = InMemoryOverrideStore::new();
        store.set_role_override(Role::Owner, "delete:risk", OverrideState::Grant).unwrap();
        let authorizer = std::sync::Arc::new(Authorizer::new(Box::new(store)));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let authorizer = authorizer.clone();
                std::thread::spawn(move || {
                    let actor = Actor::new(format!("u-{i}"), Role::Owner);
                    authorizer.check(&actor, "delete:risk").unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    // ── TomlOverrideStore ─────────────────────────────────────────────────────

    #[test]
    fn test_toml_loads_role_and_user_overrides() {
        let toml = r#"
            [[role_overrides]]
            role = "VIEWER"
            capability = "page:reports"
            granted = false

            [[role_overrides]]
            role = "OWNER"
            capability = "delete:risk"
            granted = true

            [[user_overrides]]
            user_id = "u-42"
            capability = "create:risk"
            granted = true
        "#;

        let store = TomlOverrideStore::from_toml_str(toml).unwrap();

        assert_eq!(store.role_overrides(Role::Viewer).unwrap(), vec![OverrideEntry::deny("page:reports")]);
        assert_eq!(store.role_overrides(Role::Owner).unwrap(), vec![OverrideEntry::grant("delete:risk")]);
        assert!(store.role_overrides(Role::Ceo).unwrap().is_empty());
        assert_eq!(store.user_overrides(&user("u-42")).unwrap(), vec![OverrideEntry::grant("create:risk")]);
        assert_eq!(store.config().role_overrides.len(), 2);

        let authorizer = Authorizer::new(Box::new(store));
        assert!(authorizer.check(&Actor::new("u-42", Role::Viewer), "create:risk").unwrap());
        assert!(!authorizer.check(&Actor::new("u-42", Role::Viewer), "page:reports").unwrap());
    }

    /// Role names in the file follow the same rules as on the command line.
    #[test]
    fn test_toml_accepts_relaxed_role_names() {
        let toml = r#"
            [[role_overrides]]
            role = "ccro-team"
            capability = "can:bypass-approval"
            granted = false

            [[role_overrides]]
            role = "viewer"
            capability = "page:audit"
            granted = true
        "#;

        let store = TomlOverrideStore::from_toml_str(toml).unwrap();

        assert_eq!(
            store.role_overrides(Role::CcroTeam).unwrap(),
            vec![OverrideEntry::deny("can:bypass-approval")]
        );
        assert_eq!(store.role_overrides(Role::Viewer).unwrap(), vec![OverrideEntry::grant("page:audit")]);
    }

    /// Two spellings of one role name the same key.
    #[test]
    fn test_toml_duplicate_across_role_spellings_rejected() {
        let toml = r#"
            [[role_overrides]]
            role = "OWNER"
            capability = "delete:risk"
            granted = true

            [[role_overrides]]
            role = "owner"
            capability = "delete:risk"
            granted = false
        "#;

        match TomlOverrideStore::from_toml_str(toml) {
            Err(PermitError::DuplicateOverride { subject, capability }) => {
                assert_eq!(subject, "role OWNER");
                assert_eq!(capability, "delete:risk");
            }
            other => panic!("expected DuplicateOverride, got {:?}", other),
        }
    }

    #[test]
    fn test_toml_empty_document() {
        let store = TomlOverrideStore::from_toml_str("").unwrap();
        assert!(store.config().role_overrides.is_empty());
        assert!(store.config().user_overrides.is_empty());
    }

    /// Malformed entries are dropped; well-formed neighbours survive.
    #[test]
    fn test_toml_skips_malformed_entries() {
        let toml = r#"
            [[role_overrides]]
            role = "VIEWER"
            capability = "create:risk"

            [[role_overrides]]
            role = "SUPERUSER"
            capability = "create:risk"
            granted = true

            [[role_overrides]]
            role = "CEO"
            capability = "edit:risk"
            granted = "yes"

            [[role_overrides]]
            role = "CEO"
            capability = "can:launch-rockets"
            granted = true

            [[role_overrides]]
            role = "CEO"
            capability = "edit:risk"
            granted = true

            [[user_overrides]]
            user_id = ""
            capability = "edit:risk"
            granted = true
        "#;

        let store = TomlOverrideStore::from_toml_str(toml).unwrap();

        assert!(store.role_overrides(Role::Viewer).unwrap().is_empty());
        assert_eq!(store.role_overrides(Role::Ceo).unwrap(), vec![OverrideEntry::grant("edit:risk")]);
        assert!(store.config().user_overrides.is_empty());
    }

    #[test]
    fn test_toml_duplicate_key_rejected() {
        let toml = r#"
            [[user_overrides]]
            user_id = "u-1"
            capability = "edit:risk"
            granted = true

            [[user_overrides]]
            user_id = "u-1"
            capability = "edit:risk"
            granted = false
        "#;

        match TomlOverrideStore::from_toml_str(toml) {
            Err(PermitError::DuplicateOverride { subject, capability }) => {
                assert_eq!(subject, "user u-1");
                assert_eq!(capability, "edit:risk");
            }
            other => panic!("expected DuplicateOverride, got {:?}", other),
        }
    }

    #[test]
    fn test_toml_wrong_shape_rejected() {
        let toml = r#"
            role_overrides = "none"
        "#;

        match TomlOverrideStore::from_toml_str(toml) {
            Err(PermitError::ConfigError { reason }) => {
                assert!(reason.contains("role_overrides"), "unexpected reason: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    /// Malformed TOML must produce a `PermitError::ConfigError`.
    #[test]
    fn test_toml_parse_error() {
        let bad_toml = r#"
            this is not valid toml ][[[
        "#;

        match TomlOverrideStore::from_toml_str(bad_toml) {
            Err(PermitError::ConfigError { reason }) => {
                assert!(
                    reason.contains("failed to parse override TOML"),
                    "expected parse error message, got: {reason}"
                );
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_toml_missing_file() {
        let result = TomlOverrideStore::from_file(std::path::Path::new("/nonexistent/overrides.toml"));
        assert!(matches!(result, Err(PermitError::ConfigError { .. })));
    }
}
