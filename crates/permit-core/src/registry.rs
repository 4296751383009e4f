//! The compiled-in capability registry.
//!
//! `CAPABILITIES` is the single source of truth for which capability codes
//! exist. The aggregator iterates it, the resolver consults it to deny
//! unknown codes, and admin tooling groups it by category.

use std::collections::{BTreeMap, HashSet};

use permit_contracts::{
    capability::{CapabilityDef, Category},
    error::{PermitError, PermitResult},
};

const fn def(code: &'static str, label: &'static str, category: Category) -> CapabilityDef {
    CapabilityDef { code, label, category }
}

/// Every registered capability, in display order.
pub const CAPABILITIES: &[CapabilityDef] = &[
    // Pages
    def("page:dashboard", "Dashboard", Category::Page),
    def("page:risk-register", "Risk Register", Category::Page),
    def("page:controls", "Controls", Category::Page),
    def("page:policies", "Policies", Category::Page),
    def("page:actions", "Actions", Category::Page),
    def("page:consumer-duty", "Consumer Duty", Category::Page),
    def("page:reports", "Reports", Category::Page),
    def("page:audit", "Audit Trail", Category::Page),
    def("page:users", "User Management", Category::Page),
    def("page:settings", "Settings", Category::Page),
    // Create
    def("create:risk", "Create risks", Category::Create),
    def("create:control", "Create controls", Category::Create),
    def("create:policy", "Create policies", Category::Create),
    def("create:action", "Create actions", Category::Create),
    // Edit
    def("edit:risk", "Edit risks", Category::Edit),
    def("edit:control", "Edit controls", Category::Edit),
    def("edit:policy", "Edit policies", Category::Edit),
    def("edit:action", "Edit actions", Category::Edit),
    // Delete
    def("delete:risk", "Delete risks", Category::Delete),
    def("delete:control", "Delete controls", Category::Delete),
    def("delete:policy", "Delete policies", Category::Delete),
    def("delete:action", "Delete actions", Category::Delete),
    // Actions
    def("can:toggle-risk-focus", "Toggle risk focus", Category::Action),
    // Admin
    def("can:manage-users", "Manage users and roles", Category::Admin),
    def("can:manage-settings", "Manage system settings", Category::Admin),
    def("can:bypass-approval", "Bypass change approval", Category::Admin),
];

/// All registered capability definitions.
pub fn all() -> &'static [CapabilityDef] {
    CAPABILITIES
}

/// All registered codes, in display order.
pub fn codes() -> impl Iterator<Item = &'static str> {
    CAPABILITIES.iter().map(|def| def.code)
}

/// Number of registered capabilities.
pub fn len() -> usize {
    CAPABILITIES.len()
}

/// Look up a capability by exact code.
pub fn lookup(code: &str) -> Option<&'static CapabilityDef> {
    CAPABILITIES.iter().find(|def| def.code == code)
}

pub fn is_registered(code: &str) -> bool {
    lookup(code).is_some()
}

/// Registered capabilities grouped by category, for presentation.
///
/// Categories with no capabilities are omitted. Within a category,
/// capabilities keep registry order.
pub fn by_category() -> BTreeMap<Category, Vec<&'static CapabilityDef>> {
    let mut groups: BTreeMap<Category, Vec<&'static CapabilityDef>> = BTreeMap::new();
    for def in CAPABILITIES {
        groups.entry(def.category).or_default().push(def);
    }
    groups
}

/// Check the structural invariants of `CAPABILITIES`.
///
/// Run once at startup; resolution assumes it holds.
pub fn validate_registry() -> PermitResult<()> {
    validate_defs(CAPABILITIES)
}

/// Check a capability table: every code is unique and carries its
/// category's prefix, and every label is non-empty.
pub fn validate_defs(defs: &[CapabilityDef]) -> PermitResult<()> {
    let mut seen = HashSet::new();

    for def in defs {
        if !seen.insert(def.code) {
            return Err(PermitError::RegistryInvalid {
                reason: format!("capability '{}' is registered twice", def.code),
            });
        }
        if def.label.trim().is_empty() {
            return Err(PermitError::RegistryInvalid {
                reason: format!("capability '{}' has an empty label", def.code),
            });
        }
        let prefix = def.category.prefix();
        if !def.code.starts_with(prefix) || def.code.len() == prefix.len() {
            return Err(PermitError::RegistryInvalid {
                reason: format!(
                    "capability '{}' does not carry the '{}' prefix of category {}",
                    def.code, prefix, def.category
                ),
            });
        }
    }

    Ok(())
}
