//! The default grant table: what each role holds with no overrides applied.
//!
//! This is hand-curated policy. `CcroTeam` is defined as the whole registry
//! rather than as a list, so a newly registered capability is granted to
//! the compliance team without touching this file.

use std::collections::BTreeSet;

use permit_contracts::{
    capability::{CapabilityDef, Category},
    error::{PermitError, PermitResult},
    role::Role,
};

use crate::registry;

const VIEWER_GRANTS: &[&str] = &[
    "page:dashboard",
    "page:risk-register",
    "page:controls",
    "page:policies",
    "page:actions",
    "page:consumer-duty",
    "page:reports",
];

const CEO_GRANTS: &[&str] = &[
    "page:dashboard",
    "page:risk-register",
    "page:controls",
    "page:policies",
    "page:actions",
    "page:consumer-duty",
    "page:reports",
    "page:audit",
    "can:toggle-risk-focus",
];

const OWNER_GRANTS: &[&str] = &[
    "page:dashboard",
    "page:risk-register",
    "page:controls",
    "page:policies",
    "page:actions",
    "page:consumer-duty",
    "page:reports",
    "create:risk",
    "create:control",
    "create:policy",
    "create:action",
    "edit:risk",
    "edit:control",
    "edit:policy",
    "edit:action",
];

/// Per-role default lists for every role except `CcroTeam`, which holds
/// the whole registry by definition.
#[derive(Debug, Clone, Copy)]
pub struct DefaultTable<'a> {
    pub ceo: &'a [&'a str],
    pub owner: &'a [&'a str],
    pub viewer: &'a [&'a str],
}

impl<'a> DefaultTable<'a> {
    /// The listed grants for `role`, or `None` for `CcroTeam`.
    pub fn listed(&self, role: Role) -> Option<&'a [&'a str]> {
        match role {
            Role::CcroTeam => None,
            Role::Ceo => Some(self.ceo),
            Role::Owner => Some(self.owner),
            Role::Viewer => Some(self.viewer),
        }
    }
}

/// The compiled-in default table.
pub const DEFAULT_TABLE: DefaultTable<'static> = DefaultTable {
    ceo: CEO_GRANTS,
    owner: OWNER_GRANTS,
    viewer: VIEWER_GRANTS,
};

/// Return true if `role` holds `code` by default.
///
/// Unregistered codes are never granted, not even to `CcroTeam`.
pub fn is_default_grant(role: Role, code: &str) -> bool {
    match DEFAULT_TABLE.listed(role) {
        None => registry::is_registered(code),
        Some(listed) => listed.contains(&code),
    }
}

/// The codes `role` holds by default, sorted.
pub fn default_grants(role: Role) -> BTreeSet<&'static str> {
    match DEFAULT_TABLE.listed(role) {
        None => registry::codes().collect(),
        Some(listed) => listed.iter().copied().collect(),
    }
}

fn invalid(reason: String) -> PermitError {
    PermitError::RegistryInvalid { reason }
}

/// Check the compiled-in default table against the compiled-in registry.
pub fn validate_defaults() -> PermitResult<()> {
    check_defaults(registry::all(), &DEFAULT_TABLE)
}

/// Check a default table against a capability table and the per-role
/// policy invariants.
///
/// - every listed code is in `defs`
/// - `Viewer` holds only page capabilities
/// - `Owner` holds create and edit capabilities, no delete or admin
/// - `Ceo` holds page capabilities plus exactly one action capability
///
/// `CcroTeam` holds all of `defs` by construction and needs no check.
pub fn check_defaults(defs: &[CapabilityDef], table: &DefaultTable<'_>) -> PermitResult<()> {
    let viewer = categorize(defs, table, Role::Viewer)?;
    let owner = categorize(defs, table, Role::Owner)?;
    let ceo = categorize(defs, table, Role::Ceo)?;

    for (code, category) in &viewer {
        if *category != Category::Page {
            return Err(invalid(format!(
                "{} holds non-page capability '{}' by default",
                Role::Viewer,
                code
            )));
        }
    }

    for (code, category) in &owner {
        if matches!(category, Category::Delete | Category::Admin) {
            return Err(invalid(format!(
                "{} holds {} capability '{}' by default",
                Role::Owner,
                category,
                code
            )));
        }
    }
    for required in [Category::Create, Category::Edit] {
        if !owner.iter().any(|(_, category)| *category == required) {
            return Err(invalid(format!(
                "{} holds no {} capability by default",
                Role::Owner,
                required
            )));
        }
    }

    let mut ceo_actions = 0;
    for (code, category) in &ceo {
        match category {
            Category::Page => {}
            Category::Action => ceo_actions += 1,
            other => {
                return Err(invalid(format!(
                    "{} holds {} capability '{}' by default",
                    Role::Ceo,
                    other,
                    code
                )));
            }
        }
    }
    if ceo_actions != 1 {
        return Err(invalid(format!(
            "{} must hold exactly one action capability by default, holds {}",
            Role::Ceo,
            ceo_actions
        )));
    }

    Ok(())
}

/// Pair each code `role` lists with its category in `defs`.
fn categorize<'t>(
    defs: &[CapabilityDef],
    table: &DefaultTable<'t>,
    role: Role,
) -> PermitResult<Vec<(&'t str, Category)>> {
    let listed = table.listed(role).unwrap_or_default();
    let mut categorized = Vec::with_capacity(listed.len());
    for code in listed {
        let def = defs.iter().find(|def| def.code == *code).ok_or_else(|| {
            invalid(format!(
                "default grants for {} reference unregistered capability '{}'",
                role, code
            ))
        })?;
        categorized.push((*code, def.category));
    }
    Ok(categorized)
}
