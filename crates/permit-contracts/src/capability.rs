//! Capability identifiers and their presentation metadata.
//!
//! PERMIT uses a flat capability model: every checkable permission is a
//! namespaced string such as "page:dashboard", "create:risk" or
//! "can:manage-users". The set of codes that actually exist is fixed at
//! compile time by the registry in permit-core; this module only defines
//! the shapes.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A capability code as it travels through override records and API calls.
///
/// Codes are compared by exact, case-sensitive string equality. Holding a
/// `CapabilityCode` does not imply the code is registered; the resolver
/// checks that separately and denies anything it does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityCode(pub String);

impl CapabilityCode {
    /// Construct a capability code from any string-like value.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CapabilityCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl Borrow<str> for CapabilityCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The fixed presentation grouping every capability belongs to.
///
/// Each category owns a code prefix; the registry validation checks that
/// every code starts with its category's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Read access to a page or view.
    Page,
    Create,
    Edit,
    Delete,
    /// Non-administrative actions that are neither CRUD nor page access.
    Action,
    /// Administrative powers (user management, settings, approval bypass).
    Admin,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 6] = [
        Category::Page,
        Category::Create,
        Category::Edit,
        Category::Delete,
        Category::Action,
        Category::Admin,
    ];

    /// Human-readable heading used when grouping capabilities.
    pub fn label(self) -> &'static str {
        match self {
            Category::Page => "Pages",
            Category::Create => "Create",
            Category::Edit => "Edit",
            Category::Delete => "Delete",
            Category::Action => "Actions",
            Category::Admin => "Admin",
        }
    }

    /// The code prefix every capability in this category carries.
    ///
    /// `Action` and `Admin` share the "can:" namespace.
    pub fn prefix(self) -> &'static str {
        match self {
            Category::Page => "page:",
            Category::Create => "create:",
            Category::Edit => "edit:",
            Category::Delete => "delete:",
            Category::Action | Category::Admin => "can:",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry in the compiled-in capability registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityDef {
    /// The unique code, e.g. "edit:risk".
    pub code: &'static str,
    /// Short label shown next to the code in admin tooling.
    pub label: &'static str,
    pub category: Category,
}

/// The complete set of capabilities an actor holds after resolution.
///
/// Built by the aggregator in permit-core. Ordered so that listings and
/// serialized output are stable across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantedSet {
    inner: BTreeSet<CapabilityCode>,
}

impl GrantedSet {
    /// Add a capability to this set. Adding twice is a no-op.
    pub fn grant(&mut self, code: CapabilityCode) {
        self.inner.insert(code);
    }

    /// Return true if the set contains the given capability code.
    pub fn has(&self, code: &str) -> bool {
        self.inner.contains(code)
    }

    /// Return an iterator over all granted codes, in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &CapabilityCode> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl FromIterator<CapabilityCode> for GrantedSet {
    fn from_iter<I: IntoIterator<Item = CapabilityCode>>(iter: I) -> Self {
        Self { inner: iter.into_iter().collect() }
    }
}
