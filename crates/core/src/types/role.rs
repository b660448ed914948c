//! Owner (staff-side) role hierarchy.
//!
//! Roles form a total order: `Staff < Manager < Admin`. A role satisfies a
//! requirement when it ranks at or above it. Anything that does not parse as a
//! known role satisfies nothing.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Owner role with increasing privilege.
///
/// Variant order defines the hierarchy; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerRole {
    /// Front-of-house staff: orders, reservations, menu (by default).
    Staff,
    /// Shift manager: everything staff can do plus customer records.
    Manager,
    /// Full access including staff management.
    Admin,
}

impl OwnerRole {
    /// All roles, lowest privilege first.
    pub const ALL: [Self; 3] = [Self::Staff, Self::Manager, Self::Admin];

    /// Parse a stored role name. Unknown names yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staff" => Some(Self::Staff),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// The stored/display name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Whether this role grants at least the privileges of `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for OwnerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OwnerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid owner role: {s}"))
    }
}

/// Check a raw role name against a requirement, failing closed.
///
/// ```
/// use cafe_core::{OwnerRole, has_permission};
///
/// assert!(has_permission("admin", OwnerRole::Staff));
/// assert!(!has_permission("staff", OwnerRole::Admin));
/// assert!(!has_permission("superuser", OwnerRole::Staff));
/// ```
#[must_use]
pub fn has_permission(role: &str, required: OwnerRole) -> bool {
    OwnerRole::parse(role).is_some_and(|role| role.satisfies(required))
}
