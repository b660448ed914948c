//! Owner (back-office account) domain types.

use chrono::{DateTime, Utc};

use cafe_core::{Email, OwnerId, OwnerRole};

/// A back-office account.
#[derive(Debug, Clone)]
pub struct Owner {
    pub id: OwnerId,
    pub username: String,
    pub email: Email,
    pub full_name: String,
    pub phone: Option<String>,
    /// Raw stored role name; see [`Owner::role`].
    pub role_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owner {
    /// The parsed role, or `None` for an unknown stored value.
    #[must_use]
    pub fn role(&self) -> Option<OwnerRole> {
        OwnerRole::parse(&self.role_name)
    }
}

/// Data for creating an owner account.
#[derive(Debug, Clone)]
pub struct NewOwner {
    pub username: String,
    pub email: Email,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: OwnerRole,
}
