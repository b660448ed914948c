//! Session-related types.
//!
//! Types stored in the session for authentication state. The customer and
//! owner identities live under separate keys and are checked independently.

use serde::{Deserialize, Serialize};

use cafe_core::{CustomerId, Email, OwnerId, OwnerRole, has_permission};

/// Session-stored customer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
}

/// Session-stored owner identity.
///
/// The role is kept as the raw stored name so an unexpected value can never
/// deserialize into a privilege; [`CurrentOwner::has_permission`] fails closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentOwner {
    pub id: OwnerId,
    pub username: String,
    pub role: String,
}

impl CurrentOwner {
    #[must_use]
    pub fn has_permission(&self, required: OwnerRole) -> bool {
        has_permission(&self.role, required)
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// The logged-in owner.
    pub const CURRENT_OWNER: &str = "current_owner";

    /// The cart (a serialized `cafe_core::Cart`).
    pub const CART: &str = "cart";

    /// Id of the last order this session placed.
    pub const LAST_ORDER_ID: &str = "last_order_id";

    /// Single-use token embedded in the checkout form.
    pub const CHECKOUT_TOKEN: &str = "checkout_token";

    /// Pending menu item delete confirmation.
    pub const PENDING_DELETE: &str = "pending_delete";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_permission_fails_closed() {
        let owner = CurrentOwner {
            id: OwnerId::new(1),
            username: "sam".to_string(),
            role: "superuser".to_string(),
        };
        assert!(!owner.has_permission(OwnerRole::Staff));
    }

    #[test]
    fn test_owner_permission_hierarchy() {
        let owner = CurrentOwner {
            id: OwnerId::new(1),
            username: "mia".to_string(),
            role: "manager".to_string(),
        };
        assert!(owner.has_permission(OwnerRole::Staff));
        assert!(owner.has_permission(OwnerRole::Manager));
        assert!(!owner.has_permission(OwnerRole::Admin));
    }
}
