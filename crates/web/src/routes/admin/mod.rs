//! Back-office route handlers, nested under `/admin`.
//!
//! # Route Structure
//!
//! ```text
//! GET  /admin/login                    - Login page
//! POST /admin/login                    - Login action (rate limited)
//! POST /admin/logout                   - Logout
//! GET  /admin                          - Dashboard (staff+)
//!
//! # Menu (action state machine, editing role configurable)
//! GET  /admin/menu?action=list|add|edit|delete&id=
//! POST /admin/menu?action=add|edit|delete&id=
//!
//! # Orders (staff+)
//! GET  /admin/orders?status=           - Order list
//! GET  /admin/orders/{id}              - Order detail
//! POST /admin/orders/{id}/status       - Status change
//!
//! # Customers (manager+)
//! GET  /admin/customers                - Customer list with order stats
//!
//! # Staff (admin only)
//! GET  /admin/staff?action=list|add    - Owner list / create form
//! POST /admin/staff?action=add         - Create owner
//! POST /admin/staff/{id}/active        - Activate or deactivate
//!
//! # Reservations (staff+)
//! GET  /admin/reservations?status=     - Reservation list
//! POST /admin/reservations/{id}/status - Status change
//! ```

pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod menu;
pub mod orders;
pub mod reservations;
pub mod staff;

use axum::{
    Router,
    routing::{get, post},
};

use cafe_core::OwnerRole;

use crate::config::CafeConfig;
use crate::flash::Flash;
use crate::middleware::auth_rate_limiter;
use crate::models::CurrentOwner;
use crate::state::AppState;

/// Logged-in owner view for the back-office layout.
#[derive(Debug, Clone)]
pub struct OwnerView {
    pub username: String,
    pub role: String,
    pub is_manager: bool,
    pub is_admin: bool,
}

impl From<&CurrentOwner> for OwnerView {
    fn from(owner: &CurrentOwner) -> Self {
        Self {
            username: owner.username.clone(),
            role: owner.role.clone(),
            is_manager: owner.has_permission(OwnerRole::Manager),
            is_admin: owner.has_permission(OwnerRole::Admin),
        }
    }
}

/// Data every back-office page layout needs.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub owner: OwnerView,
    /// Section the page belongs to, for navigation highlighting.
    pub current_path: &'static str,
    pub flash: Flash,
}

impl AdminContext {
    #[must_use]
    pub fn new(owner: &CurrentOwner, current_path: &'static str, flash: Flash) -> Self {
        Self {
            owner: owner.into(),
            current_path,
            flash,
        }
    }
}

/// Create the back-office router.
pub fn routes(config: &CafeConfig) -> Router<AppState> {
    Router::new()
        // Auth
        .route(
            "/login",
            post(auth::login)
                .layer(auth_rate_limiter(config.trust_proxy_headers))
                .get(auth::login_page),
        )
        .route("/logout", post(auth::logout))
        // Dashboard
        .route("/", get(dashboard::index))
        // Menu
        .route("/menu", get(menu::show).post(menu::submit))
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", post(orders::update_status))
        // Customers
        .route("/customers", get(customers::index))
        // Staff
        .route("/staff", get(staff::show).post(staff::submit))
        .route("/staff/{id}/active", post(staff::set_active))
        // Reservations
        .route("/reservations", get(reservations::index))
        .route("/reservations/{id}/status", post(reservations::update_status))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cafe_core::OwnerId;

    fn owner(role: &str) -> CurrentOwner {
        CurrentOwner {
            id: OwnerId::new(1),
            username: "priya".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_owner_view_flags() {
        let staff = OwnerView::from(&owner("staff"));
        assert!(!staff.is_manager);
        assert!(!staff.is_admin);

        let admin = OwnerView::from(&owner("admin"));
        assert!(admin.is_manager);
        assert!(admin.is_admin);
    }

    #[test]
    fn test_unknown_role_has_no_flags() {
        let view = OwnerView::from(&owner("root"));
        assert!(!view.is_manager);
        assert!(!view.is_admin);
    }
}
