//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//! GET  /menu?category=            - Menu browse
//!
//! # Cart (fragments for fetch requests, redirects otherwise)
//! GET  /cart                      - Cart page
//! GET  /cart/count                - Cart count badge (fragment)
//! POST /cart/add                  - Add an item
//! POST /cart/increase             - +1
//! POST /cart/decrease             - -1, never below 1
//! POST /cart/remove               - Remove a line
//!
//! # Checkout
//! GET  /checkout                  - Checkout form
//! POST /checkout                  - Place order
//! GET  /orders/{id}/confirmation  - Order confirmation
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action (rate limited)
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action (rate limited)
//! POST /auth/logout               - Logout action
//!
//! # Account (requires customer)
//! GET  /account/orders            - Order history
//!
//! # Reservations
//! GET  /reservations              - Booking form
//! POST /reservations              - Request a table
//!
//! # Back office
//! /admin/...                      - See `admin`
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod menu;
pub mod reservations;
pub mod views;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::config::CafeConfig;
use crate::error::AppError;
use crate::flash::Flash;
use crate::middleware::{SessionContext, auth_rate_limiter};
use crate::state::AppState;

/// Data every public page layout needs.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub customer_name: Option<String>,
    pub cart_count: u32,
    pub flash: Flash,
}

impl PageContext {
    /// Build the layout context from the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be read.
    pub async fn load(ctx: &SessionContext, flash: Flash) -> Result<Self, AppError> {
        let customer = ctx.customer().await?;
        let cart = ctx.cart().await?;
        Ok(Self {
            customer_name: customer.map(|c| c.name),
            cart_count: cart.item_count(),
            flash,
        })
    }
}

/// Whether the request came from the page script rather than a plain form.
#[must_use]
pub fn is_fragment_request(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
}

/// Create the auth routes router.
pub fn auth_routes(config: &CafeConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(auth::login)
                .layer(auth_rate_limiter(config.trust_proxy_headers))
                .get(auth::login_page),
        )
        .route(
            "/register",
            post(auth::register)
                .layer(auth_rate_limiter(config.trust_proxy_headers))
                .get(auth::register_page),
        )
        .route("/logout", post(auth::logout))
}

/// Create all customer-facing routes.
pub fn routes(config: &CafeConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/menu", get(menu::index))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::page).post(checkout::submit))
        .route("/orders/{id}/confirmation", get(checkout::confirmation))
        .nest("/auth", auth_routes(config))
        .route("/account/orders", get(account::orders))
        .route(
            "/reservations",
            get(reservations::page).post(reservations::submit),
        )
        .nest("/admin", admin::routes(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_fragment_request_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_fragment_request(&headers));
        headers.insert("hx-request", HeaderValue::from_static("true"));
        assert!(is_fragment_request(&headers));
    }
}
