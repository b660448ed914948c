//! Session configuration and typed session access.
//!
//! Sessions live in `PostgreSQL` (via tower-sessions) in production; tests use
//! the in-memory store. Handlers never touch raw session keys: they go through
//! [`SessionContext`], which owns the key names and value types.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore, session};

use cafe_core::{Cart, MenuItemId, OrderId};

use crate::config::CafeConfig;
use crate::error::AppError;
use crate::models::{CurrentCustomer, CurrentOwner, session_keys};
use crate::services::tokens::{generate_token, tokens_match};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cafe_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer over `store`.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &CafeConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.secure_cookies())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// A menu item delete waiting for confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingDelete {
    menu_item_id: MenuItemId,
    token: String,
}

/// Typed access to the per-browser session.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(ctx: SessionContext) -> Result<String, AppError> {
///     let cart = ctx.cart().await?;
///     Ok(format!("{} items", cart.item_count()))
/// }
/// ```
#[derive(Clone)]
pub struct SessionContext(Session);

type SessionResult<T> = Result<T, session::Error>;

impl SessionContext {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// The session's cart; empty if none was stored.
    ///
    /// A stored cart that no longer deserializes is discarded rather than
    /// failing every page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn cart(&self) -> SessionResult<Cart> {
        match self.0.get::<Cart>(session_keys::CART).await {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            Err(session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable cart");
                self.0.remove_value(session_keys::CART).await?;
                Ok(Cart::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Store the cart. An empty cart removes the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save_cart(&self, cart: &Cart) -> SessionResult<()> {
        if cart.is_empty() {
            return self.clear_cart().await;
        }
        self.0.insert(session_keys::CART, cart).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn clear_cart(&self) -> SessionResult<()> {
        self.0.remove_value(session_keys::CART).await?;
        Ok(())
    }

    // =========================================================================
    // Identities
    // =========================================================================

    /// The logged-in customer, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn customer(&self) -> SessionResult<Option<CurrentCustomer>> {
        self.0.get(session_keys::CURRENT_CUSTOMER).await
    }

    /// Log a customer in. Cycles the session id.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn login_customer(&self, customer: &CurrentCustomer) -> SessionResult<()> {
        self.0.cycle_id().await?;
        self.0.insert(session_keys::CURRENT_CUSTOMER, customer).await
    }

    /// Log the customer out, keeping the cart and any owner login.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn logout_customer(&self) -> SessionResult<()> {
        self.0.remove_value(session_keys::CURRENT_CUSTOMER).await?;
        self.0.cycle_id().await
    }

    /// The logged-in owner, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn owner(&self) -> SessionResult<Option<CurrentOwner>> {
        self.0.get(session_keys::CURRENT_OWNER).await
    }

    /// Log an owner in. Cycles the session id.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn login_owner(&self, owner: &CurrentOwner) -> SessionResult<()> {
        self.0.cycle_id().await?;
        self.set_owner(owner).await
    }

    /// Replace the stored owner identity without cycling the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn set_owner(&self, owner: &CurrentOwner) -> SessionResult<()> {
        self.0.insert(session_keys::CURRENT_OWNER, owner).await
    }

    /// Log the owner out, keeping any customer login.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn logout_owner(&self) -> SessionResult<()> {
        self.0.remove_value(session_keys::CURRENT_OWNER).await?;
        self.0.remove_value(session_keys::PENDING_DELETE).await?;
        self.0.cycle_id().await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Id of the last order placed from this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn last_order_id(&self) -> SessionResult<Option<OrderId>> {
        self.0.get(session_keys::LAST_ORDER_ID).await
    }

    /// Remember the order this session just placed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn set_last_order_id(&self, id: OrderId) -> SessionResult<()> {
        self.0.insert(session_keys::LAST_ORDER_ID, id).await
    }

    /// Issue a fresh checkout token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn issue_checkout_token(&self) -> SessionResult<String> {
        let token = generate_token();
        self.0.insert(session_keys::CHECKOUT_TOKEN, &token).await?;
        Ok(token)
    }

    /// Consume the checkout token. Returns `true` only if `submitted`
    /// matches the stored token; the stored token is removed either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn take_checkout_token(&self, submitted: &str) -> SessionResult<bool> {
        let stored: Option<String> = self.0.remove(session_keys::CHECKOUT_TOKEN).await?;
        Ok(stored.is_some_and(|token| tokens_match(&token, submitted)))
    }

    // =========================================================================
    // Back office
    // =========================================================================

    /// Issue a delete confirmation token for one menu item.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn issue_delete_token(&self, menu_item_id: MenuItemId) -> SessionResult<String> {
        let pending = PendingDelete {
            menu_item_id,
            token: generate_token(),
        };
        self.0.insert(session_keys::PENDING_DELETE, &pending).await?;
        Ok(pending.token)
    }

    /// Consume the delete confirmation. Returns `true` only for the same item
    /// and token that were issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn take_delete_token(
        &self,
        menu_item_id: MenuItemId,
        submitted: &str,
    ) -> SessionResult<bool> {
        let pending: Option<PendingDelete> = self.0.remove(session_keys::PENDING_DELETE).await?;
        Ok(pending.is_some_and(|p| {
            p.menu_item_id == menu_item_id && tokens_match(&p.token, submitted)
        }))
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use cafe_core::{CartEntry, CustomerId, Email, OwnerId};
    use rust_decimal::Decimal;
    use tower_sessions::MemoryStore;

    use super::*;

    fn context() -> SessionContext {
        SessionContext::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    fn entry(id: i32, quantity: u32) -> CartEntry {
        CartEntry {
            menu_item_id: MenuItemId::new(id),
            name: "Samosa".to_string(),
            price: Decimal::new(30, 0),
            image_url: None,
            quantity,
        }
    }

    #[tokio::test]
    async fn test_cart_round_trip_and_clear() {
        let ctx = context();
        assert!(ctx.cart().await.unwrap().is_empty());

        let mut cart = Cart::new();
        cart.insert(entry(1, 2)).unwrap();
        ctx.save_cart(&cart).await.unwrap();
        assert_eq!(ctx.cart().await.unwrap().item_count(), 2);

        ctx.clear_cart().await.unwrap();
        assert!(ctx.cart().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cart_is_discarded() {
        let ctx = context();
        ctx.0.insert(session_keys::CART, "not a cart").await.unwrap();
        assert!(ctx.cart().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_token_single_use() {
        let ctx = context();
        let token = ctx.issue_checkout_token().await.unwrap();
        assert!(ctx.take_checkout_token(&token).await.unwrap());
        assert!(!ctx.take_checkout_token(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_checkout_token_wrong_value_consumes() {
        let ctx = context();
        let token = ctx.issue_checkout_token().await.unwrap();
        assert!(!ctx.take_checkout_token("forged").await.unwrap());
        assert!(!ctx.take_checkout_token(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_token_bound_to_item() {
        let ctx = context();
        let token = ctx.issue_delete_token(MenuItemId::new(3)).await.unwrap();
        assert!(!ctx.take_delete_token(MenuItemId::new(4), &token).await.unwrap());

        let token = ctx.issue_delete_token(MenuItemId::new(3)).await.unwrap();
        assert!(ctx.take_delete_token(MenuItemId::new(3), &token).await.unwrap());
        assert!(!ctx.take_delete_token(MenuItemId::new(3), &token).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_scopes_are_independent() {
        let ctx = context();
        let customer = CurrentCustomer {
            id: CustomerId::new(1),
            name: "Asha Rao".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
        };
        let owner = CurrentOwner {
            id: OwnerId::new(2),
            username: "mia".to_string(),
            role: "manager".to_string(),
        };
        let mut cart = Cart::new();
        cart.insert(entry(5, 1)).unwrap();

        ctx.login_customer(&customer).await.unwrap();
        ctx.login_owner(&owner).await.unwrap();
        ctx.save_cart(&cart).await.unwrap();

        ctx.logout_customer().await.unwrap();
        assert_eq!(ctx.customer().await.unwrap(), None);
        assert_eq!(ctx.owner().await.unwrap(), Some(owner));
        assert_eq!(ctx.cart().await.unwrap().item_count(), 1);

        ctx.logout_owner().await.unwrap();
        assert_eq!(ctx.owner().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_order_id() {
        let ctx = context();
        assert_eq!(ctx.last_order_id().await.unwrap(), None);
        ctx.set_last_order_id(OrderId::new(41)).await.unwrap();
        assert_eq!(ctx.last_order_id().await.unwrap(), Some(OrderId::new(41)));
    }
}
