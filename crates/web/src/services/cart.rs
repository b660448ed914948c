//! Cart operations that need the catalog.
//!
//! The cart itself is a pure value (`cafe_core::Cart`) held in the session;
//! only adding a new line reads the database, to snapshot the item.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use cafe_core::{Cart, CartError, MenuItemId};

use crate::db::{MenuItemRepository, RepositoryError};

/// Errors from adding to the cart.
#[derive(Debug, Error)]
pub enum AddToCartError {
    /// The item does not exist or is not available.
    #[error("menu item {0} is not available")]
    Unavailable(MenuItemId),

    /// The cart rejected the quantity.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AddToCartError {
    /// Message code for the redirect.
    ///
    /// Handlers return repository errors as server errors; their code is only
    /// a generic retry message.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) | Self::Cart(CartError::NotInCart(_)) => "item_unavailable",
            Self::Cart(_) => "quantity_limit",
            Self::Repository(_) => "cart_failed",
        }
    }
}

/// Cart service.
pub struct CartService<'a> {
    menu: MenuItemRepository<'a>,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            menu: MenuItemRepository::new(pool),
        }
    }

    /// Add `quantity` of an item.
    ///
    /// An item already in the cart is incremented and keeps its snapshot
    /// price. A new item is snapshotted from the catalog, and must be
    /// available.
    ///
    /// # Errors
    ///
    /// Returns `AddToCartError::Unavailable` if a new item is missing or
    /// unavailable, and `AddToCartError::Cart` for a zero or excessive
    /// quantity.
    #[instrument(skip(self, cart), fields(menu_item_id = %id))]
    pub async fn add(
        &self,
        cart: &mut Cart,
        id: MenuItemId,
        quantity: u32,
    ) -> Result<(), AddToCartError> {
        if cart.contains(id) {
            cart.increment(id, quantity)?;
            return Ok(());
        }
        if quantity == 0 {
            return Err(CartError::ZeroQuantity.into());
        }

        let item = self
            .menu
            .get_available(id)
            .await?
            .ok_or(AddToCartError::Unavailable(id))?;

        cart.insert(item.cart_entry(quantity))?;
        Ok(())
    }
}
