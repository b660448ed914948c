//! Menu domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use cafe_core::{CartEntry, MenuItemId};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_spicy: bool,
    /// Unavailable items are hidden from customers and cannot be added to carts.
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl MenuItem {
    /// Snapshot this item for the cart.
    #[must_use]
    pub fn cart_entry(&self, quantity: u32) -> CartEntry {
        CartEntry {
            menu_item_id: self.id,
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            quantity,
        }
    }
}

/// Validated fields for creating or editing a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItemInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_spicy: bool,
    pub is_available: bool,
}
