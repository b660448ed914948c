//! Session-held shopping cart.
//!
//! A cart line is a *snapshot* of a menu item taken when it was first added:
//! later catalog edits (price, name, image) do not reach lines already in the
//! cart. The cart is serialized into the browser session as a whole.
//!
//! Invariants:
//! - every retained line has `1 <= quantity <= MAX_LINE_QUANTITY`
//! - there is at most one line per menu item
//! - `subtotal()` is always the sum of snapshot price × quantity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::MenuItemId;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Errors from cart mutations. The cart is unchanged whenever one is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// A quantity of zero was requested.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// The line would exceed [`MAX_LINE_QUANTITY`].
    #[error("at most {max} of one item per order")]
    QuantityLimit {
        /// The per-line cap.
        max: u32,
    },
    /// The item is not in the cart.
    #[error("item {0} is not in the cart")]
    NotInCart(MenuItemId),
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub menu_item_id: MenuItemId,
    pub name: String,
    /// Unit price at the moment the item was added.
    pub price: Decimal,
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartEntry {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The shopping cart, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    #[must_use]
    pub fn contains(&self, id: MenuItemId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: MenuItemId) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.menu_item_id == id)
    }

    fn get_mut(&mut self, id: MenuItemId) -> Result<&mut CartEntry, CartError> {
        self.entries
            .iter_mut()
            .find(|e| e.menu_item_id == id)
            .ok_or(CartError::NotInCart(id))
    }

    /// Insert a freshly taken snapshot.
    ///
    /// If the item is already in the cart the existing snapshot is kept and only
    /// the quantity grows, so re-adding never refreshes a price.
    ///
    /// # Errors
    ///
    /// [`CartError::ZeroQuantity`] or [`CartError::QuantityLimit`].
    pub fn insert(&mut self, entry: CartEntry) -> Result<(), CartError> {
        if self.contains(entry.menu_item_id) {
            return self.increment(entry.menu_item_id, entry.quantity);
        }
        checked_quantity(0, entry.quantity)?;
        self.entries.push(entry);
        Ok(())
    }

    /// Add `quantity` units to an item already in the cart.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`], [`CartError::ZeroQuantity`] or
    /// [`CartError::QuantityLimit`].
    pub fn increment(&mut self, id: MenuItemId, quantity: u32) -> Result<(), CartError> {
        let entry = self.get_mut(id)?;
        entry.quantity = checked_quantity(entry.quantity, quantity)?;
        Ok(())
    }

    /// Add one unit.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`] or [`CartError::QuantityLimit`].
    pub fn increase(&mut self, id: MenuItemId) -> Result<(), CartError> {
        self.increment(id, 1)
    }

    /// Remove one unit, never going below 1. Use [`remove`](Self::remove) to
    /// drop a line.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`].
    pub fn decrease(&mut self, id: MenuItemId) -> Result<(), CartError> {
        let entry = self.get_mut(id)?;
        if entry.quantity > 1 {
            entry.quantity -= 1;
        }
        Ok(())
    }

    /// Drop a line entirely, returning it if it was present.
    pub fn remove(&mut self, id: MenuItemId) -> Option<CartEntry> {
        let index = self.entries.iter().position(|e| e.menu_item_id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Total number of units across all lines (the header badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.entries.iter().map(|e| e.quantity).sum()
    }

    /// Sum of snapshot price × quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.entries.iter().map(CartEntry::line_total).sum()
    }
}

fn checked_quantity(current: u32, added: u32) -> Result<u32, CartError> {
    if added == 0 {
        return Err(CartError::ZeroQuantity);
    }
    current
        .checked_add(added)
        .filter(|q| *q <= MAX_LINE_QUANTITY)
        .ok_or(CartError::QuantityLimit {
            max: MAX_LINE_QUANTITY,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn entry(id: i32, price: i64, quantity: u32) -> CartEntry {
        CartEntry {
            menu_item_id: MenuItemId::new(id),
            name: format!("Item {id}"),
            price: Decimal::new(price, 0),
            image_url: None,
            quantity,
        }
    }

    #[test]
    fn test_scenario_subtotal() {
        let mut cart = Cart::new();
        cart.insert(entry(1, 80, 2)).unwrap();
        cart.insert(entry(2, 60, 1)).unwrap();
        assert_eq!(cart.subtotal(), Decimal::new(220, 0));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_insert_existing_keeps_snapshot_price() {
        let mut cart = Cart::new();
        cart.insert(entry(1, 80, 1)).unwrap();
        // Catalog price changed to 95 before the second add.
        cart.insert(entry(1, 95, 2)).unwrap();
        let line = cart.get(MenuItemId::new(1)).unwrap();
        assert_eq!(line.price, Decimal::new(80, 0));
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.entries().len(), 1);
    }

    #[test]
    fn test_decrease_clamps_at_one() {
        let mut cart = Cart::new();
        cart.insert(entry(1, 50, 1)).unwrap();
        cart.decrease(MenuItemId::new(1)).unwrap();
        cart.decrease(MenuItemId::new(1)).unwrap();
        assert_eq!(cart.get(MenuItemId::new(1)).unwrap().quantity, 1);
    }

    #[test]
    fn test_only_remove_deletes() {
        let mut cart = Cart::new();
        cart.insert(entry(1, 50, 2)).unwrap();
        assert!(cart.remove(MenuItemId::new(1)).is_some());
        assert!(cart.is_empty());
        assert!(cart.remove(MenuItemId::new(1)).is_none());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = Cart::new();
        assert_eq!(cart.insert(entry(1, 10, 0)), Err(CartError::ZeroQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::new();
        cart.insert(entry(1, 10, MAX_LINE_QUANTITY)).unwrap();
        assert_eq!(
            cart.increase(MenuItemId::new(1)),
            Err(CartError::QuantityLimit {
                max: MAX_LINE_QUANTITY
            })
        );
        assert_eq!(
            cart.get(MenuItemId::new(1)).unwrap().quantity,
            MAX_LINE_QUANTITY
        );
        assert_eq!(
            cart.insert(entry(2, 10, MAX_LINE_QUANTITY + 1)),
            Err(CartError::QuantityLimit {
                max: MAX_LINE_QUANTITY
            })
        );
    }

    #[test]
    fn test_mutating_missing_item() {
        let mut cart = Cart::new();
        let id = MenuItemId::new(9);
        assert_eq!(cart.increase(id), Err(CartError::NotInCart(id)));
        assert_eq!(cart.decrease(id), Err(CartError::NotInCart(id)));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.insert(entry(1, 10, 1)).unwrap();
        cart.insert(entry(2, 10, 1)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_random_operation_sequences_keep_invariants() {
        let prices = [80_i64, 60, 125, 45, 10];
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cart = Cart::new();
            for _ in 0..200 {
                let idx = rng.random_range(0..prices.len());
                let id = MenuItemId::new(i32::try_from(idx).unwrap());
                let _ = match rng.random_range(0..4) {
                    0 => cart.insert(entry(id.as_i32(), prices[idx], rng.random_range(1..4))),
                    1 => cart.increase(id),
                    2 => cart.decrease(id),
                    _ => {
                        cart.remove(id);
                        Ok(())
                    }
                };

                let expected: Decimal = cart
                    .entries()
                    .iter()
                    .map(|e| e.price * Decimal::from(e.quantity))
                    .sum();
                assert_eq!(cart.subtotal(), expected);
                assert!(
                    cart.entries()
                        .iter()
                        .all(|e| (1..=MAX_LINE_QUANTITY).contains(&e.quantity))
                );
            }
        }
    }

    #[test]
    fn test_serde_roundtrip_through_session_value() {
        let mut cart = Cart::new();
        cart.insert(entry(3, 75, 2)).unwrap();
        let value = serde_json::to_value(&cart).unwrap();
        let restored: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(restored, cart);
    }
}
