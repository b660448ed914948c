//! Order drafting.
//!
//! An [`OrderDraft`] is everything needed to persist one order: the header
//! fields, totals computed from cart snapshot prices and one
//! [`OrderLineSnapshot`] per cart line. Building the draft is pure, so the
//! repository only has to write it inside a transaction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartEntry};
use crate::pricing::{CheckoutTotals, PricingConfig};
use crate::types::{CustomerId, MenuItemId, OrderType};

/// Name and price of a menu item as it was when ordered.
///
/// Deliberately separate from the catalog row: it is never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineSnapshot {
    pub menu_item_id: MenuItemId,
    pub item_name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderLineSnapshot {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl From<&CartEntry> for OrderLineSnapshot {
    fn from(entry: &CartEntry) -> Self {
        Self {
            menu_item_id: entry.menu_item_id,
            item_name: entry.name.clone(),
            price: entry.price,
            quantity: entry.quantity,
        }
    }
}

/// Delivery and contact details collected on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutDetails {
    /// Set when a customer is logged in; `None` places a guest order.
    pub customer_id: Option<CustomerId>,
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub contact_name: String,
    /// Already normalized to international form.
    pub contact_phone: String,
    pub contact_email: Option<String>,
}

/// Reasons a cart cannot become an order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderDraftError {
    #[error("your cart is empty")]
    EmptyCart,
    #[error("a delivery address is required for delivery orders")]
    MissingDeliveryAddress,
    #[error("a contact name is required")]
    MissingContactName,
    #[error("a contact phone number is required")]
    MissingContactPhone,
}

/// A fully priced order ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub customer_id: Option<CustomerId>,
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub totals: CheckoutTotals,
    pub lines: Vec<OrderLineSnapshot>,
}

impl OrderDraft {
    /// Price a cart and attach the checkout details.
    ///
    /// Blank optional text is stored as `None`. Pickup orders never carry a
    /// delivery address.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderDraftError`] if the cart is empty, a delivery order
    /// has no address, or the contact name or phone is blank.
    pub fn from_cart(
        cart: &Cart,
        details: CheckoutDetails,
        pricing: &PricingConfig,
    ) -> Result<Self, OrderDraftError> {
        if cart.is_empty() {
            return Err(OrderDraftError::EmptyCart);
        }

        let delivery_address = match details.order_type {
            OrderType::Delivery => Some(
                non_blank(details.delivery_address)
                    .ok_or(OrderDraftError::MissingDeliveryAddress)?,
            ),
            OrderType::Pickup => None,
        };

        let contact_name = details.contact_name.trim().to_owned();
        if contact_name.is_empty() {
            return Err(OrderDraftError::MissingContactName);
        }
        let contact_phone = details.contact_phone.trim().to_owned();
        if contact_phone.is_empty() {
            return Err(OrderDraftError::MissingContactPhone);
        }

        let lines: Vec<OrderLineSnapshot> =
            cart.entries().iter().map(OrderLineSnapshot::from).collect();
        let subtotal: Decimal = lines.iter().map(OrderLineSnapshot::line_total).sum();
        let totals = CheckoutTotals::compute(subtotal, details.order_type, pricing);

        Ok(Self {
            customer_id: details.customer_id,
            order_type: details.order_type,
            delivery_address,
            special_instructions: non_blank(details.special_instructions),
            contact_name,
            contact_phone,
            contact_email: non_blank(details.contact_email),
            totals,
            lines,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}
