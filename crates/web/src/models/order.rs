//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use cafe_core::{CustomerId, MenuItemId, OrderId, OrderItemId, OrderStatus, OrderType};

/// A placed order. Amounts are fixed at creation.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// `None` for guest orders and for customers since deleted.
    pub customer_id: Option<CustomerId>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub delivery_fee: Decimal,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A snapshot line of an order.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: OrderItemId,
    /// `None` once the menu item has been deleted.
    pub menu_item_id: Option<MenuItemId>,
    pub item_name: String,
    pub quantity: u32,
    pub price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Back-office dashboard counters.
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub orders_today: i64,
    pub pending_orders: i64,
    pub menu_items: i64,
    pub customers: i64,
    /// Total of completed orders.
    pub revenue: Decimal,
}
