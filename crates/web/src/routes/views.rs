//! Display types shared by customer and back-office pages.

use cafe_core::{OrderStatus, OrderType};

use crate::config::CafeConfig;
use crate::models::{Order, OrderItem};

/// Timestamp format used on order pages.
const DATETIME_FORMAT: &str = "%d %b %Y, %H:%M";

/// Order line display data.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Order display data with pre-formatted amounts.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub status: &'static str,
    pub status_label: &'static str,
    pub order_type_label: &'static str,
    pub is_delivery: bool,
    pub is_guest: bool,
    pub placed_at: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    pub subtotal: String,
    pub tax: String,
    pub delivery_fee: String,
    pub total: String,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    /// Summary view without lines.
    #[must_use]
    pub fn new(order: &Order, config: &CafeConfig) -> Self {
        Self {
            id: order.id.as_i32(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            order_type_label: order.order_type.label(),
            is_delivery: order.order_type == OrderType::Delivery,
            is_guest: order.customer_id.is_none(),
            placed_at: order.created_at.format(DATETIME_FORMAT).to_string(),
            contact_name: order.contact_name.clone(),
            contact_phone: order.contact_phone.clone(),
            contact_email: order.contact_email.clone(),
            delivery_address: order.delivery_address.clone(),
            special_instructions: order.special_instructions.clone(),
            subtotal: config.money(order.subtotal),
            tax: config.money(order.tax_amount),
            delivery_fee: config.money(order.delivery_fee),
            total: config.money(order.total_amount),
            lines: Vec::new(),
        }
    }

    /// Full view including lines.
    #[must_use]
    pub fn with_items(order: &Order, items: &[OrderItem], config: &CafeConfig) -> Self {
        Self {
            lines: items
                .iter()
                .map(|item| OrderLineView {
                    name: item.item_name.clone(),
                    quantity: item.quantity,
                    price: config.money(item.price),
                    line_total: config.money(item.line_total()),
                })
                .collect(),
            ..Self::new(order, config)
        }
    }
}

/// A status choice for a select element.
#[derive(Debug, Clone, Copy)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Statuses an order can move to from `status`.
#[must_use]
pub fn order_status_options(status: OrderStatus) -> Vec<StatusOption> {
    OrderStatus::ALL
        .into_iter()
        .filter(|target| status.can_transition_to(*target))
        .map(|target| StatusOption {
            value: target.as_str(),
            label: target.label(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use cafe_core::{MenuItemId, OrderId, OrderItemId};

    fn order() -> Order {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 18, 5, 0).unwrap();
        Order {
            id: OrderId::new(12),
            customer_id: None,
            subtotal: Decimal::new(220, 0),
            tax_amount: Decimal::new(1100, 2),
            delivery_fee: Decimal::new(30, 0),
            total_amount: Decimal::new(26100, 2),
            status: OrderStatus::Pending,
            order_type: OrderType::Delivery,
            delivery_address: Some("12 MG Road".to_string()),
            special_instructions: None,
            contact_name: "Ravi Kumar".to_string(),
            contact_phone: "+919876543210".to_string(),
            contact_email: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_order_view_amounts() {
        let config = CafeConfig::for_tests();
        let items = vec![OrderItem {
            id: OrderItemId::new(1),
            menu_item_id: Some(MenuItemId::new(3)),
            item_name: "Veg Thali".to_string(),
            quantity: 2,
            price: Decimal::new(80, 0),
        }];
        let view = OrderView::with_items(&order(), &items, &config);
        assert_eq!(view.total, "₹261.00");
        assert_eq!(view.tax, "₹11.00");
        assert_eq!(view.placed_at, "14 Mar 2026, 18:05");
        assert!(view.is_guest);
        assert_eq!(view.lines.len(), 1);
    }

    #[test]
    fn test_status_options_follow_lifecycle() {
        let values: Vec<&str> = order_status_options(OrderStatus::Pending)
            .iter()
            .map(|o| o.value)
            .collect();
        assert!(values.contains(&"confirmed"));
        assert!(values.contains(&"cancelled"));
        assert!(!values.contains(&"pending"));
        assert!(order_status_options(OrderStatus::Completed).is_empty());
    }
}
