//! Customer domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use cafe_core::{CustomerId, Email};

/// A registered customer.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    /// Normalized international form, e.g. `+919876543210`.
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A customer with order statistics, for the back office list.
#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub order_count: i64,
    /// Sum of non-cancelled order totals.
    pub total_spent: Decimal,
}
