//! Order repository for database operations.
//!
//! Orders are written once, from an [`OrderDraft`], inside a single
//! transaction. After that only the status changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use cafe_core::{
    CustomerId, MenuItemId, OrderDraft, OrderId, OrderItemId, OrderStatus, OrderType,
};

use super::{RepositoryError, quantity_from_db};
use crate::models::{DashboardStats, Order, OrderItem};

/// Database row for an order.
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    customer_id: Option<i32>,
    subtotal: Decimal,
    tax_amount: Decimal,
    delivery_fee: Decimal,
    total_amount: Decimal,
    status: String,
    order_type: String,
    delivery_address: Option<String>,
    special_instructions: Option<String>,
    contact_name: String,
    contact_phone: String,
    contact_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::parse(&row.status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid order status: {}", row.status))
        })?;
        let order_type = OrderType::parse(&row.order_type).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid order type: {}", row.order_type))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            customer_id: row.customer_id.map(CustomerId::new),
            subtotal: row.subtotal,
            tax_amount: row.tax_amount,
            delivery_fee: row.delivery_fee,
            total_amount: row.total_amount,
            status,
            order_type,
            delivery_address: row.delivery_address,
            special_instructions: row.special_instructions,
            contact_name: row.contact_name,
            contact_phone: row.contact_phone,
            contact_email: row.contact_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for an order line.
#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    menu_item_id: Option<i32>,
    item_name: String,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderItemId::new(row.id),
            menu_item_id: row.menu_item_id.map(MenuItemId::new),
            item_name: row.item_name,
            quantity: quantity_from_db(row.quantity)?,
            price: row.price,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DashboardRow {
    orders_today: i64,
    pending_orders: i64,
    revenue: Decimal,
}

const ORDER_COLUMNS: &str = "id, customer_id, subtotal, tax_amount, delivery_fee, total_amount, \
     status, order_type, delivery_address, special_instructions, \
     contact_name, contact_phone, contact_email, created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a draft as one pending order plus its lines.
    ///
    /// Either every row is written or none is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; the
    /// transaction is rolled back.
    pub async fn create(&self, draft: &OrderDraft) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO orders
                (customer_id, subtotal, tax_amount, delivery_fee, total_amount,
                 status, order_type, delivery_address, special_instructions,
                 contact_name, contact_phone, contact_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            ",
        )
        .bind(draft.customer_id)
        .bind(draft.totals.subtotal)
        .bind(draft.totals.tax)
        .bind(draft.totals.delivery_fee)
        .bind(draft.totals.total)
        .bind(OrderStatus::Pending.as_str())
        .bind(draft.order_type.as_str())
        .bind(draft.delivery_address.as_deref())
        .bind(draft.special_instructions.as_deref())
        .bind(&draft.contact_name)
        .bind(&draft.contact_phone)
        .bind(draft.contact_email.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity out of range: {}", line.quantity))
            })?;

            sqlx::query(
                r"
                INSERT INTO order_items (order_id, menu_item_id, item_name, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(line.menu_item_id)
            .bind(&line.item_name)
            .bind(quantity)
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(OrderId::new(order_id))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored enum value is unknown.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Order::try_from)
        .transpose()
    }

    /// Get the lines of an order in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT id, menu_item_id, item_name, quantity, price
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(OrderItem::try_from)
        .collect()
    }

    /// List orders newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE $1::TEXT IS NULL OR status = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        ))
        .bind(status.map(OrderStatus::as_str))
        .bind(limit)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect()
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE customer_id = $1
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect()
    }

    /// Move an order from `from` to `to`.
    ///
    /// The update is conditional on the current status so two concurrent
    /// changes cannot both apply. Returns `false` if the order was no longer
    /// in `from`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2
            ",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Order counters for the dashboard. Menu and customer counts are filled
    /// in by their own repositories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let row = sqlx::query_as::<_, DashboardRow>(
            r"
            SELECT
                COUNT(*) FILTER (WHERE created_at >= date_trunc('day', now())) AS orders_today,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_orders,
                COALESCE(SUM(total_amount) FILTER (WHERE status = 'completed'), 0) AS revenue
            FROM orders
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardStats {
            orders_today: row.orders_today,
            pending_orders: row.pending_orders,
            revenue: row.revenue,
            ..DashboardStats::default()
        })
    }
}
