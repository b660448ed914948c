//! Order status changes from the back office.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use cafe_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, RepositoryError};

/// Errors from changing an order's status.
#[derive(Debug, Error)]
pub enum OrderStatusError {
    #[error("order not found")]
    NotFound,

    /// The move is not allowed from the order's current status, or another
    /// request changed the status first.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl OrderStatusError {
    /// Message code for the redirect.
    ///
    /// Handlers return repository errors as server errors; their code is only
    /// a generic retry message.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "order_not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Repository(_) => "update_failed",
        }
    }
}

/// Order status service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// Move an order to `target` if the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns `OrderStatusError::InvalidTransition` if the move is not
    /// allowed or lost a race with another update.
    #[instrument(skip(self), fields(order_id = %id, target = %target))]
    pub async fn update_status(
        &self,
        id: OrderId,
        target: OrderStatus,
    ) -> Result<OrderStatus, OrderStatusError> {
        let order = self
            .orders
            .get(id)
            .await?
            .ok_or(OrderStatusError::NotFound)?;

        let from = order.status;
        if !from.can_transition_to(target) {
            return Err(OrderStatusError::InvalidTransition { from, to: target });
        }
        if !self.orders.update_status(id, from, target).await? {
            return Err(OrderStatusError::InvalidTransition { from, to: target });
        }

        tracing::info!(from = %from, to = %target, "Order status changed");
        Ok(target)
    }
}
