//! Back-office order handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use cafe_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::RequireOwner;
use crate::routes::admin::AdminContext;
use crate::routes::views::{OrderView, StatusOption, order_status_options};
use crate::services::orders::{OrderService, OrderStatusError};
use crate::state::AppState;

/// Orders shown per list page.
const ORDER_LIST_LIMIT: i64 = 200;

/// Order list query.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/orders.html")]
pub struct OrderListTemplate {
    pub admin: AdminContext,
    pub orders: Vec<OrderView>,
    pub statuses: Vec<StatusOption>,
    pub selected_status: Option<&'static str>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/order_detail.html")]
pub struct OrderDetailTemplate {
    pub admin: AdminContext,
    pub order: OrderView,
    pub next_statuses: Vec<StatusOption>,
}

/// Order list, optionally filtered by status.
#[instrument(skip_all, fields(status = ?query.status))]
pub async fn index(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse, AppError> {
    // An unknown filter value shows every order.
    let status = query.status.as_deref().and_then(OrderStatus::parse);

    let orders = OrderRepository::new(state.pool())
        .list(status, ORDER_LIST_LIMIT)
        .await?;

    Ok(OrderListTemplate {
        admin: AdminContext::new(&owner, "/admin/orders", query.messages.flash()),
        orders: orders
            .iter()
            .map(|order| OrderView::new(order, state.config()))
            .collect(),
        statuses: OrderStatus::ALL
            .into_iter()
            .map(|s| StatusOption {
                value: s.as_str(),
                label: s.label(),
            })
            .collect(),
        selected_status: status.map(OrderStatus::as_str),
    })
}

/// Order detail with lines.
#[instrument(skip(state, owner, query))]
pub async fn show(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(id): Path<i32>,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let order_id = OrderId::new(id);
    let repo = OrderRepository::new(state.pool());

    let Some(order) = repo.get(order_id).await? else {
        return Ok(Redirect::to("/admin/orders?error=order_not_found").into_response());
    };
    let items = repo.items(order_id).await?;

    Ok(OrderDetailTemplate {
        admin: AdminContext::new(&owner, "/admin/orders", query.flash()),
        next_statuses: order_status_options(order.status),
        order: OrderView::with_items(&order, &items, state.config()),
    }
    .into_response())
}

/// Move an order to a new status.
#[instrument(skip(state, owner, form), fields(owner_id = %owner.id, target = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    let order_id = OrderId::new(id);
    let detail = format!("/admin/orders/{order_id}");

    let Some(target) = OrderStatus::parse(&form.status) else {
        return Ok(Redirect::to(&format!("{detail}?error=invalid_transition")).into_response());
    };

    match OrderService::new(state.pool())
        .update_status(order_id, target)
        .await
    {
        Ok(_) => Ok(Redirect::to(&format!("{detail}?success=status_updated")).into_response()),
        Err(OrderStatusError::Repository(e)) => Err(e.into()),
        Err(OrderStatusError::NotFound) => {
            Ok(Redirect::to("/admin/orders?error=order_not_found").into_response())
        }
        Err(e) => {
            tracing::info!(error = %e, "Order status change refused");
            Ok(Redirect::to(&format!("{detail}?error={}", e.code())).into_response())
        }
    }
}
