//! Customer account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::{RequireCustomer, SessionContext};
use crate::routes::PageContext;
use crate::routes::views::OrderView;
use crate::state::AppState;

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderView>,
}

/// Display the customer's order history, newest first.
#[instrument(skip_all, fields(customer_id = %customer.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    ctx: SessionContext,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_customer(customer.id)
        .await?
        .iter()
        .map(|order| OrderView::new(order, state.config()))
        .collect();

    Ok(OrdersTemplate {
        page: PageContext::load(&ctx, query.flash()).await?,
        orders,
    })
}
