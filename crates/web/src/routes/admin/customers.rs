//! Back-office customer list.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::CustomerRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::RequireManager;
use crate::routes::admin::AdminContext;
use crate::state::AppState;

/// Customer row display data.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub joined: String,
    pub order_count: i64,
    pub total_spent: String,
}

/// Customer list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/customers.html")]
pub struct CustomerListTemplate {
    pub admin: AdminContext,
    pub customers: Vec<CustomerView>,
}

/// Read-only customer list with order statistics.
#[instrument(skip_all, fields(owner_id = %owner.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireManager(owner): RequireManager,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.config();
    let customers = CustomerRepository::new(state.pool())
        .list_with_order_stats()
        .await?
        .into_iter()
        .map(|summary| CustomerView {
            name: summary.customer.name,
            email: summary.customer.email.into_inner(),
            phone: summary.customer.phone,
            joined: summary.customer.created_at.format("%d %b %Y").to_string(),
            order_count: summary.order_count,
            total_spent: config.money(summary.total_spent),
        })
        .collect();

    Ok(CustomerListTemplate {
        admin: AdminContext::new(&owner, "/admin/customers", query.flash()),
        customers,
    })
}
