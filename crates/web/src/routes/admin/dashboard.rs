//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::{CustomerRepository, MenuItemRepository, OrderRepository};
use crate::error::AppError;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::RequireOwner;
use crate::routes::admin::AdminContext;
use crate::routes::views::OrderView;
use crate::state::AppState;

/// Orders shown in the recent list.
const RECENT_ORDERS: i64 = 10;

/// Dashboard counters, formatted for display.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub orders_today: i64,
    pub pending_orders: i64,
    pub menu_items: i64,
    pub customers: i64,
    pub revenue: String,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin: AdminContext,
    pub metrics: DashboardMetrics,
    /// Most recent orders.
    pub orders: Vec<OrderView>,
}

/// Dashboard overview.
#[instrument(skip_all, fields(owner_id = %owner.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pool = state.pool();
    let orders = OrderRepository::new(pool);
    let menu = MenuItemRepository::new(pool);
    let accounts = CustomerRepository::new(pool);

    let (stats, menu_items, customers, recent) = tokio::try_join!(
        orders.dashboard_stats(),
        menu.count(),
        accounts.count(),
        orders.list(None, RECENT_ORDERS),
    )?;

    let config = state.config();
    Ok(DashboardTemplate {
        admin: AdminContext::new(&owner, "/admin", query.flash()),
        metrics: DashboardMetrics {
            orders_today: stats.orders_today,
            pending_orders: stats.pending_orders,
            menu_items,
            customers,
            revenue: config.money(stats.revenue),
        },
        orders: recent
            .iter()
            .map(|order| OrderView::new(order, config))
            .collect(),
    })
}
