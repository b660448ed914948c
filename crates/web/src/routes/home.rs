//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::MenuItemRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::SessionContext;
use crate::routes::PageContext;
use crate::routes::menu::MenuItemView;
use crate::state::AppState;

/// Number of items featured on the home page.
const FEATURED_ITEMS: i64 = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub featured: Vec<MenuItemView>,
}

/// Display the home page with the newest available items.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let featured = MenuItemRepository::new(state.pool())
        .latest_available(FEATURED_ITEMS)
        .await?;

    Ok(HomeTemplate {
        page: PageContext::load(&ctx, query.flash()).await?,
        featured: featured
            .iter()
            .map(|item| MenuItemView::new(item, state.config()))
            .collect(),
    })
}
