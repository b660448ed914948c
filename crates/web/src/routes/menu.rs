//! Menu browse page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::config::CafeConfig;
use crate::db::MenuItemRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::SessionContext;
use crate::models::MenuItem;
use crate::routes::PageContext;
use crate::state::AppState;

/// Menu item display data for templates.
#[derive(Debug, Clone)]
pub struct MenuItemView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub is_vegetarian: bool,
    pub is_vegan: bool,
    pub is_spicy: bool,
}

impl MenuItemView {
    #[must_use]
    pub fn new(item: &MenuItem, config: &CafeConfig) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: config.money(item.price),
            image_url: item.image_url.clone(),
            category: item.category.clone(),
            is_vegetarian: item.is_vegetarian,
            is_vegan: item.is_vegan,
            is_spicy: item.is_spicy,
        }
    }
}

/// Query parameters for the menu page.
#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub page: PageContext,
    pub items: Vec<MenuItemView>,
    pub categories: Vec<String>,
    pub selected_category: Option<String>,
}

/// Display available items, optionally in one category.
#[instrument(skip(state, ctx, query), fields(category = ?query.category))]
pub async fn index(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, AppError> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let menu = MenuItemRepository::new(state.pool());
    let items = menu.list_available(category).await?;
    let categories = menu.available_categories().await?;

    Ok(MenuTemplate {
        page: PageContext::load(&ctx, query.messages.flash()).await?,
        items: items
            .iter()
            .map(|item| MenuItemView::new(item, state.config()))
            .collect(),
        categories,
        selected_category: category.map(str::to_owned),
    })
}
