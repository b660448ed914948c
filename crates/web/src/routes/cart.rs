//! Cart route handlers.
//!
//! The cart lives in the session. Requests sent by the page script get HTML
//! fragments plus an `HX-Trigger: cart-updated` header; plain form posts get
//! a redirect with a message code.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use cafe_core::{Cart, CartError, MenuItemId};

use crate::config::CafeConfig;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::SessionContext;
use crate::routes::{PageContext, is_fragment_request};
use crate::services::cart::{AddToCartError, CartService};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub menu_item_id: i32,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, config: &CafeConfig) -> Self {
        Self {
            lines: cart
                .entries()
                .iter()
                .map(|entry| CartLineView {
                    menu_item_id: entry.menu_item_id.as_i32(),
                    name: entry.name.clone(),
                    image_url: entry.image_url.clone(),
                    quantity: entry.quantity,
                    price: config.money(entry.price),
                    line_total: config.money(entry.line_total()),
                })
                .collect(),
            subtotal: config.money(cart.subtotal()),
            item_count: cart.item_count(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub menu_item_id: i32,
    pub quantity: Option<u32>,
}

/// Form for operations on an existing line.
#[derive(Debug, Deserialize)]
pub struct CartLineForm {
    pub menu_item_id: i32,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart lines fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cart = ctx.cart().await?;

    Ok(CartShowTemplate {
        page: PageContext::load(&ctx, query.flash()).await?,
        cart: CartView::new(&cart, state.config()),
    })
}

/// Cart count badge.
#[instrument(skip_all)]
pub async fn count(ctx: SessionContext) -> Result<impl IntoResponse, AppError> {
    let cart = ctx.cart().await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

/// Add an item to the cart.
#[instrument(skip(state, ctx, headers))]
pub async fn add(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let id = MenuItemId::new(form.menu_item_id);
    let quantity = form.quantity.unwrap_or(1);
    let mut cart = ctx.cart().await?;

    match CartService::new(state.pool()).add(&mut cart, id, quantity).await {
        Ok(()) => {
            ctx.save_cart(&cart).await?;
            let item = id.to_string();
            add_breadcrumb("cart", "Added item", Some(&[("menu_item_id", item.as_str())]));

            if is_fragment_request(&headers) {
                return Ok((
                    AppendHeaders([("HX-Trigger", "cart-updated")]),
                    CartCountTemplate {
                        count: cart.item_count(),
                    },
                )
                    .into_response());
            }
            Ok(Redirect::to("/menu?success=added_to_cart").into_response())
        }
        Err(AddToCartError::Repository(e)) => Err(e.into()),
        Err(e) => {
            tracing::info!(error = %e, "Add to cart rejected");
            // The page script falls back to a plain post, which shows the message.
            if is_fragment_request(&headers) {
                return Ok(StatusCode::UNPROCESSABLE_ENTITY.into_response());
            }
            Ok(Redirect::to(&format!("/menu?error={}", e.code())).into_response())
        }
    }
}

/// Increase a line by one.
#[instrument(skip(state, ctx, headers))]
pub async fn increase(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
    Form(form): Form<CartLineForm>,
) -> Result<Response, AppError> {
    update_line(&state, &ctx, &headers, "cart_updated", |cart| {
        cart.increase(MenuItemId::new(form.menu_item_id))
    })
    .await
}

/// Decrease a line by one. A line at 1 stays at 1.
#[instrument(skip(state, ctx, headers))]
pub async fn decrease(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
    Form(form): Form<CartLineForm>,
) -> Result<Response, AppError> {
    update_line(&state, &ctx, &headers, "cart_updated", |cart| {
        cart.decrease(MenuItemId::new(form.menu_item_id))
    })
    .await
}

/// Remove a line.
#[instrument(skip(state, ctx, headers))]
pub async fn remove(
    State(state): State<AppState>,
    ctx: SessionContext,
    headers: HeaderMap,
    Form(form): Form<CartLineForm>,
) -> Result<Response, AppError> {
    update_line(&state, &ctx, &headers, "item_removed", |cart| {
        cart.remove(MenuItemId::new(form.menu_item_id));
        Ok(())
    })
    .await
}

/// Apply `op` to the session cart and answer with the refreshed lines.
///
/// Plain form posts redirect to the cart with `success` when `op` succeeds.
async fn update_line(
    state: &AppState,
    ctx: &SessionContext,
    headers: &HeaderMap,
    success: &str,
    op: impl FnOnce(&mut Cart) -> Result<(), CartError>,
) -> Result<Response, AppError> {
    let mut cart = ctx.cart().await?;
    let outcome = op(&mut cart);

    if outcome.is_ok() {
        ctx.save_cart(&cart).await?;
    }

    if is_fragment_request(headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate {
                cart: CartView::new(&cart, state.config()),
            },
        )
            .into_response());
    }

    let target = match outcome {
        Ok(()) => format!("/cart?success={success}"),
        Err(CartError::NotInCart(_)) => "/cart?error=menu_item_not_found".to_string(),
        Err(_) => "/cart?error=quantity_limit".to_string(),
    };
    Ok(Redirect::to(&target).into_response())
}
