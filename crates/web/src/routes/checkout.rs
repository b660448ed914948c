//! Checkout route handlers.
//!
//! The checkout form carries a single-use token issued when the page is
//! rendered. Submitting consumes it, so a double click or a replayed POST
//! cannot place the same cart twice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use cafe_core::{Cart, CheckoutTotals, OrderId, OrderType};

use crate::config::CafeConfig;
use crate::db::{CustomerRepository, OrderRepository};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::{OptionalCustomer, SessionContext};
use crate::models::CurrentCustomer;
use crate::routes::PageContext;
use crate::routes::cart::CartView;
use crate::routes::views::OrderView;
use crate::services::checkout::{CheckoutError, CheckoutForm, CheckoutService, validate_checkout};
use crate::services::validation::FieldErrors;
use crate::state::AppState;

/// Formatted checkout amounts for one order type.
#[derive(Debug, Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub tax: String,
    pub delivery_fee: String,
    pub total: String,
}

impl TotalsView {
    fn new(cart: &Cart, order_type: OrderType, config: &CafeConfig) -> Self {
        let totals = CheckoutTotals::compute(cart.subtotal(), order_type, &config.pricing);
        Self {
            subtotal: config.money(totals.subtotal),
            tax: config.money(totals.tax),
            delivery_fee: config.money(totals.delivery_fee),
            total: config.money(totals.total),
        }
    }
}

/// Values echoed back into the checkout form.
#[derive(Debug, Clone, Default)]
pub struct CheckoutFields {
    pub is_pickup: bool,
    pub delivery_address: String,
    pub special_instructions: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
}

impl CheckoutFields {
    fn from_form(form: &CheckoutForm) -> Self {
        Self {
            is_pickup: form.order_type == OrderType::Pickup.as_str(),
            delivery_address: form.delivery_address.clone().unwrap_or_default(),
            special_instructions: form.special_instructions.clone().unwrap_or_default(),
            contact_name: form.contact_name.clone(),
            contact_phone: form.contact_phone.clone(),
            contact_email: form.contact_email.clone().unwrap_or_default(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub delivery: TotalsView,
    pub pickup: TotalsView,
    pub fields: CheckoutFields,
    pub errors: FieldErrors,
    pub checkout_token: String,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct ConfirmationTemplate {
    pub page: PageContext,
    pub order: OrderView,
}

/// Display the checkout form.
#[instrument(skip_all)]
pub async fn page(
    State(state): State<AppState>,
    ctx: SessionContext,
    OptionalCustomer(customer): OptionalCustomer,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let cart = ctx.cart().await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart?error=cart_empty").into_response());
    }

    let fields = prefill(&state, customer.as_ref()).await?;
    let page = PageContext::load(&ctx, query.flash()).await?;
    render(&state, &ctx, page, &cart, fields, FieldErrors::new()).await
}

/// Place the order.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    ctx: SessionContext,
    OptionalCustomer(customer): OptionalCustomer,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, AppError> {
    let cart = ctx.cart().await?;

    if !ctx.take_checkout_token(&form.checkout_token).await? {
        // A resubmitted form after a successful order lands on its confirmation.
        if cart.is_empty()
            && let Some(order_id) = ctx.last_order_id().await?
        {
            return Ok(Redirect::to(&confirmation_path(order_id)).into_response());
        }
        tracing::info!("Checkout submitted with a stale token");
        return Ok(Redirect::to("/checkout?error=checkout_expired").into_response());
    }

    if cart.is_empty() {
        return Ok(Redirect::to("/cart?error=cart_empty").into_response());
    }

    let config = state.config();
    let result = match validate_checkout(&form, customer.as_ref(), &config.default_country_code) {
        Ok(details) => {
            CheckoutService::new(state.pool(), &config.pricing)
                .place_order(&cart, details)
                .await
        }
        Err(errors) => Err(CheckoutError::Validation(errors)),
    };

    match result {
        Ok(order_id) => {
            ctx.clear_cart().await?;
            ctx.set_last_order_id(order_id).await?;
            let order = order_id.to_string();
            add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order.as_str())]));
            Ok(Redirect::to(&confirmation_path(order_id)).into_response())
        }
        Err(CheckoutError::Validation(errors)) => {
            let page = PageContext::load(&ctx, Flash::default()).await?;
            render(
                &state,
                &ctx,
                page,
                &cart,
                CheckoutFields::from_form(&form),
                errors,
            )
            .await
        }
        Err(CheckoutError::EmptyCart) => Ok(Redirect::to("/cart?error=cart_empty").into_response()),
        Err(CheckoutError::Repository(e)) => {
            tracing::error!(error = %e, "Failed to place order");
            sentry::capture_error(&e);
            Ok(Redirect::to("/checkout?error=order_failed").into_response())
        }
    }
}

/// Display a placed order.
///
/// Visible to the session that placed it and to the customer it belongs to.
#[instrument(skip(state, ctx, customer))]
pub async fn confirmation(
    State(state): State<AppState>,
    ctx: SessionContext,
    OptionalCustomer(customer): OptionalCustomer,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let order_id = OrderId::new(id);
    let repo = OrderRepository::new(state.pool());

    let Some(order) = repo.get(order_id).await? else {
        return Ok(Redirect::to("/?error=order_not_found").into_response());
    };

    let placed_here = ctx.last_order_id().await? == Some(order_id);
    let owned = match (&customer, order.customer_id) {
        (Some(customer), Some(owner)) => customer.id == owner,
        _ => false,
    };
    if !placed_here && !owned {
        tracing::warn!(order_id = %order_id, "Confirmation requested by another session");
        return Ok(Redirect::to("/?error=order_not_found").into_response());
    }

    let items = repo.items(order_id).await?;
    Ok(ConfirmationTemplate {
        page: PageContext::load(&ctx, Flash::default()).await?,
        order: OrderView::with_items(&order, &items, state.config()),
    }
    .into_response())
}

fn confirmation_path(order_id: OrderId) -> String {
    format!("/orders/{order_id}/confirmation")
}

/// Contact fields from the customer's account, if logged in.
async fn prefill(
    state: &AppState,
    customer: Option<&CurrentCustomer>,
) -> Result<CheckoutFields, AppError> {
    let Some(customer) = customer else {
        return Ok(CheckoutFields::default());
    };

    let phone = CustomerRepository::new(state.pool())
        .get_by_id(customer.id)
        .await?
        .map(|c| c.phone)
        .unwrap_or_default();

    Ok(CheckoutFields {
        contact_name: customer.name.clone(),
        contact_phone: phone,
        contact_email: customer.email.as_str().to_owned(),
        ..CheckoutFields::default()
    })
}

async fn render(
    state: &AppState,
    ctx: &SessionContext,
    page: PageContext,
    cart: &Cart,
    fields: CheckoutFields,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    let config = state.config();
    let checkout_token = ctx.issue_checkout_token().await?;

    Ok(CheckoutTemplate {
        page,
        cart: CartView::new(cart, config),
        delivery: TotalsView::new(cart, OrderType::Delivery, config),
        pickup: TotalsView::new(cart, OrderType::Pickup, config),
        fields,
        errors,
        checkout_token,
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cafe_core::{CartEntry, MenuItemId};
    use rust_decimal::Decimal;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.insert(CartEntry {
            menu_item_id: MenuItemId::new(1),
            name: "Masala Chai".to_string(),
            price: Decimal::new(100, 0),
            image_url: None,
            quantity: 2,
        })
        .unwrap();
        cart
    }

    #[test]
    fn test_totals_view_by_order_type() {
        let config = CafeConfig::for_tests();
        let delivery = TotalsView::new(&cart(), OrderType::Delivery, &config);
        assert_eq!(delivery.subtotal, "₹200.00");
        assert_eq!(delivery.tax, "₹10.00");
        assert_eq!(delivery.delivery_fee, "₹30.00");
        assert_eq!(delivery.total, "₹240.00");

        let pickup = TotalsView::new(&cart(), OrderType::Pickup, &config);
        assert_eq!(pickup.delivery_fee, "₹0.00");
        assert_eq!(pickup.total, "₹210.00");
    }

    #[test]
    fn test_fields_echo_form() {
        let form = CheckoutForm {
            order_type: "pickup".to_string(),
            contact_name: "Ravi".to_string(),
            ..CheckoutForm::default()
        };
        let fields = CheckoutFields::from_form(&form);
        assert!(fields.is_pickup);
        assert_eq!(fields.contact_name, "Ravi");
        assert_eq!(fields.delivery_address, "");
    }

    #[test]
    fn test_confirmation_path() {
        assert_eq!(confirmation_path(OrderId::new(7)), "/orders/7/confirmation");
    }
}
