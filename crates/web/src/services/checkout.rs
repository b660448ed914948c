//! Checkout: turn the session cart into a persisted order.

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use cafe_core::{
    Cart, CheckoutDetails, Email, OrderDraft, OrderDraftError, OrderId, OrderType, Phone,
    PricingConfig,
};

use crate::db::{OrderRepository, RepositoryError};
use crate::models::CurrentCustomer;
use crate::services::validation::{self, FieldErrors};

/// Checkout form fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub order_type: String,
    pub delivery_address: Option<String>,
    pub special_instructions: Option<String>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_phone: String,
    pub contact_email: Option<String>,
    #[serde(default)]
    pub checkout_token: String,
}

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// One or more checkout fields are invalid.
    #[error("{0}")]
    Validation(FieldErrors),

    /// Repository/database error. Nothing was written.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validate the checkout form into order details.
///
/// A logged-in customer's name and email fill in blank contact fields, and
/// the order is linked to their account.
///
/// # Errors
///
/// Returns every failing field with a display message.
pub fn validate_checkout(
    form: &CheckoutForm,
    customer: Option<&CurrentCustomer>,
    default_country_code: &str,
) -> Result<CheckoutDetails, FieldErrors> {
    let mut errors = FieldErrors::new();

    let order_type = OrderType::parse(form.order_type.trim()).unwrap_or_else(|| {
        errors.add("order_type", "Please choose delivery or pickup.");
        OrderType::default()
    });

    let delivery_address = validation::optional_text(form.delivery_address.as_deref());
    if order_type == OrderType::Delivery && delivery_address.is_none() {
        errors.add("delivery_address", "A delivery address is required for delivery.");
    }

    let contact_name = match (form.contact_name.trim(), customer) {
        ("", Some(customer)) => customer.name.clone(),
        (name, _) => validation::person_name(name)
            .map_err(|msg| errors.add("contact_name", msg))
            .unwrap_or_default(),
    };

    let contact_phone = Phone::parse(&form.contact_phone, default_country_code)
        .map(Phone::into_inner)
        .map_err(|_| {
            errors.add("contact_phone", "Please enter a valid phone number (10-15 digits).");
        })
        .unwrap_or_default();

    let contact_email = match validation::optional_text(form.contact_email.as_deref()) {
        Some(raw) => Email::parse(&raw)
            .map(|email| Some(email.into_inner()))
            .map_err(|_| errors.add("contact_email", "Please enter a valid email address."))
            .unwrap_or_default(),
        None => customer.map(|c| c.email.as_str().to_owned()),
    };

    errors.into_result(CheckoutDetails {
        customer_id: customer.map(|c| c.id),
        order_type,
        delivery_address,
        special_instructions: validation::optional_text(form.special_instructions.as_deref()),
        contact_name,
        contact_phone,
        contact_email,
    })
}

/// Checkout service.
pub struct CheckoutService<'a> {
    orders: OrderRepository<'a>,
    pricing: &'a PricingConfig,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, pricing: &'a PricingConfig) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            pricing,
        }
    }

    /// Price the cart and write the order and its lines in one transaction.
    ///
    /// The caller clears the cart only after this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart,
    /// `CheckoutError::Validation` if the details cannot form an order, and
    /// `CheckoutError::Repository` if the insert failed and was rolled back.
    #[instrument(skip_all, fields(lines = cart.entries().len(), order_type = %details.order_type.as_str()))]
    pub async fn place_order(
        &self,
        cart: &Cart,
        details: CheckoutDetails,
    ) -> Result<OrderId, CheckoutError> {
        let draft = OrderDraft::from_cart(cart, details, self.pricing).map_err(draft_error)?;
        let order_id = self.orders.create(&draft).await?;

        tracing::info!(
            order_id = %order_id,
            total = %draft.totals.total,
            "Order placed"
        );
        Ok(order_id)
    }
}

fn draft_error(err: OrderDraftError) -> CheckoutError {
    let field = match err {
        OrderDraftError::EmptyCart => return CheckoutError::EmptyCart,
        OrderDraftError::MissingDeliveryAddress => "delivery_address",
        OrderDraftError::MissingContactName => "contact_name",
        OrderDraftError::MissingContactPhone => "contact_phone",
    };
    let mut errors = FieldErrors::new();
    errors.add(field, capitalize(&err.to_string()));
    CheckoutError::Validation(errors)
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).chain(['.']).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cafe_core::CustomerId;

    fn form(order_type: &str) -> CheckoutForm {
        CheckoutForm {
            order_type: order_type.to_string(),
            delivery_address: Some("12 MG Road".to_string()),
            special_instructions: Some("  ".to_string()),
            contact_name: "Ravi Kumar".to_string(),
            contact_phone: "98765 43210".to_string(),
            contact_email: None,
            checkout_token: "t".to_string(),
        }
    }

    fn customer() -> CurrentCustomer {
        CurrentCustomer {
            id: CustomerId::new(4),
            name: "Asha Rao".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
        }
    }

    #[test]
    fn test_guest_delivery() {
        let details = validate_checkout(&form("delivery"), None, "91").unwrap();
        assert_eq!(details.customer_id, None);
        assert_eq!(details.order_type, OrderType::Delivery);
        assert_eq!(details.contact_phone, "+919876543210");
        assert_eq!(details.special_instructions, None);
        assert_eq!(details.contact_email, None);
    }

    #[test]
    fn test_delivery_requires_address() {
        let mut input = form("delivery");
        input.delivery_address = Some(" ".to_string());
        let errors = validate_checkout(&input, None, "91").unwrap_err();
        assert!(errors.has("delivery_address"));

        input.order_type = "pickup".to_string();
        assert!(validate_checkout(&input, None, "91").is_ok());
    }

    #[test]
    fn test_logged_in_customer_defaults() {
        let mut input = form("pickup");
        input.contact_name = String::new();
        let details = validate_checkout(&input, Some(&customer()), "91").unwrap();
        assert_eq!(details.customer_id, Some(CustomerId::new(4)));
        assert_eq!(details.contact_name, "Asha Rao");
        assert_eq!(details.contact_email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn test_invalid_fields_reported() {
        let input = CheckoutForm {
            order_type: "drone".to_string(),
            contact_phone: "123".to_string(),
            contact_email: Some("bad".to_string()),
            ..CheckoutForm::default()
        };
        let errors = validate_checkout(&input, None, "91").unwrap_err();
        for field in ["order_type", "contact_name", "contact_phone", "contact_email"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_draft_error_mapping() {
        assert!(matches!(
            draft_error(OrderDraftError::EmptyCart),
            CheckoutError::EmptyCart
        ));
        let CheckoutError::Validation(errors) = draft_error(OrderDraftError::MissingContactPhone)
        else {
            panic!("expected validation error");
        };
        assert_eq!(
            errors.get("contact_phone"),
            Some("A contact phone number is required.")
        );
    }
}
