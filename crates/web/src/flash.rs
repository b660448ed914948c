//! One-shot page messages carried in the query string.
//!
//! Handlers redirect to `?success=<code>` or `?error=<code>`. Only known codes
//! render; anything else in the query is ignored, so user-supplied text never
//! reaches a page through this path.

use serde::Deserialize;

/// Query parameters for success/error messages.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl MessageQuery {
    /// Resolve codes to display messages.
    #[must_use]
    pub fn flash(&self) -> Flash {
        Flash {
            success: self.success.as_deref().and_then(success_message),
            error: self.error.as_deref().and_then(error_message),
        }
    }
}

/// Messages ready for a layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flash {
    pub success: Option<&'static str>,
    pub error: Option<&'static str>,
}

impl Flash {
    #[must_use]
    pub const fn error(message: &'static str) -> Self {
        Self {
            success: None,
            error: Some(message),
        }
    }
}

fn success_message(code: &str) -> Option<&'static str> {
    Some(match code {
        "added_to_cart" => "Item added to your cart.",
        "cart_updated" => "Cart updated.",
        "item_removed" => "Item removed from your cart.",
        "registered" => "Welcome! Your account has been created.",
        "logged_in" => "You are now logged in.",
        "logged_out" => "You have been logged out.",
        "reservation_requested" => "Reservation requested. We will confirm it shortly.",
        "item_created" => "Menu item created.",
        "item_updated" => "Menu item updated.",
        "item_deleted" => "Menu item deleted.",
        "status_updated" => "Status updated.",
        "staff_created" => "Staff account created.",
        "staff_updated" => "Staff account updated.",
        _ => return None,
    })
}

fn error_message(code: &str) -> Option<&'static str> {
    Some(match code {
        "login_required" => "Please log in to continue.",
        "access_denied" => "You do not have permission to do that.",
        "order_not_found" => "Order not found.",
        "menu_item_not_found" => "That menu item could not be found.",
        "reservation_not_found" => "Reservation not found.",
        "staff_not_found" => "Staff account not found.",
        "item_unavailable" => "That item is not available right now.",
        "quantity_limit" => "That quantity is not allowed.",
        "cart_empty" => "Your cart is empty.",
        "checkout_expired" => "Your checkout session expired. Please review your order and try again.",
        "order_failed" => "We could not place your order. Please try again.",
        "cart_failed" => "We could not update your cart. Please try again.",
        "update_failed" => "We could not save that change. Please try again.",
        "invalid_transition" => "That status change is not allowed.",
        "delete_expired" => "Delete confirmation expired. Please try again.",
        "invalid_action" => "Unknown action.",
        "self_deactivate" => "You cannot deactivate your own account.",
        _ => return None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_resolve() {
        let query = MessageQuery {
            success: Some("added_to_cart".to_string()),
            error: Some("cart_empty".to_string()),
        };
        let flash = query.flash();
        assert_eq!(flash.success, Some("Item added to your cart."));
        assert_eq!(flash.error, Some("Your cart is empty."));
    }

    #[test]
    fn test_unknown_codes_render_nothing() {
        let query = MessageQuery {
            success: None,
            error: Some("<script>alert(1)</script>".to_string()),
        };
        assert_eq!(query.flash(), Flash::default());
    }

    #[test]
    fn test_not_found_codes_name_the_entity() {
        for code in [
            "order_not_found",
            "menu_item_not_found",
            "reservation_not_found",
            "staff_not_found",
        ] {
            assert!(error_message(code).is_some(), "{code} has no message");
        }
        assert_eq!(error_message("not_found"), None);
    }

    #[test]
    fn test_service_error_codes_resolve() {
        use cafe_core::{CartError, MenuItemId, OrderStatus};

        use crate::db::RepositoryError;
        use crate::services::cart::AddToCartError;
        use crate::services::orders::OrderStatusError;

        let codes = [
            AddToCartError::Unavailable(MenuItemId::new(1)).code(),
            AddToCartError::Cart(CartError::ZeroQuantity).code(),
            AddToCartError::Repository(RepositoryError::DataCorruption(String::new())).code(),
            OrderStatusError::NotFound.code(),
            OrderStatusError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Pending,
            }
            .code(),
            OrderStatusError::Repository(RepositoryError::DataCorruption(String::new())).code(),
        ];
        for code in codes {
            assert!(error_message(code).is_some(), "{code} has no message");
        }
    }

    #[test]
    fn test_item_removed_resolves() {
        assert_eq!(
            success_message("item_removed"),
            Some("Item removed from your cart.")
        );
    }
}
