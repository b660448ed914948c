//! Checkout pricing.
//!
//! `tax = round_cents(subtotal × tax_rate)`, the delivery fee applies only to
//! delivery orders, and `total = subtotal + tax + delivery_fee`. All three
//! stored amounts are rounded to cents so the persisted total always equals the
//! sum of the persisted parts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderType, round_cents};

/// Tax rate and delivery fee applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Fraction of the subtotal, e.g. `0.05` for 5%.
    pub tax_rate: Decimal,
    /// Flat fee added to delivery orders.
    pub delivery_fee: Decimal,
}

impl PricingConfig {
    /// 5% tax.
    pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
    /// Flat delivery fee of 30.
    pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(30, 0, 0, false, 0);
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Self::DEFAULT_TAX_RATE,
            delivery_fee: Self::DEFAULT_DELIVERY_FEE,
        }
    }
}

/// The amounts shown on the checkout page and stored on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Compute totals for a cart subtotal.
    #[must_use]
    pub fn compute(subtotal: Decimal, order_type: OrderType, config: &PricingConfig) -> Self {
        let subtotal = round_cents(subtotal);
        let tax = round_cents(subtotal * config.tax_rate);
        let delivery_fee = match order_type {
            OrderType::Delivery => round_cents(config.delivery_fee),
            OrderType::Pickup => Decimal::ZERO,
        };
        Self {
            subtotal,
            tax,
            delivery_fee,
            total: subtotal + tax + delivery_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let config = PricingConfig::default();
        assert_eq!(config.tax_rate, Decimal::new(5, 2));
        assert_eq!(config.delivery_fee, Decimal::new(30, 0));
    }

    #[test]
    fn test_delivery_scenario() {
        // 2 × 80 + 1 × 60
        let totals = CheckoutTotals::compute(
            Decimal::new(220, 0),
            OrderType::Delivery,
            &PricingConfig::default(),
        );
        assert_eq!(totals.tax, Decimal::new(1100, 2));
        assert_eq!(totals.delivery_fee, Decimal::new(30, 0));
        assert_eq!(totals.total, Decimal::new(26100, 2));
    }

    #[test]
    fn test_pickup_has_no_delivery_fee() {
        let totals = CheckoutTotals::compute(
            Decimal::new(100, 0),
            OrderType::Pickup,
            &PricingConfig::default(),
        );
        assert_eq!(totals.delivery_fee, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(105, 0));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        // 5% of 10.10 = 0.505 -> 0.51
        let totals = CheckoutTotals::compute(
            Decimal::new(1010, 2),
            OrderType::Pickup,
            &PricingConfig::default(),
        );
        assert_eq!(totals.tax, Decimal::new(51, 2));
        assert_eq!(totals.total, totals.subtotal + totals.tax);
    }

    #[test]
    fn test_custom_config() {
        let config = PricingConfig {
            tax_rate: Decimal::new(18, 2),
            delivery_fee: Decimal::new(4999, 2),
        };
        let totals = CheckoutTotals::compute(Decimal::new(200, 0), OrderType::Delivery, &config);
        assert_eq!(totals.tax, Decimal::new(36, 0));
        assert_eq!(totals.total, Decimal::new(28599, 2));
    }
}
