//! Money helpers using decimal arithmetic.
//!
//! Amounts are plain [`Decimal`]s in the cafe's single currency; the currency
//! symbol is configuration, applied only when formatting for display.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Errors that can occur when parsing a price entered in a form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Nothing was entered.
    #[error("price is required")]
    Empty,
    /// The input is not a number.
    #[error("price must be a number")]
    NotANumber,
    /// The number is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The number does not fit a stored price.
    #[error("price cannot exceed 99999999.99")]
    TooLarge,
}

/// Largest price a menu item can store (`NUMERIC(10, 2)`).
pub const MAX_PRICE: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2);

/// Round an amount to whole cents, half away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount for display, e.g. `₹261.00`.
#[must_use]
pub fn format_money(amount: Decimal, symbol: &str) -> String {
    format!("{symbol}{:.2}", round_cents(amount))
}

/// Parse a non-negative price from form input, rounded to cents.
///
/// # Errors
///
/// Returns a [`PriceError`] for empty, non-numeric, negative or oversized input.
pub fn parse_price(input: &str) -> Result<Decimal, PriceError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PriceError::Empty);
    }
    let amount = Decimal::from_str(input).map_err(|_| PriceError::NotANumber)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative);
    }
    let amount = round_cents(amount);
    if amount > MAX_PRICE {
        return Err(PriceError::TooLarge);
    }
    Ok(amount)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_pads_cents() {
        assert_eq!(format_money(Decimal::new(261, 0), "₹"), "₹261.00");
        assert_eq!(format_money(Decimal::new(45, 1), "$"), "$4.50");
    }

    #[test]
    fn test_format_money_rounds_half_away_from_zero() {
        assert_eq!(format_money(Decimal::new(10_005, 3), "$"), "$10.01");
    }

    #[test]
    fn test_parse_price_accepts_decimal_input() {
        assert_eq!(parse_price(" 80 ").unwrap(), Decimal::new(80, 0));
        assert_eq!(parse_price("12.345").unwrap(), Decimal::new(1235, 2));
        assert_eq!(parse_price("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_price_rejects_bad_input() {
        assert_eq!(parse_price(""), Err(PriceError::Empty));
        assert_eq!(parse_price("ten"), Err(PriceError::NotANumber));
        assert_eq!(parse_price("-1"), Err(PriceError::Negative));
    }

    #[test]
    fn test_parse_price_bounded_by_column() {
        assert_eq!(parse_price("99999999.99").unwrap(), MAX_PRICE);
        assert_eq!(parse_price("99999999.995"), Err(PriceError::TooLarge));
        assert_eq!(parse_price("1000000000"), Err(PriceError::TooLarge));
        assert_eq!(
            parse_price("79228162514264337593543950335"),
            Err(PriceError::TooLarge)
        );
    }
}
