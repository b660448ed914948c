//! Phone number type normalized to international (`+<country><number>`) form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains something other than digits, separators and a leading `+`.
    #[error("phone number may only contain digits and an optional leading +")]
    InvalidCharacter,
    /// Wrong number of digits.
    #[error("phone number must have between {min} and {max} digits")]
    InvalidLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A phone number in international form, e.g. `+919876543210`.
///
/// Input may contain spaces, dashes, dots and parentheses as separators. A bare
/// 10-digit number is assumed to be local and gets the default country code
/// prepended; any other digit string (with or without `+`) is taken as already
/// carrying its country code.
///
/// ```
/// use cafe_core::Phone;
///
/// assert_eq!(Phone::parse("98765 43210", "91").unwrap().as_str(), "+919876543210");
/// assert_eq!(Phone::parse("+44 20 7946 0958", "91").unwrap().as_str(), "+442079460958");
/// assert!(Phone::parse("12345", "91").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits accepted.
    pub const MIN_DIGITS: usize = 10;
    /// Maximum number of digits accepted (E.164).
    pub const MAX_DIGITS: usize = 15;
    /// Digit count of a local number that receives the default country code.
    const LOCAL_DIGITS: usize = 10;

    /// Parse and normalize a phone number.
    ///
    /// # Errors
    ///
    /// Returns a [`PhoneError`] if the input is empty, contains letters or other
    /// symbols, or does not have 10–15 digits.
    pub fn parse(input: &str, default_country_code: &str) -> Result<Self, PhoneError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let (has_plus, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let mut digits = String::with_capacity(rest.len());
        for c in rest.chars() {
            match c {
                '0'..='9' => digits.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                _ => return Err(PhoneError::InvalidCharacter),
            }
        }

        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()) {
            return Err(PhoneError::InvalidLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        if !has_plus && digits.len() == Self::LOCAL_DIGITS {
            return Ok(Self(format!("+{default_country_code}{digits}")));
        }

        Ok(Self(format!("+{digits}")))
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ten_digits_get_default_country_code() {
        let phone = Phone::parse("9876543210", "91").unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_plus_prefixed_number_is_kept() {
        let phone = Phone::parse("+919876543210", "91").unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_local_and_international_forms_normalize_equal() {
        assert_eq!(
            Phone::parse("9876543210", "91").unwrap(),
            Phone::parse("+91 98765-43210", "91").unwrap()
        );
    }

    #[test]
    fn test_long_number_without_plus_is_treated_as_international() {
        let phone = Phone::parse("919876543210", "91").unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_ten_digits_with_plus_get_no_prefix() {
        let phone = Phone::parse("+1234567890", "91").unwrap();
        assert_eq!(phone.as_str(), "+1234567890");
    }

    #[test]
    fn test_separators_are_stripped() {
        let phone = Phone::parse("(987) 654.3210", "1").unwrap();
        assert_eq!(phone.as_str(), "+19876543210");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Phone::parse("  ", "91"), Err(PhoneError::Empty));
    }

    #[test]
    fn test_rejects_letters_and_inner_plus() {
        assert_eq!(
            Phone::parse("98765abc10", "91"),
            Err(PhoneError::InvalidCharacter)
        );
        assert_eq!(
            Phone::parse("98765+43210", "91"),
            Err(PhoneError::InvalidCharacter)
        );
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(matches!(
            Phone::parse("987654321", "91"),
            Err(PhoneError::InvalidLength { .. })
        ));
        assert!(matches!(
            Phone::parse("+1234567890123456", "91"),
            Err(PhoneError::InvalidLength { .. })
        ));
    }
}
