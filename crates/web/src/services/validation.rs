//! Form field validation shared by the customer and back-office forms.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Letters (any script) and spaces, at least two characters.
static PERSON_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L} ]{2,}$").expect("Invalid regex"));

/// Lowercase letters, digits, `.`, `_` and `-`.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._-]{3,32}$").expect("Invalid regex"));

/// Minimum customer password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum back-office password length.
pub const MIN_OWNER_PASSWORD_LENGTH: usize = 8;

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, for templates.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(value)` if no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.0.keys().copied().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Validate a person's name: trimmed, at least two characters, letters and
/// spaces only.
///
/// # Errors
///
/// Returns a display message if the name is rejected.
pub fn person_name(input: &str) -> Result<String, &'static str> {
    let name = input.trim();
    if name.is_empty() {
        return Err("Name is required.");
    }
    if !PERSON_NAME_RE.is_match(name) {
        return Err("Name must be at least 2 characters and contain only letters and spaces.");
    }
    Ok(name.to_owned())
}

/// Validate a back-office username.
///
/// # Errors
///
/// Returns a display message if the username is rejected.
pub fn username(input: &str) -> Result<String, &'static str> {
    let name = input.trim().to_lowercase();
    if USERNAME_RE.is_match(&name) {
        Ok(name)
    } else {
        Err("Username must be 3-32 characters: letters, digits, '.', '_' or '-'.")
    }
}

/// Validate a password against a minimum length.
///
/// # Errors
///
/// Returns a display message if the password is too short.
pub fn password(input: &str, min_length: usize) -> Result<(), String> {
    if input.chars().count() < min_length {
        return Err(format!("Password must be at least {min_length} characters."));
    }
    Ok(())
}

/// Trim a free-text field, mapping blank input to `None`.
#[must_use]
pub fn optional_text(input: Option<&str>) -> Option<String> {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Checkbox fields arrive as `Some("on")` when ticked and are absent otherwise.
#[must_use]
pub fn checkbox(input: Option<&str>) -> bool {
    matches!(input, Some("on" | "true" | "1"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_accepts_letters_and_spaces() {
        assert_eq!(person_name("  Asha Rao ").unwrap(), "Asha Rao");
        assert_eq!(person_name("Zoë").unwrap(), "Zoë");
    }

    #[test]
    fn test_person_name_rejects_short_or_symbols() {
        assert!(person_name("A").is_err());
        assert!(person_name("").is_err());
        assert!(person_name("R2D2").is_err());
        assert!(person_name("Anne-Marie").is_err());
    }

    #[test]
    fn test_username_normalized() {
        assert_eq!(username(" Mia.K ").unwrap(), "mia.k");
        assert!(username("ab").is_err());
        assert!(username("no spaces").is_err());
    }

    #[test]
    fn test_password_length() {
        assert!(password("12345", MIN_PASSWORD_LENGTH).is_err());
        assert!(password("123456", MIN_PASSWORD_LENGTH).is_ok());
        assert!(password("1234567", MIN_OWNER_PASSWORD_LENGTH).is_err());
    }

    #[test]
    fn test_field_errors_first_message_wins() {
        let mut errors = FieldErrors::new();
        errors.add("email", "first");
        errors.add("email", "second");
        assert_eq!(errors.get("email"), Some("first"));
        assert_eq!(errors.len(), 1);
        assert!(errors.into_result(()).is_err());
    }

    #[test]
    fn test_optional_text_and_checkbox() {
        assert_eq!(optional_text(Some("   ")), None);
        assert_eq!(optional_text(Some(" ring bell ")).as_deref(), Some("ring bell"));
        assert!(checkbox(Some("on")));
        assert!(!checkbox(None));
    }
}
