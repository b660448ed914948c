//! Authentication service.
//!
//! Password registration and login for customers, and login and account
//! creation for owners. Both identity kinds hash with Argon2id.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use cafe_core::{Email, OwnerRole, Phone};

use crate::db::{CustomerRepository, OwnerRepository, RepositoryError};
use crate::models::{Customer, NewOwner, Owner};
use crate::services::validation::{self, FieldErrors};

/// Hash checked when the account does not exist, so unknown users take as
/// long to reject as wrong passwords.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-password").ok());

/// Customer registration form input.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

/// Registration input that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRegistration {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
}

/// Back-office account form input.
#[derive(Debug, Clone, Copy)]
pub struct StaffRegistration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub password: &'a str,
}

/// Authentication service.
pub struct AuthService<'a> {
    customers: CustomerRepository<'a>,
    owners: OwnerRepository<'a>,
    default_country_code: &'a str,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, default_country_code: &'a str) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
            owners: OwnerRepository::new(pool),
            default_country_code,
        }
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Register a new customer.
    ///
    /// Email and phone uniqueness are checked separately so both conflicts
    /// can be reported at once; the unique constraints catch any race.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with per-field messages if any field is
    /// invalid or the email or phone is already registered.
    #[instrument(skip_all, fields(email = %form.email))]
    pub async fn register_customer(&self, form: &Registration<'_>) -> Result<Customer, AuthError> {
        let valid = validate_registration(form, self.default_country_code)?;

        let mut errors = FieldErrors::new();
        if self.customers.email_exists(&valid.email).await? {
            errors.add("email", "An account with this email already exists.");
        }
        if self.customers.phone_exists(&valid.phone).await? {
            errors.add("phone", "An account with this phone number already exists.");
        }
        errors.into_result(())?;

        let password_hash = hash_password(form.password)?;

        let customer = self
            .customers
            .create(&valid.name, &valid.email, &valid.phone, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(constraint) => {
                    let mut errors = FieldErrors::new();
                    if constraint.contains("phone") {
                        errors.add("phone", "An account with this phone number already exists.");
                    } else {
                        errors.add("email", "An account with this email already exists.");
                    }
                    AuthError::Validation(errors)
                }
                other => AuthError::Repository(other),
            })?;

        tracing::info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    /// Login a customer with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a malformed email, an
    /// unknown email, or a wrong password alike.
    #[instrument(skip_all)]
    pub async fn login_customer(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        let Ok(email) = Email::parse(email) else {
            verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        let Some((customer, password_hash)) = self.customers.get_password_hash(&email).await?
        else {
            verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;
        Ok(customer)
    }

    // =========================================================================
    // Owners
    // =========================================================================

    /// Login an owner with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username, a
    /// wrong password, or a deactivated account alike.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn login_owner(&self, username: &str, password: &str) -> Result<Owner, AuthError> {
        let username = username.trim().to_lowercase();

        let Some((owner, password_hash)) = self.owners.get_password_hash(&username).await? else {
            verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        if !owner.is_active {
            tracing::warn!(owner_id = %owner.id, "Login attempt on inactive owner account");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(owner)
    }

    /// Create a back-office account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is invalid or the username
    /// or email is already taken.
    #[instrument(skip_all, fields(username = %form.username, role = %form.role))]
    pub async fn create_owner(&self, form: &StaffRegistration<'_>) -> Result<Owner, AuthError> {
        let new_owner = validate_staff(form)?;
        let password_hash = hash_password(form.password)?;

        let owner = self
            .owners
            .create(&new_owner, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(constraint) => {
                    let mut errors = FieldErrors::new();
                    if constraint.contains("email") {
                        errors.add("email", "This email is already in use.");
                    } else {
                        errors.add("username", "This username is already taken.");
                    }
                    AuthError::Validation(errors)
                }
                other => AuthError::Repository(other),
            })?;

        tracing::info!(owner_id = %owner.id, "Owner account created");
        Ok(owner)
    }
}

/// Validate the customer registration form.
///
/// # Errors
///
/// Returns every failing field with a display message.
pub fn validate_registration(
    form: &Registration<'_>,
    default_country_code: &str,
) -> Result<ValidRegistration, FieldErrors> {
    let mut errors = FieldErrors::new();

    let name = validation::person_name(form.name)
        .map_err(|msg| errors.add("name", msg))
        .ok();
    let email = Email::parse(form.email)
        .map_err(|_| errors.add("email", "Please enter a valid email address."))
        .ok();
    let phone = Phone::parse(form.phone, default_country_code)
        .map_err(|_| errors.add("phone", "Please enter a valid phone number (10-15 digits)."))
        .ok();

    if let Err(msg) = validation::password(form.password, validation::MIN_PASSWORD_LENGTH) {
        errors.add("password", msg);
    }
    if form.password != form.confirm_password {
        errors.add("confirm_password", "Passwords do not match.");
    }

    match (name, email, phone) {
        (Some(name), Some(email), Some(phone)) => {
            errors.into_result(ValidRegistration { name, email, phone })
        }
        _ => Err(errors),
    }
}

/// Validate the back-office account form.
///
/// # Errors
///
/// Returns every failing field with a display message.
pub fn validate_staff(form: &StaffRegistration<'_>) -> Result<NewOwner, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = validation::username(form.username)
        .map_err(|msg| errors.add("username", msg))
        .ok();
    let email = Email::parse(form.email)
        .map_err(|_| errors.add("email", "Please enter a valid email address."))
        .ok();
    let full_name = validation::person_name(form.full_name)
        .map_err(|msg| errors.add("full_name", msg))
        .ok();
    let role = OwnerRole::parse(form.role);
    if role.is_none() {
        errors.add("role", "Please choose a role.");
    }
    if let Err(msg) = validation::password(form.password, validation::MIN_OWNER_PASSWORD_LENGTH) {
        errors.add("password", msg);
    }

    match (username, email, full_name, role) {
        (Some(username), Some(email), Some(full_name), Some(role)) => errors.into_result(NewOwner {
            username,
            email,
            full_name,
            phone: validation::optional_text(form.phone),
            role,
        }),
        _ => Err(errors),
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration<'a>(phone: &'a str, password: &'a str, confirm: &'a str) -> Registration<'a> {
        Registration {
            name: "Asha Rao",
            email: "asha@example.com",
            phone,
            password,
            confirm_password: confirm,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("secret-password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret-password", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_against_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_dummy_hash_available() {
        assert!(DUMMY_HASH.is_some());
    }

    #[test]
    fn test_registration_normalizes_phone() {
        let valid = validate_registration(&registration("9876543210", "secret", "secret"), "91")
            .unwrap();
        assert_eq!(valid.phone.as_str(), "+919876543210");
        assert_eq!(valid.email.as_str(), "asha@example.com");
    }

    #[test]
    fn test_registration_reports_every_field() {
        let form = Registration {
            name: "A",
            email: "nope",
            phone: "123",
            password: "12345",
            confirm_password: "54321",
        };
        let errors = validate_registration(&form, "91").unwrap_err();
        for field in ["name", "email", "phone", "password", "confirm_password"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_registration_password_mismatch_only() {
        let errors =
            validate_registration(&registration("9876543210", "secret", "secreT"), "91")
                .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has("confirm_password"));
    }

    #[test]
    fn test_staff_validation() {
        let form = StaffRegistration {
            username: "Mia",
            email: "mia@cafe.test",
            full_name: "Mia Kapoor",
            phone: Some("  "),
            role: "manager",
            password: "long-enough",
        };
        let owner = validate_staff(&form).unwrap();
        assert_eq!(owner.username, "mia");
        assert_eq!(owner.role, OwnerRole::Manager);
        assert_eq!(owner.phone, None);

        let bad = StaffRegistration {
            role: "superuser",
            password: "short",
            ..form
        };
        let errors = validate_staff(&bad).unwrap_err();
        assert!(errors.has("role"));
        assert!(errors.has("password"));
    }
}
