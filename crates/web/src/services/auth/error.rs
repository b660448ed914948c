//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::validation::FieldErrors;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more form fields are invalid, or already taken.
    #[error("{0}")]
    Validation(FieldErrors),

    /// Invalid credentials (unknown user, wrong password, or inactive owner).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<FieldErrors> for AuthError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
