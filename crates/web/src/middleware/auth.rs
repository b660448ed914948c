//! Authentication and authorization extractors.
//!
//! Customer and owner identities are independent session slots. Customer
//! pages check only the customer slot; back-office pages check only the
//! owner slot, re-read the owner from the database on every request, and
//! fail closed on anything unexpected.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use cafe_core::OwnerRole;

use crate::db::OwnerRepository;
use crate::error::AppError;
use crate::middleware::session::SessionContext;
use crate::models::{CurrentCustomer, CurrentOwner};
use crate::state::AppState;

// =============================================================================
// Customers
// =============================================================================

/// Extractor that requires a logged-in customer.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireCustomer(customer): RequireCustomer) -> impl IntoResponse {
///     format!("Orders for {}", customer.name)
/// }
/// ```
pub struct RequireCustomer(pub CurrentCustomer);

/// Rejection for customer pages.
pub enum CustomerRejection {
    /// Redirect to the customer login page.
    RedirectToLogin,
    /// The session could not be read.
    Session(AppError),
}

impl IntoResponse for CustomerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => {
                Redirect::to("/auth/login?error=login_required").into_response()
            }
            Self::Session(err) => err.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = CustomerRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = SessionContext::from_request_parts(parts, state)
            .await
            .map_err(CustomerRejection::Session)?;

        ctx.customer()
            .await
            .map_err(|e| CustomerRejection::Session(e.into()))?
            .map(Self)
            .ok_or(CustomerRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current customer.
pub struct OptionalCustomer(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => SessionContext::new(session.clone())
                .customer()
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

// =============================================================================
// Owners
// =============================================================================

/// Extractor that requires an active owner of any role.
pub struct RequireOwner(pub CurrentOwner);

/// Extractor that requires an active owner with at least manager role.
pub struct RequireManager(pub CurrentOwner);

/// Extractor that requires an active owner with admin role.
pub struct RequireAdmin(pub CurrentOwner);

/// Rejection for back-office pages.
pub enum OwnerRejection {
    /// Not logged in as an owner.
    RedirectToLogin,
    /// Logged in, but the role is insufficient or unknown.
    AccessDenied,
    /// Session or database failure.
    Internal(AppError),
}

impl IntoResponse for OwnerRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/admin/login").into_response(),
            Self::AccessDenied => Redirect::to("/admin?error=access_denied").into_response(),
            Self::Internal(err) => err.into_response(),
        }
    }
}

impl From<AppError> for OwnerRejection {
    fn from(err: AppError) -> Self {
        Self::Internal(err)
    }
}

/// Load the session owner, refresh it from the database and check `required`.
///
/// A deactivated or deleted owner is logged out. The stored role is updated
/// if it changed since login.
async fn authorize_owner(
    parts: &mut Parts,
    state: &AppState,
    required: OwnerRole,
) -> Result<CurrentOwner, OwnerRejection> {
    let ctx = SessionContext::from_request_parts(parts, state).await?;
    let session_owner = ctx
        .owner()
        .await
        .map_err(AppError::from)?
        .ok_or(OwnerRejection::RedirectToLogin)?;

    let owner = OwnerRepository::new(state.pool())
        .get_by_id(session_owner.id)
        .await
        .map_err(AppError::from)?;

    let Some(owner) = owner.filter(|o| o.is_active) else {
        tracing::warn!(owner_id = %session_owner.id, "Owner session for missing or inactive account");
        ctx.logout_owner().await.map_err(AppError::from)?;
        return Err(OwnerRejection::RedirectToLogin);
    };

    let current = CurrentOwner {
        id: owner.id,
        username: owner.username,
        role: owner.role_name,
    };
    if current != session_owner {
        ctx.set_owner(&current).await.map_err(AppError::from)?;
    }

    if !current.has_permission(required) {
        tracing::warn!(
            owner_id = %current.id,
            role = %current.role,
            required = %required.as_str(),
            path = %parts.uri.path(),
            "Owner access denied"
        );
        return Err(OwnerRejection::AccessDenied);
    }

    Ok(current)
}

impl FromRequestParts<AppState> for RequireOwner {
    type Rejection = OwnerRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize_owner(parts, state, OwnerRole::Staff).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = OwnerRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize_owner(parts, state, OwnerRole::Manager).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = OwnerRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize_owner(parts, state, OwnerRole::Admin).await.map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::http::header::LOCATION;

    #[test]
    fn test_owner_rejection_redirects() {
        let login = OwnerRejection::RedirectToLogin.into_response();
        assert_eq!(login.status(), StatusCode::SEE_OTHER);
        assert_eq!(login.headers().get(LOCATION).unwrap(), "/admin/login");

        let denied = OwnerRejection::AccessDenied.into_response();
        assert_eq!(
            denied.headers().get(LOCATION).unwrap(),
            "/admin?error=access_denied"
        );
    }

    #[test]
    fn test_customer_rejection_redirects() {
        let response = CustomerRejection::RedirectToLogin.into_response();
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/auth/login?error=login_required"
        );
    }
}
