//! Customer authentication route handlers.
//!
//! Handles login, registration and logout. Logging in or out touches only the
//! customer identity; the cart and any owner login in the same browser are
//! left alone.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::SessionContext;
use crate::models::{CurrentCustomer, Customer};
use crate::routes::PageContext;
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::services::validation::FieldErrors;
use crate::state::AppState;

/// Message shown for any failed login.
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub error: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub errors: FieldErrors,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(
    ctx: SessionContext,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    if ctx.customer().await?.is_some() {
        return Ok(Redirect::to("/account/orders").into_response());
    }

    Ok(LoginTemplate {
        page: PageContext::load(&ctx, query.flash()).await?,
        email: String::new(),
        error: None,
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool(), &state.config().default_country_code);

    match auth.login_customer(&form.email, &form.password).await {
        Ok(customer) => {
            start_session(&ctx, &customer).await?;
            tracing::info!(customer_id = %customer.id, "Customer logged in");
            Ok(Redirect::to("/menu?success=logged_in").into_response())
        }
        Err(AuthError::InvalidCredentials | AuthError::Validation(_)) => {
            tracing::info!("Customer login rejected");
            Ok(LoginTemplate {
                page: PageContext::load(&ctx, Flash::default()).await?,
                email: form.email,
                error: Some(INVALID_CREDENTIALS),
            }
            .into_response())
        }
        Err(e) => Err(auth_failure(e)),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip_all)]
pub async fn register_page(
    ctx: SessionContext,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    if ctx.customer().await?.is_some() {
        return Ok(Redirect::to("/account/orders").into_response());
    }

    Ok(RegisterTemplate {
        page: PageContext::load(&ctx, query.flash()).await?,
        name: String::new(),
        email: String::new(),
        phone: String::new(),
        errors: FieldErrors::new(),
    }
    .into_response())
}

/// Handle registration form submission.
///
/// A new account is logged in straight away.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool(), &state.config().default_country_code);
    let registration = Registration {
        name: &form.name,
        email: &form.email,
        phone: &form.phone,
        password: &form.password,
        confirm_password: &form.confirm_password,
    };

    match auth.register_customer(&registration).await {
        Ok(customer) => {
            start_session(&ctx, &customer).await?;
            tracing::info!(customer_id = %customer.id, "Customer registered");
            Ok(Redirect::to("/menu?success=registered").into_response())
        }
        Err(AuthError::Validation(errors)) => Ok(RegisterTemplate {
            page: PageContext::load(&ctx, Flash::default()).await?,
            name: form.name,
            email: form.email,
            phone: form.phone,
            errors,
        }
        .into_response()),
        Err(e) => Err(auth_failure(e)),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log the customer out. The cart stays with the browser session.
#[instrument(skip_all)]
pub async fn logout(ctx: SessionContext) -> Result<Response, AppError> {
    ctx.logout_customer().await?;
    clear_sentry_user();
    Ok(Redirect::to("/?success=logged_out").into_response())
}

async fn start_session(ctx: &SessionContext, customer: &Customer) -> Result<(), AppError> {
    ctx.login_customer(&CurrentCustomer {
        id: customer.id,
        name: customer.name.clone(),
        email: customer.email.clone(),
    })
    .await?;
    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    Ok(())
}

fn auth_failure(err: AuthError) -> AppError {
    match err {
        AuthError::Repository(e) => AppError::Database(e),
        other => AppError::Internal(other.to_string()),
    }
}
