//! Back-office login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::SessionContext;
use crate::models::CurrentOwner;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct OwnerLoginForm {
    pub username: String,
    pub password: String,
}

/// Back-office login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct OwnerLoginTemplate {
    pub username: String,
    pub error: Option<&'static str>,
    pub flash: Flash,
}

/// Display the login page.
#[instrument(skip_all)]
pub async fn login_page(
    ctx: SessionContext,
    Query(query): Query<MessageQuery>,
) -> Result<Response, AppError> {
    if ctx.owner().await?.is_some() {
        return Ok(Redirect::to("/admin").into_response());
    }

    Ok(OwnerLoginTemplate {
        username: String::new(),
        error: None,
        flash: query.flash(),
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip_all, fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    ctx: SessionContext,
    Form(form): Form<OwnerLoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool(), &state.config().default_country_code);

    match auth.login_owner(&form.username, &form.password).await {
        Ok(owner) => {
            ctx.login_owner(&CurrentOwner {
                id: owner.id,
                username: owner.username.clone(),
                role: owner.role_name.clone(),
            })
            .await?;
            set_sentry_user(&owner.id, Some(&owner.username));
            add_breadcrumb("auth", "Owner logged in", Some(&[("role", owner.role_name.as_str())]));
            tracing::info!(owner_id = %owner.id, "Owner logged in");
            Ok(Redirect::to("/admin?success=logged_in").into_response())
        }
        Err(AuthError::InvalidCredentials | AuthError::Validation(_)) => {
            tracing::info!("Owner login rejected");
            Ok(OwnerLoginTemplate {
                username: form.username,
                error: Some("Invalid username or password."),
                flash: Flash::default(),
            }
            .into_response())
        }
        Err(AuthError::Repository(e)) => Err(e.into()),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

/// Log the owner out. A customer login in the same browser is kept.
#[instrument(skip_all)]
pub async fn logout(ctx: SessionContext) -> Result<Response, AppError> {
    ctx.logout_owner().await?;
    clear_sentry_user();
    Ok(Redirect::to("/admin/login?success=logged_out").into_response())
}
