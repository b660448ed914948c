//! Staff (owner account) management. Admin only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use cafe_core::{OwnerId, OwnerRole};

use crate::db::{OwnerRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::RequireAdmin;
use crate::models::Owner;
use crate::routes::admin::AdminContext;
use crate::services::auth::{AuthError, AuthService, StaffRegistration};
use crate::services::validation::FieldErrors;
use crate::state::AppState;

const STAFF_PATH: &str = "/admin/staff";

/// Staff page query.
#[derive(Debug, Default, Deserialize)]
pub struct StaffQuery {
    pub action: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

/// New owner form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub password: String,
}

/// Activate/deactivate form.
#[derive(Debug, Deserialize)]
pub struct ActiveForm {
    pub active: String,
}

/// Owner row display data.
#[derive(Debug, Clone)]
pub struct StaffView {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub is_self: bool,
}

impl StaffView {
    fn new(owner: &Owner, current: OwnerId) -> Self {
        Self {
            id: owner.id.as_i32(),
            username: owner.username.clone(),
            full_name: owner.full_name.clone(),
            email: owner.email.as_str().to_owned(),
            phone: owner.phone.clone(),
            role: owner.role_name.clone(),
            is_active: owner.is_active,
            is_self: owner.id == current,
        }
    }
}

/// Staff list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/staff.html")]
pub struct StaffListTemplate {
    pub admin: AdminContext,
    pub staff: Vec<StaffView>,
}

/// A role choice for the select element.
#[derive(Debug, Clone, Copy)]
pub struct RoleOption {
    pub value: &'static str,
    pub selected: bool,
}

/// New owner form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/staff_form.html")]
pub struct StaffFormTemplate {
    pub admin: AdminContext,
    pub form: StaffForm,
    pub roles: Vec<RoleOption>,
    pub errors: FieldErrors,
}

fn roles(selected: &str) -> Vec<RoleOption> {
    OwnerRole::ALL
        .into_iter()
        .map(|role| RoleOption {
            value: role.as_str(),
            selected: role.as_str() == selected,
        })
        .collect()
}

/// Staff list, or the new account form with `?action=add`.
#[instrument(skip_all, fields(owner_id = %owner.id, action = ?query.action))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(owner): RequireAdmin,
    Query(query): Query<StaffQuery>,
) -> Result<Response, AppError> {
    let admin = AdminContext::new(&owner, STAFF_PATH, query.messages.flash());

    match query.action.as_deref().unwrap_or("list") {
        "list" => {
            let staff = OwnerRepository::new(state.pool()).list().await?;
            Ok(StaffListTemplate {
                admin,
                staff: staff.iter().map(|o| StaffView::new(o, owner.id)).collect(),
            }
            .into_response())
        }
        "add" => Ok(StaffFormTemplate {
            admin,
            form: StaffForm::default(),
            roles: roles(OwnerRole::Staff.as_str()),
            errors: FieldErrors::new(),
        }
        .into_response()),
        _ => Ok(Redirect::to(&format!("{STAFF_PATH}?error=invalid_action")).into_response()),
    }
}

/// Create an owner account with `?action=add`.
#[instrument(skip_all, fields(owner_id = %owner.id, action = ?query.action))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAdmin(owner): RequireAdmin,
    Query(query): Query<StaffQuery>,
    Form(form): Form<StaffForm>,
) -> Result<Response, AppError> {
    if query.action.as_deref() != Some("add") {
        return Ok(Redirect::to(&format!("{STAFF_PATH}?error=invalid_action")).into_response());
    }

    let registration = StaffRegistration {
        username: &form.username,
        email: &form.email,
        full_name: &form.full_name,
        phone: form.phone.as_deref(),
        role: &form.role,
        password: &form.password,
    };

    match AuthService::new(state.pool(), &state.config().default_country_code)
        .create_owner(&registration)
        .await
    {
        Ok(created) => {
            tracing::info!(created_id = %created.id, role = %created.role_name, "Staff account created");
            Ok(Redirect::to(&format!("{STAFF_PATH}?success=staff_created")).into_response())
        }
        Err(AuthError::Validation(errors)) => Ok(StaffFormTemplate {
            admin: AdminContext::new(&owner, STAFF_PATH, Flash::default()),
            roles: roles(&form.role),
            form: StaffForm {
                password: String::new(),
                ..form
            },
            errors,
        }
        .into_response()),
        Err(AuthError::Repository(e)) => Err(e.into()),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

/// Activate or deactivate an account. Admins cannot deactivate themselves.
#[instrument(skip(state, owner, form), fields(owner_id = %owner.id))]
pub async fn set_active(
    State(state): State<AppState>,
    RequireAdmin(owner): RequireAdmin,
    Path(id): Path<i32>,
    Form(form): Form<ActiveForm>,
) -> Result<Response, AppError> {
    let target = OwnerId::new(id);
    let active = form.active == "true";

    if target == owner.id && !active {
        return Ok(Redirect::to(&format!("{STAFF_PATH}?error=self_deactivate")).into_response());
    }

    match OwnerRepository::new(state.pool())
        .set_active(target, active)
        .await
    {
        Ok(()) => {
            tracing::info!(target_id = %target, active, "Staff account status changed");
            Ok(Redirect::to(&format!("{STAFF_PATH}?success=staff_updated")).into_response())
        }
        Err(RepositoryError::NotFound) => {
            Ok(Redirect::to(&format!("{STAFF_PATH}?error=staff_not_found")).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cafe_core::Email;
    use chrono::Utc;

    #[test]
    fn test_staff_view_marks_self() {
        let owner = Owner {
            id: OwnerId::new(2),
            username: "priya".to_string(),
            email: Email::parse("priya@cafe.example").unwrap(),
            full_name: "Priya Nair".to_string(),
            phone: None,
            role_name: "admin".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(StaffView::new(&owner, OwnerId::new(2)).is_self);
        assert!(!StaffView::new(&owner, OwnerId::new(3)).is_self);
    }

    #[test]
    fn test_roles_listed_lowest_first() {
        let options = roles("manager");
        let values: Vec<&str> = options.iter().map(|r| r.value).collect();
        assert_eq!(values, vec!["staff", "manager", "admin"]);
        let selected: Vec<&str> = options.iter().filter(|r| r.selected).map(|r| r.value).collect();
        assert_eq!(selected, vec!["manager"]);
    }
}
