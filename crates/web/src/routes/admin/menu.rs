//! Back-office menu management.
//!
//! One endpoint drives the editor through `?action=list|add|edit|delete&id=`.
//! GET renders the screen for the action, POST applies it. Deleting is a
//! two-step flow: the confirmation screen issues a single-use token bound to
//! the item, and the POST must present it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use cafe_core::MenuItemId;

use crate::db::{MenuItemRepository, RepositoryError};
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::{RequireOwner, SessionContext};
use crate::models::{CurrentOwner, MenuItem};
use crate::routes::admin::AdminContext;
use crate::routes::menu::MenuItemView;
use crate::services::menu::MenuItemForm;
use crate::services::validation::FieldErrors;
use crate::state::AppState;

const MENU_PATH: &str = "/admin/menu";

// =============================================================================
// Actions
// =============================================================================

/// Editor state selected by the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    List,
    Add,
    Edit(MenuItemId),
    Delete(MenuItemId),
}

impl MenuAction {
    /// Parse `action` and `id`. A missing action means `list`; `edit` and
    /// `delete` need a numeric id.
    #[must_use]
    pub fn parse(action: Option<&str>, id: Option<&str>) -> Option<Self> {
        let id = || {
            id.and_then(|raw| raw.trim().parse::<i32>().ok())
                .map(MenuItemId::new)
        };
        match action.map_or("list", str::trim) {
            "" | "list" => Some(Self::List),
            "add" => Some(Self::Add),
            "edit" => id().map(Self::Edit),
            "delete" => id().map(Self::Delete),
            _ => None,
        }
    }

    /// Whether the action changes the menu.
    #[must_use]
    pub const fn is_edit(self) -> bool {
        !matches!(self, Self::List)
    }

    fn url(self) -> String {
        match self {
            Self::List => MENU_PATH.to_string(),
            Self::Add => format!("{MENU_PATH}?action=add"),
            Self::Edit(id) => format!("{MENU_PATH}?action=edit&id={id}"),
            Self::Delete(id) => format!("{MENU_PATH}?action=delete&id={id}"),
        }
    }
}

/// Editor query string. Kept as strings so a bad id is an invalid action
/// rather than a rejected request.
#[derive(Debug, Default, Deserialize)]
pub struct MenuEditorQuery {
    pub action: Option<String>,
    pub id: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

impl MenuEditorQuery {
    fn action(&self) -> Option<MenuAction> {
        MenuAction::parse(self.action.as_deref(), self.id.as_deref())
    }
}

/// Body of any editor POST. Add and edit send the item fields, delete sends
/// the confirmation token.
#[derive(Debug, Default, Deserialize)]
pub struct MenuSubmission {
    #[serde(flatten)]
    pub item: MenuItemForm,
    pub confirm_token: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Back-office item row.
#[derive(Debug, Clone)]
pub struct AdminMenuItemView {
    pub item: MenuItemView,
    pub is_available: bool,
}

impl AdminMenuItemView {
    fn new(item: &MenuItem, state: &AppState) -> Self {
        Self {
            item: MenuItemView::new(item, state.config()),
            is_available: item.is_available,
        }
    }
}

/// Menu list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/menu_list.html")]
pub struct MenuListTemplate {
    pub admin: AdminContext,
    pub items: Vec<AdminMenuItemView>,
    pub can_edit: bool,
}

/// Add/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/menu_form.html")]
pub struct MenuFormTemplate {
    pub admin: AdminContext,
    pub title: &'static str,
    pub action_url: String,
    pub form: MenuItemForm,
    pub errors: FieldErrors,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/menu_delete.html")]
pub struct MenuDeleteTemplate {
    pub admin: AdminContext,
    pub item: MenuItemView,
    pub action_url: String,
    pub confirm_token: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Render the screen for the requested action.
#[instrument(skip_all, fields(owner_id = %owner.id, action = ?query.action, id = ?query.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    ctx: SessionContext,
    Query(query): Query<MenuEditorQuery>,
) -> Result<Response, AppError> {
    let action = match authorize(&state, &owner, query.action()) {
        Ok(action) => action,
        Err(redirect) => return Ok(redirect),
    };
    let admin = AdminContext::new(&owner, MENU_PATH, query.messages.flash());
    let repo = MenuItemRepository::new(state.pool());

    let response = match action {
        MenuAction::List => {
            let items = repo.list_all().await?;
            MenuListTemplate {
                admin,
                items: items
                    .iter()
                    .map(|item| AdminMenuItemView::new(item, &state))
                    .collect(),
                can_edit: can_edit(&state, &owner),
            }
            .into_response()
        }
        MenuAction::Add => MenuFormTemplate {
            admin,
            title: "Add menu item",
            action_url: action.url(),
            form: MenuItemForm::new_item(),
            errors: FieldErrors::new(),
        }
        .into_response(),
        MenuAction::Edit(id) => {
            let Some(item) = repo.get(id).await? else {
                return Ok(not_found());
            };
            MenuFormTemplate {
                admin,
                title: "Edit menu item",
                action_url: action.url(),
                form: MenuItemForm::from_item(&item),
                errors: FieldErrors::new(),
            }
            .into_response()
        }
        MenuAction::Delete(id) => {
            let Some(item) = repo.get(id).await? else {
                return Ok(not_found());
            };
            MenuDeleteTemplate {
                admin,
                item: MenuItemView::new(&item, state.config()),
                action_url: action.url(),
                confirm_token: ctx.issue_delete_token(id).await?,
            }
            .into_response()
        }
    };
    Ok(response)
}

/// Apply the requested action.
#[instrument(skip_all, fields(owner_id = %owner.id, action = ?query.action, id = ?query.id))]
pub async fn submit(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    ctx: SessionContext,
    Query(query): Query<MenuEditorQuery>,
    Form(submission): Form<MenuSubmission>,
) -> Result<Response, AppError> {
    let action = match authorize(&state, &owner, query.action()) {
        Ok(MenuAction::List) => return Ok(redirect("error=invalid_action")),
        Ok(action) => action,
        Err(redirect) => return Ok(redirect),
    };
    let repo = MenuItemRepository::new(state.pool());

    match action {
        MenuAction::Add | MenuAction::Edit(_) => {
            let input = match submission.item.validate() {
                Ok(input) => input,
                Err(errors) => {
                    return Ok(MenuFormTemplate {
                        admin: AdminContext::new(&owner, MENU_PATH, Flash::default()),
                        title: if action == MenuAction::Add {
                            "Add menu item"
                        } else {
                            "Edit menu item"
                        },
                        action_url: action.url(),
                        form: submission.item,
                        errors,
                    }
                    .into_response());
                }
            };

            let (item, code) = match action {
                MenuAction::Edit(id) => match repo.update(id, &input).await {
                    Ok(item) => (item, "item_updated"),
                    Err(RepositoryError::NotFound) => return Ok(not_found()),
                    Err(e) => return Err(e.into()),
                },
                _ => (repo.create(&input).await?, "item_created"),
            };

            let item_id = item.id.to_string();
            add_breadcrumb("menu", code, Some(&[("menu_item_id", item_id.as_str())]));
            tracing::info!(menu_item_id = %item.id, "Menu item saved");
            Ok(redirect(&format!("success={code}")))
        }
        MenuAction::Delete(id) => {
            let token = submission.confirm_token.unwrap_or_default();
            if !ctx.take_delete_token(id, &token).await? {
                tracing::info!(menu_item_id = %id, "Delete confirmation missing or stale");
                return Ok(redirect("error=delete_expired"));
            }

            match repo.delete(id).await {
                Ok(()) => {
                    tracing::info!(menu_item_id = %id, "Menu item deleted");
                    Ok(redirect("success=item_deleted"))
                }
                Err(RepositoryError::NotFound) => Ok(not_found()),
                Err(e) => Err(e.into()),
            }
        }
        MenuAction::List => Ok(redirect("error=invalid_action")),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn can_edit(state: &AppState, owner: &CurrentOwner) -> bool {
    owner.has_permission(state.config().menu_editor_role)
}

/// Resolve the action and check the editing role.
fn authorize(
    state: &AppState,
    owner: &CurrentOwner,
    action: Option<MenuAction>,
) -> Result<MenuAction, Response> {
    let Some(action) = action else {
        return Err(redirect("error=invalid_action"));
    };
    if action.is_edit() && !can_edit(state, owner) {
        tracing::warn!(owner_id = %owner.id, role = %owner.role, "Menu edit denied");
        return Err(redirect("error=access_denied"));
    }
    Ok(action)
}

fn redirect(message: &str) -> Response {
    Redirect::to(&format!("{MENU_PATH}?{message}")).into_response()
}

fn not_found() -> Response {
    redirect("error=menu_item_not_found")
}
