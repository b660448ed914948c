//! Back-office reservation handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use cafe_core::{ReservationId, ReservationStatus};

use crate::db::ReservationRepository;
use crate::error::AppError;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::RequireOwner;
use crate::models::Reservation;
use crate::routes::admin::AdminContext;
use crate::routes::views::StatusOption;
use crate::services::reservations::{ReservationError, ReservationService};
use crate::state::AppState;

/// Reservation list query.
#[derive(Debug, Deserialize)]
pub struct ReservationListQuery {
    pub status: Option<String>,
    #[serde(flatten)]
    pub messages: MessageQuery,
}

/// Status change form.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Reservation row display data.
#[derive(Debug, Clone)]
pub struct ReservationView {
    pub id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub date: String,
    pub time: String,
    pub party_size: u32,
    pub special_requests: Option<String>,
    pub status: &'static str,
    pub status_label: &'static str,
    pub next_statuses: Vec<StatusOption>,
}

impl From<&Reservation> for ReservationView {
    fn from(r: &Reservation) -> Self {
        Self {
            id: r.id.as_i32(),
            customer_name: r.customer_name.clone(),
            customer_phone: r.customer_phone.clone(),
            customer_email: r.customer_email.clone(),
            date: r.reservation_date.format("%a %d %b %Y").to_string(),
            time: r.reservation_time.format("%H:%M").to_string(),
            party_size: r.party_size,
            special_requests: r.special_requests.clone(),
            status: r.status.as_str(),
            status_label: r.status.label(),
            next_statuses: ReservationStatus::ALL
                .into_iter()
                .filter(|target| r.status.can_transition_to(*target))
                .map(|target| StatusOption {
                    value: target.as_str(),
                    label: target.label(),
                })
                .collect(),
        }
    }
}

/// Reservation list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/reservations.html")]
pub struct ReservationListTemplate {
    pub admin: AdminContext,
    pub reservations: Vec<ReservationView>,
    pub statuses: Vec<StatusOption>,
    pub selected_status: Option<&'static str>,
}

/// Reservation list, optionally filtered by status.
#[instrument(skip_all, fields(status = ?query.status))]
pub async fn index(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Query(query): Query<ReservationListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query.status.as_deref().and_then(ReservationStatus::parse);
    let reservations = ReservationRepository::new(state.pool())
        .list(status)
        .await?;

    Ok(ReservationListTemplate {
        admin: AdminContext::new(&owner, "/admin/reservations", query.messages.flash()),
        reservations: reservations.iter().map(ReservationView::from).collect(),
        statuses: ReservationStatus::ALL
            .into_iter()
            .map(|s| StatusOption {
                value: s.as_str(),
                label: s.label(),
            })
            .collect(),
        selected_status: status.map(ReservationStatus::as_str),
    })
}

/// Confirm, complete or cancel a reservation.
#[instrument(skip(state, owner, form), fields(owner_id = %owner.id, target = %form.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireOwner(owner): RequireOwner,
    Path(id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    let Some(target) = ReservationStatus::parse(&form.status) else {
        return Ok(Redirect::to("/admin/reservations?error=invalid_transition").into_response());
    };

    let target_url = match ReservationService::new(state.pool())
        .update_status(ReservationId::new(id), target)
        .await
    {
        Ok(()) => "/admin/reservations?success=status_updated",
        Err(ReservationError::Repository(e)) => return Err(e.into()),
        Err(ReservationError::NotFound) => "/admin/reservations?error=reservation_not_found",
        Err(e) => {
            tracing::info!(error = %e, "Reservation status change refused");
            "/admin/reservations?error=invalid_transition"
        }
    };
    Ok(Redirect::to(target_url).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    #[test]
    fn test_pending_reservation_view() {
        let reservation = Reservation {
            id: ReservationId::new(3),
            customer_id: None,
            customer_name: "Meera Iyer".to_string(),
            customer_phone: "+919876543210".to_string(),
            customer_email: None,
            reservation_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            reservation_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            party_size: 4,
            special_requests: None,
            status: ReservationStatus::Pending,
            created_at: Utc::now(),
        };

        let view = ReservationView::from(&reservation);
        assert_eq!(view.date, "Sat 14 Mar 2026");
        assert_eq!(view.time, "19:30");
        let next: Vec<&str> = view.next_statuses.iter().map(|s| s.value).collect();
        assert_eq!(next, vec!["confirmed", "cancelled"]);
    }
}
