//! Table reservation route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::{Local, NaiveDate};
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::{OptionalCustomer, SessionContext};
use crate::routes::PageContext;
use crate::services::reservations::{
    PARTY_SIZE_RANGE, ReservationError, ReservationForm, ReservationService,
    validate_reservation,
};
use crate::services::validation::FieldErrors;
use crate::state::AppState;

/// Booking form template.
#[derive(Template, WebTemplate)]
#[template(path = "reservations/new.html")]
pub struct ReservationTemplate {
    pub page: PageContext,
    pub form: ReservationForm,
    pub errors: FieldErrors,
    /// Earliest selectable date, `YYYY-MM-DD`.
    pub min_date: String,
    pub min_party: u32,
    pub max_party: u32,
}

impl ReservationTemplate {
    fn new(page: PageContext, form: ReservationForm, errors: FieldErrors, today: NaiveDate) -> Self {
        Self {
            page,
            form,
            errors,
            min_date: today.format("%Y-%m-%d").to_string(),
            min_party: *PARTY_SIZE_RANGE.start(),
            max_party: *PARTY_SIZE_RANGE.end(),
        }
    }
}

/// Bookings are taken in the cafe's local time.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Display the booking form.
#[instrument(skip_all)]
pub async fn page(
    ctx: SessionContext,
    OptionalCustomer(customer): OptionalCustomer,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let form = ReservationForm {
        customer_name: customer.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
        customer_email: customer.as_ref().map(|c| c.email.as_str().to_owned()),
        party_size: "2".to_string(),
        ..ReservationForm::default()
    };

    Ok(ReservationTemplate::new(
        PageContext::load(&ctx, query.flash()).await?,
        form,
        FieldErrors::new(),
        today(),
    ))
}

/// Request a table.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    ctx: SessionContext,
    OptionalCustomer(customer): OptionalCustomer,
    Form(form): Form<ReservationForm>,
) -> Result<Response, AppError> {
    let today = today();
    let result = match validate_reservation(
        &form,
        customer.as_ref(),
        today,
        &state.config().default_country_code,
    ) {
        Ok(new) => ReservationService::new(state.pool()).request(&new).await,
        Err(errors) => Err(ReservationError::Validation(errors)),
    };

    match result {
        Ok(_) => Ok(Redirect::to("/reservations?success=reservation_requested").into_response()),
        Err(ReservationError::Validation(errors)) => Ok(ReservationTemplate::new(
            PageContext::load(&ctx, Flash::default()).await?,
            form,
            errors,
            today,
        )
        .into_response()),
        Err(ReservationError::Repository(e)) => Err(e.into()),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}
