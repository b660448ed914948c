//! Table reservations.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use cafe_core::{Email, Phone, ReservationId, ReservationStatus};

use crate::db::{RepositoryError, ReservationRepository};
use crate::models::{CurrentCustomer, NewReservation, Reservation};
use crate::services::validation::{self, FieldErrors};

/// Smallest and largest party the cafe books.
pub const PARTY_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// Public reservation form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationForm {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    pub customer_email: Option<String>,
    #[serde(default)]
    pub reservation_date: String,
    #[serde(default)]
    pub reservation_time: String,
    #[serde(default)]
    pub party_size: String,
    pub special_requests: Option<String>,
}

/// Errors from reservation operations.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0}")]
    Validation(FieldErrors),

    #[error("reservation not found")]
    NotFound,

    #[error("cannot move reservation from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validate the reservation form. `today` is the earliest bookable date.
///
/// # Errors
///
/// Returns every failing field with a display message.
pub fn validate_reservation(
    form: &ReservationForm,
    customer: Option<&CurrentCustomer>,
    today: NaiveDate,
    default_country_code: &str,
) -> Result<NewReservation, FieldErrors> {
    let mut errors = FieldErrors::new();

    let customer_name = validation::person_name(&form.customer_name)
        .map_err(|msg| errors.add("customer_name", msg))
        .unwrap_or_default();

    let customer_phone = Phone::parse(&form.customer_phone, default_country_code)
        .map(Phone::into_inner)
        .map_err(|_| {
            errors.add("customer_phone", "Please enter a valid phone number (10-15 digits).");
        })
        .unwrap_or_default();

    let customer_email = match validation::optional_text(form.customer_email.as_deref()) {
        Some(raw) => Email::parse(&raw)
            .map(|email| Some(email.into_inner()))
            .map_err(|_| errors.add("customer_email", "Please enter a valid email address."))
            .unwrap_or_default(),
        None => customer.map(|c| c.email.as_str().to_owned()),
    };

    let reservation_date = match NaiveDate::parse_from_str(form.reservation_date.trim(), "%Y-%m-%d")
    {
        Ok(date) if date >= today => date,
        Ok(_) => {
            errors.add("reservation_date", "Please choose today or a later date.");
            today
        }
        Err(_) => {
            errors.add("reservation_date", "Please choose a date.");
            today
        }
    };

    let time = form.reservation_time.trim();
    let reservation_time = NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .unwrap_or_else(|_| {
            errors.add("reservation_time", "Please choose a time.");
            NaiveTime::MIN
        });

    let party_size = form
        .party_size
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|size| PARTY_SIZE_RANGE.contains(size))
        .unwrap_or_else(|| {
            errors.add("party_size", "Party size must be between 1 and 20.");
            0
        });

    errors.into_result(NewReservation {
        customer_id: customer.map(|c| c.id),
        customer_name,
        customer_phone,
        customer_email,
        reservation_date,
        reservation_time,
        party_size,
        special_requests: validation::optional_text(form.special_requests.as_deref()),
    })
}

/// Reservation service.
pub struct ReservationService<'a> {
    reservations: ReservationRepository<'a>,
}

impl<'a> ReservationService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reservations: ReservationRepository::new(pool),
        }
    }

    /// Store a validated reservation request as pending.
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::Repository` if the insert fails.
    #[instrument(skip_all, fields(date = %new.reservation_date, party_size = new.party_size))]
    pub async fn request(&self, new: &NewReservation) -> Result<Reservation, ReservationError> {
        let reservation = self.reservations.create(new).await?;
        tracing::info!(reservation_id = %reservation.id, "Reservation requested");
        Ok(reservation)
    }

    /// Move a reservation to `target` if allowed.
    ///
    /// # Errors
    ///
    /// Returns `ReservationError::NotFound` or
    /// `ReservationError::InvalidTransition`.
    #[instrument(skip(self), fields(reservation_id = %id, target = %target))]
    pub async fn update_status(
        &self,
        id: ReservationId,
        target: ReservationStatus,
    ) -> Result<(), ReservationError> {
        let reservation = self
            .reservations
            .get(id)
            .await?
            .ok_or(ReservationError::NotFound)?;

        let from = reservation.status;
        if !from.can_transition_to(target)
            || !self.reservations.update_status(id, from, target).await?
        {
            return Err(ReservationError::InvalidTransition { from, to: target });
        }

        tracing::info!(from = %from, to = %target, "Reservation status changed");
        Ok(())
    }
}
