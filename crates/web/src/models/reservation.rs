//! Reservation domain types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use cafe_core::{CustomerId, ReservationId, ReservationStatus};

/// A table booking request.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    pub party_size: u32,
    pub special_requests: Option<String>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated reservation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub reservation_date: NaiveDate,
    pub reservation_time: NaiveTime,
    pub party_size: u32,
    pub special_requests: Option<String>,
}
