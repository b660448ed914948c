//! Reservation repository for database operations.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use cafe_core::{CustomerId, ReservationId, ReservationStatus};

use super::{RepositoryError, quantity_from_db};
use crate::models::{NewReservation, Reservation};

/// Database row for a reservation.
#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: i32,
    customer_id: Option<i32>,
    customer_name: String,
    customer_phone: String,
    customer_email: Option<String>,
    reservation_date: NaiveDate,
    reservation_time: NaiveTime,
    party_size: i32,
    special_requests: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = RepositoryError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status = ReservationStatus::parse(&row.status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid reservation status: {}", row.status))
        })?;

        Ok(Self {
            id: ReservationId::new(row.id),
            customer_id: row.customer_id.map(CustomerId::new),
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            customer_email: row.customer_email,
            reservation_date: row.reservation_date,
            reservation_time: row.reservation_time,
            party_size: quantity_from_db(row.party_size)?,
            special_requests: row.special_requests,
            status,
            created_at: row.created_at,
        })
    }
}

const RESERVATION_COLUMNS: &str = "id, customer_id, customer_name, customer_phone, \
     customer_email, reservation_date, reservation_time, party_size, special_requests, \
     status, created_at";

/// Repository for reservation database operations.
pub struct ReservationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReservationRepository<'a> {
    /// Create a new reservation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a new pending reservation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewReservation) -> Result<Reservation, RepositoryError> {
        let party_size = i32::try_from(new.party_size).map_err(|_| {
            RepositoryError::DataCorruption(format!("party size out of range: {}", new.party_size))
        })?;

        sqlx::query_as::<_, ReservationRow>(&format!(
            r"
            INSERT INTO reservations
                (customer_id, customer_name, customer_phone, customer_email,
                 reservation_date, reservation_time, party_size, special_requests)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RESERVATION_COLUMNS}
            "
        ))
        .bind(new.customer_id)
        .bind(&new.customer_name)
        .bind(&new.customer_phone)
        .bind(new.customer_email.as_deref())
        .bind(new.reservation_date)
        .bind(new.reservation_time)
        .bind(party_size)
        .bind(new.special_requests.as_deref())
        .fetch_one(self.pool)
        .await?
        .try_into()
    }

    /// Get a reservation by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReservationId) -> Result<Option<Reservation>, RepositoryError> {
        sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Reservation::try_from)
        .transpose()
    }

    /// List reservations by date and time, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, RepositoryError> {
        sqlx::query_as::<_, ReservationRow>(&format!(
            r"
            SELECT {RESERVATION_COLUMNS} FROM reservations
            WHERE $1::TEXT IS NULL OR status = $1
            ORDER BY reservation_date DESC, reservation_time DESC
            "
        ))
        .bind(status.map(ReservationStatus::as_str))
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Reservation::try_from)
        .collect()
    }

    /// Move a reservation from `from` to `to`. Returns `false` if it was no
    /// longer in `from`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_status(
        &self,
        id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE reservations SET status = $3 WHERE id = $1 AND status = $2")
                .bind(id)
                .bind(from.as_str())
                .bind(to.as_str())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() == 1)
    }
}
