//! Owner repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cafe_core::{Email, OwnerId};

use super::RepositoryError;
use crate::models::{NewOwner, Owner};

/// Database row for an owner.
#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: i32,
    username: String,
    email: String,
    full_name: String,
    phone: Option<String>,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OwnerRow> for Owner {
    type Error = RepositoryError;

    fn try_from(row: OwnerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: OwnerId::new(row.id),
            username: row.username,
            email,
            full_name: row.full_name,
            phone: row.phone,
            role_name: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OwnerWithHashRow {
    #[sqlx(flatten)]
    owner: OwnerRow,
    password_hash: String,
}

const OWNER_COLUMNS: &str =
    "id, username, email, full_name, phone, role, is_active, created_at, updated_at";

/// Repository for owner database operations.
pub struct OwnerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OwnerRepository<'a> {
    /// Create a new owner repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an owner and their password hash by username, for login.
    ///
    /// Inactive owners are returned too; the caller decides.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(Owner, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, OwnerWithHashRow>(&format!(
            "SELECT {OWNER_COLUMNS}, password_hash FROM owners WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.owner.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Get an owner by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OwnerId) -> Result<Option<Owner>, RepositoryError> {
        sqlx::query_as::<_, OwnerRow>(&format!(
            "SELECT {OWNER_COLUMNS} FROM owners WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Owner::try_from)
        .transpose()
    }

    /// List all owners, by role then username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Owner>, RepositoryError> {
        sqlx::query_as::<_, OwnerRow>(&format!(
            r"
            SELECT {OWNER_COLUMNS} FROM owners
            ORDER BY CASE role WHEN 'admin' THEN 0 WHEN 'manager' THEN 1 ELSE 2 END, username
            "
        ))
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Owner::try_from)
        .collect()
    }

    /// Create a new owner account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming the constraint if the
    /// username or email already exists.
    pub async fn create(
        &self,
        owner: &NewOwner,
        password_hash: &str,
    ) -> Result<Owner, RepositoryError> {
        sqlx::query_as::<_, OwnerRow>(&format!(
            r"
            INSERT INTO owners (username, email, password_hash, full_name, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {OWNER_COLUMNS}
            "
        ))
        .bind(&owner.username)
        .bind(owner.email.as_str())
        .bind(password_hash)
        .bind(&owner.full_name)
        .bind(owner.phone.as_deref())
        .bind(owner.role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_insert)?
        .try_into()
    }

    /// Activate or deactivate an owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no owner has this ID.
    pub async fn set_active(&self, id: OwnerId, is_active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE owners SET is_active = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(is_active)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
