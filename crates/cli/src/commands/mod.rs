//! CLI subcommands.

pub mod migrate;
pub mod owner;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by every command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error from the web crate.
    #[error("Repository error: {0}")]
    Repository(#[from] cafe_web::db::RepositoryError),

    /// Account creation rejected.
    #[error("{0}")]
    Auth(#[from] cafe_web::services::auth::AuthError),

    /// Input rejected.
    #[error("{0}")]
    Invalid(String),
}

/// Connect using `CAFE_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CAFE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CommandError::MissingEnvVar("CAFE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(cafe_web::db::create_pool(&database_url).await?)
}
