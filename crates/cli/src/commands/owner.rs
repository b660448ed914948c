//! Owner account commands.
//!
//! # Usage
//!
//! ```bash
//! # Create the first admin; the password is read from CAFE_OWNER_PASSWORD
//! CAFE_OWNER_PASSWORD='...' cafe-cli owner create -u priya -e priya@cafe.example \
//!     -n "Priya Nair" -r admin
//! ```
//!
//! # Environment Variables
//!
//! - `CAFE_DATABASE_URL` - `PostgreSQL` connection string
//! - `CAFE_OWNER_PASSWORD` - Password for the new account
//! - `CAFE_DEFAULT_COUNTRY_CODE` - Dialling code for bare phone numbers (default: 91)

use cafe_core::OwnerId;
use cafe_web::services::auth::{AuthService, StaffRegistration};

use super::{CommandError, connect};

/// Arguments for `owner create`.
#[derive(Debug)]
pub struct CreateOwner<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
}

/// Create an owner account with the same rules as the back office form.
///
/// # Errors
///
/// Returns an error if the password variable is unset, a field is invalid,
/// the username or email is taken, or the database fails.
pub async fn create(args: &CreateOwner<'_>) -> Result<OwnerId, CommandError> {
    let pool = connect().await?;

    let password = std::env::var("CAFE_OWNER_PASSWORD")
        .map_err(|_| CommandError::MissingEnvVar("CAFE_OWNER_PASSWORD"))?;
    let country_code =
        std::env::var("CAFE_DEFAULT_COUNTRY_CODE").unwrap_or_else(|_| "91".to_owned());

    let registration = StaffRegistration {
        username: args.username,
        email: args.email,
        full_name: args.full_name,
        phone: args.phone,
        role: args.role,
        password: &password,
    };

    tracing::info!("Creating owner account: {} ({})", args.username, args.role);
    let owner = AuthService::new(&pool, &country_code)
        .create_owner(&registration)
        .await?;

    tracing::info!(
        "Owner created successfully! ID: {}, Username: {}, Role: {}",
        owner.id,
        owner.username,
        owner.role_name
    );
    Ok(owner.id)
}
