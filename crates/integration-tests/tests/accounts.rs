//! Customer and owner accounts against a real database.
//!
//! Requires `TEST_DATABASE_URL`. Run with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used)]

use cafe_core::OwnerRole;
use cafe_integration_tests::{test_pool, unique, unique_phone};
use cafe_web::db::OwnerRepository;
use cafe_web::services::auth::{AuthError, AuthService, Registration, StaffRegistration};

const PASSWORD: &str = "correct-horse-battery";

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_register_then_login() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool, "91");
    let email = format!("asha.{}@example.com", unique());
    let phone = unique_phone();

    let customer = auth
        .register_customer(&Registration {
            name: "Asha Rao",
            email: &email,
            phone: &phone,
            password: PASSWORD,
            confirm_password: PASSWORD,
        })
        .await
        .unwrap();
    assert_eq!(customer.phone, format!("+91{phone}"));

    let logged_in = auth
        .login_customer(&email.to_uppercase(), PASSWORD)
        .await
        .unwrap();
    assert_eq!(logged_in.id, customer.id);

    let wrong = auth.login_customer(&email, "not-the-password").await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_duplicate_phone_is_a_field_error() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool, "91");
    let phone = unique_phone();

    let first_email = format!("first.{}@example.com", unique());
    auth.register_customer(&Registration {
        name: "First Customer",
        email: &first_email,
        phone: &phone,
        password: PASSWORD,
        confirm_password: PASSWORD,
    })
    .await
    .unwrap();

    // Same number written differently
    let second_email = format!("second.{}@example.com", unique());
    let spaced = format!("+91 {phone}");
    let result = auth
        .register_customer(&Registration {
            name: "Second Customer",
            email: &second_email,
            phone: &spaced,
            password: PASSWORD,
            confirm_password: PASSWORD,
        })
        .await;

    match result {
        Err(AuthError::Validation(errors)) => {
            assert!(errors.has("phone"));
            assert!(!errors.has("email"));
        }
        other => panic!("expected phone validation error, got {other:?}"),
    }
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_inactive_owner_cannot_log_in() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool, "91");
    let username = format!("staff{}", unique());
    let email = format!("{username}@cafe.example");

    let owner = auth
        .create_owner(&StaffRegistration {
            username: &username,
            email: &email,
            full_name: "Kiran Das",
            phone: None,
            role: OwnerRole::Manager.as_str(),
            password: PASSWORD,
        })
        .await
        .unwrap();
    assert_eq!(owner.role_name, "manager");
    assert!(auth.login_owner(&username, PASSWORD).await.is_ok());

    OwnerRepository::new(&pool)
        .set_active(owner.id, false)
        .await
        .unwrap();
    let result = auth.login_owner(&username, PASSWORD).await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}
