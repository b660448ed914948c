//! Back office through the router, with a real database behind it.
//!
//! Requires `TEST_DATABASE_URL`. Run with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use tower::ServiceExt;

use cafe_core::OwnerRole;
use cafe_integration_tests::{
    body_text, form, get, location, session_cookie, test_app, test_pool, unique,
};
use cafe_web::services::auth::{AuthService, StaffRegistration};

const PASSWORD: &str = "correct-horse-battery";

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_owner_sees_dashboard() {
    let pool = test_pool().await;
    let username = format!("staff{}", unique());
    let email = format!("{username}@cafe.example");
    AuthService::new(&pool, "91")
        .create_owner(&StaffRegistration {
            username: &username,
            email: &email,
            full_name: "Kiran Das",
            phone: None,
            role: OwnerRole::Staff.as_str(),
            password: PASSWORD,
        })
        .await
        .unwrap();

    let app = test_app(pool);
    let login = app
        .clone()
        .oneshot(form(
            "/admin/login",
            None,
            format!("username={username}&password={PASSWORD}"),
        ))
        .await
        .unwrap();
    assert_eq!(location(&login), "/admin?success=logged_in");
    let cookie = session_cookie(&login);

    let dashboard = app.clone().oneshot(get("/admin", &cookie)).await.unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);
    assert!(body_text(dashboard).await.contains(&username));
}
