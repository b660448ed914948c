//! Database integration tests for the cafe site.
//!
//! # Running Tests
//!
//! ```bash
//! export TEST_DATABASE_URL=postgres://localhost/cafe_test
//! cargo test -p cafe-integration-tests -- --ignored
//! ```
//!
//! Every test creates its own rows with unique names, so runs can share a
//! database. Migrations are applied on connect.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, header};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower_sessions::MemoryStore;

use cafe_web::config::CafeConfig;
use cafe_web::db::MenuItemRepository;
use cafe_web::models::{MenuItem, MenuItemInput};
use cafe_web::state::AppState;

/// Connect to `TEST_DATABASE_URL` and apply migrations.
pub async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../web/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Number of orders placed under `contact_name`.
pub async fn orders_named(pool: &PgPool, contact_name: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE contact_name = $1")
        .bind(contact_name)
        .fetch_one(pool)
        .await
        .expect("Failed to count orders")
}

/// A short unique suffix for names, emails and usernames.
#[must_use]
pub fn unique() -> String {
    uuid::Uuid::new_v4().simple().to_string().chars().take(12).collect()
}

/// A unique suffix of lowercase letters, for fields that reject digits.
#[must_use]
pub fn unique_letters() -> String {
    unique()
        .chars()
        .map(|c| match c.to_digit(10) {
            // Digits map onto 'g'..='p', past the hex letters.
            Some(d) => char::from(b'g' + u8::try_from(d).unwrap_or(0)),
            None => c,
        })
        .collect()
}

/// A unique 10-digit mobile number starting with 9.
#[must_use]
pub fn unique_phone() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 1_000_000_000;
    format!("9{n:09}")
}

/// Insert an available menu item priced in whole rupees.
pub async fn menu_item(pool: &PgPool, name: &str, rupees: i64) -> MenuItem {
    MenuItemRepository::new(pool)
        .create(&MenuItemInput {
            name: format!("{name} {}", unique()),
            description: "Integration test dish.".to_owned(),
            price: Decimal::new(rupees, 0),
            image_url: None,
            category: Some("Test".to_owned()),
            is_vegetarian: true,
            is_vegan: false,
            is_spicy: false,
            is_available: true,
        })
        .await
        .expect("Failed to create menu item")
}

// =============================================================================
// Router Helpers
// =============================================================================

/// The full application over `pool` with in-memory sessions.
pub fn test_app(pool: PgPool) -> Router {
    let config = CafeConfig::from_vars(&|key| match key {
        "CAFE_DATABASE_URL" => std::env::var("TEST_DATABASE_URL").ok(),
        "CAFE_BASE_URL" => Some("http://localhost:3000".to_owned()),
        _ => None,
    })
    .expect("Failed to build test configuration");
    cafe_web::app(AppState::new(config, pool), MemoryStore::default())
}

/// A form POST from a fixed local peer, optionally inside a session.
pub fn form(path: &str, cookie: Option<&str>, body: String) -> Request<Body> {
    let mut request = Request::post(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    request.body(Body::from(body)).expect("Failed to build request")
}

/// A GET inside a session.
pub fn get(path: &str, cookie: &str) -> Request<Body> {
    Request::get(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("Failed to build request")
}

/// The redirect target of `response`.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Response has no Location header")
        .to_owned()
}

/// The `name=value` part of the session cookie set on `response`.
pub fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("Response set no session cookie")
        .to_owned()
}

/// The response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
