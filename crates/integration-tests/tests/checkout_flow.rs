//! Checkout through the router, with a real database behind it.
//!
//! Requires `TEST_DATABASE_URL`. Run with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::Router;
use axum::http::StatusCode;
use tower::ServiceExt;

use cafe_integration_tests::{
    body_text, form, get, location, menu_item, orders_named, session_cookie, test_app, test_pool,
    unique_letters,
};

async fn checkout_token(app: &Router, cookie: &str) -> String {
    let response = app.clone().oneshot(get("/checkout", cookie)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    let marker = r#"name="checkout_token" value=""#;
    let start = html.find(marker).unwrap() + marker.len();
    let len = html[start..].find('"').unwrap();
    html[start..start + len].to_owned()
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_double_submit_places_one_order() {
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let roll = menu_item(&pool, "Paneer Roll", 80).await;

    let response = app
        .clone()
        .oneshot(form(
            "/cart/add",
            None,
            format!("menu_item_id={}&quantity=2", roll.id),
        ))
        .await
        .unwrap();
    assert_eq!(location(&response), "/menu?success=added_to_cart");
    let cookie = session_cookie(&response);

    let token = checkout_token(&app, &cookie).await;
    let contact_name = format!("Double {}", unique_letters());
    let body = format!(
        "checkout_token={token}&order_type=delivery&delivery_address=12+MG+Road\
         &contact_name={}&contact_phone=9876543210",
        contact_name.replace(' ', "+")
    );

    let first = app
        .clone()
        .oneshot(form("/checkout", Some(&cookie), body.clone()))
        .await
        .unwrap();
    assert!(first.status().is_redirection());
    let confirmation = location(&first);
    assert!(confirmation.starts_with("/orders/"));
    assert!(confirmation.ends_with("/confirmation"));

    let second = app
        .clone()
        .oneshot(form("/checkout", Some(&cookie), body))
        .await
        .unwrap();
    assert!(second.status().is_redirection());
    assert_eq!(location(&second), confirmation);

    assert_eq!(orders_named(&pool, &contact_name).await, 1);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_concurrent_submits_place_one_order() {
    let pool = test_pool().await;
    let app = test_app(pool.clone());
    let chai = menu_item(&pool, "Masala Chai", 40).await;

    let response = app
        .clone()
        .oneshot(form("/cart/add", None, format!("menu_item_id={}", chai.id)))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let token = checkout_token(&app, &cookie).await;
    let contact_name = format!("Race {}", unique_letters());
    let body = format!(
        "checkout_token={token}&order_type=pickup&contact_name={}&contact_phone=9876543210",
        contact_name.replace(' ', "+")
    );

    let (a, b) = tokio::join!(
        app.clone()
            .oneshot(form("/checkout", Some(&cookie), body.clone())),
        app.clone().oneshot(form("/checkout", Some(&cookie), body)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(location(&a), location(&b));

    assert_eq!(orders_named(&pool, &contact_name).await, 1);
}
