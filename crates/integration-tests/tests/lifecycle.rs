//! Order status changes and menu deletes against a real database.
//!
//! Requires `TEST_DATABASE_URL`. Run with `cargo test -- --ignored`.

#![allow(clippy::unwrap_used)]

use cafe_core::{Cart, CheckoutDetails, OrderId, OrderStatus, OrderType, PricingConfig};
use cafe_integration_tests::{menu_item, test_pool};
use cafe_web::db::{MenuItemRepository, OrderRepository};
use cafe_web::services::cart::CartService;
use cafe_web::services::checkout::CheckoutService;
use cafe_web::services::orders::{OrderService, OrderStatusError};
use sqlx::PgPool;

async fn pickup_order(pool: &PgPool) -> (OrderId, cafe_core::MenuItemId) {
    let item = menu_item(pool, "Vada Pav", 45).await;
    let mut cart = Cart::new();
    CartService::new(pool).add(&mut cart, item.id, 2).await.unwrap();

    let pricing = PricingConfig::default();
    let id = CheckoutService::new(pool, &pricing)
        .place_order(
            &cart,
            CheckoutDetails {
                customer_id: None,
                order_type: OrderType::Pickup,
                delivery_address: None,
                special_instructions: Some("Extra chutney".to_owned()),
                contact_name: "Meera Iyer".to_owned(),
                contact_phone: "+919812345678".to_owned(),
                contact_email: None,
            },
        )
        .await
        .unwrap();
    (id, item.id)
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_status_update_is_conditional() {
    let pool = test_pool().await;
    let (order_id, _) = pickup_order(&pool).await;
    let orders = OrderRepository::new(&pool);

    assert!(
        orders
            .update_status(order_id, OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap()
    );
    // A second writer that still believes the order is pending loses
    assert!(
        !orders
            .update_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap()
    );

    let order = orders.get(order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_service_walks_the_lifecycle() {
    let pool = test_pool().await;
    let (order_id, _) = pickup_order(&pool).await;
    let service = OrderService::new(&pool);

    for target in [
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Completed,
    ] {
        assert_eq!(service.update_status(order_id, target).await.unwrap(), target);
    }

    let result = service
        .update_status(order_id, OrderStatus::Cancelled)
        .await;
    assert!(matches!(
        result,
        Err(OrderStatusError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Cancelled,
        })
    ));

    let missing = service
        .update_status(OrderId::new(i32::MAX), OrderStatus::Confirmed)
        .await;
    assert!(matches!(missing, Err(OrderStatusError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_deleting_menu_item_keeps_order_lines() {
    let pool = test_pool().await;
    let (order_id, menu_item_id) = pickup_order(&pool).await;

    MenuItemRepository::new(&pool)
        .delete(menu_item_id)
        .await
        .unwrap();

    let lines = OrderRepository::new(&pool).items(order_id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines.iter().all(|line| line.menu_item_id.is_none()));
    assert!(lines.iter().all(|line| line.item_name.starts_with("Vada Pav")));
}
