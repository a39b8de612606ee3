mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::{json, Value};

use common::{decimal_field, read_json, TestApp};
use moviesnacks_api::entities::{Order, OrderItem};

async fn fill_cart(app: &TestApp, session: &str, items: &[(i64, u32)]) {
    for (id, quantity) in items {
        let response = app
            .session_request(
                Method::POST,
                "/api/v1/cart/items",
                session,
                Some(json!({"food_item_id": id, "quantity": quantity})),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

fn order_form() -> Value {
    json!({
        "row_letter": "B",
        "seat_number": 15,
        "customer_name": "Asha",
        "mobile_number": "9876543210",
        "payment_method": "UPI"
    })
}

#[tokio::test]
async fn order_placement_end_to_end() {
    let app = TestApp::new().await;
    let popcorn = app.seed_food_item("Popcorn", dec!(120.00), true).await;
    let cola = app.seed_food_item("Cola", dec!(80.00), true).await;
    fill_cart(&app, "s1", &[(popcorn.id, 2), (cola.id, 1)]).await;

    let response = app
        .session_request(Method::POST, "/api/v1/orders", "s1", Some(order_form()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let order = read_json(response).await;
    assert_eq!(order["seat_number"], "B15");
    assert_eq!(order["customer_name"], "Asha");
    assert_eq!(order["payment_status"], "PENDING");
    assert_eq!(order["payment_method"], "UPI");
    assert_eq!(decimal_field(&order, "total_amount"), dec!(320.00));
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    // Line totals add up to the stored order total
    let line_sum: rust_decimal::Decimal = order["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| {
            decimal_field(line, "price")
                * rust_decimal::Decimal::from(line["quantity"].as_i64().unwrap())
        })
        .sum();
    assert_eq!(line_sum, dec!(320.00));

    // The cart is consumed by the submission
    let cart = read_json(
        app.session_request(Method::GET, "/api/v1/cart", "s1", None)
            .await,
    )
    .await;
    assert_eq!(cart["count"], 0);

    // The order can be fetched back by id
    let order_id = order["id"].as_str().unwrap();
    let response = app
        .request(Method::GET, &format!("/api/v1/orders/{}", order_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = read_json(response).await;
    assert_eq!(fetched["id"], order["id"]);
    assert_eq!(fetched["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_cart_submission_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .session_request(Method::POST, "/api/v1/orders", "s1", Some(order_form()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["message"], "cart is empty");
}

#[tokio::test]
async fn invalid_form_collects_field_errors() {
    let app = TestApp::new().await;
    let popcorn = app.seed_food_item("Popcorn", dec!(120.00), true).await;
    fill_cart(&app, "s1", &[(popcorn.id, 1)]).await;

    let response = app
        .session_request(
            Method::POST,
            "/api/v1/orders",
            "s1",
            Some(json!({
                "row_letter": "bb",
                "seat_number": 0,
                "customer_name": "  ",
                "payment_method": "UPI"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    let details = body["details"].as_array().expect("field details expected");
    let fields: Vec<&str> = details
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"customer_name"));
    assert!(fields.contains(&"row_letter"));
    assert!(fields.contains(&"seat_number"));
    assert!(fields.contains(&"mobile_number"));

    // Nothing was persisted and the cart survives
    let orders = Order::find().all(&*app.state.db).await.unwrap();
    assert!(orders.is_empty());
    let cart = read_json(
        app.session_request(Method::GET, "/api/v1/cart", "s1", None)
            .await,
    )
    .await;
    assert_eq!(cart["count"], 1);
}

#[tokio::test]
async fn cash_orders_do_not_need_a_mobile_number() {
    let app = TestApp::new().await;
    let popcorn = app.seed_food_item("Popcorn", dec!(120.00), true).await;
    fill_cart(&app, "s1", &[(popcorn.id, 1)]).await;

    let response = app
        .session_request(
            Method::POST,
            "/api/v1/orders",
            "s1",
            Some(json!({
                "row_letter": "A",
                "seat_number": 1,
                "customer_name": "Ravi",
                "payment_method": "CASH"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let order = read_json(response).await;
    assert_eq!(order["seat_number"], "A1");
    assert!(order["mobile_number"].is_null());
}

#[tokio::test]
async fn submission_fails_atomically_when_an_item_left_the_menu() {
    let app = TestApp::new().await;
    let popcorn = app.seed_food_item("Popcorn", dec!(120.00), true).await;
    let cola = app.seed_food_item("Cola", dec!(80.00), true).await;
    fill_cart(&app, "s1", &[(popcorn.id, 2), (cola.id, 1)]).await;

    // The item disappears between add and submit
    app.state
        .services
        .catalog
        .delete(cola.id)
        .await
        .expect("delete cola");

    let response = app
        .session_request(Method::POST, "/api/v1/orders", "s1", Some(order_form()))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // No partial order or lines were committed
    assert!(Order::find().all(&*app.state.db).await.unwrap().is_empty());
    assert!(OrderItem::find().all(&*app.state.db).await.unwrap().is_empty());

    // The cart is still intact for a retry
    let cart = read_json(
        app.session_request(Method::GET, "/api/v1/cart", "s1", None)
            .await,
    )
    .await;
    assert_eq!(cart["count"], 3);
}

#[tokio::test]
async fn order_total_uses_current_catalog_prices() {
    let app = TestApp::new().await;
    let popcorn = app.seed_food_item("Popcorn", dec!(120.00), true).await;
    fill_cart(&app, "s1", &[(popcorn.id, 2)]).await;

    // Reprice after the cart was filled; the persisted order reflects the
    // price at submission time
    app.state
        .services
        .catalog
        .update(
            popcorn.id,
            moviesnacks_api::services::catalog::FoodItemInput {
                name: "Popcorn".to_string(),
                description: "Salted".to_string(),
                price: dec!(150.00),
                available: true,
            },
        )
        .await
        .expect("reprice popcorn");

    let response = app
        .session_request(Method::POST, "/api/v1/orders", "s1", Some(order_form()))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let order = read_json(response).await;
    assert_eq!(decimal_field(&order, "total_amount"), dec!(300.00));
    let line = &order["items"][0];
    assert_eq!(decimal_field(line, "price"), dec!(150.00));
}

#[tokio::test]
async fn unknown_order_id_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::GET,
            "/api/v1/orders/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
