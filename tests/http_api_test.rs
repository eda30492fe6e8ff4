mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn checkout_without_address_returns_the_documented_message() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();

    let (status, body) = app
        .request(
            Method::POST,
            "/checkout",
            Some(buyer),
            Some(json!({ "payment_method": "card" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Shipping address is required");
}

#[tokio::test]
async fn unknown_payment_method_is_rejected() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let address = app.seed_address(buyer).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/checkout",
            Some(buyer),
            Some(json!({
                "shipping_address_id": address.id,
                "payment_method": "wire-transfer",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn missing_identity_header_is_unauthorized() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/cart", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn cart_flow_over_http_uses_the_envelope() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Speaker", dec!(55.00), 8).await;

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/cart/add/{}", product.product_id),
            Some(buyer),
            Some(json!({ "qty": 2, "variant_ids": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Product added to cart successfully");
    assert_eq!(body["data"]["items"][0]["quantity"], 2);
    assert!(body["meta"]["request_id"].is_string());

    let (status, body) = app.request(Method::GET, "/cart", Some(buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["order_total"], "110.00");

    let (status, body) = app
        .request(Method::GET, "/cart/count", Some(buyer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn empty_cart_view_reports_the_empty_shape() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();

    let (status, body) = app.request(Method::GET, "/cart", Some(buyer), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Cart is empty");
    assert_eq!(body["data"]["order_total"], 0);
}

#[tokio::test]
async fn invalid_quantity_method_is_a_400() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();

    let (status, body) = app
        .request(
            Method::PUT,
            "/cart/update/ITM-00000-XXXX",
            Some(buyer),
            Some(json!({ "method": "double" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid method");
}

#[tokio::test]
async fn adding_an_unknown_product_is_a_404() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();

    let (status, body) = app
        .request(
            Method::POST,
            "/cart/add/pr-missing1",
            Some(buyer),
            Some(json!({ "qty": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn duplicate_seller_registration_conflicts() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    let payload = json!({
        "business_name": "Twice Registered",
        "business_address": "2 Duplicate Drive",
        "phone_number": "+15550101",
    });

    let (status, _) = app
        .request(Method::POST, "/seller/register", Some(user), Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .request(Method::POST, "/seller/register", Some(user), Some(payload))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn seller_endpoints_are_gated_on_a_profile() {
    let app = TestApp::new().await;
    let user = Uuid::new_v4();

    let (status, body) = app
        .request(Method::GET, "/seller/orders", Some(user), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn invalid_status_label_is_a_400() {
    let app = TestApp::new().await;
    let seller_user = Uuid::new_v4();
    app.seed_seller(seller_user).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/seller/orders/update-status/ITM-00000-XXXX",
            Some(seller_user),
            Some(json!({ "status": "Teleported" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap_or_default()
        .contains("Invalid status"));
}

#[tokio::test]
async fn health_and_status_probes_answer() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], "healthy");

    let (status, body) = app.request(Method::GET, "/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service"], "marketplace-api");
}
