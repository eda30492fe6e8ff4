mod common;

use common::TestApp;
use marketplace_api::{
    entities::{
        order, payment, payout, Order, Payment, PaymentMethod, Payout, PayoutParty, Product,
    },
    services::{cart::AddToCartInput, checkout::CheckoutInput},
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

async fn fill_cart(app: &TestApp, buyer: Uuid, product_id: &str, qty: i32) {
    app.state
        .services
        .cart
        .add_item(
            buyer,
            product_id,
            AddToCartInput {
                quantity: qty,
                variant_ids: vec![],
            },
        )
        .await
        .expect("add to cart succeeds");
}

#[tokio::test]
async fn empty_cart_checkout_fails_and_writes_nothing() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let address = app.seed_address(buyer).await;

    let err = app
        .state
        .services
        .checkout
        .checkout(
            buyer,
            CheckoutInput {
                shipping_address_id: address.id,
                payment_method: PaymentMethod::Card,
            },
        )
        .await
        .expect_err("empty cart cannot check out");

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

    let orders = Order::find().count(&*app.state.db).await.unwrap();
    let payments = Payment::find().count(&*app.state.db).await.unwrap();
    assert_eq!(orders, 0);
    assert_eq!(payments, 0);
}

#[tokio::test]
async fn card_checkout_freezes_items_and_adjusts_stock() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Desk", dec!(120.00), 10).await;
    let address = app.seed_address(buyer).await;

    fill_cart(&app, buyer, &product.product_id, 3).await;

    let outcome = app
        .state
        .services
        .checkout
        .checkout(
            buyer,
            CheckoutInput {
                shipping_address_id: address.id,
                payment_method: PaymentMethod::Card,
            },
        )
        .await
        .expect("checkout succeeds");
    assert!(outcome.order_number.starts_with("ORD-"));

    // Cart is gone, the order is frozen.
    assert!(app.state.services.cart.get_cart(buyer).await.unwrap().is_none());
    let placed = Order::find()
        .filter(order::Column::OrderNumber.eq(outcome.order_number.clone()))
        .one(&*app.state.db)
        .await
        .unwrap()
        .expect("order exists");
    assert!(placed.is_ordered);

    // Items start their ledger at Pending with the address stamped.
    let view = app
        .state
        .services
        .orders
        .get_order(buyer, &outcome.order_number)
        .await
        .expect("order view");
    assert_eq!(view.items.len(), 1);
    let item = &view.items[0];
    assert!(item.is_ordered);
    assert_eq!(item.shipping_address_id, Some(address.id));
    assert_eq!(
        item.current_status.as_ref().map(|s| s.status),
        Some(marketplace_api::entities::ItemStatus::Pending)
    );
    assert_eq!(item.status_history.len(), 1);

    // Stock decremented, sold incremented.
    let product = Product::find_by_id(product.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.stock, 7);
    assert_eq!(product.sold, 3);

    // Card checkout defers payment to /process-payment.
    let payments = Payment::find().count(&*app.state.db).await.unwrap();
    assert_eq!(payments, 0);
}

#[tokio::test]
async fn cod_checkout_creates_unpaid_payment_and_payout_split() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Chair", dec!(50.00), 4).await;
    let address = app.seed_address(buyer).await;

    fill_cart(&app, buyer, &product.product_id, 2).await;

    app.state
        .services
        .checkout
        .checkout(
            buyer,
            CheckoutInput {
                shipping_address_id: address.id,
                payment_method: PaymentMethod::Cod,
            },
        )
        .await
        .expect("checkout succeeds");

    let payments = Payment::find().all(&*app.state.db).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].method, PaymentMethod::Cod);
    assert!(!payments[0].is_paid);
    assert_eq!(payments[0].amount, dec!(100.00));

    // Fee split: 10% platform, remainder to the seller, summing exactly.
    let payouts = Payout::find().all(&*app.state.db).await.unwrap();
    assert_eq!(payouts.len(), 2);
    let seller_row = payouts
        .iter()
        .find(|p| p.party == PayoutParty::Seller)
        .expect("seller payout");
    let platform_row = payouts
        .iter()
        .find(|p| p.party == PayoutParty::Platform)
        .expect("platform payout");
    assert_eq!(seller_row.amount, dec!(90.00));
    assert_eq!(platform_row.amount, dec!(10.00));
    assert_eq!(seller_row.seller_id, Some(seller.id));
    assert_eq!(seller_row.amount + platform_row.amount, payments[0].amount);
}

#[tokio::test]
async fn insufficient_stock_aborts_the_whole_checkout() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let scarce = app.seed_product(seller.id, "Limited Print", dec!(200.00), 1).await;
    let plenty = app.seed_product(seller.id, "Poster", dec!(10.00), 50).await;
    let address = app.seed_address(buyer).await;

    fill_cart(&app, buyer, &plenty.product_id, 2).await;
    fill_cart(&app, buyer, &scarce.product_id, 3).await;

    let err = app
        .state
        .services
        .checkout
        .checkout(
            buyer,
            CheckoutInput {
                shipping_address_id: address.id,
                payment_method: PaymentMethod::Card,
            },
        )
        .await
        .expect_err("oversell must fail");
    assert_eq!(
        err.status_code(),
        axum::http::StatusCode::UNPROCESSABLE_ENTITY
    );

    // All-or-nothing: the in-stock line was not advanced either.
    let plenty = Product::find_by_id(plenty.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plenty.stock, 50);
    assert_eq!(plenty.sold, 0);

    let cart = app
        .state
        .services
        .cart
        .get_cart(buyer)
        .await
        .unwrap()
        .expect("cart still open");
    assert_eq!(cart.items.len(), 2);
    assert!(cart.items.iter().all(|i| !i.is_ordered));
}

#[tokio::test]
async fn foreign_address_is_rejected() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Rug", dec!(75.00), 3).await;
    let foreign_address = app.seed_address(stranger).await;

    fill_cart(&app, buyer, &product.product_id, 1).await;

    let err = app
        .state
        .services
        .checkout
        .checkout(
            buyer,
            CheckoutInput {
                shipping_address_id: foreign_address.id,
                payment_method: PaymentMethod::Card,
            },
        )
        .await
        .expect_err("cannot ship to someone else's address");
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn card_payment_captures_per_item_with_split() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Monitor", dec!(300.00), 5).await;
    let address = app.seed_address(buyer).await;

    fill_cart(&app, buyer, &product.product_id, 1).await;
    let outcome = app
        .state
        .services
        .checkout
        .checkout(
            buyer,
            CheckoutInput {
                shipping_address_id: address.id,
                payment_method: PaymentMethod::Card,
            },
        )
        .await
        .expect("checkout succeeds");

    let payments = app
        .state
        .services
        .payments
        .process_card_payment(
            buyer,
            marketplace_api::services::payments::ProcessPaymentInput {
                order_id: outcome.order_number.clone(),
                card_number: "4242424242424242".to_string(),
                expiry_date: "12/28".to_string(),
                cvv: "123".to_string(),
                amount: dec!(300.00),
            },
        )
        .await
        .expect("payment captured");

    assert_eq!(payments.len(), 1);
    assert!(payments[0].is_paid);
    assert_eq!(payments[0].method, PaymentMethod::Card);
    assert_eq!(payments[0].amount, dec!(300.00));

    let paid = Payment::find()
        .filter(payment::Column::OrderItemId.eq(payments[0].order_item_id))
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert!(paid.is_paid);

    let payout_count = Payout::find()
        .filter(payout::Column::OrderItemId.eq(payments[0].order_item_id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(payout_count, 2);
}

#[tokio::test]
async fn malformed_card_numbers_are_rejected() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();

    let err = app
        .state
        .services
        .payments
        .process_card_payment(
            buyer,
            marketplace_api::services::payments::ProcessPaymentInput {
                order_id: "ORD-00000-XXXX".to_string(),
                card_number: "4242".to_string(),
                expiry_date: "12/28".to_string(),
                cvv: "123".to_string(),
                amount: dec!(10.00),
            },
        )
        .await
        .expect_err("short card number must fail");

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}
