mod common;

use common::TestApp;
use marketplace_api::{
    entities::{ItemStatus, PaymentMethod, Refund, ReturnStatus},
    services::{
        cart::AddToCartInput,
        checkout::CheckoutInput,
        order_status::UpdateStatusInput,
        returns::{ProcessRefundInput, RequestReturnInput, ReturnDecisionInput},
    },
};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

struct Delivered {
    app: TestApp,
    buyer: Uuid,
    seller_id: Uuid,
    item_number: String,
}

/// Seeds a full purchase and advances the item to Delivered.
async fn deliver_one_item() -> Delivered {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Blender", dec!(90.00), 6).await;
    let address = app.seed_address(buyer).await;

    app.state
        .services
        .cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 1,
                variant_ids: vec![],
            },
        )
        .await
        .expect("add to cart");
    let outcome = app
        .state
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
        .expect("checkout");

    let view = app
        .state
        .services
        .orders
        .get_order(buyer, &outcome.order_number)
        .await
        .expect("order view");
    let item_number = view.items[0].item_number.clone();

    app.state
        .services
        .order_status
        .update_status(
            seller.id,
            &item_number,
            UpdateStatusInput {
                status: ItemStatus::Delivered,
                shipping_details: None,
            },
        )
        .await
        .expect("deliver item");

    Delivered {
        app,
        buyer,
        seller_id: seller.id,
        item_number,
    }
}

fn return_input() -> RequestReturnInput {
    RequestReturnInput {
        reason: "Damaged on arrival".to_string(),
        description: Some("The jar is cracked".to_string()),
    }
}

#[tokio::test]
async fn return_requires_delivered_status() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Kettle", dec!(35.00), 3).await;
    let address = app.seed_address(buyer).await;

    app.state
        .services
        .cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 1,
                variant_ids: vec![],
            },
        )
        .await
        .expect("add to cart");
    let outcome = app
        .state
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
        .expect("checkout");
    let view = app
        .state
        .services
        .orders
        .get_order(buyer, &outcome.order_number)
        .await
        .expect("order view");

    // Still Pending: return must be refused.
    let err = app
        .state
        .services
        .returns
        .request_return(buyer, &view.items[0].item_number, return_input())
        .await
        .expect_err("pending item cannot be returned");
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn return_request_mirrors_onto_the_item_ledger_and_is_single_use() {
    let d = deliver_one_item().await;

    let request = d
        .app
        .state
        .services
        .returns
        .request_return(d.buyer, &d.item_number, return_input())
        .await
        .expect("return accepted for delivered item");
    assert!(!request.is_approved);

    let detail = d
        .app
        .state
        .services
        .orders
        .get_order_item(d.buyer, &d.item_number)
        .await
        .expect("item detail");
    assert!(detail.is_return_request);
    let rr = detail.return_request.expect("return view present");
    assert_eq!(rr.current_status, Some(ReturnStatus::Pending));
    assert_eq!(
        detail.item.current_status.map(|s| s.status),
        Some(ItemStatus::ReturnRequested)
    );

    // Second request for the same item is rejected.
    let err = d
        .app
        .state
        .services
        .returns
        .request_return(d.buyer, &d.item_number, return_input())
        .await
        .expect_err("one return per item");
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approval_flips_the_flag_and_mirrors_the_status() {
    let d = deliver_one_item().await;
    d.app
        .state
        .services
        .returns
        .request_return(d.buyer, &d.item_number, return_input())
        .await
        .expect("return accepted");

    let request = d
        .app
        .state
        .services
        .returns
        .decide(
            d.seller_id,
            &d.item_number,
            ReturnDecisionInput {
                status: ReturnStatus::Approved,
                reason: Some("Verified damage".to_string()),
            },
        )
        .await
        .expect("approval succeeds");
    assert!(request.is_approved);

    let detail = d
        .app
        .state
        .services
        .orders
        .get_order_item(d.buyer, &d.item_number)
        .await
        .expect("item detail");
    assert_eq!(
        detail.item.current_status.map(|s| s.status),
        Some(ItemStatus::ReturnApproved)
    );
    let rr = detail.return_request.unwrap();
    assert_eq!(rr.current_status, Some(ReturnStatus::Approved));
    assert_eq!(rr.status_history.len(), 2);
}

#[tokio::test]
async fn rejection_mirrors_and_decisions_are_final() {
    let d = deliver_one_item().await;
    d.app
        .state
        .services
        .returns
        .request_return(d.buyer, &d.item_number, return_input())
        .await
        .expect("return accepted");

    d.app
        .state
        .services
        .returns
        .decide(
            d.seller_id,
            &d.item_number,
            ReturnDecisionInput {
                status: ReturnStatus::Rejected,
                reason: None,
            },
        )
        .await
        .expect("rejection succeeds");

    let err = d
        .app
        .state
        .services
        .returns
        .decide(
            d.seller_id,
            &d.item_number,
            ReturnDecisionInput {
                status: ReturnStatus::Approved,
                reason: None,
            },
        )
        .await
        .expect_err("a decided request cannot be re-decided");
    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);

    let detail = d
        .app
        .state
        .services
        .orders
        .get_order_item(d.buyer, &d.item_number)
        .await
        .expect("item detail");
    assert_eq!(
        detail.item.current_status.map(|s| s.status),
        Some(ItemStatus::ReturnRejected)
    );
    assert!(!detail.return_request.unwrap().is_approved);
}

#[tokio::test]
async fn refund_advances_both_ledgers_and_records_the_row() {
    let d = deliver_one_item().await;
    d.app
        .state
        .services
        .returns
        .request_return(d.buyer, &d.item_number, return_input())
        .await
        .expect("return accepted");
    d.app
        .state
        .services
        .returns
        .decide(
            d.seller_id,
            &d.item_number,
            ReturnDecisionInput {
                status: ReturnStatus::Approved,
                reason: None,
            },
        )
        .await
        .expect("approval succeeds");

    let refund = d
        .app
        .state
        .services
        .returns
        .process_refund(
            d.seller_id,
            &d.item_number,
            ProcessRefundInput {
                amount: dec!(90.00),
                payment_method: "card".to_string(),
                transaction_id: "TXN-REF-001".to_string(),
            },
        )
        .await
        .expect("refund succeeds");
    assert_eq!(refund.amount, dec!(90.00));

    assert_eq!(Refund::find().count(&*d.app.state.db).await.unwrap(), 1);

    let detail = d
        .app
        .state
        .services
        .orders
        .get_order_item(d.buyer, &d.item_number)
        .await
        .expect("item detail");
    assert_eq!(
        detail.item.current_status.map(|s| s.status),
        Some(ItemStatus::Refunded)
    );
    let rr = detail.return_request.unwrap();
    assert_eq!(rr.current_status, Some(ReturnStatus::Refunded));
}

#[tokio::test]
async fn refund_without_prior_approval_is_allowed() {
    // Refund issuance does not require an approved return.
    let d = deliver_one_item().await;
    d.app
        .state
        .services
        .returns
        .request_return(d.buyer, &d.item_number, return_input())
        .await
        .expect("return accepted");

    let refund = d
        .app
        .state
        .services
        .returns
        .process_refund(
            d.seller_id,
            &d.item_number,
            ProcessRefundInput {
                amount: dec!(45.00),
                payment_method: "cod".to_string(),
                transaction_id: "TXN-REF-002".to_string(),
            },
        )
        .await
        .expect("refund succeeds without approval");
    assert_eq!(refund.amount, dec!(45.00));
}

#[tokio::test]
async fn refund_requires_an_existing_return_request() {
    let d = deliver_one_item().await;

    let err = d
        .app
        .state
        .services
        .returns
        .process_refund(
            d.seller_id,
            &d.item_number,
            ProcessRefundInput {
                amount: dec!(10.00),
                payment_method: "card".to_string(),
                transaction_id: "TXN-REF-003".to_string(),
            },
        )
        .await
        .expect_err("no return request, no refund");
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
}
