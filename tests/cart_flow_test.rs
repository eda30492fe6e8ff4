mod common;

use common::TestApp;
use marketplace_api::services::{
    cart::{AddToCartInput, QuantityUpdate},
    catalog::VariantInput,
};
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn identical_variant_sets_accumulate_on_one_line() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app
        .seed_product(seller.id, "Mechanical Keyboard", dec!(80.00), 50)
        .await;

    let cart = app.state.services.cart.clone();

    cart.add_item(
        buyer,
        &product.product_id,
        AddToCartInput {
            quantity: 2,
            variant_ids: vec![],
        },
    )
    .await
    .expect("first add succeeds");

    let view = cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 3,
                variant_ids: vec![],
            },
        )
        .await
        .expect("second add succeeds");

    assert_eq!(view.items.len(), 1, "same selection must not duplicate");
    assert_eq!(view.items[0].quantity, 5);
    assert_eq!(view.order_total, dec!(400.00));
}

#[tokio::test]
async fn different_variant_sets_create_separate_lines() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app
        .seed_product_with_variants(
            seller.id,
            "T-Shirt",
            dec!(15.00),
            100,
            vec![VariantInput {
                name: "Size".to_string(),
                options: vec!["M".to_string(), "L".to_string()],
                price: None,
            }],
        )
        .await;

    let (_, variants) = app
        .state
        .services
        .catalog
        .get_product(&product.product_id)
        .await
        .expect("product exists");
    assert_eq!(variants.len(), 2);

    let cart = app.state.services.cart.clone();
    cart.add_item(
        buyer,
        &product.product_id,
        AddToCartInput {
            quantity: 1,
            variant_ids: vec![variants[0].id],
        },
    )
    .await
    .expect("add size M");

    let view = cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 1,
                variant_ids: vec![variants[1].id],
            },
        )
        .await
        .expect("add size L");

    assert_eq!(view.items.len(), 2, "different selections are separate lines");

    // Adding size M again accumulates on the first line only.
    let view = cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 2,
                variant_ids: vec![variants[0].id],
            },
        )
        .await
        .expect("re-add size M");

    assert_eq!(view.items.len(), 2);
    let quantities: Vec<i32> = view.items.iter().map(|i| i.quantity).collect();
    assert!(quantities.contains(&3) && quantities.contains(&1));
}

#[tokio::test]
async fn unknown_variant_ids_are_rejected() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Mug", dec!(9.50), 10).await;

    let err = app
        .state
        .services
        .cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 1,
                variant_ids: vec![Uuid::new_v4()],
            },
        )
        .await
        .expect_err("foreign variant id must fail");

    assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quantity_updates_and_removal() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Notebook", dec!(4.00), 30).await;

    let cart = app.state.services.cart.clone();
    let view = cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 2,
                variant_ids: vec![],
            },
        )
        .await
        .expect("add succeeds");
    let item_number = view.items[0].item_number.clone();

    cart.update_quantity(buyer, &item_number, QuantityUpdate::Increment)
        .await
        .expect("increment succeeds");
    let view = cart.get_cart(buyer).await.unwrap().expect("cart exists");
    assert_eq!(view.items[0].quantity, 3);

    cart.update_quantity(buyer, &item_number, QuantityUpdate::Decrement)
        .await
        .expect("decrement succeeds");
    let view = cart.get_cart(buyer).await.unwrap().expect("cart exists");
    assert_eq!(view.items[0].quantity, 2);

    cart.remove_item(buyer, &item_number)
        .await
        .expect("remove succeeds");
    let view = cart.get_cart(buyer).await.unwrap().expect("order row remains");
    assert!(view.items.is_empty());
    assert_eq!(app.state.services.cart.cart_count(buyer).await.unwrap(), 0);
}

#[tokio::test]
async fn decrementing_a_single_unit_line_removes_it() {
    let app = TestApp::new().await;
    let buyer = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Pen", dec!(1.25), 10).await;

    let cart = app.state.services.cart.clone();
    let view = cart
        .add_item(
            buyer,
            &product.product_id,
            AddToCartInput {
                quantity: 1,
                variant_ids: vec![],
            },
        )
        .await
        .expect("add succeeds");
    let item_number = view.items[0].item_number.clone();

    cart.update_quantity(buyer, &item_number, QuantityUpdate::Decrement)
        .await
        .expect("decrement succeeds");

    assert_eq!(cart.cart_count(buyer).await.unwrap(), 0);
}

#[tokio::test]
async fn carts_are_scoped_per_user() {
    let app = TestApp::new().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let seller = app.seed_seller(Uuid::new_v4()).await;
    let product = app.seed_product(seller.id, "Lamp", dec!(25.00), 5).await;

    let cart = app.state.services.cart.clone();
    let view = cart
        .add_item(
            alice,
            &product.product_id,
            AddToCartInput {
                quantity: 1,
                variant_ids: vec![],
            },
        )
        .await
        .expect("alice adds");
    let item_number = view.items[0].item_number.clone();

    assert!(cart.get_cart(bob).await.unwrap().is_none());

    let err = cart
        .remove_item(bob, &item_number)
        .await
        .expect_err("bob cannot touch alice's line");
    assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
}
