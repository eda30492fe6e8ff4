use crate::handlers::common::{map_service_error, success_response, success_with_message, validate_input};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    services::cart::{AddToCartInput, QuantityUpdate},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart))
        .route("/count", get(cart_count))
        .route("/add/:product_id", post(add_to_cart))
        .route("/update/:order_item_id", put(update_quantity).post(update_quantity))
        .route("/remove/:order_item_id", delete(remove_from_cart))
}

/// Current open order with items and derived totals.
async fn get_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(match cart {
        Some(order) => success_with_message("Cart retrieved successfully", order),
        None => success_with_message(
            "Cart is empty",
            json!({ "items": [], "order_total": 0 }),
        ),
    })
}

/// Number of items in the cart (storefront badge).
async fn cart_count(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let count = state
        .services
        .cart
        .cart_count(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "count": count })))
}

/// Add a product (with variant selection) to the cart.
async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(product_id): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = AddToCartInput {
        quantity: payload.qty,
        variant_ids: payload.variant_ids,
    };

    let order = state
        .services
        .cart
        .add_item(user.user_id, &product_id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message(
        "Product added to cart successfully",
        order,
    ))
}

/// Increment or decrement a cart line.
async fn update_quantity(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let method = match payload.method.as_str() {
        "increment" => QuantityUpdate::Increment,
        "decrement" => QuantityUpdate::Decrement,
        _ => return Err(ApiError::ValidationError("Invalid method".to_string())),
    };

    state
        .services
        .cart
        .update_quantity(user.user_id, &order_item_id, method)
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message("Quantity updated successfully", ()))
}

/// Remove a cart line.
async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(user.user_id, &order_item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message(
        "Item removed from cart successfully",
        (),
    ))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[serde(default = "default_qty")]
    #[validate(range(min = 1))]
    pub qty: i32,
    #[serde(default)]
    pub variant_ids: Vec<Uuid>,
}

fn default_qty() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub method: String,
}
