use crate::handlers::common::{
    created_response, map_service_error, message_response, success_response, success_with_message,
};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    services::catalog::{CreateProductInput, UpdateProductInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::json;
use std::sync::Arc;

/// Public catalog reads.
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/:product_id", get(get_product))
}

/// Seller-side catalog management, mounted under /seller/products.
pub fn seller_products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(seller_products).post(add_product))
        .route("/:product_id", put(update_product))
        .route("/:product_id", delete(delete_product))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let products = state
        .services
        .catalog
        .list_products()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let (product, variants) = state
        .services
        .catalog
        .get_product(&product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "product": product,
        "variants": variants,
    })))
}

async fn seller_products(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = state
        .services
        .sellers
        .require_profile(user.user_id)
        .await
        .map_err(map_service_error)?;

    let products = state
        .services
        .catalog
        .list_seller_products(seller.id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

async fn add_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    if payload.name.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "Missing required field: name and description are required".to_string(),
        ));
    }

    let seller = state
        .services
        .sellers
        .require_profile(user.user_id)
        .await
        .map_err(map_service_error)?;

    let product = state
        .services
        .catalog
        .create_product(seller.id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response("Product added successfully", product))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = state
        .services
        .sellers
        .require_profile(user.user_id)
        .await
        .map_err(map_service_error)?;

    let product = state
        .services
        .catalog
        .update_product(seller.id, &product_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message("Product updated successfully", product))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(product_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = state
        .services
        .sellers
        .require_profile(user.user_id)
        .await
        .map_err(map_service_error)?;

    state
        .services
        .catalog
        .delete_product(seller.id, &product_id)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Product deleted successfully"))
}
