use crate::handlers::common::{map_service_error, success_response};
use crate::{auth::AuthenticatedUser, errors::ApiError, AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use std::sync::Arc;

/// Buyer-side order reads.
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/:order_number", get(get_order))
        .route("/item/:order_item_id", get(get_order_item))
}

/// Placed orders, newest first.
async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .list_orders(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// One order with items, ledger history and derived totals.
async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_number): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(user.user_id, &order_number)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// One order item with ledger history and any return request.
async fn get_order_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let detail = state
        .services
        .orders
        .get_order_item(user.user_id, &order_item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}
