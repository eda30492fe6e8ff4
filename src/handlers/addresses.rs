use crate::handlers::common::{
    created_response, map_service_error, message_response, success_response,
};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    services::addresses::{AddressInput, UpdateAddressInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

pub fn addresses_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_addresses).post(add_address))
        .route("/:address_id", put(update_address).delete(delete_address))
        .route("/:address_id/default", post(set_default_address))
}

async fn list_addresses(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let addresses = state
        .services
        .addresses
        .list(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(addresses))
}

async fn add_address(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<AddressInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let address = state
        .services
        .addresses
        .create(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response("Address added successfully", address))
}

async fn update_address(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(address_id): Path<Uuid>,
    Json(payload): Json<UpdateAddressInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let address = state
        .services
        .addresses
        .update(user.user_id, address_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(address))
}

async fn delete_address(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(address_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .addresses
        .delete(user.user_id, address_id)
        .await
        .map_err(map_service_error)?;

    Ok(message_response("Address deleted successfully"))
}

async fn set_default_address(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(address_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let address = state
        .services
        .addresses
        .set_default(user.user_id, address_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(address))
}
