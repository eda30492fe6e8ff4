use crate::handlers::common::{map_service_error, success_with_message};
use crate::{
    auth::AuthenticatedUser,
    entities::PaymentMethod,
    errors::ApiError,
    services::checkout::CheckoutInput,
    AppState,
};
use axum::extract::{Json, State};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// `POST /checkout`: converts the caller's open cart into a placed
/// order.
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let shipping_address_id = payload
        .shipping_address_id
        .ok_or_else(|| ApiError::ValidationError("Shipping address is required".to_string()))?;

    let payment_method = payload
        .payment_method
        .as_deref()
        .and_then(PaymentMethod::parse)
        .ok_or_else(|| {
            ApiError::ValidationError(
                "Payment method must be one of: cod, card".to_string(),
            )
        })?;

    let outcome = state
        .services
        .checkout
        .checkout(
            user.user_id,
            CheckoutInput {
                shipping_address_id,
                payment_method,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message("Order placed successfully", outcome))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_address_id: Option<Uuid>,
    pub payment_method: Option<String>,
}
