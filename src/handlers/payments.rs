use crate::handlers::common::{map_service_error, success_with_message, validate_input};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, services::payments::ProcessPaymentInput, AppState,
};
use axum::extract::{Json, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// `POST /process-payment`: captures a card payment for every item of an
/// order. Demo semantics: the card is validated by shape only.
pub async fn process_payment(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<ProcessPaymentRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let payments = state
        .services
        .payments
        .process_card_payment(
            user.user_id,
            ProcessPaymentInput {
                order_id: payload.order_id,
                card_number: payload.card_number,
                expiry_date: payload.expiry_date,
                cvv: payload.cvv,
                amount: payload.amount,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message(
        "Payment processed successfully",
        payments,
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProcessPaymentRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[validate(length(min = 1))]
    pub card_number: String,
    #[validate(length(min = 1))]
    pub expiry_date: String,
    #[validate(length(min = 1))]
    pub cvv: String,
    pub amount: Decimal,
}
