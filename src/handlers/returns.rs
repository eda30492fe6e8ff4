use crate::handlers::common::{map_service_error, success_with_message, validate_input};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, services::returns::RequestReturnInput, AppState,
};
use axum::extract::{Json, Path, State};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// `POST /request-return/:order_item_id`: buyer opens a return for a
/// delivered item.
pub async fn request_return(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
    Json(payload): Json<RequestReturnRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let request = state
        .services
        .returns
        .request_return(
            user.user_id,
            &order_item_id,
            RequestReturnInput {
                reason: payload.reason,
                description: payload.description,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message(
        "Return request submitted successfully",
        request,
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RequestReturnRequest {
    #[validate(length(min = 1))]
    pub reason: String,
    pub description: Option<String>,
}
