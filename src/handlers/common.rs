use crate::errors::{ApiError, ServiceError};
use crate::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

/// 200 envelope with data only.
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 200 envelope with message and data.
pub fn success_with_message<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::success_with_message(message, data)),
    )
        .into_response()
}

/// 201 envelope with message and data.
pub fn created_response<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(message, data)),
    )
        .into_response()
}

/// 200 envelope with a message and no data payload.
pub fn message_response(message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse::<()>::message_only(message)),
    )
        .into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}
