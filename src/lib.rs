//! Marketplace API Library
//!
//! Multi-seller e-commerce backend: carts, checkout, per-item order
//! fulfillment, returns/refunds and seller payouts.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod ids;
pub mod lifecycle;
pub mod metrics;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

/// Response envelope shared by every successful endpoint:
/// `{"status": "success", "message": …, "data": …}` plus request metadata.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Always "success"; error responses use `ErrorResponse`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
            data: Some(data),
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
            data: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Full API surface. Mounted under the server root; caller identity comes
/// from the gateway header (see `auth`).
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        // Buyer flows
        .nest("/cart", handlers::cart::cart_routes())
        .route("/checkout", post(handlers::checkout::checkout))
        .route("/process-payment", post(handlers::payments::process_payment))
        .nest("/orders", handlers::orders::orders_routes())
        .route(
            "/request-return/:order_item_id",
            post(handlers::returns::request_return),
        )
        .nest("/addresses", handlers::addresses::addresses_routes())
        // Catalog
        .nest("/products", handlers::products::products_routes())
        // Seller flows
        .nest("/seller", handlers::sellers::seller_routes())
}

async fn api_status() -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "service": "marketplace-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}
