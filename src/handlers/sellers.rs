use crate::handlers::common::{
    created_response, map_service_error, success_response, success_with_message,
};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    services::{
        order_status::{ShippingDetails, UpdateStatusInput},
        returns::{ProcessRefundInput, ReturnDecisionInput},
        sellers::{RegisterSellerInput, StatsPeriod},
    },
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;

/// Seller-facing endpoints: profile, fulfillment, returns, payouts,
/// dashboard and catalog management.
pub fn seller_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_seller))
        .route("/profile", get(get_profile))
        .route("/status", get(seller_status))
        .route("/orders", get(seller_orders))
        .route("/orders/:order_item_id", get(order_item_detail))
        .route("/orders/update-status/:order_item_id", post(update_order_status))
        .route(
            "/returns/update-return-status/:order_item_id",
            post(update_return_status),
        )
        .route("/process-refund/:order_item_id", post(process_refund))
        .route("/payouts", get(seller_payouts))
        .route("/payouts/stats", get(payout_stats))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/dashboard/top-products", get(top_products))
        .nest("/products", crate::handlers::products::seller_products_routes())
}

async fn register_seller(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<RegisterSellerInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = state
        .services
        .sellers
        .register(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(
        "Seller profile created successfully",
        seller,
    ))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = state
        .services
        .sellers
        .get_profile(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(seller))
}

async fn seller_status(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let status = state
        .services
        .sellers
        .status(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(status))
}

async fn seller_orders(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let orders = state
        .services
        .orders
        .seller_orders(seller.id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

async fn order_item_detail(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let detail = state
        .services
        .orders
        .seller_order_item_detail(seller.id, &order_item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

/// Advance an order item along the fulfillment state machine.
async fn update_order_status(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let status = payload.status.parse_item_status()?;
    let input = UpdateStatusInput {
        status,
        shipping_details: payload.shipping_details.map(|d| ShippingDetails {
            shipped_from: d.shipped_from,
            shipped_to: d.shipped_to,
            courier: d.courier,
            tracking_id: d.tracking_id,
        }),
    };

    state
        .services
        .order_status
        .update_status(seller.id, &order_item_id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message(
        format!("Order status updated to {}", status),
        (),
    ))
}

/// Decide a pending return request.
async fn update_return_status(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
    Json(payload): Json<UpdateReturnStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let status = payload.status.parse_return_status()?;
    let request = state
        .services
        .returns
        .decide(
            seller.id,
            &order_item_id,
            ReturnDecisionInput {
                status,
                reason: payload.reason,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message(
        format!("Return request status updated to {}", status),
        request,
    ))
}

/// Issue a refund against an item's return request.
async fn process_refund(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(order_item_id): Path<String>,
    Json(payload): Json<ProcessRefundRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let refund = state
        .services
        .returns
        .process_refund(
            seller.id,
            &order_item_id,
            ProcessRefundInput {
                amount: payload.amount,
                payment_method: payload.payment_method,
                transaction_id: payload.transaction_id,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_with_message("Refund processed successfully", refund))
}

async fn seller_payouts(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let payouts = state
        .services
        .payouts
        .seller_payouts(seller.id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(payouts))
}

async fn payout_stats(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let stats = state
        .services
        .payouts
        .seller_payout_stats(seller.id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(stats))
}

async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<StatsQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let stats = state
        .services
        .sellers
        .dashboard_stats(seller.id, query.period.unwrap_or_default())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(stats))
}

async fn top_products(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let seller = require_seller(&state, &user).await?;

    let products = state
        .services
        .sellers
        .top_products(seller.id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

async fn require_seller(
    state: &Arc<AppState>,
    user: &AuthenticatedUser,
) -> Result<crate::entities::SellerModel, ApiError> {
    state
        .services
        .sellers
        .require_profile(user.user_id)
        .await
        .map_err(map_service_error)
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub period: Option<StatsPeriod>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: RawStatus,
    #[serde(rename = "shippingDetails", alias = "shipping_details")]
    pub shipping_details: Option<ShippingDetailsRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ShippingDetailsRequest {
    #[serde(rename = "shippedFrom", alias = "shipped_from")]
    pub shipped_from: String,
    #[serde(rename = "shippedTo", alias = "shipped_to")]
    pub shipped_to: String,
    pub courier: String,
    #[serde(rename = "trackingId", alias = "tracking_id")]
    pub tracking_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReturnStatusRequest {
    pub status: RawStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessRefundRequest {
    pub amount: Decimal,
    #[serde(rename = "paymentMethod", alias = "payment_method")]
    pub payment_method: String,
    #[serde(rename = "transactionId", alias = "transaction_id")]
    pub transaction_id: String,
}

/// Status labels arrive as free text on the wire; parsing them against
/// the closed enums is the 400 boundary for unknown labels.
#[derive(Debug, Deserialize)]
pub struct RawStatus(pub String);

impl RawStatus {
    fn parse_item_status(&self) -> Result<crate::entities::ItemStatus, ApiError> {
        use crate::entities::ItemStatus::*;
        match self.0.as_str() {
            "Pending" => Ok(Pending),
            "Processing" => Ok(Processing),
            "Processed" => Ok(Processed),
            "Shipped" => Ok(Shipped),
            "Delivered" => Ok(Delivered),
            "Cancelled" => Ok(Cancelled),
            other => Err(ApiError::ValidationError(format!(
                "Invalid status: {}",
                other
            ))),
        }
    }

    fn parse_return_status(&self) -> Result<crate::entities::ReturnStatus, ApiError> {
        use crate::entities::ReturnStatus::*;
        match self.0.as_str() {
            "Approved" => Ok(Approved),
            "Rejected" => Ok(Rejected),
            "Cancelled" => Ok(Cancelled),
            "Returned" => Ok(Returned),
            other => Err(ApiError::ValidationError(format!(
                "Invalid status: {}",
                other
            ))),
        }
    }
}
