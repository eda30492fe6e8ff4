//! Append-only status ledgers.
//!
//! The order item and return request ledgers share one shape: events are
//! inserted with a per-entity sequence number and never mutated; the
//! current status is the highest-sequence event. These helpers are the
//! only writers of either ledger table, so every workflow that advances a
//! status goes through the same append semantics. All helpers take a
//! `ConnectionTrait` so callers can run them inside their own
//! transactions.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{
    order_item_status, return_request_status, ItemStatus, OrderItemStatus, OrderItemStatusModel,
    ReturnRequestStatus, ReturnRequestStatusModel, ReturnStatus,
};
use crate::errors::ServiceError;

/// Current status event of an order item, if the ledger has begun.
pub async fn current_item_status<C: ConnectionTrait>(
    conn: &C,
    order_item_id: Uuid,
) -> Result<Option<OrderItemStatusModel>, ServiceError> {
    let event = OrderItemStatus::find()
        .filter(order_item_status::Column::OrderItemId.eq(order_item_id))
        .order_by_desc(order_item_status::Column::Seq)
        .one(conn)
        .await?;
    Ok(event)
}

/// Full status history of an order item, oldest first.
pub async fn item_status_history<C: ConnectionTrait>(
    conn: &C,
    order_item_id: Uuid,
) -> Result<Vec<OrderItemStatusModel>, ServiceError> {
    let events = OrderItemStatus::find()
        .filter(order_item_status::Column::OrderItemId.eq(order_item_id))
        .order_by_asc(order_item_status::Column::Seq)
        .all(conn)
        .await?;
    Ok(events)
}

/// Appends one event to an order item's ledger and returns it.
pub async fn append_item_status<C: ConnectionTrait>(
    conn: &C,
    order_item_id: Uuid,
    status: ItemStatus,
    shipped_from: Option<String>,
    shipped_to: Option<String>,
) -> Result<OrderItemStatusModel, ServiceError> {
    let next_seq = current_item_status(conn, order_item_id)
        .await?
        .map(|e| e.seq + 1)
        .unwrap_or(1);

    let event = order_item_status::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_item_id: Set(order_item_id),
        status: Set(status),
        shipped_from: Set(shipped_from),
        shipped_to: Set(shipped_to),
        seq: Set(next_seq),
        created_at: Set(Utc::now()),
    };

    Ok(event.insert(conn).await?)
}

/// Current status event of a return request.
pub async fn current_return_status<C: ConnectionTrait>(
    conn: &C,
    return_request_id: Uuid,
) -> Result<Option<ReturnRequestStatusModel>, ServiceError> {
    let event = ReturnRequestStatus::find()
        .filter(return_request_status::Column::ReturnRequestId.eq(return_request_id))
        .order_by_desc(return_request_status::Column::Seq)
        .one(conn)
        .await?;
    Ok(event)
}

/// Full status history of a return request, oldest first.
pub async fn return_status_history<C: ConnectionTrait>(
    conn: &C,
    return_request_id: Uuid,
) -> Result<Vec<ReturnRequestStatusModel>, ServiceError> {
    let events = ReturnRequestStatus::find()
        .filter(return_request_status::Column::ReturnRequestId.eq(return_request_id))
        .order_by_asc(return_request_status::Column::Seq)
        .all(conn)
        .await?;
    Ok(events)
}

/// Appends one event to a return request's ledger and returns it.
pub async fn append_return_status<C: ConnectionTrait>(
    conn: &C,
    return_request_id: Uuid,
    status: ReturnStatus,
    reason: Option<String>,
) -> Result<ReturnRequestStatusModel, ServiceError> {
    let next_seq = current_return_status(conn, return_request_id)
        .await?
        .map(|e| e.seq + 1)
        .unwrap_or(1);

    let event = return_request_status::ActiveModel {
        id: Set(Uuid::new_v4()),
        return_request_id: Set(return_request_id),
        status: Set(status),
        reason: Set(reason),
        seq: Set(next_seq),
        created_at: Set(Utc::now()),
    };

    Ok(event.insert(conn).await?)
}
