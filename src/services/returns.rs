use crate::{
    entities::{
        order_item, refund, return_request, ItemStatus, OrderItem, RefundModel, ReturnRequest,
        ReturnRequestModel, ReturnStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle::{mirror_decision, StateMachine, RETURN_DECISIONS},
    metrics,
    services::{ledger, orders::find_seller_item},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Return and refund lifecycle.
///
/// The return request carries its own ledger; every change is mirrored
/// onto the order item's ledger in the same transaction so the two never
/// diverge.
#[derive(Clone)]
pub struct ReturnService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ReturnService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Opens a return request for a delivered item. Allowed exactly once
    /// per item, and only while the item's current status is Delivered.
    #[instrument(skip(self, input))]
    pub async fn request_return(
        &self,
        user_id: Uuid,
        item_number: &str,
        input: RequestReturnInput,
    ) -> Result<ReturnRequestModel, ServiceError> {
        let txn = self.db.begin().await?;

        let item = OrderItem::find()
            .filter(order_item::Column::ItemNumber.eq(item_number))
            .filter(order_item::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order item not found".to_string()))?;

        let current = ledger::current_item_status(&txn, item.id)
            .await?
            .map(|e| e.status);
        if current != Some(ItemStatus::Delivered) {
            return Err(ServiceError::InvalidOperation(
                "Return can only be requested for delivered items".to_string(),
            ));
        }

        let existing = ReturnRequest::find()
            .filter(return_request::Column::OrderItemId.eq(item.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidOperation(
                "A return request already exists for this item".to_string(),
            ));
        }

        let now = Utc::now();
        let request = return_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_item_id: Set(item.id),
            user_id: Set(user_id),
            reason: Set(input.reason),
            description: Set(input.description),
            is_approved: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let request = request.insert(&txn).await?;

        ledger::append_return_status(&txn, request.id, ReturnStatus::Pending, None).await?;
        ledger::append_item_status(&txn, item.id, ItemStatus::ReturnRequested, None, None).await?;

        txn.commit().await?;

        metrics::RETURNS_OPENED_TOTAL.inc();
        self.event_sender
            .send_or_log(Event::ReturnRequested {
                return_request_id: request.id,
                order_item_id: request.order_item_id,
            })
            .await;

        info!("Return requested for order item {}", item_number);
        Ok(request)
    }

    /// Records the seller's decision on a pending return request and
    /// mirrors it onto the order item ledger. Approval flips the
    /// request's `is_approved` flag.
    #[instrument(skip(self, input))]
    pub async fn decide(
        &self,
        seller_id: Uuid,
        item_number: &str,
        input: ReturnDecisionInput,
    ) -> Result<ReturnRequestModel, ServiceError> {
        if !RETURN_DECISIONS.contains(&input.status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Invalid status: {}",
                input.status
            )));
        }

        let txn = self.db.begin().await?;

        let item = find_seller_item(&txn, seller_id, item_number).await?;
        let request = self.find_request(&txn, item.id).await?;

        let current = ledger::current_return_status(&txn, request.id)
            .await?
            .map(|e| e.status)
            .unwrap_or(ReturnStatus::Pending);
        if !current.accepts(input.status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Invalid status transition from {} to {}",
                current, input.status
            )));
        }

        ledger::append_return_status(&txn, request.id, input.status, input.reason.clone()).await?;

        let mirrored = mirror_decision(input.status)
            .ok_or_else(|| ServiceError::InvalidStatus(format!("Invalid status: {}", input.status)))?;
        ledger::append_item_status(&txn, item.id, mirrored, None, None).await?;

        let request_id = request.id;
        let mut request_update: return_request::ActiveModel = request.into();
        if input.status == ReturnStatus::Approved {
            request_update.is_approved = Set(true);
        }
        request_update.updated_at = Set(Utc::now());
        let updated = request_update.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ReturnDecided {
                return_request_id: request_id,
                decision: input.status,
            })
            .await;

        info!(
            "Return request for order item {} decided: {}",
            item_number, input.status
        );
        Ok(updated)
    }

    /// Issues a refund for an item's return request: creates the refund
    /// row and advances both ledgers to Refunded. Deliberately does not
    /// require the request to have been approved, nor an existing payment
    /// to refund against.
    #[instrument(skip(self, input))]
    pub async fn process_refund(
        &self,
        seller_id: Uuid,
        item_number: &str,
        input: ProcessRefundInput,
    ) -> Result<RefundModel, ServiceError> {
        let txn = self.db.begin().await?;

        let item = find_seller_item(&txn, seller_id, item_number).await?;
        let request = self.find_request(&txn, item.id).await?;

        let refund = refund::ActiveModel {
            id: Set(Uuid::new_v4()),
            return_request_id: Set(request.id),
            amount: Set(input.amount),
            payment_method: Set(input.payment_method),
            transaction_id: Set(input.transaction_id),
            created_at: Set(Utc::now()),
        };
        let refund = refund.insert(&txn).await?;

        ledger::append_return_status(&txn, request.id, ReturnStatus::Refunded, None).await?;
        ledger::append_item_status(&txn, item.id, ItemStatus::Refunded, None, None).await?;

        let mut item_update: order_item::ActiveModel = item.into();
        item_update.refund_id = Set(Some(refund.id));
        item_update.updated_at = Set(Utc::now());
        item_update.update(&txn).await?;

        txn.commit().await?;

        metrics::REFUNDS_ISSUED_TOTAL.inc();
        self.event_sender
            .send_or_log(Event::RefundIssued {
                refund_id: refund.id,
                return_request_id: refund.return_request_id,
                amount: refund.amount,
            })
            .await;

        info!("Refund issued for order item {}", item_number);
        Ok(refund)
    }

    async fn find_request<C: ConnectionTrait>(
        &self,
        conn: &C,
        order_item_id: Uuid,
    ) -> Result<ReturnRequestModel, ServiceError> {
        ReturnRequest::find()
            .filter(return_request::Column::OrderItemId.eq(order_item_id))
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Return request not found".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestReturnInput {
    pub reason: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReturnDecisionInput {
    pub status: ReturnStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessRefundInput {
    pub amount: Decimal,
    pub payment_method: String,
    pub transaction_id: String,
}
