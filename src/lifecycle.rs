//! Status ledger state machines.
//!
//! Both status ledgers in the system (order items and return requests)
//! share the same shape: an append-only event log per entity, a per-entity
//! monotone sequence number, and a "current" status derived as the event
//! with the highest sequence. This module holds the transition rules; the
//! services own the ledger writes.

use crate::entities::{ItemStatus, ReturnStatus};

/// A status enumeration with a static transition table.
pub trait StateMachine: Copy + Eq + Sized + 'static {
    /// Statuses reachable from `self` through the externally-driven
    /// transition endpoint. Statuses produced by other workflows (the
    /// return flow writing onto the order item ledger) are not listed
    /// here; those workflows append directly.
    fn transitions(&self) -> &'static [Self];

    fn accepts(&self, next: Self) -> bool {
        self.transitions().contains(&next)
    }

    /// True when no externally-driven transition can leave this status.
    fn is_terminal(&self) -> bool {
        self.transitions().is_empty()
    }
}

impl StateMachine for ItemStatus {
    /// Seller-driven fulfillment edges. Everything past Delivered belongs
    /// to the return flow and is never reachable from here.
    fn transitions(&self) -> &'static [ItemStatus] {
        use ItemStatus::*;
        match self {
            Pending => &[Processing, Processed, Shipped, Delivered],
            Processing => &[Processed, Shipped, Delivered],
            Processed => &[Shipped, Delivered],
            Shipped => &[Delivered],
            Delivered | Cancelled | ReturnRequested | ReturnApproved | ReturnRejected
            | Returned | Refunded => &[],
        }
    }
}

impl StateMachine for ReturnStatus {
    /// Seller decision edges. Refunded is reached only through the refund
    /// endpoint, which appends without consulting this table and without
    /// requiring a prior approval.
    fn transitions(&self) -> &'static [ReturnStatus] {
        use ReturnStatus::*;
        match self {
            Pending => &[Approved, Rejected, Cancelled, Returned],
            Approved | Rejected | Cancelled | Returned | Refunded => &[],
        }
    }
}

/// Statuses a seller may select when deciding a return request.
pub const RETURN_DECISIONS: &[ReturnStatus] = &[
    ReturnStatus::Approved,
    ReturnStatus::Rejected,
    ReturnStatus::Cancelled,
    ReturnStatus::Returned,
];

/// Order item status mirrored onto the item ledger for each return
/// decision.
pub fn mirror_decision(decision: ReturnStatus) -> Option<ItemStatus> {
    match decision {
        ReturnStatus::Approved => Some(ItemStatus::ReturnApproved),
        ReturnStatus::Rejected => Some(ItemStatus::ReturnRejected),
        ReturnStatus::Cancelled => Some(ItemStatus::Cancelled),
        ReturnStatus::Returned => Some(ItemStatus::Returned),
        ReturnStatus::Pending | ReturnStatus::Refunded => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ItemStatus::*;

    #[test]
    fn forward_edges_follow_the_table() {
        assert!(Pending.accepts(Processing));
        assert!(Pending.accepts(Processed));
        assert!(Pending.accepts(Shipped));
        assert!(Pending.accepts(Delivered));
        assert!(Processing.accepts(Shipped));
        assert!(Processed.accepts(Delivered));
        assert!(Shipped.accepts(Delivered));
    }

    #[test]
    fn backward_and_lateral_edges_are_rejected() {
        assert!(!Delivered.accepts(Processing));
        assert!(!Shipped.accepts(Processing));
        assert!(!Shipped.accepts(Processed));
        assert!(!Processing.accepts(Pending));
        assert!(!Delivered.accepts(Delivered));
    }

    #[test]
    fn return_flow_statuses_are_terminal_for_sellers() {
        for status in [
            Cancelled,
            ReturnRequested,
            ReturnApproved,
            ReturnRejected,
            Returned,
            Refunded,
        ] {
            assert!(status.is_terminal(), "{:?} should be terminal", status);
        }
    }

    #[test]
    fn return_decisions_only_leave_pending() {
        for decision in RETURN_DECISIONS {
            assert!(ReturnStatus::Pending.accepts(*decision));
            assert!(ReturnStatus::Rejected.transitions().is_empty());
        }
        assert!(!ReturnStatus::Pending.accepts(ReturnStatus::Refunded));
    }

    #[test]
    fn every_decision_has_an_item_mirror() {
        assert_eq!(
            mirror_decision(ReturnStatus::Approved),
            Some(ItemStatus::ReturnApproved)
        );
        assert_eq!(
            mirror_decision(ReturnStatus::Rejected),
            Some(ItemStatus::ReturnRejected)
        );
        assert_eq!(
            mirror_decision(ReturnStatus::Cancelled),
            Some(ItemStatus::Cancelled)
        );
        assert_eq!(
            mirror_decision(ReturnStatus::Returned),
            Some(ItemStatus::Returned)
        );
        assert_eq!(mirror_decision(ReturnStatus::Pending), None);
    }
}
