//! Order state machine
//!
//! Every status change is an [`OrderAction`]. An action names its target
//! status, the statuses it may start from, and the [`Relation`] the actor must
//! have to the order. [`transition`] is the only check; it never mutates.

use super::status::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an actor plays on a specific order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    Buyer,
    Seller,
}

/// Actor-role requirement of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Buyer,
    Seller,
    Either,
}

impl Relation {
    pub fn admits(&self, party: Party) -> bool {
        matches!(
            (self, party),
            (Relation::Either, _)
                | (Relation::Buyer, Party::Buyer)
                | (Relation::Seller, Party::Seller)
        )
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Buyer => f.write_str("buyer"),
            Relation::Seller => f.write_str("seller"),
            Relation::Either => f.write_str("buyer or seller"),
        }
    }
}

/// Status-changing action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    /// Seller accepts and starts work
    Start,
    /// Seller hands in files
    Deliver,
    /// Buyer accepts the delivery
    Complete,
    /// Buyer sends the delivery back, spending one revision
    RequestRevision,
    /// Either party abandons the order before delivery
    Cancel,
}

impl OrderAction {
    pub const ALL: [OrderAction; 5] = [
        OrderAction::Start,
        OrderAction::Deliver,
        OrderAction::Complete,
        OrderAction::RequestRevision,
        OrderAction::Cancel,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            OrderAction::Start => "start",
            OrderAction::Deliver => "deliver",
            OrderAction::Complete => "complete",
            OrderAction::RequestRevision => "request_revision",
            OrderAction::Cancel => "cancel",
        }
    }

    pub const fn target(&self) -> OrderStatus {
        match self {
            OrderAction::Start => OrderStatus::InProgress,
            OrderAction::Deliver => OrderStatus::Delivered,
            OrderAction::Complete => OrderStatus::Completed,
            OrderAction::RequestRevision => OrderStatus::InProgress,
            OrderAction::Cancel => OrderStatus::Cancelled,
        }
    }

    pub const fn allowed_from(&self) -> &'static [OrderStatus] {
        match self {
            OrderAction::Start => &[OrderStatus::Pending],
            OrderAction::Deliver => &[OrderStatus::InProgress],
            OrderAction::Complete => &[OrderStatus::Delivered],
            OrderAction::RequestRevision => &[OrderStatus::Delivered],
            OrderAction::Cancel => &[OrderStatus::Pending, OrderStatus::InProgress],
        }
    }

    pub const fn relation(&self) -> Relation {
        match self {
            OrderAction::Start | OrderAction::Deliver => Relation::Seller,
            OrderAction::Complete | OrderAction::RequestRevision => Relation::Buyer,
            OrderAction::Cancel => Relation::Either,
        }
    }

    /// Action behind a plain "set status" request.
    ///
    /// `in_progress` means starting work; the revision path back to
    /// `in_progress` has its own entry point. `pending` is never a target.
    pub const fn for_target(target: OrderStatus) -> Option<OrderAction> {
        match target {
            OrderStatus::Pending => None,
            OrderStatus::InProgress => Some(OrderAction::Start),
            OrderStatus::Delivered => Some(OrderAction::Deliver),
            OrderStatus::Completed => Some(OrderAction::Complete),
            OrderStatus::Cancelled => Some(OrderAction::Cancel),
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rejected transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} an order that is {current} (requested {requested})")]
pub struct TransitionError {
    pub current: OrderStatus,
    pub requested: OrderStatus,
    pub action: OrderAction,
}

/// Validate `action` against the order's current status.
///
/// Returns the new status on success.
pub fn transition(current: OrderStatus, action: OrderAction) -> Result<OrderStatus, TransitionError> {
    let requested = action.target();
    if action.allowed_from().contains(&current) && current.can_move_to(requested) {
        Ok(requested)
    } else {
        Err(TransitionError {
            current,
            requested,
            action,
        })
    }
}

impl From<TransitionError> for crate::error::AppError {
    fn from(err: TransitionError) -> Self {
        crate::error::AppError::invalid_transition(err.current.as_str(), err.requested.as_str())
            .with_detail("action", err.action.name())
    }
}
