//! Order Model

use crate::order::{OrderStatus, Party};
use serde::{Deserialize, Serialize};

use super::gig::{PlanTier, PricePlan};

/// Payment state, recorded only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

/// Terms of the chosen tier, copied when the order is placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub tier: PlanTier,
    pub price: f64,
    pub delivery_days: u32,
    pub revisions: u32,
    pub features: Vec<String>,
}

impl From<&PricePlan> for PlanSnapshot {
    fn from(plan: &PricePlan) -> Self {
        Self {
            tier: plan.tier,
            price: plan.price,
            delivery_days: plan.delivery_days,
            revisions: plan.revisions,
            features: plan.features.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionNote {
    pub note: String,
    pub requested_at: i64,
}

/// Buyer feedback, copied from the first review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: u8,
    pub comment: String,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub gig_id: String,
    pub plan: PlanSnapshot,
    pub status: OrderStatus,
    #[serde(default)]
    pub requirements: String,
    pub revisions_left: u32,
    /// Append-only
    #[serde(default)]
    pub delivery_files: Vec<String>,
    #[serde(default)]
    pub revision_notes: Vec<RevisionNote>,
    pub amount: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub feedback: Option<Feedback>,
    /// Bumped on every write; writes compare against the value they read
    #[serde(default)]
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub delivered_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Role `user_id` plays on this order, if any
    pub fn party_of(&self, user_id: &str) -> Option<Party> {
        if self.buyer_id == user_id {
            Some(Party::Buyer)
        } else if self.seller_id == user_id {
            Some(Party::Seller)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.party_of(user_id).is_some()
    }

    /// The other participant, if `user_id` is one
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        match self.party_of(user_id)? {
            Party::Buyer => Some(&self.seller_id),
            Party::Seller => Some(&self.buyer_id),
        }
    }
}

/// Place order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub gig_id: String,
    /// Tier name, matched case-sensitively
    pub tier: String,
    #[serde(default)]
    pub requirements: String,
}

/// Seller status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Canonical (`in_progress`) or display (`In Progress`) form
    pub status: String,
    #[serde(default)]
    pub delivery_files: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionRequest {
    /// Free text; may be empty
    #[serde(default)]
    pub note: String,
}

/// Order listing query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    /// Status filter; `all` or absent means every status
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Count and amount for one status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBucket {
    pub status: OrderStatus,
    pub count: u64,
    pub amount: f64,
}

/// Order statistics for one side of the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub by_status: Vec<StatusBucket>,
    pub total_orders: u64,
    pub total_amount: f64,
}

impl OrderStats {
    /// Group orders by status; statuses without orders are omitted
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut by_status: Vec<StatusBucket> = Vec::new();
        let mut total_orders = 0;
        let mut total_amount = 0.0;
        for order in orders {
            total_orders += 1;
            total_amount += order.amount;
            match by_status.iter_mut().find(|b| b.status == order.status) {
                Some(bucket) => {
                    bucket.count += 1;
                    bucket.amount += order.amount;
                }
                None => by_status.push(StatusBucket {
                    status: order.status,
                    count: 1,
                    amount: order.amount,
                }),
            }
        }
        by_status.sort_by_key(|b| OrderStatus::ALL.iter().position(|s| *s == b.status));
        Self {
            by_status,
            total_orders,
            total_amount,
        }
    }
}
