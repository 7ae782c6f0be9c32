//! Order authorization predicate
//!
//! Every order-scoped operation (lifecycle actions, messaging, reviews,
//! realtime subscriptions) goes through [`authorize`].

use shared::models::Order;
use shared::order::{Party, Relation};
use shared::{AppError, ErrorCode};

/// Check that `actor_id` takes part in `order` with the required relation.
///
/// Non-participants are denied everything. Returns the actor's party.
pub fn authorize(actor_id: &str, order: &Order, relation: Relation) -> Result<Party, AppError> {
    let party = order.party_of(actor_id).ok_or_else(|| {
        AppError::new(ErrorCode::NotOrderParticipant).with_detail("order_id", order.id.as_str())
    })?;

    if !relation.admits(party) {
        return Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            format!("Only the {} of this order can do that", relation),
        )
        .with_detail("order_id", order.id.as_str()));
    }

    Ok(party)
}
