//! OrderManager - order creation, status changes and order queries
//!
//! Every status change runs the same pipeline:
//!
//! ```text
//! apply(actor, order_id, action, precondition)
//!     ├─ 1. Fresh read (OrderNotFound)
//!     ├─ 2. Participant + relation check (Forbidden)
//!     ├─ 3. Transition table (InvalidTransition)
//!     ├─ 4. Action precondition (NoRevisionsLeft, ValidationFailed)
//!     ├─ 5. Bump version, stamp timestamps
//!     ├─ 6. Compare-and-swap write (OrderVersionConflict)
//!     └─ 7. Publish order_status to the order room
//! ```
//!
//! Nothing is written unless every step before 6 passes.

use shared::event::OrderEvent;
use shared::models::{
    Order, OrderCreate, OrderQuery, OrderStats, PaymentStatus, PlanSnapshot, RevisionNote,
    StatusUpdate, UserRole,
};
use shared::order::{OrderAction, OrderStatus, transition};
use shared::pagination::{PageRequest, PaginatedResponse};
use shared::util::{new_id, now_millis};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::{CurrentUser, authorize};
use crate::db::{RepoError, Stores};
use crate::notify::NotificationHub;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_len, validate_required_text,
};

/// Default page size of order listings
pub const DEFAULT_ORDER_PAGE: u32 = 10;

#[derive(Clone)]
pub struct OrderManager {
    stores: Stores,
    notifier: NotificationHub,
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("stores", &"<Stores>")
            .field("notifier", &self.notifier)
            .finish()
    }
}

fn order_not_found(order_id: &str) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", order_id)
}

fn map_write_error(err: RepoError, order_id: &str) -> AppError {
    match err {
        RepoError::NotFound(_) => order_not_found(order_id),
        RepoError::Conflict(msg) => {
            tracing::warn!(order_id, "Order write lost a version race");
            AppError::with_message(ErrorCode::OrderVersionConflict, msg)
                .with_detail("order_id", order_id)
        }
        other => other.into(),
    }
}

impl OrderManager {
    pub fn new(stores: Stores, notifier: NotificationHub) -> Self {
        Self { stores, notifier }
    }

    async fn load(&self, order_id: &str) -> AppResult<Order> {
        self.stores
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }

    /// Place an order for one tier of a gig.
    ///
    /// The tier must match a plan name exactly; the first matching plan wins.
    pub async fn create(&self, actor: &CurrentUser, input: OrderCreate) -> AppResult<Order> {
        let gig = self
            .stores
            .gigs
            .find_by_id(&input.gig_id)
            .await?
            .ok_or_else(|| {
                AppError::new(ErrorCode::GigNotFound).with_detail("gig_id", input.gig_id.as_str())
            })?;

        let plan = gig.find_plan(&input.tier).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::PlanNotFound,
                format!("Gig has no '{}' plan", input.tier),
            )
            .with_detail("tier", input.tier.as_str())
        })?;

        validate_len(&input.requirements, "requirements", MAX_DESCRIPTION_LEN)?;

        if gig.owner_id == actor.id {
            return Err(AppError::new(ErrorCode::SelfOrder).with_detail("gig_id", gig.id.as_str()));
        }

        let now = now_millis();
        let order = Order {
            id: new_id(),
            buyer_id: actor.id.clone(),
            seller_id: gig.owner_id.clone(),
            gig_id: gig.id.clone(),
            plan: PlanSnapshot::from(plan),
            status: OrderStatus::Pending,
            requirements: input.requirements.trim().to_string(),
            revisions_left: plan.revisions,
            delivery_files: Vec::new(),
            revision_notes: Vec::new(),
            amount: plan.price,
            payment_status: PaymentStatus::Unpaid,
            feedback: None,
            version: 0,
            created_at: now,
            updated_at: now,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
        };

        let order = self.stores.orders.create(order).await?;
        tracing::info!(
            order_id = %order.id,
            gig_id = %order.gig_id,
            buyer_id = %order.buyer_id,
            tier = %order.plan.tier,
            amount = order.amount,
            "Order placed"
        );
        Ok(order)
    }

    /// Participant-only read
    pub async fn get(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        let order = self.load(order_id).await?;
        authorize(&actor.id, &order, shared::order::Relation::Either)?;
        Ok(order)
    }

    /// Seller route: move the order to `update.status`
    pub async fn update_status(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        update: StatusUpdate,
    ) -> AppResult<Order> {
        let target: OrderStatus = update
            .status
            .parse()
            .map_err(|e: shared::order::ParseStatusError| {
                AppError::validation(e.to_string()).with_detail("field", "status")
            })?;

        let Some(action) = OrderAction::for_target(target) else {
            let order = self.load(order_id).await?;
            authorize(&actor.id, &order, shared::order::Relation::Either)?;
            return Err(AppError::invalid_transition(
                order.status.as_str(),
                target.as_str(),
            ));
        };

        match action {
            OrderAction::Deliver => self.deliver(actor, order_id, update.delivery_files).await,
            action => self.apply(actor, order_id, action, |_, _| Ok(())).await,
        }
    }

    /// Seller accepts the order and starts work
    pub async fn start(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        self.apply(actor, order_id, OrderAction::Start, |_, _| Ok(()))
            .await
    }

    /// Seller hands in work; `files` are appended to earlier deliveries
    pub async fn deliver(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        files: Vec<String>,
    ) -> AppResult<Order> {
        self.apply(actor, order_id, OrderAction::Deliver, move |order, now| {
            for file in &files {
                validate_required_text(file, "delivery_files", MAX_URL_LEN)?;
            }
            order
                .delivery_files
                .extend(files.into_iter().map(|f| f.trim().to_string()));
            order.delivered_at = Some(now);
            Ok(())
        })
        .await
    }

    /// Buyer sends the delivery back, spending one revision.
    ///
    /// The note is optional; an empty one is still recorded with its time.
    pub async fn request_revision(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        note: &str,
    ) -> AppResult<Order> {
        let note = note.trim().to_string();
        self.apply(actor, order_id, OrderAction::RequestRevision, move |order, now| {
            if order.revisions_left == 0 {
                return Err(AppError::new(ErrorCode::NoRevisionsLeft)
                    .with_detail("order_id", order.id.as_str()));
            }
            validate_len(&note, "note", MAX_NOTE_LEN)?;
            order.revisions_left -= 1;
            order.revision_notes.push(RevisionNote {
                note,
                requested_at: now,
            });
            Ok(())
        })
        .await
    }

    /// Buyer accepts the delivery
    pub async fn complete(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        self.apply(actor, order_id, OrderAction::Complete, |order, now| {
            order.completed_at = Some(now);
            Ok(())
        })
        .await
    }

    /// Either party abandons the order before delivery
    pub async fn cancel(&self, actor: &CurrentUser, order_id: &str) -> AppResult<Order> {
        self.apply(actor, order_id, OrderAction::Cancel, |order, now| {
            order.cancelled_at = Some(now);
            Ok(())
        })
        .await
    }

    async fn apply<F>(
        &self,
        actor: &CurrentUser,
        order_id: &str,
        action: OrderAction,
        precondition: F,
    ) -> AppResult<Order>
    where
        F: FnOnce(&mut Order, i64) -> AppResult<()>,
    {
        let mut order = self.load(order_id).await?;
        authorize(&actor.id, &order, action.relation())?;

        let previous = order.status;
        let next = transition(previous, action)?;

        let now = now_millis();
        precondition(&mut order, now)?;

        let expected = order.version;
        order.status = next;
        order.version = expected + 1;
        order.updated_at = now;

        let order = self
            .stores
            .orders
            .update_if_version(order, expected)
            .await
            .map_err(|e| map_write_error(e, order_id))?;

        tracing::info!(
            order_id = %order.id,
            action = %action,
            from = %previous,
            to = %order.status,
            actor_id = %actor.id,
            version = order.version,
            "Order status changed"
        );

        self.notifier.publish(
            &order.id,
            OrderEvent::status_changed(&order, previous, &actor.id),
        );
        Ok(order)
    }

    /// Orders on the actor's side, newest first.
    ///
    /// Clients see what they bought, freelancers what they sell.
    async fn side_orders(&self, actor: &CurrentUser) -> AppResult<Vec<Order>> {
        let orders = match actor.role {
            UserRole::Client => self.stores.orders.find_by_buyer(&actor.id).await?,
            UserRole::Freelancer => self.stores.orders.find_by_seller(&actor.id).await?,
        };
        Ok(orders)
    }

    pub async fn list_for_user(
        &self,
        actor: &CurrentUser,
        query: OrderQuery,
    ) -> AppResult<PaginatedResponse<Order>> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(s.parse::<OrderStatus>().map_err(|e| {
                AppError::validation(e.to_string()).with_detail("field", "status")
            })?),
        };

        let page = PageRequest::new(query.page, query.limit, DEFAULT_ORDER_PAGE);
        let orders: Vec<Order> = self
            .side_orders(actor)
            .await?
            .into_iter()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .collect();
        Ok(page.slice(orders))
    }

    pub async fn stats(&self, actor: &CurrentUser) -> AppResult<OrderStats> {
        let orders = self.side_orders(actor).await?;
        Ok(OrderStats::from_orders(&orders))
    }
}

#[cfg(test)]
mod tests;
