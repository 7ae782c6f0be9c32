use super::*;
use crate::test_support::{OrderFixture, order_fixture, plan, user};
use shared::models::PlanTier;
use shared::order::Relation;

async fn stored(f: &OrderFixture) -> Order {
    f.stores
        .orders
        .find_by_id(&f.order.id)
        .await
        .unwrap()
        .unwrap()
}

// ========================================================================
// Creation
// ========================================================================

#[tokio::test]
async fn test_create_snapshots_plan() {
    let f = order_fixture().await;
    assert_eq!(f.order.status, OrderStatus::Pending);
    assert_eq!(f.order.amount, 100.0);
    assert_eq!(f.order.revisions_left, 2);
    assert_eq!(f.order.plan.tier, PlanTier::Standard);
    assert_eq!(f.order.buyer_id, f.buyer.id);
    assert_eq!(f.order.seller_id, f.seller.id);
    assert_eq!(f.order.version, 0);
    assert_eq!(f.order.requirements, "Blue and white");
}

#[tokio::test]
async fn test_create_rejects_unknown_gig_and_plan() {
    let f = order_fixture().await;

    let err = f
        .manager
        .create(
            &f.buyer,
            OrderCreate {
                gig_id: "missing".into(),
                tier: "Basic".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::GigNotFound);

    // Tier names match exactly
    let err = f
        .manager
        .create(
            &f.buyer,
            OrderCreate {
                gig_id: f.gig.id.clone(),
                tier: "standard".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PlanNotFound);

    let err = f
        .manager
        .create(
            &f.buyer,
            OrderCreate {
                gig_id: f.gig.id.clone(),
                tier: "Premium".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PlanNotFound);
}

#[tokio::test]
async fn test_first_matching_plan_wins() {
    let f = order_fixture().await;
    let gig = crate::test_support::gig(
        &f.stores,
        &f.seller,
        vec![
            plan(PlanTier::Basic, 10.0, 0),
            plan(PlanTier::Basic, 99.0, 5),
        ],
    )
    .await;
    let order = f
        .manager
        .create(
            &f.buyer,
            OrderCreate {
                gig_id: gig.id,
                tier: "Basic".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(order.amount, 10.0);
    assert_eq!(order.revisions_left, 0);
}

#[tokio::test]
async fn test_owner_cannot_order_own_gig() {
    let f = order_fixture().await;
    let err = f
        .manager
        .create(
            &f.seller,
            OrderCreate {
                gig_id: f.gig.id.clone(),
                tier: "Basic".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SelfOrder);
    assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
}

// ========================================================================
// Transitions
// ========================================================================

#[tokio::test]
async fn test_full_lifecycle() {
    let f = order_fixture().await;

    let order = f.manager.start(&f.seller, &f.order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.version, 1);

    let order = f
        .manager
        .deliver(&f.seller, &f.order.id, vec!["/api/files/v1.zip".into()])
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
    assert!(order.delivered_at.is_some());

    let order = f
        .manager
        .request_revision(&f.buyer, &f.order.id, "Make it bigger")
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.revisions_left, 1);
    assert_eq!(order.revision_notes.len(), 1);
    assert_eq!(order.revision_notes[0].note, "Make it bigger");

    let order = f
        .manager
        .deliver(&f.seller, &f.order.id, vec!["/api/files/v2.zip".into()])
        .await
        .unwrap();
    // Earlier deliveries are kept
    assert_eq!(
        order.delivery_files,
        vec!["/api/files/v1.zip".to_string(), "/api/files/v2.zip".to_string()]
    );

    let order = f.manager.complete(&f.buyer, &f.order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert!(order.completed_at.is_some());
    assert_eq!(order.version, 5);
}

#[tokio::test]
async fn test_revision_on_pending_is_rejected_without_mutation() {
    let f = order_fixture().await;
    let err = f
        .manager
        .request_revision(&f.buyer, &f.order.id, "Change colours")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
    let details = err.details.unwrap();
    assert_eq!(details["current"], "pending");
    assert_eq!(details["requested"], "in_progress");

    let order = stored(&f).await;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.revisions_left, 2);
    assert!(order.revision_notes.is_empty());
    assert_eq!(order.version, 0);
}

#[tokio::test]
async fn test_revision_budget_runs_out() {
    let f = order_fixture().await;
    f.delivered().await;
    for _ in 0..2 {
        f.manager
            .request_revision(&f.buyer, &f.order.id, "again")
            .await
            .unwrap();
        f.manager
            .deliver(&f.seller, &f.order.id, vec![])
            .await
            .unwrap();
    }

    let err = f
        .manager
        .request_revision(&f.buyer, &f.order.id, "one more")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NoRevisionsLeft);

    let order = stored(&f).await;
    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.revisions_left, 0);
    assert_eq!(order.revision_notes.len(), 2);
}

#[tokio::test]
async fn test_revision_without_note_spends_one() {
    let f = order_fixture().await;
    f.delivered().await;

    let order = f
        .manager
        .request_revision(&f.buyer, &f.order.id, "   ")
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.revisions_left, 1);
    assert_eq!(order.revision_notes.len(), 1);
    assert_eq!(order.revision_notes[0].note, "");
    assert!(order.revision_notes[0].requested_at > 0);

    // the length limit still applies
    f.manager
        .deliver(&f.seller, &f.order.id, vec![])
        .await
        .unwrap();
    let long = "x".repeat(MAX_NOTE_LEN + 1);
    let err = f
        .manager
        .request_revision(&f.buyer, &f.order.id, &long)
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    assert_eq!(stored(&f).await.revisions_left, 1);
}

#[tokio::test]
async fn test_relation_checks() {
    let f = order_fixture().await;

    // Buyer cannot start
    let err = f.manager.start(&f.buyer, &f.order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    f.delivered().await;

    // Seller cannot complete their own delivery
    let err = f.manager.complete(&f.seller, &f.order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    let stranger = user(&f.stores, "Eve", UserRole::Client).await;
    let err = f.manager.complete(&stranger, &f.order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotOrderParticipant);
    let err = f.manager.get(&stranger, &f.order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotOrderParticipant);
}

#[tokio::test]
async fn test_cancel_rules() {
    let f = order_fixture().await;
    let order = f.manager.cancel(&f.seller, &f.order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert!(order.cancelled_at.is_some());

    let err = f.manager.start(&f.seller, &f.order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    let g = order_fixture().await;
    g.delivered().await;
    let err = g.manager.cancel(&g.buyer, &g.order.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);
}

#[tokio::test]
async fn test_update_status_mapping() {
    let f = order_fixture().await;

    let order = f
        .manager
        .update_status(
            &f.seller,
            &f.order.id,
            StatusUpdate {
                status: "In Progress".into(),
                delivery_files: vec![],
            },
        )
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);

    let err = f
        .manager
        .update_status(
            &f.seller,
            &f.order.id,
            StatusUpdate {
                status: "pending".into(),
                delivery_files: vec![],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidTransition);

    let err = f
        .manager
        .update_status(
            &f.seller,
            &f.order.id,
            StatusUpdate {
                status: "shipped".into(),
                delivery_files: vec![],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let order = f
        .manager
        .update_status(
            &f.seller,
            &f.order.id,
            StatusUpdate {
                status: "delivered".into(),
                delivery_files: vec!["/api/files/x.pdf".into()],
            },
        )
        .await
        .unwrap();
    assert_eq!(order.delivery_files, vec!["/api/files/x.pdf".to_string()]);

    // Completing through the seller route is buyer-only
    let err = f
        .manager
        .update_status(
            &f.seller,
            &f.order.id,
            StatusUpdate {
                status: "completed".into(),
                delivery_files: vec![],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_stale_write_conflicts() {
    let f = order_fixture().await;
    let stale = stored(&f).await;

    f.manager.start(&f.seller, &f.order.id).await.unwrap();

    let mut racing = stale.clone();
    racing.status = OrderStatus::Cancelled;
    racing.version = stale.version + 1;
    let err = f
        .stores
        .orders
        .update_if_version(racing, stale.version)
        .await
        .map_err(|e| map_write_error(e, &f.order.id))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderVersionConflict);
    assert_eq!(err.http_status(), http::StatusCode::CONFLICT);

    let order = stored(&f).await;
    assert_eq!(order.status, OrderStatus::InProgress);
    assert_eq!(order.version, 1);
}

#[tokio::test]
async fn test_concurrent_revisions_spend_one() {
    let f = order_fixture().await;
    f.delivered().await;

    let (a, b) = tokio::join!(
        f.manager.request_revision(&f.buyer, &f.order.id, "first"),
        f.manager.request_revision(&f.buyer, &f.order.id, "second"),
    );
    assert!(a.is_ok() != b.is_ok());

    let order = stored(&f).await;
    assert_eq!(order.revisions_left, 1);
    assert_eq!(order.revision_notes.len(), 1);
}

#[tokio::test]
async fn test_status_change_is_published() {
    let f = order_fixture().await;
    let mut sub = f.notifier.subscribe(&f.order.id);

    f.manager.start(&f.seller, &f.order.id).await.unwrap();

    let envelope = sub.events.recv().await.unwrap();
    match envelope.event {
        OrderEvent::OrderStatus {
            previous,
            status,
            actor_id,
            version,
            ..
        } => {
            assert_eq!(previous, OrderStatus::Pending);
            assert_eq!(status, OrderStatus::InProgress);
            assert_eq!(actor_id, f.seller.id);
            assert_eq!(version, 1);
        }
        other => panic!("unexpected event {:?}", other),
    }

    // Rejected transitions publish nothing
    let _ = f.manager.complete(&f.buyer, &f.order.id).await;
    assert!(sub.events.try_recv().is_err());
}

// ========================================================================
// Queries
// ========================================================================

#[tokio::test]
async fn test_list_is_role_relative() {
    let f = order_fixture().await;
    f.manager.start(&f.seller, &f.order.id).await.unwrap();
    f.manager
        .create(
            &f.buyer,
            OrderCreate {
                gig_id: f.gig.id.clone(),
                tier: "Basic".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap();

    let bought = f
        .manager
        .list_for_user(&f.buyer, OrderQuery::default())
        .await
        .unwrap();
    assert_eq!(bought.total, 2);
    assert_eq!(bought.limit, DEFAULT_ORDER_PAGE);

    let sold = f
        .manager
        .list_for_user(
            &f.seller,
            OrderQuery {
                status: Some("In Progress".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(sold.total, 1);
    assert_eq!(sold.data[0].id, f.order.id);

    let all = f
        .manager
        .list_for_user(
            &f.seller,
            OrderQuery {
                status: Some("all".into()),
                page: Some(2),
                limit: Some(1),
            },
        )
        .await
        .unwrap();
    assert_eq!(all.total, 2);
    assert_eq!(all.data.len(), 1);
    assert!(all.has_prev);
    assert!(!all.has_next);

    let err = f
        .manager
        .list_for_user(
            &f.buyer,
            OrderQuery {
                status: Some("lost".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}

#[tokio::test]
async fn test_stats_group_by_status() {
    let f = order_fixture().await;
    f.manager.start(&f.seller, &f.order.id).await.unwrap();
    f.manager
        .create(
            &f.buyer,
            OrderCreate {
                gig_id: f.gig.id.clone(),
                tier: "Basic".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap();

    let stats = f.manager.stats(&f.seller).await.unwrap();
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.total_amount, 150.0);
    assert_eq!(stats.by_status[0].status, OrderStatus::Pending);
    assert_eq!(stats.by_status[0].amount, 50.0);
    assert_eq!(stats.by_status[1].status, OrderStatus::InProgress);
    assert_eq!(stats.by_status[1].count, 1);
}

#[tokio::test]
async fn test_get_for_participants() {
    let f = order_fixture().await;
    assert_eq!(f.manager.get(&f.buyer, &f.order.id).await.unwrap().id, f.order.id);
    assert_eq!(f.manager.get(&f.seller, &f.order.id).await.unwrap().id, f.order.id);
    let err = f.manager.get(&f.buyer, "missing").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::OrderNotFound);
    assert!(Relation::Either.admits(shared::order::Party::Buyer));
}
