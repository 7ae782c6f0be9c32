//! Store behaviour on embedded SurrealDB (RocksDB in a temp dir)
//! Run: cargo test -p hub-server --test surreal_store

use std::sync::Arc;

use hub_server::db::{DbService, RepoError};
use hub_server::services::LogMailer;
use hub_server::{Config, CurrentUser, ErrorCode, ServerState};
use shared::models::{
    GigCategory, GigCreate, MessageCreate, MessageType, Order, OrderCreate, PlanTier, PricePlan,
    ReviewCreate, UserCreate,
};
use shared::order::OrderStatus;
use tempfile::TempDir;

async fn setup() -> (TempDir, ServerState) {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = Config::in_memory(tmp.path().to_string_lossy().to_string());
    config.database = hub_server::core::DatabaseBackend::RocksDb;
    let db = DbService::new(config.database_dir()).await.unwrap();
    let state = ServerState::with_stores(config, db.stores(), Arc::new(LogMailer));
    (tmp, state)
}

async fn register(state: &ServerState, name: &str, role: &str) -> CurrentUser {
    let auth = state
        .accounts
        .register(UserCreate {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "correct-horse-42".to_string(),
            role: role.to_string(),
            bio: None,
            skills: None,
        })
        .await
        .unwrap();
    let user = state
        .stores
        .users
        .find_by_id(&auth.user.id)
        .await
        .unwrap()
        .unwrap();
    CurrentUser::from(&user)
}

async fn placed_order(state: &ServerState) -> (CurrentUser, CurrentUser, Order) {
    let buyer = register(state, "Bob", "client").await;
    let seller = register(state, "Sally", "freelancer").await;
    let gig = state
        .catalog
        .create(
            &seller,
            GigCreate {
                title: "Podcast editing".into(),
                description: "Cleanup and mastering for one episode".into(),
                category: GigCategory::Music,
                price_plans: vec![PricePlan {
                    tier: PlanTier::Standard,
                    price: 100.0,
                    delivery_days: 3,
                    revisions: 2,
                    features: vec![],
                }],
                thumbnail: None,
                images: vec![],
                keywords: vec![],
                faqs: vec![],
                requirements: None,
            },
        )
        .await
        .unwrap();
    let order = state
        .orders
        .create(
            &buyer,
            OrderCreate {
                gig_id: gig.id,
                tier: "Standard".into(),
                requirements: String::new(),
            },
        )
        .await
        .unwrap();
    (buyer, seller, order)
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (_tmp, state) = setup().await;
    register(&state, "Bob", "client").await;

    let err = state
        .accounts
        .register(UserCreate {
            name: "Other Bob".into(),
            email: "  BOB@example.com ".into(),
            password: "correct-horse-42".into(),
            role: "client".into(),
            bio: None,
            skills: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
}

#[tokio::test]
async fn stale_version_write_is_a_conflict() {
    let (_tmp, state) = setup().await;
    let (_buyer, seller, order) = placed_order(&state).await;

    let started = state.orders.start(&seller, &order.id).await.unwrap();
    assert_eq!(started.version, 1);

    // a writer still holding version 0
    let mut stale = order.clone();
    stale.status = OrderStatus::Cancelled;
    stale.version = 1;
    let err = state
        .stores
        .orders
        .update_if_version(stale, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));

    let stored = state.stores.orders.find_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::InProgress);
    assert_eq!(stored.version, 1);

    let mut missing = order.clone();
    missing.id = "no-such-order".into();
    let err = state
        .stores
        .orders
        .update_if_version(missing, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn one_review_per_order() {
    let (_tmp, state) = setup().await;
    let (buyer, seller, order) = placed_order(&state).await;

    state.orders.start(&seller, &order.id).await.unwrap();
    state
        .orders
        .deliver(&seller, &order.id, vec!["/api/files/episode.zip".into()])
        .await
        .unwrap();
    state.orders.complete(&buyer, &order.id).await.unwrap();

    let review = |rating: u8| ReviewCreate {
        order_id: order.id.clone(),
        rating,
        comment: "Crisp audio".into(),
        category: None,
        is_public: None,
    };
    state.reviews.create(&buyer, review(5)).await.unwrap();
    let err = state.reviews.create(&buyer, review(2)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ReviewAlreadyExists);

    let seller_user = state.stores.users.find_by_id(&seller.id).await.unwrap().unwrap();
    assert_eq!(seller_user.rating, 5.0);

    let stored = state.stores.orders.find_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.feedback.map(|f| f.rating), Some(5));
}

#[tokio::test]
async fn mark_read_is_idempotent() {
    let (_tmp, state) = setup().await;
    let (buyer, seller, order) = placed_order(&state).await;

    let mut ids = Vec::new();
    for text in ["First draft?", "Any update?"] {
        let message = state
            .messaging
            .send(
                &buyer,
                MessageCreate {
                    order_id: order.id.clone(),
                    receiver_id: seller.id.clone(),
                    content: text.into(),
                    message_type: MessageType::Text,
                    file_url: None,
                },
            )
            .await
            .unwrap();
        ids.push(message.id);
    }

    // the sender cannot mark its own messages
    let result = state.messaging.mark_read(&buyer, ids.clone()).await.unwrap();
    assert_eq!(result.updated, 0);

    let result = state.messaging.mark_read(&seller, ids.clone()).await.unwrap();
    assert_eq!(result.updated, 2);
    let result = state.messaging.mark_read(&seller, ids).await.unwrap();
    assert_eq!(result.updated, 0);

    let stored = state.stores.messages.find_by_order(&order.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|m| m.is_read && m.read_at.is_some()));
}

#[tokio::test]
async fn conversation_keeps_send_order() {
    let (_tmp, state) = setup().await;
    let (buyer, seller, order) = placed_order(&state).await;

    let mut sent = Vec::new();
    for i in 0..40 {
        let message = state
            .messaging
            .send(
                &buyer,
                MessageCreate {
                    order_id: order.id.clone(),
                    receiver_id: seller.id.clone(),
                    content: format!("line {i}"),
                    message_type: MessageType::Text,
                    file_url: None,
                },
            )
            .await
            .unwrap();
        sent.push(message.id);
    }

    let stored = state.stores.messages.find_by_order(&order.id).await.unwrap();
    let ids: Vec<String> = stored.into_iter().map(|m| m.id).collect();
    assert_eq!(ids, sent);

    let page = state
        .messaging
        .conversation(&seller, &order.id, Some(1), Some(50))
        .await
        .unwrap();
    let ids: Vec<String> = page.data.into_iter().map(|m| m.id).collect();
    assert_eq!(ids, sent);
}
