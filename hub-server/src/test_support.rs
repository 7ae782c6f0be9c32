//! Fixtures shared by the in-crate test modules

use shared::models::{
    DEFAULT_PROFILE_PIC, Gig, GigCategory, Order, OrderCreate, PlanTier, PricePlan, User, UserRole,
};
use shared::util::{new_id, now_millis};

use crate::auth::CurrentUser;
use crate::db::Stores;
use crate::notify::NotificationHub;
use crate::orders::OrderManager;

pub fn plan(tier: PlanTier, price: f64, revisions: u32) -> PricePlan {
    PricePlan {
        tier,
        price,
        delivery_days: 3,
        revisions,
        features: vec!["source files".into()],
    }
}

pub async fn user(stores: &Stores, name: &str, role: UserRole) -> CurrentUser {
    let now = now_millis();
    let user = User {
        id: new_id(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password_hash: String::new(),
        role,
        bio: String::new(),
        skills: vec![],
        profile_pic: DEFAULT_PROFILE_PIC.to_string(),
        rating: 0.0,
        created_at: now,
        updated_at: now,
    };
    let user = stores.users.create(user).await.unwrap();
    CurrentUser::from(&user)
}

pub async fn gig(stores: &Stores, owner: &CurrentUser, plans: Vec<PricePlan>) -> Gig {
    let now = now_millis();
    let gig = Gig {
        id: new_id(),
        owner_id: owner.id.clone(),
        title: "Logo design".into(),
        description: "A memorable logo".into(),
        category: GigCategory::Design,
        price_plans: plans,
        thumbnail: None,
        images: vec![],
        keywords: vec!["logo".into(), "branding".into()],
        faqs: vec![],
        requirements: None,
        created_at: now,
        updated_at: now,
    };
    stores.gigs.create(gig).await.unwrap()
}

/// Buyer, seller and a pending Standard order (price 100, 2 revisions)
pub struct OrderFixture {
    pub stores: Stores,
    pub notifier: NotificationHub,
    pub manager: OrderManager,
    pub buyer: CurrentUser,
    pub seller: CurrentUser,
    pub gig: Gig,
    pub order: Order,
}

pub async fn order_fixture() -> OrderFixture {
    let stores = Stores::memory();
    let notifier = NotificationHub::new();
    let manager = OrderManager::new(stores.clone(), notifier.clone());
    let buyer = user(&stores, "Bob", UserRole::Client).await;
    let seller = user(&stores, "Sally", UserRole::Freelancer).await;
    let gig = gig(
        &stores,
        &seller,
        vec![
            plan(PlanTier::Basic, 50.0, 1),
            plan(PlanTier::Standard, 100.0, 2),
        ],
    )
    .await;
    let order = manager
        .create(
            &buyer,
            OrderCreate {
                gig_id: gig.id.clone(),
                tier: "Standard".into(),
                requirements: "Blue and white".into(),
            },
        )
        .await
        .unwrap();
    OrderFixture {
        stores,
        notifier,
        manager,
        buyer,
        seller,
        gig,
        order,
    }
}

impl OrderFixture {
    /// Drive the order to `delivered`
    pub async fn delivered(&self) -> Order {
        self.manager.start(&self.seller, &self.order.id).await.unwrap();
        self.manager
            .deliver(&self.seller, &self.order.id, vec!["/api/files/a.zip".into()])
            .await
            .unwrap()
    }

    /// Drive the order to `completed`
    pub async fn completed(&self) -> Order {
        self.delivered().await;
        self.manager.complete(&self.buyer, &self.order.id).await.unwrap()
    }
}
