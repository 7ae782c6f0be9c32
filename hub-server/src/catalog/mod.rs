//! Gig catalog
//!
//! Freelancers publish gigs with one or more price plans; everyone can
//! browse them. Orders snapshot the plan they buy, so editing a gig never
//! changes existing orders.

use shared::models::{Gig, GigCreate, GigFilter, GigUpdate, MIN_PLAN_PRICE, PricePlan};
use shared::pagination::{PageRequest, PaginatedResponse};
use shared::util::{new_id, now_millis};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::db::{RepoError, Stores};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text,
    validate_required_text,
};

/// Default page size of catalog listings
pub const DEFAULT_GIG_PAGE: u32 = 10;

fn validate_plans(plans: &[PricePlan]) -> AppResult<()> {
    if plans.is_empty() {
        return Err(AppError::new(ErrorCode::GigPlansEmpty).with_detail("field", "price_plans"));
    }
    for plan in plans {
        if !plan.price.is_finite() || plan.price < MIN_PLAN_PRICE {
            return Err(AppError::with_message(
                ErrorCode::GigInvalidPlan,
                format!("{} plan price must be at least {}", plan.tier, MIN_PLAN_PRICE),
            )
            .with_detail("tier", plan.tier.as_str()));
        }
        if plan.delivery_days < 1 {
            return Err(AppError::with_message(
                ErrorCode::GigInvalidPlan,
                format!("{} plan needs at least one delivery day", plan.tier),
            )
            .with_detail("tier", plan.tier.as_str()));
        }
    }
    Ok(())
}

fn gig_not_found(gig_id: &str) -> AppError {
    AppError::new(ErrorCode::GigNotFound).with_detail("gig_id", gig_id)
}

#[derive(Clone)]
pub struct CatalogService {
    stores: Stores,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn create(&self, actor: &CurrentUser, input: GigCreate) -> AppResult<Gig> {
        if !actor.is_freelancer() {
            return Err(AppError::with_message(
                ErrorCode::RoleRequired,
                "Only freelancers can publish gigs",
            ));
        }
        let title = input.title.trim().to_string();
        let description = input.description.trim().to_string();
        validate_required_text(&title, "title", MAX_NAME_LEN)?;
        validate_required_text(&description, "description", MAX_DESCRIPTION_LEN)?;
        validate_optional_text(&input.requirements, "requirements", MAX_NOTE_LEN)?;
        validate_plans(&input.price_plans)?;

        let now = now_millis();
        let gig = Gig {
            id: new_id(),
            owner_id: actor.id.clone(),
            title,
            description,
            category: input.category,
            price_plans: input.price_plans,
            thumbnail: input.thumbnail,
            images: input.images,
            keywords: input.keywords,
            faqs: input.faqs,
            requirements: input.requirements,
            created_at: now,
            updated_at: now,
        };
        let gig = self.stores.gigs.create(gig).await?;
        tracing::info!(gig_id = %gig.id, owner_id = %gig.owner_id, "Gig published");
        Ok(gig)
    }

    pub async fn get(&self, gig_id: &str) -> AppResult<Gig> {
        self.stores
            .gigs
            .find_by_id(gig_id)
            .await?
            .ok_or_else(|| gig_not_found(gig_id))
    }

    /// Public listing, newest first
    pub async fn list(&self, filter: GigFilter) -> AppResult<PaginatedResponse<Gig>> {
        let gigs = match filter.owner_id.as_deref() {
            Some(owner_id) => self.stores.gigs.find_by_owner(owner_id).await?,
            None => self.stores.gigs.find_all().await?,
        };
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let gigs: Vec<Gig> = gigs
            .into_iter()
            .filter(|g| filter.category.is_none_or(|c| g.category == c))
            .filter(|g| search.is_none_or(|s| g.matches_keyword(s)))
            .collect();

        Ok(PageRequest::new(filter.page, filter.limit, DEFAULT_GIG_PAGE).slice(gigs))
    }

    pub async fn mine(&self, actor: &CurrentUser) -> AppResult<Vec<Gig>> {
        Ok(self.stores.gigs.find_by_owner(&actor.id).await?)
    }

    async fn owned(&self, actor: &CurrentUser, gig_id: &str) -> AppResult<Gig> {
        let gig = self.get(gig_id).await?;
        if gig.owner_id != actor.id {
            return Err(AppError::forbidden("Only the owner can change this gig")
                .with_detail("gig_id", gig_id));
        }
        Ok(gig)
    }

    pub async fn update(&self, actor: &CurrentUser, gig_id: &str, update: GigUpdate) -> AppResult<Gig> {
        let mut gig = self.owned(actor, gig_id).await?;

        if let Some(title) = update.title {
            let title = title.trim().to_string();
            validate_required_text(&title, "title", MAX_NAME_LEN)?;
            gig.title = title;
        }
        if let Some(description) = update.description {
            let description = description.trim().to_string();
            validate_required_text(&description, "description", MAX_DESCRIPTION_LEN)?;
            gig.description = description;
        }
        if let Some(category) = update.category {
            gig.category = category;
        }
        if let Some(plans) = update.price_plans {
            validate_plans(&plans)?;
            gig.price_plans = plans;
        }
        if let Some(thumbnail) = update.thumbnail {
            gig.thumbnail = Some(thumbnail);
        }
        if let Some(images) = update.images {
            gig.images = images;
        }
        if let Some(keywords) = update.keywords {
            gig.keywords = keywords;
        }
        if let Some(faqs) = update.faqs {
            gig.faqs = faqs;
        }
        validate_optional_text(&update.requirements, "requirements", MAX_NOTE_LEN)?;
        if let Some(requirements) = update.requirements {
            gig.requirements = Some(requirements);
        }
        gig.updated_at = now_millis();

        let gig = self.stores.gigs.update(gig).await.map_err(|e| match e {
            RepoError::NotFound(_) => gig_not_found(gig_id),
            other => other.into(),
        })?;
        tracing::info!(gig_id, "Gig updated");
        Ok(gig)
    }

    pub async fn delete(&self, actor: &CurrentUser, gig_id: &str) -> AppResult<()> {
        self.owned(actor, gig_id).await?;
        if !self.stores.gigs.delete(gig_id).await? {
            return Err(gig_not_found(gig_id));
        }
        tracing::info!(gig_id, "Gig deleted");
        Ok(())
    }
}
