//! Gig Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted plan price
pub const MIN_PLAN_PRICE: f64 = 5.0;

/// Catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigCategory {
    Design,
    Development,
    Marketing,
    Business,
    Writing,
    Video,
    Music,
}

impl GigCategory {
    pub const fn as_str(&self) -> &'static str {
        match self {
            GigCategory::Design => "design",
            GigCategory::Development => "development",
            GigCategory::Marketing => "marketing",
            GigCategory::Business => "business",
            GigCategory::Writing => "writing",
            GigCategory::Video => "video",
            GigCategory::Music => "music",
        }
    }
}

impl fmt::Display for GigCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price tier name, serialized exactly as written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanTier {
    Basic,
    Standard,
    Premium,
}

impl PlanTier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Basic => "Basic",
            PlanTier::Standard => "Standard",
            PlanTier::Premium => "Premium",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchasable tier of a gig
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePlan {
    pub tier: PlanTier,
    pub price: f64,
    pub delivery_days: u32,
    #[serde(default)]
    pub revisions: u32,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// Gig entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gig {
    pub id: String,
    /// Freelancer who sells this gig
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub category: GigCategory,
    pub price_plans: Vec<PricePlan>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    pub requirements: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Gig {
    /// First plan whose tier name equals `tier` exactly
    pub fn find_plan(&self, tier: &str) -> Option<&PricePlan> {
        self.price_plans.iter().find(|p| p.tier.as_str() == tier)
    }

    /// Case-insensitive match on title or keywords
    pub fn matches_keyword(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    }
}

/// Create gig payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigCreate {
    pub title: String,
    pub description: String,
    pub category: GigCategory,
    pub price_plans: Vec<PricePlan>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    pub requirements: Option<String>,
}

/// Update gig payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GigUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<GigCategory>,
    pub price_plans: Option<Vec<PricePlan>>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub faqs: Option<Vec<Faq>>,
    pub requirements: Option<String>,
}

/// Catalog query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GigFilter {
    pub category: Option<GigCategory>,
    pub owner_id: Option<String>,
    /// Matched against title and keywords
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(tier: PlanTier, price: f64) -> PricePlan {
        PricePlan {
            tier,
            price,
            delivery_days: 3,
            revisions: 1,
            features: vec![],
        }
    }

    fn gig() -> Gig {
        Gig {
            id: "g1".into(),
            owner_id: "s1".into(),
            title: "Logo Design".into(),
            description: "A logo".into(),
            category: GigCategory::Design,
            price_plans: vec![
                plan(PlanTier::Basic, 20.0),
                plan(PlanTier::Standard, 100.0),
                plan(PlanTier::Standard, 999.0),
            ],
            thumbnail: None,
            images: vec![],
            keywords: vec!["Branding".into()],
            faqs: vec![],
            requirements: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_find_plan_is_exact_and_first_match() {
        let g = gig();
        assert_eq!(g.find_plan("Standard").unwrap().price, 100.0);
        assert!(g.find_plan("standard").is_none());
        assert!(g.find_plan("Premium").is_none());
    }

    #[test]
    fn test_keyword_match() {
        let g = gig();
        assert!(g.matches_keyword("logo"));
        assert!(g.matches_keyword("brand"));
        assert!(!g.matches_keyword("video"));
    }

    #[test]
    fn test_tier_serializes_capitalized() {
        let json = serde_json::to_string(&PlanTier::Premium).unwrap();
        assert_eq!(json, "\"Premium\"");
    }
}
