//! Review Model

use serde::{Deserialize, Serialize};

pub const MAX_COMMENT_LEN: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCategory {
    Communication,
    Quality,
    Value,
    Delivery,
    #[default]
    Overall,
}

/// Review entity, one per order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub order_id: String,
    pub gig_id: String,
    /// The order's buyer
    pub reviewer_id: String,
    /// The order's seller
    pub reviewed_user_id: String,
    pub rating: u8,
    pub comment: String,
    #[serde(default)]
    pub category: ReviewCategory,
    #[serde(default = "default_public")]
    pub is_public: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_public() -> bool {
    true
}

/// Create review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub order_id: String,
    pub rating: u8,
    pub comment: String,
    pub category: Option<ReviewCategory>,
    pub is_public: Option<bool>,
}

/// Update review payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub category: Option<ReviewCategory>,
    pub is_public: Option<bool>,
}

/// Review listing query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewQuery {
    /// Only reviews with exactly this rating
    pub rating: Option<u8>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Aggregate over a set of reviews
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    /// Rounded to one decimal, 0.0 without reviews
    pub average: f64,
    pub total: u64,
    /// Counts for ratings 1 through 5
    pub distribution: [u64; 5],
}

impl ReviewStats {
    pub fn from_ratings(ratings: impl IntoIterator<Item = u8>) -> Self {
        let mut distribution = [0u64; 5];
        let mut total = 0u64;
        let mut sum = 0u64;
        for r in ratings {
            if (1..=5).contains(&r) {
                distribution[(r - 1) as usize] += 1;
                total += 1;
                sum += r as u64;
            }
        }
        Self {
            average: round_rating(sum, total),
            total,
            distribution,
        }
    }
}

/// Mean of `sum / count` rounded to one decimal
pub fn round_rating(sum: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    ((sum as f64 / count as f64) * 10.0).round() / 10.0
}

/// A page of reviews with stats over every public review of the subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPage {
    pub reviews: crate::pagination::PaginatedResponse<Review>,
    pub stats: ReviewStats,
}
