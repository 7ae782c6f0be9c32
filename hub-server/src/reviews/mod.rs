//! Reviews of completed orders and the seller rating they feed

pub mod hook;
pub mod ledger;

pub use hook::{RatingHook, RecomputeRating};
pub use ledger::{DEFAULT_REVIEW_PAGE, ReviewLedger};
