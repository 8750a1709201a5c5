//! Aggregate rating derived from a product's reviews.

use crate::models::Review;

/// `ratings` and `numOfReviews` as stored on a product.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    pub ratings: f64,
    pub num_of_reviews: i32,
}

/// Arithmetic mean of the review ratings, or zero when there are none.
///
/// No rounding is applied.
pub fn recompute(reviews: &[Review]) -> RatingSummary {
    if reviews.is_empty() {
        return RatingSummary::default();
    }

    let total: f64 = reviews.iter().map(|r| r.rating).sum();
    RatingSummary {
        ratings: total / reviews.len() as f64,
        num_of_reviews: reviews.len() as i32,
    }
}
