//! Pairwise Taste Similarity Score.
//!
//! For the items both users rated, the score is one minus the mean absolute
//! rating difference scaled by the widest possible gap on the `1..=10` scale:
//!
//! ```text
//! score = 1 - mean(|rating_a - rating_b|) / 9
//! ```
//!
//! Identical ratings score `1.0`; every shared item rated `1` by one user and
//! `10` by the other scores `0.0`. With no shared items there is no score.

use palate_core::{MAX_RATING, MIN_RATING, RatedItems, SimilarityResult};

/// Largest possible distance between two ratings.
const MAX_DISTANCE: u8 = MAX_RATING - MIN_RATING;

/// Compare two users' rated items.
///
/// The result lists `items_a`'s owner as `user_a`. Items from different
/// categories never overlap, so comparing across categories yields an empty
/// result.
///
/// # Examples
/// ```
/// use palate_core::{Category, TastePolicy};
/// use palate_core::test_support::dishes_for;
/// use palate_scorer::{extract, score_pair};
///
/// let policy = TastePolicy::default();
/// let alice = dishes_for("alice", &[("ramen", 8), ("gyoza", 6)]);
/// let bob = dishes_for("bob", &[("ramen", 8), ("gyoza", 6), ("udon", 3)]);
/// let a = extract(&"alice".into(), Category::Restaurant, &alice, &policy);
/// let b = extract(&"bob".into(), Category::Restaurant, &bob, &policy);
///
/// let result = score_pair(&a, &b);
/// assert_eq!(result.overlap_count, 2);
/// assert_eq!(result.score, Some(1.0));
/// ```
#[must_use]
pub fn score_pair(items_a: &RatedItems, items_b: &RatedItems) -> SimilarityResult {
    let category = items_a.category();
    let empty = SimilarityResult::empty(
        category,
        items_a.owner_id().clone(),
        items_b.owner_id().clone(),
    );
    if items_b.category() != category {
        return empty;
    }

    let (overlap, total_distance) = items_a
        .shared_with(items_b)
        .fold((0_u32, 0_u32), |(count, sum), (_, a, b)| {
            (
                count.saturating_add(1),
                sum.saturating_add(u32::from(a.distance(b))),
            )
        });
    if overlap == 0 {
        return empty;
    }

    SimilarityResult {
        overlap_count: overlap,
        score: Some(scaled_agreement(total_distance, overlap)),
        ..empty
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "the similarity score is a ratio of rating distances"
)]
fn scaled_agreement(total_distance: u32, overlap: u32) -> f64 {
    let mean_distance = f64::from(total_distance) / f64::from(overlap);
    (1.0 - mean_distance / f64::from(MAX_DISTANCE)).clamp(0.0, 1.0)
}
