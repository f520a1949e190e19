//! Suggest users whose palate resembles the viewer's.

use std::cmp::Ordering;

use futures_util::future::join_all;
use palate_core::{Category, SimilarityResult, TasteSimilarity, UserId};
use palate_scorer::TasteEngine;
use serde::{Deserialize, Serialize};

use crate::SocialError;

/// A suggested user with their strongest shared category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSuggestion {
    /// Suggested user.
    pub user_id: UserId,
    /// Category with the highest score.
    pub best_category: Category,
    /// Score in the best category.
    pub best_score: f64,
    /// Shared items in the best category.
    pub shared_item_count: u32,
    /// Similarity in every category.
    pub similarities: Vec<TasteSimilarity>,
}

impl UserSuggestion {
    fn from_results(user_id: UserId, results: &[SimilarityResult], min_overlap: u32) -> Option<Self> {
        let best = results
            .iter()
            .filter_map(|result| result.score.map(|score| (result, score)))
            .max_by(|(left, left_score), (right, right_score)| {
                left_score
                    .total_cmp(right_score)
                    .then_with(|| left.overlap_count.cmp(&right.overlap_count))
                    .then_with(|| right.category.cmp(&left.category))
            })?;
        let (best_result, best_score) = best;
        Some(Self {
            user_id,
            best_category: best_result.category,
            best_score,
            shared_item_count: best_result.overlap_count,
            similarities: results
                .iter()
                .map(|result| TasteSimilarity::from_result(result, min_overlap))
                .collect(),
        })
    }

    fn discovery_order(&self, other: &Self) -> Ordering {
        other
            .best_score
            .total_cmp(&self.best_score)
            .then_with(|| other.shared_item_count.cmp(&self.shared_item_count))
            .then_with(|| self.user_id.cmp(&other.user_id))
    }
}

/// Rank every other note author by similarity to `viewer`.
///
/// Each candidate's best category is the one with the highest score, ties
/// going to the larger overlap and then to the earlier category. Candidates
/// sharing nothing with the viewer are omitted, as are candidates whose notes
/// cannot be loaded. Results are sorted by best score, then by the number of
/// items shared in the best category, then by user id, and truncated to
/// `limit`.
///
/// # Errors
/// Returns [`SocialError::NoteStore`] when the list of authors cannot be
/// read.
pub async fn discover_similar_users(
    engine: &TasteEngine,
    viewer: &UserId,
    limit: usize,
) -> Result<Vec<UserSuggestion>, SocialError> {
    let authors = engine
        .note_store()
        .authors()
        .await
        .map_err(|source| SocialError::NoteStore {
            operation: "list note authors",
            source,
        })?;
    let min_overlap = engine.policy().pin_min_overlap;

    let lookups = authors
        .into_iter()
        .filter(|author| author != viewer)
        .map(|author| async move {
            let outcomes = engine.compare_all(viewer, &author).await;
            let results: Result<Vec<SimilarityResult>, _> = outcomes.into_iter().collect();
            match results {
                Ok(scored) => UserSuggestion::from_results(author, &scored, min_overlap),
                Err(error) => {
                    log::warn!("skipping {author} in discovery for {viewer}: {error}");
                    None
                }
            }
        });
    let mut suggestions: Vec<UserSuggestion> =
        join_all(lookups).await.into_iter().flatten().collect();
    suggestions.sort_by(UserSuggestion::discovery_order);
    suggestions.truncate(limit);
    Ok(suggestions)
}
