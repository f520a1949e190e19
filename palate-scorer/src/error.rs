//! Errors raised while extracting ratings or scoring a pair of users.

use palate_core::{Category, CategoryParseError, StoreError, UserId};
use thiserror::Error;

/// Errors surfaced by [`TasteEngine`](crate::TasteEngine).
///
/// Insufficient overlap is not an error: it is reported through
/// [`SimilarityResult::score`](palate_core::SimilarityResult::score) being
/// `None` or through a small overlap count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// A user's notes could not be fetched.
    #[error("notes for {user} in {category} are unavailable")]
    DataUnavailable {
        /// User whose notes failed to load.
        user: UserId,
        /// Category that was requested.
        category: Category,
        /// Failure reported by the note store.
        #[source]
        source: StoreError,
    },
    /// A category name outside the supported set was supplied.
    #[error(transparent)]
    InvalidCategory(#[from] CategoryParseError),
}
