//! Errors raised by the social layer.

use palate_core::{Category, PinError, StoreError, UserId};
use palate_scorer::ScoringError;
use thiserror::Error;

/// Errors surfaced by [`FriendRegistry`](crate::FriendRegistry) and
/// discovery.
///
/// Ranking never fails for data reasons; only registry operations and
/// lookups that cannot proceed without data report errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SocialError {
    /// A requested category does not currently pass the pin gate.
    #[error(
        "cannot pin in {category}: similarity {score:?} over {overlap_count} shared items is below the pin requirements"
    )]
    IneligibleCategory {
        /// Category that failed the gate.
        category: Category,
        /// Live score at commit time.
        score: Option<f64>,
        /// Live overlap at commit time.
        overlap_count: u32,
    },
    /// A pin request named no categories.
    #[error("a pin must name at least one category")]
    EmptyCategories,
    /// A user targeted themselves.
    #[error("user {user} cannot pin themselves")]
    SelfPin {
        /// The offending user.
        user: UserId,
    },
    /// Similarity could not be computed, because notes were unavailable or
    /// a category name was not recognised.
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    /// The pin store failed.
    #[error("pin store failed to {operation}")]
    PinStore {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
    /// The note store failed outside of a pairwise comparison.
    #[error("note store failed to {operation}")]
    NoteStore {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
}

impl From<PinError> for SocialError {
    fn from(error: PinError) -> Self {
        match error {
            PinError::EmptyCategories => Self::EmptyCategories,
            PinError::SelfPin { user } => Self::SelfPin { user },
        }
    }
}

impl SocialError {
    pub(crate) fn pin_store(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::PinStore { operation, source }
    }
}
