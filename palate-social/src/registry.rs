//! Gourmet Friend pins: preview, commit and removal.
//!
//! Eligibility is a point-in-time gate. [`FriendRegistry::pin`] re-scores
//! every requested category from fresh notes at commit time and writes
//! nothing unless all of them pass. Existing pins are never re-validated, so a
//! pinned friend stays in tier 1 even if the live score later drops.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::{join_all, try_join_all};
use palate_core::{
    Category, EligibilityResult, GourmetFriendPin, PinStore, SimilarityResult, TasteSimilarity,
    UserId,
};
use palate_scorer::TasteEngine;
use serde::{Deserialize, Serialize};

use crate::SocialError;

/// Read-only preview of whether a viewer may pin a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanPinResult {
    /// True when at least one category is eligible.
    pub can_pin: bool,
    /// Categories that would be accepted now.
    pub eligible_categories: Vec<Category>,
    /// Eligibility for every category.
    pub compatibility: Vec<EligibilityResult>,
}

/// A pinned relationship with freshly computed similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GourmetFriend {
    /// The stored pin.
    pub pin: GourmetFriendPin,
    /// Live similarity in each pinned category.
    pub similarities: Vec<TasteSimilarity>,
}

/// Creates, lists and removes Gourmet Friend pins.
#[derive(Clone)]
pub struct FriendRegistry {
    engine: TasteEngine,
    pins: Arc<dyn PinStore>,
}

impl fmt::Debug for FriendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FriendRegistry")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl FriendRegistry {
    /// Create a registry over an engine and a pin store.
    #[must_use]
    pub fn new(engine: TasteEngine, pins: Arc<dyn PinStore>) -> Self {
        Self { engine, pins }
    }

    /// Engine used for scoring.
    #[must_use]
    pub const fn engine(&self) -> &TasteEngine {
        &self.engine
    }

    pub(crate) fn pin_store(&self) -> &dyn PinStore {
        self.pins.as_ref()
    }

    /// Pin `target` in `categories`, adding to any existing pin.
    ///
    /// Every category is re-scored from fresh notes; if any fails the gate
    /// the call fails and nothing is written.
    ///
    /// # Errors
    /// - [`SocialError::EmptyCategories`] or [`SocialError::SelfPin`] for
    ///   malformed requests.
    /// - [`SocialError::IneligibleCategory`] naming the first failing
    ///   category.
    /// - [`SocialError::Scoring`] when notes cannot be fetched.
    /// - [`SocialError::PinStore`] when the write fails.
    pub async fn pin(
        &self,
        viewer: &UserId,
        target: &UserId,
        categories: &[Category],
    ) -> Result<GourmetFriendPin, SocialError> {
        let requested: BTreeSet<Category> = categories.iter().copied().collect();
        if requested.is_empty() {
            return Err(SocialError::EmptyCategories);
        }
        if viewer == target {
            return Err(SocialError::SelfPin {
                user: viewer.clone(),
            });
        }

        let results = try_join_all(
            requested
                .iter()
                .map(|category| self.engine.compare_fresh(viewer, target, *category)),
        )
        .await?;
        if let Some(rejected) = results
            .iter()
            .map(|result| self.engine.eligibility(result))
            .find(|outcome| !outcome.eligible)
        {
            return Err(SocialError::IneligibleCategory {
                category: rejected.category,
                score: rejected.score,
                overlap_count: rejected.overlap_count,
            });
        }

        let pin = GourmetFriendPin::new(viewer.clone(), target.clone(), requested, Utc::now())?;
        self.pins
            .upsert_pin(pin)
            .await
            .map_err(SocialError::pin_store("upsert pin"))
    }

    /// Remove the whole relationship from `viewer` to `target`.
    ///
    /// Returns whether a pin existed.
    ///
    /// # Errors
    /// Returns [`SocialError::PinStore`] when the store fails.
    pub async fn unpin(&self, viewer: &UserId, target: &UserId) -> Result<bool, SocialError> {
        self.pins
            .remove_pin(viewer, target)
            .await
            .map_err(SocialError::pin_store("remove pin"))
    }

    /// Remove a single category; removing the last one removes the pin.
    ///
    /// Returns the remaining pin, if any.
    ///
    /// # Errors
    /// Returns [`SocialError::PinStore`] when the store fails.
    pub async fn unpin_category(
        &self,
        viewer: &UserId,
        target: &UserId,
        category: Category,
    ) -> Result<Option<GourmetFriendPin>, SocialError> {
        self.pins
            .remove_category(viewer, target, category)
            .await
            .map_err(SocialError::pin_store("remove pin category"))
    }

    /// Preview pin eligibility in every category.
    ///
    /// Categories whose data cannot be loaded are reported as ineligible with
    /// no score.
    ///
    /// # Errors
    /// Returns [`SocialError::SelfPin`] when `viewer` and `target` match.
    pub async fn can_pin(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<CanPinResult, SocialError> {
        if viewer == target {
            return Err(SocialError::SelfPin {
                user: viewer.clone(),
            });
        }
        let compatibility: Vec<EligibilityResult> = Category::ALL
            .into_iter()
            .zip(self.engine.compare_all(viewer, target).await)
            .map(|(category, outcome)| match outcome {
                Ok(result) => self.engine.eligibility(&result),
                Err(error) => {
                    log::warn!("cannot preview {category} pin for {viewer} -> {target}: {error}");
                    EligibilityResult {
                        category,
                        score: None,
                        overlap_count: 0,
                        eligible: false,
                    }
                }
            })
            .collect();
        let eligible_categories: Vec<Category> = compatibility
            .iter()
            .filter(|outcome| outcome.eligible)
            .map(|outcome| outcome.category)
            .collect();
        Ok(CanPinResult {
            can_pin: !eligible_categories.is_empty(),
            eligible_categories,
            compatibility,
        })
    }

    /// List every pin `viewer` holds with live similarity per pinned
    /// category, ordered by pinned user.
    ///
    /// # Errors
    /// Returns [`SocialError::PinStore`] when the pins cannot be read.
    pub async fn list_friends(&self, viewer: &UserId) -> Result<Vec<GourmetFriend>, SocialError> {
        let mut pins = self
            .pins
            .pins_by(viewer)
            .await
            .map_err(SocialError::pin_store("list pins"))?;
        pins.sort_by(|left, right| left.pinned_id.cmp(&right.pinned_id));
        let friends = pins.into_iter().map(|pin| async move {
            let similarities = join_all(
                pin.categories
                    .iter()
                    .map(|category| self.live_similarity(viewer, &pin.pinned_id, *category)),
            )
            .await;
            GourmetFriend { pin, similarities }
        });
        Ok(join_all(friends).await)
    }

    pub(crate) async fn live_similarity(
        &self,
        viewer: &UserId,
        target: &UserId,
        category: Category,
    ) -> TasteSimilarity {
        let min_overlap = self.engine.policy().pin_min_overlap;
        match self.engine.compare_fresh(viewer, target, category).await {
            Ok(result) => TasteSimilarity::from_result(&result, min_overlap),
            Err(error) => {
                log::warn!("similarity for {viewer} and {target} unavailable: {error}");
                TasteSimilarity::unavailable(category)
            }
        }
    }
}

/// Summarise comparison outcomes for display, degrading failures to
/// "insufficient data".
pub(crate) fn summarise(
    outcomes: Vec<Result<SimilarityResult, palate_scorer::ScoringError>>,
    min_overlap: u32,
) -> Vec<TasteSimilarity> {
    Category::ALL
        .into_iter()
        .zip(outcomes)
        .map(|(category, outcome)| match outcome {
            Ok(result) => TasteSimilarity::from_result(&result, min_overlap),
            Err(error) => {
                log::warn!("similarity in {category} unavailable: {error}");
                TasteSimilarity::unavailable(category)
            }
        })
        .collect()
}
