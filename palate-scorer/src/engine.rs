//! Request-time similarity service over a [`NoteStore`].

use std::fmt;
use std::sync::Arc;

use palate_core::{
    Category, EligibilityResult, NoteStore, RatedItems, SimilarityResult, TastePolicy, Tier, UserId,
};

use crate::{ScoringError, SimilarityCache, classify_tier, eligibility, extract, score_pair};

/// Computes taste similarity between users on demand.
///
/// The engine is cheap to clone; clones share the note store and cache.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use palate_core::{Category, TastePolicy};
/// use palate_core::test_support::{MemoryNoteStore, dishes_for};
/// use palate_scorer::TasteEngine;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let mut notes = dishes_for("alice", &[("ramen", 8)]);
/// notes.extend(dishes_for("bob", &[("ramen", 7)]));
/// let engine = TasteEngine::new(Arc::new(MemoryNoteStore::with_notes(notes)), TastePolicy::default());
///
/// let result = engine
///     .compare(&"alice".into(), &"bob".into(), Category::Restaurant)
///     .await
///     .expect("notes available");
/// assert_eq!(result.overlap_count, 1);
/// # });
/// ```
#[derive(Clone)]
pub struct TasteEngine {
    notes: Arc<dyn NoteStore>,
    policy: TastePolicy,
    cache: Option<Arc<SimilarityCache>>,
}

impl fmt::Debug for TasteEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TasteEngine")
            .field("policy", &self.policy)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl TasteEngine {
    /// Create an engine without a similarity cache.
    #[must_use]
    pub fn new(notes: Arc<dyn NoteStore>, policy: TastePolicy) -> Self {
        Self {
            notes,
            policy,
            cache: None,
        }
    }

    /// Memoise [`TasteEngine::compare`] results in `cache`.
    ///
    /// Register the same cache as a
    /// [`NoteWriteObserver`](palate_core::NoteWriteObserver) with the note
    /// backend so writes invalidate it.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SimilarityCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Policy used for extraction and classification.
    #[must_use]
    pub const fn policy(&self) -> &TastePolicy {
        &self.policy
    }

    /// Cache attached to the engine, if any.
    #[must_use]
    pub const fn cache(&self) -> Option<&Arc<SimilarityCache>> {
        self.cache.as_ref()
    }

    /// Note store the engine reads from.
    #[must_use]
    pub fn note_store(&self) -> &dyn NoteStore {
        self.notes.as_ref()
    }

    /// Fetch `user`'s notes and extract their rated items in `category`.
    ///
    /// # Errors
    /// Returns [`ScoringError::DataUnavailable`] when the store fails.
    pub async fn rated_items(
        &self,
        user: &UserId,
        category: Category,
    ) -> Result<RatedItems, ScoringError> {
        let notes = self
            .notes
            .notes_for(user, category)
            .await
            .map_err(|source| ScoringError::DataUnavailable {
                user: user.clone(),
                category,
                source,
            })?;
        Ok(extract(user, category, &notes, &self.policy))
    }

    /// Compare two users in one category, consulting the cache first.
    ///
    /// # Errors
    /// Returns [`ScoringError::DataUnavailable`] when either user's notes
    /// cannot be fetched.
    pub async fn compare(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        category: Category,
    ) -> Result<SimilarityResult, ScoringError> {
        let Some(cache) = &self.cache else {
            return self.compare_fresh(user_a, user_b, category).await;
        };
        if let Some(hit) = cache.get(user_a, user_b, category) {
            return Ok(hit);
        }
        let ticket = cache.ticket(user_a, user_b, category);
        let result = self.compare_fresh(user_a, user_b, category).await?;
        cache.store(ticket, &result);
        Ok(result)
    }

    /// Compare two users from freshly fetched notes, bypassing the cache.
    ///
    /// Both users' notes are fetched concurrently.
    ///
    /// # Errors
    /// Returns [`ScoringError::DataUnavailable`] when either user's notes
    /// cannot be fetched.
    pub async fn compare_fresh(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        category: Category,
    ) -> Result<SimilarityResult, ScoringError> {
        let (items_a, items_b) = tokio::try_join!(
            self.rated_items(user_a, category),
            self.rated_items(user_b, category)
        )?;
        Ok(score_pair(&items_a, &items_b))
    }

    /// Compare two users in a category given by name.
    ///
    /// # Errors
    /// Returns [`ScoringError::InvalidCategory`] for unsupported names and
    /// [`ScoringError::DataUnavailable`] when notes cannot be fetched.
    pub async fn compare_named(
        &self,
        user_a: &UserId,
        user_b: &UserId,
        category: &str,
    ) -> Result<SimilarityResult, ScoringError> {
        let parsed: Category = category.parse()?;
        self.compare(user_a, user_b, parsed).await
    }

    /// Compare two users in every category.
    ///
    /// Results follow [`Category::ALL`] order; each category fails
    /// independently.
    pub async fn compare_all(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Vec<Result<SimilarityResult, ScoringError>> {
        let [first, second, third] = Category::ALL;
        let (restaurant, wine, spirit) = tokio::join!(
            self.compare(user_a, user_b, first),
            self.compare(user_a, user_b, second),
            self.compare(user_a, user_b, third)
        );
        vec![restaurant, wine, spirit]
    }

    /// Pin eligibility for a result under this engine's policy.
    #[must_use]
    pub fn eligibility(&self, result: &SimilarityResult) -> EligibilityResult {
        eligibility(&self.policy, result)
    }

    /// Tier of a note by `author` for `viewer` under this engine's policy.
    #[must_use]
    pub fn classify(
        &self,
        viewer: &UserId,
        author: &UserId,
        pinned_in_category: bool,
        similarity: Option<&SimilarityResult>,
    ) -> Option<Tier> {
        classify_tier(
            &self.policy,
            viewer,
            author,
            pinned_in_category,
            similarity,
        )
    }
}
