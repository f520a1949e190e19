//! Tiered ordering of public notes for one viewer.
//!
//! A ranking request takes one snapshot of the viewer's pins, scores each
//! distinct `(author, category)` pair the pins do not already settle, and
//! assigns every candidate a tier. The same classification backs both the
//! flat feed ordering and the four search buckets. Nothing computed here
//! outlives the request; only the underlying similarity results may be cached
//! by the engine.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use palate_core::{Category, Note, NoteId, Page, PinStore, SimilarityResult, Tier, UserId};
use palate_scorer::TasteEngine;
use serde::{Deserialize, Serialize};

/// A public note offered to the ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedCandidate {
    /// Note identifier.
    pub note_id: NoteId,
    /// Author of the note.
    pub author_id: UserId,
    /// Category of the note.
    pub category: Category,
    /// Recency used for ordering within a tier.
    pub created_at: DateTime<Utc>,
}

impl From<&Note> for FeedCandidate {
    /// Notes are ordered by when the item was experienced.
    fn from(note: &Note) -> Self {
        Self {
            note_id: note.id.clone(),
            author_id: note.owner_id.clone(),
            category: note.category(),
            created_at: note.experienced_at,
        }
    }
}

/// A candidate annotated with its tier for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TieredNote {
    /// Note identifier.
    pub note_id: NoteId,
    /// Author of the note.
    pub author_id: UserId,
    /// Category of the note.
    pub category: Category,
    /// Recency used for ordering within a tier.
    pub created_at: DateTime<Utc>,
    /// Tier assigned for the viewer.
    pub tier: Tier,
}

impl TieredNote {
    fn new(candidate: FeedCandidate, tier: Tier) -> Self {
        Self {
            note_id: candidate.note_id,
            author_id: candidate.author_id,
            category: candidate.category,
            created_at: candidate.created_at,
            tier,
        }
    }

    fn feed_order(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| other.created_at.cmp(&self.created_at))
            .then_with(|| self.note_id.cmp(&other.note_id))
    }
}

/// Notes bucketed by tier, as returned by tiered search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieredSearchResult {
    /// Notes by pinned Gourmet Friends.
    pub tier1: Vec<TieredNote>,
    /// Notes by pin-eligible authors.
    pub tier2: Vec<TieredNote>,
    /// Notes by moderate matches.
    pub tier3: Vec<TieredNote>,
    /// Everything else.
    pub tier4: Vec<TieredNote>,
}

/// Output of one ranking request, already in feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedNotes {
    notes: Vec<TieredNote>,
}

impl RankedNotes {
    fn from_unsorted(mut notes: Vec<TieredNote>) -> Self {
        notes.sort_by(TieredNote::feed_order);
        Self { notes }
    }

    /// Notes ordered by tier, then newest first, then note id.
    #[must_use]
    pub fn ordered(&self) -> &[TieredNote] {
        &self.notes
    }

    /// Consume the ranking into its flat ordering.
    #[must_use]
    pub fn into_ordered(self) -> Vec<TieredNote> {
        self.notes
    }

    /// Number of ranked notes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Report whether nothing was ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Split the ranking into tier buckets, each keeping feed order.
    #[must_use]
    pub fn into_buckets(self) -> TieredSearchResult {
        let mut buckets = TieredSearchResult::default();
        for note in self.notes {
            let bucket = match note.tier {
                Tier::GourmetFriend => &mut buckets.tier1,
                Tier::HighMatch => &mut buckets.tier2,
                Tier::ModerateMatch => &mut buckets.tier3,
                Tier::General => &mut buckets.tier4,
            };
            bucket.push(note);
        }
        buckets
    }

    /// Return up to `limit` notes following the note named by `cursor`.
    ///
    /// The cursor is the id of the last note of the previous page. A cursor
    /// that no longer appears in the ranking restarts from the first note. A
    /// zero limit is treated as one.
    #[must_use]
    pub fn paginate(&self, cursor: Option<&NoteId>, limit: usize) -> Page<TieredNote> {
        let start = cursor.map_or(0, |last| {
            self.notes
                .iter()
                .position(|note| &note.note_id == last)
                .map_or_else(
                    || {
                        log::debug!("cursor {last} not found in ranking; restarting");
                        0
                    },
                    |index| index.saturating_add(1),
                )
        });
        let size = limit.max(1);
        let items: Vec<TieredNote> = self.notes.iter().skip(start).take(size).cloned().collect();
        let has_more = start.saturating_add(items.len()) < self.notes.len();
        let next_cursor = if has_more {
            items.last().map(|note| note.note_id.to_string())
        } else {
            None
        };
        Page {
            items,
            next_cursor,
            has_more,
        }
    }
}

/// Ranks candidate notes for a viewer.
#[derive(Clone)]
pub struct SocialRanker {
    engine: TasteEngine,
    pins: Arc<dyn PinStore>,
}

impl fmt::Debug for SocialRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocialRanker")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

type PinSnapshot = BTreeMap<UserId, BTreeSet<Category>>;

impl SocialRanker {
    /// Create a ranker over an engine and a pin store.
    #[must_use]
    pub fn new(engine: TasteEngine, pins: Arc<dyn PinStore>) -> Self {
        Self { engine, pins }
    }

    /// Tier and order `offered` notes for `viewer`.
    ///
    /// The viewer's own notes are dropped. Pairs that cannot be scored, and a
    /// pin store that cannot be read, degrade to the general tier rather than
    /// failing the request.
    pub async fn rank<I>(&self, viewer: &UserId, offered: I) -> RankedNotes
    where
        I: IntoIterator<Item = FeedCandidate>,
    {
        let candidates: Vec<FeedCandidate> = offered
            .into_iter()
            .filter(|candidate| &candidate.author_id != viewer)
            .collect();
        let pins = self.pin_snapshot(viewer).await;

        let unsettled: BTreeSet<(UserId, Category)> = candidates
            .iter()
            .filter(|candidate| !is_pinned(&pins, &candidate.author_id, candidate.category))
            .map(|candidate| (candidate.author_id.clone(), candidate.category))
            .collect();
        let similarities = self.score_pairs(viewer, unsettled).await;

        let tiered = candidates
            .into_iter()
            .filter_map(|candidate| {
                let pinned = is_pinned(&pins, &candidate.author_id, candidate.category);
                let similarity = similarities
                    .get(&(candidate.author_id.clone(), candidate.category))
                    .and_then(Option::as_ref);
                self.engine
                    .classify(viewer, &candidate.author_id, pinned, similarity)
                    .map(|tier| TieredNote::new(candidate, tier))
            })
            .collect();
        RankedNotes::from_unsorted(tiered)
    }

    async fn pin_snapshot(&self, viewer: &UserId) -> PinSnapshot {
        let pins = self.pins.pins_by(viewer).await.unwrap_or_else(|error| {
            log::warn!("pins for {viewer} unavailable, ranking without them: {error}");
            Vec::new()
        });
        pins.into_iter()
            .map(|pin| (pin.pinned_id, pin.categories))
            .collect()
    }

    async fn score_pairs(
        &self,
        viewer: &UserId,
        pairs: BTreeSet<(UserId, Category)>,
    ) -> HashMap<(UserId, Category), Option<SimilarityResult>> {
        let lookups = pairs.into_iter().map(|(author, category)| async move {
            let result = match self.engine.compare(viewer, &author, category).await {
                Ok(result) => Some(result),
                Err(error) => {
                    log::warn!("treating {author} as general content for {viewer}: {error}");
                    None
                }
            };
            ((author, category), result)
        });
        join_all(lookups).await.into_iter().collect()
    }
}

fn is_pinned(pins: &PinSnapshot, author: &UserId, category: Category) -> bool {
    pins.get(author)
        .is_some_and(|categories| categories.contains(&category))
}
