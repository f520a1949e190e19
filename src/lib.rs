//! Facade crate for the Palate taste engine.
//!
//! This crate re-exports the core domain types and the similarity engine, and
//! exposes the social layer and the SQLite stores behind feature flags.

#![forbid(unsafe_code)]

pub use palate_core::{
    ApiEnvelope, Category, EligibilityResult, GourmetFriendPin, Note, NoteExtension, NoteId,
    NoteStore, NoteWriteObserver, Page, PinStore, Rating, SimilarityResult, StoreError,
    TastePolicy, TasteSimilarity, Tier, UserId, VenueId,
};
pub use palate_scorer::{ScoringError, SimilarityCache, TasteEngine};

#[cfg(feature = "social")]
pub use palate_social::{
    CanPinResult, FeedCandidate, FriendRegistry, GourmetFriend, ProfileSimilarity, RankedNotes,
    SocialError, SocialRanker, TieredNote, TieredSearchResult, UserSuggestion,
    discover_similar_users,
};

#[cfg(feature = "store-sqlite")]
pub use palate_data::{SqliteNoteStore, SqlitePinStore, SqliteStoreError};
