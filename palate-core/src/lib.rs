//! Core domain types for the Palate taste engine.
//!
//! The engine compares users' tasting notes within a category, turns the
//! comparison into a bounded Taste Similarity Score, and uses that score to
//! gate Gourmet Friend pins and rank social content. This crate holds the
//! shared vocabulary: categories, notes, identity-keyed ratings, similarity
//! results, pins, the tunable [`TastePolicy`], and the store contracts the
//! engine reads through.
//!
//! Constructors validate their input and return `Result` so invalid values
//! never reach the scorer.

mod api;
mod category;
mod ids;
mod item;
mod note;
mod pin;
mod policy;
mod similarity;
mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use api::{ApiEnvelope, Page};
pub use category::{Category, CategoryParseError};
pub use ids::{NoteId, UserId, VenueId};
pub use item::{IdentityKey, RatedItem, RatedItems};
pub use note::{MAX_RATING, MIN_RATING, Note, NoteExtension, Rating, RatingError};
pub use pin::{GourmetFriendPin, PinError};
pub use policy::{
    DEFAULT_MODERATE_SCORE_FLOOR, DEFAULT_PIN_MIN_OVERLAP, DEFAULT_PIN_SCORE_THRESHOLD,
    PolicyError, TastePolicy,
};
pub use similarity::{EligibilityResult, SimilarityResult, TasteSimilarity, Tier};
pub use store::{NoteStore, NoteWriteObserver, PinStore, StoreError};
