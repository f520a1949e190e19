//! Social discovery on top of taste similarity.
//!
//! - [`SocialRanker`] tiers public notes for a viewer and presents them as a
//!   flat feed, as tier buckets for search, or one cursor page at a time.
//! - [`FriendRegistry`] gates, stores and lists Gourmet Friend pins, and
//!   builds the similarity section of user profiles.
//! - [`discover_similar_users`] ranks other users by their best category.
//!
//! Data failures degrade rather than fail wherever the user would otherwise
//! see an error for content they did not ask about: a feed whose similarity
//! lookups fail still renders, with the affected notes in the general tier.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod discovery;
mod error;
mod profile;
mod ranker;
mod registry;

pub use discovery::{UserSuggestion, discover_similar_users};
pub use error::SocialError;
pub use profile::ProfileSimilarity;
pub use ranker::{FeedCandidate, RankedNotes, SocialRanker, TieredNote, TieredSearchResult};
pub use registry::{CanPinResult, FriendRegistry, GourmetFriend};
