//! Taste similarity scoring for the Palate engine.
//!
//! The crate turns users' tasting notes into comparable ratings and scores how
//! closely two users agree within a category:
//! - **Extraction** maps each note to a normalised identity key so the same
//!   dish, wine or spirit rated by two users lines up, keeping one rating per
//!   item per user.
//! - **Scoring** compares the shared items and yields a Taste Similarity Score
//!   in `0.0..=1.0` together with the overlap count.
//! - **Classification** applies a [`TastePolicy`](palate_core::TastePolicy) to
//!   decide pin eligibility and per-viewer visibility tiers.
//! - [`TasteEngine`] ties these together behind a
//!   [`NoteStore`](palate_core::NoteStore), fetching both users concurrently
//!   and optionally memoising results in a [`SimilarityCache`].
//!
//! # Examples
//!
//! ```
//! use palate_core::{Category, TastePolicy};
//! use palate_core::test_support::dishes_for;
//! use palate_scorer::{eligibility, extract, score_pair};
//!
//! let policy = TastePolicy::default();
//! let a = extract(&"a".into(), Category::Restaurant, &dishes_for("a", &[("ramen", 9)]), &policy);
//! let b = extract(&"b".into(), Category::Restaurant, &dishes_for("b", &[("ramen", 9)]), &policy);
//! let result = score_pair(&a, &b);
//! assert_eq!(result.score, Some(1.0));
//! assert!(!eligibility(&policy, &result).eligible);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod classifier;
mod engine;
mod error;
mod extractor;
mod similarity;

pub use cache::{CacheTicket, SimilarityCache};
pub use classifier::{classify_tier, eligibility};
pub use engine::TasteEngine;
pub use error::ScoringError;
pub use extractor::{extract, identity_key, normalise_name};
pub use similarity::score_pair;
