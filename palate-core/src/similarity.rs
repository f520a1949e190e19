//! Outputs of the similarity scorer and the classifier.

use serde::{Deserialize, Serialize, Serializer};

use crate::{Category, UserId};

/// Result of comparing two users in one category.
///
/// `score` is `None` exactly when the users share no items; otherwise it lies
/// in `0.0..=1.0`, where `1.0` means identical ratings on every shared item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    /// Category the comparison ran in.
    pub category: Category,
    /// First user, in the caller's order.
    pub user_a: UserId,
    /// Second user, in the caller's order.
    pub user_b: UserId,
    /// Number of identity keys both users rated.
    pub overlap_count: u32,
    /// Taste similarity score, absent without overlap.
    pub score: Option<f64>,
}

impl SimilarityResult {
    /// A result for two users with nothing in common.
    pub const fn empty(category: Category, user_a: UserId, user_b: UserId) -> Self {
        Self {
            category,
            user_a,
            user_b,
            overlap_count: 0,
            score: None,
        }
    }

    /// Report whether the overlap is too small for the score to be shown.
    pub const fn is_insufficient(&self, min_overlap: u32) -> bool {
        self.score.is_none() || self.overlap_count < min_overlap
    }

    /// Return the same result with `user_a` and `user_b` exchanged.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            user_a: self.user_b,
            user_b: self.user_a,
            ..self
        }
    }

    /// Report whether the result compares exactly `user_a` against `user_b`.
    pub fn is_for(&self, user_a: &UserId, user_b: &UserId) -> bool {
        &self.user_a == user_a && &self.user_b == user_b
    }
}

/// Pin eligibility for one category of a viewer/target pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    /// Category evaluated.
    pub category: Category,
    /// Live similarity score.
    pub score: Option<f64>,
    /// Live overlap count.
    pub overlap_count: u32,
    /// Whether a pin in this category would be accepted now.
    pub eligible: bool,
}

/// Per-category similarity as displayed on profiles and friend lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteSimilarity {
    /// Category evaluated.
    pub category: Category,
    /// Similarity score, absent without overlap.
    pub score: Option<f64>,
    /// Number of shared items.
    pub overlap_count: u32,
    /// True when the UI must render "Insufficient data".
    pub insufficient_data: bool,
}

impl TasteSimilarity {
    /// Summarise a result for display using the policy's minimum overlap.
    pub fn from_result(result: &SimilarityResult, min_overlap: u32) -> Self {
        Self {
            category: result.category,
            score: result.score,
            overlap_count: result.overlap_count,
            insufficient_data: result.is_insufficient(min_overlap),
        }
    }

    /// A placeholder for a category whose data could not be loaded.
    pub const fn unavailable(category: Category) -> Self {
        Self {
            category,
            score: None,
            overlap_count: 0,
            insufficient_data: true,
        }
    }
}

/// Social relevance of a note to a viewer, `1` being the most relevant.
///
/// Serialised as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "u8")]
pub enum Tier {
    /// Author is pinned as a Gourmet Friend in the note's category.
    GourmetFriend = 1,
    /// Author is pin-eligible but not pinned.
    HighMatch = 2,
    /// Enough shared items, moderate agreement.
    ModerateMatch = 3,
    /// General public content.
    General = 4,
}

impl Tier {
    /// All tiers in precedence order.
    pub const ALL: [Self; 4] = [
        Self::GourmetFriend,
        Self::HighMatch,
        Self::ModerateMatch,
        Self::General,
    ];

    /// Numeric tier value.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Label shown next to tiered content.
    pub const fn label(self) -> &'static str {
        match self {
            Self::GourmetFriend => "Gourmet Friend",
            Self::HighMatch => "High Match",
            Self::ModerateMatch => "Moderate Match",
            Self::General => "Public",
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::GourmetFriend),
            2 => Ok(Self::HighMatch),
            3 => Ok(Self::ModerateMatch),
            4 => Ok(Self::General),
            other => Err(format!("tier {other} is outside 1..=4")),
        }
    }
}

impl Serialize for Tier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tier {} ({})", self.as_u8(), self.label())
    }
}
