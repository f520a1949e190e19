//! Tasting notes as seen by the similarity engine.
//!
//! The note backend owns the full entity; the engine only needs the rating,
//! when the item was experienced, and the category-specific fields that
//! identify *what* was rated. Those fields form a tagged union keyed by
//! category so a note can never claim to be a wine while carrying a dish name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, NoteId, UserId, VenueId};

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted rating.
pub const MAX_RATING: u8 = 10;

/// A rating on the inclusive `1..=10` scale.
///
/// # Examples
/// ```
/// use palate_core::Rating;
///
/// assert_eq!(Rating::new(8).map(Rating::get), Ok(8));
/// assert!(Rating::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

/// Errors returned by [`Rating::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RatingError {
    /// The value fell outside `1..=10`.
    #[error("rating {value} is outside the range {MIN_RATING}..={MAX_RATING}")]
    OutOfRange {
        /// The rejected value.
        value: u8,
    },
}

impl Rating {
    /// Validate and construct a rating.
    pub const fn new(value: u8) -> Result<Self, RatingError> {
        if value < MIN_RATING || value > MAX_RATING {
            return Err(RatingError::OutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Return the raw rating value.
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Absolute difference between two ratings (`0..=9`).
    pub const fn distance(self, other: Self) -> u8 {
        self.0.abs_diff(other.0)
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// Category-specific fields that identify the rated item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "category",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum NoteExtension {
    /// A dish, optionally tied to the venue that served it.
    Restaurant {
        /// Free-text dish name as entered by the user.
        dish_name: String,
        /// Venue the dish was eaten at.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        venue_id: Option<VenueId>,
    },
    /// A wine label.
    Wine {
        /// Free-text wine name.
        wine_name: String,
        /// Vintage year, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        vintage: Option<u16>,
    },
    /// A spirit.
    Spirit {
        /// Free-text spirit name.
        spirit_name: String,
    },
}

impl NoteExtension {
    /// Category implied by the variant.
    pub const fn category(&self) -> Category {
        match self {
            Self::Restaurant { .. } => Category::Restaurant,
            Self::Wine { .. } => Category::Wine,
            Self::Spirit { .. } => Category::Spirit,
        }
    }
}

/// A rated tasting note.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use palate_core::{Category, Note, NoteExtension, Rating};
///
/// let note = Note {
///     id: "n1".into(),
///     owner_id: "alice".into(),
///     rating: Rating::new(9).unwrap(),
///     experienced_at: Utc.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap(),
///     extension: NoteExtension::Spirit { spirit_name: "Lagavulin 16".into() },
/// };
/// assert_eq!(note.category(), Category::Spirit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Note identifier.
    pub id: NoteId,
    /// Author of the note.
    pub owner_id: UserId,
    /// The author's rating.
    pub rating: Rating,
    /// When the item was tasted.
    pub experienced_at: DateTime<Utc>,
    /// Category-specific identity fields.
    pub extension: NoteExtension,
}

impl Note {
    /// Category of the note, derived from its extension.
    pub const fn category(&self) -> Category {
        self.extension.category()
    }
}
