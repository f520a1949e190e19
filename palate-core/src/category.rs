//! Taste categories that similarity is computed within.
//!
//! Scores are never compared across categories: a user's restaurant ratings
//! say nothing about their wine palate.
//!
//! # Examples
//! ```
//! use palate_core::Category;
//!
//! assert_eq!(Category::Wine.as_str(), "WINE");
//! assert_eq!("spirit".parse::<Category>(), Ok(Category::Spirit));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Taste domain a note belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Dishes eaten at restaurants.
    Restaurant,
    /// Wines, optionally distinguished by vintage.
    Wine,
    /// Spirits.
    Spirit,
}

/// Error raised when a category name is not one of the supported values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported category '{name}' (expected RESTAURANT, WINE or SPIRIT)")]
pub struct CategoryParseError {
    /// The rejected input.
    pub name: String,
}

impl Category {
    /// Every supported category in canonical order.
    pub const ALL: [Self; 3] = [Self::Restaurant, Self::Wine, Self::Spirit];

    /// Return the wire name of the category.
    ///
    /// # Examples
    /// ```
    /// use palate_core::Category;
    ///
    /// assert_eq!(Category::Restaurant.as_str(), "RESTAURANT");
    /// ```
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restaurant => "RESTAURANT",
            Self::Wine => "WINE",
            Self::Spirit => "SPIRIT",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RESTAURANT" => Ok(Self::Restaurant),
            "WINE" => Ok(Self::Wine),
            "SPIRIT" => Ok(Self::Spirit),
            _ => Err(CategoryParseError { name: s.to_owned() }),
        }
    }
}
