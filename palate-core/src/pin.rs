//! Gourmet Friend pins: user-confirmed, per-category trust relationships.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Category, UserId};

/// A confirmed pin from `pinner_id` to `pinned_id`.
///
/// At most one pin exists per ordered pair; the set of categories is never
/// empty.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use palate_core::{Category, GourmetFriendPin};
///
/// let pin = GourmetFriendPin::new("alice".into(), "bob".into(), [Category::Wine], Utc::now())?;
/// assert!(pin.covers(Category::Wine));
/// assert!(!pin.covers(Category::Spirit));
/// # Ok::<(), palate_core::PinError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GourmetFriendPin {
    /// User who created the pin.
    pub pinner_id: UserId,
    /// User being pinned.
    pub pinned_id: UserId,
    /// Categories the pin applies to.
    pub categories: BTreeSet<Category>,
    /// When the relationship was first created.
    pub created_at: DateTime<Utc>,
}

/// Errors returned by [`GourmetFriendPin::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinError {
    /// No categories were supplied.
    #[error("a pin must cover at least one category")]
    EmptyCategories,
    /// A user tried to pin themselves.
    #[error("user {user} cannot pin themselves")]
    SelfPin {
        /// The offending user.
        user: UserId,
    },
}

impl GourmetFriendPin {
    /// Validate and construct a pin.
    pub fn new(
        pinner_id: UserId,
        pinned_id: UserId,
        categories: impl IntoIterator<Item = Category>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PinError> {
        if pinner_id == pinned_id {
            return Err(PinError::SelfPin { user: pinner_id });
        }
        let categories: BTreeSet<Category> = categories.into_iter().collect();
        if categories.is_empty() {
            return Err(PinError::EmptyCategories);
        }
        Ok(Self {
            pinner_id,
            pinned_id,
            categories,
            created_at,
        })
    }

    /// Report whether the pin applies to a category.
    pub fn covers(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Add categories, keeping the original creation time.
    pub fn merge_categories(&mut self, categories: impl IntoIterator<Item = Category>) {
        self.categories.extend(categories);
    }
}
