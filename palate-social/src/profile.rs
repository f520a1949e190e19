//! Taste similarity as shown on another user's profile.

use palate_core::{TasteSimilarity, UserId};
use serde::{Deserialize, Serialize};

use crate::registry::summarise;
use crate::{FriendRegistry, SocialError};

/// Profile payload: per-category similarity plus the pin state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSimilarity {
    /// One entry per category.
    pub taste_similarity: Vec<TasteSimilarity>,
    /// Whether the viewer has pinned the profile owner in any category.
    pub is_pinned: bool,
}

impl FriendRegistry {
    /// Build the similarity section of `target`'s profile for `viewer`.
    ///
    /// A user viewing their own profile gets no similarity entries.
    /// Categories that cannot be scored show as insufficient data.
    ///
    /// # Errors
    /// Returns [`SocialError::PinStore`] when the pin state cannot be read.
    pub async fn profile_view(
        &self,
        viewer: &UserId,
        target: &UserId,
    ) -> Result<ProfileSimilarity, SocialError> {
        if viewer == target {
            return Ok(ProfileSimilarity {
                taste_similarity: Vec::new(),
                is_pinned: false,
            });
        }
        let (outcomes, lookup) = futures_util::join!(
            self.engine().compare_all(viewer, target),
            self.pin_store().find_pin(viewer, target)
        );
        let pin = lookup.map_err(SocialError::pin_store("find pin"))?;
        Ok(ProfileSimilarity {
            taste_similarity: summarise(outcomes, self.engine().policy().pin_min_overlap),
            is_pinned: pin.is_some(),
        })
    }
}
