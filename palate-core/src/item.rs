//! Identity-keyed ratings derived from a user's notes.
//!
//! A [`RatedItems`] value is the extractor's output: for one owner and one
//! category, a map from normalised identity key to the rating that represents
//! the owner's opinion of that item. Two users "share" an item when both maps
//! contain the same key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Category, Rating, UserId};

/// Normalised identity of "the same thing rated twice" within a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wrap an already normalised key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single identity-keyed rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedItem {
    /// Category the key was derived in.
    pub category: Category,
    /// Normalised identity key.
    pub identity_key: IdentityKey,
    /// Rating chosen for the key.
    pub rating: Rating,
    /// User who rated the item.
    pub owner_id: UserId,
}

/// Deduplicated ratings for one owner in one category.
///
/// # Examples
/// ```
/// use palate_core::{Category, IdentityKey, Rating, RatedItems};
///
/// let mut items = RatedItems::new("alice".into(), Category::Restaurant);
/// items.insert(IdentityKey::new("ramen"), Rating::new(8).unwrap());
/// assert_eq!(items.len(), 1);
/// assert_eq!(items.get(&IdentityKey::new("ramen")).map(Rating::get), Some(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedItems {
    owner_id: UserId,
    category: Category,
    ratings: BTreeMap<IdentityKey, Rating>,
}

impl RatedItems {
    /// Create an empty mapping.
    pub const fn new(owner_id: UserId, category: Category) -> Self {
        Self {
            owner_id,
            category,
            ratings: BTreeMap::new(),
        }
    }

    /// Owner of the ratings.
    pub const fn owner_id(&self) -> &UserId {
        &self.owner_id
    }

    /// Category the ratings belong to.
    pub const fn category(&self) -> Category {
        self.category
    }

    /// Insert or replace the rating for a key.
    pub fn insert(&mut self, key: IdentityKey, rating: Rating) -> Option<Rating> {
        self.ratings.insert(key, rating)
    }

    /// Rating stored for a key, if any.
    pub fn get(&self, key: &IdentityKey) -> Option<Rating> {
        self.ratings.get(key).copied()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    /// Report whether no items were rated.
    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Iterate over keys and ratings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, Rating)> {
        self.ratings.iter().map(|(key, rating)| (key, *rating))
    }

    /// Iterate over the items both mappings contain, yielding each side's
    /// rating.
    pub fn shared_with<'a>(
        &'a self,
        other: &'a Self,
    ) -> impl Iterator<Item = (&'a IdentityKey, Rating, Rating)> + 'a {
        let (small, large, swapped) = if self.len() <= other.len() {
            (self, other, false)
        } else {
            (other, self, true)
        };
        small.iter().filter_map(move |(key, small_rating)| {
            large.get(key).map(|large_rating| {
                if swapped {
                    (key, large_rating, small_rating)
                } else {
                    (key, small_rating, large_rating)
                }
            })
        })
    }

    /// Expand into owned [`RatedItem`] records.
    pub fn to_items(&self) -> Vec<RatedItem> {
        self.ratings
            .iter()
            .map(|(key, rating)| RatedItem {
                category: self.category,
                identity_key: key.clone(),
                rating: *rating,
                owner_id: self.owner_id.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: u8) -> Rating {
        Rating::new(value).unwrap()
    }

    #[test]
    fn shared_with_reports_ratings_in_caller_order() {
        let mut alice = RatedItems::new("alice".into(), Category::Wine);
        alice.insert(IdentityKey::new("barolo"), rating(9));
        alice.insert(IdentityKey::new("chablis"), rating(6));
        alice.insert(IdentityKey::new("rioja"), rating(4));
        let mut bob = RatedItems::new("bob".into(), Category::Wine);
        bob.insert(IdentityKey::new("barolo"), rating(7));

        let forward: Vec<_> = alice.shared_with(&bob).collect();
        assert_eq!(forward, vec![(&IdentityKey::new("barolo"), rating(9), rating(7))]);

        let backward: Vec<_> = bob.shared_with(&alice).collect();
        assert_eq!(backward, vec![(&IdentityKey::new("barolo"), rating(7), rating(9))]);
    }

    #[test]
    fn to_items_carries_owner_and_category() {
        let mut items = RatedItems::new("alice".into(), Category::Spirit);
        items.insert(IdentityKey::new("ardbeg 10"), rating(8));
        let expanded = items.to_items();
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].owner_id, UserId::from("alice"));
        assert_eq!(expanded[0].category, Category::Spirit);
    }
}
