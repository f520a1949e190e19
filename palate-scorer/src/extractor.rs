//! Rated-item extraction: turn a user's notes into identity-keyed ratings.
//!
//! Each category defines what "the same item" means. Restaurant dishes are
//! keyed by dish name and venue, wines by name and (optionally) vintage,
//! spirits by name. Names are normalised so casing and stray whitespace do not
//! split one item into two.

use std::collections::BTreeMap;

use palate_core::{Category, IdentityKey, Note, NoteExtension, RatedItems, TastePolicy, UserId};

/// Lower-case `raw` and collapse every whitespace run to a single space.
///
/// # Examples
/// ```
/// use palate_scorer::normalise_name;
///
/// assert_eq!(normalise_name("  Tonkotsu\tRAMEN "), "tonkotsu ramen");
/// ```
#[must_use]
pub fn normalise_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the identity key for a note's category-specific fields.
///
/// Returns `None` when the identifying name is blank.
///
/// # Examples
/// ```
/// use palate_core::{NoteExtension, TastePolicy};
/// use palate_scorer::identity_key;
///
/// let wine = NoteExtension::Wine { wine_name: "Barolo".into(), vintage: Some(2016) };
/// let key = identity_key(&wine, &TastePolicy::default()).expect("named wine");
/// assert_eq!(key.as_str(), "barolo#2016");
/// ```
#[must_use]
pub fn identity_key(extension: &NoteExtension, policy: &TastePolicy) -> Option<IdentityKey> {
    let key = match extension {
        NoteExtension::Restaurant {
            dish_name,
            venue_id,
        } => {
            let dish = non_empty(normalise_name(dish_name))?;
            let venue = venue_id
                .as_ref()
                .and_then(|venue| non_empty(normalise_name(venue.as_str())));
            venue.map_or_else(|| dish.clone(), |place| format!("{dish}@{place}"))
        }
        NoteExtension::Wine { wine_name, vintage } => {
            let name = non_empty(normalise_name(wine_name))?;
            match vintage {
                Some(year) if policy.wine_vintage_identity => format!("{name}#{year}"),
                _ => name,
            }
        }
        NoteExtension::Spirit { spirit_name } => non_empty(normalise_name(spirit_name))?,
    };
    Some(IdentityKey::new(key))
}

fn non_empty(name: String) -> Option<String> {
    (!name.is_empty()).then_some(name)
}

/// Build the deduplicated rating map for `owner` in `category`.
///
/// Notes from other owners or categories are ignored. When several notes map
/// to the same identity key, the most recently experienced one wins and ties
/// go to the greater note id, so the outcome does not depend on input order.
///
/// # Examples
/// ```
/// use palate_core::{Category, TastePolicy};
/// use palate_core::test_support::dishes_for;
/// use palate_scorer::extract;
///
/// let notes = dishes_for("alice", &[("Ramen", 8), ("ramen ", 6), ("Gyoza", 7)]);
/// let items = extract(&"alice".into(), Category::Restaurant, &notes, &TastePolicy::default());
/// assert_eq!(items.len(), 2);
/// ```
#[must_use]
pub fn extract(
    owner: &UserId,
    category: Category,
    notes: &[Note],
    policy: &TastePolicy,
) -> RatedItems {
    let mut latest: BTreeMap<IdentityKey, &Note> = BTreeMap::new();
    for note in notes
        .iter()
        .filter(|note| &note.owner_id == owner && note.category() == category)
    {
        let Some(key) = identity_key(&note.extension, policy) else {
            log::debug!("skipping note {} without an identifying name", note.id);
            continue;
        };
        latest
            .entry(key)
            .and_modify(|current| {
                if supersedes(note, current) {
                    *current = note;
                }
            })
            .or_insert(note);
    }

    let mut items = RatedItems::new(owner.clone(), category);
    for (key, note) in latest {
        items.insert(key, note.rating);
    }
    items
}

fn supersedes(candidate: &Note, current: &Note) -> bool {
    (candidate.experienced_at, &candidate.id) > (current.experienced_at, &current.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use palate_core::test_support::{dish, note_at, spirit, wine};
    use rstest::rstest;

    fn policy() -> TastePolicy {
        TastePolicy::default()
    }

    fn key(raw: &str) -> IdentityKey {
        IdentityKey::new(raw)
    }

    #[rstest]
    #[case(dish("Tonkotsu  Ramen", None), Some("tonkotsu ramen"))]
    #[case(dish("Ramen", Some("Ichiran-01")), Some("ramen@ichiran-01"))]
    #[case(dish("Ramen", Some("  ")), Some("ramen"))]
    #[case(dish("   ", Some("venue")), None)]
    #[case(wine("Barolo ", Some(2016)), Some("barolo#2016"))]
    #[case(wine("Barolo", None), Some("barolo"))]
    #[case(spirit("Lagavulin 16"), Some("lagavulin 16"))]
    #[case(spirit(""), None)]
    fn derives_identity_keys(#[case] extension: NoteExtension, #[case] expected: Option<&str>) {
        assert_eq!(identity_key(&extension, &policy()), expected.map(key));
    }

    #[test]
    fn vintage_can_be_ignored() {
        let folded = TastePolicy {
            wine_vintage_identity: false,
            ..policy()
        };
        assert_eq!(
            identity_key(&wine("Barolo", Some(2016)), &folded),
            Some(key("barolo"))
        );
    }

    #[test]
    fn latest_experience_wins() {
        let notes = vec![
            note_at("n2", "alice", 9, 30, dish("Ramen", None)),
            note_at("n1", "alice", 4, 10, dish("ramen", None)),
        ];
        let items = extract(&"alice".into(), Category::Restaurant, &notes, &policy());
        assert_eq!(items.get(&key("ramen")).map(palate_core::Rating::get), Some(9));
    }

    #[test]
    fn equal_timestamps_prefer_greater_note_id() {
        let forward = vec![
            note_at("a", "alice", 3, 0, dish("Ramen", None)),
            note_at("b", "alice", 7, 0, dish("Ramen", None)),
        ];
        let mut backward = forward.clone();
        backward.reverse();
        for notes in [forward, backward] {
            let items = extract(&"alice".into(), Category::Restaurant, &notes, &policy());
            assert_eq!(items.get(&key("ramen")).map(palate_core::Rating::get), Some(7));
        }
    }

    #[test]
    fn ignores_other_categories_and_owners() {
        let notes = vec![
            note_at("n1", "alice", 8, 0, dish("Ramen", None)),
            note_at("n2", "alice", 8, 0, wine("Barolo", None)),
            note_at("n3", "bob", 8, 0, dish("Gyoza", None)),
        ];
        let items = extract(&"alice".into(), Category::Restaurant, &notes, &policy());
        assert_eq!(items.len(), 1);
        assert_eq!(items.owner_id(), &UserId::from("alice"));
    }

    #[test]
    fn empty_input_yields_empty_items() {
        let items = extract(&"alice".into(), Category::Spirit, &[], &policy());
        assert!(items.is_empty());
        assert_eq!(items.category(), Category::Spirit);
    }
}
