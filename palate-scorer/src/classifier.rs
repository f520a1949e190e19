//! Pin eligibility and per-viewer visibility tiers.

use palate_core::{EligibilityResult, SimilarityResult, TastePolicy, Tier, UserId};

/// Decide whether a similarity result allows a Gourmet Friend pin.
///
/// Eligibility requires both a score at or above the pin threshold and at
/// least the minimum number of shared items.
///
/// # Examples
/// ```
/// use palate_core::{Category, SimilarityResult, TastePolicy};
/// use palate_scorer::eligibility;
///
/// let result = SimilarityResult {
///     category: Category::Wine,
///     user_a: "alice".into(),
///     user_b: "bob".into(),
///     overlap_count: 5,
///     score: Some(0.70),
/// };
/// assert!(eligibility(&TastePolicy::default(), &result).eligible);
/// ```
#[must_use]
pub fn eligibility(policy: &TastePolicy, result: &SimilarityResult) -> EligibilityResult {
    EligibilityResult {
        category: result.category,
        score: result.score,
        overlap_count: result.overlap_count,
        eligible: is_eligible(policy, result),
    }
}

fn is_eligible(policy: &TastePolicy, result: &SimilarityResult) -> bool {
    result.overlap_count >= policy.pin_min_overlap
        && result
            .score
            .is_some_and(|score| score >= policy.pin_score_threshold)
}

/// Assign the tier a note by `author` has for `viewer`.
///
/// `pinned_in_category` reports whether the viewer pinned the author in the
/// note's category; a pin wins regardless of the live score. `similarity` is
/// `None` when the pair could not be scored, which places the note in the
/// general tier. Self-authored notes are never tiered.
#[must_use]
pub fn classify_tier(
    policy: &TastePolicy,
    viewer: &UserId,
    author: &UserId,
    pinned_in_category: bool,
    similarity: Option<&SimilarityResult>,
) -> Option<Tier> {
    if viewer == author {
        return None;
    }
    if pinned_in_category {
        return Some(Tier::GourmetFriend);
    }
    let tier = similarity.map_or(Tier::General, |result| similarity_tier(policy, result));
    Some(tier)
}

fn similarity_tier(policy: &TastePolicy, result: &SimilarityResult) -> Tier {
    if is_eligible(policy, result) {
        return Tier::HighMatch;
    }
    let moderate = result.overlap_count >= policy.pin_min_overlap
        && result
            .score
            .is_some_and(|score| score >= policy.moderate_score_floor);
    if moderate {
        Tier::ModerateMatch
    } else {
        Tier::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palate_core::Category;
    use rstest::rstest;

    fn result(overlap_count: u32, score: Option<f64>) -> SimilarityResult {
        SimilarityResult {
            category: Category::Restaurant,
            user_a: "viewer".into(),
            user_b: "author".into(),
            overlap_count,
            score,
        }
    }

    #[rstest]
    #[case(5, Some(0.70), true)]
    #[case(12, Some(0.95), true)]
    #[case(4, Some(0.95), false)]
    #[case(5, Some(0.69), false)]
    #[case(0, None, false)]
    fn eligibility_needs_score_and_overlap(
        #[case] overlap: u32,
        #[case] score: Option<f64>,
        #[case] expected: bool,
    ) {
        let outcome = eligibility(&TastePolicy::default(), &result(overlap, score));
        assert_eq!(outcome.eligible, expected);
        assert_eq!(outcome.overlap_count, overlap);
    }

    #[rstest]
    #[case(false, Some(result(6, Some(0.85))), Tier::HighMatch)]
    #[case(false, Some(result(6, Some(0.60))), Tier::ModerateMatch)]
    #[case(false, Some(result(6, Some(0.40))), Tier::General)]
    #[case(false, Some(result(3, Some(0.99))), Tier::General)]
    #[case(false, Some(result(0, None)), Tier::General)]
    #[case(false, None, Tier::General)]
    #[case(true, Some(result(6, Some(0.10))), Tier::GourmetFriend)]
    #[case(true, None, Tier::GourmetFriend)]
    fn assigns_tiers(
        #[case] pinned: bool,
        #[case] similarity: Option<SimilarityResult>,
        #[case] expected: Tier,
    ) {
        let tier = classify_tier(
            &TastePolicy::default(),
            &"viewer".into(),
            &"author".into(),
            pinned,
            similarity.as_ref(),
        );
        assert_eq!(tier, Some(expected));
    }

    #[test]
    fn self_notes_are_not_tiered() {
        let tier = classify_tier(
            &TastePolicy::default(),
            &"viewer".into(),
            &"viewer".into(),
            true,
            None,
        );
        assert_eq!(tier, None);
    }

    #[test]
    fn moderate_floor_is_configurable() {
        let strict = TastePolicy {
            moderate_score_floor: 0.65,
            ..TastePolicy::default()
        };
        let similarity = result(6, Some(0.60));
        assert_eq!(
            classify_tier(&strict, &"v".into(), &"a".into(), false, Some(&similarity)),
            Some(Tier::General)
        );
    }
}
