//! Thresholds that turn similarity results into eligibility and tiers.
//!
//! The defaults reflect the product copy ("Need TSS ≥ 70% and 5+ shared
//! items"). Deployments may override them; [`TastePolicy::validate`] keeps the
//! overrides coherent.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default minimum score for a Gourmet Friend pin.
pub const DEFAULT_PIN_SCORE_THRESHOLD: f64 = 0.70;
/// Default minimum number of shared items for a pin.
pub const DEFAULT_PIN_MIN_OVERLAP: u32 = 5;
/// Default lowest score still classed as a moderate match.
pub const DEFAULT_MODERATE_SCORE_FLOOR: f64 = 0.50;

/// Tunable classification policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TastePolicy {
    /// Minimum score for pin eligibility (and tier 2).
    pub pin_score_threshold: f64,
    /// Minimum overlap for pin eligibility (and tier 3).
    pub pin_min_overlap: u32,
    /// Minimum score for a moderate match (tier 3).
    pub moderate_score_floor: f64,
    /// Treat different vintages of the same wine as different items.
    pub wine_vintage_identity: bool,
}

impl Default for TastePolicy {
    fn default() -> Self {
        Self {
            pin_score_threshold: DEFAULT_PIN_SCORE_THRESHOLD,
            pin_min_overlap: DEFAULT_PIN_MIN_OVERLAP,
            moderate_score_floor: DEFAULT_MODERATE_SCORE_FLOOR,
            wine_vintage_identity: true,
        }
    }
}

/// Errors raised by [`TastePolicy::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PolicyError {
    /// A threshold was NaN, infinite or outside `0.0..=1.0`.
    #[error("{field} must be a finite value within 0.0..=1.0 (got {value})")]
    ThresholdOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The moderate floor exceeded the pin threshold.
    #[error("moderate score floor {floor} exceeds pin score threshold {threshold}")]
    FloorAboveThreshold {
        /// Configured floor.
        floor: f64,
        /// Configured pin threshold.
        threshold: f64,
    },
    /// A zero minimum overlap would let a single shared item unlock pins.
    #[error("minimum pin overlap must be at least 1")]
    ZeroOverlap,
}

impl TastePolicy {
    /// Validate the policy and return it unchanged.
    ///
    /// # Examples
    /// ```
    /// use palate_core::TastePolicy;
    ///
    /// assert!(TastePolicy::default().validate().is_ok());
    /// let broken = TastePolicy { moderate_score_floor: 0.9, ..TastePolicy::default() };
    /// assert!(broken.validate().is_err());
    /// ```
    pub fn validate(self) -> Result<Self, PolicyError> {
        check_unit_interval("pin_score_threshold", self.pin_score_threshold)?;
        check_unit_interval("moderate_score_floor", self.moderate_score_floor)?;
        if self.moderate_score_floor > self.pin_score_threshold {
            return Err(PolicyError::FloorAboveThreshold {
                floor: self.moderate_score_floor,
                threshold: self.pin_score_threshold,
            });
        }
        if self.pin_min_overlap == 0 {
            return Err(PolicyError::ZeroOverlap);
        }
        Ok(self)
    }
}

fn check_unit_interval(field: &'static str, value: f64) -> Result<(), PolicyError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PolicyError::ThresholdOutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN)]
    #[case(-0.1)]
    #[case(1.5)]
    fn rejects_bad_pin_threshold(#[case] value: f64) {
        let policy = TastePolicy {
            pin_score_threshold: value,
            ..TastePolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(PolicyError::ThresholdOutOfRange {
                field: "pin_score_threshold",
                ..
            })
        ));
    }

    #[test]
    fn rejects_zero_overlap() {
        let policy = TastePolicy {
            pin_min_overlap: 0,
            ..TastePolicy::default()
        };
        assert_eq!(policy.validate(), Err(PolicyError::ZeroOverlap));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let policy: TastePolicy = serde_json::from_str(r#"{"pinMinOverlap": 3}"#).unwrap();
        assert_eq!(policy.pin_min_overlap, 3);
        assert_eq!(policy.pin_score_threshold, DEFAULT_PIN_SCORE_THRESHOLD);
        assert!(policy.wine_vintage_identity);
    }
}
