//! Risk score types and percentage formatting.

use serde::{Deserialize, Serialize};

/// Probability distribution over the binary outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    /// Probability of class 0 (no disease)
    pub no_disease: f64,
    /// Probability of class 1 (disease present)
    pub disease: f64,
}

impl ClassProbabilities {
    /// Build a distribution from the positive-class probability.
    #[must_use]
    pub fn from_disease(p: f64) -> Self {
        Self {
            no_disease: 1.0 - p,
            disease: p,
        }
    }

    /// The positive-class ("disease present") probability.
    #[must_use]
    pub fn positive(&self) -> f64 {
        self.disease
    }
}

/// Round to two decimals with ties to even, as numpy's `round` does.
fn round2(p: f64) -> f64 {
    (p * 100.0).round_ties_even() / 100.0
}

/// Format a disease probability as a percentage string.
///
/// The probability is rounded to two decimals first and scaled afterwards,
/// so the result always has one decimal place: `0.567 -> "57.0%"`.
#[must_use]
pub fn format_risk(p: f64) -> String {
    format!("{:.1}%", round2(p) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rounds_before_scaling() {
        assert_eq!(format_risk(0.567), "57.0%");
        assert_eq!(format_risk(0.564), "56.0%");
        assert_eq!(format_risk(0.29), "29.0%");
    }

    #[test]
    fn test_format_boundaries() {
        assert_eq!(format_risk(0.5), "50.0%");
        assert_eq!(format_risk(0.0), "0.0%");
        assert_eq!(format_risk(1.0), "100.0%");
    }

    #[test]
    fn test_ties_round_to_even() {
        assert_eq!(format_risk(0.005), "0.0%");
        assert_eq!(format_risk(0.125), "12.0%");
        assert_eq!(format_risk(0.375), "38.0%");
    }

    #[test]
    fn test_distribution_from_disease() {
        let d = ClassProbabilities::from_disease(0.25);
        assert!((d.no_disease - 0.75).abs() < f64::EPSILON);
        assert!((d.positive() - 0.25).abs() < f64::EPSILON);
    }
}
