//! Assessment policy: the configurable label → fraction table.
//!
//! The table is data, loaded from [`AssessmentConfig`], so every entry surface shares the
//! same mapping. Lookups are pure; the same label and max mark always give the same mark.

use std::collections::HashSet;

use util::assessment_config::{AssessmentConfig, LabelFraction};

use crate::error::MarkerError;
use crate::scorer::round_half_up;
use crate::types::AssessmentLabel;

#[derive(Debug, Clone, PartialEq)]
struct PolicyEntry {
    label: AssessmentLabel,
    fraction: f64,
}

/// Ordered, validated label table.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentPolicy {
    entries: Vec<PolicyEntry>,
}

impl AssessmentPolicy {
    /// Builds a policy from `(label, fraction)` pairs, keeping their order.
    ///
    /// # Errors
    /// [`MarkerError::InvalidPolicy`] if the table is empty, a label is blank or repeated
    /// (case-insensitively), or a fraction is outside `[0, 1]`.
    pub fn new<I, L>(entries: I) -> Result<Self, MarkerError>
    where
        I: IntoIterator<Item = (L, f64)>,
        L: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut validated = Vec::new();

        for (label, fraction) in entries {
            let label: String = label.into();
            let label = label.trim().to_string();
            if label.is_empty() {
                return Err(MarkerError::InvalidPolicy("blank label".into()));
            }
            if !seen.insert(label.to_ascii_lowercase()) {
                return Err(MarkerError::InvalidPolicy(format!("duplicate label '{label}'")));
            }
            if !(0.0..=1.0).contains(&fraction) {
                return Err(MarkerError::InvalidPolicy(format!(
                    "label '{label}' has fraction {fraction}, expected a value in [0, 1]"
                )));
            }
            validated.push(PolicyEntry {
                label: AssessmentLabel::new(label),
                fraction,
            });
        }

        if validated.is_empty() {
            return Err(MarkerError::InvalidPolicy("no labels configured".into()));
        }

        Ok(Self { entries: validated })
    }

    pub fn from_config(config: &AssessmentConfig) -> Result<Self, MarkerError> {
        Self::new(
            config
                .labels
                .iter()
                .map(|LabelFraction { label, fraction }| (label.clone(), *fraction)),
        )
    }

    /// Configured labels in display order.
    pub fn labels(&self) -> Vec<&AssessmentLabel> {
        self.entries.iter().map(|e| &e.label).collect()
    }

    fn entry(&self, label: &str) -> Result<&PolicyEntry, MarkerError> {
        let wanted = label.trim();
        self.entries
            .iter()
            .find(|e| e.label.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MarkerError::UnknownLabel(label.to_string()))
    }

    /// The canonical spelling of `label` as configured.
    pub fn resolve(&self, label: &str) -> Result<AssessmentLabel, MarkerError> {
        self.entry(label).map(|e| e.label.clone())
    }

    pub fn fraction(&self, label: &str) -> Result<f64, MarkerError> {
        self.entry(label).map(|e| e.fraction)
    }

    /// `round_half_up(fraction(label) * max_mark)`, a whole mark, capped at `max_mark`.
    ///
    /// # Errors
    /// - [`MarkerError::UnknownLabel`] for labels outside the table. Never defaults to zero.
    /// - [`MarkerError::InvalidCatalog`] for a negative or non-finite `max_mark`.
    pub fn awarded_mark(&self, label: &str, max_mark: f64) -> Result<f64, MarkerError> {
        if !max_mark.is_finite() || max_mark < 0.0 {
            return Err(MarkerError::InvalidCatalog(format!(
                "max mark {max_mark} is not a non-negative number"
            )));
        }
        let fraction = self.fraction(label)?;
        // Whole-mark rounding can overshoot a fractional max mark (1.0 of 2.5 -> 3).
        Ok(round_half_up(fraction * max_mark).min(max_mark))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_level() -> AssessmentPolicy {
        AssessmentPolicy::new([
            ("not_attempted", 0.0),
            ("attempted_poorly", 0.3),
            ("attempted_adequately", 0.5),
            ("attempted_fully", 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn awarded_mark_rounds_half_up() {
        let policy = AssessmentPolicy::new([("quarter", 0.25), ("poor", 0.3)]).unwrap();
        assert_eq!(policy.awarded_mark("quarter", 10.0).unwrap(), 3.0); // 2.5 -> 3
        assert_eq!(policy.awarded_mark("quarter", 4.0).unwrap(), 1.0);
        assert_eq!(policy.awarded_mark("poor", 10.0).unwrap(), 3.0);
        assert_eq!(policy.awarded_mark("poor", 5.0).unwrap(), 2.0); // 1.5 -> 2
    }

    #[test]
    fn awarded_mark_rounds_decimal_halves_up() {
        let policy = AssessmentPolicy::new([("p29", 0.29), ("p35", 0.35), ("p57", 0.57)]).unwrap();
        assert_eq!(policy.awarded_mark("p29", 50.0).unwrap(), 15.0); // 14.5
        assert_eq!(policy.awarded_mark("p35", 90.0).unwrap(), 32.0); // 31.5
        assert_eq!(policy.awarded_mark("p57", 50.0).unwrap(), 29.0); // 28.5
    }

    #[test]
    fn unknown_label_is_an_error_not_zero() {
        let err = four_level().awarded_mark("brilliant", 10.0).unwrap_err();
        assert_eq!(err, MarkerError::UnknownLabel("brilliant".into()));
    }

    #[test]
    fn labels_match_case_insensitively_and_resolve_to_canonical() {
        let policy = four_level();
        assert_eq!(policy.awarded_mark(" Attempted_Fully ", 8.0).unwrap(), 8.0);
        assert_eq!(
            policy.resolve("ATTEMPTED_POORLY").unwrap(),
            AssessmentLabel::new("attempted_poorly")
        );
    }

    #[test]
    fn awarded_mark_stays_within_bounds() {
        let policy = four_level();
        for label in ["not_attempted", "attempted_poorly", "attempted_adequately", "attempted_fully"] {
            for max in [0.0, 1.0, 2.0, 3.0, 7.0, 10.0, 0.5, 2.5] {
                let mark = policy.awarded_mark(label, max).unwrap();
                assert!((0.0..=max).contains(&mark), "{label} of {max} gave {mark}");
                assert_eq!(mark, policy.awarded_mark(label, max).unwrap());
            }
        }
    }

    #[test]
    fn zero_max_mark_awards_zero() {
        assert_eq!(four_level().awarded_mark("attempted_fully", 0.0).unwrap(), 0.0);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(matches!(
            AssessmentPolicy::new([("too_much", 1.2)]),
            Err(MarkerError::InvalidPolicy(_))
        ));
        assert!(matches!(
            AssessmentPolicy::new([("nan", f64::NAN)]),
            Err(MarkerError::InvalidPolicy(_))
        ));
        assert!(matches!(
            AssessmentPolicy::new([("a", 0.0), ("A", 1.0)]),
            Err(MarkerError::InvalidPolicy(_))
        ));
        assert!(matches!(
            AssessmentPolicy::new(Vec::<(String, f64)>::new()),
            Err(MarkerError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn default_config_builds_two_anchor_policy() {
        let policy = AssessmentPolicy::from_config(&AssessmentConfig::default()).unwrap();
        let labels: Vec<&str> = policy.labels().iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["not_attempted", "attempted_fully"]);
    }
}
