//! # Scorer Module
//!
//! This module turns per-question results into a total mark and a percentage.
//! The primary function, [`aggregate`], is pure: it is re-run after every edit and its
//! output is the only source of an [`ExamResult`](crate::types::ExamResult)'s totals.

use std::collections::{HashMap, HashSet};

use tracing::error;

use crate::error::MarkerError;
use crate::types::{Aggregate, Question, QuestionResult};

/// Slack for floating point summation when comparing the total to its ceiling.
const TOTAL_EPSILON: f64 = 1e-9;

/// Grid that products are snapped to before rounding, so `0.29 * 50.0`
/// (14.499999999999998) is treated as the 14.5 it stands for.
const SNAP_SCALE: f64 = 1e6;

#[inline]
fn snap(x: f64) -> f64 {
    (x * SNAP_SCALE).round() / SNAP_SCALE
}

/// Round to the nearest whole number, halves going up. Inputs are non-negative marks.
#[inline]
pub fn round_half_up(x: f64) -> f64 {
    (snap(x) + 0.5).floor()
}

/// Round to one decimal place, halves going up.
#[inline]
pub fn round1(x: f64) -> f64 {
    round_half_up(x * 10.0) / 10.0
}

fn violation(message: String) -> MarkerError {
    error!("{}", message);
    MarkerError::AggregationInvariantViolation(message)
}

/// Computes the total mark and percentage of `results` against `questions`.
///
/// # Behavior
///
/// - `total_mark` is the sum of awarded marks. Questions without a result count as zero.
/// - `max_total` is the sum of every question's max mark, graded or not.
/// - `percentage` is `round1(total_mark / max_total * 100)`, or `0` when `max_total` is `0`.
///
/// # Errors
///
/// [`MarkerError::AggregationInvariantViolation`] when a result names an unknown question,
/// a question has more than one result, a max mark is negative, an awarded mark lies
/// outside `[0, max_mark]`, or the total leaves `[0, max_total]`. These indicate a
/// defect upstream; no total is reported.
///
/// # Example
///
/// ```
/// use exam_marker::scorer::aggregate;
/// use exam_marker::types::{Question, QuestionResult};
///
/// let questions = vec![
///     Question::new("q1", "First", 1, 10.0),
///     Question::new("q2", "Second", 2, 10.0),
/// ];
/// let results = vec![QuestionResult::direct("q1", 10.0)];
///
/// let agg = aggregate(&questions, &results).unwrap();
/// assert_eq!(agg.total_mark, 10.0);
/// assert_eq!(agg.percentage, 50.0);
/// ```
pub fn aggregate(
    questions: &[Question],
    results: &[QuestionResult],
) -> Result<Aggregate, MarkerError> {
    let mut max_by_id: HashMap<&str, f64> = HashMap::with_capacity(questions.len());
    let mut max_total: f64 = 0.0;
    for q in questions {
        if !q.max_mark.is_finite() || q.max_mark < 0.0 {
            return Err(violation(format!(
                "question '{}' has max mark {}",
                q.id, q.max_mark
            )));
        }
        max_by_id.insert(q.id.as_str(), q.max_mark);
        max_total += q.max_mark;
    }

    let mut seen = HashSet::with_capacity(results.len());
    let mut total_mark: f64 = 0.0;
    for result in results {
        let id = result.question_id();
        let Some(&max_mark) = max_by_id.get(id) else {
            return Err(violation(format!("result for unknown question '{id}'")));
        };
        if !seen.insert(id) {
            return Err(violation(format!("question '{id}' has more than one result")));
        }
        let mark = result.awarded_mark();
        if mark.is_nan() || mark < 0.0 || mark > max_mark {
            return Err(violation(format!(
                "question '{id}' awarded {mark} outside [0, {max_mark}]"
            )));
        }
        total_mark += mark;
    }

    if total_mark < 0.0 || total_mark > max_total + TOTAL_EPSILON * max_total.max(1.0) {
        return Err(violation(format!(
            "total {total_mark} outside [0, {max_total}]"
        )));
    }
    let total_mark = total_mark.min(max_total);

    let percentage = if max_total == 0.0 {
        0.0
    } else {
        round1(total_mark / max_total * 100.0)
    };

    Ok(Aggregate {
        total_mark,
        max_total,
        percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_ten() -> Vec<Question> {
        vec![
            Question::new("q1", "Question 1", 1, 10.0),
            Question::new("q2", "Question 2", 2, 10.0),
        ]
    }

    #[test]
    fn test_aggregate_basic() {
        let results = vec![
            QuestionResult::direct("q1", 10.0),
            QuestionResult::direct("q2", 5.0),
        ];
        let agg = aggregate(&two_by_ten(), &results).unwrap();
        assert_eq!(agg.total_mark, 15.0);
        assert_eq!(agg.max_total, 20.0);
        assert_eq!(agg.percentage, 75.0);
    }

    #[test]
    fn test_aggregate_ungraded_counts_zero() {
        let results = vec![QuestionResult::from_label("q1", "attempted_fully".into(), 10.0)];
        let agg = aggregate(&two_by_ten(), &results).unwrap();
        assert_eq!(agg.total_mark, 10.0);
        assert_eq!(agg.percentage, 50.0);
    }

    #[test]
    fn test_aggregate_empty() {
        let agg = aggregate(&two_by_ten(), &[]).unwrap();
        assert_eq!(agg, Aggregate { total_mark: 0.0, max_total: 20.0, percentage: 0.0 });
    }

    #[test]
    fn test_aggregate_zero_denominator() {
        let questions = vec![Question::new("bonus", "Bonus", 1, 0.0)];
        let results = vec![QuestionResult::direct("bonus", 0.0)];
        let agg = aggregate(&questions, &results).unwrap();
        assert_eq!(agg.percentage, 0.0);
        assert_eq!(aggregate(&[], &[]).unwrap().percentage, 0.0);
    }

    #[test]
    fn test_aggregate_rounds_to_one_decimal() {
        let questions = vec![
            Question::new("q1", "a", 1, 3.0),
            Question::new("q2", "b", 2, 3.0),
            Question::new("q3", "c", 3, 3.0),
        ];
        let results = vec![QuestionResult::direct("q1", 2.0)];
        // 2 / 9 = 22.22..%
        assert_eq!(aggregate(&questions, &results).unwrap().percentage, 22.2);

        let results = vec![QuestionResult::direct("q1", 3.0), QuestionResult::direct("q2", 3.0)];
        // 6 / 9 = 66.66..%
        assert_eq!(aggregate(&questions, &results).unwrap().percentage, 66.7);
    }

    #[test]
    fn test_rounding_ignores_float_noise_below_the_half() {
        assert_eq!(round_half_up(0.29 * 50.0), 15.0);
        assert_eq!(round_half_up(0.35 * 90.0), 32.0);
        assert_eq!(round_half_up(0.57 * 50.0), 29.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round1(0.7 / 40.0 * 100.0), 1.8);
        assert_eq!(round1(2.9 / 40.0 * 100.0), 7.3);
    }

    #[test]
    fn test_aggregate_percentage_rounds_half_up() {
        let questions = vec![Question::new("q1", "Long answer", 1, 40.0)];
        let agg = aggregate(&questions, &[QuestionResult::direct("q1", 0.7)]).unwrap();
        assert_eq!(agg.percentage, 1.8);
        let agg = aggregate(&questions, &[QuestionResult::direct("q1", 2.9)]).unwrap();
        assert_eq!(agg.percentage, 7.3);
    }

    #[test]
    fn test_aggregate_rejects_mark_above_max() {
        let results = vec![QuestionResult::direct("q1", 11.0)];
        assert!(matches!(
            aggregate(&two_by_ten(), &results),
            Err(MarkerError::AggregationInvariantViolation(_))
        ));
    }

    #[test]
    fn test_aggregate_rejects_negative_max() {
        let questions = vec![Question::new("q1", "a", 1, -2.0)];
        assert!(matches!(
            aggregate(&questions, &[]),
            Err(MarkerError::AggregationInvariantViolation(_))
        ));
    }

    #[test]
    fn test_aggregate_rejects_unknown_and_duplicate_results() {
        let unknown = vec![QuestionResult::direct("q9", 1.0)];
        assert!(aggregate(&two_by_ten(), &unknown).is_err());

        let duplicate = vec![QuestionResult::direct("q1", 1.0), QuestionResult::direct("q1", 2.0)];
        assert!(aggregate(&two_by_ten(), &duplicate).is_err());
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.49), 2.0);
        assert_eq!(round_half_up(0.0), 0.0);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(33.333), 33.3);
    }
}
