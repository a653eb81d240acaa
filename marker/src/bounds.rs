//! Bounds handling for directly entered marks.
//!
//! Direct entry clamps into `[0, max_mark]` instead of rejecting, so a mistyped mark
//! self-corrects. Only NaN is refused, since it has no nearest bound.

use tracing::error;

use crate::error::MarkerError;
use crate::types::Question;

/// Clamp `requested` to `[0, question.max_mark]`.
///
/// # Errors
/// [`MarkerError::OutOfBoundsMark`] if `requested` is NaN.
pub fn clamp_direct_mark(question: &Question, requested: f64) -> Result<f64, MarkerError> {
    if requested.is_nan() {
        return Err(MarkerError::OutOfBoundsMark {
            question_id: question.id.clone(),
            mark: requested,
            max_mark: question.max_mark,
        });
    }
    Ok(requested.clamp(0.0, question.max_mark))
}

/// Assert that a mark about to be stored for `question` is within bounds.
pub(crate) fn check_awarded(question: &Question, mark: f64) -> Result<(), MarkerError> {
    if mark.is_nan() || mark < 0.0 || mark > question.max_mark {
        error!(
            question_id = %question.id,
            mark,
            max_mark = question.max_mark,
            "awarded mark escaped bounds validation"
        );
        return Err(MarkerError::OutOfBoundsMark {
            question_id: question.id.clone(),
            mark,
            max_mark: question.max_mark,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(max: f64) -> Question {
        Question::new("q1", "Explain ownership", 1, max)
    }

    #[test]
    fn negative_clamps_to_zero() {
        assert_eq!(clamp_direct_mark(&q(10.0), -5.0).unwrap(), 0.0);
    }

    #[test]
    fn above_max_clamps_to_max() {
        assert_eq!(clamp_direct_mark(&q(10.0), 110.0).unwrap(), 10.0);
        assert_eq!(clamp_direct_mark(&q(10.0), f64::INFINITY).unwrap(), 10.0);
    }

    #[test]
    fn in_range_passes_through() {
        assert_eq!(clamp_direct_mark(&q(10.0), 7.5).unwrap(), 7.5);
        assert_eq!(clamp_direct_mark(&q(10.0), 0.0).unwrap(), 0.0);
        assert_eq!(clamp_direct_mark(&q(10.0), 10.0).unwrap(), 10.0);
    }

    #[test]
    fn nan_is_refused() {
        assert!(matches!(
            clamp_direct_mark(&q(10.0), f64::NAN),
            Err(MarkerError::OutOfBoundsMark { .. })
        ));
    }

    #[test]
    fn check_awarded_flags_escaped_marks() {
        assert!(check_awarded(&q(5.0), 5.0).is_ok());
        assert!(check_awarded(&q(5.0), 5.5).is_err());
        assert!(check_awarded(&q(5.0), -0.1).is_err());
    }
}
