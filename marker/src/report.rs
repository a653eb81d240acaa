//! # Exam Result Report Module
//!
//! Serializable summary of an [`ExamResult`] laid out against its catalog, for handing to
//! whatever transport the surrounding application uses.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Exam result ready.",
//!   "data": {
//!     "exam_id": 7,
//!     "student_id": 42,
//!     "questions": [
//!       { "question_id": "q1", "text": "...", "earned": 10.0, "total": 10.0, "source": "label", "label": "attempted_fully", "graded": true },
//!       { "question_id": "q2", "text": "...", "earned": 0.0, "total": 10.0, "source": null, "label": null, "graded": false }
//!     ],
//!     "total_mark": 10.0,
//!     "max_total": 20.0,
//!     "percentage": 50.0,
//!     "remark": null
//!   }
//! }
//! ```
//!
//! Every catalog question appears, graded or not, so ungraded questions stay visible
//! even though they count as zero in the total.

use serde::Serialize;

use crate::types::{ExamId, ExamResult, MarkSource, QuestionCatalog, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportQuestion {
    pub question_id: String,
    pub text: String,
    pub earned: f64,
    pub total: f64,
    pub source: Option<MarkSource>,
    pub label: Option<String>,
    pub graded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamResultReport {
    pub exam_id: ExamId,
    pub student_id: StudentId,
    pub questions: Vec<ReportQuestion>,
    pub total_mark: f64,
    pub max_total: f64,
    pub percentage: f64,
    pub remark: Option<String>,
}

impl ExamResultReport {
    /// Builds the report from an already aggregated result.
    pub fn new(catalog: &QuestionCatalog, result: &ExamResult) -> Self {
        let questions = catalog
            .questions()
            .iter()
            .map(|q| {
                let graded = result.question_result(&q.id);
                ReportQuestion {
                    question_id: q.id.clone(),
                    text: q.text.clone(),
                    earned: graded.map(|r| r.awarded_mark()).unwrap_or(0.0),
                    total: q.max_mark,
                    source: graded.map(|r| r.source()),
                    label: graded.and_then(|r| r.label()).map(|l| l.to_string()),
                    graded: graded.is_some(),
                }
            })
            .collect();

        Self {
            exam_id: result.exam_id(),
            student_id: result.student_id(),
            questions,
            total_mark: result.total_mark(),
            max_total: catalog.max_total(),
            percentage: result.percentage(),
            remark: result.remark().map(str::to_string),
        }
    }

    pub fn graded_count(&self) -> usize {
        self.questions.iter().filter(|q| q.graded).count()
    }
}

/// Response envelope around an [`ExamResultReport`].
#[derive(Debug, Serialize)]
pub struct ExamResultResponse {
    success: bool,
    message: String,
    data: ExamResultReport,
}

impl From<ExamResultReport> for ExamResultResponse {
    fn from(report: ExamResultReport) -> Self {
        ExamResultResponse {
            success: true,
            message: "Exam result ready.".to_string(),
            data: report,
        }
    }
}
