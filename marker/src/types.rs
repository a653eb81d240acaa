//! # Types Module
//!
//! Core data structures of the grading engine: the question catalog supplied per
//! session, per-question results, and the per-(exam, student) [`ExamResult`].
//!
//! [`ExamResult`] and [`QuestionResult`] serialise to the camelCase wire shape shared
//! with result stores:
//!
//! ```json
//! {
//!   "examId": 4,
//!   "studentId": 17,
//!   "questionResults": [
//!     { "questionId": "q1", "label": "attempted_fully", "awardedMark": 10.0, "source": "label" },
//!     { "questionId": "q2", "awardedMark": 7.0, "source": "direct" }
//!   ],
//!   "totalMark": 17.0,
//!   "percentage": 85.0,
//!   "remark": "Neat work"
//! }
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MarkerError;

pub type ExamId = i64;
pub type StudentId = i64;

/// A single gradable item. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Position used for stable ordering within the exam.
    pub ordinal: u32,
    pub max_mark: f64,
}

impl Question {
    pub fn new(id: impl Into<String>, text: impl Into<String>, ordinal: u32, max_mark: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ordinal,
            max_mark,
        }
    }
}

/// The ordered questions of one exam, fixed for the lifetime of a grading session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionCatalog {
    exam_id: ExamId,
    questions: Vec<Question>,
}

impl QuestionCatalog {
    /// Validates and orders the questions by `ordinal` (ties keep input order).
    ///
    /// # Errors
    /// [`MarkerError::InvalidCatalog`] on duplicate ids or a negative / non-finite max mark.
    pub fn new(exam_id: ExamId, mut questions: Vec<Question>) -> Result<Self, MarkerError> {
        let mut seen = HashSet::new();
        for q in &questions {
            if !seen.insert(q.id.as_str()) {
                return Err(MarkerError::InvalidCatalog(format!(
                    "duplicate question id '{}'",
                    q.id
                )));
            }
            if !q.max_mark.is_finite() || q.max_mark < 0.0 {
                return Err(MarkerError::InvalidCatalog(format!(
                    "question '{}' has invalid max mark {}",
                    q.id, q.max_mark
                )));
            }
        }
        questions.sort_by_key(|q| q.ordinal);
        Ok(Self { exam_id, questions })
    }

    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn position(&self, question_id: &str) -> Option<usize> {
        self.questions.iter().position(|q| q.id == question_id)
    }

    /// Sum of every question's max mark, graded or not.
    pub fn max_total(&self) -> f64 {
        self.questions.iter().map(|q| q.max_mark).sum()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// A qualitative judgment of an answer, resolved to a mark through the policy table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssessmentLabel(String);

impl AssessmentLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssessmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssessmentLabel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// How a question's mark was entered. The two modes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkEntry {
    /// Derived from an assessment label through the policy.
    Label(AssessmentLabel),
    /// Typed in by the grader (after clamping).
    Direct,
}

/// Wire tag for [`MarkEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkSource {
    Label,
    Direct,
}

/// The outcome for one question of one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuestionResultRecord", into = "QuestionResultRecord")]
pub struct QuestionResult {
    question_id: String,
    entry: MarkEntry,
    awarded_mark: f64,
}

impl QuestionResult {
    pub fn from_label(question_id: impl Into<String>, label: AssessmentLabel, awarded_mark: f64) -> Self {
        Self {
            question_id: question_id.into(),
            entry: MarkEntry::Label(label),
            awarded_mark,
        }
    }

    pub fn direct(question_id: impl Into<String>, awarded_mark: f64) -> Self {
        Self {
            question_id: question_id.into(),
            entry: MarkEntry::Direct,
            awarded_mark,
        }
    }

    pub fn question_id(&self) -> &str {
        &self.question_id
    }

    pub fn entry(&self) -> &MarkEntry {
        &self.entry
    }

    pub fn label(&self) -> Option<&AssessmentLabel> {
        match &self.entry {
            MarkEntry::Label(label) => Some(label),
            MarkEntry::Direct => None,
        }
    }

    pub fn source(&self) -> MarkSource {
        match self.entry {
            MarkEntry::Label(_) => MarkSource::Label,
            MarkEntry::Direct => MarkSource::Direct,
        }
    }

    pub fn awarded_mark(&self) -> f64 {
        self.awarded_mark
    }
}

/// Flat wire form of [`QuestionResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionResultRecord {
    question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<AssessmentLabel>,
    awarded_mark: f64,
    source: MarkSource,
}

impl TryFrom<QuestionResultRecord> for QuestionResult {
    type Error = MarkerError;

    fn try_from(record: QuestionResultRecord) -> Result<Self, Self::Error> {
        let entry = match (record.source, record.label) {
            (MarkSource::Label, Some(label)) => MarkEntry::Label(label),
            (MarkSource::Label, None) => {
                return Err(MarkerError::InvalidRecord(format!(
                    "question '{}' has source 'label' but no label",
                    record.question_id
                )));
            }
            // A stale label next to a direct mark is ignored: direct entry wins.
            (MarkSource::Direct, _) => MarkEntry::Direct,
        };
        Ok(Self {
            question_id: record.question_id,
            entry,
            awarded_mark: record.awarded_mark,
        })
    }
}

impl From<QuestionResult> for QuestionResultRecord {
    fn from(result: QuestionResult) -> Self {
        let source = result.source();
        let label = match result.entry {
            MarkEntry::Label(label) => Some(label),
            MarkEntry::Direct => None,
        };
        Self {
            question_id: result.question_id,
            label,
            awarded_mark: result.awarded_mark,
            source,
        }
    }
}

/// Output of the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aggregate {
    pub total_mark: f64,
    pub max_total: f64,
    pub percentage: f64,
}

/// The graded outcome of one exam for one student.
///
/// `total_mark` and `percentage` are derived; only the aggregator writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    exam_id: ExamId,
    student_id: StudentId,
    #[serde(default)]
    question_results: Vec<QuestionResult>,
    #[serde(default)]
    total_mark: f64,
    #[serde(default)]
    percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    remark: Option<String>,
}

impl ExamResult {
    /// A fresh record with no graded questions.
    pub fn new(exam_id: ExamId, student_id: StudentId) -> Self {
        Self {
            exam_id,
            student_id,
            question_results: Vec::new(),
            total_mark: 0.0,
            percentage: 0.0,
            remark: None,
        }
    }

    pub fn exam_id(&self) -> ExamId {
        self.exam_id
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn question_results(&self) -> &[QuestionResult] {
        &self.question_results
    }

    pub fn question_result(&self, question_id: &str) -> Option<&QuestionResult> {
        self.question_results
            .iter()
            .find(|r| r.question_id == question_id)
    }

    pub fn total_mark(&self) -> f64 {
        self.total_mark
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn remark(&self) -> Option<&str> {
        self.remark.as_deref()
    }

    pub(crate) fn question_results_mut(&mut self) -> &mut Vec<QuestionResult> {
        &mut self.question_results
    }

    pub(crate) fn set_remark(&mut self, remark: Option<String>) {
        self.remark = remark;
    }

    pub(crate) fn apply_aggregate(&mut self, aggregate: Aggregate) {
        self.total_mark = aggregate.total_mark;
        self.percentage = aggregate.percentage;
    }
}
