//! # Grading Session
//!
//! A [`GradingSession`] owns the in-memory Draft of one student's [`ExamResult`] while a
//! grader works through the question catalog.
//!
//! ## Lifecycle
//!
//! ```text
//! Unloaded --open--> Draft --save--> Saved
//!                      ^               |
//!                      +-----edit------+
//! ```
//!
//! - `open` loads any stored record and seeds the Draft from it by question id.
//! - Every edit re-runs [`aggregate`] before returning, so totals are never stale.
//!   An edit that would break an aggregation invariant is rolled back and the last
//!   valid totals stay in place.
//! - `save` sends the full Draft to the store. A failed save leaves the session in
//!   Draft with every mark intact.
//! - Opening another student or exam discards the current Draft. Warning about unsaved
//!   edits is up to the caller; [`GradingSession::state`] tells Draft from Saved.
//!
//! The session is plain data owned by its caller. Independent graders use independent
//! sessions; the store is the only shared piece.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::bounds::{check_awarded, clamp_direct_mark};
use crate::error::MarkerError;
use crate::policy::AssessmentPolicy;
use crate::scorer::aggregate;
use crate::traits::store::{ResultStore, SaveConfirmation};
use crate::types::{
    ExamResult, MarkEntry, QuestionCatalog, QuestionResult, StudentId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No catalog or student selected.
    Unloaded,
    /// Edited, or loaded, since the last successful save.
    Draft,
    /// Matches what the store last confirmed.
    Saved,
}

#[derive(Debug)]
struct OpenExam {
    catalog: QuestionCatalog,
    draft: ExamResult,
    baseline: Option<ExamResult>,
}

impl OpenExam {
    fn sort_results(&mut self) {
        let catalog = &self.catalog;
        self.draft
            .question_results_mut()
            .sort_by_key(|r| catalog.position(r.question_id()).unwrap_or(usize::MAX));
    }

    /// Re-aggregates the draft. On failure the results are put back to `previous`,
    /// which was valid, and the stored totals are left alone.
    fn recompute_or_restore(&mut self, previous: Vec<QuestionResult>) -> Result<(), MarkerError> {
        match aggregate(self.catalog.questions(), self.draft.question_results()) {
            Ok(agg) => {
                self.draft.apply_aggregate(agg);
                Ok(())
            }
            Err(e) => {
                *self.draft.question_results_mut() = previous;
                Err(e)
            }
        }
    }

    fn upsert(&mut self, result: QuestionResult) -> Result<(), MarkerError> {
        let previous = self.draft.question_results().to_vec();
        let results = self.draft.question_results_mut();
        match results
            .iter_mut()
            .find(|r| r.question_id() == result.question_id())
        {
            Some(slot) => *slot = result,
            None => results.push(result),
        }
        self.sort_results();
        self.recompute_or_restore(previous)
    }

    fn remove(&mut self, question_id: &str) -> Result<(), MarkerError> {
        let previous = self.draft.question_results().to_vec();
        self.draft
            .question_results_mut()
            .retain(|r| r.question_id() != question_id);
        self.recompute_or_restore(previous)
    }
}

/// Grading state for one (exam, student) pair at a time.
pub struct GradingSession {
    store: Arc<dyn ResultStore>,
    policy: AssessmentPolicy,
    state: SessionState,
    open: Option<OpenExam>,
}

impl GradingSession {
    /// A session in the Unloaded state.
    pub fn new(store: Arc<dyn ResultStore>, policy: AssessmentPolicy) -> Self {
        Self {
            store,
            policy,
            state: SessionState::Unloaded,
            open: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn policy(&self) -> &AssessmentPolicy {
        &self.policy
    }

    pub fn catalog(&self) -> Option<&QuestionCatalog> {
        self.open.as_ref().map(|o| &o.catalog)
    }

    /// The result under edit, with up-to-date totals.
    pub fn draft(&self) -> Option<&ExamResult> {
        self.open.as_ref().map(|o| &o.draft)
    }

    /// The record last loaded from or confirmed by the store.
    pub fn baseline(&self) -> Option<&ExamResult> {
        self.open.as_ref().and_then(|o| o.baseline.as_ref())
    }

    /// `None` means ungraded (or no session is open).
    pub fn question_result(&self, question_id: &str) -> Option<&QuestionResult> {
        self.draft().and_then(|d| d.question_result(question_id))
    }

    /// Selects `catalog` and `student_id`, loading any stored result.
    ///
    /// Any current Draft is discarded. If loading or seeding fails the session is left
    /// exactly as it was.
    pub async fn open(
        &mut self,
        catalog: QuestionCatalog,
        student_id: StudentId,
    ) -> Result<(), MarkerError> {
        let exam_id = catalog.exam_id();
        let stored = self.store.load(exam_id, student_id).await?;

        let mut open = OpenExam {
            draft: match &stored {
                Some(record) => self.seed_from(&catalog, record, student_id)?,
                None => ExamResult::new(exam_id, student_id),
            },
            catalog,
            baseline: stored,
        };
        open.sort_results();
        open.recompute_or_restore(Vec::new())?;

        if let Some(previous) = &self.open {
            if self.state == SessionState::Draft {
                debug!(
                    exam_id = previous.draft.exam_id(),
                    student_id = previous.draft.student_id(),
                    "discarding draft"
                );
            }
        }

        info!(
            exam_id,
            student_id,
            prior_record = open.baseline.is_some(),
            graded = open.draft.question_results().len(),
            "grading session opened"
        );
        self.open = Some(open);
        self.state = SessionState::Draft;
        Ok(())
    }

    /// Rebuilds a stored record against the current catalog and policy.
    ///
    /// Label marks are re-derived and direct marks re-clamped, so a catalog whose max
    /// marks changed since the save still yields in-bounds marks. Results for questions
    /// no longer in the catalog are dropped.
    fn seed_from(
        &self,
        catalog: &QuestionCatalog,
        record: &ExamResult,
        student_id: StudentId,
    ) -> Result<ExamResult, MarkerError> {
        if record.exam_id() != catalog.exam_id() || record.student_id() != student_id {
            return Err(MarkerError::InvalidRecord(format!(
                "store returned exam {} / student {} for exam {} / student {}",
                record.exam_id(),
                record.student_id(),
                catalog.exam_id(),
                student_id
            )));
        }

        let mut draft = ExamResult::new(catalog.exam_id(), student_id);
        let mut seen = HashSet::new();

        for stored in record.question_results() {
            let id = stored.question_id();
            let Some(question) = catalog.get(id) else {
                warn!(question_id = id, "dropping stored result for question not in catalog");
                continue;
            };
            if !seen.insert(id) {
                warn!(question_id = id, "dropping duplicate stored result");
                continue;
            }
            let seeded = match stored.entry() {
                MarkEntry::Label(label) => {
                    let canonical = self.policy.resolve(label.as_str())?;
                    let mark = self.policy.awarded_mark(label.as_str(), question.max_mark)?;
                    QuestionResult::from_label(id, canonical, mark)
                }
                MarkEntry::Direct => {
                    QuestionResult::direct(id, clamp_direct_mark(question, stored.awarded_mark())?)
                }
            };
            check_awarded(question, seeded.awarded_mark())?;
            draft.question_results_mut().push(seeded);
        }

        draft.set_remark(record.remark().map(str::to_string));
        Ok(draft)
    }

    fn open_mut(&mut self) -> Result<&mut OpenExam, MarkerError> {
        self.open.as_mut().ok_or(MarkerError::SessionNotOpen)
    }

    /// Grades `question_id` with an assessment label. Returns the awarded mark.
    ///
    /// Replaces any direct mark on the question.
    pub fn select_label(&mut self, question_id: &str, label: &str) -> Result<f64, MarkerError> {
        let open = self.open.as_mut().ok_or(MarkerError::SessionNotOpen)?;
        let question = open
            .catalog
            .get(question_id)
            .ok_or_else(|| MarkerError::UnknownQuestion(question_id.to_string()))?;

        let canonical = self.policy.resolve(label)?;
        let mark = self.policy.awarded_mark(label, question.max_mark)?;
        check_awarded(question, mark)?;

        open.upsert(QuestionResult::from_label(question_id, canonical, mark))?;
        debug!(question_id, label, mark, "label selected");
        self.state = SessionState::Draft;
        Ok(mark)
    }

    /// Grades `question_id` with a typed mark, clamped into `[0, max_mark]`.
    /// Returns the mark actually stored.
    ///
    /// Replaces any label on the question.
    pub fn set_direct_mark(&mut self, question_id: &str, requested: f64) -> Result<f64, MarkerError> {
        let open = self.open_mut()?;
        let question = open
            .catalog
            .get(question_id)
            .ok_or_else(|| MarkerError::UnknownQuestion(question_id.to_string()))?;

        let mark = clamp_direct_mark(question, requested)?;
        check_awarded(question, mark)?;

        open.upsert(QuestionResult::direct(question_id, mark))?;
        debug!(question_id, requested, mark, "direct mark set");
        self.state = SessionState::Draft;
        Ok(mark)
    }

    /// Returns `question_id` to ungraded.
    pub fn clear_question(&mut self, question_id: &str) -> Result<(), MarkerError> {
        let open = self.open_mut()?;
        if open.catalog.get(question_id).is_none() {
            return Err(MarkerError::UnknownQuestion(question_id.to_string()));
        }
        open.remove(question_id)?;
        debug!(question_id, "question cleared");
        self.state = SessionState::Draft;
        Ok(())
    }

    /// Sets the free-text remark. Blank text clears it.
    pub fn set_remark(&mut self, remark: Option<&str>) -> Result<(), MarkerError> {
        let open = self.open_mut()?;
        let remark = remark
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let previous = open.draft.remark().map(str::to_string);
        open.draft.set_remark(remark);
        let current = open.draft.question_results().to_vec();
        if let Err(e) = open.recompute_or_restore(current) {
            open.draft.set_remark(previous);
            return Err(e);
        }
        self.state = SessionState::Draft;
        Ok(())
    }

    /// Persists the full Draft as a replacement of the stored record.
    ///
    /// Saving an unmodified session is not suppressed; the same record is sent again.
    pub async fn save(&mut self) -> Result<SaveConfirmation, MarkerError> {
        let snapshot = self
            .open
            .as_ref()
            .ok_or(MarkerError::SessionNotOpen)?
            .draft
            .clone();
        let (exam_id, student_id) = (snapshot.exam_id(), snapshot.student_id());

        match self.store.save(exam_id, student_id, &snapshot).await {
            Ok(confirmation) => {
                info!(
                    exam_id,
                    student_id,
                    total_mark = snapshot.total_mark(),
                    percentage = snapshot.percentage(),
                    "exam result saved"
                );
                if let Some(open) = self.open.as_mut() {
                    open.baseline = Some(snapshot);
                }
                self.state = SessionState::Saved;
                Ok(confirmation)
            }
            Err(e) => {
                error!(exam_id, student_id, error = %e, "failed to save exam result");
                Err(e.into())
            }
        }
    }

    /// Ends the session, dropping any unsaved Draft.
    pub fn close(&mut self) {
        self.open = None;
        self.state = SessionState::Unloaded;
    }
}
