//!
//! # Result Store Trait
//!
//! This module defines the [`ResultStore`] trait, the persistence boundary of the grading
//! engine, and the [`SaveConfirmation`] a store returns after a successful save.
//!
//! Contract for implementors:
//! - `load` returns `Ok(None)` when nothing is stored for the pair. That is not an error.
//! - `save` is a full replace. The incoming record supersedes whatever was stored; a store
//!   must never merge question results from an older record into it.
//! - Retries and timeouts belong to the store, not the engine.
//!

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::types::{ExamId, ExamResult, StudentId};

/// Acknowledgement of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveConfirmation {
    pub exam_id: ExamId,
    pub student_id: StudentId,
    pub saved_at: DateTime<Utc>,
}

impl SaveConfirmation {
    pub fn now(exam_id: ExamId, student_id: StudentId) -> Self {
        Self {
            exam_id,
            student_id,
            saved_at: Utc::now(),
        }
    }
}

/// Remote persistence for exam results, keyed by (exam, student).
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn load(
        &self,
        exam_id: ExamId,
        student_id: StudentId,
    ) -> Result<Option<ExamResult>, StoreError>;

    async fn save(
        &self,
        exam_id: ExamId,
        student_id: StudentId,
        result: &ExamResult,
    ) -> Result<SaveConfirmation, StoreError>;
}
