//! In-process result store.
//!
//! Keeps one record per (exam, student) behind a `tokio` lock. Used by tests and by
//! embedders that persist elsewhere on their own schedule.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::traits::store::{ResultStore, SaveConfirmation};
use crate::types::{ExamId, ExamResult, StudentId};

#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    records: RwLock<HashMap<(ExamId, StudentId), ExamResult>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn load(
        &self,
        exam_id: ExamId,
        student_id: StudentId,
    ) -> Result<Option<ExamResult>, StoreError> {
        Ok(self.records.read().await.get(&(exam_id, student_id)).cloned())
    }

    async fn save(
        &self,
        exam_id: ExamId,
        student_id: StudentId,
        result: &ExamResult,
    ) -> Result<SaveConfirmation, StoreError> {
        if result.exam_id() != exam_id || result.student_id() != student_id {
            return Err(StoreError::Rejected(format!(
                "record for exam {} / student {} saved under exam {exam_id} / student {student_id}",
                result.exam_id(),
                result.student_id()
            )));
        }
        self.records
            .write()
            .await
            .insert((exam_id, student_id), result.clone());
        Ok(SaveConfirmation::now(exam_id, student_id))
    }
}
